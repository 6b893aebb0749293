//! High-level facade crate for the `beacon-vision-*` workspace.
//!
//! This crate provides:
//! - re-exports of the geometry/imaging core and the analyzer,
//! - a JSON-backed [`detect::DetectConfig`] and [`detect::BeaconReport`],
//! - (feature `cli`) the `beacon-vision` command-line tool.
//!
//! ## Quickstart
//!
//! ```no_run
//! use beacon_vision::{detect, BeaconAnalyzer, ButtonStrategy};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut frame = image::open("frame.png")?.to_rgb8();
//! let mut analyzer = BeaconAnalyzer::default();
//! let beacons = detect::detect_beacons(&mut analyzer, &mut frame, ButtonStrategy::Ellipse);
//! if let Some(best) = beacons.first() {
//!     println!("{} scored {} ({})", best.color_label(), best.points(), best.code());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## API map
//! - `beacon_vision::core`: HSV ranges, mask helpers, rotated rectangles, ellipse fitting.
//! - `beacon_vision::analyzer`: segmentation, button detection, candidate scoring.
//! - `beacon_vision::detect`: config/report files and end-to-end helpers.

pub use beacon_vision_analyzer as analyzer;
pub use beacon_vision_core as core;

pub use beacon_vision_analyzer::{
    sort_by_area_desc, AnalyzeError, AnalyzerParams, Beacon, BeaconAnalyzer, BeaconColor,
    BeaconSummary, ButtonStrategy, Score,
};
pub use beacon_vision_core::{Circle, ColorRange, HsvInterval, RotatedRect};

pub mod detect;
