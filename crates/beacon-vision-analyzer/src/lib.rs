//! Two-color beacon detection.
//!
//! The pipeline for one frame:
//!
//! 1. shrink the frame so its larger side is at most
//!    [`AnalyzerParams::max_dimension`],
//! 2. segment each target color into connected regions ([`ColorSegmenter`]),
//! 3. find dark circular buttons inside each color's mask ([`find_buttons`])
//!    and attach them to the regions covering them ([`assign_buttons`]),
//! 4. form every single-region and two-region candidate
//!    ([`enumerate_candidates`]) and score it ([`Score`]),
//! 5. keep candidates scoring at least [`AnalyzerParams::min_score`].
//!
//! ```no_run
//! use beacon_vision_analyzer::{sort_by_area_desc, BeaconAnalyzer, ButtonStrategy};
//!
//! # fn main() -> Result<(), image::ImageError> {
//! let mut frame = image::open("frame.png")?.to_rgb8();
//! let mut analyzer = BeaconAnalyzer::default();
//! let mut beacons = analyzer.analyze(&mut frame, ButtonStrategy::Ellipse);
//! sort_by_area_desc(&mut beacons);
//! for b in &beacons {
//!     println!("{} {} {}", b.color_label(), b.points(), b.code());
//! }
//! # Ok(())
//! # }
//! ```

mod analyzer;
mod beacon;
mod buttons;
mod debug;
mod error;
mod hough;
mod params;
mod region;
mod score;
mod segment;

pub use analyzer::{downscale_frame, BeaconAnalyzer};
pub use beacon::{enumerate_candidates, sort_by_area_desc, Beacon, BeaconSummary};
pub use buttons::{
    find_buttons, find_buttons_ellipse, find_buttons_hough, prepare_button_input, ButtonStrategy,
};
pub use debug::{DebugStage, Intermediates};
pub use error::AnalyzeError;
pub use hough::hough_circles;
pub use params::{
    AnalyzerParams, EllipseButtonParams, HoughButtonParams, PairBounds, ScoreParams,
    SegmenterParams,
};
pub use region::{assign_buttons, BeaconColor, BeaconRegion, ColorRegion};
pub use score::{area_symmetry_error, aspect_error, aspect_ratio_error, Score, ScoreAward};
pub use segment::{ColorSegmenter, Segmentation};
