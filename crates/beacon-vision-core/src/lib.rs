//! Core types and utilities for beacon detection.
//!
//! This crate holds the geometric and imaging building blocks the analyzer
//! is composed from: HSV color ranges, binary mask helpers, minimum-area
//! rotated rectangles, circles and direct ellipse fitting. It does *not*
//! know anything about beacons, scoring or detection policy.

mod color;
mod ellipse;
mod geometry;
mod logger;
mod raster;

pub use color::{ColorRange, ColorRangeError, HsvInterval};
pub use ellipse::{fit_ellipse, Ellipse};
pub use geometry::{contour_area, Circle, IntRect, RotatedRect};
pub use raster::{
    bitwise_and, count_nonzero, expand_mask_channels, gaussian_blur, gaussian_kernel,
    rgb_to_hsv, scale_mask, HsvImage, MASK_ON,
};

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::init_with_level;

/// Integer pixel point used for contours.
pub type PixelPoint = imageproc::point::Point<i32>;
