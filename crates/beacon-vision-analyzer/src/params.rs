use beacon_vision_core::{ColorRange, HsvInterval};
use serde::{Deserialize, Serialize};

use crate::buttons::ButtonStrategy;
use crate::AnalyzeError;

/// Mask smoothing for color segmentation.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmenterParams {
    /// Integer factor the mask is shrunk by before morphology.
    pub downscale: u32,
    /// Side of the square opening element (noise removal).
    pub open_size: u32,
    /// Side of the square closing element (gap filling).
    pub close_size: u32,
}

impl Default for SegmenterParams {
    fn default() -> Self {
        Self {
            downscale: 4,
            open_size: 3,
            close_size: 11,
        }
    }
}

/// Ellipse-based button detection.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EllipseButtonParams {
    /// Foreground count above which the large opening element is used.
    pub large_open_above: usize,
    /// Foreground count above which the medium opening element is used.
    pub medium_open_above: usize,
    pub large_open_size: u32,
    pub medium_open_size: u32,
    pub small_open_size: u32,
    pub blur_size: usize,
    pub blur_sigma: f32,
    pub canny_low: f32,
    pub canny_high: f32,
    /// Fewest contour points an ellipse is fitted to.
    pub min_contour_points: usize,
    /// Accepted `|w/h - 1|` of the contour bounding box.
    pub max_eccentricity_dev: f32,
    /// Circles with a radius at or below this are dropped.
    pub min_radius: f32,
}

impl Default for EllipseButtonParams {
    fn default() -> Self {
        Self {
            large_open_above: 1700,
            medium_open_above: 500,
            large_open_size: 7,
            medium_open_size: 5,
            small_open_size: 3,
            blur_size: 5,
            blur_sigma: 2.0,
            canny_low: 100.0,
            canny_high: 200.0,
            min_contour_points: 5,
            max_eccentricity_dev: 0.3,
            min_radius: 2.0,
        }
    }
}

impl EllipseButtonParams {
    /// Opening element side for a given foreground pixel count.
    pub fn open_size_for(&self, nonzero: usize) -> u32 {
        if nonzero > self.large_open_above {
            self.large_open_size
        } else if nonzero > self.medium_open_above {
            self.medium_open_size
        } else {
            self.small_open_size
        }
    }
}

/// Gradient Hough circle transform.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HoughButtonParams {
    pub blur_size: usize,
    pub blur_sigma: f32,
    /// Minimum distance between detected centers.
    pub min_center_dist: f32,
    /// Upper Canny threshold; the lower one is half of it.
    pub canny_high: f32,
    /// Votes a center needs to be reported.
    pub accumulator_threshold: u32,
    pub min_radius: u32,
    pub max_radius: u32,
}

impl Default for HoughButtonParams {
    fn default() -> Self {
        Self {
            blur_size: 9,
            blur_sigma: 2.0,
            min_center_dist: 15.0,
            canny_high: 200.0,
            accumulator_threshold: 20,
            min_radius: 0,
            max_radius: 30,
        }
    }
}

/// Physical beacon proportions and award tolerances.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreParams {
    pub beacon_width: f64,
    pub beacon_height: f64,
    /// Height of the base strip that is often hidden, same units as the width.
    pub beacon_bottom_height: f64,
    /// Aspect errors strictly below this earn the "A" award.
    pub ratio_tolerance: f64,
    /// Area-symmetry errors strictly below this earn the "D" award.
    pub area_tolerance: f64,
}

impl Default for ScoreParams {
    fn default() -> Self {
        Self {
            beacon_width: 8.5,
            beacon_height: 5.7,
            beacon_bottom_height: 1.1,
            ratio_tolerance: 0.05,
            area_tolerance: 0.05,
        }
    }
}

impl ScoreParams {
    pub fn full_ratio(&self) -> f64 {
        self.beacon_width / self.beacon_height
    }

    pub fn partial_ratio(&self) -> f64 {
        self.beacon_width / (self.beacon_height - self.beacon_bottom_height)
    }
}

/// How the bounds of a two-region candidate are computed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PairBounds {
    /// Min-area rectangle over the points of both contours.
    #[default]
    ContourUnion,
    /// Min-area rectangle over the corners of both region rectangles.
    RectUnion,
}

/// Configuration for [`crate::BeaconAnalyzer`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerParams {
    /// Frames are shrunk so their larger side is at most this.
    pub max_dimension: u32,
    /// Candidates scoring below this are not reported.
    pub min_score: u32,
    pub button_strategy: ButtonStrategy,
    pub pair_bounds: PairBounds,
    pub red: ColorRange,
    pub blue: ColorRange,
    pub segmenter: SegmenterParams,
    pub ellipse: EllipseButtonParams,
    pub hough: HoughButtonParams,
    pub score: ScoreParams,
}

impl Default for AnalyzerParams {
    fn default() -> Self {
        Self {
            max_dimension: 640,
            min_score: 5,
            button_strategy: ButtonStrategy::default(),
            pair_bounds: PairBounds::default(),
            red: default_red_range(),
            blue: default_blue_range(),
            segmenter: SegmenterParams::default(),
            ellipse: EllipseButtonParams::default(),
            hough: HoughButtonParams::default(),
            score: ScoreParams::default(),
        }
    }
}

impl AnalyzerParams {
    /// Replace both target color ranges, validating the intervals.
    pub fn with_ranges(
        mut self,
        red: Vec<HsvInterval>,
        blue: Vec<HsvInterval>,
    ) -> Result<Self, AnalyzeError> {
        self.red = ColorRange::new(red)?;
        self.blue = ColorRange::new(blue)?;
        Ok(self)
    }
}

fn default_red_range() -> ColorRange {
    ColorRange::from_trusted(vec![
        HsvInterval::new([145, 0, 160], [180, 255, 255]),
        HsvInterval::new([0, 0, 160], [10, 255, 255]),
    ])
}

fn default_blue_range() -> ColorRange {
    ColorRange::from_trusted(vec![HsvInterval::new([90, 40, 180], [125, 255, 255])])
}
