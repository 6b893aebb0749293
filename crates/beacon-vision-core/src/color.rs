//! HSV color ranges.
//!
//! Hue follows the 8-bit convention used throughout the pipeline: `H` is in
//! `[0, 180)` (degrees halved), `S` and `V` are in `[0, 255]`. Colors whose hue
//! wraps around zero (red) are expressed as several intervals.

use image::{GrayImage, Luma};
use serde::{Deserialize, Serialize};

use crate::raster::{HsvImage, MASK_ON};

/// Errors returned when building a [`ColorRange`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ColorRangeError {
    #[error("color range has no intervals")]
    Empty,
    #[error("interval {index}: lower bound {lo:?} exceeds upper bound {hi:?}")]
    InvertedBounds {
        index: usize,
        lo: [u8; 3],
        hi: [u8; 3],
    },
}

/// One inclusive box in HSV space.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HsvInterval {
    pub lo: [u8; 3],
    pub hi: [u8; 3],
}

impl HsvInterval {
    pub const fn new(lo: [u8; 3], hi: [u8; 3]) -> Self {
        Self { lo, hi }
    }

    #[inline]
    pub fn contains(&self, hsv: [u8; 3]) -> bool {
        (0..3).all(|c| self.lo[c] <= hsv[c] && hsv[c] <= self.hi[c])
    }
}

/// Union of one or more HSV intervals.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<HsvInterval>", into = "Vec<HsvInterval>")]
pub struct ColorRange {
    intervals: Vec<HsvInterval>,
}

impl ColorRange {
    /// Build a validated range.
    pub fn new(intervals: Vec<HsvInterval>) -> Result<Self, ColorRangeError> {
        if intervals.is_empty() {
            return Err(ColorRangeError::Empty);
        }
        for (index, iv) in intervals.iter().enumerate() {
            if (0..3).any(|c| iv.lo[c] > iv.hi[c]) {
                return Err(ColorRangeError::InvertedBounds {
                    index,
                    lo: iv.lo,
                    hi: iv.hi,
                });
            }
        }
        Ok(Self { intervals })
    }

    /// Build a range from intervals known to be non-empty with `lo <= hi`.
    pub fn from_trusted(intervals: Vec<HsvInterval>) -> Self {
        debug_assert!(Self::new(intervals.clone()).is_ok());
        Self { intervals }
    }

    pub fn intervals(&self) -> &[HsvInterval] {
        &self.intervals
    }

    /// True when `hsv` falls inside any interval.
    #[inline]
    pub fn contains(&self, hsv: [u8; 3]) -> bool {
        self.intervals.iter().any(|iv| iv.contains(hsv))
    }

    /// Binary mask (`0` / [`MASK_ON`]) of the pixels inside this range.
    pub fn in_range(&self, hsv: &HsvImage) -> GrayImage {
        let (w, h) = hsv.dimensions();
        GrayImage::from_fn(w, h, |x, y| {
            if self.contains(hsv.get_pixel(x, y).0) {
                Luma([MASK_ON])
            } else {
                Luma([0])
            }
        })
    }
}

impl TryFrom<Vec<HsvInterval>> for ColorRange {
    type Error = ColorRangeError;

    fn try_from(intervals: Vec<HsvInterval>) -> Result<Self, Self::Error> {
        Self::new(intervals)
    }
}

impl From<ColorRange> for Vec<HsvInterval> {
    fn from(range: ColorRange) -> Self {
        range.intervals
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn red() -> ColorRange {
        ColorRange::new(vec![
            HsvInterval::new([145, 0, 160], [180, 255, 255]),
            HsvInterval::new([0, 0, 160], [10, 255, 255]),
        ])
        .expect("valid range")
    }

    #[test]
    fn union_of_intervals_covers_hue_wraparound() {
        let range = red();
        assert!(range.contains([2, 200, 200]));
        assert!(range.contains([170, 200, 200]));
        assert!(!range.contains([60, 200, 200]));
        assert!(!range.contains([2, 200, 100]));
    }

    #[test]
    fn rejects_empty_and_inverted_ranges() {
        assert_eq!(ColorRange::new(Vec::new()), Err(ColorRangeError::Empty));
        let err = ColorRange::new(vec![HsvInterval::new([10, 0, 0], [5, 255, 255])]).unwrap_err();
        assert!(matches!(err, ColorRangeError::InvertedBounds { index: 0, .. }));
    }

    #[test]
    fn in_range_marks_matching_pixels() {
        let mut hsv = HsvImage::new(2, 1);
        hsv.put_pixel(0, 0, Rgb([5, 100, 200]));
        hsv.put_pixel(1, 0, Rgb([90, 100, 200]));
        let mask = red().in_range(&hsv);
        assert_eq!(mask.get_pixel(0, 0).0[0], MASK_ON);
        assert_eq!(mask.get_pixel(1, 0).0[0], 0);
    }

    #[test]
    fn deserialization_validates_intervals() {
        let ok: ColorRange = serde_json::from_str(r#"[{"lo":[90,40,180],"hi":[125,255,255]}]"#)
            .expect("valid json range");
        assert_eq!(ok.intervals().len(), 1);
        let bad = serde_json::from_str::<ColorRange>(r#"[]"#);
        assert!(bad.is_err());
    }
}
