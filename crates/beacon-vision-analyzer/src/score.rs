//! Heuristic candidate scoring.
//!
//! A [`Score`] is a pure value: the measured errors, button counts and the
//! awards earned. The short code string (`"ADLR"`, `"A2"`, …) is derived from
//! the awards by [`Score::code`].

use std::fmt;

use beacon_vision_core::RotatedRect;
use serde::Serialize;

use crate::params::ScoreParams;

/// One scoring criterion that was met.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum ScoreAward {
    /// Bounds match one of the reference aspect ratios.
    #[serde(rename = "A")]
    Aspect,
    /// Left and right regions have similar areas.
    #[serde(rename = "D")]
    AreaSymmetry,
    /// Single region carrying exactly two buttons.
    #[serde(rename = "2")]
    TwoButtons,
    /// Single region carrying some other non-zero number of buttons.
    #[serde(rename = "?")]
    SomeButtons,
    #[serde(rename = "L")]
    LeftButton,
    #[serde(rename = "L?")]
    LeftButtons,
    #[serde(rename = "R")]
    RightButton,
    #[serde(rename = "R?")]
    RightButtons,
}

impl ScoreAward {
    pub fn code(self) -> &'static str {
        match self {
            ScoreAward::Aspect => "A",
            ScoreAward::AreaSymmetry => "D",
            ScoreAward::TwoButtons => "2",
            ScoreAward::SomeButtons => "?",
            ScoreAward::LeftButton => "L",
            ScoreAward::LeftButtons => "L?",
            ScoreAward::RightButton => "R",
            ScoreAward::RightButtons => "R?",
        }
    }

    pub fn points(self) -> u32 {
        match self {
            ScoreAward::Aspect => 2,
            ScoreAward::AreaSymmetry => 1,
            ScoreAward::TwoButtons => 4,
            ScoreAward::SomeButtons => 1,
            ScoreAward::LeftButton | ScoreAward::RightButton => 2,
            ScoreAward::LeftButtons | ScoreAward::RightButtons => 1,
        }
    }
}

/// Squared deviation of the bounds' aspect from `ratio`, in either orientation.
///
/// Degenerate bounds yield `f64::MAX`.
pub fn aspect_ratio_error(width: f64, height: f64, ratio: f64) -> f64 {
    if !(width.is_finite() && height.is_finite()) || width <= 0.0 || height <= 0.0 {
        return f64::MAX;
    }
    let wide = (width / height - ratio).powi(2);
    let tall = (height / width - ratio).powi(2);
    wide.min(tall)
}

/// Best aspect error against the full and the bottom-hidden beacon shapes.
pub fn aspect_error(width: f64, height: f64, params: &ScoreParams) -> f64 {
    aspect_ratio_error(width, height, params.full_ratio())
        .min(aspect_ratio_error(width, height, params.partial_ratio()))
}

/// Squared area difference of the two halves, relative to the bounds' area.
pub fn area_symmetry_error(left_area: f64, right_area: f64, width: f64, height: f64) -> f64 {
    let bounds_area = width * height;
    if !bounds_area.is_finite() || bounds_area <= 0.0 {
        return f64::MAX;
    }
    ((left_area - right_area) / bounds_area).powi(2)
}

/// Result of scoring one candidate.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Score {
    pub ratio_error: f64,
    /// `None` for single-region candidates.
    pub area_error: Option<f64>,
    pub left_buttons: usize,
    /// `None` for single-region candidates.
    pub right_buttons: Option<usize>,
    pub awards: Vec<ScoreAward>,
    pub points: u32,
}

impl Score {
    /// Score a single-region candidate.
    pub fn single(bounds: &RotatedRect, buttons: usize, params: &ScoreParams) -> Self {
        let ratio_error = aspect_error(bounds.width() as f64, bounds.height() as f64, params);
        let mut awards = Vec::new();
        if ratio_error < params.ratio_tolerance {
            awards.push(ScoreAward::Aspect);
        }
        match buttons {
            0 => {}
            2 => awards.push(ScoreAward::TwoButtons),
            _ => awards.push(ScoreAward::SomeButtons),
        }
        Self::from_awards(ratio_error, None, buttons, None, awards)
    }

    /// Score a two-region candidate whose halves are already ordered left to right.
    pub fn pair(
        bounds: &RotatedRect,
        left_area: f64,
        right_area: f64,
        left_buttons: usize,
        right_buttons: usize,
        params: &ScoreParams,
    ) -> Self {
        let (w, h) = (bounds.width() as f64, bounds.height() as f64);
        let ratio_error = aspect_error(w, h, params);
        let area_error = area_symmetry_error(left_area, right_area, w, h);

        let mut awards = Vec::new();
        if ratio_error < params.ratio_tolerance {
            awards.push(ScoreAward::Aspect);
        }
        if area_error < params.area_tolerance {
            awards.push(ScoreAward::AreaSymmetry);
        }
        match left_buttons {
            0 => {}
            1 => awards.push(ScoreAward::LeftButton),
            _ => awards.push(ScoreAward::LeftButtons),
        }
        match right_buttons {
            0 => {}
            1 => awards.push(ScoreAward::RightButton),
            _ => awards.push(ScoreAward::RightButtons),
        }
        Self::from_awards(
            ratio_error,
            Some(area_error),
            left_buttons,
            Some(right_buttons),
            awards,
        )
    }

    fn from_awards(
        ratio_error: f64,
        area_error: Option<f64>,
        left_buttons: usize,
        right_buttons: Option<usize>,
        awards: Vec<ScoreAward>,
    ) -> Self {
        let points = awards.iter().map(|a| a.points()).sum();
        Self {
            ratio_error,
            area_error,
            left_buttons,
            right_buttons,
            awards,
            points,
        }
    }

    /// Concatenated award codes.
    pub fn code(&self) -> String {
        self.awards.iter().map(|a| a.code()).collect()
    }

    pub fn has(&self, award: ScoreAward) -> bool {
        self.awards.contains(&award)
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.points, self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::{Point2, Vector2};

    fn rect(w: f32, h: f32) -> RotatedRect {
        RotatedRect {
            center: Point2::new(100.0, 100.0),
            size: Vector2::new(w, h),
            angle: 0.0,
        }
    }

    #[test]
    fn aspect_error_is_orientation_free() {
        let p = ScoreParams::default();
        for (w, h) in [(85.0, 57.0), (30.0, 30.0), (12.0, 70.0)] {
            assert_relative_eq!(aspect_error(w, h, &p), aspect_error(h, w, &p));
        }
        let exact = aspect_ratio_error(85.0, 57.0, p.full_ratio());
        assert_relative_eq!(exact, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn square_error_uses_nearest_reference() {
        let p = ScoreParams::default();
        let full = (1.0 - p.full_ratio()).powi(2);
        let partial = (1.0 - p.partial_ratio()).powi(2);
        assert_relative_eq!(aspect_error(10.0, 10.0, &p), full.min(partial));
    }

    #[test]
    fn degenerate_bounds_get_maximal_error() {
        assert_eq!(aspect_ratio_error(0.0, 10.0, 1.5), f64::MAX);
        assert_eq!(aspect_ratio_error(10.0, f64::NAN, 1.5), f64::MAX);
        assert_eq!(area_symmetry_error(1.0, 2.0, 0.0, 5.0), f64::MAX);
        let s = Score::single(&rect(0.0, 0.0), 0, &ScoreParams::default());
        assert!(s.awards.is_empty());
        assert_eq!(s.points, 0);
    }

    #[test]
    fn single_region_awards() {
        let p = ScoreParams::default();
        let s = Score::single(&rect(85.0, 46.0), 2, &p);
        assert_eq!(s.code(), "A2");
        assert_eq!(s.points, 6);
        assert_eq!(s.area_error, None);
        assert_eq!(s.right_buttons, None);

        let s = Score::single(&rect(40.0, 40.0), 3, &p);
        assert_eq!(s.code(), "?");
        assert_eq!(s.points, 1);
        assert!(!s.has(ScoreAward::LeftButton));
    }

    #[test]
    fn symmetric_pair_with_one_button_each() {
        let p = ScoreParams::default();
        let s = Score::pair(&rect(85.0, 57.0), 2000.0, 2000.0, 1, 1, &p);
        assert_eq!(s.area_error, Some(0.0));
        assert_eq!(s.code(), "ADLR");
        assert_eq!(s.points, 7);
        assert_eq!(s.to_string(), "7 (ADLR)");
    }

    #[test]
    fn pair_with_many_buttons_gets_uncertain_codes() {
        let p = ScoreParams::default();
        let s = Score::pair(&rect(40.0, 40.0), 100.0, 900.0, 3, 0, &p);
        assert_eq!(s.code(), "L?");
        assert_eq!(s.points, 1);
        assert_eq!(s.right_buttons, Some(0));
    }

    #[test]
    fn awards_serialize_as_codes() {
        let json = serde_json::to_string(&[ScoreAward::Aspect, ScoreAward::RightButtons])
            .expect("json");
        assert_eq!(json, r#"["A","R?"]"#);
    }
}
