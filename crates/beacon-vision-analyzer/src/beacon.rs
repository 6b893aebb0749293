//! Beacon candidates: one region or an ordered left/right pair, with bounds and score.

use std::cmp::Ordering;
use std::sync::Arc;

use beacon_vision_core::{Circle, PixelPoint, RotatedRect};
use serde::Serialize;

use crate::params::{PairBounds, ScoreParams};
use crate::region::{BeaconColor, BeaconRegion};
use crate::score::Score;

#[derive(Clone, Debug)]
enum Halves {
    Single(Arc<BeaconRegion>),
    Pair {
        left: Arc<BeaconRegion>,
        right: Arc<BeaconRegion>,
    },
}

/// A scored beacon candidate.
#[derive(Clone, Debug)]
pub struct Beacon {
    halves: Halves,
    bounds: RotatedRect,
    score: Score,
}

impl Beacon {
    /// Candidate made of a single region, e.g. when the other half is occluded.
    pub fn single(region: Arc<BeaconRegion>, params: &ScoreParams) -> Self {
        let bounds = *region.bounds();
        let score = Score::single(&bounds, region.buttons().len(), params);
        Self {
            halves: Halves::Single(region),
            bounds,
            score,
        }
    }

    /// Candidate made of two regions, ordered by the x coordinate of their centers.
    ///
    /// On a tie `b` goes on the left.
    pub fn pair(
        a: Arc<BeaconRegion>,
        b: Arc<BeaconRegion>,
        mode: PairBounds,
        params: &ScoreParams,
    ) -> Self {
        let (left, right) = if a.bounds().center.x < b.bounds().center.x {
            (a, b)
        } else {
            (b, a)
        };
        let bounds = match mode {
            PairBounds::ContourUnion => {
                let points: Vec<PixelPoint> = left
                    .contour()
                    .iter()
                    .chain(right.contour())
                    .copied()
                    .collect();
                RotatedRect::fit(&points)
            }
            PairBounds::RectUnion => left.bounds().union(right.bounds()),
        };
        let score = Score::pair(
            &bounds,
            left.area(),
            right.area(),
            left.buttons().len(),
            right.buttons().len(),
            params,
        );
        Self {
            halves: Halves::Pair { left, right },
            bounds,
            score,
        }
    }

    pub fn is_partial(&self) -> bool {
        matches!(self.halves, Halves::Single(_))
    }

    /// Left region; the only region of a partial candidate.
    pub fn left(&self) -> &BeaconRegion {
        match &self.halves {
            Halves::Single(r) => r,
            Halves::Pair { left, .. } => left,
        }
    }

    /// Right region; the only region of a partial candidate.
    pub fn right(&self) -> &BeaconRegion {
        match &self.halves {
            Halves::Single(r) => r,
            Halves::Pair { right, .. } => right,
        }
    }

    pub fn regions(&self) -> Vec<&BeaconRegion> {
        match &self.halves {
            Halves::Single(r) => vec![r.as_ref()],
            Halves::Pair { left, right } => vec![left.as_ref(), right.as_ref()],
        }
    }

    pub fn bounds(&self) -> &RotatedRect {
        &self.bounds
    }

    /// Buttons of all regions, left first.
    pub fn buttons(&self) -> Vec<Circle> {
        self.regions()
            .into_iter()
            .flat_map(|r| r.buttons().iter().copied())
            .collect()
    }

    pub fn score(&self) -> &Score {
        &self.score
    }

    pub fn points(&self) -> u32 {
        self.score.points
    }

    pub fn code(&self) -> String {
        self.score.code()
    }

    pub fn colors(&self) -> (BeaconColor, BeaconColor) {
        (self.left().color(), self.right().color())
    }

    /// `"LEFT/RIGHT"` color names; partial candidates repeat their color.
    pub fn color_label(&self) -> String {
        let (l, r) = self.colors();
        format!("{l}/{r}")
    }

    /// Area of the bounding rectangle.
    pub fn area(&self) -> f64 {
        self.bounds.width() as f64 * self.bounds.height() as f64
    }

    pub fn summary(&self) -> BeaconSummary {
        BeaconSummary {
            colors: self.color_label(),
            partial: self.is_partial(),
            center: [self.bounds.center.x, self.bounds.center.y],
            size: [self.bounds.width(), self.bounds.height()],
            angle: self.bounds.angle,
            area: self.area(),
            points: self.points(),
            code: self.code(),
            score: self.score.clone(),
            buttons: self.buttons(),
        }
    }
}

/// Flat, serializable view of a [`Beacon`].
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BeaconSummary {
    pub colors: String,
    pub partial: bool,
    pub center: [f32; 2],
    pub size: [f32; 2],
    /// Degrees.
    pub angle: f32,
    pub area: f64,
    pub points: u32,
    pub code: String,
    pub score: Score,
    pub buttons: Vec<Circle>,
}

/// All single and pairwise candidates of `regions`.
///
/// For `n` regions this yields `n (n + 1) / 2` candidates: for each `i`, the
/// pairs `(i, j)` with `j < i` followed by the single candidate `i`.
pub fn enumerate_candidates(
    regions: &[Arc<BeaconRegion>],
    mode: PairBounds,
    params: &ScoreParams,
) -> Vec<Beacon> {
    let n = regions.len();
    let mut out = Vec::with_capacity(n * (n + 1) / 2);
    for i in 0..n {
        for j in 0..=i {
            let candidate = if i == j {
                Beacon::single(Arc::clone(&regions[i]), params)
            } else {
                Beacon::pair(Arc::clone(&regions[i]), Arc::clone(&regions[j]), mode, params)
            };
            out.push(candidate);
        }
    }
    out
}

/// Largest bounding area first.
pub fn sort_by_area_desc(beacons: &mut [Beacon]) {
    beacons.sort_by(|a, b| b.area().partial_cmp(&a.area()).unwrap_or(Ordering::Equal));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::region::ColorRegion;
    use approx::assert_relative_eq;
    use nalgebra::Point2;

    fn rect_region(x0: i32, y0: i32, w: i32, h: i32, color: BeaconColor) -> BeaconRegion {
        let contour = vec![
            PixelPoint::new(x0, y0),
            PixelPoint::new(x0 + w, y0),
            PixelPoint::new(x0 + w, y0 + h),
            PixelPoint::new(x0, y0 + h),
        ];
        BeaconRegion::new(ColorRegion::new(contour), color)
    }

    #[test]
    fn pair_orders_by_center_x() {
        let p = ScoreParams::default();
        let red = Arc::new(rect_region(0, 0, 40, 57, BeaconColor::Red));
        let blue = Arc::new(rect_region(45, 0, 40, 57, BeaconColor::Blue));
        for beacon in [
            Beacon::pair(Arc::clone(&red), Arc::clone(&blue), PairBounds::ContourUnion, &p),
            Beacon::pair(Arc::clone(&blue), Arc::clone(&red), PairBounds::ContourUnion, &p),
        ] {
            assert!(beacon.left().bounds().center.x <= beacon.right().bounds().center.x);
            assert_eq!(beacon.color_label(), "RED/BLUE");
            assert!(!beacon.is_partial());
        }
    }

    #[test]
    fn tie_puts_second_argument_left() {
        let p = ScoreParams::default();
        let a = Arc::new(rect_region(0, 0, 20, 20, BeaconColor::Blue));
        let b = Arc::new(rect_region(0, 40, 20, 20, BeaconColor::Red));
        let beacon = Beacon::pair(a, b, PairBounds::ContourUnion, &p);
        assert_eq!(beacon.colors(), (BeaconColor::Red, BeaconColor::Blue));
    }

    #[test]
    fn stacked_regions_keep_pool_order() {
        let p = ScoreParams::default();
        let regions = vec![
            Arc::new(rect_region(0, 0, 20, 20, BeaconColor::Red)),
            Arc::new(rect_region(0, 40, 20, 20, BeaconColor::Blue)),
        ];
        let candidates = enumerate_candidates(&regions, PairBounds::ContourUnion, &p);
        let pair = candidates
            .iter()
            .find(|b| !b.is_partial())
            .expect("one pair");
        assert_eq!(pair.color_label(), "RED/BLUE");
    }

    #[test]
    fn equal_halves_get_aspect_and_symmetry() {
        let p = ScoreParams::default();
        let red = Arc::new(rect_region(0, 0, 40, 57, BeaconColor::Red));
        let blue = Arc::new(rect_region(45, 0, 40, 57, BeaconColor::Blue));
        for mode in [PairBounds::ContourUnion, PairBounds::RectUnion] {
            let beacon = Beacon::pair(Arc::clone(&red), Arc::clone(&blue), mode, &p);
            let long_side = beacon.bounds().width().max(beacon.bounds().height());
            assert_relative_eq!(long_side, 85.0, epsilon = 1e-3);
            assert_eq!(beacon.score().area_error, Some(0.0));
            assert_eq!(beacon.code(), "AD");
            assert!(beacon.points() >= 3);
        }
    }

    #[test]
    fn partial_never_reports_right_buttons() {
        let p = ScoreParams::default();
        let mut region = rect_region(0, 0, 85, 46, BeaconColor::Red);
        region.add_button(Circle::new(Point2::new(20.0, 20.0), 5.0));
        let beacon = Beacon::single(Arc::new(region), &p);
        assert!(beacon.is_partial());
        assert_eq!(beacon.score().right_buttons, None);
        assert_eq!(beacon.code(), "A?");
        assert_eq!(beacon.color_label(), "RED/RED");
        assert_eq!(beacon.buttons().len(), 1);
    }

    #[test]
    fn enumeration_counts() {
        let p = ScoreParams::default();
        let regions: Vec<Arc<BeaconRegion>> = (0..4)
            .map(|k| Arc::new(rect_region(k * 50, 0, 30, 30, BeaconColor::Red)))
            .collect();
        let all = enumerate_candidates(&regions, PairBounds::default(), &p);
        assert_eq!(all.len(), 10);
        assert_eq!(all.iter().filter(|b| b.is_partial()).count(), 4);
        assert!(enumerate_candidates(&[], PairBounds::default(), &p).is_empty());
    }

    #[test]
    fn sorting_puts_largest_first() {
        let p = ScoreParams::default();
        let mut beacons = vec![
            Beacon::single(Arc::new(rect_region(0, 0, 10, 10, BeaconColor::Red)), &p),
            Beacon::single(Arc::new(rect_region(0, 0, 50, 30, BeaconColor::Blue)), &p),
            Beacon::single(Arc::new(rect_region(0, 0, 20, 20, BeaconColor::Red)), &p),
        ];
        sort_by_area_desc(&mut beacons);
        let areas: Vec<f64> = beacons.iter().map(|b| b.area().round()).collect();
        assert_eq!(areas, vec![1500.0, 400.0, 100.0]);
    }

    #[test]
    fn summary_serializes() {
        let p = ScoreParams::default();
        let beacon = Beacon::single(Arc::new(rect_region(0, 0, 85, 46, BeaconColor::Blue)), &p);
        let json = serde_json::to_value(beacon.summary()).expect("json");
        assert_eq!(json["colors"], "BLUE/BLUE");
        assert_eq!(json["code"], "A");
        assert_eq!(json["score"]["right_buttons"], serde_json::Value::Null);
    }
}
