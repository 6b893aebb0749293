//! Planar geometry: circles, rotated and axis-aligned rectangles.

use imageproc::geometry::convex_hull;
use nalgebra::{Point2, Vector2};
use serde::{Deserialize, Serialize};

use crate::PixelPoint;

/// Circle in image coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    pub center: Point2<f32>,
    pub radius: f32,
}

impl Circle {
    pub fn new(center: Point2<f32>, radius: f32) -> Self {
        Self { center, radius }
    }
}

/// Integer axis-aligned rectangle; contains `[x, x + width) × [y, y + height)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IntRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl IntRect {
    #[inline]
    pub fn contains(&self, p: Point2<f32>) -> bool {
        let (x0, y0) = (self.x as f32, self.y as f32);
        x0 <= p.x
            && p.x < x0 + self.width as f32
            && y0 <= p.y
            && p.y < y0 + self.height as f32
    }
}

/// Rotated rectangle.
///
/// `size.x` is the extent along the direction given by `angle` (degrees,
/// counter-clockwise from +x in image coordinates), `size.y` the extent
/// perpendicular to it.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RotatedRect {
    pub center: Point2<f32>,
    pub size: Vector2<f32>,
    pub angle: f32,
}

impl RotatedRect {
    pub fn width(&self) -> f32 {
        self.size.x
    }

    pub fn height(&self) -> f32 {
        self.size.y
    }

    pub fn area(&self) -> f32 {
        self.size.x * self.size.y
    }

    /// Four corners, counter-clockwise starting from the "bottom-left" one.
    pub fn corners(&self) -> [Point2<f32>; 4] {
        let (sin, cos) = self.angle.to_radians().sin_cos();
        let u = Vector2::new(cos, sin) * (0.5 * self.size.x);
        let v = Vector2::new(-sin, cos) * (0.5 * self.size.y);
        let c = self.center;
        [c - u - v, c + u - v, c + u + v, c - u + v]
    }

    /// Smallest integer rectangle containing all corners.
    ///
    /// Corner coordinates within `1e-3` px of an integer snap to it, so that
    /// axis-aligned fits do not grow by a pixel from trigonometric noise.
    pub fn bounding_rect(&self) -> IntRect {
        const SNAP: f32 = 1e-3;
        let pts = self.corners().map(|p| {
            let snap = |v: f32| if (v - v.round()).abs() < SNAP { v.round() } else { v };
            Point2::new(snap(p.x), snap(p.y))
        });
        let min_x = pts.iter().map(|p| p.x).fold(f32::INFINITY, f32::min);
        let min_y = pts.iter().map(|p| p.y).fold(f32::INFINITY, f32::min);
        let max_x = pts.iter().map(|p| p.x).fold(f32::NEG_INFINITY, f32::max);
        let max_y = pts.iter().map(|p| p.y).fold(f32::NEG_INFINITY, f32::max);
        let x = min_x.floor() as i32;
        let y = min_y.floor() as i32;
        IntRect {
            x,
            y,
            width: max_x.ceil() as i32 - x + 1,
            height: max_y.ceil() as i32 - y + 1,
        }
    }

    /// Minimum-area rectangle enclosing `points` (rotating calipers over the hull).
    ///
    /// An empty input yields a zero-sized rectangle at the origin.
    pub fn fit(points: &[PixelPoint]) -> Self {
        if points.is_empty() {
            return Self::degenerate(Point2::origin());
        }
        let hull: Vec<Point2<f64>> = convex_hull(points)
            .iter()
            .map(|p| Point2::new(p.x as f64, p.y as f64))
            .collect();
        Self::fit_hull(&hull)
    }

    /// Minimum-area rectangle enclosing the corners of both rectangles.
    pub fn union(&self, other: &RotatedRect) -> Self {
        let pts: Vec<Point2<f64>> = self
            .corners()
            .iter()
            .chain(other.corners().iter())
            .map(|p| Point2::new(p.x as f64, p.y as f64))
            .collect();
        Self::fit_hull(&float_hull(&pts))
    }

    fn degenerate(center: Point2<f32>) -> Self {
        Self {
            center,
            size: Vector2::zeros(),
            angle: 0.0,
        }
    }

    fn fit_hull(hull: &[Point2<f64>]) -> Self {
        match hull.len() {
            0 => return Self::degenerate(Point2::origin()),
            1 => return Self::degenerate(hull[0].cast()),
            _ => {}
        }

        let mut best: Option<(f64, Self)> = None;
        for i in 0..hull.len() {
            let a = hull[i];
            let b = hull[(i + 1) % hull.len()];
            let edge = b - a;
            let len = edge.norm();
            if len <= f64::EPSILON {
                continue;
            }
            let u = edge / len;
            let v = Vector2::new(-u.y, u.x);

            let (mut min_u, mut max_u) = (f64::INFINITY, f64::NEG_INFINITY);
            let (mut min_v, mut max_v) = (f64::INFINITY, f64::NEG_INFINITY);
            for p in hull {
                let d = p - a;
                let pu = d.dot(&u);
                let pv = d.dot(&v);
                min_u = min_u.min(pu);
                max_u = max_u.max(pu);
                min_v = min_v.min(pv);
                max_v = max_v.max(pv);
            }
            let w = max_u - min_u;
            let h = max_v - min_v;
            let area = w * h;
            if best.as_ref().is_some_and(|(a_best, _)| *a_best <= area) {
                continue;
            }
            let center = a + u * (0.5 * (min_u + max_u)) + v * (0.5 * (min_v + max_v));
            let rect = Self {
                center: center.cast(),
                size: Vector2::new(w as f32, h as f32),
                angle: u.y.atan2(u.x).to_degrees() as f32,
            };
            best = Some((area, rect));
        }

        best.map(|(_, r)| r.normalized())
            .unwrap_or_else(|| Self::degenerate(hull[0].cast()))
    }

    /// Bring the angle into `(-90, 90]` without changing the covered region.
    fn normalized(mut self) -> Self {
        while self.angle > 90.0 {
            self.angle -= 180.0;
        }
        while self.angle <= -90.0 {
            self.angle += 180.0;
        }
        self
    }
}

/// Monotone-chain hull for float corner sets.
fn float_hull(points: &[Point2<f64>]) -> Vec<Point2<f64>> {
    let mut pts = points.to_vec();
    pts.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y)));
    pts.dedup();
    if pts.len() < 3 {
        return pts;
    }
    let cross = |o: Point2<f64>, a: Point2<f64>, b: Point2<f64>| {
        (a.x - o.x) * (b.y - o.y) - (a.y - o.y) * (b.x - o.x)
    };
    let mut hull: Vec<Point2<f64>> = Vec::with_capacity(pts.len() * 2);
    for pass in [pts.clone(), pts.iter().rev().copied().collect()] {
        let start = hull.len();
        for p in pass {
            while hull.len() >= start + 2
                && cross(hull[hull.len() - 2], hull[hull.len() - 1], p) <= 0.0
            {
                hull.pop();
            }
            hull.push(p);
        }
        hull.pop();
    }
    hull
}

/// Absolute polygon area of a closed contour (shoelace formula).
pub fn contour_area(points: &[PixelPoint]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let mut twice = 0i64;
    for (i, p) in points.iter().enumerate() {
        let q = points[(i + 1) % points.len()];
        twice += p.x as i64 * q.y as i64 - q.x as i64 * p.y as i64;
    }
    (twice.abs() as f64) * 0.5
}
