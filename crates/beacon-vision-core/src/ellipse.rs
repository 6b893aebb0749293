//! Least-squares ellipse fitting.
//!
//! The conic `A x² + B xy + C y² + D x + E y + F = 0` is fitted with the
//! rotation-invariant normalization `A + C = 1` on centred, scaled points,
//! then converted to geometric parameters.

use nalgebra::{DMatrix, DVector, Matrix2, SymmetricEigen, Vector2};
use serde::{Deserialize, Serialize};

/// Geometric ellipse.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ellipse {
    pub cx: f64,
    pub cy: f64,
    /// Semi-major axis.
    pub a: f64,
    /// Semi-minor axis.
    pub b: f64,
    /// Major-axis angle from +x, radians.
    pub angle: f64,
}

impl Ellipse {
    /// Full extent along the major axis.
    pub fn width(&self) -> f64 {
        2.0 * self.a
    }

    /// Full extent along the minor axis.
    pub fn height(&self) -> f64 {
        2.0 * self.b
    }

    pub fn sample_points(&self, n: usize) -> Vec<[f64; 2]> {
        let (sin, cos) = self.angle.sin_cos();
        (0..n)
            .map(|i| {
                let t = std::f64::consts::TAU * i as f64 / n as f64;
                let (x, y) = (self.a * t.cos(), self.b * t.sin());
                [self.cx + x * cos - y * sin, self.cy + x * sin + y * cos]
            })
            .collect()
    }
}

/// Fit an ellipse to at least five points.
///
/// Returns `None` for too few points, a singular design or a conic that is
/// not a real ellipse.
pub fn fit_ellipse(points: &[[f64; 2]]) -> Option<Ellipse> {
    let n = points.len();
    if n < 5 {
        return None;
    }

    let inv_n = 1.0 / n as f64;
    let mx = points.iter().map(|p| p[0]).sum::<f64>() * inv_n;
    let my = points.iter().map(|p| p[1]).sum::<f64>() * inv_n;
    let mean_dist = points
        .iter()
        .map(|p| ((p[0] - mx).powi(2) + (p[1] - my).powi(2)).sqrt())
        .sum::<f64>()
        * inv_n;
    if mean_dist <= 1e-12 {
        return None;
    }
    let s = std::f64::consts::SQRT_2 / mean_dist;

    // With C = 1 - A:  A (x² - y²) + B xy + D x + E y + F = -y²
    let mut design = DMatrix::<f64>::zeros(n, 5);
    let mut rhs = DVector::<f64>::zeros(n);
    for (i, p) in points.iter().enumerate() {
        let x = (p[0] - mx) * s;
        let y = (p[1] - my) * s;
        design[(i, 0)] = x * x - y * y;
        design[(i, 1)] = x * y;
        design[(i, 2)] = x;
        design[(i, 3)] = y;
        design[(i, 4)] = 1.0;
        rhs[i] = -y * y;
    }

    let sol = design.svd(true, true).solve(&rhs, 1e-12).ok()?;
    let (a, b, d, e, f) = (sol[0], sol[1], sol[2], sol[3], sol[4]);
    let c = 1.0 - a;

    if b * b - 4.0 * a * c >= 0.0 {
        return None;
    }

    // Center: gradient of the conic vanishes.
    let jac = Matrix2::new(2.0 * a, b, b, 2.0 * c);
    let center = jac.try_inverse()? * Vector2::new(-d, -e);
    let (x0, y0) = (center.x, center.y);
    let f0 = a * x0 * x0 + b * x0 * y0 + c * y0 * y0 + d * x0 + e * y0 + f;

    let quad = Matrix2::new(a, 0.5 * b, 0.5 * b, c);
    let eig = SymmetricEigen::new(quad);
    let (l0, l1) = (eig.eigenvalues[0], eig.eigenvalues[1]);
    let r0 = -f0 / l0;
    let r1 = -f0 / l1;
    if !(r0 > 0.0 && r1 > 0.0 && r0.is_finite() && r1.is_finite()) {
        return None;
    }
    let (ax0, ax1) = (r0.sqrt(), r1.sqrt());

    let (major, minor, dir) = if ax0 >= ax1 {
        (ax0, ax1, eig.eigenvectors.column(0).into_owned())
    } else {
        (ax1, ax0, eig.eigenvectors.column(1).into_owned())
    };
    let mut angle = dir[1].atan2(dir[0]);
    if angle > std::f64::consts::FRAC_PI_2 {
        angle -= std::f64::consts::PI;
    } else if angle <= -std::f64::consts::FRAC_PI_2 {
        angle += std::f64::consts::PI;
    }

    Some(Ellipse {
        cx: x0 / s + mx,
        cy: y0 / s + my,
        a: major / s,
        b: minor / s,
        angle,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn recovers_rotated_ellipse() {
        let truth = Ellipse {
            cx: 100.0,
            cy: 80.0,
            a: 30.0,
            b: 15.0,
            angle: 0.3,
        };
        let fit = fit_ellipse(&truth.sample_points(60)).expect("fit");
        assert_relative_eq!(fit.cx, truth.cx, epsilon = 1e-6);
        assert_relative_eq!(fit.cy, truth.cy, epsilon = 1e-6);
        assert_relative_eq!(fit.a, truth.a, epsilon = 1e-6);
        assert_relative_eq!(fit.b, truth.b, epsilon = 1e-6);
        assert_relative_eq!(fit.angle, truth.angle, epsilon = 1e-6);
    }

    #[test]
    fn circle_from_pixel_ring() {
        let pts: Vec<[f64; 2]> = (0..40)
            .map(|i| {
                let t = std::f64::consts::TAU * i as f64 / 40.0;
                [(50.0 + 12.0 * t.cos()).round(), (60.0 + 12.0 * t.sin()).round()]
            })
            .collect();
        let fit = fit_ellipse(&pts).expect("fit");
        assert_relative_eq!(fit.cx, 50.0, epsilon = 0.2);
        assert_relative_eq!(fit.cy, 60.0, epsilon = 0.2);
        assert_relative_eq!((fit.width() + fit.height()) / 4.0, 12.0, epsilon = 0.3);
    }

    #[test]
    fn rejects_too_few_or_collinear_points() {
        assert!(fit_ellipse(&[[0.0, 0.0], [1.0, 1.0], [2.0, 2.0], [3.0, 3.0]]).is_none());
        let line: Vec<[f64; 2]> = (0..10).map(|i| [i as f64, 2.0 * i as f64]).collect();
        assert!(fit_ellipse(&line).is_none());
    }
}
