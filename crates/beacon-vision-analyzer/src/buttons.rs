//! Button (small dark circle) detection inside a colored region.

use std::fmt;
use std::str::FromStr;

use beacon_vision_core::{
    bitwise_and, count_nonzero, fit_ellipse, gaussian_blur, Circle, PixelPoint, MASK_ON,
};
use image::GrayImage;
use imageproc::contrast::otsu_level;
use imageproc::distance_transform::Norm;
use imageproc::edges::canny;
use imageproc::morphology::open;
use log::debug;
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use crate::debug::{DebugStage, Intermediates};
use crate::hough::hough_circles;
use crate::params::{EllipseButtonParams, HoughButtonParams};
use crate::region::BeaconColor;
use crate::segment::outer_contours;
use crate::AnalyzeError;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// How buttons are located in the thresholded region image.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ButtonStrategy {
    /// Contour tracing on edges followed by an ellipse fit per contour.
    #[default]
    Ellipse,
    /// Gradient Hough circle transform.
    Hough,
}

impl ButtonStrategy {
    pub fn as_str(self) -> &'static str {
        match self {
            ButtonStrategy::Ellipse => "ellipse",
            ButtonStrategy::Hough => "hough",
        }
    }
}

impl fmt::Display for ButtonStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ButtonStrategy {
    type Err = AnalyzeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ellipse" => Ok(ButtonStrategy::Ellipse),
            "hough" => Ok(ButtonStrategy::Hough),
            _ => Err(AnalyzeError::UnknownButtonStrategy(s.to_string())),
        }
    }
}

/// Keep only dark blobs that lie inside `mask`.
///
/// The grayscale frame is clipped to the mask, thresholded with an inverted
/// Otsu level and clipped again so the zeroed outside does not survive.
pub fn prepare_button_input(gray: &GrayImage, mask: &GrayImage) -> GrayImage {
    let clipped = bitwise_and(gray, mask);
    let level = otsu_level(&clipped);
    let mut inv = clipped;
    for p in inv.pixels_mut() {
        p.0[0] = if p.0[0] <= level { MASK_ON } else { 0 };
    }
    bitwise_and(&inv, mask)
}

/// Run the selected strategy on a prepared button image.
///
/// `color` only labels the debug images.
#[cfg_attr(
    feature = "tracing",
    instrument(
        level = "debug",
        skip(input, ellipse, hough, intermediates),
        fields(strategy = %strategy)
    )
)]
pub fn find_buttons(
    input: &GrayImage,
    strategy: ButtonStrategy,
    ellipse: &EllipseButtonParams,
    hough: &HoughButtonParams,
    color: BeaconColor,
    intermediates: &mut Intermediates,
) -> Vec<Circle> {
    let buttons = match strategy {
        ButtonStrategy::Ellipse => find_buttons_ellipse(input, ellipse, color, intermediates),
        ButtonStrategy::Hough => find_buttons_hough(input, hough),
    };
    debug!("{color}: {} button(s) via {strategy}", buttons.len());
    buttons
}

/// Gaussian blur followed by the Hough transform.
pub fn find_buttons_hough(input: &GrayImage, params: &HoughButtonParams) -> Vec<Circle> {
    let blurred = gaussian_blur(input, params.blur_size, params.blur_sigma);
    hough_circles(&blurred, params)
}

/// Open, blur and edge-detect, then fit an ellipse to every round-ish contour.
pub fn find_buttons_ellipse(
    input: &GrayImage,
    params: &EllipseButtonParams,
    color: BeaconColor,
    intermediates: &mut Intermediates,
) -> Vec<Circle> {
    let nonzero = count_nonzero(input);
    intermediates.record(DebugStage::ButtonInput, color, || input.clone());
    if nonzero == 0 {
        return Vec::new();
    }

    let open_size = params.open_size_for(nonzero);
    let smooth = open(input, Norm::LInf, ((open_size.saturating_sub(1)) / 2) as u8);
    intermediates.record(DebugStage::ButtonSmooth, color, || smooth.clone());
    let blurred = gaussian_blur(&smooth, params.blur_size, params.blur_sigma);
    let (low, high) = if params.canny_low <= params.canny_high {
        (params.canny_low, params.canny_high)
    } else {
        (params.canny_high, params.canny_low)
    };
    let edges = canny(&blurred, low, high);
    intermediates.record(DebugStage::ButtonEdges, color, || edges.clone());

    outer_contours(&edges)
        .iter()
        .filter_map(|contour| circle_from_contour(contour, params))
        .collect()
}

fn circle_from_contour(contour: &[PixelPoint], params: &EllipseButtonParams) -> Option<Circle> {
    if contour.len() < params.min_contour_points {
        return None;
    }
    let (min_x, max_x) = contour
        .iter()
        .fold((i32::MAX, i32::MIN), |(lo, hi), p| (lo.min(p.x), hi.max(p.x)));
    let (min_y, max_y) = contour
        .iter()
        .fold((i32::MAX, i32::MIN), |(lo, hi), p| (lo.min(p.y), hi.max(p.y)));
    let eccentricity = (max_x - min_x + 1) as f32 / (max_y - min_y + 1) as f32;
    if (eccentricity - 1.0).abs() > params.max_eccentricity_dev {
        return None;
    }

    let pts: Vec<[f64; 2]> = contour.iter().map(|p| [p.x as f64, p.y as f64]).collect();
    let ellipse = fit_ellipse(&pts)?;
    let radius = ((ellipse.width() + ellipse.height()) / 4.0) as f32;
    if radius <= params.min_radius {
        return None;
    }
    Some(Circle::new(
        Point2::new(ellipse.cx as f32, ellipse.cy as f32),
        (radius + 0.5).floor(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    fn dark_disks_in_block(disks: &[(i32, i32, i32)]) -> (GrayImage, GrayImage) {
        let gray = GrayImage::from_fn(200, 140, |x, y| {
            let dark = disks.iter().any(|&(cx, cy, r)| {
                let (dx, dy) = (x as i32 - cx, y as i32 - cy);
                dx * dx + dy * dy <= r * r
            });
            Luma([if dark { 10 } else { 70 }])
        });
        let mask = GrayImage::from_fn(200, 140, |x, y| {
            let inside = (20..180).contains(&x) && (20..120).contains(&y);
            Luma([if inside { MASK_ON } else { 0 }])
        });
        (gray, mask)
    }

    #[test]
    fn strategy_parsing() {
        assert_eq!("ellipse".parse::<ButtonStrategy>().ok(), Some(ButtonStrategy::Ellipse));
        assert_eq!(" Hough ".parse::<ButtonStrategy>().ok(), Some(ButtonStrategy::Hough));
        let err = "template".parse::<ButtonStrategy>().unwrap_err();
        assert!(matches!(err, AnalyzeError::UnknownButtonStrategy(ref s) if s == "template"));
        assert_eq!(ButtonStrategy::default().to_string(), "ellipse");
    }

    #[test]
    fn preparation_keeps_dark_blobs_inside_mask() {
        let (gray, mask) = dark_disks_in_block(&[(60, 70, 15)]);
        let input = prepare_button_input(&gray, &mask);
        assert_eq!(input.get_pixel(60, 70).0[0], MASK_ON);
        assert_eq!(input.get_pixel(120, 70).0[0], 0);
        assert_eq!(input.get_pixel(5, 5).0[0], 0);
    }

    #[test]
    fn ellipse_strategy_recovers_disks() {
        let (gray, mask) = dark_disks_in_block(&[(60, 70, 15), (140, 70, 12)]);
        let input = prepare_button_input(&gray, &mask);
        let mut debug = Intermediates::new(true);
        let mut found = find_buttons_ellipse(
            &input,
            &EllipseButtonParams::default(),
            BeaconColor::Red,
            &mut debug,
        );
        found.sort_by(|a, b| a.center.x.total_cmp(&b.center.x));
        assert_eq!(found.len(), 2, "{found:?}");
        assert!((found[0].center - Point2::new(60.0, 70.0)).norm() < 2.0);
        assert!((found[0].radius - 15.0).abs() <= 2.0);
        assert!((found[1].center - Point2::new(140.0, 70.0)).norm() < 2.0);
        assert_eq!(found[1].radius.fract(), 0.0);
        assert!(debug.get(DebugStage::ButtonEdges, BeaconColor::Red).is_some());
    }

    #[test]
    fn empty_input_has_no_buttons() {
        let mut debug = Intermediates::new(false);
        let input = GrayImage::new(40, 40);
        for strategy in [ButtonStrategy::Ellipse, ButtonStrategy::Hough] {
            let found = find_buttons(
                &input,
                strategy,
                &EllipseButtonParams::default(),
                &HoughButtonParams::default(),
                BeaconColor::Blue,
                &mut debug,
            );
            assert!(found.is_empty());
        }
        assert!(debug.is_empty());
    }

    #[test]
    fn elongated_contours_are_rejected() {
        let bar: Vec<PixelPoint> = (0..40)
            .map(|x| PixelPoint::new(x, 0))
            .chain((0..40).rev().map(|x| PixelPoint::new(x, 5)))
            .collect();
        assert!(circle_from_contour(&bar, &EllipseButtonParams::default()).is_none());
    }
}
