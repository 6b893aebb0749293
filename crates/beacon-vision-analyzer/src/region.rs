//! Color regions and their button sub-features.

use std::fmt;

use beacon_vision_core::{contour_area, Circle, PixelPoint, RotatedRect};
use serde::{Deserialize, Serialize};

/// Target color of a beacon half.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BeaconColor {
    Red,
    Blue,
}

impl BeaconColor {
    pub const ALL: [BeaconColor; 2] = [BeaconColor::Red, BeaconColor::Blue];

    pub fn as_str(self) -> &'static str {
        match self {
            BeaconColor::Red => "RED",
            BeaconColor::Blue => "BLUE",
        }
    }
}

impl fmt::Display for BeaconColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One connected same-color blob.
#[derive(Clone, Debug)]
pub struct ColorRegion {
    contour: Vec<PixelPoint>,
    area: f64,
    bounds: RotatedRect,
}

impl ColorRegion {
    pub fn new(contour: Vec<PixelPoint>) -> Self {
        let area = contour_area(&contour);
        let bounds = RotatedRect::fit(&contour);
        Self {
            contour,
            area,
            bounds,
        }
    }

    pub fn contour(&self) -> &[PixelPoint] {
        &self.contour
    }

    /// Polygon area enclosed by the contour.
    pub fn area(&self) -> f64 {
        self.area
    }

    pub fn bounds(&self) -> &RotatedRect {
        &self.bounds
    }
}

/// A color region labelled with its color and the buttons found inside it.
#[derive(Clone, Debug)]
pub struct BeaconRegion {
    region: ColorRegion,
    color: BeaconColor,
    buttons: Vec<Circle>,
}

impl BeaconRegion {
    pub fn new(region: ColorRegion, color: BeaconColor) -> Self {
        Self {
            region,
            color,
            buttons: Vec::new(),
        }
    }

    pub fn area(&self) -> f64 {
        self.region.area()
    }

    pub fn contour(&self) -> &[PixelPoint] {
        self.region.contour()
    }

    pub fn bounds(&self) -> &RotatedRect {
        self.region.bounds()
    }

    pub fn color(&self) -> BeaconColor {
        self.color
    }

    pub fn buttons(&self) -> &[Circle] {
        &self.buttons
    }

    pub fn add_button(&mut self, button: Circle) {
        self.buttons.push(button);
    }

    /// True when `button`'s center lies in the axis-aligned box of the bounds.
    pub fn covers(&self, button: &Circle) -> bool {
        self.bounds().bounding_rect().contains(button.center)
    }
}

/// Attach every button to each region whose bounding box holds its center.
///
/// A button inside overlapping boxes is attached to all of them.
pub fn assign_buttons(regions: &mut [BeaconRegion], buttons: &[Circle]) {
    for region in regions.iter_mut() {
        let rect = region.bounds().bounding_rect();
        for button in buttons {
            if rect.contains(button.center) {
                region.add_button(*button);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point2;

    fn square(x0: i32, y0: i32, side: i32) -> Vec<PixelPoint> {
        vec![
            PixelPoint::new(x0, y0),
            PixelPoint::new(x0 + side, y0),
            PixelPoint::new(x0 + side, y0 + side),
            PixelPoint::new(x0, y0 + side),
        ]
    }

    #[test]
    fn region_derives_area_and_bounds() {
        let r = ColorRegion::new(square(10, 10, 20));
        assert_eq!(r.area(), 400.0);
        assert!((r.bounds().center.x - 20.0).abs() < 1e-4);
    }

    #[test]
    fn buttons_go_to_every_covering_region() {
        let mut regions = vec![
            BeaconRegion::new(ColorRegion::new(square(0, 0, 20)), BeaconColor::Red),
            BeaconRegion::new(ColorRegion::new(square(10, 0, 20)), BeaconColor::Blue),
        ];
        let buttons = [
            Circle::new(Point2::new(5.0, 5.0), 3.0),
            Circle::new(Point2::new(15.0, 5.0), 3.0),
            Circle::new(Point2::new(100.0, 100.0), 3.0),
        ];
        assign_buttons(&mut regions, &buttons);
        assert_eq!(regions[0].buttons().len(), 2);
        assert_eq!(regions[1].buttons().len(), 1);
        assert_eq!(regions[1].buttons()[0].center, Point2::new(15.0, 5.0));
        assert!(regions[0].covers(&buttons[1]));
        assert!(!regions[0].covers(&buttons[2]));
    }

    #[test]
    fn color_labels() {
        assert_eq!(BeaconColor::Red.to_string(), "RED");
        assert_eq!(BeaconColor::Blue.as_str(), "BLUE");
    }
}
