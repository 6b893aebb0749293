//! Color segmentation: frame → connected regions of one target color.

use beacon_vision_core::{
    expand_mask_channels, rgb_to_hsv, scale_mask, ColorRange, HsvImage, PixelPoint,
};
use image::imageops::replace;
use image::{GrayImage, RgbImage};
use imageproc::contours::{find_contours, BorderType};
use imageproc::distance_transform::Norm;
use imageproc::morphology::{close, open};
use log::debug;

use crate::params::SegmenterParams;
use crate::region::ColorRegion;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Output of one segmentation pass.
#[derive(Clone, Debug)]
pub struct Segmentation {
    /// Per-pixel range test before smoothing.
    pub raw_mask: GrayImage,
    /// Mask after downscaled open/close, at frame resolution.
    pub mask: GrayImage,
    /// One region per outer boundary of `mask`.
    pub regions: Vec<ColorRegion>,
}

impl Segmentation {
    /// Black out every pixel of `frame` that is outside the color mask.
    pub fn clip_rgb(&self, frame: &RgbImage) -> RgbImage {
        let mask = expand_mask_channels(&self.mask);
        let (w, h) = frame.dimensions();
        RgbImage::from_fn(w, h, |x, y| {
            let mut px = *frame.get_pixel(x, y);
            let m = mask.get_pixel_checked(x, y).map_or([0; 3], |p| p.0);
            for (c, mc) in px.0.iter_mut().zip(m) {
                *c &= mc;
            }
            px
        })
    }
}

/// Finds regions of a single [`ColorRange`].
#[derive(Clone, Debug)]
pub struct ColorSegmenter {
    range: ColorRange,
    params: SegmenterParams,
}

impl ColorSegmenter {
    pub fn new(range: ColorRange, params: SegmenterParams) -> Self {
        Self { range, params }
    }

    pub fn range(&self) -> &ColorRange {
        &self.range
    }

    pub fn params(&self) -> &SegmenterParams {
        &self.params
    }

    /// Segment an RGB frame.
    pub fn segment(&self, frame: &RgbImage) -> Segmentation {
        self.segment_hsv(&rgb_to_hsv(frame))
    }

    /// Segment an already converted HSV frame.
    ///
    /// Several segmenters can share one conversion this way.
    #[cfg_attr(
        feature = "tracing",
        instrument(
            level = "debug",
            skip(self, hsv),
            fields(width = hsv.width(), height = hsv.height())
        )
    )]
    pub fn segment_hsv(&self, hsv: &HsvImage) -> Segmentation {
        let raw_mask = self.range.in_range(hsv);
        let mask = self.smooth(&raw_mask);
        let regions: Vec<ColorRegion> = outer_contours(&mask)
            .into_iter()
            .map(ColorRegion::new)
            .collect();
        debug!(
            "segmented {} region(s) for range with {} interval(s)",
            regions.len(),
            self.range.intervals().len()
        );
        Segmentation {
            raw_mask,
            mask,
            regions,
        }
    }

    /// Open then close at reduced resolution, then scale back.
    pub fn smooth(&self, mask: &GrayImage) -> GrayImage {
        let (w, h) = mask.dimensions();
        if w == 0 || h == 0 {
            return mask.clone();
        }
        let factor = self.params.downscale.max(1);
        let small = scale_mask(mask, (w / factor).max(1), (h / factor).max(1));
        let opened = open(&small, Norm::LInf, radius_of(self.params.open_size));
        let closed = close(&opened, Norm::LInf, radius_of(self.params.close_size));
        scale_mask(&closed, w, h)
    }
}

/// Half-width of a square structuring element of side `size`.
fn radius_of(size: u32) -> u8 {
    (size.saturating_sub(1) / 2).min(u8::MAX as u32) as u8
}

/// Outer boundaries of all top-level foreground components.
///
/// The mask is traced inside a one pixel zero border: components touching
/// the frame edge would otherwise be reported as holes.
pub(crate) fn outer_contours(mask: &GrayImage) -> Vec<Vec<PixelPoint>> {
    let (w, h) = mask.dimensions();
    if w == 0 || h == 0 {
        return Vec::new();
    }
    let mut padded = GrayImage::new(w + 2, h + 2);
    replace(&mut padded, mask, 1, 1);
    find_contours::<i32>(&padded)
        .into_iter()
        .filter(|c| c.parent.is_none() && c.border_type == BorderType::Outer)
        .map(|c| {
            c.points
                .into_iter()
                .map(|p| PixelPoint::new(p.x - 1, p.y - 1))
                .collect()
        })
        .collect()
}
