//! Pixel-level helpers on top of `image` / `imageproc`.
//!
//! Masks are `GrayImage`s holding only `0` and [`MASK_ON`].

use image::imageops::{self, FilterType};
use image::{GrayImage, ImageBuffer, Luma, Rgb, RgbImage};

/// Foreground value of a binary mask.
pub const MASK_ON: u8 = 255;

/// Three-channel image whose channels are `H` (`0..180`), `S` and `V`.
pub type HsvImage = ImageBuffer<Rgb<u8>, Vec<u8>>;

#[inline]
fn hsv_of(rgb: [u8; 3]) -> [u8; 3] {
    let [r, g, b] = rgb.map(i32::from);
    let v = r.max(g).max(b);
    let min = r.min(g).min(b);
    let diff = v - min;

    let s = if v == 0 {
        0
    } else {
        (255.0 * diff as f32 / v as f32).round() as i32
    };

    let h = if diff == 0 {
        0.0
    } else {
        let d = diff as f32;
        let deg = if v == r {
            60.0 * (g - b) as f32 / d
        } else if v == g {
            120.0 + 60.0 * (b - r) as f32 / d
        } else {
            240.0 + 60.0 * (r - g) as f32 / d
        };
        if deg < 0.0 {
            deg + 360.0
        } else {
            deg
        }
    };
    let h = (h / 2.0).round() as i32 % 180;

    [h as u8, s.clamp(0, 255) as u8, v as u8]
}

/// Convert an RGB frame into 8-bit HSV.
pub fn rgb_to_hsv(frame: &RgbImage) -> HsvImage {
    let (w, h) = frame.dimensions();
    HsvImage::from_fn(w, h, |x, y| Rgb(hsv_of(frame.get_pixel(x, y).0)))
}

/// Per-pixel AND of two single-channel images of the same size.
///
/// The output has the size of `a`; pixels outside `b` are treated as zero.
pub fn bitwise_and(a: &GrayImage, b: &GrayImage) -> GrayImage {
    let (w, h) = a.dimensions();
    GrayImage::from_fn(w, h, |x, y| {
        let pb = b.get_pixel_checked(x, y).map_or(0, |p| p.0[0]);
        Luma([a.get_pixel(x, y).0[0] & pb])
    })
}

/// Number of non-zero pixels.
pub fn count_nonzero(img: &GrayImage) -> usize {
    img.as_raw().iter().filter(|&&v| v != 0).count()
}

/// Replicate a single-channel mask into a three-channel one.
pub fn expand_mask_channels(mask: &GrayImage) -> RgbImage {
    let (w, h) = mask.dimensions();
    RgbImage::from_fn(w, h, |x, y| {
        let v = mask.get_pixel(x, y).0[0];
        Rgb([v, v, v])
    })
}

/// Resize a mask with linear filtering and re-binarize it at half intensity.
pub fn scale_mask(mask: &GrayImage, width: u32, height: u32) -> GrayImage {
    let width = width.max(1);
    let height = height.max(1);
    let mut out = imageops::resize(mask, width, height, FilterType::Triangle);
    for p in out.pixels_mut() {
        p.0[0] = if p.0[0] >= MASK_ON / 2 + 1 { MASK_ON } else { 0 };
    }
    out
}

/// Normalized 1-D Gaussian kernel with `size` taps.
///
/// A non-positive `sigma` is derived from the size the same way common
/// imaging libraries do: `0.3 * ((size - 1) * 0.5 - 1) + 0.8`.
pub fn gaussian_kernel(size: usize, sigma: f32) -> Vec<f32> {
    let size = size.max(1) | 1;
    let sigma = if sigma > 0.0 {
        sigma
    } else {
        0.3 * ((size as f32 - 1.0) * 0.5 - 1.0) + 0.8
    };
    let half = (size / 2) as f32;
    let mut k: Vec<f32> = (0..size)
        .map(|i| {
            let d = i as f32 - half;
            (-(d * d) / (2.0 * sigma * sigma)).exp()
        })
        .collect();
    let sum: f32 = k.iter().sum();
    for v in &mut k {
        *v /= sum;
    }
    k
}

/// Gaussian blur with an explicit square kernel size.
pub fn gaussian_blur(img: &GrayImage, size: usize, sigma: f32) -> GrayImage {
    let kernel = gaussian_kernel(size, sigma);
    imageproc::filter::separable_filter_equal(img, &kernel)
}
