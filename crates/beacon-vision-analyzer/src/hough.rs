//! Gradient Hough circle transform.
//!
//! Edge pixels vote along their gradient line for every radius in range;
//! accumulator peaks become center candidates, strongest first, and each
//! accepted center takes the radius best supported by the edge distances.

use beacon_vision_core::Circle;
use image::GrayImage;
use imageproc::edges::canny;
use imageproc::gradients::{horizontal_sobel, vertical_sobel};
use log::trace;
use nalgebra::Point2;

use crate::params::HoughButtonParams;

/// Detect circles in an already smoothed grayscale image.
pub fn hough_circles(img: &GrayImage, params: &HoughButtonParams) -> Vec<Circle> {
    let (w, h) = img.dimensions();
    if w < 3 || h < 3 {
        return Vec::new();
    }
    let (w, h) = (w as i32, h as i32);
    let min_r = params.min_radius.max(1) as i32;
    let max_r = if params.max_radius == 0 {
        w.max(h)
    } else {
        params.max_radius as i32
    };
    if max_r < min_r {
        return Vec::new();
    }

    let edges = canny(img, params.canny_high * 0.5, params.canny_high);
    let gx = horizontal_sobel(img);
    let gy = vertical_sobel(img);

    let mut edge_points = Vec::new();
    let mut acc = vec![0u32; (w * h) as usize];
    for (x, y, p) in edges.enumerate_pixels() {
        if p.0[0] == 0 {
            continue;
        }
        let dx = gx.get_pixel(x, y).0[0] as f32;
        let dy = gy.get_pixel(x, y).0[0] as f32;
        let mag = (dx * dx + dy * dy).sqrt();
        if mag <= f32::EPSILON {
            continue;
        }
        edge_points.push((x as i32, y as i32));
        let (ux, uy) = (dx / mag, dy / mag);
        for sign in [1.0f32, -1.0] {
            for r in min_r..=max_r {
                let cx = (x as f32 + sign * ux * r as f32).round() as i32;
                let cy = (y as f32 + sign * uy * r as f32).round() as i32;
                if cx < 0 || cy < 0 || cx >= w || cy >= h {
                    break;
                }
                acc[(cy * w + cx) as usize] += 1;
            }
        }
    }

    let at = |x: i32, y: i32| acc[(y * w + x) as usize];
    let mut centers = Vec::new();
    for y in 1..h - 1 {
        for x in 1..w - 1 {
            let v = at(x, y);
            if v > params.accumulator_threshold
                && v > at(x - 1, y)
                && v >= at(x + 1, y)
                && v > at(x, y - 1)
                && v >= at(x, y + 1)
            {
                centers.push((v, x, y));
            }
        }
    }
    centers.sort_by(|a, b| b.0.cmp(&a.0));
    trace!(
        "hough: {} edge px, {} center candidate(s)",
        edge_points.len(),
        centers.len()
    );

    let min_dist_sq = params.min_center_dist * params.min_center_dist;
    let mut circles: Vec<Circle> = Vec::new();
    let mut hist = vec![0u32; max_r as usize + 1];
    for &(_, cx, cy) in &centers {
        let center = Point2::new(cx as f32, cy as f32);
        if circles
            .iter()
            .any(|c| (c.center - center).norm_squared() < min_dist_sq)
        {
            continue;
        }

        hist.iter_mut().for_each(|v| *v = 0);
        for &(ex, ey) in &edge_points {
            let d = (((ex - cx).pow(2) + (ey - cy).pow(2)) as f32).sqrt().round() as i32;
            if (min_r..=max_r).contains(&d) {
                hist[d as usize] += 1;
            }
        }
        // Support is normalized by the radius so larger rings do not win on length alone.
        let mut best: Option<(i32, u32)> = None;
        for r in min_r..=max_r {
            let count = hist[r as usize];
            if count == 0 {
                continue;
            }
            let better = match best {
                None => true,
                Some((br, bc)) => count as u64 * br as u64 > bc as u64 * r as u64,
            };
            if better {
                best = Some((r, count));
            }
        }
        if let Some((r, count)) = best {
            if count > params.accumulator_threshold {
                circles.push(Circle::new(center, r as f32));
            }
        }
    }
    circles
}
