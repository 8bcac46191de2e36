//! Edge extraction on the HSV value channel.
//!
//! The colour image is box-blurred per channel, reduced to its value channel
//! (`max(R, G, B)`, identical for RGBA and BGRA input) and passed through a
//! two-threshold gradient detector: Sobel gradients with L1 magnitude,
//! non-maximum suppression along the quantized gradient direction, then
//! hysteresis where pixels above `canny_high` seed edges that grow through
//! 8-connected pixels above `canny_low`.

use image::{GrayImage, Luma, RgbaImage};
use imageproc::{
    definitions::Image,
    filter::box_filter,
    gradients::{horizontal_sobel, vertical_sobel},
};
use tracing::debug;

use crate::{
    error::{Result, StraightedgeError},
    params::DetectionParameters,
    traits::EdgeDetector,
};

const TAN_22_5_DEG: f32 = 0.414_213_56;
const TAN_67_5_DEG: f32 = 2.414_213_6;

const EDGE: u8 = 255;

/// Box blur + HSV value channel + two-threshold gradient edge detector
#[derive(Debug, Clone)]
pub struct HsvCannyEdgeDetector {
    /// Radius of the denoising box blur (1 = 3x3)
    pub blur_radius: u32,
}

impl Default for HsvCannyEdgeDetector {
    fn default() -> Self {
        Self { blur_radius: 1 }
    }
}

impl EdgeDetector for HsvCannyEdgeDetector {
    fn detect_edges(&self, image: &RgbaImage, params: &DetectionParameters) -> Result<GrayImage> {
        if image.width() == 0 || image.height() == 0 {
            return Err(StraightedgeError::InvalidInput(
                "cannot detect edges on an empty image".to_string(),
            ));
        }

        let value = value_channel(image, self.blur_radius);
        let edges = canny(&value, params.canny_low, params.canny_high);

        debug!(
            edge_pixels = edges.pixels().filter(|p| p[0] != 0).count(),
            low = params.canny_low,
            high = params.canny_high,
            "extracted edge map"
        );
        Ok(edges)
    }
}

/// Blur each colour channel, then keep the per-pixel maximum
pub fn value_channel(image: &RgbaImage, blur_radius: u32) -> GrayImage {
    let channel = |c: usize| {
        GrayImage::from_fn(image.width(), image.height(), |x, y| {
            Luma([image.get_pixel(x, y)[c]])
        })
    };

    let blurred: Vec<GrayImage> = (0..3)
        .map(|c| box_filter(&channel(c), blur_radius, blur_radius))
        .collect();

    GrayImage::from_fn(image.width(), image.height(), |x, y| {
        let v = blurred
            .iter()
            .map(|ch| ch.get_pixel(x, y)[0])
            .max()
            .unwrap_or(0);
        Luma([v])
    })
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Candidate {
    None,
    Weak,
    Edge,
}

/// Two-threshold gradient edge detector producing a 0/255 map
pub fn canny(image: &GrayImage, low: u8, high: u8) -> GrayImage {
    let (width, height) = image.dimensions();
    let (w, h) = (width as usize, height as usize);

    let gx: Image<Luma<i16>> = horizontal_sobel(image);
    let gy: Image<Luma<i16>> = vertical_sobel(image);

    let magnitude: Vec<i32> = gx
        .pixels()
        .zip(gy.pixels())
        .map(|(dx, dy)| i32::from(dx[0]).abs() + i32::from(dy[0]).abs())
        .collect();

    let mag_at = |x: isize, y: isize| -> i32 {
        if x < 0 || y < 0 || x >= w as isize || y >= h as isize {
            0
        } else {
            magnitude[y as usize * w + x as usize]
        }
    };

    let (low, high) = (i32::from(low), i32::from(high));
    let mut state = vec![Candidate::None; w * h];
    let mut stack = Vec::new();

    for y in 0..h {
        for x in 0..w {
            let m = magnitude[y * w + x];
            if m <= low {
                continue;
            }

            let dx = gx.get_pixel(x as u32, y as u32)[0] as f32;
            let dy = gy.get_pixel(x as u32, y as u32)[0] as f32;
            let (ax, ay) = (dx.abs(), dy.abs());
            let (xi, yi) = (x as isize, y as isize);

            let is_max = if ay < ax * TAN_22_5_DEG {
                m > mag_at(xi - 1, yi) && m >= mag_at(xi + 1, yi)
            } else if ay > ax * TAN_67_5_DEG {
                m > mag_at(xi, yi - 1) && m >= mag_at(xi, yi + 1)
            } else {
                let s: isize = if (dx < 0.0) != (dy < 0.0) { -1 } else { 1 };
                m > mag_at(xi - s, yi - 1) && m > mag_at(xi + s, yi + 1)
            };

            if !is_max {
                continue;
            }
            if m > high {
                state[y * w + x] = Candidate::Edge;
                stack.push((x, y));
            } else {
                state[y * w + x] = Candidate::Weak;
            }
        }
    }

    // Grow strong edges through connected weak candidates
    while let Some((x, y)) = stack.pop() {
        for ny in y.saturating_sub(1)..=(y + 1).min(h - 1) {
            for nx in x.saturating_sub(1)..=(x + 1).min(w - 1) {
                let idx = ny * w + nx;
                if state[idx] == Candidate::Weak {
                    state[idx] = Candidate::Edge;
                    stack.push((nx, ny));
                }
            }
        }
    }

    GrayImage::from_fn(width, height, |x, y| {
        if state[y as usize * w + x as usize] == Candidate::Edge {
            Luma([EDGE])
        } else {
            Luma([0])
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn count_edges(edges: &GrayImage) -> usize {
        edges.pixels().filter(|p| p[0] != 0).count()
    }

    #[test]
    fn test_uniform_image_has_no_edges() {
        let image = RgbaImage::from_pixel(40, 30, Rgba([120, 40, 200, 255]));
        let edges = HsvCannyEdgeDetector::default()
            .detect_edges(&image, &DetectionParameters::default())
            .expect("edges");
        assert_eq!(edges.dimensions(), (40, 30));
        assert_eq!(count_edges(&edges), 0);
    }

    #[test]
    fn test_vertical_step_produces_thin_edge() {
        let image = RgbaImage::from_fn(40, 30, |x, _| {
            if x < 20 { Rgba([0, 0, 0, 255]) } else { Rgba([255, 255, 255, 255]) }
        });
        let edges = HsvCannyEdgeDetector::default()
            .detect_edges(&image, &DetectionParameters::default())
            .expect("edges");

        // One edge pixel per row, close to the step
        for y in 2..28 {
            let row: Vec<u32> = (0..40).filter(|&x| edges.get_pixel(x, y)[0] != 0).collect();
            assert_eq!(row.len(), 1, "row {y}: {row:?}");
            assert!((18..=21).contains(&row[0]), "row {y}: {row:?}");
        }
    }

    #[test]
    fn test_value_channel_ignores_channel_order() {
        let rgba = RgbaImage::from_pixel(5, 5, Rgba([10, 200, 30, 255]));
        let bgra = RgbaImage::from_pixel(5, 5, Rgba([30, 200, 10, 255]));
        assert_eq!(value_channel(&rgba, 1), value_channel(&bgra, 1));
        assert_eq!(value_channel(&rgba, 1).get_pixel(2, 2)[0], 200);
    }

    #[test]
    fn test_high_threshold_suppresses_weak_steps() {
        let image = GrayImage::from_fn(20, 20, |x, _| if x < 10 { Luma([100]) } else { Luma([110]) });
        // L1 Sobel response of a 10-level step is 40
        assert!(count_edges(&canny(&image, 0, 255)) == 0);
        assert!(count_edges(&canny(&image, 0, 30)) > 0);
    }
}
