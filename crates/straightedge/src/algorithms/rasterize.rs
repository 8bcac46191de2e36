use image::{GrayImage, Luma};
use imageproc::{drawing::draw_line_segment_mut, filter::box_filter};

use crate::{
    error::{Result, StraightedgeError},
    traits::MaskRasterizer,
    types::Contour,
};

/// Redraws contours as straight connectors and blurs the strokes together
#[derive(Debug, Clone)]
pub struct StrokeRasterizer {
    pub blur_radius: u32,
}

impl Default for StrokeRasterizer {
    fn default() -> Self {
        Self { blur_radius: 1 }
    }
}

impl MaskRasterizer for StrokeRasterizer {
    fn rasterize(&self, width: u32, height: u32, contours: &[Contour]) -> Result<GrayImage> {
        if width == 0 || height == 0 {
            return Err(StraightedgeError::InvalidInput(format!(
                "cannot rasterize into a {width}x{height} mask"
            )));
        }

        let mut mask = GrayImage::new(width, height);
        for line in contours.iter().flat_map(Contour::lines) {
            draw_line_segment_mut(
                &mut mask,
                (line.p1.x, line.p1.y),
                (line.p2.x, line.p2.y),
                Luma([255u8]),
            );
        }

        if self.blur_radius == 0 {
            return Ok(mask);
        }
        Ok(box_filter(&mask, self.blur_radius, self.blur_radius))
    }
}
