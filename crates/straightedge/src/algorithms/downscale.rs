use image::imageops::{self, FilterType};
use tracing::debug;

use crate::{
    error::{Result, StraightedgeError},
    frame::Frame,
    params::DEFAULT_WORKING_SIZE,
    traits::{Downscaled, Downscaler},
};

/// Resizes frames so that the longer side lands on `working_size`
#[derive(Debug, Clone)]
pub struct ResizeDownscaler {
    pub working_size: u32,
}

impl Default for ResizeDownscaler {
    fn default() -> Self {
        Self { working_size: DEFAULT_WORKING_SIZE }
    }
}

impl ResizeDownscaler {
    /// `max(width, height) / working_size`
    pub fn scale_factor(&self, width: u32, height: u32) -> Result<f32> {
        if self.working_size == 0 {
            return Err(StraightedgeError::DegenerateGeometry(
                "working size must be non-zero".to_string(),
            ));
        }
        let longest = width.max(height);
        if longest == 0 {
            return Err(StraightedgeError::InvalidInput("image is empty".to_string()));
        }

        let scale = longest as f32 / self.working_size as f32;
        if !scale.is_finite() || scale <= 0.0 {
            return Err(StraightedgeError::DegenerateGeometry(format!(
                "scale factor {scale} for a {width}x{height} image"
            )));
        }
        Ok(scale)
    }
}

impl Downscaler for ResizeDownscaler {
    fn downscale(&self, frame: &Frame) -> Result<Downscaled> {
        let (width, height) = (frame.width(), frame.height());
        let scale = self.scale_factor(width, height)?;

        let target_width = (width as f32 / scale).round() as u32;
        let target_height = (height as f32 / scale).round() as u32;
        if target_width == 0 || target_height == 0 {
            return Err(StraightedgeError::DegenerateGeometry(format!(
                "{width}x{height} image collapses to {target_width}x{target_height}"
            )));
        }

        let image = if (target_width, target_height) == (width, height) {
            frame.as_rgba().clone()
        } else {
            imageops::resize(frame.as_rgba(), target_width, target_height, FilterType::Triangle)
        };

        debug!(width, height, target_width, target_height, scale, "downscaled frame");
        Ok(Downscaled { image, scale })
    }
}
