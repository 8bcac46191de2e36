use image::{GrayImage, RgbaImage};
use crate::{
    error::Result,
    frame::Frame,
    params::DetectionParameters,
    types::{Contour, LineSegment},
};

/// A frame resized to the working resolution
#[derive(Debug, Clone)]
pub struct Downscaled {
    pub image: RgbaImage,
    /// Source coordinate = working coordinate * scale
    pub scale: f32,
}

/// Trait for reducing a frame to the working resolution
pub trait Downscaler: Send + Sync {
    fn downscale(&self, frame: &Frame) -> Result<Downscaled>;
}

/// Trait for turning a colour image into a binary edge map of the same size
pub trait EdgeDetector: Send + Sync {
    fn detect_edges(&self, image: &RgbaImage, params: &DetectionParameters) -> Result<GrayImage>;
}

/// Trait for tracing boundaries of a binary image into ordered polylines
pub trait ContourTracer: Send + Sync {
    fn trace(&self, edges: &GrayImage) -> Result<Vec<Contour>>;
}

/// Trait for redrawing contours into a mask for line detection
pub trait MaskRasterizer: Send + Sync {
    fn rasterize(&self, width: u32, height: u32, contours: &[Contour]) -> Result<GrayImage>;
}

/// Trait for finding straight segments in a single-channel mask
pub trait SegmentDetector: Send + Sync {
    fn detect_segments(&self, mask: &GrayImage) -> Result<Vec<LineSegment>>;
}

/// Trait for denoising a polyline while keeping its length
pub trait PolylineSmoother: Send + Sync {
    fn smooth(&self, contour: &Contour, params: &DetectionParameters) -> Contour;
}
