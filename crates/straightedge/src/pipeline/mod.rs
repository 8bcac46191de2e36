pub mod builder;

use tracing::{debug, instrument};

use crate::{
    algorithms::filter_short_contours,
    error::Result,
    frame::Frame,
    params::{DetectionParameters, DetectorConfig},
    traits::{
        ContourTracer, Downscaled, Downscaler, EdgeDetector, MaskRasterizer, PolylineSmoother,
        SegmentDetector,
    },
    types::{Contour, FrameDetection, LineSegment},
};

/// The straight-edge extraction pipeline.
///
/// Stages run in a fixed order: downscale, edge map, contour tracing and
/// filtering, mask rasterization, then line detection on the mask and
/// smoothing of the kept contours. Holds no per-call state.
pub struct Pipeline {
    downscaler: Box<dyn Downscaler>,
    edge_detector: Box<dyn EdgeDetector>,
    contour_tracer: Box<dyn ContourTracer>,
    rasterizer: Box<dyn MaskRasterizer>,
    segment_detector: Box<dyn SegmentDetector>,
    smoother: Box<dyn PolylineSmoother>,
}

impl Pipeline {
    /// Create a new pipeline builder
    pub fn builder() -> builder::PipelineBuilder {
        builder::PipelineBuilder::new()
    }

    /// Default stages tuned by `config`
    pub fn from_config(config: &DetectorConfig) -> Self {
        builder::PipelineBuilder::from_config(config).build()
    }

    pub fn new(
        downscaler: Box<dyn Downscaler>,
        edge_detector: Box<dyn EdgeDetector>,
        contour_tracer: Box<dyn ContourTracer>,
        rasterizer: Box<dyn MaskRasterizer>,
        segment_detector: Box<dyn SegmentDetector>,
        smoother: Box<dyn PolylineSmoother>,
    ) -> Self {
        Self {
            downscaler,
            edge_detector,
            contour_tracer,
            rasterizer,
            segment_detector,
            smoother,
        }
    }

    /// Run every stage once and return both outputs in source coordinates
    #[instrument(level = "debug", skip_all, fields(width = frame.width(), height = frame.height()))]
    pub fn process(&self, frame: &Frame, params: &DetectionParameters) -> Result<FrameDetection> {
        params.validate()?;

        // Step 1: Working resolution; `scale` maps every later result back
        let Downscaled { image, scale } = self.downscaler.downscale(frame)?;
        let (working_width, working_height) = image.dimensions();

        // Step 2: Binary edge map
        let edges = self.edge_detector.detect_edges(&image, params)?;

        // Step 3: Trace, drop noise, then regularize into a stroke mask
        let traced = self.contour_tracer.trace(&edges)?;
        let contours = filter_short_contours(traced, params.min_contour_size);
        let mask = self.rasterizer.rasterize(working_width, working_height, &contours)?;

        // Step 4: Straight segments on the regularized mask
        let segments = self.segment_detector.detect_segments(&mask)?;

        // Step 5: Smooth in working space, then upscale
        let contours: Vec<Contour> = contours
            .iter()
            .map(|contour| self.smoother.smooth(contour, params).scaled(scale))
            .collect();
        let segments = segments.into_iter().map(|s| s.scaled(scale)).collect::<Vec<_>>();

        debug!(contours = contours.len(), segments = segments.len(), scale, "frame processed");

        Ok(FrameDetection {
            contours,
            segments,
            scale,
            working_width,
            working_height,
            image_width: frame.width(),
            image_height: frame.height(),
        })
    }

    /// Smoothed contours in source coordinates and the scale factor used
    pub fn detect(&self, frame: &Frame, params: &DetectionParameters) -> Result<(Vec<Contour>, f32)> {
        let detection = self.process(frame, params)?;
        Ok((detection.contours, detection.scale))
    }

    /// Straight segments in source coordinates
    pub fn detect_line_segments(
        &self,
        frame: &Frame,
        params: &DetectionParameters,
    ) -> Result<Vec<LineSegment>> {
        Ok(self.process(frame, params)?.segments)
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::builder().build()
    }
}
