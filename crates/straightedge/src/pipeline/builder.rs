use crate::{
    algorithms::{
        ExternalContourTracer, GaussianSmoother, HsvCannyEdgeDetector, ProbabilisticHough,
        ResizeDownscaler, StrokeRasterizer,
    },
    params::{DetectorConfig, HoughParameters},
    pipeline::Pipeline,
    traits::{
        ContourTracer, Downscaler, EdgeDetector, MaskRasterizer, PolylineSmoother,
        SegmentDetector,
    },
};

/// Builder for creating pipelines with a fluent API
pub struct PipelineBuilder {
    downscaler: Option<Box<dyn Downscaler>>,
    edge_detector: Option<Box<dyn EdgeDetector>>,
    contour_tracer: Option<Box<dyn ContourTracer>>,
    rasterizer: Option<Box<dyn MaskRasterizer>>,
    segment_detector: Option<Box<dyn SegmentDetector>>,
    smoother: Option<Box<dyn PolylineSmoother>>,
}

impl PipelineBuilder {
    pub fn new() -> Self {
        Self {
            downscaler: None,
            edge_detector: None,
            contour_tracer: None,
            rasterizer: None,
            segment_detector: None,
            smoother: None,
        }
    }

    /// Default stages carrying the constants of `config`
    pub fn from_config(config: &DetectorConfig) -> Self {
        Self::new()
            .with_working_size(config.working_size)
            .with_hough(config.hough)
            .with_smoothing_half_width(config.smoothing_half_width)
    }

    pub fn set_downscaler<D>(mut self, downscaler: D) -> Self
    where
        D: Downscaler + 'static,
    {
        self.downscaler = Some(Box::new(downscaler));
        self
    }

    pub fn set_edge_detector<E>(mut self, detector: E) -> Self
    where
        E: EdgeDetector + 'static,
    {
        self.edge_detector = Some(Box::new(detector));
        self
    }

    pub fn set_contour_tracer<C>(mut self, tracer: C) -> Self
    where
        C: ContourTracer + 'static,
    {
        self.contour_tracer = Some(Box::new(tracer));
        self
    }

    pub fn set_rasterizer<R>(mut self, rasterizer: R) -> Self
    where
        R: MaskRasterizer + 'static,
    {
        self.rasterizer = Some(Box::new(rasterizer));
        self
    }

    pub fn set_segment_detector<S>(mut self, detector: S) -> Self
    where
        S: SegmentDetector + 'static,
    {
        self.segment_detector = Some(Box::new(detector));
        self
    }

    pub fn set_smoother<S>(mut self, smoother: S) -> Self
    where
        S: PolylineSmoother + 'static,
    {
        self.smoother = Some(Box::new(smoother));
        self
    }

    /// Longer side of the working image
    pub fn with_working_size(self, working_size: u32) -> Self {
        self.set_downscaler(ResizeDownscaler { working_size })
    }

    pub fn with_hough(self, params: HoughParameters) -> Self {
        self.set_segment_detector(ProbabilisticHough::new(params))
    }

    pub fn with_smoothing_half_width(self, half_width: usize) -> Self {
        self.set_smoother(GaussianSmoother { half_width })
    }

    /// Build the pipeline with default components where none were set
    pub fn build(self) -> Pipeline {
        Pipeline::new(
            self.downscaler.unwrap_or_else(|| Box::new(ResizeDownscaler::default())),
            self.edge_detector.unwrap_or_else(|| Box::new(HsvCannyEdgeDetector::default())),
            self.contour_tracer.unwrap_or_else(|| Box::new(ExternalContourTracer)),
            self.rasterizer.unwrap_or_else(|| Box::new(StrokeRasterizer::default())),
            self.segment_detector.unwrap_or_else(|| Box::new(ProbabilisticHough::default())),
            self.smoother.unwrap_or_else(|| Box::new(GaussianSmoother::default())),
        )
    }
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}
