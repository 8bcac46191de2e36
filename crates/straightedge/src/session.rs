use std::path::Path;
use std::sync::Arc;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr, VariantNames};

use crate::{
    error::{Result, StraightedgeError},
    frame::Frame,
    params::DetectionParameters,
    pipeline::Pipeline,
    types::FrameDetection,
};

#[derive(
    Debug, Clone, Copy,
    Serialize, Deserialize, JsonSchema,
    Display, EnumString, EnumIter, VariantNames, IntoStaticStr,
    PartialEq, Eq, Default
)]
#[serde(tag = "type", rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DetectionCommand {
    /// Smoothed contours only
    DetectContours,

    /// Straight segments from the line transform only
    DetectLineSegments,

    /// Both outputs of one pipeline run
    #[default]
    DetectAll,
}

impl DetectionCommand {
    pub fn schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(DetectionCommand)
    }

    pub fn command_names() -> &'static [&'static str] {
        <Self as VariantNames>::VARIANTS
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::DetectContours => "Extract smoothed edge contours in source coordinates",
            Self::DetectLineSegments => "Extract straight line segments in source coordinates",
            Self::DetectAll => "Extract both contours and line segments from a single pass",
        }
    }

    /// Drop the output this command did not ask for
    pub fn project(&self, mut detection: FrameDetection) -> FrameDetection {
        match self {
            Self::DetectContours => detection.segments.clear(),
            Self::DetectLineSegments => detection.contours.clear(),
            Self::DetectAll => {}
        }
        detection
    }
}

/// Holds a loaded frame and runs commands against it
#[derive(Clone)]
pub struct DetectionSession {
    frame: Option<Frame>,
    pipeline: Arc<Pipeline>,
}

impl DetectionSession {
    pub fn new() -> Self {
        Self::with_pipeline(Pipeline::default())
    }

    pub fn with_pipeline(pipeline: Pipeline) -> Self {
        Self {
            frame: None,
            pipeline: Arc::new(pipeline),
        }
    }

    pub fn load_image<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let image = image::open(path)?;
        self.frame = Some(Frame::from_image(image)?);
        Ok(())
    }

    pub fn load_image_from_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        let image = image::load_from_memory(bytes)?;
        self.frame = Some(Frame::from_image(image)?);
        Ok(())
    }

    pub fn set_frame(&mut self, frame: Frame) {
        self.frame = Some(frame);
    }

    pub fn frame(&self) -> Option<&Frame> {
        self.frame.as_ref()
    }

    pub fn execute(&self, command: DetectionCommand, params: &DetectionParameters) -> Result<FrameDetection> {
        let frame = self.frame.as_ref().ok_or(StraightedgeError::NoFrameLoaded)?;
        let detection = self.pipeline.process(frame, params)?;
        Ok(command.project(detection))
    }
}

impl Default for DetectionSession {
    fn default() -> Self {
        Self::new()
    }
}
