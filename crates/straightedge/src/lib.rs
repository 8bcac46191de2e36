//! # Straight Edge Extraction Library
//!
//! Finds edge contours and straight line segments in camera frames.
//! Frames are reduced to a small working resolution, edge-detected on the
//! brightness channel, traced into contours and redrawn as a mask for a
//! probabilistic line transform. Every result comes back in the coordinates
//! of the original frame.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use straightedge::{DetectionParameters, Frame, Pipeline};
//!
//! let frame = Frame::from_image(image::open("frame.jpg")?)?;
//! let detection = Pipeline::default().process(&frame, &DetectionParameters::default())?;
//!
//! println!("{} contours, {} segments", detection.contours.len(), detection.segments.len());
//! detection.save_geojson("edges.geojson")?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Custom Pipeline
//!
//! ```rust,no_run
//! use straightedge::{Pipeline, algorithms::*};
//!
//! let pipeline = Pipeline::builder()
//!     .with_working_size(400)
//!     .set_smoother(GaussianSmoother { half_width: 5 })
//!     .build();
//! ```

pub mod error;
pub mod types;
pub mod frame;
pub mod params;
pub mod traits;
pub mod algorithms;
pub mod pipeline;
pub mod processor;
pub mod session;
pub mod io;

pub use error::{Result, StraightedgeError};
pub use types::{Contour, FrameDetection, LineSegment, Point};
pub use frame::{Frame, FrameBuffer};
pub use params::{DetectionParameters, DetectorConfig, HoughParameters};
pub use traits::*;
pub use pipeline::{Pipeline, builder::PipelineBuilder};
pub use processor::{FrameProcessor, LinesDelegate};
pub use session::{DetectionCommand, DetectionSession};

/// Smoothed contours of `frame` in source coordinates, with the scale factor used
pub fn detect(frame: &Frame, params: &DetectionParameters) -> Result<(Vec<Contour>, f32)> {
    Pipeline::default().detect(frame, params)
}

/// Straight segments of `frame` in source coordinates
pub fn detect_line_segments(frame: &Frame, params: &DetectionParameters) -> Result<Vec<LineSegment>> {
    Pipeline::default().detect_line_segments(frame, params)
}
