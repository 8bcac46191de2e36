//! Frame-level front end that reports detected lines to a delegate.
//!
//! Detection itself is synchronous; the `spawn_*` methods move the work onto
//! tokio's blocking pool so a caller's UI or capture thread never waits on it.
//! They must be called from within a tokio runtime.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::{
    error::{Result, StraightedgeError},
    frame::Frame,
    params::DetectionParameters,
    pipeline::Pipeline,
    types::LineSegment,
};

/// Receiver of detection results
pub trait LinesDelegate: Send + Sync + 'static {
    fn on_lines_detected(&self, lines: Vec<LineSegment>);

    fn on_detection_failed(&self, error: &StraightedgeError) {
        warn!(%error, "line detection failed");
    }
}

pub struct FrameProcessor<D: LinesDelegate> {
    pipeline: Arc<Pipeline>,
    params: DetectionParameters,
    delegate: Arc<D>,
}

impl<D: LinesDelegate> Clone for FrameProcessor<D> {
    fn clone(&self) -> Self {
        Self {
            pipeline: Arc::clone(&self.pipeline),
            params: self.params,
            delegate: Arc::clone(&self.delegate),
        }
    }
}

impl<D: LinesDelegate> FrameProcessor<D> {
    pub fn new(delegate: D) -> Self {
        Self::with_pipeline(Arc::new(Pipeline::default()), DetectionParameters::default(), Arc::new(delegate))
    }

    pub fn with_pipeline(pipeline: Arc<Pipeline>, params: DetectionParameters, delegate: Arc<D>) -> Self {
        Self { pipeline, params, delegate }
    }

    pub fn params(&self) -> &DetectionParameters {
        &self.params
    }

    /// Smoothed contours of `frame`, flattened into consecutive-point lines
    pub fn detect_lines(&self, frame: &Frame) -> Result<Vec<LineSegment>> {
        Ok(self.pipeline.process(frame, &self.params)?.contour_lines())
    }

    /// Detect on a blocking worker, taking ownership of `frame`.
    ///
    /// The frame is released once detection finishes. The handle resolves to
    /// the number of lines handed to the delegate.
    pub fn spawn_detect_lines(&self, frame: Frame) -> JoinHandle<Result<usize>> {
        let worker = self.clone();
        tokio::task::spawn_blocking(move || {
            let result = worker.detect_lines(&frame);
            drop(frame);

            match result {
                Ok(lines) => {
                    let count = lines.len();
                    debug!(count, "reporting detected lines");
                    worker.delegate.on_lines_detected(lines);
                    Ok(count)
                }
                Err(error) => {
                    worker.delegate.on_detection_failed(&error);
                    Err(error)
                }
            }
        })
    }

    /// Copy a borrowed buffer, then detect on a blocking worker.
    ///
    /// The caller's memory is not retained past this call.
    pub fn spawn_detect_lines_copied(
        &self,
        width: u32,
        height: u32,
        data: &[u8],
    ) -> Result<JoinHandle<Result<usize>>> {
        let frame = Frame::copy_from(width, height, data)?;
        Ok(self.spawn_detect_lines(frame))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        batches: Mutex<Vec<Vec<LineSegment>>>,
        failures: Mutex<usize>,
    }

    impl LinesDelegate for Recorder {
        fn on_lines_detected(&self, lines: Vec<LineSegment>) {
            self.batches.lock().unwrap().push(lines);
        }

        fn on_detection_failed(&self, _error: &StraightedgeError) {
            *self.failures.lock().unwrap() += 1;
        }
    }

    fn disk_frame() -> Frame {
        let (w, h) = (300u32, 200u32);
        let mut data = vec![255u8; (w * h * 4) as usize];
        for y in 0..h {
            for x in 0..w {
                let (dx, dy) = (x as f32 - 150.0, y as f32 - 100.0);
                if dx * dx + dy * dy <= 60.0 * 60.0 {
                    let i = ((y * w + x) * 4) as usize;
                    data[i..i + 3].copy_from_slice(&[0, 0, 0]);
                }
            }
        }
        Frame::new(w, h, data).expect("valid frame")
    }

    #[test]
    fn test_detect_lines_is_synchronous() {
        let processor = FrameProcessor::new(Recorder::default());
        let lines = processor.detect_lines(&disk_frame()).expect("detect");
        assert!(!lines.is_empty());
        assert!(processor.delegate.batches.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_spawned_detection_reports_to_delegate() {
        let recorder = Arc::new(Recorder::default());
        let processor = FrameProcessor::with_pipeline(
            Arc::new(Pipeline::default()),
            DetectionParameters::default(),
            Arc::clone(&recorder),
        );

        let count = processor
            .spawn_detect_lines(disk_frame())
            .await
            .expect("worker joined")
            .expect("detection succeeded");

        let batches = recorder.batches.lock().unwrap();
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].len(), count);
        assert!(count > 0);
    }

    #[tokio::test]
    async fn test_copied_detection_leaves_caller_buffer_alone() {
        let recorder = Arc::new(Recorder::default());
        let processor = FrameProcessor::with_pipeline(
            Arc::new(Pipeline::default()),
            DetectionParameters::default(),
            Arc::clone(&recorder),
        );

        let frame = disk_frame();
        let original = frame.data().to_vec();
        let handle = processor
            .spawn_detect_lines_copied(frame.width(), frame.height(), frame.data())
            .expect("valid buffer");
        handle.await.expect("worker joined").expect("detection succeeded");

        assert_eq!(frame.data(), original.as_slice());
        assert_eq!(recorder.batches.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_failures_reach_the_delegate() {
        let recorder = Arc::new(Recorder::default());
        let params = DetectionParameters { sigma: 0.0, ..DetectionParameters::default() };
        let processor =
            FrameProcessor::with_pipeline(Arc::new(Pipeline::default()), params, Arc::clone(&recorder));

        let result = processor.spawn_detect_lines(disk_frame()).await.expect("worker joined");
        assert!(result.is_err());
        assert_eq!(*recorder.failures.lock().unwrap(), 1);
        assert!(recorder.batches.lock().unwrap().is_empty());
    }

    #[test]
    fn test_copy_rejects_bad_buffer_before_spawning() {
        let processor = FrameProcessor::new(Recorder::default());
        let err = processor.spawn_detect_lines_copied(4, 4, &[0u8; 3]).unwrap_err();
        assert!(matches!(err, StraightedgeError::InvalidInput(_)));
    }
}
