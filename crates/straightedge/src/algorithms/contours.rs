use image::GrayImage;
use imageproc::contours::{find_contours, BorderType};
use tracing::debug;

use crate::{
    error::Result,
    traits::ContourTracer,
    types::{Contour, Point},
};

/// Traces outer, top-level borders and keeps only the vertices of each straight run
#[derive(Debug, Clone, Default)]
pub struct ExternalContourTracer;

impl ContourTracer for ExternalContourTracer {
    fn trace(&self, edges: &GrayImage) -> Result<Vec<Contour>> {
        let contours = find_contours::<i32>(edges);
        let total = contours.len();

        let result: Vec<Contour> = contours
            .into_iter()
            .filter(|c| matches!(c.border_type, BorderType::Outer) && c.parent.is_none())
            .map(|c| compress_runs(&c.points.iter().map(|p| (p.x, p.y)).collect::<Vec<_>>()))
            .collect();

        debug!(traced = total, external = result.len(), "traced contours");
        Ok(result)
    }
}

/// Collapse horizontal, vertical and diagonal runs of a closed border to their end vertices
pub fn compress_runs(points: &[(i32, i32)]) -> Contour {
    let n = points.len();
    if n <= 2 {
        return points
            .iter()
            .map(|&(x, y)| Point::new(x as f32, y as f32))
            .collect::<Vec<_>>()
            .into();
    }

    let step = |a: (i32, i32), b: (i32, i32)| ((b.0 - a.0).signum(), (b.1 - a.1).signum());

    let mut kept = vec![Point::new(points[0].0 as f32, points[0].1 as f32)];
    for i in 1..n {
        let incoming = step(points[i - 1], points[i]);
        let outgoing = step(points[i], points[(i + 1) % n]);
        if incoming != outgoing {
            kept.push(Point::new(points[i].0 as f32, points[i].1 as f32));
        }
    }
    Contour::new(kept)
}

/// Drop contours with fewer than `min_size` points, keeping the order of the rest
pub fn filter_short_contours(contours: Vec<Contour>, min_size: usize) -> Vec<Contour> {
    let before = contours.len();
    let kept: Vec<Contour> = contours.into_iter().filter(|c| c.len() >= min_size).collect();
    debug!(before, after = kept.len(), min_size, "filtered short contours");
    kept
}
