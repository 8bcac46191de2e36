use crate::{
    params::{DetectionParameters, DEFAULT_SMOOTHING_HALF_WIDTH},
    traits::PolylineSmoother,
    types::{Contour, Point},
};

/// Gaussian smoothing of polyline points with replicated boundary points.
///
/// The first and last points are kept exactly; output length equals input length.
#[derive(Debug, Clone)]
pub struct GaussianSmoother {
    pub half_width: usize,
}

impl Default for GaussianSmoother {
    fn default() -> Self {
        Self { half_width: DEFAULT_SMOOTHING_HALF_WIDTH }
    }
}

/// Normalized weights `exp(-(i - k)^2 / sigma^2)` for `i` in `0..=2k`
pub fn gaussian_kernel(half_width: usize, sigma: f32) -> Vec<f32> {
    let k = half_width as f32;
    let mut weights: Vec<f32> = (0..=2 * half_width)
        .map(|i| {
            let d = i as f32 - k;
            (-(d * d) / (sigma * sigma)).exp()
        })
        .collect();

    let sum: f32 = weights.iter().sum();
    for w in &mut weights {
        *w /= sum;
    }
    weights
}

impl PolylineSmoother for GaussianSmoother {
    fn smooth(&self, contour: &Contour, params: &DetectionParameters) -> Contour {
        let points = &contour.points;
        let n = points.len();
        if n <= 1 {
            return contour.clone();
        }

        let kernel = gaussian_kernel(self.half_width, params.sigma);
        let k = self.half_width as isize;
        let last = n as isize - 1;

        let mut smoothed: Vec<Point> = (0..n as isize)
            .map(|i| {
                kernel
                    .iter()
                    .zip(-k..=k)
                    .fold(Point::default(), |acc, (&w, offset)| {
                        let p = points[(i + offset).clamp(0, last) as usize];
                        Point::new(acc.x + p.x * w, acc.y + p.y * w)
                    })
            })
            .collect();

        smoothed[0] = points[0];
        smoothed[n - 1] = points[n - 1];
        Contour::new(smoothed)
    }
}
