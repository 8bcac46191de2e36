//! Progressive probabilistic Hough transform.
//!
//! Set pixels are visited in a seeded random order. Each visited pixel votes
//! into a (angle, distance) accumulator; as soon as one cell reaches the vote
//! threshold, the line through that pixel is walked in both directions across
//! set pixels (bridging at most `max_line_gap` empty ones) to produce a
//! segment. Pixels on an accepted segment are removed from the accumulator and
//! from further sampling, so every pixel contributes to at most one segment.

use image::GrayImage;
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use tracing::debug;

use crate::{
    error::{Result, StraightedgeError},
    params::HoughParameters,
    traits::SegmentDetector,
    types::{LineSegment, Point},
};

/// Fixed-point precision of the line walk
const SHIFT: u32 = 16;

#[derive(Debug, Clone, Default)]
pub struct ProbabilisticHough {
    pub params: HoughParameters,
}

impl ProbabilisticHough {
    pub fn new(params: HoughParameters) -> Self {
        Self { params }
    }
}

/// Steps along a line in fixed point, one pixel at a time on the major axis
#[derive(Clone, Copy)]
struct LineWalk {
    x: i64,
    y: i64,
    dx: i64,
    dy: i64,
    x_major: bool,
}

impl LineWalk {
    fn through(px: i64, py: i64, cos: f64, sin: f64) -> Self {
        // Direction of the line is perpendicular to its normal (cos, sin)
        let (a, b) = (-sin, cos);
        let one = (1i64 << SHIFT) as f64;
        let half = 1i64 << (SHIFT - 1);

        if a.abs() > b.abs() {
            Self {
                x: px,
                y: (py << SHIFT) + half,
                dx: if a > 0.0 { 1 } else { -1 },
                dy: (b * one / a.abs()).round() as i64,
                x_major: true,
            }
        } else {
            Self {
                x: (px << SHIFT) + half,
                y: py,
                dx: (a * one / b.abs()).round() as i64,
                dy: if b > 0.0 { 1 } else { -1 },
                x_major: false,
            }
        }
    }

    fn reversed(self) -> Self {
        Self { dx: -self.dx, dy: -self.dy, ..self }
    }

    fn pixel(&self) -> (i64, i64) {
        if self.x_major {
            (self.x, self.y >> SHIFT)
        } else {
            (self.x >> SHIFT, self.y)
        }
    }

    fn advance(&mut self) {
        self.x += self.dx;
        self.y += self.dy;
    }
}

struct Accumulator {
    votes: Vec<i32>,
    trig: Vec<(f64, f64)>,
    num_rho: usize,
    offset: i64,
}

impl Accumulator {
    fn new(width: u32, height: u32, rho: f64, theta: f64) -> Self {
        let num_angle = ((std::f64::consts::PI / theta).round() as usize).max(1);
        // |x cos + y sin| never exceeds width + height
        let max_r = (((width + height) as f64) / rho).ceil().max(0.0) as usize;
        let num_rho = 2 * max_r + 1;
        let irho = 1.0 / rho;
        let trig = (0..num_angle)
            .map(|n| {
                let angle = n as f64 * theta;
                (angle.cos() * irho, angle.sin() * irho)
            })
            .collect();

        Self {
            votes: vec![0; num_angle * num_rho],
            trig,
            num_rho,
            offset: max_r as i64,
        }
    }

    fn cell(&self, n: usize, x: i64, y: i64) -> usize {
        let (cos, sin) = self.trig[n];
        let r = (x as f64 * cos + y as f64 * sin).round() as i64 + self.offset;
        n * self.num_rho + r as usize
    }

    /// Vote for every angle and return the strongest `(angle index, votes)`
    fn vote(&mut self, x: i64, y: i64) -> (usize, i32) {
        let mut best = (0, i32::MIN);
        for n in 0..self.trig.len() {
            let cell = self.cell(n, x, y);
            self.votes[cell] += 1;
            if self.votes[cell] > best.1 {
                best = (n, self.votes[cell]);
            }
        }
        best
    }

    fn unvote(&mut self, x: i64, y: i64) {
        for n in 0..self.trig.len() {
            let cell = self.cell(n, x, y);
            self.votes[cell] -= 1;
        }
    }
}

impl SegmentDetector for ProbabilisticHough {
    fn detect_segments(&self, mask: &GrayImage) -> Result<Vec<LineSegment>> {
        let (width, height) = mask.dimensions();
        if width == 0 || height == 0 {
            return Err(StraightedgeError::InvalidMask(format!(
                "line detection needs a non-empty mask, got {width}x{height}"
            )));
        }
        let p = &self.params;
        if !(p.rho.is_finite() && p.theta.is_finite() && p.rho > 0.0 && p.theta > 0.0) {
            return Err(StraightedgeError::InvalidInput(format!(
                "line transform resolution must be positive (rho {}, theta {})",
                p.rho, p.theta
            )));
        }

        let (w, h) = (width as i64, height as i64);
        let mut accumulator = Accumulator::new(width, height, f64::from(p.rho), f64::from(p.theta));
        let threshold = i64::from(p.threshold);
        let max_gap = i64::from(p.max_line_gap);
        let min_length = i64::from(p.min_line_length);

        let mut live = vec![false; width as usize * height as usize];
        let mut points = Vec::new();
        for (x, y, pixel) in mask.enumerate_pixels() {
            if pixel[0] != 0 {
                live[(y * width + x) as usize] = true;
                points.push((i64::from(x), i64::from(y)));
            }
        }
        points.shuffle(&mut StdRng::seed_from_u64(p.seed));

        let index = |x: i64, y: i64| (y * w + x) as usize;
        let inside = |x: i64, y: i64| x >= 0 && y >= 0 && x < w && y < h;

        let mut segments = Vec::new();
        for &(x, y) in &points {
            if !live[index(x, y)] {
                continue;
            }

            let (best_angle, votes) = accumulator.vote(x, y);
            if i64::from(votes) < threshold {
                continue;
            }

            let (cos, sin) = accumulator.trig[best_angle];
            let forward = LineWalk::through(x, y, cos, sin);
            let walks = [forward, forward.reversed()];

            let mut ends = [(x, y); 2];
            for (end, start) in ends.iter_mut().zip(walks) {
                let mut walk = start;
                let mut gap = 0;
                loop {
                    let (px, py) = walk.pixel();
                    if !inside(px, py) {
                        break;
                    }
                    if live[index(px, py)] {
                        gap = 0;
                        *end = (px, py);
                    } else {
                        gap += 1;
                        if gap > max_gap {
                            break;
                        }
                    }
                    walk.advance();
                }
            }

            let accepted = (ends[1].0 - ends[0].0).abs() >= min_length
                || (ends[1].1 - ends[0].1).abs() >= min_length;

            // Consume the pixels along the segment
            for (end, start) in ends.iter().zip(walks) {
                let mut walk = start;
                loop {
                    let (px, py) = walk.pixel();
                    if !inside(px, py) {
                        break;
                    }
                    if live[index(px, py)] {
                        if accepted {
                            accumulator.unvote(px, py);
                        }
                        live[index(px, py)] = false;
                    }
                    if (px, py) == *end {
                        break;
                    }
                    walk.advance();
                }
            }

            if accepted {
                segments.push(LineSegment::new(
                    Point::new(ends[0].0 as f32, ends[0].1 as f32),
                    Point::new(ends[1].0 as f32, ends[1].1 as f32),
                ));
            }
        }

        debug!(set_pixels = points.len(), segments = segments.len(), "detected line segments");
        Ok(segments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    fn horizontal_band() -> GrayImage {
        let mut mask = GrayImage::new(60, 30);
        for y in 9..=11 {
            for x in 5..=45 {
                mask.put_pixel(x, y, Luma([255]));
            }
        }
        mask
    }

    #[test]
    fn test_empty_mask_has_no_segments() {
        let segments = ProbabilisticHough::default()
            .detect_segments(&GrayImage::new(30, 30))
            .expect("detect");
        assert!(segments.is_empty());
    }

    #[test]
    fn test_zero_sized_mask_is_rejected() {
        let err = ProbabilisticHough::default()
            .detect_segments(&GrayImage::new(0, 5))
            .unwrap_err();
        assert!(matches!(err, StraightedgeError::InvalidMask(_)));
    }

    #[test]
    fn test_sparse_points_stay_below_threshold() {
        let mut mask = GrayImage::new(50, 50);
        for (x, y) in [(3, 40), (17, 2), (25, 31), (40, 9), (44, 44)] {
            mask.put_pixel(x, y, Luma([255]));
        }
        let segments = ProbabilisticHough::default().detect_segments(&mask).expect("detect");
        assert!(segments.is_empty());
    }

    #[test]
    fn test_band_yields_long_horizontal_segment() {
        let segments = ProbabilisticHough::default()
            .detect_segments(&horizontal_band())
            .expect("detect");
        assert!(!segments.is_empty());

        for s in &segments {
            for p in [s.p1, s.p2] {
                assert!((9.0..=11.0).contains(&p.y), "endpoint off the band: {s:?}");
                assert!((5.0..=45.0).contains(&p.x), "endpoint off the band: {s:?}");
            }
        }
        let longest = segments.iter().map(LineSegment::length).fold(0.0, f32::max);
        assert!(longest > 15.0, "longest segment {longest}");
    }

    #[test]
    fn test_coarse_resolution_does_not_overflow_accumulator() {
        for rho in [3000.0, 150.0, 0.01] {
            let detector = ProbabilisticHough::new(HoughParameters { rho, ..HoughParameters::default() });
            assert!(detector.detect_segments(&horizontal_band()).is_ok(), "rho {rho}");
        }
        let detector = ProbabilisticHough::new(HoughParameters { theta: 10.0, ..HoughParameters::default() });
        assert!(detector.detect_segments(&horizontal_band()).is_ok());
    }

    #[test]
    fn test_non_finite_resolution_is_rejected() {
        for (rho, theta) in [(f32::INFINITY, 0.1), (1.0, f32::NAN), (0.0, 0.1)] {
            let detector = ProbabilisticHough::new(HoughParameters { rho, theta, ..HoughParameters::default() });
            let err = detector.detect_segments(&horizontal_band()).unwrap_err();
            assert!(matches!(err, StraightedgeError::InvalidInput(_)));
        }
    }

    #[test]
    fn test_same_seed_is_deterministic() {
        let detector = ProbabilisticHough::default();
        let first = detector.detect_segments(&horizontal_band()).expect("detect");
        let second = detector.detect_segments(&horizontal_band()).expect("detect");
        assert_eq!(first, second);
    }

    #[test]
    fn test_min_line_length_discards_short_segments() {
        let detector = ProbabilisticHough::new(HoughParameters {
            min_line_length: 100,
            ..HoughParameters::default()
        });
        let segments = detector.detect_segments(&horizontal_band()).expect("detect");
        assert!(segments.is_empty());
    }

    #[test]
    fn test_walk_steps_along_line_direction() {
        // Normal at 90 degrees: the line is horizontal
        let mut walk = LineWalk::through(4, 7, 0.0, 1.0);
        assert_eq!(walk.pixel(), (4, 7));
        walk.advance();
        let (x, y) = walk.pixel();
        assert_eq!(y, 7);
        assert_eq!((x - 4).abs(), 1);
    }
}
