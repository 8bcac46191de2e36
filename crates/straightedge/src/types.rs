use geo_types::{Coord, LineString};
use serde::{Deserialize, Serialize};

/// A 2D coordinate, either in working (downscaled) space or in source space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Multiply both coordinates by `factor`
    pub fn scaled(self, factor: f32) -> Self {
        Self::new(self.x * factor, self.y * factor)
    }

    pub fn distance(self, other: Point) -> f32 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }
}

impl From<Point> for Coord<f32> {
    fn from(p: Point) -> Self {
        Coord { x: p.x, y: p.y }
    }
}

/// An ordered polyline traced around a boundary.
///
/// Point order is the tracing order and defines the path.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Contour {
    pub points: Vec<Point>,
}

impl Contour {
    pub fn new(points: Vec<Point>) -> Self {
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> Option<Point> {
        self.points.first().copied()
    }

    pub fn last(&self) -> Option<Point> {
        self.points.last().copied()
    }

    /// Copy of this contour with every point multiplied by `factor`
    pub fn scaled(&self, factor: f32) -> Contour {
        Contour::new(self.points.iter().map(|p| p.scaled(factor)).collect())
    }

    /// Convert to a geo-types LineString for geometric operations
    pub fn to_line_string(&self) -> LineString<f32> {
        LineString::new(self.points.iter().copied().map(Coord::from).collect())
    }

    /// Euclidean length of the polyline
    pub fn length(&self) -> f32 {
        use geo::EuclideanLength;
        self.to_line_string().euclidean_length()
    }

    /// Straight connectors between each consecutive pair of points
    pub fn lines(&self) -> impl Iterator<Item = LineSegment> + '_ {
        self.points
            .windows(2)
            .map(|pair| LineSegment::new(pair[0], pair[1]))
    }

    /// Axis-aligned bounds as `(min, max)`, `None` for an empty contour
    pub fn bounding_box(&self) -> Option<(Point, Point)> {
        use geo::BoundingRect;
        self.to_line_string()
            .bounding_rect()
            .map(|rect| (Point::new(rect.min().x, rect.min().y), Point::new(rect.max().x, rect.max().y)))
    }
}

impl From<Vec<Point>> for Contour {
    fn from(points: Vec<Point>) -> Self {
        Self::new(points)
    }
}

/// A straight segment between two endpoints. Endpoint order is kept as detected.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LineSegment {
    pub p1: Point,
    pub p2: Point,
}

impl LineSegment {
    pub const fn new(p1: Point, p2: Point) -> Self {
        Self { p1, p2 }
    }

    pub fn scaled(self, factor: f32) -> Self {
        Self::new(self.p1.scaled(factor), self.p2.scaled(factor))
    }

    pub fn length(&self) -> f32 {
        use geo::EuclideanLength;
        geo_types::Line::new(Coord::from(self.p1), Coord::from(self.p2)).euclidean_length()
    }

    pub fn to_line_string(&self) -> LineString<f32> {
        LineString::new(vec![self.p1.into(), self.p2.into()])
    }
}

/// Everything one pipeline invocation produces for a frame.
///
/// `contours` and `segments` are in source-image coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameDetection {
    /// Filtered and smoothed contours
    pub contours: Vec<Contour>,
    /// Straight segments found on the rasterized contour mask
    pub segments: Vec<LineSegment>,
    /// Factor mapping working coordinates back to source coordinates
    pub scale: f32,
    pub working_width: u32,
    pub working_height: u32,
    pub image_width: u32,
    pub image_height: u32,
}

impl FrameDetection {
    pub fn is_empty(&self) -> bool {
        self.contours.is_empty() && self.segments.is_empty()
    }

    /// Flatten every contour into its consecutive-point connectors
    pub fn contour_lines(&self) -> Vec<LineSegment> {
        self.contours.iter().flat_map(|c| c.lines()).collect()
    }
}
