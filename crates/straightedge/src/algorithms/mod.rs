pub mod downscale;
pub mod edges;
pub mod contours;
pub mod rasterize;
pub mod hough;
pub mod smoothing;

pub use downscale::*;
pub use edges::*;
pub use contours::*;
pub use rasterize::*;
pub use hough::*;
pub use smoothing::*;
