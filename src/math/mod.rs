pub mod clip_2d;
pub mod distance_2d;
pub mod geodesic;
pub mod interval;

/// 2D point in projected (renderer) space.
pub type Point2 = nalgebra::Point2<f64>;

/// 2D vector in projected (renderer) space.
pub type Vector2 = nalgebra::Vector2<f64>;

/// Global tolerance for floating-point comparisons of projected coordinates
/// and segment parameters.
pub const TOLERANCE: f64 = 1e-10;
