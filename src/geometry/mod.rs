pub mod cumulative;
pub mod flatten;
pub mod latlng;
pub mod polyline;
pub mod projection;

pub use cumulative::CumulativeTable;
pub use flatten::{flatten, LineGeometry};
pub use latlng::{GeoBounds, LatLng};
pub use polyline::Polyline;
pub use projection::{LocalTangentPlane, Projector, WebMercator};
