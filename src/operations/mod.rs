mod footprint;
mod slice;

pub use footprint::{BoxFootprint, ClickFootprint, ClickHit};
pub use slice::SliceLine;
