//! Partial-polyline coverage engine.
//!
//! Tracks which meter ranges of CAD-derived cable, trench and earthing lines
//! are done, as drawn by rectangle and click selections on a map. Coverage
//! is kept as disjoint 1-D intervals per line in two passes, an editable
//! draft and an append-only committed set, and materialized as [`Part`]
//! records whose coordinates lie exactly on the base line.
//!
//! [`Part`]: coverage::Part

pub mod config;
pub mod coverage;
pub mod dataset;
pub mod error;
pub mod geometry;
pub mod math;
pub mod operations;
pub mod session;

pub use config::CoverageConfig;
pub use coverage::{CoverageStore, EditReport, Part, PartId, Pass, SelectionMode, SelectionRect};
pub use dataset::{GeometryStore, LineKey, LineMeta};
pub use error::{PolycoverError, Result};
pub use session::{CoverageSession, SessionKey};
