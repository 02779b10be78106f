pub mod boundary;
pub mod coverage;
pub mod doctor;
pub mod planar;
pub mod polygon;
pub mod projection;

use lens_proto::Coordinate;

pub use boundary::{BoundarySession, BoundaryShape};
pub use coverage::{plan, plan_with, CoverageConfig, CoveragePath};
pub use polygon::BoundaryPolygon;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GeoError {
    #[error("invalid boundary: {0}")]
    InvalidBoundary(String),
    #[error("invalid lane spacing: {0}")]
    InvalidSpacing(f64),
    #[error("boundary is locked by an assembled mission")]
    SessionLocked,
}

/// Fixed offset used by the default missions: roughly 10 m of latitude.
pub const DEFAULT_OFFSET_DEG: f64 = 0.0000899322;

pub fn offset_north(c: Coordinate, deg: f64) -> Coordinate {
    c.offset(deg, 0.0)
}

pub fn offset_east(c: Coordinate, deg: f64) -> Coordinate {
    c.offset(0.0, deg)
}

pub fn offset_south(c: Coordinate, deg: f64) -> Coordinate {
    c.offset(-deg, 0.0)
}

pub fn offset_west(c: Coordinate, deg: f64) -> Coordinate {
    c.offset(0.0, -deg)
}
