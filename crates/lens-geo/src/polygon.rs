use lens_proto::Coordinate;
use serde::Serialize;

use crate::planar::{self, Bounds, Point};
use crate::GeoError;

// Roughly 1 m² at mid latitudes, expressed in square degrees.
const MIN_AREA_DEG2: f64 = 1e-11;

/// Simple polygon with at least three vertices. Only built through [`BoundaryPolygon::new`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoundaryPolygon {
    vertices: Vec<Coordinate>,
}

impl BoundaryPolygon {
    pub const MIN_VERTICES: usize = 3;

    /// A trailing vertex equal to the first one closes the ring and is dropped.
    pub fn new(mut vertices: Vec<Coordinate>) -> Result<Self, GeoError> {
        if vertices.len() > 1 && vertices.first() == vertices.last() {
            vertices.pop();
        }

        if vertices.len() < Self::MIN_VERTICES {
            return Err(GeoError::InvalidBoundary(format!(
                "need at least {} vertices, got {}",
                Self::MIN_VERTICES,
                vertices.len()
            )));
        }

        if let Some((i, c)) = vertices.iter().enumerate().find(|(_, c)| !c.is_valid()) {
            return Err(GeoError::InvalidBoundary(format!(
                "vertex {} is not a valid coordinate ({}, {})",
                i, c.lat, c.lon
            )));
        }

        let n = vertices.len();
        for i in 0..n {
            if vertices[i] == vertices[(i + 1) % n] {
                return Err(GeoError::InvalidBoundary(format!("vertex {} repeats its neighbour", (i + 1) % n)));
            }
        }

        let ring = planar_ring(&vertices);
        if !planar::is_simple(&ring) {
            return Err(GeoError::InvalidBoundary("boundary edges cross each other".into()));
        }
        if planar::signed_area(&ring).abs() < MIN_AREA_DEG2 {
            return Err(GeoError::InvalidBoundary("boundary encloses no area".into()));
        }

        Ok(Self { vertices })
    }

    pub fn vertices(&self) -> &[Coordinate] {
        &self.vertices
    }

    pub fn contains(&self, c: Coordinate) -> bool {
        planar::contains(&planar_ring(&self.vertices), Point::new(c.lon, c.lat))
    }

    /// Centre of the lat/lon bounding box.
    pub fn bounds_center(&self) -> Coordinate {
        let ring = planar_ring(&self.vertices);
        let center = Bounds::of(&ring).map(|b| b.center()).unwrap_or(Point::new(0.0, 0.0));
        Coordinate::new(center.y, center.x)
    }
}

fn planar_ring(vertices: &[Coordinate]) -> Vec<Point> {
    vertices.iter().map(|c| Point::new(c.lon, c.lat)).collect()
}
