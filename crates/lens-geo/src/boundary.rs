use lens_proto::Coordinate;
use tracing::debug;

use crate::polygon::BoundaryPolygon;
use crate::GeoError;

/// What the operator's vertex list currently describes.
#[derive(Debug, Clone, PartialEq)]
pub enum BoundaryShape {
    /// Fewer than three vertices: an open line, no polygon exists.
    Line(Vec<Coordinate>),
    /// Three or more vertices; may still fail validation in [`BoundarySession::polygon`].
    Polygon(Vec<Coordinate>),
}

impl BoundaryShape {
    /// Rebuilt from the full vertex list every time, never patched.
    pub fn from_vertices(vertices: &[Coordinate]) -> Self {
        if vertices.len() < BoundaryPolygon::MIN_VERTICES {
            BoundaryShape::Line(vertices.to_vec())
        } else {
            BoundaryShape::Polygon(vertices.to_vec())
        }
    }

    pub fn is_polygon(&self) -> bool {
        matches!(self, BoundaryShape::Polygon(_))
    }
}

/// Operator's boundary while drawing. Locked once a mission is assembled from it.
#[derive(Debug, Clone)]
pub struct BoundarySession {
    vertices: Vec<Coordinate>,
    shape: BoundaryShape,
    locked: bool,
}

impl Default for BoundarySession {
    fn default() -> Self {
        Self::new()
    }
}

impl BoundarySession {
    pub fn new() -> Self {
        Self { vertices: Vec::new(), shape: BoundaryShape::Line(Vec::new()), locked: false }
    }

    pub fn from_vertices(vertices: Vec<Coordinate>) -> Self {
        let shape = BoundaryShape::from_vertices(&vertices);
        Self { vertices, shape, locked: false }
    }

    pub fn add(&mut self, c: Coordinate) -> Result<&BoundaryShape, GeoError> {
        if self.locked {
            return Err(GeoError::SessionLocked);
        }
        self.vertices.push(c);
        self.refresh();
        Ok(&self.shape)
    }

    /// Removes every vertex exactly equal to `c`; returns how many went.
    pub fn remove(&mut self, c: Coordinate) -> Result<usize, GeoError> {
        if self.locked {
            return Err(GeoError::SessionLocked);
        }
        let before = self.vertices.len();
        self.vertices.retain(|v| *v != c);
        let removed = before - self.vertices.len();
        self.refresh();
        Ok(removed)
    }

    pub fn vertices(&self) -> &[Coordinate] {
        &self.vertices
    }

    pub fn shape(&self) -> &BoundaryShape {
        &self.shape
    }

    pub fn polygon(&self) -> Result<BoundaryPolygon, GeoError> {
        BoundaryPolygon::new(self.vertices.clone())
    }

    pub fn lock(&mut self) {
        self.locked = true;
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Clears vertices and lifts the lock.
    pub fn reset(&mut self) {
        self.vertices.clear();
        self.locked = false;
        self.refresh();
    }

    fn refresh(&mut self) {
        self.shape = BoundaryShape::from_vertices(&self.vertices);
        debug!("boundary: {} vertices, polygon={}", self.vertices.len(), self.shape.is_polygon());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shape_switches_between_line_and_polygon() {
        let mut s = BoundarySession::new();
        let a = Coordinate::new(40.0, -88.0);
        let b = Coordinate::new(40.001, -88.0);
        let c = Coordinate::new(40.001, -87.999);

        assert!(!s.add(a).unwrap().is_polygon());
        assert!(!s.add(b).unwrap().is_polygon());
        assert!(s.add(c).unwrap().is_polygon());

        assert_eq!(s.remove(b).unwrap(), 1);
        assert_eq!(s.shape(), &BoundaryShape::Line(vec![a, c]));
        assert!(matches!(s.polygon(), Err(GeoError::InvalidBoundary(_))));
    }

    #[test]
    fn remove_drops_all_exact_duplicates() {
        let a = Coordinate::new(1.0, 1.0);
        let mut s = BoundarySession::from_vertices(vec![a, Coordinate::new(2.0, 2.0), a]);
        assert_eq!(s.remove(a).unwrap(), 2);
        assert_eq!(s.remove(Coordinate::new(9.0, 9.0)).unwrap(), 0);
        assert_eq!(s.vertices().len(), 1);
    }

    #[test]
    fn locked_session_rejects_edits_until_reset() {
        let mut s = BoundarySession::from_vertices(vec![Coordinate::new(1.0, 1.0)]);
        s.lock();
        assert_eq!(s.add(Coordinate::new(2.0, 2.0)).unwrap_err(), GeoError::SessionLocked);
        assert_eq!(s.remove(Coordinate::new(1.0, 1.0)).unwrap_err(), GeoError::SessionLocked);
        s.reset();
        assert!(!s.is_locked());
        assert!(s.vertices().is_empty());
    }
}
