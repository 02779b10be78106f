//! Boustrophedon coverage planning.
//!
//! Lanes are horizontal in the sweep frame, spaced `lane_spacing` apart and
//! starting on the lowest edge of the bounding box. Each lane is clipped to
//! the polygon interior; consecutive lanes alternate direction so the aircraft
//! turns into the next lane instead of flying back across the field.

use lens_proto::{Coordinate, Length};
use serde::Serialize;
use tracing::debug;

use crate::planar::{self, Bounds, Point};
use crate::polygon::BoundaryPolygon;
use crate::projection::{haversine_m, LocalFrame};
use crate::GeoError;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoverageConfig {
    pub lane_spacing: Length,
    /// Rotation of the lanes from east-west, counter-clockwise.
    pub sweep_angle_deg: f64,
}

impl CoverageConfig {
    pub fn new(lane_spacing: Length) -> Self {
        Self { lane_spacing, sweep_angle_deg: 0.0 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoveragePath {
    points: Vec<Coordinate>,
    lanes: usize,
}

impl CoveragePath {
    pub fn points(&self) -> &[Coordinate] {
        &self.points
    }

    pub fn lanes(&self) -> usize {
        self.lanes
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Spacing larger than the field leaves nothing to fly.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn length_m(&self) -> f64 {
        self.points.windows(2).map(|w| haversine_m(w[0], w[1])).sum()
    }
}

/// Planar sweep result, in the units of the input ring.
#[derive(Debug, Clone, PartialEq)]
pub struct Sweep {
    pub points: Vec<Point>,
    pub lanes: usize,
}

pub fn plan(boundary: &BoundaryPolygon, lane_spacing: Length) -> Result<CoveragePath, GeoError> {
    plan_with(boundary, &CoverageConfig::new(lane_spacing))
}

pub fn plan_with(boundary: &BoundaryPolygon, cfg: &CoverageConfig) -> Result<CoveragePath, GeoError> {
    let frame = LocalFrame::new(boundary.bounds_center());
    let theta = cfg.sweep_angle_deg.to_radians();

    let ring: Vec<Point> = boundary
        .vertices()
        .iter()
        .map(|c| frame.to_xy(*c).rotated(-theta))
        .collect();

    let sweep = sweep(&ring, cfg.lane_spacing.meters())?;
    let points: Vec<Coordinate> = sweep
        .points
        .iter()
        .map(|p| frame.to_coord(p.rotated(theta)))
        .collect();

    debug!(
        "coverage: {} lanes, {} points, spacing {:.1}m, angle {:.1}deg",
        sweep.lanes,
        points.len(),
        cfg.lane_spacing.meters(),
        cfg.sweep_angle_deg
    );

    Ok(CoveragePath { points, lanes: sweep.lanes })
}

pub fn sweep(ring: &[Point], spacing: f64) -> Result<Sweep, GeoError> {
    if !(spacing.is_finite() && spacing > 0.0) {
        return Err(GeoError::InvalidSpacing(spacing));
    }
    let bounds = match Bounds::of(ring) {
        Some(b) if ring.len() >= BoundaryPolygon::MIN_VERTICES => b,
        _ => {
            return Err(GeoError::InvalidBoundary(format!(
                "need at least {} vertices, got {}",
                BoundaryPolygon::MIN_VERTICES,
                ring.len()
            )))
        }
    };

    let extent = bounds.max_y - bounds.min_y;
    if spacing > extent {
        return Ok(Sweep { points: Vec::new(), lanes: 0 });
    }

    let lane_count = (extent / spacing).ceil() as usize;
    let mut points = Vec::with_capacity(lane_count * 2);
    let mut lanes = 0usize;

    for k in 0..lane_count {
        let y = bounds.min_y + k as f64 * spacing;
        let xs = planar::crossings_at(ring, y);

        let mut segments: Vec<(f64, f64)> = xs
            .chunks_exact(2)
            .map(|pair| (pair[0], pair[1]))
            .filter(|(a, b)| b > a)
            .collect();
        if segments.is_empty() {
            continue;
        }

        // even lanes fly +x, odd lanes -x
        if lanes % 2 == 0 {
            for (a, b) in segments {
                points.push(Point::new(a, y));
                points.push(Point::new(b, y));
            }
        } else {
            segments.reverse();
            for (a, b) in segments {
                points.push(Point::new(b, y));
                points.push(Point::new(a, y));
            }
        }
        lanes += 1;
    }

    Ok(Sweep { points, lanes })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_square() -> Vec<Point> {
        vec![Point::new(0.0, 0.0), Point::new(0.0, 1.0), Point::new(1.0, 1.0), Point::new(1.0, 0.0)]
    }

    fn field() -> BoundaryPolygon {
        BoundaryPolygon::new(vec![
            Coordinate::new(40.0000, -88.0000),
            Coordinate::new(40.0010, -88.0000),
            Coordinate::new(40.0010, -87.9985),
            Coordinate::new(40.0002, -87.9980),
            Coordinate::new(40.0000, -87.9990),
        ])
        .unwrap()
    }

    #[test]
    fn unit_square_at_half_spacing_gives_two_lanes() {
        let s = sweep(&unit_square(), 0.5).unwrap();
        assert_eq!(s.lanes, 2);
        assert_eq!(
            s.points,
            vec![Point::new(0.0, 0.0), Point::new(1.0, 0.0), Point::new(1.0, 0.5), Point::new(0.0, 0.5)]
        );
    }

    #[test]
    fn lane_count_is_ceil_of_extent_over_spacing() {
        let s = sweep(&unit_square(), 0.3).unwrap();
        assert_eq!(s.lanes, 4);
        assert_eq!(s.points.len(), 8);
    }

    #[test]
    fn spacing_beyond_extent_is_empty_not_error() {
        let s = sweep(&unit_square(), 2.0).unwrap();
        assert!(s.points.is_empty());
        assert_eq!(s.lanes, 0);
    }

    #[test]
    fn non_positive_spacing_is_rejected() {
        assert_eq!(sweep(&unit_square(), 0.0), Err(GeoError::InvalidSpacing(0.0)));
        assert!(matches!(sweep(&unit_square(), f64::NAN), Err(GeoError::InvalidSpacing(_))));
    }

    #[test]
    fn lanes_alternate_direction() {
        let s = sweep(&unit_square(), 0.1).unwrap();
        for (lane, pair) in s.points.chunks_exact(2).enumerate() {
            let dx = pair[1].x - pair[0].x;
            if lane % 2 == 0 {
                assert!(dx > 0.0, "lane {lane} should run +x");
            } else {
                assert!(dx < 0.0, "lane {lane} should run -x");
            }
            assert_eq!(pair[0].y, pair[1].y);
        }
    }

    #[test]
    fn concave_lane_splits_into_ordered_segments() {
        let u = vec![
            Point::new(0.0, 0.0),
            Point::new(3.0, 0.0),
            Point::new(3.0, 3.0),
            Point::new(2.0, 3.0),
            Point::new(2.0, 1.0),
            Point::new(1.0, 1.0),
            Point::new(1.0, 3.0),
            Point::new(0.0, 3.0),
        ];
        let s = sweep(&u, 1.0).unwrap();
        assert_eq!(s.lanes, 3);
        // lane 1 sits on the notch floor and splits in two, flown -x
        let lane1: Vec<f64> = s.points[2..6].iter().map(|p| p.x).collect();
        assert_eq!(lane1, vec![3.0, 2.0, 1.0, 0.0]);
        // lane 2 crosses both arms, flown +x
        let lane2: Vec<f64> = s.points[6..].iter().map(|p| p.x).collect();
        assert_eq!(lane2, vec![0.0, 1.0, 2.0, 3.0]);
    }

    #[test]
    fn geodetic_plan_is_deterministic_and_stays_in_extent() {
        let poly = field();
        let a = plan(&poly, Length::from_feet(40.0)).unwrap();
        let b = plan(&poly, Length::from_feet(40.0)).unwrap();
        assert_eq!(a, b);
        assert!(!a.is_empty());

        let (min_lat, max_lat) = (40.0 - 1e-9, 40.0010 + 1e-9);
        let (min_lon, max_lon) = (-88.0000 - 1e-9, -87.9980 + 1e-9);
        for p in a.points() {
            assert!(p.lat >= min_lat && p.lat <= max_lat, "{p:?}");
            assert!(p.lon >= min_lon && p.lon <= max_lon, "{p:?}");
        }
        assert!(a.length_m() > 0.0);
    }

    #[test]
    fn rotated_sweep_still_covers() {
        let poly = field();
        let cfg = CoverageConfig { lane_spacing: Length::from_meters(15.0), sweep_angle_deg: 90.0 };
        let path = plan_with(&poly, &cfg).unwrap();
        assert!(path.lanes() >= 2);
        assert_eq!(path.len() % 2, 0);
    }
}
