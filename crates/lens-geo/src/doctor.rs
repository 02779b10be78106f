use anyhow::{Context, Result};
use lens_proto::{Coordinate, Length};

use crate::coverage::plan;
use crate::polygon::BoundaryPolygon;

pub fn check_boundary(vertices: &[Coordinate]) -> Result<BoundaryPolygon> {
    anyhow::ensure!(vertices.len() >= 3, "boundary.vertices must have >= 3 points");
    BoundaryPolygon::new(vertices.to_vec()).context("boundary.vertices")
}

pub fn check_lane_spacing(spacing: Length, boundary: &BoundaryPolygon) -> Result<()> {
    anyhow::ensure!(spacing.meters() >= 1.0, "survey.lane_spacing too small (< 1 m)");
    anyhow::ensure!(spacing.meters() <= 500.0, "survey.lane_spacing too large (> 500 m)");
    let path = plan(boundary, spacing).context("plan coverage")?;
    anyhow::ensure!(!path.is_empty(), "survey.lane_spacing exceeds the boundary extent; nothing to fly");
    Ok(())
}

pub fn check_altitude(altitude_m: f32) -> Result<()> {
    anyhow::ensure!(altitude_m >= 5.0 && altitude_m <= 120.0, "survey.altitude_m should be 5..120");
    Ok(())
}

pub fn check_home(home: Coordinate) -> Result<()> {
    anyhow::ensure!(home.is_valid(), "home coordinates invalid");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn doctor_flags_tiny_field_for_wide_spacing() {
        let poly = check_boundary(&[
            Coordinate::new(40.0, -88.0),
            Coordinate::new(40.0001, -88.0),
            Coordinate::new(40.0001, -87.9999),
        ])
        .unwrap();
        assert!(check_lane_spacing(Length::from_feet(40.0), &poly).is_err());
        assert!(check_lane_spacing(Length::from_meters(2.0), &poly).is_ok());
    }

    #[test]
    fn doctor_bounds_altitude() {
        assert!(check_altitude(30.0).is_ok());
        assert!(check_altitude(400.0).is_err());
    }
}
