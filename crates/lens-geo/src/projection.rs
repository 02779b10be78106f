use lens_proto::Coordinate;

use crate::planar::Point;

const EARTH_RADIUS_M: f64 = 6_371_000.0;

pub fn haversine_m(a: Coordinate, b: Coordinate) -> f64 {
    let dlat = (b.lat - a.lat).to_radians();
    let dlon = (b.lon - a.lon).to_radians();
    let h = (dlat / 2.0).sin().powi(2)
        + a.lat.to_radians().cos() * b.lat.to_radians().cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    EARTH_RADIUS_M * c
}

/// Local east/north plane in meters around `origin`.
/// Simple equirectangular projection, good enough for field-sized areas.
#[derive(Debug, Clone, Copy)]
pub struct LocalFrame {
    origin: Coordinate,
    cos_lat: f64,
}

impl LocalFrame {
    pub fn new(origin: Coordinate) -> Self {
        Self { origin, cos_lat: origin.lat.to_radians().cos() }
    }

    pub fn to_xy(&self, c: Coordinate) -> Point {
        let x = (c.lon - self.origin.lon).to_radians() * EARTH_RADIUS_M * self.cos_lat;
        let y = (c.lat - self.origin.lat).to_radians() * EARTH_RADIUS_M;
        Point::new(x, y)
    }

    pub fn to_coord(&self, p: Point) -> Coordinate {
        let lat = self.origin.lat + (p.y / EARTH_RADIUS_M).to_degrees();
        let lon = self.origin.lon + (p.x / (EARTH_RADIUS_M * self.cos_lat)).to_degrees();
        Coordinate::new(lat, lon)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_degree_of_latitude() {
        let d = haversine_m(Coordinate::new(0.0, 0.0), Coordinate::new(1.0, 0.0));
        assert!((d - 111_194.9).abs() < 1.0);
    }

    #[test]
    fn default_offset_is_about_ten_meters() {
        let here = Coordinate::new(0.0, 0.0);
        let d = haversine_m(here, crate::offset_north(here, crate::DEFAULT_OFFSET_DEG));
        assert!((d - 10.0).abs() < 0.05, "got {d}");
    }

    #[test]
    fn frame_round_trips_within_millimeters() {
        let frame = LocalFrame::new(Coordinate::new(40.1, -88.2));
        let c = Coordinate::new(40.1012, -88.1987);
        let back = frame.to_coord(frame.to_xy(c));
        assert!(haversine_m(c, back) < 1e-3);
    }
}
