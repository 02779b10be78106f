use serde::{Deserialize, Serialize};

const METERS_PER_FOOT: f64 = 0.3048;

/// WGS-84 position in degrees. Equality is exact on both components.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Finite and inside the lat/lon ranges.
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && self.lat.abs() <= 90.0
            && self.lon.abs() <= 180.0
    }

    pub fn offset(&self, dlat: f64, dlon: f64) -> Self {
        Self { lat: self.lat + dlat, lon: self.lon + dlon }
    }
}

/// Distance in meters.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Length(f64);

impl Length {
    pub const fn from_meters(m: f64) -> Self {
        Self(m)
    }

    pub fn from_feet(ft: f64) -> Self {
        Self(ft * METERS_PER_FOOT)
    }

    pub fn meters(&self) -> f64 {
        self.0
    }

    pub fn feet(&self) -> f64 {
        self.0 / METERS_PER_FOOT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validity_rejects_out_of_range_and_nan() {
        assert!(Coordinate::new(45.0, -120.0).is_valid());
        assert!(!Coordinate::new(91.0, 0.0).is_valid());
        assert!(!Coordinate::new(0.0, 180.5).is_valid());
        assert!(!Coordinate::new(f64::NAN, 0.0).is_valid());
    }

    #[test]
    fn feet_convert_to_meters() {
        let l = Length::from_feet(40.0);
        assert!((l.meters() - 12.192).abs() < 1e-9);
        assert!((l.feet() - 40.0).abs() < 1e-9);
    }
}
