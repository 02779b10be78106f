use std::path::PathBuf;

use anyhow::{Context, Result};
use lens_fc::SimConfig;
use lens_geo::CoverageConfig;
use lens_mission::{HotpointConfig, SurveyConfig};
use lens_proto::{Coordinate, Length};

/// Lane spacing the field planner has always used.
const DEFAULT_LANE_SPACING_FT: f64 = 40.0;
const DEFAULT_SURVEY_ALT_M: f32 = 30.0;

#[derive(Debug, serde::Deserialize)]
pub struct Config {
    pub boundary: BoundaryCfg,
    pub sim: SimConfig,

    pub survey: Option<SurveyCfg>,
    pub hotpoint: Option<HotpointConfig>,
    pub media: Option<MediaCfg>,
}

#[derive(Debug, serde::Deserialize)]
pub struct BoundaryCfg {
    pub vertices: Vec<Coordinate>,
}

#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct SurveyCfg {
    pub lane_spacing_ft: Option<f64>,
    pub sweep_angle_deg: Option<f64>,
    pub altitude_m: Option<f32>,
    pub corner_radius_m: Option<f32>,
    pub photo_at_waypoints: Option<bool>,
    pub auto_speed_m_s: Option<f32>,
    pub max_speed_m_s: Option<f32>,
}

impl SurveyCfg {
    pub fn coverage(&self) -> CoverageConfig {
        CoverageConfig {
            lane_spacing: Length::from_feet(self.lane_spacing_ft.unwrap_or(DEFAULT_LANE_SPACING_FT)),
            sweep_angle_deg: self.sweep_angle_deg.unwrap_or(0.0),
        }
    }

    pub fn mission(&self) -> SurveyConfig {
        SurveyConfig {
            altitude_m: self.altitude_m.unwrap_or(DEFAULT_SURVEY_ALT_M),
            corner_radius_m: self.corner_radius_m,
            photo_at_waypoints: self.photo_at_waypoints,
            auto_speed_m_s: self.auto_speed_m_s,
            max_speed_m_s: self.max_speed_m_s,
        }
    }
}

#[derive(Debug, serde::Deserialize)]
pub struct MediaCfg {
    /// Directory standing in for the aircraft's SD card.
    pub source_dir: PathBuf,
    pub library_dir: PathBuf,
    pub temp_dir: Option<PathBuf>,
    pub ledger_path: Option<PathBuf>,
    /// Overrides the stored ledger.
    pub pre_flight_count: Option<usize>,
    pub chunk_size: Option<usize>,
    /// Optional: resume attempts after a failed chunk. Default 3.
    pub retries: Option<u32>,
}

impl MediaCfg {
    pub fn temp_dir(&self) -> PathBuf {
        self.temp_dir.clone().unwrap_or_else(|| std::env::temp_dir().join("lens-media"))
    }

    pub fn ledger_path(&self) -> PathBuf {
        self.ledger_path.clone().unwrap_or_else(|| PathBuf::from("lens-ledger.json"))
    }
}

impl Config {
    pub fn survey(&self) -> SurveyCfg {
        self.survey.clone().unwrap_or_default()
    }

    pub fn hotpoint(&self) -> HotpointConfig {
        self.hotpoint.clone().unwrap_or_default()
    }
}

pub fn load_config(path: &str) -> Result<Config> {
    let s = std::fs::read_to_string(path).context("read config")?;
    toml::from_str(&s).context("parse config toml")
}

#[cfg(test)]
mod tests {
    use super::*;
    use lens_mission::OrbitDirection;

    const MINIMAL: &str = r#"
[boundary]
vertices = [
  { lat = 40.0, lon = -88.0 },
  { lat = 40.0, lon = -87.999 },
  { lat = 40.001, lon = -87.999 },
]

[sim]
home_lat = 40.0
home_lon = -88.0
"#;

    #[test]
    fn minimal_config_gets_defaults() {
        let cfg: Config = toml::from_str(MINIMAL).unwrap();
        assert_eq!(cfg.boundary.vertices.len(), 3);
        let survey = cfg.survey();
        assert!((survey.coverage().lane_spacing.feet() - 40.0).abs() < 1e-9);
        assert_eq!(survey.mission().altitude_m, 30.0);
        assert_eq!(cfg.hotpoint().orbit, OrbitDirection::Clockwise);
        assert!(cfg.media.is_none());
    }

    #[test]
    fn full_config_parses() {
        let text = format!(
            r#"{MINIMAL}
reject_kinds = ["hotpoint-mission"]
finish_fault = "signal-lost"

[survey]
lane_spacing_ft = 60
altitude_m = 45
sweep_angle_deg = 30

[hotpoint]
orbit = "counter-clockwise"

[media]
source_dir = "/mnt/card"
library_dir = "/srv/photos"
chunk_size = 4096
"#
        );
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lens.toml");
        std::fs::write(&path, text).unwrap();

        let cfg = load_config(path.to_str().unwrap()).unwrap();
        assert_eq!(cfg.sim.reject_kinds.len(), 1);
        assert_eq!(cfg.survey().coverage().sweep_angle_deg, 30.0);
        assert_eq!(cfg.survey().mission().altitude_m, 45.0);
        assert_eq!(cfg.hotpoint().orbit, OrbitDirection::CounterClockwise);
        let media = cfg.media.unwrap();
        assert_eq!(media.chunk_size, Some(4096));
        assert_eq!(media.ledger_path(), PathBuf::from("lens-ledger.json"));
    }
}
