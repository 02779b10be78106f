//! Waypoint mission flown over a coverage path.

use lens_geo::CoveragePath;
use lens_proto::mission::{
    FinishAction, HeadingMode, Mission, MissionSettings, PathMode, StartMode, TurnMode, Waypoint, WaypointAction,
};
use serde::Deserialize;
use tracing::info;

use crate::MissionError;

/// Nadir.
const SURVEY_GIMBAL_PITCH_DEG: f32 = -90.0;

#[derive(Debug, Clone, Deserialize)]
pub struct SurveyConfig {
    pub altitude_m: f32,

    /// Optional: corner radius at each lane end. Default 2 m.
    pub corner_radius_m: Option<f32>,

    /// Optional: shoot a photo at every waypoint. Default true.
    pub photo_at_waypoints: Option<bool>,

    /// Optional: default 8 m/s.
    pub auto_speed_m_s: Option<f32>,

    /// Optional: default 15 m/s.
    pub max_speed_m_s: Option<f32>,
}

impl SurveyConfig {
    pub fn at_altitude(altitude_m: f32) -> Self {
        Self {
            altitude_m,
            corner_radius_m: None,
            photo_at_waypoints: None,
            auto_speed_m_s: None,
            max_speed_m_s: None,
        }
    }
}

pub fn build_survey_mission(path: &CoveragePath, cfg: &SurveyConfig) -> Result<Mission, MissionError> {
    let first = match path.points().first() {
        Some(c) => *c,
        None => return Err(MissionError::InvalidBoundary("coverage path is empty".into())),
    };

    let corner = cfg.corner_radius_m.unwrap_or(2.0);
    let actions = if cfg.photo_at_waypoints.unwrap_or(true) {
        vec![WaypointAction::ShootPhoto]
    } else {
        Vec::new()
    };

    let waypoints: Vec<Waypoint> = path
        .points()
        .iter()
        .map(|c| Waypoint {
            altitude_m: cfg.altitude_m,
            corner_radius_m: corner,
            turn_mode: TurnMode::Clockwise,
            gimbal_pitch_deg: SURVEY_GIMBAL_PITCH_DEG,
            actions: actions.clone(),
            ..Waypoint::at(*c)
        })
        .collect();

    info!(
        "survey: {} waypoints over {} lanes at {:.0}m, {:.0}m of track",
        waypoints.len(),
        path.lanes(),
        cfg.altitude_m,
        path.length_m()
    );

    Ok(Mission {
        settings: MissionSettings {
            max_flight_speed_m_s: cfg.max_speed_m_s.unwrap_or(15.0),
            auto_flight_speed_m_s: cfg.auto_speed_m_s.unwrap_or(8.0),
            finish_action: FinishAction::GoHome,
            heading_mode: HeadingMode::Auto,
            path_mode: PathMode::Normal,
            point_of_interest: Some(first),
            rotate_gimbal_pitch: true,
            exit_on_signal_lost: true,
            start_mode: StartMode::PointToPoint,
            repeat_times: 1,
        },
        waypoints,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use lens_geo::{plan, BoundaryPolygon};
    use lens_proto::{Coordinate, Length};

    fn field() -> BoundaryPolygon {
        BoundaryPolygon::new(vec![
            Coordinate::new(40.0, -88.0),
            Coordinate::new(40.0, -87.999),
            Coordinate::new(40.001, -87.999),
            Coordinate::new(40.001, -88.0),
        ])
        .unwrap()
    }

    #[test]
    fn one_nadir_waypoint_per_path_point() {
        let path = plan(&field(), Length::from_feet(40.0)).unwrap();
        let m = build_survey_mission(&path, &SurveyConfig::at_altitude(40.0)).unwrap();

        assert_eq!(m.len(), path.len());
        for (w, c) in m.waypoints.iter().zip(path.points()) {
            assert_eq!(w.coordinate, *c);
            assert_eq!(w.altitude_m, 40.0);
            assert_eq!(w.gimbal_pitch_deg, -90.0);
            assert_eq!(w.actions, vec![WaypointAction::ShootPhoto]);
        }
        assert_eq!(m.settings.finish_action, FinishAction::GoHome);
        assert_eq!(m.settings.point_of_interest, Some(path.points()[0]));
    }

    #[test]
    fn photo_action_is_optional() {
        let path = plan(&field(), Length::from_meters(20.0)).unwrap();
        let mut cfg = SurveyConfig::at_altitude(30.0);
        cfg.photo_at_waypoints = Some(false);
        let m = build_survey_mission(&path, &cfg).unwrap();
        assert!(m.waypoints.iter().all(|w| w.actions.is_empty()));
    }

    #[test]
    fn empty_path_is_an_invalid_boundary() {
        let path = plan(&field(), Length::from_meters(10_000.0)).unwrap();
        assert!(path.is_empty());
        let err = build_survey_mission(&path, &SurveyConfig::at_altitude(30.0)).unwrap_err();
        assert!(matches!(err, MissionError::InvalidBoundary(_)));
    }
}
