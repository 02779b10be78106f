use lens_fc::FlightLink;
use lens_geo::{offset_east, offset_north, offset_south, offset_west, DEFAULT_OFFSET_DEG};
use lens_proto::mission::{
    FinishAction, HeadingMode, HotpointHeading, HotpointMission, HotpointStartPoint, Mission, MissionSettings,
    PathMode, StartMode, TurnMode, Waypoint,
};
use lens_proto::timeline::{GimbalAttitude, PhotoMode, TimelineElement, TimelineElementKind, VideoMode};
use lens_proto::Coordinate;
use serde::Deserialize;

use crate::MissionError;

const GO_TO_ALTITUDE_M: f32 = 30.0;
const GIMBAL_PITCH_DEG: f32 = 30.0;
const CONTINUOUS_PHOTO_COUNT: u32 = 10;
const CONTINUOUS_PHOTO_INTERVAL_S: f64 = 3.0;
const RECORD_DURATION_S: f64 = 10.0;
const YAW_RELATIVE_DEG: f32 = 36.0;
const YAW_RATE_DEG_S: f32 = 30.0;

const HOTPOINT_ALTITUDE_M: f32 = 15.0;
const HOTPOINT_RADIUS_M: f32 = 15.0;
const HOTPOINT_SURROUND_DEG: f32 = 180.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OrbitDirection {
    #[default]
    Clockwise,
    CounterClockwise,
    /// Coin flip per build.
    Random,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HotpointConfig {
    #[serde(default)]
    pub orbit: OrbitDirection,

    /// Optional: fastest tangential speed allowed on the circle. Default 10 m/s.
    pub max_tangential_speed_m_s: Option<f32>,

    /// Optional: hard cap on angular velocity. Default 30 deg/s.
    pub max_angular_velocity_deg_s: Option<f32>,
}

impl HotpointConfig {
    /// Largest angular velocity (deg/s, unsigned) the aircraft may orbit at for `radius_m`.
    pub fn max_angular_velocity(&self, radius_m: f32) -> f32 {
        let cap = self.max_angular_velocity_deg_s.unwrap_or(30.0);
        if radius_m <= 0.0 {
            return cap;
        }
        let v = self.max_tangential_speed_m_s.unwrap_or(10.0);
        (v / radius_m).to_degrees().min(cap)
    }

    fn orbit_sign(&self) -> f32 {
        let clockwise = match self.orbit {
            OrbitDirection::Clockwise => true,
            OrbitDirection::CounterClockwise => false,
            OrbitDirection::Random => rand::random::<bool>(),
        };
        if clockwise { 1.0 } else { -1.0 }
    }
}

/// Aircraft facts the builder may need.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuildContext {
    pub current_location: Option<Coordinate>,
}

impl BuildContext {
    pub fn at(location: Coordinate) -> Self {
        Self { current_location: Some(location) }
    }

    pub fn from_link(link: &dyn FlightLink) -> Self {
        Self { current_location: link.current_location() }
    }

    fn location(&self) -> Result<Coordinate, MissionError> {
        self.current_location
            .filter(|c| c.is_valid())
            .ok_or(MissionError::LocationUnavailable)
    }
}

/// Maps each [`TimelineElementKind`] to its default element. Stateless apart from config.
#[derive(Debug, Clone, Default)]
pub struct MissionBuilder {
    hotpoint: HotpointConfig,
}

impl MissionBuilder {
    pub fn new(hotpoint: HotpointConfig) -> Self {
        Self { hotpoint }
    }

    pub fn build(&self, kind: TimelineElementKind, ctx: &BuildContext) -> Result<TimelineElement, MissionError> {
        use TimelineElementKind as K;

        let element = match kind {
            K::TakeOff => TimelineElement::TakeOff,
            K::GoTo => TimelineElement::GoTo { target: ctx.location()?, altitude_m: GO_TO_ALTITUDE_M },
            K::GoHome => TimelineElement::GoHome,
            K::GimbalAttitude => TimelineElement::GimbalAttitude(GimbalAttitude {
                pitch_deg: GIMBAL_PITCH_DEG,
                roll_deg: 0.0,
                yaw_deg: 0.0,
            }),
            K::SingleShotPhoto => TimelineElement::ShootPhoto(PhotoMode::Single),
            K::ContinuousShotPhoto => TimelineElement::ShootPhoto(PhotoMode::Continuous {
                count: CONTINUOUS_PHOTO_COUNT,
                interval_s: CONTINUOUS_PHOTO_INTERVAL_S,
            }),
            K::RecordVideoDuration => TimelineElement::RecordVideo(VideoMode::Duration { seconds: RECORD_DURATION_S }),
            K::RecordVideoStart => TimelineElement::RecordVideo(VideoMode::Start),
            K::RecordVideoStop => TimelineElement::RecordVideo(VideoMode::Stop),
            K::WaypointMission => TimelineElement::WaypointMission(self.default_waypoint_mission(ctx.location()?)),
            K::HotpointMission => self.default_hotpoint(ctx.location()?),
            K::AircraftYaw => TimelineElement::AircraftYaw {
                relative_angle_deg: YAW_RELATIVE_DEG,
                angular_velocity_deg_s: YAW_RATE_DEG_S,
            },
        };
        Ok(element)
    }

    /// Small loop around `here`: north, east, south, west, then north again, climbing 1 m per leg.
    pub fn default_waypoint_mission(&self, here: Coordinate) -> Mission {
        let north = offset_north(here, DEFAULT_OFFSET_DEG);
        let legs = [
            (north, 25.0, 0.0),
            (offset_east(here, DEFAULT_OFFSET_DEG), 26.0, -90.0),
            (offset_south(here, DEFAULT_OFFSET_DEG), 27.0, 0.0),
            (offset_west(here, DEFAULT_OFFSET_DEG), 28.0, -90.0),
            (north, 29.0, 0.0),
        ];

        let waypoints = legs
            .iter()
            .map(|&(coordinate, altitude_m, gimbal_pitch_deg)| Waypoint {
                altitude_m,
                heading_deg: 0,
                action_repeat_times: 1,
                action_timeout_s: 60,
                corner_radius_m: 5.0,
                turn_mode: TurnMode::Clockwise,
                gimbal_pitch_deg,
                ..Waypoint::at(coordinate)
            })
            .collect();

        Mission {
            settings: MissionSettings {
                max_flight_speed_m_s: 15.0,
                auto_flight_speed_m_s: 8.0,
                finish_action: FinishAction::NoAction,
                heading_mode: HeadingMode::Auto,
                path_mode: PathMode::Normal,
                point_of_interest: Some(here),
                rotate_gimbal_pitch: true,
                exit_on_signal_lost: true,
                start_mode: StartMode::PointToPoint,
                repeat_times: 1,
            },
            waypoints,
        }
    }

    pub fn default_hotpoint(&self, here: Coordinate) -> TimelineElement {
        let omega = self.hotpoint.max_angular_velocity(HOTPOINT_RADIUS_M) * self.hotpoint.orbit_sign();
        TimelineElement::Hotpoint {
            mission: HotpointMission {
                hotpoint: offset_north(here, DEFAULT_OFFSET_DEG),
                altitude_m: HOTPOINT_ALTITUDE_M,
                radius_m: HOTPOINT_RADIUS_M,
                angular_velocity_deg_s: omega,
                start_point: HotpointStartPoint::Nearest,
                heading: HotpointHeading::AlongCircleLookingForward,
            },
            surrounding_angle_deg: HOTPOINT_SURROUND_DEG,
        }
    }
}
