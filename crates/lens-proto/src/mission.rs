use serde::{Deserialize, Serialize};

use crate::geo::Coordinate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TurnMode {
    Clockwise,
    CounterClockwise,
}

/// Action executed when the aircraft reaches a waypoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum WaypointAction {
    ShootPhoto,
    StartRecord,
    StopRecord,
    Stay { millis: u32 },
    RotateGimbalPitch { deg: f32 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub coordinate: Coordinate,
    pub altitude_m: f32,
    pub heading_deg: i16,
    pub action_repeat_times: u8,
    pub action_timeout_s: u16,
    pub corner_radius_m: f32,
    pub turn_mode: TurnMode,
    pub gimbal_pitch_deg: f32,
    pub actions: Vec<WaypointAction>,
}

impl Waypoint {
    /// Bare waypoint; callers fill in the per-waypoint parameters.
    pub fn at(coordinate: Coordinate) -> Self {
        Self {
            coordinate,
            altitude_m: 0.0,
            heading_deg: 0,
            action_repeat_times: 1,
            action_timeout_s: 60,
            corner_radius_m: 0.2,
            turn_mode: TurnMode::Clockwise,
            gimbal_pitch_deg: 0.0,
            actions: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FinishAction {
    NoAction,
    GoHome,
    AutoLand,
    GoFirstWaypoint,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HeadingMode {
    Auto,
    UsingInitialDirection,
    TowardPointOfInterest,
    UsingWaypointHeading,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PathMode {
    Normal,
    Curved,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StartMode {
    Safely,
    PointToPoint,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissionSettings {
    pub max_flight_speed_m_s: f32,
    pub auto_flight_speed_m_s: f32,
    pub finish_action: FinishAction,
    pub heading_mode: HeadingMode,
    pub path_mode: PathMode,
    pub point_of_interest: Option<Coordinate>,
    pub rotate_gimbal_pitch: bool,
    pub exit_on_signal_lost: bool,
    pub start_mode: StartMode,
    pub repeat_times: u8,
}

/// Ordered waypoint mission. Built once, then handed to the link by value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mission {
    pub settings: MissionSettings,
    pub waypoints: Vec<Waypoint>,
}

impl Mission {
    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HotpointStartPoint {
    North,
    South,
    West,
    East,
    Nearest,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HotpointHeading {
    AlongCircleLookingForward,
    AlongCircleLookingBackward,
    TowardHotpoint,
    AwayFromHotpoint,
    ControlledByRemote,
    UsingInitialDirection,
}

/// Orbit around a fixed ground point. Positive angular velocity is clockwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HotpointMission {
    pub hotpoint: Coordinate,
    pub altitude_m: f32,
    pub radius_m: f32,
    pub angular_velocity_deg_s: f32,
    pub start_point: HotpointStartPoint,
    pub heading: HotpointHeading,
}
