use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::geo::Coordinate;
use crate::mission::{HotpointMission, Mission};

/// Closed set of things an operator can put on the timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TimelineElementKind {
    TakeOff,
    GoTo,
    GoHome,
    GimbalAttitude,
    SingleShotPhoto,
    ContinuousShotPhoto,
    RecordVideoDuration,
    RecordVideoStart,
    RecordVideoStop,
    WaypointMission,
    HotpointMission,
    AircraftYaw,
}

impl TimelineElementKind {
    /// Operator palette order.
    pub const ALL: [TimelineElementKind; 12] = [
        Self::TakeOff,
        Self::GoTo,
        Self::GoHome,
        Self::GimbalAttitude,
        Self::SingleShotPhoto,
        Self::ContinuousShotPhoto,
        Self::RecordVideoDuration,
        Self::RecordVideoStart,
        Self::RecordVideoStop,
        Self::WaypointMission,
        Self::HotpointMission,
        Self::AircraftYaw,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::TakeOff => "Take Off",
            Self::GoTo => "Go To",
            Self::GoHome => "Go Home",
            Self::GimbalAttitude => "Gimbal Attitude",
            Self::SingleShotPhoto => "Single Photo",
            Self::ContinuousShotPhoto => "Continuous Photo",
            Self::RecordVideoDuration => "Record Duration",
            Self::RecordVideoStart => "Start Record",
            Self::RecordVideoStop => "Stop Record",
            Self::WaypointMission => "Waypoint Mission",
            Self::HotpointMission => "Hotpoint Mission",
            Self::AircraftYaw => "Aircraft Yaw",
        }
    }

    pub fn slug(&self) -> &'static str {
        match self {
            Self::TakeOff => "take-off",
            Self::GoTo => "go-to",
            Self::GoHome => "go-home",
            Self::GimbalAttitude => "gimbal-attitude",
            Self::SingleShotPhoto => "single-shot-photo",
            Self::ContinuousShotPhoto => "continuous-shot-photo",
            Self::RecordVideoDuration => "record-video-duration",
            Self::RecordVideoStart => "record-video-start",
            Self::RecordVideoStop => "record-video-stop",
            Self::WaypointMission => "waypoint-mission",
            Self::HotpointMission => "hotpoint-mission",
            Self::AircraftYaw => "aircraft-yaw",
        }
    }
}

impl fmt::Display for TimelineElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownKind(pub String);

impl fmt::Display for UnknownKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown timeline element kind: {}", self.0)
    }
}

impl std::error::Error for UnknownKind {}

impl FromStr for TimelineElementKind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|k| k.slug() == s)
            .ok_or_else(|| UnknownKind(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PhotoMode {
    Single,
    Continuous { count: u32, interval_s: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum VideoMode {
    Duration { seconds: f64 },
    Start,
    Stop,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GimbalAttitude {
    pub pitch_deg: f32,
    pub roll_deg: f32,
    pub yaw_deg: f32,
}

/// Concrete schedulable value produced for a [`TimelineElementKind`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TimelineElement {
    TakeOff,
    GoTo { target: Coordinate, altitude_m: f32 },
    GoHome,
    GimbalAttitude(GimbalAttitude),
    ShootPhoto(PhotoMode),
    RecordVideo(VideoMode),
    WaypointMission(Mission),
    Hotpoint { mission: HotpointMission, surrounding_angle_deg: f32 },
    AircraftYaw { relative_angle_deg: f32, angular_velocity_deg_s: f32 },
}

impl TimelineElement {
    /// Kind this value belongs to.
    pub fn kind(&self) -> TimelineElementKind {
        match self {
            Self::TakeOff => TimelineElementKind::TakeOff,
            Self::GoTo { .. } => TimelineElementKind::GoTo,
            Self::GoHome => TimelineElementKind::GoHome,
            Self::GimbalAttitude(_) => TimelineElementKind::GimbalAttitude,
            Self::ShootPhoto(PhotoMode::Single) => TimelineElementKind::SingleShotPhoto,
            Self::ShootPhoto(PhotoMode::Continuous { .. }) => TimelineElementKind::ContinuousShotPhoto,
            Self::RecordVideo(VideoMode::Duration { .. }) => TimelineElementKind::RecordVideoDuration,
            Self::RecordVideo(VideoMode::Start) => TimelineElementKind::RecordVideoStart,
            Self::RecordVideo(VideoMode::Stop) => TimelineElementKind::RecordVideoStop,
            Self::WaypointMission(_) => TimelineElementKind::WaypointMission,
            Self::Hotpoint { .. } => TimelineElementKind::HotpointMission,
            Self::AircraftYaw { .. } => TimelineElementKind::AircraftYaw,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugs_parse_back_to_every_kind() {
        for kind in TimelineElementKind::ALL {
            assert_eq!(kind.slug().parse::<TimelineElementKind>(), Ok(kind));
        }
        assert!("barrel-roll".parse::<TimelineElementKind>().is_err());
    }

    #[test]
    fn element_reports_its_kind() {
        let el = TimelineElement::ShootPhoto(PhotoMode::Continuous { count: 10, interval_s: 3.0 });
        assert_eq!(el.kind(), TimelineElementKind::ContinuousShotPhoto);
        assert_eq!(TimelineElement::RecordVideo(VideoMode::Stop).kind(), TimelineElementKind::RecordVideoStop);
    }
}
