use serde::{Deserialize, Serialize};

use crate::geo::Coordinate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FaultKind {
    /// RC/telemetry signal lost; the aircraft flies home on its own.
    SignalLost,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkFault {
    pub kind: FaultKind,
    pub message: String,
}

impl LinkFault {
    pub fn signal_lost(message: impl Into<String>) -> Self {
        Self { kind: FaultKind::SignalLost, message: message.into() }
    }

    pub fn other(message: impl Into<String>) -> Self {
        Self { kind: FaultKind::Other, message: message.into() }
    }
}

/// Everything the flight link pushes asynchronously.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LinkEvent {
    Location(Coordinate),
    Heading(f64),
    Home(Coordinate),
    TimelineStarted,
    TimelinePaused,
    TimelineResumed,
    TimelineStopped,
    TimelineFailed(String),
    MissionFinished(Option<LinkFault>),
}

impl LinkEvent {
    pub fn is_telemetry(&self) -> bool {
        matches!(self, LinkEvent::Location(_) | LinkEvent::Heading(_) | LinkEvent::Home(_))
    }
}
