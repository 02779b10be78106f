pub mod builder;
pub mod runner;
pub mod survey;
pub mod timeline;

use lens_fc::LinkError;

pub use builder::{BuildContext, HotpointConfig, MissionBuilder, OrbitDirection};
pub use runner::{MissionOutcome, MissionRunner};
pub use survey::{build_survey_mission, SurveyConfig};
pub use timeline::{SchedulerError, TimelineCommand, TimelineScheduler, TimelineState};

/// Which step of the load/upload/start sequence failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissionPhase {
    Load,
    Upload,
    Start,
}

impl std::fmt::Display for MissionPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            MissionPhase::Load => "load",
            MissionPhase::Upload => "upload",
            MissionPhase::Start => "start",
        })
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MissionError {
    #[error("aircraft location unavailable")]
    LocationUnavailable,
    #[error("invalid boundary: {0}")]
    InvalidBoundary(String),
    #[error("mission {phase} rejected: {reason}")]
    LinkRejected { phase: MissionPhase, reason: String },
    #[error("mission aborted: {0}")]
    Aborted(String),
    #[error("flight link closed before the mission finished")]
    LinkClosed,
    #[error("cancelled")]
    Cancelled,
}

impl MissionError {
    pub(crate) fn rejected(phase: MissionPhase, err: LinkError) -> Self {
        let reason = match err {
            LinkError::Rejected(r) | LinkError::Unavailable(r) => r,
        };
        MissionError::LinkRejected { phase, reason }
    }
}
