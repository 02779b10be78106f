//! Single waypoint mission: load, upload, start, then wait for the finish report.

use std::sync::Arc;

use lens_fc::{CancelToken, FlightLink};
use lens_proto::events::{FaultKind, LinkEvent};
use lens_proto::mission::Mission;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, info, warn};

use crate::{MissionError, MissionPhase};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissionOutcome {
    Completed,
    /// Signal lost mid-mission; the aircraft flew home on its own.
    ReturnedHome,
}

pub struct MissionRunner {
    link: Arc<dyn FlightLink>,
}

impl MissionRunner {
    pub fn new(link: Arc<dyn FlightLink>) -> Self {
        Self { link }
    }

    /// Hands the mission to the aircraft and starts it. Each phase fails on its own;
    /// cancellation is checked between phases.
    pub async fn execute(&self, mission: Mission, cancel: &CancelToken) -> Result<(), MissionError> {
        let n = mission.len();

        if cancel.is_cancelled() {
            return Err(MissionError::Cancelled);
        }
        self.link
            .load_mission(mission)
            .await
            .map_err(|e| MissionError::rejected(MissionPhase::Load, e))?;
        debug!("mission: loaded {} waypoints", n);

        if cancel.is_cancelled() {
            return Err(MissionError::Cancelled);
        }
        self.link
            .upload_mission()
            .await
            .map_err(|e| MissionError::rejected(MissionPhase::Upload, e))?;
        debug!("mission: uploaded");

        if cancel.is_cancelled() {
            return Err(MissionError::Cancelled);
        }
        self.link
            .start_mission()
            .await
            .map_err(|e| MissionError::rejected(MissionPhase::Start, e))?;
        info!("mission: started, {} waypoints", n);
        Ok(())
    }

    /// Executes the mission and waits for it to finish.
    pub async fn fly(&self, mission: Mission, cancel: &CancelToken) -> Result<MissionOutcome, MissionError> {
        // subscribe first, the finish report may arrive before start returns
        let mut events = self.link.subscribe();
        self.execute(mission, cancel).await?;
        Self::await_finish(&mut events, cancel).await
    }

    pub async fn await_finish(
        events: &mut broadcast::Receiver<LinkEvent>,
        cancel: &CancelToken,
    ) -> Result<MissionOutcome, MissionError> {
        let mut fixes = 0usize;
        loop {
            let ev = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(MissionError::Cancelled),
                ev = events.recv() => ev,
            };

            match ev {
                Ok(LinkEvent::MissionFinished(None)) => {
                    info!("mission: finished after {} position updates", fixes);
                    return Ok(MissionOutcome::Completed);
                }
                Ok(LinkEvent::MissionFinished(Some(fault))) if fault.kind == FaultKind::SignalLost => {
                    info!("mission: aircraft returned home: {}", fault.message);
                    return Ok(MissionOutcome::ReturnedHome);
                }
                Ok(LinkEvent::MissionFinished(Some(fault))) => {
                    warn!("mission: aborted: {}", fault.message);
                    return Err(MissionError::Aborted(fault.message));
                }
                Ok(LinkEvent::Location(_)) => fixes += 1,
                Ok(_) => {}
                Err(RecvError::Lagged(n)) => warn!("mission: missed {} link events", n),
                Err(RecvError::Closed) => return Err(MissionError::LinkClosed),
            }
        }
    }
}
