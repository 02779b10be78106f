//! In-process aircraft for bench runs and tests.
//!
//! Acknowledges commands immediately and echoes the lifecycle event the real
//! aircraft would push. A started waypoint mission is "flown" instantly: one
//! location update per waypoint, then `MissionFinished`.

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use lens_proto::events::{LinkEvent, LinkFault};
use lens_proto::mission::Mission;
use lens_proto::timeline::{TimelineElement, TimelineElementKind};
use lens_proto::Coordinate;
use serde::Deserialize;
use tokio::sync::broadcast;
use tracing::{debug, info};

use crate::link::{FlightLink, LinkError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SimFault {
    /// Aircraft lost the remote and returned home on its own.
    SignalLost,
    Aborted,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SimConfig {
    pub home_lat: f64,
    pub home_lon: f64,
    #[serde(default)]
    pub heading_deg: f64,

    /// Element kinds the simulated aircraft refuses to schedule.
    #[serde(default)]
    pub reject_kinds: Vec<TimelineElementKind>,

    #[serde(default)]
    pub fail_upload: bool,
    #[serde(default)]
    pub fail_start: bool,
    /// Fault attached to `MissionFinished`; none means a clean finish.
    #[serde(default)]
    pub finish_fault: Option<SimFault>,

    /// Optional: broadcast buffer size. Default 1024.
    pub event_buffer: Option<usize>,
}

impl SimConfig {
    pub fn at(home: Coordinate) -> Self {
        Self {
            home_lat: home.lat,
            home_lon: home.lon,
            heading_deg: 0.0,
            reject_kinds: Vec::new(),
            fail_upload: false,
            fail_start: false,
            finish_fault: None,
            event_buffer: None,
        }
    }

    pub fn home(&self) -> Coordinate {
        Coordinate::new(self.home_lat, self.home_lon)
    }
}

#[derive(Debug, Default)]
struct SimState {
    location: Option<Coordinate>,
    heading: Option<f64>,
    timeline: Vec<TimelineElement>,
    running: bool,
    paused: bool,
    loaded: Option<Mission>,
    uploaded: bool,
}

pub struct SimLink {
    cfg: SimConfig,
    state: Mutex<SimState>,
    events: broadcast::Sender<LinkEvent>,
}

impl SimLink {
    pub fn new(cfg: SimConfig) -> Self {
        let (events, _) = broadcast::channel(cfg.event_buffer.unwrap_or(1024).max(16));
        let state = SimState {
            location: Some(cfg.home()),
            heading: Some(cfg.heading_deg),
            ..SimState::default()
        };
        Self { cfg, state: Mutex::new(state), events }
    }

    /// Moves the aircraft (or drops its fix with `None`) and pushes the update.
    pub fn set_location(&self, location: Option<Coordinate>) {
        self.state().location = location;
        if let Some(c) = location {
            self.emit(LinkEvent::Location(c));
        }
    }

    /// Pushes an arbitrary event, as a misbehaving link might.
    pub fn inject(&self, ev: LinkEvent) {
        self.emit(ev);
    }

    pub fn scheduled_len(&self) -> usize {
        self.state().timeline.len()
    }

    fn state(&self) -> MutexGuard<'_, SimState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn emit(&self, ev: LinkEvent) {
        debug!("sim: event {:?}", ev);
        // no subscribers is fine
        let _ = self.events.send(ev);
    }
}

#[async_trait]
impl FlightLink for SimLink {
    fn current_location(&self) -> Option<Coordinate> {
        self.state().location
    }

    fn heading(&self) -> Option<f64> {
        self.state().heading
    }

    fn home_location(&self) -> Option<Coordinate> {
        Some(self.cfg.home())
    }

    fn subscribe(&self) -> broadcast::Receiver<LinkEvent> {
        self.events.subscribe()
    }

    async fn submit(&self, element: &TimelineElement) -> Result<(), LinkError> {
        let kind = element.kind();
        if self.cfg.reject_kinds.contains(&kind) {
            return Err(LinkError::Rejected(format!("{} not supported by this aircraft", kind)));
        }
        let mut st = self.state();
        if st.running {
            return Err(LinkError::Rejected("timeline is running".into()));
        }
        st.timeline.push(element.clone());
        Ok(())
    }

    async fn unschedule(&self, index: usize) -> Result<(), LinkError> {
        let mut st = self.state();
        if st.running {
            return Err(LinkError::Rejected("timeline is running".into()));
        }
        if index >= st.timeline.len() {
            return Err(LinkError::Rejected(format!("no element at index {}", index)));
        }
        st.timeline.remove(index);
        Ok(())
    }

    async fn start_timeline(&self) -> Result<(), LinkError> {
        {
            let mut st = self.state();
            if st.timeline.is_empty() {
                return Err(LinkError::Rejected("timeline is empty".into()));
            }
            if st.running {
                return Err(LinkError::Rejected("timeline already running".into()));
            }
            st.running = true;
            st.paused = false;
        }
        info!("sim: timeline started");
        self.emit(LinkEvent::TimelineStarted);
        Ok(())
    }

    async fn pause_timeline(&self) -> Result<(), LinkError> {
        {
            let mut st = self.state();
            if !st.running || st.paused {
                return Err(LinkError::Rejected("timeline not running".into()));
            }
            st.paused = true;
        }
        self.emit(LinkEvent::TimelinePaused);
        Ok(())
    }

    async fn resume_timeline(&self) -> Result<(), LinkError> {
        {
            let mut st = self.state();
            if !st.paused {
                return Err(LinkError::Rejected("timeline not paused".into()));
            }
            st.paused = false;
        }
        self.emit(LinkEvent::TimelineResumed);
        Ok(())
    }

    async fn stop_timeline(&self) -> Result<(), LinkError> {
        {
            let mut st = self.state();
            if !st.running {
                return Err(LinkError::Rejected("timeline not running".into()));
            }
            st.running = false;
            st.paused = false;
        }
        info!("sim: timeline stopped");
        self.emit(LinkEvent::TimelineStopped);
        Ok(())
    }

    async fn load_mission(&self, mission: Mission) -> Result<(), LinkError> {
        if mission.len() < 2 {
            return Err(LinkError::Rejected("waypoint mission needs at least 2 waypoints".into()));
        }
        let mut st = self.state();
        st.loaded = Some(mission);
        st.uploaded = false;
        Ok(())
    }

    async fn upload_mission(&self) -> Result<(), LinkError> {
        let mut st = self.state();
        if st.loaded.is_none() {
            return Err(LinkError::Rejected("no mission loaded".into()));
        }
        if self.cfg.fail_upload {
            return Err(LinkError::Rejected("upload failed (simulated)".into()));
        }
        st.uploaded = true;
        Ok(())
    }

    async fn start_mission(&self) -> Result<(), LinkError> {
        let route: Vec<Coordinate> = {
            let mut st = self.state();
            if !st.uploaded {
                return Err(LinkError::Rejected("mission not uploaded".into()));
            }
            if self.cfg.fail_start {
                return Err(LinkError::Rejected("start refused (simulated)".into()));
            }
            let mission = st.loaded.take().ok_or_else(|| LinkError::Rejected("no mission loaded".into()))?;
            st.uploaded = false;
            mission.waypoints.iter().map(|w| w.coordinate).collect()
        };

        info!("sim: flying {} waypoints", route.len());
        let fault = match self.cfg.finish_fault {
            None => {
                for c in &route {
                    self.set_location(Some(*c));
                }
                None
            }
            Some(SimFault::SignalLost) => {
                if let Some(first) = route.first() {
                    self.set_location(Some(*first));
                }
                self.set_location(Some(self.cfg.home()));
                Some(LinkFault::signal_lost("remote signal lost, returned home"))
            }
            Some(SimFault::Aborted) => Some(LinkFault::other("mission aborted by aircraft")),
        };
        self.emit(LinkEvent::MissionFinished(fault));
        Ok(())
    }
}
