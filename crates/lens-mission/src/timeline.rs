//! Operator timeline: an editable queue of elements mirrored on the aircraft,
//! plus the start/pause/resume/stop state machine driven by link events.
//!
//! Commands only get the request onto the link. The state moves when the
//! aircraft reports the lifecycle event back through [`TimelineScheduler::on_event`],
//! so a refused or lost command never leaves the scheduler claiming success.

use std::fmt;
use std::sync::Arc;

use lens_fc::{FlightLink, LinkError};
use lens_proto::events::LinkEvent;
use lens_proto::timeline::{TimelineElement, TimelineElementKind};
use tokio::sync::broadcast::{self, error::TryRecvError};
use tracing::{debug, info, warn};

use crate::builder::{BuildContext, MissionBuilder};
use crate::MissionError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimelineState {
    Idle,
    Running,
    Paused,
    /// Passed through on the way back to `Idle`.
    Stopped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimelineCommand {
    Start,
    Pause,
    Resume,
    Stop,
}

impl fmt::Display for TimelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TimelineState::Idle => "idle",
            TimelineState::Running => "running",
            TimelineState::Paused => "paused",
            TimelineState::Stopped => "stopped",
        })
    }
}

impl fmt::Display for TimelineCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TimelineCommand::Start => "start",
            TimelineCommand::Pause => "pause",
            TimelineCommand::Resume => "resume",
            TimelineCommand::Stop => "stop",
        })
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SchedulerError {
    #[error("timeline is busy")]
    Busy,
    #[error("cannot {command} while {state}")]
    InvalidTransition { state: TimelineState, command: TimelineCommand },
    #[error("no scheduled element at index {0}")]
    IndexOutOfRange(usize),
    #[error("timeline is empty")]
    EmptyTimeline,
    #[error(transparent)]
    Build(#[from] MissionError),
    #[error("rejected by aircraft: {0}")]
    LinkRejected(String),
}

impl From<LinkError> for SchedulerError {
    fn from(e: LinkError) -> Self {
        match e {
            LinkError::Rejected(r) | LinkError::Unavailable(r) => SchedulerError::LinkRejected(r),
        }
    }
}

pub struct TimelineScheduler {
    link: Arc<dyn FlightLink>,
    builder: MissionBuilder,
    queue: Vec<(TimelineElementKind, TimelineElement)>,
    state: TimelineState,
    pending: Option<TimelineCommand>,
}

impl TimelineScheduler {
    pub fn new(link: Arc<dyn FlightLink>, builder: MissionBuilder) -> Self {
        Self { link, builder, queue: Vec::new(), state: TimelineState::Idle, pending: None }
    }

    pub fn state(&self) -> TimelineState {
        self.state
    }

    /// Command forwarded to the link and not yet confirmed by an event.
    pub fn pending(&self) -> Option<TimelineCommand> {
        self.pending
    }

    pub fn entries(&self) -> &[(TimelineElementKind, TimelineElement)] {
        &self.queue
    }

    pub fn kinds(&self) -> impl Iterator<Item = TimelineElementKind> + '_ {
        self.queue.iter().map(|(k, _)| *k)
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    fn editable(&self) -> bool {
        self.state == TimelineState::Idle && self.pending != Some(TimelineCommand::Start)
    }

    /// Builds the default element for `kind` and appends it once the aircraft accepts it.
    /// Returns the new entry's index.
    pub async fn schedule(&mut self, kind: TimelineElementKind, ctx: &BuildContext) -> Result<usize, SchedulerError> {
        if !self.editable() {
            return Err(SchedulerError::Busy);
        }
        let element = self.builder.build(kind, ctx)?;

        if let Err(e) = self.link.submit(&element).await {
            warn!("timeline: {} rejected: {}", kind, e);
            return Err(e.into());
        }

        self.queue.push((kind, element));
        debug!("timeline: scheduled {} at {}", kind, self.queue.len() - 1);
        Ok(self.queue.len() - 1)
    }

    pub async fn unschedule(&mut self, index: usize) -> Result<(TimelineElementKind, TimelineElement), SchedulerError> {
        if !self.editable() {
            return Err(SchedulerError::Busy);
        }
        if index >= self.queue.len() {
            return Err(SchedulerError::IndexOutOfRange(index));
        }
        self.link.unschedule(index).await?;

        let entry = self.queue.remove(index);
        debug!("timeline: unscheduled {} from {}", entry.0, index);
        Ok(entry)
    }

    pub async fn start(&mut self) -> Result<(), SchedulerError> {
        self.check(TimelineCommand::Start)?;
        if self.queue.is_empty() {
            return Err(SchedulerError::EmptyTimeline);
        }
        self.forward(TimelineCommand::Start).await
    }

    pub async fn pause(&mut self) -> Result<(), SchedulerError> {
        self.check(TimelineCommand::Pause)?;
        self.forward(TimelineCommand::Pause).await
    }

    pub async fn resume(&mut self) -> Result<(), SchedulerError> {
        self.check(TimelineCommand::Resume)?;
        self.forward(TimelineCommand::Resume).await
    }

    pub async fn stop(&mut self) -> Result<(), SchedulerError> {
        self.check(TimelineCommand::Stop)?;
        self.forward(TimelineCommand::Stop).await
    }

    /// Single play button: start when idle, pause when running, resume when paused.
    pub async fn toggle(&mut self) -> Result<TimelineCommand, SchedulerError> {
        let cmd = match self.state {
            TimelineState::Idle => TimelineCommand::Start,
            TimelineState::Running => TimelineCommand::Pause,
            TimelineState::Paused => TimelineCommand::Resume,
            TimelineState::Stopped => {
                return Err(SchedulerError::InvalidTransition { state: self.state, command: TimelineCommand::Start })
            }
        };
        match cmd {
            TimelineCommand::Start => self.start().await?,
            TimelineCommand::Pause => self.pause().await?,
            _ => self.resume().await?,
        }
        Ok(cmd)
    }

    fn check(&self, command: TimelineCommand) -> Result<(), SchedulerError> {
        // Stop may overtake an unconfirmed command.
        if self.pending.is_some() && command != TimelineCommand::Stop {
            return Err(SchedulerError::Busy);
        }
        let ok = matches!(
            (self.state, command),
            (TimelineState::Idle, TimelineCommand::Start)
                | (TimelineState::Running, TimelineCommand::Pause)
                | (TimelineState::Paused, TimelineCommand::Resume)
                | (TimelineState::Running | TimelineState::Paused, TimelineCommand::Stop)
        );
        if ok {
            Ok(())
        } else {
            Err(SchedulerError::InvalidTransition { state: self.state, command })
        }
    }

    async fn forward(&mut self, command: TimelineCommand) -> Result<(), SchedulerError> {
        let res = match command {
            TimelineCommand::Start => self.link.start_timeline().await,
            TimelineCommand::Pause => self.link.pause_timeline().await,
            TimelineCommand::Resume => self.link.resume_timeline().await,
            TimelineCommand::Stop => self.link.stop_timeline().await,
        };
        if let Err(e) = res {
            warn!("timeline: {} rejected: {}", command, e);
            return Err(e.into());
        }
        self.pending = Some(command);
        Ok(())
    }

    /// Applies a lifecycle event from the link. Returns the state reached, or
    /// `None` when the event does not apply. A stop passes through `Stopped`
    /// and rests in `Idle` with the queue intact.
    pub fn on_event(&mut self, ev: &LinkEvent) -> Option<TimelineState> {
        use TimelineState::*;

        if ev.is_telemetry() {
            return None;
        }

        let (from, to, settles) = match (ev, self.state) {
            (LinkEvent::TimelineStarted, Idle) => (Idle, Running, TimelineCommand::Start),
            (LinkEvent::TimelinePaused, Running) => (Running, Paused, TimelineCommand::Pause),
            (LinkEvent::TimelineResumed, Paused) => (Paused, Running, TimelineCommand::Resume),
            (LinkEvent::TimelineStopped, s @ (Running | Paused)) => (s, Stopped, TimelineCommand::Stop),
            (LinkEvent::TimelineFailed(reason), s) => {
                warn!("timeline: aircraft reported failure while {}: {}", s, reason);
                self.pending = None;
                return None;
            }
            (
                LinkEvent::TimelineStarted
                | LinkEvent::TimelinePaused
                | LinkEvent::TimelineResumed
                | LinkEvent::TimelineStopped,
                s,
            ) => {
                warn!("timeline: ignoring {:?} while {}", ev, s);
                return None;
            }
            _ => return None,
        };

        if self.pending == Some(settles) {
            self.pending = None;
        }
        info!("timeline: {} -> {}", from, to);
        self.state = if to == Stopped {
            self.pending = None;
            Idle
        } else {
            to
        };
        Some(to)
    }

    /// Applies every event already queued on `rx`. Returns how many changed state.
    pub fn pump(&mut self, rx: &mut broadcast::Receiver<LinkEvent>) -> usize {
        let mut applied = 0;
        loop {
            match rx.try_recv() {
                Ok(ev) => {
                    if self.on_event(&ev).is_some() {
                        applied += 1;
                    }
                }
                Err(TryRecvError::Lagged(n)) => warn!("timeline: missed {} link events", n),
                Err(TryRecvError::Empty | TryRecvError::Closed) => break,
            }
        }
        applied
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lens_fc::{SimConfig, SimLink};
    use lens_proto::Coordinate;

    const HOME: Coordinate = Coordinate::new(40.0, -88.0);

    fn setup(cfg: SimConfig) -> (Arc<SimLink>, TimelineScheduler, broadcast::Receiver<LinkEvent>) {
        let sim = Arc::new(SimLink::new(cfg));
        let rx = sim.subscribe();
        let sched = TimelineScheduler::new(sim.clone(), MissionBuilder::default());
        (sim, sched, rx)
    }

    #[tokio::test]
    async fn schedule_then_unschedule_restores_queue() {
        let (sim, mut t, _rx) = setup(SimConfig::at(HOME));
        let ctx = BuildContext::at(HOME);
        t.schedule(TimelineElementKind::TakeOff, &ctx).await.unwrap();
        t.schedule(TimelineElementKind::GoHome, &ctx).await.unwrap();
        let before: Vec<_> = t.kinds().collect();

        let idx = t.schedule(TimelineElementKind::AircraftYaw, &ctx).await.unwrap();
        assert_eq!(idx, 2);
        assert_eq!(sim.scheduled_len(), 3);

        let (kind, _) = t.unschedule(idx).await.unwrap();
        assert_eq!(kind, TimelineElementKind::AircraftYaw);
        assert_eq!(t.kinds().collect::<Vec<_>>(), before);
        assert_eq!(sim.scheduled_len(), 2);
    }

    #[tokio::test]
    async fn link_rejection_leaves_queue_unchanged() {
        let mut cfg = SimConfig::at(HOME);
        cfg.reject_kinds = vec![TimelineElementKind::HotpointMission];
        let (_sim, mut t, _rx) = setup(cfg);

        let err = t.schedule(TimelineElementKind::HotpointMission, &BuildContext::at(HOME)).await.unwrap_err();
        assert!(matches!(err, SchedulerError::LinkRejected(_)));
        assert!(t.is_empty());
    }

    #[tokio::test]
    async fn builder_errors_propagate() {
        let (_sim, mut t, _rx) = setup(SimConfig::at(HOME));
        let err = t.schedule(TimelineElementKind::GoTo, &BuildContext::default()).await.unwrap_err();
        assert_eq!(err, SchedulerError::Build(MissionError::LocationUnavailable));
        assert!(t.is_empty());
    }

    #[tokio::test]
    async fn edits_are_refused_while_running() {
        let (_sim, mut t, mut rx) = setup(SimConfig::at(HOME));
        let ctx = BuildContext::at(HOME);
        t.schedule(TimelineElementKind::TakeOff, &ctx).await.unwrap();
        t.start().await.unwrap();

        // pending start already blocks edits
        assert_eq!(t.schedule(TimelineElementKind::GoHome, &ctx).await, Err(SchedulerError::Busy));

        t.pump(&mut rx);
        assert_eq!(t.state(), TimelineState::Running);
        assert_eq!(t.unschedule(0).await.unwrap_err(), SchedulerError::Busy);
        assert_eq!(t.len(), 1);
    }

    #[tokio::test]
    async fn state_follows_link_events() {
        let (_sim, mut t, mut rx) = setup(SimConfig::at(HOME));
        t.schedule(TimelineElementKind::TakeOff, &BuildContext::at(HOME)).await.unwrap();

        t.start().await.unwrap();
        assert_eq!(t.state(), TimelineState::Idle);
        assert_eq!(t.pending(), Some(TimelineCommand::Start));
        assert_eq!(t.pump(&mut rx), 1);
        assert_eq!(t.state(), TimelineState::Running);
        assert_eq!(t.pending(), None);

        t.pause().await.unwrap();
        t.pump(&mut rx);
        assert_eq!(t.state(), TimelineState::Paused);

        t.resume().await.unwrap();
        t.pump(&mut rx);
        assert_eq!(t.state(), TimelineState::Running);

        t.stop().await.unwrap();
        t.pump(&mut rx);
        assert_eq!(t.state(), TimelineState::Idle);
        assert_eq!(t.len(), 1);
    }

    #[tokio::test]
    async fn invalid_commands_do_not_reach_the_link() {
        let (_sim, mut t, mut rx) = setup(SimConfig::at(HOME));
        assert_eq!(t.start().await, Err(SchedulerError::EmptyTimeline));
        assert_eq!(
            t.pause().await,
            Err(SchedulerError::InvalidTransition { state: TimelineState::Idle, command: TimelineCommand::Pause })
        );
        assert_eq!(
            t.resume().await,
            Err(SchedulerError::InvalidTransition { state: TimelineState::Idle, command: TimelineCommand::Resume })
        );
        assert_eq!(
            t.stop().await,
            Err(SchedulerError::InvalidTransition { state: TimelineState::Idle, command: TimelineCommand::Stop })
        );

        t.schedule(TimelineElementKind::TakeOff, &BuildContext::at(HOME)).await.unwrap();
        t.start().await.unwrap();
        t.pump(&mut rx);
        assert!(matches!(t.start().await, Err(SchedulerError::InvalidTransition { .. })));
        assert!(matches!(t.resume().await, Err(SchedulerError::InvalidTransition { .. })));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn toggle_maps_to_start_pause_resume() {
        let (_sim, mut t, mut rx) = setup(SimConfig::at(HOME));
        t.schedule(TimelineElementKind::SingleShotPhoto, &BuildContext::at(HOME)).await.unwrap();

        assert_eq!(t.toggle().await.unwrap(), TimelineCommand::Start);
        t.pump(&mut rx);
        assert_eq!(t.toggle().await.unwrap(), TimelineCommand::Pause);
        t.pump(&mut rx);
        assert_eq!(t.toggle().await.unwrap(), TimelineCommand::Resume);
        t.pump(&mut rx);
        assert_eq!(t.state(), TimelineState::Running);
    }

    #[tokio::test]
    async fn inconsistent_events_are_ignored() {
        let (sim, mut t, mut rx) = setup(SimConfig::at(HOME));
        sim.inject(LinkEvent::TimelinePaused);
        sim.inject(LinkEvent::TimelineStopped);
        sim.inject(LinkEvent::Heading(90.0));
        assert_eq!(t.pump(&mut rx), 0);
        assert_eq!(t.state(), TimelineState::Idle);

        sim.inject(LinkEvent::TimelineStarted);
        sim.inject(LinkEvent::TimelineStarted);
        sim.inject(LinkEvent::TimelineResumed);
        assert_eq!(t.pump(&mut rx), 1);
        assert_eq!(t.state(), TimelineState::Running);

        sim.inject(LinkEvent::TimelineStopped);
        assert_eq!(t.pump(&mut rx), 1);
        assert_eq!(t.state(), TimelineState::Idle);
    }

    #[tokio::test]
    async fn stop_overtakes_unconfirmed_pause() {
        let (_sim, mut t, mut rx) = setup(SimConfig::at(HOME));
        t.schedule(TimelineElementKind::TakeOff, &BuildContext::at(HOME)).await.unwrap();
        t.start().await.unwrap();
        t.pump(&mut rx);

        t.pause().await.unwrap();
        assert_eq!(t.state(), TimelineState::Running);
        assert_eq!(t.pending(), Some(TimelineCommand::Pause));
        assert!(matches!(t.resume().await, Err(SchedulerError::Busy)));

        t.stop().await.unwrap();
        assert_eq!(t.pending(), Some(TimelineCommand::Stop));
        t.pump(&mut rx);
        assert_eq!(t.state(), TimelineState::Idle);
        assert_eq!(t.pending(), None);
        assert_eq!(t.len(), 1);
    }

    #[tokio::test]
    async fn stop_from_paused() {
        let (_sim, mut t, mut rx) = setup(SimConfig::at(HOME));
        t.schedule(TimelineElementKind::TakeOff, &BuildContext::at(HOME)).await.unwrap();
        t.start().await.unwrap();
        t.pump(&mut rx);
        t.pause().await.unwrap();
        t.pump(&mut rx);
        assert_eq!(t.state(), TimelineState::Paused);

        t.stop().await.unwrap();
        assert_eq!(t.pump(&mut rx), 1);
        assert_eq!(t.state(), TimelineState::Idle);
        assert!(t.editable());
    }

    #[tokio::test]
    async fn failure_event_clears_pending_command() {
        let (_sim, mut t, _rx) = setup(SimConfig::at(HOME));
        t.schedule(TimelineElementKind::TakeOff, &BuildContext::at(HOME)).await.unwrap();
        t.start().await.unwrap();
        assert_eq!(t.on_event(&LinkEvent::TimelineFailed("motors locked".into())), None);
        assert_eq!(t.pending(), None);
        assert_eq!(t.state(), TimelineState::Idle);
    }
}
