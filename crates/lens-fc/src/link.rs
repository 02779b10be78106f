use async_trait::async_trait;
use lens_proto::events::LinkEvent;
use lens_proto::mission::Mission;
use lens_proto::timeline::TimelineElement;
use lens_proto::Coordinate;
use tokio::sync::broadcast;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LinkError {
    #[error("rejected by aircraft: {0}")]
    Rejected(String),
    #[error("link unavailable: {0}")]
    Unavailable(String),
}

/// Remote flight controller as seen from the ground station.
///
/// Command methods return once the aircraft has acknowledged (or refused) the
/// request. Lifecycle changes are reported separately through [`subscribe`].
///
/// [`subscribe`]: FlightLink::subscribe
#[async_trait]
pub trait FlightLink: Send + Sync {
    fn current_location(&self) -> Option<Coordinate>;
    fn heading(&self) -> Option<f64>;
    fn home_location(&self) -> Option<Coordinate>;

    fn subscribe(&self) -> broadcast::Receiver<LinkEvent>;

    // timeline
    async fn submit(&self, element: &TimelineElement) -> Result<(), LinkError>;
    async fn unschedule(&self, index: usize) -> Result<(), LinkError>;
    async fn start_timeline(&self) -> Result<(), LinkError>;
    async fn pause_timeline(&self) -> Result<(), LinkError>;
    async fn resume_timeline(&self) -> Result<(), LinkError>;
    async fn stop_timeline(&self) -> Result<(), LinkError>;

    // single waypoint mission
    async fn load_mission(&self, mission: Mission) -> Result<(), LinkError>;
    async fn upload_mission(&self) -> Result<(), LinkError>;
    async fn start_mission(&self) -> Result<(), LinkError>;
}
