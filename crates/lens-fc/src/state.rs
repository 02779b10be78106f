use lens_proto::events::LinkEvent;
use lens_proto::Coordinate;
use time::OffsetDateTime;
use tracing::debug;

/// Aircraft/home/heading annotations. The owner applies link telemetry; everyone else reads.
#[derive(Debug, Clone, Default)]
pub struct AircraftState {
    pub location: Option<Coordinate>,
    pub home: Option<Coordinate>,
    pub heading_deg: Option<f64>,
    pub last_update: Option<OffsetDateTime>,
}

impl AircraftState {
    /// Applies a telemetry event. Invalid coordinates are dropped and the last
    /// good value kept. Returns whether anything changed.
    pub fn apply(&mut self, ev: &LinkEvent) -> bool {
        let changed = match ev {
            LinkEvent::Location(c) if c.is_valid() => {
                self.location = Some(*c);
                true
            }
            LinkEvent::Home(c) if c.is_valid() => {
                self.home = Some(*c);
                true
            }
            LinkEvent::Heading(h) if h.is_finite() => {
                self.heading_deg = Some(h.rem_euclid(360.0));
                true
            }
            LinkEvent::Location(c) | LinkEvent::Home(c) => {
                debug!("aircraft: ignoring invalid coordinate ({}, {})", c.lat, c.lon);
                false
            }
            _ => false,
        };
        if changed {
            self.last_update = Some(OffsetDateTime::now_utc());
        }
        changed
    }

    pub fn update_age(&self) -> Option<time::Duration> {
        self.last_update.map(|t| OffsetDateTime::now_utc() - t)
    }
}
