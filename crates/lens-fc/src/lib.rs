pub mod cancel;
pub mod link;
pub mod sim;
pub mod state;

pub use cancel::CancelToken;
pub use link::{FlightLink, LinkError};
pub use sim::{SimConfig, SimLink};
pub use state::AircraftState;
