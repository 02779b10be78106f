pub mod events;
pub mod geo;
pub mod media;
pub mod mission;
pub mod timeline;

pub use geo::{Coordinate, Length};
