//! Boundary between the scheduler and its external collaborators
//!
//! Fetch, render, and geolocation stay behind plain injected traits; the only
//! thing this module adds on top is the promisified request shape that routes
//! their results through the two lanes.

mod collaborators;
mod request;

pub use collaborators::{FetchProvider, Position, PositionProvider, RenderSink};
pub use request::enqueue_request;
