//! Collaborator seams
//!
//! The scheduler's callers wire these up; the scheduler itself never sees
//! them and knows nothing of their payloads. Implementations are expected to
//! be cheap and synchronous: latency belongs to the scheduling layer
//! (`enqueue_request`), not to the provider.

use serde::{Deserialize, Serialize};

/// HTTP-fetch stand-in: a URL in, a response body out
pub trait FetchProvider {
    fn fetch(&self, url: &str) -> eyre::Result<String>;
}

/// DOM-render stand-in: receives fully formatted records
pub trait RenderSink {
    fn render(&self, record: &str);

    fn render_error(&self, message: &str);
}

/// Geolocation stand-in
pub trait PositionProvider {
    fn position(&self) -> eyre::Result<Position>;
}

/// A geographic coordinate pair
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub lat: f64,
    pub lng: f64,
}

impl Position {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.3},{:.3}", self.lat, self.lng)
    }
}
