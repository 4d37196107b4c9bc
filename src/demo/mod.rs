//! Canned collaborators and scenarios for the CLI demos
//!
//! Everything here is a caller of the scheduler, never part of it: the
//! scenarios inject dataset-backed fetch/render/position collaborators and
//! observe the resulting interleavings.

mod dataset;
mod render;
mod scenarios;

pub use dataset::{Country, DatasetFetch, FixedPosition, GeocodeRecord};
pub use render::{CollectSink, ConsoleSink, country_card};
pub use scenarios::{country_chain, ordering, where_am_i};
