//! Bloco schedule logic: lifecycle state, the listing pipeline and curation.

pub mod curation;
pub mod lifecycle;
pub mod pipeline;

pub use lifecycle::compute_state;
pub use pipeline::{query_events, EventFilters, PipelineContext};
