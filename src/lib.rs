//! # bloco-radar
//!
//! HTTP API for the Belo Horizonte street carnival: where each bloco is
//! right now, what restrooms and hospitals are close to it, and which
//! services are nearest to the caller.
//!
//! ## Request flow
//!
//! ```text
//!   JSON datasets ──► JsonFileProvider ──► Snapshot ──► SnapshotStore (ArcSwap)
//!                          │                                 │
//!                 NeighborhoodResolver                       │ Arc<Snapshot>
//!                 (events without GPS)                       ▼
//!                                             filter ─► lifecycle state ─► rank
//!                                                                          │
//!                                             nearby services at the parade's
//!                                             current position + links + curation
//! ```
//!
//! ## Module Overview
//!
//! - [`config`] - Environment-based configuration: data dir, reference zone, ranking policy
//! - [`models`] - Shared data types: `GeoPoint`, `Event`, `LocatedEntity`, enriched responses
//! - [`geo::distance`] - Haversine distance with a sentinel for unknown points
//! - [`geo::neighborhood`] - Gazetteer lookup with aliases and city-center fallback
//! - [`geo::ranking`] - Radius filter, stable nearest-first sort and limit
//! - [`geo::navigation`] - Map, turn-by-turn and rideshare deep links
//! - [`events::lifecycle`] - Not started / in progress / finished, with route interpolation
//! - [`events::pipeline`] - The event listing: filters, ordering, pagination, enrichment
//! - [`events::curation`] - Highlight score, crowd level, daily picks and stats
//! - [`amenities`] - Restroom, hospital and service listings
//! - [`dataset`] - Providers, legacy field normalization and the swappable snapshot
//! - [`refresh`] - Single-flight background reloads and geocoding
//! - [`api`] - Axum HTTP handlers
//! - [`state`] - Shared application state

pub mod amenities;
pub mod api;
pub mod clock;
pub mod config;
pub mod dataset;
pub mod events;
pub mod geo;
pub mod models;
pub mod refresh;
pub mod state;
