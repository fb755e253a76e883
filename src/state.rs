use std::sync::Arc;

use crate::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::dataset::geocode::Geocoder;
use crate::dataset::json::JsonFileProvider;
use crate::dataset::{DatasetProvider, Snapshot, SnapshotStore};
use crate::geo::neighborhood::NeighborhoodResolver;
use crate::refresh::Refresher;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub snapshots: Arc<SnapshotStore>,
    pub resolver: Arc<NeighborhoodResolver>,
    pub refresher: Arc<Refresher>,
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    /// Reads the JSON datasets from `config.data_dir` and uses the wall clock.
    pub fn new(config: Config) -> anyhow::Result<Self> {
        // Ensure the data directory exists so operators can drop files in later
        std::fs::create_dir_all(&config.data_dir)?;

        let provider: Arc<dyn DatasetProvider> = Arc::new(JsonFileProvider::new(&config));
        let clock: Arc<dyn Clock> = Arc::new(SystemClock::new(config.reference_zone()));
        Ok(Self::with_parts(config, provider, clock))
    }

    /// Assemble state from explicit collaborators. Loads the first snapshot
    /// synchronously.
    pub fn with_parts(config: Config, provider: Arc<dyn DatasetProvider>, clock: Arc<dyn Clock>) -> Self {
        let resolver = Arc::new(NeighborhoodResolver::new());
        let snapshots = Arc::new(SnapshotStore::new(Snapshot::load(provider.as_ref(), &resolver)));
        let refresher = Arc::new(Refresher::new(
            provider,
            Arc::clone(&snapshots),
            Arc::clone(&resolver),
            Geocoder::from_config(&config.geocoder),
        ));

        Self {
            config,
            snapshots,
            resolver,
            refresher,
            clock,
        }
    }
}
