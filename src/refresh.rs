//! Background dataset reloads. One reload at a time; readers keep the old
//! snapshot until the new one is swapped in whole.

use anyhow::Context;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

use crate::dataset::geocode::Geocoder;
use crate::dataset::{DatasetProvider, Snapshot, SnapshotStore};
use crate::geo::neighborhood::NeighborhoodResolver;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RefreshState {
    Idle,
    Refreshing,
}

pub struct Refresher {
    provider: Arc<dyn DatasetProvider>,
    store: Arc<SnapshotStore>,
    resolver: Arc<NeighborhoodResolver>,
    geocoder: Option<Geocoder>,
    state: Mutex<RefreshState>,
    last_success: Mutex<Option<DateTime<Utc>>>,
}

/// Puts the refresher back to `Idle` when the reload ends, even on error.
struct InFlight<'a>(&'a Refresher);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        *self.0.state.lock() = RefreshState::Idle;
    }
}

impl Refresher {
    pub fn new(
        provider: Arc<dyn DatasetProvider>,
        store: Arc<SnapshotStore>,
        resolver: Arc<NeighborhoodResolver>,
        geocoder: Option<Geocoder>,
    ) -> Self {
        Self {
            provider,
            store,
            resolver,
            geocoder,
            state: Mutex::new(RefreshState::Idle),
            last_success: Mutex::new(None),
        }
    }

    pub fn state(&self) -> RefreshState {
        *self.state.lock()
    }

    pub fn last_success(&self) -> Option<DateTime<Utc>> {
        *self.last_success.lock()
    }

    fn begin(&self) -> bool {
        let mut state = self.state.lock();
        if *state == RefreshState::Refreshing {
            return false;
        }
        *state = RefreshState::Refreshing;
        true
    }

    /// Reload now. `Ok(false)` when another reload was already running.
    pub async fn refresh(&self) -> anyhow::Result<bool> {
        if !self.begin() {
            tracing::info!("Dataset refresh already in progress, skipping");
            return Ok(false);
        }
        let _in_flight = InFlight(self);
        self.reload().await?;
        Ok(true)
    }

    /// Start a reload in the background. Returns false if one is running.
    pub fn trigger(self: &Arc<Self>) -> bool {
        if !self.begin() {
            return false;
        }
        let this = Arc::clone(self);
        tokio::spawn(async move {
            let _in_flight = InFlight(&this);
            if let Err(e) = this.reload().await {
                tracing::error!("Dataset refresh failed, keeping previous snapshot: {e:#}");
            }
        });
        true
    }

    async fn reload(&self) -> anyhow::Result<()> {
        tracing::info!("Refreshing datasets");
        let provider = Arc::clone(&self.provider);
        let resolver = Arc::clone(&self.resolver);
        let snapshot = tokio::task::spawn_blocking(move || Snapshot::load(provider.as_ref(), &resolver))
            .await
            .context("Dataset load task failed")?;
        self.store.replace(snapshot);

        if let Some(geocoder) = &self.geocoder {
            self.geocode(geocoder).await;
        }

        *self.last_success.lock() = Some(Utc::now());
        Ok(())
    }

    /// Second pass: fill amenity coordinates and swap again if anything changed.
    async fn geocode(&self, geocoder: &Geocoder) {
        let current = self.store.current();
        let missing = current
            .restrooms
            .iter()
            .chain(current.hospitals.iter())
            .any(|e| e.location.is_none());
        if !missing {
            return;
        }

        let mut next = Snapshot::clone(&current);
        let fixed = geocoder.fill_missing(&mut next.restrooms).await
            + geocoder.fill_missing(&mut next.hospitals).await;
        if fixed > 0 {
            tracing::info!(fixed, "Geocoded amenities without coordinates");
            self.store.replace(next);
        }
    }

    /// Reload every `interval_secs` seconds. Zero disables the loop.
    pub fn spawn_periodic(self: &Arc<Self>, interval_secs: u64) {
        if interval_secs == 0 {
            tracing::info!("Periodic dataset refresh disabled");
            return;
        }
        let this = Arc::clone(self);
        tokio::spawn(async move {
            let interval = Duration::from_secs(interval_secs);
            loop {
                tokio::time::sleep(interval).await;
                if let Err(e) = this.refresh().await {
                    tracing::error!("Dataset refresh failed, keeping previous snapshot: {e:#}");
                }
            }
        });
        tracing::info!(interval_secs, "Dataset refresh loop started");
    }
}
