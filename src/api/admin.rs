use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::api::ApiError;
use crate::refresh::RefreshState;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct DatasetStatus {
    pub refresh: RefreshState,
    pub loaded_at: DateTime<Utc>,
    pub last_refresh: Option<DateTime<Utc>>,
    pub events: usize,
    pub restrooms: usize,
    pub hospitals: usize,
    pub infrastructure: usize,
    /// Neighborhood names that fell back to the city center.
    pub unmatched_neighborhoods: Vec<String>,
}

/// GET /api/admin/status - Snapshot sizes and refresh state
pub async fn status(State(state): State<AppState>) -> Json<DatasetStatus> {
    let snapshot = state.snapshots.current();
    Json(DatasetStatus {
        refresh: state.refresher.state(),
        loaded_at: snapshot.loaded_at,
        last_refresh: state.refresher.last_success(),
        events: snapshot.events.len(),
        restrooms: snapshot.restrooms.len(),
        hospitals: snapshot.hospitals.len(),
        infrastructure: snapshot.infrastructure.len(),
        unmatched_neighborhoods: state.resolver.unmatched(),
    })
}

/// POST /api/admin/atualizar-dados - Reload datasets in the background
pub async fn refresh(State(state): State<AppState>) -> Result<StatusCode, ApiError> {
    if !state.refresher.trigger() {
        return Err((
            StatusCode::CONFLICT,
            "A dataset refresh is already running".to_string(),
        ));
    }
    tracing::info!("Dataset refresh requested");
    Ok(StatusCode::ACCEPTED)
}
