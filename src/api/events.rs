use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;

use crate::api::{ApiError, QueryParams};
use crate::events::curation::{self, DayHighlights, EventStats, FilterValues};
use crate::events::pipeline::{query_events, EventFilters, PipelineContext};
use crate::models::{EventPage, ScoredEvent};
use crate::state::AppState;

/// GET /api/blocos - Filtered, paginated events with live state and nearby services
pub async fn list_events(
    State(state): State<AppState>,
    Query(params): Query<QueryParams>,
) -> Result<Json<EventPage>, ApiError> {
    let (page, limit) = params.pagination(state.config.page_size, state.config.max_page_size)?;
    let mut user = params.user_position()?;
    if params.nearby()? {
        if let Some(position) = user.as_mut() {
            position.radius_km.get_or_insert(state.config.nearby_radius_km);
        }
    }
    let filters = EventFilters {
        neighborhood: params.text(&params.bairro),
        date: params.date()?,
        search: params.text(&params.busca),
        user,
        page,
        limit,
    };

    let snapshot = state.snapshots.current();
    let ctx = PipelineContext {
        now: state.clock.now(),
        tz: state.config.reference_zone(),
        policy: &state.config.amenities,
        restrooms: &snapshot.restrooms,
        hospitals: &snapshot.hospitals,
    };

    Ok(Json(query_events(&snapshot.events, &filters, &ctx)))
}

/// GET /api/agora (and /api/blocos/agora) - Blocos starting within the next hours (or just started)
pub async fn happening_now(State(state): State<AppState>) -> Json<Vec<ScoredEvent>> {
    let snapshot = state.snapshots.current();
    Json(curation::happening_now(
        &snapshot.events,
        state.clock.now(),
        state.config.reference_zone(),
    ))
}

/// GET /api/curadoria?dia= - Top blocos per period of one day
pub async fn curation(
    State(state): State<AppState>,
    Query(params): Query<QueryParams>,
) -> Result<Json<DayHighlights>, ApiError> {
    let day = params
        .day()?
        .ok_or_else(|| (StatusCode::BAD_REQUEST, "Query parameter 'dia' is required".to_string()))?;
    let snapshot = state.snapshots.current();
    Ok(Json(curation::curate(&snapshot.events, day)))
}

/// GET /api/listas - Distinct neighborhoods and dates for the filter menus
pub async fn filter_values(State(state): State<AppState>) -> Json<FilterValues> {
    Json(curation::filter_values(&state.snapshots.current().events))
}

/// GET /api/stats - Event count and busiest neighborhoods
pub async fn stats(State(state): State<AppState>) -> Json<EventStats> {
    Json(curation::stats(&state.snapshots.current().events))
}
