use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;

use crate::amenities::{self, HospitalFilters, RestroomFilters};
use crate::api::{ApiError, QueryParams};
use crate::models::EnrichedEntity;
use crate::state::AppState;

/// GET /api/banheiros - Restrooms by capacity, day and distance
pub async fn restrooms(
    State(state): State<AppState>,
    Query(params): Query<QueryParams>,
) -> Result<Json<Vec<EnrichedEntity>>, ApiError> {
    let filters = RestroomFilters {
        user: params.user_position()?,
        min_capacity: params.min_capacity()?,
        date: params.date()?,
    };
    let snapshot = state.snapshots.current();
    Ok(Json(amenities::list_restrooms(&snapshot.restrooms, &filters)))
}

/// GET /api/hospitais - Hospitals and emergency units
pub async fn hospitals(
    State(state): State<AppState>,
    Query(params): Query<QueryParams>,
) -> Result<Json<Vec<EnrichedEntity>>, ApiError> {
    let filters = HospitalFilters {
        user: params.user_position()?,
        category: params.text(&params.categoria),
        neighborhood: params.text(&params.bairro),
        search: params.text(&params.busca),
    };
    let snapshot = state.snapshots.current();
    Ok(Json(amenities::list_hospitals(&snapshot.hospitals, &filters)))
}

/// GET /api/servicos - Every service point, nearest first when a position is given
pub async fn services(
    State(state): State<AppState>,
    Query(params): Query<QueryParams>,
) -> Result<Json<Vec<EnrichedEntity>>, ApiError> {
    let point = params.point()?;
    let snapshot = state.snapshots.current();
    Ok(Json(amenities::list_services(&snapshot, point)))
}

/// GET /api/proximo-de-mim - Closest services, optionally of one `tipo`
pub async fn nearest(
    State(state): State<AppState>,
    Query(params): Query<QueryParams>,
) -> Result<Json<Vec<EnrichedEntity>>, ApiError> {
    let point = params
        .point()?
        .ok_or_else(|| (StatusCode::BAD_REQUEST, "Query parameters 'lat' and 'lng' are required".to_string()))?;
    let tipo = params.text(&params.tipo);
    let snapshot = state.snapshots.current();
    Ok(Json(amenities::nearest_to(
        &snapshot,
        point,
        tipo.as_deref(),
        &state.config.amenities.nearest(),
    )))
}
