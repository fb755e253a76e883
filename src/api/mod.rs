//! Axum HTTP handlers. Query strings are parsed and validated here; the
//! core only ever sees typed, well-formed values.

pub mod admin;
pub mod amenities;
pub mod events;

use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::Router;
use chrono::NaiveDate;
use serde::Deserialize;
use std::str::FromStr;

use crate::dataset::json::parse_date;
use crate::models::{GeoPoint, UserPosition};
use crate::state::AppState;

pub type ApiError = (StatusCode, String);

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/blocos", get(events::list_events))
        .route("/api/blocos/agora", get(events::happening_now))
        .route("/api/agora", get(events::happening_now))
        .route("/api/curadoria", get(events::curation))
        .route("/api/listas", get(events::filter_values))
        .route("/api/stats", get(events::stats))
        .route("/api/banheiros", get(amenities::restrooms))
        .route("/api/hospitais", get(amenities::hospitals))
        .route("/api/servicos", get(amenities::services))
        .route("/api/proximo-de-mim", get(amenities::nearest))
        .route("/api/admin/status", get(admin::status))
        .route("/api/admin/atualizar-dados", post(admin::refresh))
        .with_state(state)
}

async fn health() -> &'static str {
    "OK"
}

/// The query string every listing accepts. Values stay raw strings until a
/// handler asks for them, so each can be rejected with a precise message.
#[derive(Debug, Default, Deserialize)]
pub struct QueryParams {
    pub bairro: Option<String>,
    pub busca: Option<String>,
    pub data: Option<String>,
    pub dia: Option<String>,
    pub lat: Option<String>,
    pub lng: Option<String>,
    pub lon: Option<String>,
    pub raio: Option<String>,
    pub proximo: Option<String>,
    pub categoria: Option<String>,
    pub tipo: Option<String>,
    pub qtd_minima: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

/// Empty and whitespace-only values count as absent.
fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn bad_request(message: String) -> ApiError {
    (StatusCode::BAD_REQUEST, message)
}

fn number<T: FromStr>(name: &str, value: &Option<String>) -> Result<Option<T>, ApiError> {
    present(value)
        .map(|raw| {
            raw.parse::<T>()
                .map_err(|_| bad_request(format!("Invalid number for '{name}': {raw}")))
        })
        .transpose()
}

fn coordinate(name: &str, value: &Option<String>) -> Result<Option<f64>, ApiError> {
    match number::<f64>(name, value)? {
        Some(v) if !v.is_finite() => Err(bad_request(format!("Invalid number for '{name}'"))),
        other => Ok(other),
    }
}

fn date(name: &str, value: &Option<String>) -> Result<Option<NaiveDate>, ApiError> {
    present(value)
        .map(|raw| {
            parse_date(raw).ok_or_else(|| bad_request(format!("Invalid date for '{name}': {raw}")))
        })
        .transpose()
}

impl QueryParams {
    pub fn text(&self, value: &Option<String>) -> Option<String> {
        present(value).map(str::to_string)
    }

    /// `lat` plus `lng` (or `lon`). One without the other is an error.
    pub fn point(&self) -> Result<Option<GeoPoint>, ApiError> {
        let lat = coordinate("lat", &self.lat)?;
        let lng = match coordinate("lng", &self.lng)? {
            Some(v) => Some(v),
            None => coordinate("lon", &self.lon)?,
        };
        match (lat, lng) {
            (Some(latitude), Some(longitude)) => Ok(Some(GeoPoint::new(latitude, longitude))),
            (None, None) => Ok(None),
            _ => Err(bad_request("Both 'lat' and 'lng' are required for a position".to_string())),
        }
    }

    /// User position with the optional `raio` (km).
    pub fn user_position(&self) -> Result<Option<UserPosition>, ApiError> {
        let radius_km = match number::<f64>("raio", &self.raio)? {
            Some(r) if !r.is_finite() || r < 0.0 => {
                return Err(bad_request("'raio' must be a non-negative number".to_string()))
            }
            other => other,
        };
        match self.point()? {
            Some(point) => Ok(Some(UserPosition { point, radius_km })),
            None if radius_km.is_some() => {
                Err(bad_request("'raio' needs 'lat' and 'lng'".to_string()))
            }
            None => Ok(None),
        }
    }

    /// `proximo=1` (or `true`): only events close to the caller.
    pub fn nearby(&self) -> Result<bool, ApiError> {
        match present(&self.proximo) {
            None | Some("0") | Some("false") => Ok(false),
            Some("1") | Some("true") => Ok(true),
            Some(raw) => Err(bad_request(format!("Invalid value for 'proximo': {raw}"))),
        }
    }

    pub fn date(&self) -> Result<Option<NaiveDate>, ApiError> {
        date("data", &self.data)
    }

    pub fn day(&self) -> Result<Option<NaiveDate>, ApiError> {
        date("dia", &self.dia)
    }

    pub fn min_capacity(&self) -> Result<Option<u32>, ApiError> {
        number("qtd_minima", &self.qtd_minima)
    }

    /// 1-based page and a page size capped at `max_limit`.
    pub fn pagination(&self, default_limit: usize, max_limit: usize) -> Result<(usize, usize), ApiError> {
        let page = number::<usize>("page", &self.page)?.unwrap_or(1);
        let limit = number::<usize>("limit", &self.limit)?.unwrap_or(default_limit);
        if page == 0 || limit == 0 {
            return Err(bad_request("'page' and 'limit' start at 1".to_string()));
        }
        Ok((page, limit.min(max_limit)))
    }
}
