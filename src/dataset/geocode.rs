use anyhow::{Context, Result};
use parking_lot::Mutex;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

use crate::config::GeocoderConfig;
use crate::models::{GeoPoint, LocatedEntity};

/// One row of a Nominatim `/search?format=json` response. Coordinates come
/// back as strings.
#[derive(Debug, Deserialize)]
struct SearchHit {
    lat: String,
    lon: String,
}

/// First usable point in a Nominatim search response body.
pub fn parse_search_response(body: &str) -> Result<Option<GeoPoint>> {
    let hits: Vec<SearchHit> =
        serde_json::from_str(body).context("Failed to parse geocoder response")?;
    Ok(hits.into_iter().find_map(|hit| {
        let latitude = hit.lat.trim().parse().ok()?;
        let longitude = hit.lon.trim().parse().ok()?;
        GeoPoint::new(latitude, longitude).known()
    }))
}

/// Fills in coordinates for amenities the city published without them.
///
/// Answers (including misses) are remembered per query, so a reload of the
/// same files does not hit the service again.
pub struct Geocoder {
    client: reqwest::Client,
    config: GeocoderConfig,
    base_url: String,
    cache: Mutex<HashMap<String, Option<GeoPoint>>>,
}

impl Geocoder {
    /// `None` when no geocoder endpoint is configured.
    pub fn from_config(config: &GeocoderConfig) -> Option<Self> {
        let base_url = config.base_url.clone()?;
        Some(Self {
            client: reqwest::Client::builder()
                .connect_timeout(Duration::from_secs(5))
                .timeout(Duration::from_secs(15))
                .build()
                .unwrap_or_default(),
            config: config.clone(),
            base_url,
            cache: Mutex::new(HashMap::new()),
        })
    }

    /// Free-text query for an entity: street, neighborhood and city.
    pub fn query_for(&self, entity: &LocatedEntity) -> Option<String> {
        let street = entity.address.formatted()?;
        let mut parts = vec![street];
        if let Some(neighborhood) = &entity.address.neighborhood {
            parts.push(neighborhood.clone());
        }
        if !self.config.city_suffix.is_empty() {
            parts.push(self.config.city_suffix.clone());
        }
        Some(parts.join(", "))
    }

    pub async fn lookup(&self, query: &str) -> Result<Option<GeoPoint>> {
        let url = format!(
            "{}/search?format=json&limit=1&q={}",
            self.base_url,
            urlencoding::encode(query)
        );

        let resp = self
            .client
            .get(&url)
            .header(reqwest::header::USER_AGENT, &self.config.user_agent)
            .send()
            .await
            .context("Failed to call geocoder")?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("Geocoder returned {status}: {body}");
        }

        let body = resp.text().await.context("Failed to read geocoder response")?;
        parse_search_response(&body)
    }

    /// Geocode entities without a location, at most `max_lookups` requests
    /// per call, pausing `delay_ms` between them. Returns how many were fixed.
    pub async fn fill_missing(&self, entities: &mut [LocatedEntity]) -> usize {
        let delay = Duration::from_millis(self.config.delay_ms);
        let mut lookups = 0;
        let mut fixed = 0;

        for entity in entities.iter_mut().filter(|e| e.location.is_none()) {
            let Some(query) = self.query_for(entity) else {
                continue;
            };
            let cached = self.cache.lock().get(&query).copied();
            if let Some(cached) = cached {
                if cached.is_some() {
                    entity.location = cached;
                    fixed += 1;
                }
                continue;
            }
            if lookups >= self.config.max_lookups {
                tracing::info!("Geocoding budget exhausted, remaining entities wait for the next cycle");
                break;
            }
            if lookups > 0 {
                tokio::time::sleep(delay).await;
            }
            lookups += 1;

            match self.lookup(&query).await {
                Ok(Some(point)) => {
                    tracing::debug!("Geocoded {query}");
                    entity.location = Some(point);
                    self.cache.lock().insert(query, Some(point));
                    fixed += 1;
                }
                Ok(None) => {
                    tracing::debug!("No geocoding match for {query}");
                    self.cache.lock().insert(query, None);
                }
                // Transient failures are not cached.
                Err(e) => tracing::warn!("Geocoding failed for {query}: {e:#}"),
            }
        }

        fixed
    }
}
