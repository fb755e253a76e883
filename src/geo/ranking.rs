use serde::{Deserialize, Serialize};

use crate::geo::distance::{measure_km, round_km, SENTINEL_DISTANCE_KM};
use crate::geo::navigation;
use crate::geo::Locatable;
use crate::models::{EnrichedEntity, GeoPoint, LocatedEntity};

/// Radius cap and result limit for one ranking call site.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RankPolicy {
    /// Inclusive. Items without a usable location never pass a radius.
    pub max_radius_km: Option<f64>,
    /// `None` keeps every item.
    pub limit: Option<usize>,
}

impl RankPolicy {
    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn within(max_radius_km: f64, limit: usize) -> Self {
        Self {
            max_radius_km: Some(max_radius_km),
            limit: Some(limit),
        }
    }

    pub fn nearest(limit: usize) -> Self {
        Self {
            max_radius_km: None,
            limit: Some(limit),
        }
    }
}

/// An item together with its distance from the ranking reference.
#[derive(Debug, Clone)]
pub struct Ranked<T> {
    pub item: T,
    /// Display value, rounded to two decimals. Sentinel when unmeasurable.
    pub distance_km: f64,
    /// Full precision, `None` when either point was unknown.
    pub exact_km: Option<f64>,
}

impl<T> Ranked<T> {
    fn sort_key(&self) -> f64 {
        self.exact_km.unwrap_or(f64::INFINITY)
    }
}

/// Measure, filter, sort and cap `items` around `reference`.
///
/// Sorting is stable: items at the same distance keep their input order,
/// which keeps paginated listings deterministic.
pub fn rank_by_proximity<I, T>(reference: GeoPoint, items: I, policy: &RankPolicy) -> Vec<Ranked<T>>
where
    I: IntoIterator<Item = T>,
    T: Locatable,
{
    let mut ranked: Vec<Ranked<T>> = items
        .into_iter()
        .map(|item| {
            let exact_km = item
                .location()
                .and_then(|location| measure_km(reference, location));
            Ranked {
                distance_km: exact_km.map_or(SENTINEL_DISTANCE_KM, round_km),
                exact_km,
                item,
            }
        })
        .filter(|r| match policy.max_radius_km {
            Some(max) => r.exact_km.is_some_and(|km| km <= max),
            None => true,
        })
        .collect();

    ranked.sort_by(|a, b| a.sort_key().total_cmp(&b.sort_key()));

    if let Some(limit) = policy.limit {
        ranked.truncate(limit);
    }
    ranked
}

/// Rank a borrowed entity dataset and copy the survivors into enriched
/// records. `with_links` attaches a map link and the full navigation set.
pub fn enrich_nearby(
    reference: GeoPoint,
    dataset: &[LocatedEntity],
    policy: &RankPolicy,
    with_links: bool,
) -> Vec<EnrichedEntity> {
    rank_by_proximity(reference, dataset, policy)
        .into_iter()
        .map(|ranked| enriched(ranked, with_links))
        .collect()
}

pub(crate) fn enriched(ranked: Ranked<&LocatedEntity>, with_links: bool) -> EnrichedEntity {
    let entity = ranked.item.clone();
    let (map_url, navigation_links) = match (with_links, entity.location.and_then(GeoPoint::known)) {
        (true, Some(point)) => (
            Some(navigation::map_link(point)),
            Some(navigation::navigation_links(point, &entity.name)),
        ),
        _ => (None, None),
    };
    EnrichedEntity {
        entity,
        distance_km: Some(ranked.distance_km),
        map_url,
        navigation_links,
    }
}
