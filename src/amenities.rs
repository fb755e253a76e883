//! Restroom, hospital and service listings around an optional user
//! position.

use chrono::NaiveDate;

use crate::dataset::Snapshot;
use crate::geo::neighborhood::normalize_name;
use crate::geo::ranking::{enriched, rank_by_proximity, RankPolicy};
use crate::models::{EnrichedEntity, GeoPoint, LocatedEntity, UserPosition};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RestroomFilters {
    pub user: Option<UserPosition>,
    /// Minimum number of cabins. Points without a count never pass.
    pub min_capacity: Option<u32>,
    /// Matches the first or the last day the point is installed.
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct HospitalFilters {
    pub user: Option<UserPosition>,
    pub category: Option<String>,
    pub neighborhood: Option<String>,
    /// Substring of the name or the street.
    pub search: Option<String>,
}

fn contains_folded(haystack: Option<&str>, needle: &str) -> bool {
    haystack.is_some_and(|h| normalize_name(h).contains(&normalize_name(needle)))
}

fn unranked(entity: &LocatedEntity) -> EnrichedEntity {
    EnrichedEntity {
        entity: entity.clone(),
        distance_km: None,
        map_url: None,
        navigation_links: None,
    }
}

/// Rank around the user when there is one, otherwise keep dataset order.
fn place(user: Option<UserPosition>, items: Vec<&LocatedEntity>, with_links: bool) -> Vec<EnrichedEntity> {
    match user {
        Some(user) => {
            let policy = RankPolicy {
                max_radius_km: user.radius_km,
                limit: None,
            };
            rank_by_proximity(user.point, items, &policy)
                .into_iter()
                .map(|ranked| enriched(ranked, with_links))
                .collect()
        }
        None => items.into_iter().map(unranked).collect(),
    }
}

pub fn list_restrooms(restrooms: &[LocatedEntity], filters: &RestroomFilters) -> Vec<EnrichedEntity> {
    let matches = restrooms
        .iter()
        .filter(|r| {
            filters
                .min_capacity
                .is_none_or(|min| r.capacity.is_some_and(|c| c >= min))
        })
        .filter(|r| {
            filters
                .date
                .is_none_or(|d| r.available_from == Some(d) || r.available_until == Some(d))
        })
        .collect();
    place(filters.user, matches, false)
}

pub fn list_hospitals(hospitals: &[LocatedEntity], filters: &HospitalFilters) -> Vec<EnrichedEntity> {
    let matches = hospitals
        .iter()
        .filter(|h| {
            filters
                .category
                .as_deref()
                .is_none_or(|c| contains_folded(Some(&h.category), c))
        })
        .filter(|h| {
            filters
                .neighborhood
                .as_deref()
                .is_none_or(|n| contains_folded(h.address.neighborhood.as_deref(), n))
        })
        .filter(|h| {
            filters.search.as_deref().is_none_or(|q| {
                contains_folded(Some(&h.name), q) || contains_folded(h.address.street.as_deref(), q)
            })
        })
        .collect();
    place(filters.user, matches, false)
}

/// Every amenity and infrastructure point. Ranked with map links when the
/// caller sent a position.
pub fn list_services(snapshot: &Snapshot, user: Option<GeoPoint>) -> Vec<EnrichedEntity> {
    let user = user.map(|point| UserPosition {
        point,
        radius_km: None,
    });
    place(user, snapshot.services().collect(), user.is_some())
}

/// Closest services to `point`, optionally restricted to one `tipo`
/// (kind code such as BANHEIRO / SAUDE / METRO, or a category tag).
pub fn nearest_to(
    snapshot: &Snapshot,
    point: GeoPoint,
    kind: Option<&str>,
    policy: &RankPolicy,
) -> Vec<EnrichedEntity> {
    let wanted = kind.map(normalize_name).filter(|k| !k.is_empty());
    let candidates = snapshot.services().filter(|s| match &wanted {
        Some(code) => s.kind.code() == code || normalize_name(&s.category) == *code,
        None => true,
    });
    rank_by_proximity(point, candidates, policy)
        .into_iter()
        .map(|ranked| enriched(ranked, true))
        .collect()
}
