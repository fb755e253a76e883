use chrono::{DateTime, FixedOffset, NaiveDate};

use crate::config::AmenityPolicy;
use crate::events::curation::assess;
use crate::events::lifecycle::compute_state;
use crate::geo::navigation::navigation_links;
use crate::geo::neighborhood::normalize_name;
use crate::geo::ranking::{enrich_nearby, rank_by_proximity, RankPolicy};
use crate::geo::Locatable;
use crate::models::{
    EnrichedEvent, Event, EventPage, EventRuntimeState, GeoPoint, LocatedEntity, NearbyServices,
    UserPosition,
};

/// Listing filters. Every `None` means "do not filter on this".
#[derive(Debug, Clone, PartialEq)]
pub struct EventFilters {
    /// Substring of the neighborhood, case and accent insensitive.
    pub neighborhood: Option<String>,
    pub date: Option<NaiveDate>,
    /// Substring of the name or the street.
    pub search: Option<String>,
    pub user: Option<UserPosition>,
    /// 1-based.
    pub page: usize,
    pub limit: usize,
}

impl Default for EventFilters {
    fn default() -> Self {
        Self {
            neighborhood: None,
            date: None,
            search: None,
            user: None,
            page: 1,
            limit: 20,
        }
    }
}

/// Everything a query needs besides the events themselves.
#[derive(Debug, Clone, Copy)]
pub struct PipelineContext<'a> {
    pub now: DateTime<FixedOffset>,
    pub tz: FixedOffset,
    pub policy: &'a AmenityPolicy,
    pub restrooms: &'a [LocatedEntity],
    pub hospitals: &'a [LocatedEntity],
}

/// An event paired with its state at the query instant; ranks by where the
/// parade is now.
struct LiveEvent<'a> {
    event: &'a Event,
    state: EventRuntimeState,
}

impl Locatable for LiveEvent<'_> {
    fn location(&self) -> Option<GeoPoint> {
        self.state.current_point.known()
    }
}

fn contains_folded(haystack: &str, needle: &str) -> bool {
    normalize_name(haystack).contains(&normalize_name(needle))
}

/// Apply the neighborhood, date and text filters, in that order.
pub fn filter_events<'a>(events: &'a [Event], filters: &EventFilters) -> Vec<&'a Event> {
    events
        .iter()
        .filter(|e| {
            filters
                .neighborhood
                .as_deref()
                .is_none_or(|n| contains_folded(&e.neighborhood, n))
        })
        .filter(|e| filters.date.is_none_or(|d| e.scheduled_date == d))
        .filter(|e| {
            filters
                .search
                .as_deref()
                .is_none_or(|q| contains_folded(&e.name, q) || contains_folded(&e.street, q))
        })
        .collect()
}

/// Runtime state, nearby services, links and curation for one event.
/// Services are ranked around the parade's current position.
pub fn enrich_event(
    event: &Event,
    state: EventRuntimeState,
    distance_from_user_km: Option<f64>,
    ctx: &PipelineContext<'_>,
) -> EnrichedEvent {
    let anchor = state.current_point;
    let nearby_services = NearbyServices {
        restrooms: enrich_nearby(anchor, ctx.restrooms, &ctx.policy.restrooms(), false),
        hospitals: enrich_nearby(anchor, ctx.hospitals, &ctx.policy.hospitals(), false),
    };

    EnrichedEvent {
        event: event.clone(),
        state,
        distance_from_user_km,
        nearby_services,
        navigation_links: anchor.known().map(|p| navigation_links(p, &event.name)),
        curation: assess(event),
    }
}

/// Filter, order, paginate and enrich `events`. Inputs are left untouched.
///
/// With a user position the matches are ranked by distance from each
/// parade's current position (and cut to the radius, if any); otherwise
/// they come out in schedule order.
pub fn query_events(events: &[Event], filters: &EventFilters, ctx: &PipelineContext<'_>) -> EventPage {
    let live = filter_events(events, filters).into_iter().map(|event| LiveEvent {
        event,
        state: compute_state(event, ctx.now, ctx.tz),
    });

    let ordered: Vec<(LiveEvent<'_>, Option<f64>)> = match filters.user {
        Some(user) => {
            let policy = RankPolicy {
                max_radius_km: user.radius_km,
                limit: None,
            };
            rank_by_proximity(user.point, live, &policy)
                .into_iter()
                .map(|ranked| (ranked.item, Some(ranked.distance_km)))
                .collect()
        }
        None => {
            let mut live: Vec<(LiveEvent<'_>, Option<f64>)> = live.map(|l| (l, None)).collect();
            live.sort_by_key(|(l, _)| (l.event.scheduled_date, l.event.scheduled_start_time));
            live
        }
    };

    let page = filters.page.max(1);
    let limit = filters.limit.max(1);
    let total = ordered.len();

    let events = ordered
        .into_iter()
        .skip((page - 1).saturating_mul(limit))
        .take(limit)
        .map(|(live, distance)| enrich_event(live.event, live.state, distance, ctx))
        .collect();

    EventPage {
        total,
        page,
        limit,
        events,
    }
}
