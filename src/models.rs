use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

/// A WGS84 coordinate pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Zero or non-finite components mean the position was never captured.
    pub fn is_known(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && self.latitude != 0.0
            && self.longitude != 0.0
    }

    /// `Some(self)` when the point is usable for distance computation.
    pub fn known(self) -> Option<Self> {
        self.is_known().then_some(self)
    }
}

/// Where the caller is, and optionally how far they are willing to go.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UserPosition {
    pub point: GeoPoint,
    /// Inclusive radius in km. `None` ranks without cutting.
    pub radius_km: Option<f64>,
}

/// Broad family a located entity belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Restroom,
    Hospital,
    TransitStation,
    Infrastructure,
}

impl EntityKind {
    /// Legacy `tipo` code accepted by the nearest-to-me filter.
    pub fn code(&self) -> &'static str {
        match self {
            EntityKind::Restroom => "BANHEIRO",
            EntityKind::Hospital => "SAUDE",
            EntityKind::TransitStation => "METRO",
            EntityKind::Infrastructure => "INFRA",
        }
    }
}

/// Street address split the way the city datasets publish it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Address {
    pub street_type: Option<String>,
    pub street: Option<String>,
    pub number: Option<String>,
    pub neighborhood: Option<String>,
}

impl Address {
    /// "RUA TUPIS, 337". `None` when there is no street at all.
    pub fn formatted(&self) -> Option<String> {
        let street = self.street.as_deref().map(str::trim).filter(|s| !s.is_empty())?;
        let prefix = self.street_type.as_deref().unwrap_or("").trim();
        let number = self
            .number
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or("S/N");
        Some(format!("{prefix} {street}, {number}").trim().to_string())
    }
}

/// An amenity or infrastructure point from one of the city datasets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocatedEntity {
    pub name: String,
    pub kind: EntityKind,
    /// Upper-case category tag ("HOSPITAL", "UPA", "POLICIA", ...).
    pub category: String,
    #[serde(default)]
    pub address: Address,
    pub location: Option<GeoPoint>,
    /// Number of cabins for restrooms.
    #[serde(default)]
    pub capacity: Option<u32>,
    #[serde(default)]
    pub available_from: Option<NaiveDate>,
    #[serde(default)]
    pub available_until: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NavigationLinks {
    pub map_url: String,
    pub turn_by_turn_url: String,
    pub rideshare_url: String,
}

/// A located entity annotated for one query. Never stored.
#[derive(Debug, Clone, Serialize)]
pub struct EnrichedEntity {
    #[serde(flatten)]
    pub entity: LocatedEntity,
    /// Rounded to two decimals. `None` when the listing was not ranked.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub map_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub navigation_links: Option<NavigationLinks>,
}

/// A carnival bloco with its scheduled window and route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    pub name: String,
    pub scheduled_date: NaiveDate,
    pub scheduled_start_time: NaiveTime,
    pub start_point: GeoPoint,
    /// Absent for blocos that parade in place.
    pub end_point: Option<GeoPoint>,
    pub neighborhood: String,
    #[serde(default)]
    pub street: String,
    pub duration_minutes: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventStatus {
    NotStarted,
    InProgress,
    Finished,
}

/// Lifecycle view of an event at one instant. Recomputed on every read.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EventRuntimeState {
    pub status: EventStatus,
    pub current_point: GeoPoint,
    pub minutes_remaining: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DayPeriod {
    Morning,
    Afternoon,
    Night,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CrowdLevel {
    Calm,
    Busy,
    Chaos,
}

/// Static weather hint for a time of day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WeatherHint {
    pub temperature: &'static str,
    pub condition: &'static str,
    pub rain_chance: &'static str,
}

/// Popularity metadata derived from the event name, place and time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Curation {
    pub score: u32,
    pub highlight: bool,
    pub crowd_level: CrowdLevel,
    pub period: DayPeriod,
    pub weather: WeatherHint,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScoredEvent {
    #[serde(flatten)]
    pub event: Event,
    #[serde(flatten)]
    pub curation: Curation,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct NearbyServices {
    pub restrooms: Vec<EnrichedEntity>,
    pub hospitals: Vec<EnrichedEntity>,
}

/// An event ready for serialization: runtime state, nearby services and links.
#[derive(Debug, Clone, Serialize)]
pub struct EnrichedEvent {
    #[serde(flatten)]
    pub event: Event,
    #[serde(flatten)]
    pub state: EventRuntimeState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_from_user_km: Option<f64>,
    pub nearby_services: NearbyServices,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub navigation_links: Option<NavigationLinks>,
    pub curation: Curation,
}

/// One page of the event listing.
#[derive(Debug, Clone, Serialize)]
pub struct EventPage {
    /// Matches before pagination.
    pub total: usize,
    pub page: usize,
    pub limit: usize,
    pub events: Vec<EnrichedEvent>,
}
