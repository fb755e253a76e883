use chrono::{FixedOffset, Offset, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::geo::ranking::RankPolicy;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding the JSON datasets
    pub data_dir: PathBuf,
    /// Server bind address
    pub bind_addr: String,
    /// Seconds between dataset reloads (0 = never)
    pub refresh_interval_secs: u64,
    /// Offset of the reference time zone every schedule is read in
    pub utc_offset_hours: i32,
    /// Parade length used when a record does not carry one
    pub event_duration_minutes: u32,
    /// Radius and limit policy for nearby-service lookups
    pub amenities: AmenityPolicy,
    /// Radius applied by `proximo=1` when the caller sends no `raio`
    pub nearby_radius_km: f64,
    /// Default page size for the event listing
    pub page_size: usize,
    /// Upper bound for a client-supplied page size
    pub max_page_size: usize,
    /// Address geocoding for amenities without coordinates
    pub geocoder: GeocoderConfig,
}

/// How far, and how many, services are attached to each result.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AmenityPolicy {
    pub restroom_radius_km: f64,
    pub restroom_limit: usize,
    pub hospital_radius_km: f64,
    pub hospital_limit: usize,
    /// Result count for "nearest to me"
    pub nearest_limit: usize,
}

impl Default for AmenityPolicy {
    fn default() -> Self {
        Self {
            restroom_radius_km: 2.0,
            restroom_limit: 3,
            hospital_radius_km: 5.0,
            hospital_limit: 3,
            nearest_limit: 10,
        }
    }
}

impl AmenityPolicy {
    pub fn restrooms(&self) -> RankPolicy {
        RankPolicy::within(self.restroom_radius_km, self.restroom_limit)
    }

    pub fn hospitals(&self) -> RankPolicy {
        RankPolicy::within(self.hospital_radius_km, self.hospital_limit)
    }

    pub fn nearest(&self) -> RankPolicy {
        RankPolicy::nearest(self.nearest_limit)
    }
}

/// Nominatim-compatible geocoder. Disabled when `base_url` is None.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocoderConfig {
    pub base_url: Option<String>,
    pub user_agent: String,
    /// Pause between lookups; public Nominatim allows one request per second.
    pub delay_ms: u64,
    /// Lookups per refresh cycle
    pub max_lookups: usize,
    /// Appended to every address before lookup
    pub city_suffix: String,
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            user_agent: "bloco-radar".to_string(),
            delay_ms: 1_200,
            max_lookups: 50,
            city_suffix: "Belo Horizonte".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
            bind_addr: "127.0.0.1:3005".to_string(),
            refresh_interval_secs: 3_600,
            utc_offset_hours: -3,
            event_duration_minutes: 120,
            amenities: AmenityPolicy::default(),
            nearby_radius_km: 3.0,
            page_size: 20,
            max_page_size: 200,
            geocoder: GeocoderConfig::default(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(dir) = std::env::var("BLOCO_RADAR_DATA_DIR") {
            config.data_dir = PathBuf::from(dir);
        }
        if let Ok(addr) = std::env::var("BLOCO_RADAR_BIND_ADDR") {
            config.bind_addr = addr;
        }
        if let Ok(val) = std::env::var("BLOCO_RADAR_REFRESH_SECS") {
            if let Ok(v) = val.parse() {
                config.refresh_interval_secs = v;
            }
        }
        if let Ok(val) = std::env::var("BLOCO_RADAR_UTC_OFFSET_HOURS") {
            if let Ok(v) = val.parse::<i32>() {
                if (-23..=23).contains(&v) {
                    config.utc_offset_hours = v;
                }
            }
        }
        if let Ok(val) = std::env::var("BLOCO_RADAR_EVENT_DURATION_MIN") {
            if let Ok(v) = val.parse::<u32>() {
                if v > 0 {
                    config.event_duration_minutes = v;
                }
            }
        }
        if let Ok(val) = std::env::var("BLOCO_RADAR_NEARBY_RADIUS_KM") {
            if let Ok(v) = val.parse::<f64>() {
                if v.is_finite() && v > 0.0 {
                    config.nearby_radius_km = v;
                }
            }
        }
        if let Ok(val) = std::env::var("BLOCO_RADAR_PAGE_SIZE") {
            if let Ok(v) = val.parse::<usize>() {
                config.page_size = v.max(1);
            }
        }

        // Nearby-service policy
        if let Ok(val) = std::env::var("BLOCO_RADAR_RESTROOM_RADIUS_KM") {
            if let Ok(v) = val.parse::<f64>() {
                if v.is_finite() && v > 0.0 {
                    config.amenities.restroom_radius_km = v;
                }
            }
        }
        if let Ok(val) = std::env::var("BLOCO_RADAR_RESTROOM_LIMIT") {
            if let Ok(v) = val.parse() {
                config.amenities.restroom_limit = v;
            }
        }
        if let Ok(val) = std::env::var("BLOCO_RADAR_HOSPITAL_RADIUS_KM") {
            if let Ok(v) = val.parse::<f64>() {
                if v.is_finite() && v > 0.0 {
                    config.amenities.hospital_radius_km = v;
                }
            }
        }
        if let Ok(val) = std::env::var("BLOCO_RADAR_HOSPITAL_LIMIT") {
            if let Ok(v) = val.parse() {
                config.amenities.hospital_limit = v;
            }
        }
        if let Ok(val) = std::env::var("BLOCO_RADAR_NEAREST_LIMIT") {
            if let Ok(v) = val.parse() {
                config.amenities.nearest_limit = v;
            }
        }

        // Geocoder
        if let Ok(url) = std::env::var("GEOCODER_BASE_URL") {
            if !url.trim().is_empty() {
                config.geocoder.base_url = Some(url.trim_end_matches('/').to_string());
            }
        }
        if let Ok(agent) = std::env::var("GEOCODER_USER_AGENT") {
            config.geocoder.user_agent = agent;
        }
        if let Ok(val) = std::env::var("GEOCODER_MAX_LOOKUPS") {
            if let Ok(v) = val.parse() {
                config.geocoder.max_lookups = v;
            }
        }

        config
    }

    /// The single zone every scheduled time is interpreted in.
    pub fn reference_zone(&self) -> FixedOffset {
        FixedOffset::east_opt(self.utc_offset_hours.saturating_mul(3_600)).unwrap_or_else(|| Utc.fix())
    }

    pub fn events_path(&self) -> PathBuf {
        self.data_dir.join("blocos.json")
    }

    pub fn restrooms_path(&self) -> PathBuf {
        self.data_dir.join("banheiros.json")
    }

    pub fn hospitals_path(&self) -> PathBuf {
        self.data_dir.join("hospitais.json")
    }

    pub fn infrastructure_path(&self) -> PathBuf {
        self.data_dir.join("infraestrutura.json")
    }
}
