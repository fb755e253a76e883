//! JSON file provider.
//!
//! The city exports and the scraper output disagree on field names
//! (`latitude` / `lat` / `inicio_lat`, `longitude` / `lng` / `lon`, ...),
//! on number encoding (numbers or strings) and on date format. Everything is
//! normalized here so the rest of the crate only sees canonical records.

use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveTime};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::config::Config;
use crate::dataset::builtin;
use crate::dataset::DatasetProvider;
use crate::geo::neighborhood::{canonical_name, neighborhood_from_address, NeighborhoodResolver};
use crate::models::{Address, EntityKind, Event, GeoPoint, LocatedEntity};

type Record = Map<String, Value>;

const LAT_KEYS: &[&str] = &["latitude", "lat", "inicio_lat"];
const LNG_KEYS: &[&str] = &["longitude", "lng", "lon", "inicio_lng", "inicio_lon"];
const EVENT_LAT_KEYS: &[&str] = &["inicio_lat", "latitude", "lat"];
const EVENT_LNG_KEYS: &[&str] = &["inicio_lng", "inicio_lon", "longitude", "lng", "lon"];
const EVENT_END_LAT_KEYS: &[&str] = &["fim_lat", "final_lat"];
const EVENT_END_LNG_KEYS: &[&str] = &["fim_lng", "fim_lon", "final_lng"];

/// Reads the datasets from JSON files in the data directory.
#[derive(Debug, Clone)]
pub struct JsonFileProvider {
    events_path: PathBuf,
    restrooms_path: PathBuf,
    hospitals_path: PathBuf,
    infrastructure_path: PathBuf,
    event_duration_minutes: u32,
}

impl JsonFileProvider {
    pub fn new(config: &Config) -> Self {
        Self {
            events_path: config.events_path(),
            restrooms_path: config.restrooms_path(),
            hospitals_path: config.hospitals_path(),
            infrastructure_path: config.infrastructure_path(),
            event_duration_minutes: config.event_duration_minutes,
        }
    }
}

impl DatasetProvider for JsonFileProvider {
    fn events(&self, resolver: &NeighborhoodResolver) -> Vec<Event> {
        let records = load_or_empty(&self.events_path);
        let total = records.len();
        let events: Vec<Event> = records
            .iter()
            .filter_map(|r| event_from_record(r, resolver, self.event_duration_minutes))
            .collect();
        if events.len() < total {
            tracing::warn!(
                skipped = total - events.len(),
                "Skipped event records without name, date or start time"
            );
        }
        events
    }

    fn restrooms(&self) -> Vec<LocatedEntity> {
        load_or_empty(&self.restrooms_path)
            .iter()
            .map(|r| entity_from_record(r, EntityKind::Restroom))
            .collect()
    }

    fn hospitals(&self) -> Vec<LocatedEntity> {
        load_or_empty(&self.hospitals_path)
            .iter()
            .map(|r| entity_from_record(r, EntityKind::Hospital))
            .collect()
    }

    fn infrastructure(&self) -> Vec<LocatedEntity> {
        if !self.infrastructure_path.exists() {
            return builtin::infrastructure();
        }
        load_or_empty(&self.infrastructure_path)
            .iter()
            .map(|r| {
                let kind = text(r, &["tipo", "kind"])
                    .map(|code| kind_for_code(&code))
                    .unwrap_or(EntityKind::Infrastructure);
                entity_from_record(r, kind)
            })
            .collect()
    }
}

/// Top-level array, or an object wrapping the array under `dados` / `data`
/// (the scraper cache format).
pub fn read_records(path: &Path) -> Result<Vec<Record>> {
    let data = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let value: Value = serde_json::from_str(&data)
        .with_context(|| format!("Invalid JSON in {}", path.display()))?;

    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut wrapper) => match wrapper.remove("dados").or_else(|| wrapper.remove("data")) {
            Some(Value::Array(items)) => items,
            _ => anyhow::bail!("{} has no record array", path.display()),
        },
        _ => anyhow::bail!("{} has no record array", path.display()),
    };

    Ok(items
        .into_iter()
        .filter_map(|item| match item {
            Value::Object(record) => Some(record),
            _ => None,
        })
        .collect())
}

fn load_or_empty(path: &Path) -> Vec<Record> {
    if !path.exists() {
        tracing::debug!("Dataset {} not found, using empty set", path.display());
        return Vec::new();
    }
    match read_records(path) {
        Ok(records) => records,
        Err(e) => {
            tracing::warn!("Dataset unavailable, using empty set: {e:#}");
            Vec::new()
        }
    }
}

/// First non-empty string (or number) under any of `keys`.
fn text(record: &Record, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match record.get(*key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

/// First numeric value under any of `keys`; numeric strings count,
/// including the decimal-comma form.
fn number(record: &Record, keys: &[&str]) -> Option<f64> {
    keys.iter().find_map(|key| match record.get(*key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().replace(',', ".").parse().ok(),
        _ => None,
    })
}

fn point(record: &Record, lat_keys: &[&str], lng_keys: &[&str]) -> Option<GeoPoint> {
    let latitude = number(record, lat_keys)?;
    let longitude = number(record, lng_keys)?;
    GeoPoint::new(latitude, longitude).known()
}

/// `YYYY-MM-DD` or the portal's `DD/MM/YYYY`.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(raw, "%d/%m/%Y"))
        .ok()
}

/// `HH:MM`, `HH:MM:SS`, or the colloquial `14h` / `14h30`.
pub fn parse_time(raw: &str) -> Option<NaiveTime> {
    let raw = raw.trim().to_lowercase();
    if let Ok(t) = NaiveTime::parse_from_str(&raw, "%H:%M") {
        return Some(t);
    }
    if let Ok(t) = NaiveTime::parse_from_str(&raw, "%H:%M:%S") {
        return Some(t);
    }
    let (hours, minutes) = raw.split_once('h')?;
    let hours: u32 = hours.trim().parse().ok()?;
    let minutes: u32 = match minutes.trim() {
        "" => 0,
        m => m.parse().ok()?,
    };
    NaiveTime::from_hms_opt(hours, minutes, 0)
}

fn kind_for_code(code: &str) -> EntityKind {
    match canonical_name(code).as_str() {
        "BANHEIRO" | "BANHEIROS" => EntityKind::Restroom,
        "SAUDE" | "HOSPITAL" | "UPA" => EntityKind::Hospital,
        "METRO" | "ESTACAO" => EntityKind::TransitStation,
        _ => EntityKind::Infrastructure,
    }
}

pub(crate) fn event_from_record(
    record: &Record,
    resolver: &NeighborhoodResolver,
    default_duration: u32,
) -> Option<Event> {
    let name = text(record, &["nome", "name"])?;
    let scheduled_date = parse_date(&text(record, &["data", "date"])?)?;
    let scheduled_start_time = parse_time(&text(record, &["hora", "horario", "time"])?)?;

    let address = text(record, &["local", "endereco"]);
    let neighborhood = text(record, &["bairro", "neighborhood"])
        .map(|b| canonical_name(&b))
        .unwrap_or_else(|| neighborhood_from_address(address.as_deref().unwrap_or("")));
    let street = text(record, &["logradouro"]).or(address).unwrap_or_default();

    let start_point = point(record, EVENT_LAT_KEYS, EVENT_LNG_KEYS)
        .unwrap_or_else(|| resolver.resolve(&neighborhood));
    let end_point = point(record, EVENT_END_LAT_KEYS, EVENT_END_LNG_KEYS);

    let duration_minutes = number(record, &["duracao_min", "duration_minutes"])
        .filter(|d| *d >= 1.0)
        .map(|d| d as u32)
        .unwrap_or(default_duration)
        .max(1);

    Some(Event {
        id: text(record, &["id"]).unwrap_or_else(|| Uuid::new_v4().to_string()),
        name,
        scheduled_date,
        scheduled_start_time,
        start_point,
        end_point,
        neighborhood,
        street,
        duration_minutes,
    })
}

pub(crate) fn entity_from_record(record: &Record, kind: EntityKind) -> LocatedEntity {
    let address = Address {
        street_type: text(record, &["tipo_logradouro"]),
        street: text(record, &["logradouro", "endereco"]),
        number: text(record, &["numero", "numero_imovel"]),
        neighborhood: text(record, &["bairro"]).map(|b| canonical_name(&b)),
    };

    let category = text(record, &["categoria", "sigla_categoria", "tipo"])
        .map(|c| c.to_uppercase())
        .unwrap_or_else(|| kind.code().to_string());

    let name = text(record, &["nome", "name"])
        .or_else(|| address.formatted())
        .unwrap_or_else(|| category.clone());

    LocatedEntity {
        name,
        kind,
        category,
        location: point(record, LAT_KEYS, LNG_KEYS),
        capacity: number(record, &["quantidade", "qtd", "capacity"])
            .filter(|q| *q >= 0.0)
            .map(|q| q as u32),
        available_from: text(record, &["data_inicio"]).and_then(|d| parse_date(&d)),
        available_until: text(record, &["data_final", "data_fim"]).and_then(|d| parse_date(&d)),
        address,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Record {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_parse_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2026, 2, 14);
        assert_eq!(parse_date("2026-02-14"), expected);
        assert_eq!(parse_date("14/02/2026"), expected);
        assert_eq!(parse_date("amanhã"), None);
    }

    #[test]
    fn test_parse_time_formats() {
        let two_pm = NaiveTime::from_hms_opt(14, 0, 0);
        assert_eq!(parse_time("14:00"), two_pm);
        assert_eq!(parse_time("14:00:00"), two_pm);
        assert_eq!(parse_time("14h"), two_pm);
        assert_eq!(parse_time("14h30"), NaiveTime::from_hms_opt(14, 30, 0));
        assert_eq!(parse_time("tarde"), None);
    }

    #[test]
    fn test_event_from_scraper_shape() {
        let resolver = NeighborhoodResolver::new();
        let r = record(json!({
            "id": 42,
            "nome": "Então Brilha",
            "data": "14/02/2026",
            "hora": "07:00",
            "inicio_lat": "-19.9167",
            "inicio_lng": -43.9345,
            "fim_lat": -19.9402,
            "fim_lng": -43.9339,
            "bairro": "Santa Efigênia",
            "logradouro": "Rua dos Guaicurus"
        }));
        let event = event_from_record(&r, &resolver, 120).unwrap();

        assert_eq!(event.id, "42");
        assert_eq!(event.neighborhood, "SANTA EFIGENIA");
        assert_eq!(event.start_point, GeoPoint::new(-19.9167, -43.9345));
        assert_eq!(event.end_point, Some(GeoPoint::new(-19.9402, -43.9339)));
        assert_eq!(event.street, "Rua dos Guaicurus");
        assert_eq!(event.duration_minutes, 120);
    }

    #[test]
    fn test_event_without_coordinates_uses_neighborhood() {
        let resolver = NeighborhoodResolver::new();
        let r = record(json!({
            "nome": "Bloco Sem GPS",
            "data": "2026-02-15",
            "hora": "10:00",
            "local": "Rua Sapucaí, 300, Floresta"
        }));
        let event = event_from_record(&r, &resolver, 90).unwrap();

        assert_eq!(event.neighborhood, "FLORESTA");
        assert_eq!(event.start_point, GeoPoint::new(-19.9119, -43.9288));
        assert_eq!(event.end_point, None);
        assert_eq!(event.duration_minutes, 90);
        assert!(Uuid::parse_str(&event.id).is_ok());
    }

    #[test]
    fn test_aliased_neighborhood_from_address_matches_field() {
        let resolver = NeighborhoodResolver::new();
        let from_field = record(json!({
            "nome": "Bloco da Savassi",
            "data": "2026-02-15",
            "hora": "10:00",
            "bairro": "Boa Viagem"
        }));
        let from_address = record(json!({
            "nome": "Bloco da Savassi",
            "data": "2026-02-15",
            "hora": "10:00",
            "local": "Rua Sergipe, 10, Boa Viagem"
        }));
        let a = event_from_record(&from_field, &resolver, 120).unwrap();
        let b = event_from_record(&from_address, &resolver, 120).unwrap();

        assert_eq!(a.neighborhood, "CENTRO");
        assert_eq!(b.neighborhood, "CENTRO");
        assert_eq!(a.start_point, b.start_point);
        assert_eq!(
            crate::events::curation::score(&a),
            crate::events::curation::score(&b)
        );
    }

    #[test]
    fn test_event_without_date_is_skipped() {
        let resolver = NeighborhoodResolver::new();
        let r = record(json!({ "nome": "Bloco", "hora": "10:00" }));
        assert!(event_from_record(&r, &resolver, 120).is_none());
    }

    #[test]
    fn test_entity_field_fallbacks() {
        let r = record(json!({
            "nome": "UPA Centro-Sul",
            "categoria": "upa",
            "tipo_logradouro": "RUA",
            "logradouro": "DOMINGOS VIEIRA",
            "numero": "488",
            "bairro": "Santa Efigênia",
            "lat": "-19,922",
            "lon": "-43.926"
        }));
        let entity = entity_from_record(&r, EntityKind::Hospital);

        assert_eq!(entity.category, "UPA");
        assert_eq!(entity.location, Some(GeoPoint::new(-19.922, -43.926)));
        assert_eq!(entity.address.formatted().as_deref(), Some("RUA DOMINGOS VIEIRA, 488"));
        assert_eq!(entity.address.neighborhood.as_deref(), Some("SANTA EFIGENIA"));
    }

    #[test]
    fn test_zero_coordinates_become_absent() {
        let r = record(json!({ "endereco": "Praça Sete", "latitude": 0, "longitude": 0, "quantidade": 6 }));
        let entity = entity_from_record(&r, EntityKind::Restroom);
        assert_eq!(entity.location, None);
        assert_eq!(entity.capacity, Some(6));
        assert_eq!(entity.category, "BANHEIRO");
        assert_eq!(entity.name, "Praça Sete, S/N");
    }

    #[test]
    fn test_kind_for_code() {
        assert_eq!(kind_for_code("saúde"), EntityKind::Hospital);
        assert_eq!(kind_for_code("BANHEIRO"), EntityKind::Restroom);
        assert_eq!(kind_for_code("metro"), EntityKind::TransitStation);
        assert_eq!(kind_for_code("POLICIA"), EntityKind::Infrastructure);
    }

    #[test]
    fn test_read_records_accepts_wrapped_cache() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blocos.json");
        std::fs::write(&path, r#"{"timestamp": 1, "dados": [{"nome": "A"}, 3]}"#).unwrap();
        let records = read_records(&path).unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_broken_files_yield_empty_datasets() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("banheiros.json"), "not json").unwrap();
        let config = Config {
            data_dir: dir.path().to_path_buf(),
            ..Config::default()
        };
        let provider = JsonFileProvider::new(&config);

        assert!(provider.restrooms().is_empty());
        assert!(provider.hospitals().is_empty());
        assert!(provider.events(&NeighborhoodResolver::new()).is_empty());
        // No infrastructure file: the built-in list is used.
        assert!(!provider.infrastructure().is_empty());
    }
}
