//! Popularity and schedule metadata for blocos: highlight score, crowd
//! level, day period, weather hint, per-day highlights and quick stats.

use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, TimeDelta, Timelike};
use serde::Serialize;

use crate::geo::neighborhood::normalize_name;
use crate::models::{CrowdLevel, Curation, DayPeriod, Event, ScoredEvent, WeatherHint};

/// Blocos known to draw the largest crowds, matched by substring on the
/// normalized name.
const HIGHLIGHTS: &[&str] = &[
    "ENTAO BRILHA",
    "BAIANAS OZADAS",
    "QUANDO COME SE LAMBUZA",
    "VOLTA BELCHIOR",
    "JUVENTUDE BRONZEADA",
    "HAVAYANAS USADAS",
    "GAROTAS SOLTEIRAS",
    "CHAMA O SINDICO",
    "BEICO DO WANDO",
    "ANGOLA JANGA",
    "TRUCK DO DESEJO",
    "TCHANZINHO ZONA NORTE",
    "PENA DE PAVAO DE KRISHNA",
    "ALCOVA LIBERTINA",
    "BLOCO DA CALIXTO",
    "AJOMCOMISSO",
    "BARTUCADA",
    "ESTALADEIRA",
    "ME BEIJA QUE EU SOU PAGODEIRO",
    "LAGOINHA",
    "SEPULTURA",
    "FUNK YOU",
    "FILHOS DE TCHA TCHA",
    "ORDINARIOS",
    "MONOBLOCO",
    "BAIANEIRA",
    "CORTE DEVASSA",
    "MAGNOLIA",
    "LIXO DO LUXO",
];

const BUSY_NEIGHBORHOODS: &[&str] = &["SAVASSI", "CENTRO", "SANTA TEREZA"];

const HIGHLIGHT_BONUS: u32 = 100;
const BUSY_NEIGHBORHOOD_BONUS: u32 = 10;

const MORNING: WeatherHint = WeatherHint {
    temperature: "24°C",
    condition: "Ensolarado",
    rain_chance: "10%",
};
const AFTERNOON: WeatherHint = WeatherHint {
    temperature: "29°C",
    condition: "Calorão",
    rain_chance: "0%",
};
const LATE_AFTERNOON: WeatherHint = WeatherHint {
    temperature: "26°C",
    condition: "Chuva isolada",
    rain_chance: "60%",
};
const NIGHT: WeatherHint = WeatherHint {
    temperature: "23°C",
    condition: "Nublado",
    rain_chance: "20%",
};

/// "Happening now" looks one hour back and four hours ahead.
const NOW_LOOKBACK_MIN: i64 = 60;
const NOW_LOOKAHEAD_MIN: i64 = 240;

pub fn score(event: &Event) -> (u32, bool) {
    let name = normalize_name(&event.name);
    let highlight = HIGHLIGHTS.iter().any(|h| name.contains(h));

    let mut score = 0;
    if highlight {
        score += HIGHLIGHT_BONUS;
    }
    if BUSY_NEIGHBORHOODS.contains(&normalize_name(&event.neighborhood).as_str()) {
        score += BUSY_NEIGHBORHOOD_BONUS;
    }
    (score, highlight)
}

pub fn crowd_level(score: u32) -> CrowdLevel {
    match score {
        s if s >= 100 => CrowdLevel::Chaos,
        s if s >= 20 => CrowdLevel::Busy,
        _ => CrowdLevel::Calm,
    }
}

pub fn day_period(start: NaiveTime) -> DayPeriod {
    match start.hour() {
        h if h < 12 => DayPeriod::Morning,
        h if h < 18 => DayPeriod::Afternoon,
        _ => DayPeriod::Night,
    }
}

pub fn weather_hint(start: NaiveTime) -> WeatherHint {
    match start.hour() {
        5..=11 => MORNING,
        12..=15 => AFTERNOON,
        16..=18 => LATE_AFTERNOON,
        _ => NIGHT,
    }
}

pub fn assess(event: &Event) -> Curation {
    let (score, highlight) = score(event);
    Curation {
        score,
        highlight,
        crowd_level: crowd_level(score),
        period: day_period(event.scheduled_start_time),
        weather: weather_hint(event.scheduled_start_time),
    }
}

fn scored(event: &Event) -> ScoredEvent {
    ScoredEvent {
        event: event.clone(),
        curation: assess(event),
    }
}

/// Top three blocos by score for each period of one day.
#[derive(Debug, Clone, Serialize)]
pub struct DayHighlights {
    pub date: NaiveDate,
    pub morning: Vec<ScoredEvent>,
    pub afternoon: Vec<ScoredEvent>,
    pub night: Vec<ScoredEvent>,
}

pub fn curate(events: &[Event], date: NaiveDate) -> DayHighlights {
    let of_day: Vec<ScoredEvent> = events
        .iter()
        .filter(|e| e.scheduled_date == date)
        .map(scored)
        .collect();

    let top = |period: DayPeriod| {
        let mut picked: Vec<ScoredEvent> = of_day
            .iter()
            .filter(|e| e.curation.period == period)
            .cloned()
            .collect();
        picked.sort_by(|a, b| b.curation.score.cmp(&a.curation.score));
        picked.truncate(3);
        picked
    };

    DayHighlights {
        date,
        morning: top(DayPeriod::Morning),
        afternoon: top(DayPeriod::Afternoon),
        night: top(DayPeriod::Night),
    }
}

/// Blocos starting between one hour ago and four hours from now, earliest
/// first.
pub fn happening_now(events: &[Event], now: DateTime<FixedOffset>, tz: FixedOffset) -> Vec<ScoredEvent> {
    let mut window: Vec<(DateTime<FixedOffset>, &Event)> = events
        .iter()
        .map(|e| (e.starts_at(tz), e))
        .filter(|(start, _)| {
            let offset = *start - now;
            offset > TimeDelta::minutes(-NOW_LOOKBACK_MIN) && offset < TimeDelta::minutes(NOW_LOOKAHEAD_MIN)
        })
        .collect();
    window.sort_by_key(|(start, _)| *start);
    window.into_iter().map(|(_, e)| scored(e)).collect()
}

#[derive(Debug, Clone, Serialize)]
pub struct EventStats {
    pub total: usize,
    /// Up to five (neighborhood, count) pairs, busiest first.
    pub top_neighborhoods: Vec<(String, usize)>,
}

pub fn stats(events: &[Event]) -> EventStats {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for event in events {
        *counts.entry(event.neighborhood.as_str()).or_default() += 1;
    }

    let mut top: Vec<(String, usize)> = counts
        .into_iter()
        .map(|(name, count)| (name.to_string(), count))
        .collect();
    // Name as secondary key so equal counts come out in a stable order.
    top.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    top.truncate(5);

    EventStats {
        total: events.len(),
        top_neighborhoods: top,
    }
}

/// Distinct values for the listing filters.
#[derive(Debug, Clone, Serialize)]
pub struct FilterValues {
    pub neighborhoods: Vec<String>,
    pub dates: Vec<NaiveDate>,
}

pub fn filter_values(events: &[Event]) -> FilterValues {
    let neighborhoods: BTreeSet<&str> = events.iter().map(|e| e.neighborhood.as_str()).collect();
    let dates: BTreeSet<NaiveDate> = events.iter().map(|e| e.scheduled_date).collect();
    FilterValues {
        neighborhoods: neighborhoods.into_iter().map(str::to_string).collect(),
        dates: dates.into_iter().collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::GeoPoint;

    fn brt() -> FixedOffset {
        FixedOffset::west_opt(3 * 3600).unwrap()
    }

    fn bloco(id: &str, name: &str, neighborhood: &str, day: u32, hour: u32) -> Event {
        Event {
            id: id.to_string(),
            name: name.to_string(),
            scheduled_date: NaiveDate::from_ymd_opt(2026, 2, day).unwrap(),
            scheduled_start_time: NaiveTime::from_hms_opt(hour, 0, 0).unwrap(),
            start_point: GeoPoint::new(-19.9167, -43.9345),
            end_point: None,
            neighborhood: neighborhood.to_string(),
            street: String::new(),
            duration_minutes: 120,
        }
    }

    #[test]
    fn test_highlight_matches_without_accents() {
        let (points, highlight) = score(&bloco("1", "Então Brilha", "FLORESTA", 14, 10));
        assert!(highlight);
        assert_eq!(points, 100);
    }

    #[test]
    fn test_busy_neighborhood_bonus() {
        let (points, highlight) = score(&bloco("1", "Bloco Qualquer", "Savassi", 14, 10));
        assert!(!highlight);
        assert_eq!(points, 10);
        let (points, _) = score(&bloco("2", "Monobloco", "CENTRO", 14, 10));
        assert_eq!(points, 110);
    }

    #[test]
    fn test_crowd_levels() {
        assert_eq!(crowd_level(0), CrowdLevel::Calm);
        assert_eq!(crowd_level(10), CrowdLevel::Calm);
        assert_eq!(crowd_level(20), CrowdLevel::Busy);
        assert_eq!(crowd_level(110), CrowdLevel::Chaos);
    }

    #[test]
    fn test_day_period_boundaries() {
        let t = |h| NaiveTime::from_hms_opt(h, 0, 0).unwrap();
        assert_eq!(day_period(t(11)), DayPeriod::Morning);
        assert_eq!(day_period(t(12)), DayPeriod::Afternoon);
        assert_eq!(day_period(t(17)), DayPeriod::Afternoon);
        assert_eq!(day_period(t(18)), DayPeriod::Night);
    }

    #[test]
    fn test_weather_hint_by_hour() {
        let t = |h| NaiveTime::from_hms_opt(h, 0, 0).unwrap();
        assert_eq!(weather_hint(t(8)), MORNING);
        assert_eq!(weather_hint(t(14)), AFTERNOON);
        assert_eq!(weather_hint(t(17)), LATE_AFTERNOON);
        assert_eq!(weather_hint(t(21)), NIGHT);
        assert_eq!(weather_hint(t(3)), NIGHT);
    }

    #[test]
    fn test_curate_top_three_per_period() {
        let events = vec![
            bloco("1", "Bloco A", "PRADO", 14, 9),
            bloco("2", "Monobloco", "PRADO", 14, 10),
            bloco("3", "Bloco B", "CENTRO", 14, 8),
            bloco("4", "Bloco C", "PRADO", 14, 7),
            bloco("5", "Bloco D", "PRADO", 14, 6),
            bloco("6", "Sepultura", "PRADO", 14, 20),
            bloco("7", "Baianeira", "PRADO", 15, 10),
        ];
        let day = curate(&events, NaiveDate::from_ymd_opt(2026, 2, 14).unwrap());

        let morning: Vec<&str> = day.morning.iter().map(|e| e.event.id.as_str()).collect();
        assert_eq!(morning, vec!["2", "3", "1"]);
        assert!(day.afternoon.is_empty());
        assert_eq!(day.night.len(), 1);
        assert_eq!(day.night[0].event.id, "6");
    }

    #[test]
    fn test_happening_now_window() {
        let events = vec![
            bloco("later", "X", "PRADO", 14, 17),
            bloco("past", "X", "PRADO", 14, 11),
            bloco("starting", "X", "PRADO", 14, 14),
            bloco("hour-ago", "X", "PRADO", 14, 13),
            bloco("soon", "X", "PRADO", 14, 15),
            bloco("too-far", "X", "PRADO", 14, 19),
        ];
        let now = events[0].starts_at(brt()) - TimeDelta::hours(3); // 14:00
        let ids: Vec<String> = happening_now(&events, now, brt())
            .into_iter()
            .map(|e| e.event.id)
            .collect();
        assert_eq!(ids, vec!["starting", "soon", "later"]);
    }

    #[test]
    fn test_stats_top_neighborhoods() {
        let events = vec![
            bloco("1", "A", "CENTRO", 14, 10),
            bloco("2", "B", "SAVASSI", 14, 10),
            bloco("3", "C", "CENTRO", 14, 10),
            bloco("4", "D", "PRADO", 14, 10),
        ];
        let s = stats(&events);
        assert_eq!(s.total, 4);
        assert_eq!(s.top_neighborhoods[0], ("CENTRO".to_string(), 2));
        assert_eq!(s.top_neighborhoods[1], ("PRADO".to_string(), 1));
    }

    #[test]
    fn test_filter_values_are_distinct_and_sorted() {
        let events = vec![
            bloco("1", "A", "SAVASSI", 15, 10),
            bloco("2", "B", "CENTRO", 14, 10),
            bloco("3", "C", "SAVASSI", 14, 10),
        ];
        let values = filter_values(&events);
        assert_eq!(values.neighborhoods, vec!["CENTRO", "SAVASSI"]);
        assert_eq!(values.dates.len(), 2);
        assert!(values.dates[0] < values.dates[1]);
    }
}
