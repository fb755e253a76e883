//! Neighborhood name resolution for Belo Horizonte.
//!
//! Free-text neighborhood names are folded to a canonical form (upper case,
//! no diacritics, single spaces), mapped through a table of known variants,
//! then matched against a hand-curated gazetteer by substring containment in
//! either direction. The gazetteer is scanned in declaration order and the
//! first hit wins, so a compound name containing two keys (for example
//! "SERRA SAO PEDRO") resolves to whichever key is listed first.

use std::collections::BTreeSet;

use parking_lot::Mutex;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use crate::models::GeoPoint;

/// Fallback for names the gazetteer does not know.
pub const CITY_CENTER: GeoPoint = GeoPoint::new(-19.9167, -43.9345);

/// Canonical neighborhood → reference point. Order is the tie-break.
pub const GAZETTEER: &[(&str, GeoPoint)] = &[
    ("CENTRO", GeoPoint::new(-19.9167, -43.9345)),
    ("SAVASSI", GeoPoint::new(-19.9402, -43.9339)),
    ("LOURDES", GeoPoint::new(-19.9295, -43.9458)),
    ("FUNCIONARIOS", GeoPoint::new(-19.9365, -43.9317)),
    ("SANTA TEREZA", GeoPoint::new(-19.9158, -43.9163)),
    ("FLORESTA", GeoPoint::new(-19.9119, -43.9288)),
    ("PAMPULHA", GeoPoint::new(-19.8637, -43.966)),
    ("SANTA EFIGENIA", GeoPoint::new(-19.9228, -43.9221)),
    ("BARRO PRETO", GeoPoint::new(-19.9213, -43.9515)),
    ("ANCHIETA", GeoPoint::new(-19.9537, -43.9248)),
    ("SION", GeoPoint::new(-19.9525, -43.9358)),
    ("MANGABEIRAS", GeoPoint::new(-19.9547, -43.9189)),
    ("PRADO", GeoPoint::new(-19.9248, -43.9678)),
    ("SERRA", GeoPoint::new(-19.9442, -43.9187)),
    ("SAO PEDRO", GeoPoint::new(-19.9456, -43.9389)),
    ("LAGOINHA", GeoPoint::new(-19.9077, -43.9472)),
    ("CARLOS PRATES", GeoPoint::new(-19.9135, -43.9605)),
    ("SAGRADA FAMILIA", GeoPoint::new(-19.9085, -43.9165)),
    ("CONCORDIA", GeoPoint::new(-19.8972, -43.9335)),
    ("CIDADE NOVA", GeoPoint::new(-19.8953, -43.9231)),
    ("CAICARA", GeoPoint::new(-19.9032, -43.9785)),
    ("PADRE EUSTAQUIO", GeoPoint::new(-19.9168, -43.9876)),
    ("GUTIERREZ", GeoPoint::new(-19.9372, -43.9645)),
    ("SANTO ANTONIO", GeoPoint::new(-19.9423, -43.9478)),
    ("BURITIS", GeoPoint::new(-19.9725, -43.9658)),
    ("CASTELO", GeoPoint::new(-19.8825, -44.0042)),
    ("OURO PRETO", GeoPoint::new(-19.8785, -43.9825)),
    ("JARAGUA", GeoPoint::new(-19.8652, -43.9525)),
    ("PLANALTO", GeoPoint::new(-19.8325, -43.9585)),
    ("VENDA NOVA", GeoPoint::new(-19.8085, -43.9525)),
    ("BARREIRO", GeoPoint::new(-19.9752, -44.0258)),
    ("SALGADO FILHO", GeoPoint::new(-19.9325, -43.9925)),
    ("NOVA SUISSA", GeoPoint::new(-19.9358, -43.9821)),
];

/// Observed spelling → canonical name. Applied once, not transitively.
pub const ALIASES: &[(&str, &str)] = &[
    ("ALTO CAICARAS", "CAICARA"),
    ("CAICARAS", "CAICARA"),
    ("CAICARA ADELAIDE", "CAICARA"),
    ("NOVO GLORIA", "GLORIA"),
    ("PEDREIRA PRADO LOPES", "LAGOINHA"),
    ("CONJUNTO CALIFORNIA I", "CALIFORNIA"),
    ("CALIFORNIA", "CALAFATE"),
    ("COLEGIO BATISTA", "FLORESTA"),
    ("BOA VIAGEM", "CENTRO"),
    ("SANTO AGOSTINHO", "CENTRO"),
    ("UNIVERSITARIO", "CIDADE NOVA"),
    ("SAO LUIZ", "PAMPULHA"),
    ("BANDEIRANTES", "PAMPULHA"),
];

/// Upper-case, strip diacritics and collapse whitespace, `-` and `_` runs
/// into a single space.
pub fn normalize_name(raw: &str) -> String {
    let folded: String = raw
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_uppercase();

    folded
        .split(|c: char| c.is_whitespace() || c == '-' || c == '_')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Normalized name with the alias table applied.
pub fn canonical_name(raw: &str) -> String {
    let normalized = normalize_name(raw);
    match ALIASES.iter().find(|(alias, _)| *alias == normalized) {
        Some((_, canonical)) => (*canonical).to_string(),
        None => normalized,
    }
}

/// Last comma-separated part of a free-text address, which is where the
/// city portal puts the neighborhood, aliased like a `bairro` field.
/// "CENTRO" when there is no such part.
pub fn neighborhood_from_address(address: &str) -> String {
    let parts: Vec<&str> = address
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect();
    match parts.as_slice() {
        [.., last] if parts.len() >= 2 => canonical_name(last),
        _ => "CENTRO".to_string(),
    }
}

fn match_gazetteer(name: &str) -> Option<&'static (&'static str, GeoPoint)> {
    if name.is_empty() {
        return None;
    }
    GAZETTEER
        .iter()
        .find(|(key, _)| name.contains(key) || key.contains(name))
}

/// Outcome of a neighborhood lookup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resolution {
    /// Gazetteer key that matched, `None` for the city-center fallback.
    pub matched: Option<&'static str>,
    pub point: GeoPoint,
}

/// Resolves neighborhood names and remembers the ones it could not place.
#[derive(Debug, Default)]
pub struct NeighborhoodResolver {
    unmatched: Mutex<BTreeSet<String>>,
}

impl NeighborhoodResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reference point for `raw`. Never fails; unknown names get the city
    /// center.
    pub fn resolve(&self, raw: &str) -> GeoPoint {
        self.lookup(raw).point
    }

    pub fn lookup(&self, raw: &str) -> Resolution {
        let canonical = canonical_name(raw);

        if let Some((key, point)) = match_gazetteer(&canonical) {
            return Resolution {
                matched: Some(*key),
                point: *point,
            };
        }

        let normalized = normalize_name(raw);
        if !normalized.is_empty() {
            self.record_unmatched(normalized);
        }
        Resolution {
            matched: None,
            point: CITY_CENTER,
        }
    }

    fn record_unmatched(&self, name: String) {
        let mut unmatched = self.unmatched.lock();
        if unmatched.contains(&name) {
            return;
        }
        tracing::warn!(neighborhood = %name, "Neighborhood not in gazetteer, using city center");
        unmatched.insert(name);
    }

    /// Names that fell back to the city center, sorted.
    pub fn unmatched(&self) -> Vec<String> {
        self.unmatched.lock().iter().cloned().collect()
    }
}
