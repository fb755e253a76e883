//! Dataset loading and the in-memory snapshot every query reads from.

pub mod builtin;
pub mod geocode;
pub mod json;

use arc_swap::ArcSwap;
use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::geo::neighborhood::NeighborhoodResolver;
use crate::models::{EntityKind, Event, LocatedEntity};

/// Supplies the raw datasets. Implementations never fail: a source that
/// cannot be read yields an empty vector so queries degrade to "no matches".
pub trait DatasetProvider: Send + Sync {
    /// Events with canonical coordinates. `resolver` places events whose
    /// record has no coordinates of its own.
    fn events(&self, resolver: &NeighborhoodResolver) -> Vec<Event>;
    fn restrooms(&self) -> Vec<LocatedEntity>;
    fn hospitals(&self) -> Vec<LocatedEntity>;
    /// Mixed points (police, metro, landmark restrooms and hospitals).
    fn infrastructure(&self) -> Vec<LocatedEntity>;
}

/// One consistent, read-only view of every dataset.
#[derive(Debug, Clone)]
pub struct Snapshot {
    /// Chronological (date, start time, then source order).
    pub events: Vec<Event>,
    pub restrooms: Vec<LocatedEntity>,
    pub hospitals: Vec<LocatedEntity>,
    /// Points that are neither restrooms nor hospitals.
    pub infrastructure: Vec<LocatedEntity>,
    pub loaded_at: DateTime<Utc>,
}

impl Snapshot {
    pub fn empty() -> Self {
        Self {
            events: Vec::new(),
            restrooms: Vec::new(),
            hospitals: Vec::new(),
            infrastructure: Vec::new(),
            loaded_at: Utc::now(),
        }
    }

    /// Pull every dataset from `provider`. Infrastructure restrooms and
    /// hospitals join their own lists so event cards can rank them too.
    pub fn load(provider: &dyn DatasetProvider, resolver: &NeighborhoodResolver) -> Self {
        let mut restrooms = provider.restrooms();
        let mut hospitals = provider.hospitals();
        let mut infrastructure = Vec::new();

        for entity in provider.infrastructure() {
            match entity.kind {
                EntityKind::Restroom => restrooms.push(entity),
                EntityKind::Hospital => hospitals.push(entity),
                EntityKind::TransitStation | EntityKind::Infrastructure => infrastructure.push(entity),
            }
        }

        let mut events = provider.events(resolver);
        events.sort_by_key(|e| (e.scheduled_date, e.scheduled_start_time));

        tracing::info!(
            events = events.len(),
            restrooms = restrooms.len(),
            hospitals = hospitals.len(),
            infrastructure = infrastructure.len(),
            "Dataset snapshot loaded"
        );

        Self {
            events,
            restrooms,
            hospitals,
            infrastructure,
            loaded_at: Utc::now(),
        }
    }

    /// Every amenity and infrastructure point.
    pub fn services(&self) -> impl Iterator<Item = &LocatedEntity> {
        self.infrastructure
            .iter()
            .chain(self.restrooms.iter())
            .chain(self.hospitals.iter())
    }
}

/// Holds the current snapshot. Replacing it is a single pointer swap, so a
/// reader sees either the old or the new datasets in full.
pub struct SnapshotStore {
    inner: ArcSwap<Snapshot>,
}

impl SnapshotStore {
    pub fn new(initial: Snapshot) -> Self {
        Self {
            inner: ArcSwap::new(Arc::new(initial)),
        }
    }

    /// Owned handle on the current snapshot; stays valid across swaps.
    pub fn current(&self) -> Arc<Snapshot> {
        self.inner.load_full()
    }

    pub fn replace(&self, snapshot: Snapshot) {
        self.inner.store(Arc::new(snapshot));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Address, GeoPoint};
    use chrono::{NaiveDate, NaiveTime};

    fn point(kind: EntityKind, name: &str) -> LocatedEntity {
        LocatedEntity {
            name: name.to_string(),
            kind,
            category: kind.code().to_string(),
            address: Address::default(),
            location: Some(GeoPoint::new(-19.92, -43.93)),
            capacity: None,
            available_from: None,
            available_until: None,
        }
    }

    fn event(id: &str, day: u32, hour: u32) -> Event {
        Event {
            id: id.to_string(),
            name: id.to_string(),
            scheduled_date: NaiveDate::from_ymd_opt(2026, 2, day).unwrap(),
            scheduled_start_time: NaiveTime::from_hms_opt(hour, 0, 0).unwrap(),
            start_point: GeoPoint::new(-19.92, -43.93),
            end_point: None,
            neighborhood: "CENTRO".to_string(),
            street: String::new(),
            duration_minutes: 120,
        }
    }

    struct StaticProvider;

    impl DatasetProvider for StaticProvider {
        fn events(&self, _resolver: &NeighborhoodResolver) -> Vec<Event> {
            vec![event("late", 15, 9), event("early", 14, 16), event("morning", 14, 8)]
        }

        fn restrooms(&self) -> Vec<LocatedEntity> {
            vec![point(EntityKind::Restroom, "Praça")]
        }

        fn hospitals(&self) -> Vec<LocatedEntity> {
            Vec::new()
        }

        fn infrastructure(&self) -> Vec<LocatedEntity> {
            vec![
                point(EntityKind::Hospital, "UPA"),
                point(EntityKind::Restroom, "Shopping"),
                point(EntityKind::TransitStation, "Estação Central"),
            ]
        }
    }

    #[test]
    fn test_load_splits_infrastructure_by_kind() {
        let snapshot = Snapshot::load(&StaticProvider, &NeighborhoodResolver::new());
        let restrooms: Vec<&str> = snapshot.restrooms.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(restrooms, vec!["Praça", "Shopping"]);
        assert_eq!(snapshot.hospitals.len(), 1);
        assert_eq!(snapshot.infrastructure.len(), 1);
        assert_eq!(snapshot.services().count(), 4);
    }

    #[test]
    fn test_load_orders_events_chronologically() {
        let snapshot = Snapshot::load(&StaticProvider, &NeighborhoodResolver::new());
        let ids: Vec<&str> = snapshot.events.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["morning", "early", "late"]);
    }

    #[test]
    fn test_store_swap_keeps_old_handles_intact() {
        let store = SnapshotStore::new(Snapshot::empty());
        let before = store.current();
        store.replace(Snapshot::load(&StaticProvider, &NeighborhoodResolver::new()));
        let after = store.current();

        assert!(before.events.is_empty());
        assert_eq!(after.events.len(), 3);
    }
}
