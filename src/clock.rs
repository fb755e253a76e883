use chrono::{DateTime, FixedOffset, Utc};

/// Source of the current instant, always expressed in the reference zone.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<FixedOffset>;
}

/// Wall clock pinned to one offset.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    zone: FixedOffset,
}

impl SystemClock {
    pub fn new(zone: FixedOffset) -> Self {
        Self { zone }
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<FixedOffset> {
        Utc::now().with_timezone(&self.zone)
    }
}

/// A clock that always reads the same instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<FixedOffset>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<FixedOffset> {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_clock_reports_reference_offset() {
        let zone = FixedOffset::west_opt(3 * 3_600).unwrap();
        let now = SystemClock::new(zone).now();
        assert_eq!(now.offset().local_minus_utc(), -3 * 3_600);
    }

    #[test]
    fn test_fixed_clock_is_stable() {
        let instant = DateTime::parse_from_rfc3339("2026-02-14T14:00:00-03:00").unwrap();
        let clock = FixedClock(instant);
        assert_eq!(clock.now(), clock.now());
        assert_eq!(clock.now(), instant);
    }
}
