use chrono::{DateTime, FixedOffset, TimeDelta};

use crate::models::{Event, EventRuntimeState, EventStatus, GeoPoint};

impl Event {
    /// Scheduled start as an instant in the reference zone `tz`.
    pub fn starts_at(&self, tz: FixedOffset) -> DateTime<FixedOffset> {
        let local = self.scheduled_date.and_time(self.scheduled_start_time);
        let utc = local - TimeDelta::seconds(i64::from(tz.local_minus_utc()));
        DateTime::from_naive_utc_and_offset(utc, tz)
    }

    /// Start plus the duration, never less than one minute.
    pub fn ends_at(&self, tz: FixedOffset) -> DateTime<FixedOffset> {
        self.starts_at(tz) + TimeDelta::minutes(i64::from(self.duration_minutes.max(1)))
    }

    /// Where the parade finishes; blocos without a route stay put.
    pub fn route_end(&self) -> GeoPoint {
        self.end_point
            .and_then(GeoPoint::known)
            .unwrap_or(self.start_point)
    }
}

/// Lifecycle status and position of `event` at `now`.
///
/// `NotStarted` before the start, `Finished` from the end instant on, and
/// `InProgress` in between with the position moving linearly from the start
/// point to the end point. Pure in `(event, now, tz)`.
pub fn compute_state(event: &Event, now: DateTime<FixedOffset>, tz: FixedOffset) -> EventRuntimeState {
    let start = event.starts_at(tz);
    let end = event.ends_at(tz);

    if now < start {
        return EventRuntimeState {
            status: EventStatus::NotStarted,
            current_point: event.start_point,
            minutes_remaining: None,
        };
    }

    if now >= end {
        return EventRuntimeState {
            status: EventStatus::Finished,
            current_point: event.route_end(),
            minutes_remaining: Some(0),
        };
    }

    let elapsed_min = (now - start).num_milliseconds() as f64 / 60_000.0;
    let duration_min = (end - start).num_milliseconds() as f64 / 60_000.0;
    let progress = elapsed_min / duration_min;
    EventRuntimeState {
        status: EventStatus::InProgress,
        current_point: interpolate(event.start_point, event.route_end(), progress),
        minutes_remaining: Some((duration_min - elapsed_min).floor() as i64),
    }
}

/// Componentwise linear interpolation, `progress` in `[0, 1]`.
pub fn interpolate(from: GeoPoint, to: GeoPoint, progress: f64) -> GeoPoint {
    GeoPoint::new(
        from.latitude + progress * (to.latitude - from.latitude),
        from.longitude + progress * (to.longitude - from.longitude),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};

    const START: GeoPoint = GeoPoint::new(-19.9167, -43.9345);
    const END: GeoPoint = GeoPoint::new(-19.9402, -43.9339);

    fn brt() -> FixedOffset {
        FixedOffset::west_opt(3 * 3600).unwrap()
    }

    fn parade() -> Event {
        Event {
            id: "1".to_string(),
            name: "ENTAO BRILHA".to_string(),
            scheduled_date: NaiveDate::from_ymd_opt(2026, 2, 14).unwrap(),
            scheduled_start_time: NaiveTime::from_hms_opt(14, 0, 0).unwrap(),
            start_point: START,
            end_point: Some(END),
            neighborhood: "CENTRO".to_string(),
            street: "AV. AFONSO PENA".to_string(),
            duration_minutes: 120,
        }
    }

    fn at(minutes_after_start: i64) -> DateTime<FixedOffset> {
        parade().starts_at(brt()) + TimeDelta::minutes(minutes_after_start)
    }

    #[test]
    fn test_start_is_pinned_to_reference_zone() {
        let start = parade().starts_at(brt());
        assert_eq!(start.to_rfc3339(), "2026-02-14T14:00:00-03:00");
        assert_eq!(start.naive_utc().to_string(), "2026-02-14 17:00:00");
    }

    #[test]
    fn test_end_instant_bounds_the_parade() {
        let event = parade();
        let end = event.ends_at(brt());
        assert_eq!(end.to_rfc3339(), "2026-02-14T16:00:00-03:00");
        assert_eq!(
            compute_state(&event, end - TimeDelta::milliseconds(1), brt()).status,
            EventStatus::InProgress
        );
        assert_eq!(compute_state(&event, end, brt()).status, EventStatus::Finished);

        let mut instant = parade();
        instant.duration_minutes = 0;
        assert_eq!(instant.ends_at(brt()), at(1));
        assert_eq!(compute_state(&instant, at(0), brt()).status, EventStatus::InProgress);
    }

    #[test]
    fn test_before_start_is_not_started() {
        let state = compute_state(&parade(), at(-1), brt());
        assert_eq!(state.status, EventStatus::NotStarted);
        assert_eq!(state.current_point, START);
        assert_eq!(state.minutes_remaining, None);
    }

    #[test]
    fn test_at_start_progress_is_zero() {
        let state = compute_state(&parade(), at(0), brt());
        assert_eq!(state.status, EventStatus::InProgress);
        assert_eq!(state.current_point, START);
        assert_eq!(state.minutes_remaining, Some(120));
    }

    #[test]
    fn test_halfway_is_midpoint() {
        let state = compute_state(&parade(), at(60), brt());
        assert_eq!(state.status, EventStatus::InProgress);
        assert_eq!(state.minutes_remaining, Some(60));
        assert!((state.current_point.latitude - (-19.92845)).abs() < 1e-9);
        assert!((state.current_point.longitude - (-43.9342)).abs() < 1e-9);
    }

    #[test]
    fn test_remaining_minutes_floor() {
        let now = at(0) + TimeDelta::seconds(90);
        let state = compute_state(&parade(), now, brt());
        assert_eq!(state.minutes_remaining, Some(118));
    }

    #[test]
    fn test_at_end_is_finished() {
        let state = compute_state(&parade(), at(120), brt());
        assert_eq!(state.status, EventStatus::Finished);
        assert_eq!(state.current_point, END);
        assert_eq!(state.minutes_remaining, Some(0));
    }

    #[test]
    fn test_after_end_is_finished() {
        let state = compute_state(&parade(), at(600), brt());
        assert_eq!(state.status, EventStatus::Finished);
        assert_eq!(state.current_point, END);
    }

    #[test]
    fn test_status_never_goes_backwards() {
        let event = parade();
        let mut last = EventStatus::NotStarted;
        for minute in (-90..=240).step_by(7) {
            let status = compute_state(&event, at(minute), brt()).status;
            assert!(status >= last, "status regressed at minute {minute}");
            last = status;
        }
        assert_eq!(last, EventStatus::Finished);
    }

    #[test]
    fn test_same_instant_is_bit_identical() {
        let event = parade();
        let now = at(37) + TimeDelta::milliseconds(123);
        let a = compute_state(&event, now, brt());
        let b = compute_state(&event, now, brt());
        assert_eq!(a.current_point.latitude.to_bits(), b.current_point.latitude.to_bits());
        assert_eq!(a.current_point.longitude.to_bits(), b.current_point.longitude.to_bits());
        assert_eq!(a, b);
    }

    #[test]
    fn test_same_instant_in_another_zone_gives_same_state() {
        let event = parade();
        let now_brt = at(30);
        let now_utc = now_brt.with_timezone(&FixedOffset::east_opt(0).unwrap());
        assert_eq!(
            compute_state(&event, now_brt, brt()),
            compute_state(&event, now_utc, brt())
        );
    }

    #[test]
    fn test_missing_end_point_stays_at_start() {
        let mut event = parade();
        event.end_point = None;
        let state = compute_state(&event, at(60), brt());
        assert_eq!(state.current_point, START);

        event.end_point = Some(GeoPoint::new(0.0, 0.0));
        let state = compute_state(&event, at(200), brt());
        assert_eq!(state.current_point, START);
    }
}
