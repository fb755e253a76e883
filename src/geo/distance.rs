use crate::models::GeoPoint;

pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Returned when either side of a measurement has no usable coordinate.
/// Callers must treat it as "infinitely far", never as a real distance.
pub const SENTINEL_DISTANCE_KM: f64 = 9999.0;

/// Great-circle distance in kilometers, or [`SENTINEL_DISTANCE_KM`] when
/// either point is unknown.
pub fn distance_km(a: GeoPoint, b: GeoPoint) -> f64 {
    measure_km(a, b).unwrap_or(SENTINEL_DISTANCE_KM)
}

/// Haversine distance, `None` when either point is unknown.
pub fn measure_km(a: GeoPoint, b: GeoPoint) -> Option<f64> {
    if !a.is_known() || !b.is_known() {
        return None;
    }

    let dlat = (b.latitude - a.latitude).to_radians();
    let dlng = (b.longitude - a.longitude).to_radians();

    let h = (dlat / 2.0).sin().powi(2)
        + a.latitude.to_radians().cos() * b.latitude.to_radians().cos() * (dlng / 2.0).sin().powi(2);

    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    Some(EARTH_RADIUS_KM * c)
}

/// Round to two decimals for display.
pub fn round_km(km: f64) -> f64 {
    (km * 100.0).round() / 100.0
}
