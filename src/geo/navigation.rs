use crate::models::{GeoPoint, NavigationLinks};

/// Google Maps search link centered on `point`.
pub fn map_link(point: GeoPoint) -> String {
    format!(
        "https://www.google.com/maps/search/?api=1&query={:.6},{:.6}",
        point.latitude, point.longitude
    )
}

/// Map, turn-by-turn (Waze) and rideshare (Uber) deep links to `point`.
/// `label` becomes the rideshare drop-off nickname.
pub fn navigation_links(point: GeoPoint, label: &str) -> NavigationLinks {
    let lat = point.latitude;
    let lng = point.longitude;
    NavigationLinks {
        map_url: map_link(point),
        turn_by_turn_url: format!("https://waze.com/ul?ll={lat:.6},{lng:.6}&navigate=yes"),
        rideshare_url: format!(
            "https://m.uber.com/ul/?action=setPickup&pickup=my_location\
             &dropoff[latitude]={lat:.6}&dropoff[longitude]={lng:.6}&dropoff[nickname]={}",
            urlencoding::encode(label)
        ),
    }
}
