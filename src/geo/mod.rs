//! Geospatial building blocks: distance, neighborhood lookup, proximity
//! ranking and navigation links.

pub mod distance;
pub mod navigation;
pub mod neighborhood;
pub mod ranking;

use crate::models::{GeoPoint, LocatedEntity};

/// Anything that can be placed on the map and ranked by distance.
pub trait Locatable {
    /// `None` (or an unknown point) ranks as infinitely far away.
    fn location(&self) -> Option<GeoPoint>;
}

impl<T: Locatable + ?Sized> Locatable for &T {
    fn location(&self) -> Option<GeoPoint> {
        (**self).location()
    }
}

impl Locatable for LocatedEntity {
    fn location(&self) -> Option<GeoPoint> {
        self.location
    }
}
