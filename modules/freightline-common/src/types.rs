use serde::{Deserialize, Serialize};

/// A single geographic point along a route's path.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub lat: f64,
    pub lng: f64,
}

impl Waypoint {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

impl From<(f64, f64)> for Waypoint {
    fn from((lat, lng): (f64, f64)) -> Self {
        Self { lat, lng }
    }
}

/// A delivery route as held by the route store.
///
/// `directions` is in delivery path order. `freight_price` is fixed when the
/// route is created and never recomputed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub id: String,
    pub distance: u64,
    pub directions: Vec<Waypoint>,
    pub freight_price: f64,
}

impl Route {
    /// Build an unpriced route. The price is attached with [`Route::with_freight_price`]
    /// before the route reaches the store.
    pub fn new(id: impl Into<String>, distance: u64, directions: Vec<Waypoint>) -> Self {
        Self {
            id: id.into(),
            distance,
            directions,
            freight_price: 0.0,
        }
    }

    pub fn with_freight_price(mut self, price: f64) -> Self {
        self.freight_price = price;
        self
    }
}
