//! Domain events flowing through the hub.
//!
//! Two variants are inbound triggers (`RouteCreated`, `DeliveryStarted`), two
//! are produced by the workflows (`FreightCalculated`, `DriverMoved`). Events
//! are plain values: built, dispatched, read once by the sink, dropped.
//!
//! On the wire the `event` tag carries the variant name and the rest of the
//! object is the payload.

use serde::{Deserialize, Serialize};

use crate::types::{Route, Waypoint};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event")]
pub enum Event {
    RouteCreated(RouteCreated),
    DeliveryStarted(DeliveryStarted),
    FreightCalculated(FreightCalculated),
    DriverMoved(DriverMoved),
}

impl Event {
    /// The event-name discriminator, identical to the serialized `event` tag.
    pub fn name(&self) -> &'static str {
        match self {
            Event::RouteCreated(_) => "RouteCreated",
            Event::DeliveryStarted(_) => "DeliveryStarted",
            Event::FreightCalculated(_) => "FreightCalculated",
            Event::DriverMoved(_) => "DriverMoved",
        }
    }

    pub fn route_id(&self) -> &str {
        match self {
            Event::RouteCreated(e) => &e.route_id,
            Event::DeliveryStarted(e) => &e.route_id,
            Event::FreightCalculated(e) => &e.route_id,
            Event::DriverMoved(e) => &e.route_id,
        }
    }

    /// Inbound events have a workflow behind them; outbound ones don't.
    pub fn is_inbound(&self) -> bool {
        matches!(self, Event::RouteCreated(_) | Event::DeliveryStarted(_))
    }

    pub fn route_created(
        route_id: impl Into<String>,
        distance: u64,
        directions: Vec<Waypoint>,
    ) -> Self {
        Event::RouteCreated(RouteCreated {
            route_id: route_id.into(),
            distance,
            directions,
        })
    }

    pub fn delivery_started(route_id: impl Into<String>) -> Self {
        Event::DeliveryStarted(DeliveryStarted {
            route_id: route_id.into(),
        })
    }

    /// Serialize to a single JSON line (no trailing newline).
    pub fn to_json_line(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_json_line(line: &str) -> serde_json::Result<Self> {
        serde_json::from_str(line)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteCreated {
    #[serde(rename = "id")]
    pub route_id: String,
    pub distance: u64,
    pub directions: Vec<Waypoint>,
}

impl RouteCreated {
    pub fn to_route(&self) -> Route {
        Route::new(self.route_id.clone(), self.distance, self.directions.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryStarted {
    pub route_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FreightCalculated {
    pub route_id: String,
    pub amount: f64,
}

impl FreightCalculated {
    pub fn for_route(route: &Route) -> Self {
        Self {
            route_id: route.id.clone(),
            amount: route.freight_price,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriverMoved {
    pub route_id: String,
    pub lat: f64,
    pub lng: f64,
}

impl DriverMoved {
    pub fn at(route_id: impl Into<String>, waypoint: Waypoint) -> Self {
        Self {
            route_id: route_id.into(),
            lat: waypoint.lat,
            lng: waypoint.lng,
        }
    }
}

impl From<FreightCalculated> for Event {
    fn from(e: FreightCalculated) -> Self {
        Event::FreightCalculated(e)
    }
}

impl From<DriverMoved> for Event {
    fn from(e: DriverMoved) -> Self {
        Event::DriverMoved(e)
    }
}
