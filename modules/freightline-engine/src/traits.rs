//! Seams between the hub and its collaborators.

use anyhow::Result;
use async_trait::async_trait;
use freightline_common::{Event, Route, RouteError};

/// Holds routes. Implementations must be safe for concurrent use; the hub
/// calls them from many tasks without any locking of its own.
#[async_trait]
pub trait RouteStore: Send + Sync {
    /// Persist a new route. Must fail with `RouteError::Conflict` when the id
    /// is already taken, and must leave nothing behind on failure.
    async fn create_route(&self, route: Route) -> Result<Route, RouteError>;

    /// Fetch a route. Must fail with `RouteError::NotFound` for unknown ids.
    async fn get_route(&self, route_id: &str) -> Result<Route, RouteError>;
}

/// Prices a route. A pure function of the route's attributes.
pub trait FreightCalculator: Send + Sync {
    fn calculate(&self, route: &Route) -> Result<f64, RouteError>;
}

/// Suspends a delivery between two driver positions.
#[async_trait]
pub trait Pacer: Send + Sync {
    async fn pause(&self);
}

/// Receives every event the consumer loop drains.
///
/// An error here is logged by the consumer and the loop keeps going: a sink
/// that stops the loop would leave hub writers blocked.
#[async_trait]
pub trait EventSink: Send {
    async fn accept(&mut self, event: Event) -> Result<()>;
}
