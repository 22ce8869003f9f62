//! The two workflows behind the inbound events.

use std::sync::Arc;

use freightline_common::{
    DeliveryStarted, DriverMoved, FreightCalculated, RouteCreated, RouteError,
};
use futures::StreamExt;
use tracing::{debug, info};

use crate::channel::RendezvousSender;
use crate::simulator::MovementSimulator;
use crate::traits::{FreightCalculator, Pacer, RouteStore};

pub(crate) const FREIGHT_CHANNEL: &str = "freight";
pub(crate) const MOVEMENT_CHANNEL: &str = "movement";

/// Price and store a new route, returning the event to publish.
///
/// Pricing runs before the store write, so a route that cannot be priced is
/// never stored.
pub async fn create_route(
    event: &RouteCreated,
    store: &dyn RouteStore,
    calculator: &dyn FreightCalculator,
) -> Result<FreightCalculated, RouteError> {
    let route = event.to_route();
    let price = calculator.calculate(&route)?;
    let created = store.create_route(route.with_freight_price(price)).await?;

    info!(
        route_id = %created.id,
        distance = created.distance,
        waypoints = created.directions.len(),
        freight_price = created.freight_price,
        "Route created"
    );

    Ok(FreightCalculated::for_route(&created))
}

/// Walk the driver along a stored route, writing each position to
/// `movement` and pausing after each write.
///
/// Lookup failure returns before anything is written. Returns the number of
/// positions delivered.
pub async fn run_delivery(
    event: &DeliveryStarted,
    store: &dyn RouteStore,
    pacer: Arc<dyn Pacer>,
    movement: &RendezvousSender<DriverMoved>,
) -> Result<usize, RouteError> {
    let route = store.get_route(&event.route_id).await?;
    let route_id = route.id.clone();
    info!(route_id = %route_id, waypoints = route.directions.len(), "Delivery started");

    let positions = MovementSimulator::new(route, pacer).positions();
    futures::pin_mut!(positions);

    let mut delivered = 0;
    while let Some(moved) = positions.next().await {
        debug!(route_id = %moved.route_id, lat = moved.lat, lng = moved.lng, "Driver moved");
        movement
            .send(moved)
            .await
            .map_err(|_| RouteError::OutputClosed {
                channel: MOVEMENT_CHANNEL,
            })?;
        delivered += 1;
    }

    info!(route_id = %route_id, delivered, "Delivery completed");
    Ok(delivered)
}
