//! Turns a route into a paced stream of driver positions.

use std::sync::Arc;

use async_stream::stream;
use freightline_common::{DriverMoved, Route, Waypoint};
use futures::Stream;

use crate::traits::Pacer;

/// Steps a driver through a route's waypoints, in path order, once each.
pub struct MovementSimulator {
    route_id: String,
    directions: Vec<Waypoint>,
    pacer: Arc<dyn Pacer>,
}

impl MovementSimulator {
    pub fn new(route: Route, pacer: Arc<dyn Pacer>) -> Self {
        Self {
            route_id: route.id,
            directions: route.directions,
            pacer,
        }
    }

    pub fn len(&self) -> usize {
        self.directions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.directions.is_empty()
    }

    /// Lazily yield one `DriverMoved` per waypoint.
    ///
    /// The pause runs when the next item is polled, so a caller that writes
    /// each position before polling again gets write-then-pause per waypoint,
    /// including a final pause after the last one.
    pub fn positions(self) -> impl Stream<Item = DriverMoved> + Send {
        let Self {
            route_id,
            directions,
            pacer,
        } = self;

        stream! {
            for waypoint in directions {
                yield DriverMoved::at(route_id.clone(), waypoint);
                pacer.pause().await;
            }
        }
    }
}
