// Test doubles for the hub's collaborators.
//
// - ImmediatePacer (Pacer): counts pauses, never sleeps
// - CollectingSink (EventSink): keeps every event with its arrival time
// - FlakySink (EventSink): rejects the first N events
// - FailingCalculator (FreightCalculator): always a calculation error
// - FailingStore (RouteStore): always a store error
//
// Plus fixtures for the three-waypoint route used throughout the tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use anyhow::{bail, Result};
use async_trait::async_trait;
use freightline_common::{
    DriverMoved, Event, FreightCalculated, Route, RouteCreated, RouteError, Waypoint,
};

use crate::traits::{EventSink, FreightCalculator, Pacer, RouteStore};

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Waypoints (1,1), (2,2), (3,3).
pub fn sample_directions() -> Vec<Waypoint> {
    vec![
        Waypoint::new(1.0, 1.0),
        Waypoint::new(2.0, 2.0),
        Waypoint::new(3.0, 3.0),
    ]
}

/// A 100 km route over [`sample_directions`].
pub fn sample_route_created(route_id: &str) -> RouteCreated {
    RouteCreated {
        route_id: route_id.to_string(),
        distance: 100,
        directions: sample_directions(),
    }
}

// ---------------------------------------------------------------------------
// ImmediatePacer
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct ImmediatePacer {
    pauses: AtomicUsize,
}

impl ImmediatePacer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pauses(&self) -> usize {
        self.pauses.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Pacer for ImmediatePacer {
    async fn pause(&self) {
        self.pauses.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;
    }
}

// ---------------------------------------------------------------------------
// Sinks
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct CollectingSink {
    pub events: Vec<Event>,
    pub arrivals: Vec<Instant>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn freight(&self) -> Vec<&FreightCalculated> {
        self.events
            .iter()
            .filter_map(|e| match e {
                Event::FreightCalculated(f) => Some(f),
                _ => None,
            })
            .collect()
    }

    pub fn moves(&self) -> Vec<&DriverMoved> {
        self.events
            .iter()
            .filter_map(|e| match e {
                Event::DriverMoved(m) => Some(m),
                _ => None,
            })
            .collect()
    }

    /// Arrival times of the `DriverMoved` events for one route, in order.
    pub fn move_arrivals(&self, route_id: &str) -> Vec<Instant> {
        self.events
            .iter()
            .zip(&self.arrivals)
            .filter_map(|(e, at)| match e {
                Event::DriverMoved(m) if m.route_id == route_id => Some(*at),
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl EventSink for CollectingSink {
    async fn accept(&mut self, event: Event) -> Result<()> {
        self.arrivals.push(Instant::now());
        self.events.push(event);
        Ok(())
    }
}

/// Rejects the first `failures` events, then collects the rest.
#[derive(Debug)]
pub struct FlakySink {
    failures: usize,
    pub accepted: Vec<Event>,
}

impl FlakySink {
    pub fn new(failures: usize) -> Self {
        Self {
            failures,
            accepted: Vec::new(),
        }
    }
}

#[async_trait]
impl EventSink for FlakySink {
    async fn accept(&mut self, event: Event) -> Result<()> {
        if self.failures > 0 {
            self.failures -= 1;
            bail!("FlakySink: rejecting {}", event.name());
        }
        self.accepted.push(event);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Failing adapters
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct FailingCalculator {
    reason: String,
}

impl FailingCalculator {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl FreightCalculator for FailingCalculator {
    fn calculate(&self, route: &Route) -> Result<f64, RouteError> {
        Err(RouteError::Calculation {
            route_id: route.id.clone(),
            reason: self.reason.clone(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct FailingStore {
    message: String,
}

impl FailingStore {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[async_trait]
impl RouteStore for FailingStore {
    async fn create_route(&self, _route: Route) -> Result<Route, RouteError> {
        Err(RouteError::Store(self.message.clone()))
    }

    async fn get_route(&self, _route_id: &str) -> Result<Route, RouteError> {
        Err(RouteError::Store(self.message.clone()))
    }
}
