use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use freightline_common::{Route, RouteError};

use crate::traits::RouteStore;

/// In-memory route store. Thread-safe; duplicate ids are rejected.
#[derive(Debug, Default)]
pub struct MemoryRouteStore {
    routes: RwLock<HashMap<String, Route>>,
}

impl MemoryRouteStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.routes.read().map(|routes| routes.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, route_id: &str) -> bool {
        self.routes
            .read()
            .map(|routes| routes.contains_key(route_id))
            .unwrap_or(false)
    }
}

fn poisoned() -> RouteError {
    RouteError::Store("route table lock poisoned".to_string())
}

#[async_trait]
impl RouteStore for MemoryRouteStore {
    async fn create_route(&self, route: Route) -> Result<Route, RouteError> {
        let mut routes = self.routes.write().map_err(|_| poisoned())?;
        if routes.contains_key(&route.id) {
            return Err(RouteError::conflict(route.id));
        }
        routes.insert(route.id.clone(), route.clone());
        Ok(route)
    }

    async fn get_route(&self, route_id: &str) -> Result<Route, RouteError> {
        let routes = self.routes.read().map_err(|_| poisoned())?;
        routes
            .get(route_id)
            .cloned()
            .ok_or_else(|| RouteError::not_found(route_id))
    }
}
