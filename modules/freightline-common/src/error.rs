use thiserror::Error;

/// Failures a single dispatch can end in. Each one is terminal for the
/// workflow that hit it and leaves other in-flight dispatches untouched.
#[derive(Error, Debug)]
pub enum RouteError {
    #[error("route not found: {route_id}")]
    NotFound { route_id: String },

    #[error("route already exists: {route_id}")]
    Conflict { route_id: String },

    #[error("route store error: {0}")]
    Store(String),

    #[error("cannot price route {route_id}: {reason}")]
    Calculation { route_id: String, reason: String },

    #[error("{channel} output channel closed")]
    OutputClosed { channel: &'static str },
}

impl RouteError {
    pub fn not_found(route_id: impl Into<String>) -> Self {
        Self::NotFound {
            route_id: route_id.into(),
        }
    }

    pub fn conflict(route_id: impl Into<String>) -> Self {
        Self::Conflict {
            route_id: route_id.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
