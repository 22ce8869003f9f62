pub mod config;
pub mod error;
pub mod events;
pub mod types;

pub use config::{Config, FileConfig, FreightConfig, SimulationConfig};
pub use error::RouteError;
pub use events::{DeliveryStarted, DriverMoved, Event, FreightCalculated, RouteCreated};
pub use types::{Route, Waypoint};
