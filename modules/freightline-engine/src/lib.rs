//! Event dispatch and delivery simulation.
//!
//! The [`EventHub`] matches each inbound event to its workflow and hands the
//! resulting events to two rendezvous output channels. A single consumer
//! ([`consumer::drain`]) must read both channels for any writer to make
//! progress.
//!
//! Collaborators are injected as trait objects: `RouteStore` and
//! `FreightCalculator` for the route lifecycle, `Pacer` for the time between
//! driver positions, `EventSink` for whatever reads the outputs.

pub mod channel;
pub mod consumer;
pub mod hub;
pub mod pacing;
pub mod pricing;
pub mod simulator;
pub mod store;
pub mod testing;
pub mod traits;
pub mod workflows;

pub use channel::{rendezvous, ChannelClosed, RendezvousReceiver, RendezvousSender};
pub use consumer::{drain, DrainStats, JsonLineSink};
pub use hub::{output_channels, EventHub, OutputReceivers, OutputSenders};
pub use pacing::IntervalPacer;
pub use pricing::DistanceFreightCalculator;
pub use simulator::MovementSimulator;
pub use store::MemoryRouteStore;
pub use traits::{EventSink, FreightCalculator, Pacer, RouteStore};
