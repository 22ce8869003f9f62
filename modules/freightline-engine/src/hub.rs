//! The event hub: one entry point, one workflow per inbound variant.
//!
//! Outputs go through rendezvous channels, so every write waits for the
//! consumer. Exactly one consumer must drain *both* [`OutputReceivers`] with
//! a multiplexed wait (see [`crate::consumer::drain`]). If it stops reading
//! one channel, any task writing to that channel blocks forever; there is no
//! timeout or cancellation inside the hub.

use std::sync::Arc;

use freightline_common::{DriverMoved, Event, FreightCalculated, RouteError};
use tokio::task::JoinHandle;
use tracing::{debug, info_span, warn, Instrument};

use crate::channel::{rendezvous, RendezvousReceiver, RendezvousSender};
use crate::traits::{FreightCalculator, Pacer, RouteStore};
use crate::workflows::{self, FREIGHT_CHANNEL};

/// Write halves of the two output channels, owned by the hub.
#[derive(Clone)]
pub struct OutputSenders {
    pub freight: RendezvousSender<FreightCalculated>,
    pub movement: RendezvousSender<DriverMoved>,
}

/// Read halves of the two output channels. Not `Clone`: there is one
/// consumer.
pub struct OutputReceivers {
    pub freight: RendezvousReceiver<FreightCalculated>,
    pub movement: RendezvousReceiver<DriverMoved>,
}

pub fn output_channels() -> (OutputSenders, OutputReceivers) {
    let (freight_tx, freight_rx) = rendezvous();
    let (movement_tx, movement_rx) = rendezvous();
    (
        OutputSenders {
            freight: freight_tx,
            movement: movement_tx,
        },
        OutputReceivers {
            freight: freight_rx,
            movement: movement_rx,
        },
    )
}

pub struct EventHub {
    store: Arc<dyn RouteStore>,
    calculator: Arc<dyn FreightCalculator>,
    pacer: Arc<dyn Pacer>,
    outputs: OutputSenders,
}

impl EventHub {
    pub fn new(
        store: Arc<dyn RouteStore>,
        calculator: Arc<dyn FreightCalculator>,
        pacer: Arc<dyn Pacer>,
        outputs: OutputSenders,
    ) -> Self {
        Self {
            store,
            calculator,
            pacer,
            outputs,
        }
    }

    /// Run the workflow for `event` on the calling task.
    ///
    /// Outbound variants have no workflow and return `Ok(())` without
    /// writing. Adapter errors come back unchanged.
    pub async fn dispatch(&self, event: Event) -> Result<(), RouteError> {
        let span = info_span!("dispatch", event = event.name(), route_id = %event.route_id());

        async move {
            match event {
                Event::RouteCreated(created) => {
                    let freight =
                        workflows::create_route(&created, &*self.store, &*self.calculator)
                            .await?;
                    self.outputs
                        .freight
                        .send(freight)
                        .await
                        .map_err(|_| RouteError::OutputClosed {
                            channel: FREIGHT_CHANNEL,
                        })
                }
                Event::DeliveryStarted(started) => {
                    workflows::run_delivery(
                        &started,
                        &*self.store,
                        self.pacer.clone(),
                        &self.outputs.movement,
                    )
                    .await?;
                    Ok(())
                }
                Event::FreightCalculated(_) | Event::DriverMoved(_) => {
                    debug!("No handler for outbound event, ignoring");
                    Ok(())
                }
            }
        }
        .instrument(span)
        .await
    }

    /// Dispatch `event` on its own task so workflows run in parallel.
    ///
    /// Failures are logged here and also returned through the handle.
    pub fn spawn_dispatch(self: &Arc<Self>, event: Event) -> JoinHandle<Result<(), RouteError>> {
        let hub = Arc::clone(self);
        tokio::spawn(async move {
            let name = event.name();
            let route_id = event.route_id().to_string();
            let result = hub.dispatch(event).await;
            if let Err(err) = &result {
                warn!(event = name, route_id = %route_id, error = %err, "Dispatch failed");
            }
            result
        })
    }
}
