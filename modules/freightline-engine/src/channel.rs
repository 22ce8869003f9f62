//! Rendezvous channel on top of tokio's mpsc.
//!
//! `send` resolves only once a receiver has taken the value. Each value
//! travels with a oneshot acknowledgement that the receiver fires as it
//! hands the value out, so a writer is held until its value is consumed and
//! a writer whose reader never shows up stays pending forever.

use thiserror::Error;
use tokio::sync::{mpsc, oneshot};

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("rendezvous receiver dropped")]
pub struct ChannelClosed;

struct Handoff<T> {
    value: T,
    taken: oneshot::Sender<()>,
}

pub fn rendezvous<T>() -> (RendezvousSender<T>, RendezvousReceiver<T>) {
    // Capacity 1 is the slot the pending handoff sits in; the ack keeps the
    // writer parked there until the reader has it.
    let (tx, rx) = mpsc::channel(1);
    (RendezvousSender { tx }, RendezvousReceiver { rx })
}

pub struct RendezvousSender<T> {
    tx: mpsc::Sender<Handoff<T>>,
}

impl<T> Clone for RendezvousSender<T> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<T> RendezvousSender<T> {
    /// Hand `value` to the receiver, waiting until it has been taken.
    pub async fn send(&self, value: T) -> Result<(), ChannelClosed> {
        let (taken, ack) = oneshot::channel();
        self.tx
            .send(Handoff { value, taken })
            .await
            .map_err(|_| ChannelClosed)?;
        ack.await.map_err(|_| ChannelClosed)
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

pub struct RendezvousReceiver<T> {
    rx: mpsc::Receiver<Handoff<T>>,
}

impl<T> RendezvousReceiver<T> {
    /// Take the next value, releasing its writer. `None` once every sender
    /// has been dropped.
    ///
    /// Cancel safe: nothing is awaited after the handoff is dequeued.
    pub async fn recv(&mut self) -> Option<T> {
        let Handoff { value, taken } = self.rx.recv().await?;
        // The writer may have given up waiting; the value is still delivered.
        let _ = taken.send(());
        Some(value)
    }
}
