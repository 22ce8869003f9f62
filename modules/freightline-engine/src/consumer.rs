//! The single consumer loop and the reference JSON-lines sink.

use anyhow::{Context, Result};
use async_trait::async_trait;
use freightline_common::Event;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::{debug, warn};

use crate::hub::OutputReceivers;
use crate::traits::EventSink;

/// Counters for one run of [`drain`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DrainStats {
    pub freight: usize,
    pub movement: usize,
    pub sink_failures: usize,
}

impl DrainStats {
    pub fn total(&self) -> usize {
        self.freight + self.movement
    }
}

impl std::fmt::Display for DrainStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "freight={} movement={} sink_failures={}",
            self.freight, self.movement, self.sink_failures
        )
    }
}

/// Drain both output channels into `sink` until every hub handle is gone.
///
/// Both channels are awaited together with `select!`, never one after the
/// other: a writer is only released once its value is taken here, so a
/// channel left unread blocks its writers for good. Sink errors are logged
/// and the loop keeps draining.
pub async fn drain<S>(outputs: OutputReceivers, sink: &mut S) -> DrainStats
where
    S: EventSink + ?Sized,
{
    let OutputReceivers {
        mut freight,
        mut movement,
    } = outputs;
    let mut freight_open = true;
    let mut movement_open = true;
    let mut stats = DrainStats::default();

    while freight_open || movement_open {
        let received: Option<Event> = tokio::select! {
            event = freight.recv(), if freight_open => {
                match event {
                    Some(event) => {
                        stats.freight += 1;
                        Some(event.into())
                    }
                    None => {
                        debug!("Freight channel closed");
                        freight_open = false;
                        None
                    }
                }
            }
            event = movement.recv(), if movement_open => {
                match event {
                    Some(event) => {
                        stats.movement += 1;
                        Some(event.into())
                    }
                    None => {
                        debug!("Movement channel closed");
                        movement_open = false;
                        None
                    }
                }
            }
        };

        let Some(event) = received else {
            continue;
        };

        let name = event.name();
        if let Err(err) = sink.accept(event).await {
            stats.sink_failures += 1;
            warn!(event = name, error = %err, "Sink rejected event, continuing");
        }
    }

    debug!(%stats, "Output channels drained");
    stats
}

/// Writes each event as one JSON object per line.
pub struct JsonLineSink<W> {
    writer: W,
}

impl<W> JsonLineSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl JsonLineSink<tokio::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(tokio::io::stdout())
    }
}

#[async_trait]
impl<W> EventSink for JsonLineSink<W>
where
    W: AsyncWrite + Unpin + Send,
{
    async fn accept(&mut self, event: Event) -> Result<()> {
        let mut line = event
            .to_json_line()
            .with_context(|| format!("Failed to serialize {} event", event.name()))?;
        line.push('\n');
        self.writer.write_all(line.as_bytes()).await?;
        self.writer.flush().await?;
        Ok(())
    }
}
