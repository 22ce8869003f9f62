//! Feeds inbound events to the hub.
//!
//! Every event is dispatched on its own task. A `RouteCreated` task is
//! awaited before the next event is read, so a `DeliveryStarted` further
//! down the input finds its route. Delivery tasks keep running in the
//! background and are joined once the input is exhausted.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use freightline_common::{Event, Waypoint};
use freightline_engine::EventHub;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::task::JoinHandle;
use tracing::{info, warn};

pub enum EventSource {
    Demo,
    Stdin,
    File(PathBuf),
}

impl EventSource {
    pub fn from_arg(arg: Option<PathBuf>) -> Self {
        match arg {
            None => EventSource::Demo,
            Some(path) if path.as_os_str() == "-" => EventSource::Stdin,
            Some(path) => EventSource::File(path),
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct IngestStats {
    pub dispatched: usize,
    pub failed: usize,
    pub skipped: usize,
}

/// Route "1" over three waypoints, then its delivery.
pub fn demo_events() -> Vec<Event> {
    vec![
        Event::route_created(
            "1",
            100,
            vec![
                Waypoint::new(1.0, 1.0),
                Waypoint::new(2.0, 2.0),
                Waypoint::new(3.0, 3.0),
            ],
        ),
        Event::delivery_started("1"),
    ]
}

pub async fn run(hub: Arc<EventHub>, source: EventSource) -> Result<IngestStats> {
    match source {
        EventSource::Demo => {
            let mut ingest = Ingest::new(hub);
            for event in demo_events() {
                ingest.submit(event).await?;
            }
            ingest.finish().await
        }
        EventSource::Stdin => read_lines(hub, BufReader::new(tokio::io::stdin())).await,
        EventSource::File(path) => {
            let file = tokio::fs::File::open(&path)
                .await
                .with_context(|| format!("Failed to open events file: {}", path.display()))?;
            read_lines(hub, BufReader::new(file)).await
        }
    }
}

/// Parse one JSON event per line. Blank lines are ignored, malformed ones
/// are logged and skipped.
pub async fn read_lines<R>(hub: Arc<EventHub>, reader: R) -> Result<IngestStats>
where
    R: AsyncBufRead + Unpin,
{
    let mut ingest = Ingest::new(hub);
    let mut lines = reader.lines();
    let mut line_no = 0usize;

    while let Some(line) = lines.next_line().await.context("Failed to read events")? {
        line_no += 1;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match Event::from_json_line(line) {
            Ok(event) => ingest.submit(event).await?,
            Err(err) => {
                warn!(line = line_no, error = %err, "Skipping malformed event");
                ingest.stats.skipped += 1;
            }
        }
    }

    ingest.finish().await
}

struct Ingest {
    hub: Arc<EventHub>,
    background: Vec<JoinHandle<Result<(), freightline_common::RouteError>>>,
    stats: IngestStats,
}

impl Ingest {
    fn new(hub: Arc<EventHub>) -> Self {
        Self {
            hub,
            background: Vec::new(),
            stats: IngestStats::default(),
        }
    }

    async fn submit(&mut self, event: Event) -> Result<()> {
        self.stats.dispatched += 1;
        let waits_for_completion = matches!(event, Event::RouteCreated(_));
        let handle = self.hub.spawn_dispatch(event);

        if waits_for_completion {
            // Failures are already logged by the dispatch task.
            if handle.await.context("Dispatch task panicked")?.is_err() {
                self.stats.failed += 1;
            }
        } else {
            self.background.push(handle);
        }
        Ok(())
    }

    async fn finish(self) -> Result<IngestStats> {
        let Self {
            hub,
            background,
            mut stats,
        } = self;
        // Release our handle so the consumer can finish once the remaining
        // tasks are done.
        drop(hub);

        for handle in background {
            if handle.await.context("Dispatch task panicked")?.is_err() {
                stats.failed += 1;
            }
        }

        info!(
            dispatched = stats.dispatched,
            failed = stats.failed,
            skipped = stats.skipped,
            "Input exhausted"
        );
        Ok(stats)
    }
}
