use std::time::Duration;

use async_trait::async_trait;

use crate::traits::Pacer;

/// Real-time pacing: sleeps a fixed interval on the tokio timer.
#[derive(Debug, Clone, Copy)]
pub struct IntervalPacer {
    interval: Duration,
}

impl IntervalPacer {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}

#[async_trait]
impl Pacer for IntervalPacer {
    async fn pause(&self) {
        tokio::time::sleep(self.interval).await;
    }
}
