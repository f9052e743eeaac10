//! Reconnecting wrapper for [`RecordSource`].
//!
//! Provides automatic reconnection with exponential backoff for any source.
//! When the inner feed ends, the wrapper reconnects and keeps reading; after
//! too many consecutive failed connects it gives up and reports end of feed.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use tokio::time::sleep;
use tracing::{error, info, warn};

use crate::domain::event::RawRecord;
use crate::error::Result;
use crate::infrastructure::config::docker::ReconnectionConfig;
use crate::port::outbound::source::RecordSource;

/// Wrapper that adds automatic reconnection to any [`RecordSource`].
pub struct ReconnectingSource<S: RecordSource> {
    inner: S,
    config: ReconnectionConfig,
    consecutive_failures: u32,
    current_delay_ms: u64,
    connected: bool,
}

impl<S: RecordSource> ReconnectingSource<S> {
    /// The wrapper starts disconnected; call [`connect`](RecordSource::connect)
    /// before reading records.
    pub fn new(inner: S, config: ReconnectionConfig) -> Self {
        let initial_delay = config.initial_delay_ms;
        Self {
            inner,
            config,
            consecutive_failures: 0,
            current_delay_ms: initial_delay,
            connected: false,
        }
    }

    /// Number of failed connects since the last success.
    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    fn reset_backoff(&mut self) {
        self.consecutive_failures = 0;
        self.current_delay_ms = self.config.initial_delay_ms;
    }

    /// Current delay plus jitter; advances the delay for the next call.
    fn next_delay(&mut self) -> Duration {
        let base_delay = Duration::from_millis(self.current_delay_ms);
        let delay = base_delay + Duration::from_millis(jitter_ms(base_delay));

        let next_delay = (self.current_delay_ms as f64 * self.config.backoff_multiplier) as u64;
        self.current_delay_ms = next_delay.min(self.config.max_delay_ms);

        delay
    }

    fn exhausted(&self) -> bool {
        self.consecutive_failures >= self.config.max_consecutive_failures
    }

    async fn reconnect(&mut self) -> Result<()> {
        let delay = self.next_delay();
        info!(
            source = self.inner.source_name(),
            delay_ms = delay.as_millis(),
            attempt = self.consecutive_failures + 1,
            "Reconnecting after delay"
        );
        sleep(delay).await;

        match self.inner.connect().await {
            Ok(()) => {
                info!(source = self.inner.source_name(), "Reconnected successfully");
                self.connected = true;
                self.reset_backoff();
                Ok(())
            }
            Err(e) => {
                self.consecutive_failures += 1;
                self.connected = false;
                error!(
                    source = self.inner.source_name(),
                    error = %e,
                    failures = self.consecutive_failures,
                    "Reconnection failed"
                );
                Err(e)
            }
        }
    }
}

/// Up to 20% of `base_delay`, so clients do not reconnect in lockstep.
fn jitter_ms(base_delay: Duration) -> u64 {
    let jitter_range_ms = (base_delay.as_millis() as u64) / 5;
    if jitter_range_ms == 0 {
        return 0;
    }

    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.subsec_nanos())
        .unwrap_or(0);
    u64::from(nanos) % (jitter_range_ms + 1)
}

#[async_trait]
impl<S: RecordSource> RecordSource for ReconnectingSource<S> {
    async fn connect(&mut self) -> Result<()> {
        let result = self.inner.connect().await;
        if result.is_ok() {
            self.connected = true;
            self.reset_backoff();
        }
        result
    }

    async fn next_record(&mut self) -> Option<RawRecord> {
        loop {
            if !self.connected {
                if self.exhausted() {
                    error!(
                        source = self.inner.source_name(),
                        failures = self.consecutive_failures,
                        "Giving up on event stream"
                    );
                    return None;
                }
                if let Err(e) = self.reconnect().await {
                    warn!(error = %e, "Reconnection attempt failed, will retry");
                    continue;
                }
            }

            match self.inner.next_record().await {
                Some(record) => return Some(record),
                None => {
                    warn!(source = self.inner.source_name(), "Event stream ended");
                    self.connected = false;
                }
            }
        }
    }

    fn source_name(&self) -> &'static str {
        self.inner.source_name()
    }
}
