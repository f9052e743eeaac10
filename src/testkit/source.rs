//! Mock [`RecordSource`] implementations for testing.
//!
//! - [`ScriptedSource`]: Pre-loaded connect results and records.
//!   Best for: reconnection logic, end-of-stream handling.
//!
//! - [`ChannelSource`]: Channel-backed source with an external sender.
//!   Best for: watch-loop tests needing on-demand record delivery.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::domain::event::RawRecord;
use crate::error::Result;
use crate::port::outbound::source::RecordSource;

// ---------------------------------------------------------------------------
// ScriptedSource
// ---------------------------------------------------------------------------

/// A mock source with scripted connect results and a fixed record queue.
///
/// Each `connect()` pops the next result (defaults to `Ok(())` when
/// exhausted). A `None` entry in the record queue simulates a dropped feed.
pub struct ScriptedSource {
    connect_results: VecDeque<Result<()>>,
    records: VecDeque<Option<RawRecord>>,
    connect_count: Arc<AtomicU32>,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self {
            connect_results: VecDeque::new(),
            records: VecDeque::new(),
            connect_count: Arc::new(AtomicU32::new(0)),
        }
    }

    pub fn with_connect_results(mut self, results: Vec<Result<()>>) -> Self {
        self.connect_results = results.into();
        self
    }

    pub fn with_records(mut self, records: Vec<Option<RawRecord>>) -> Self {
        self.records = records.into();
        self
    }

    /// Shared counter for asserting connect calls after the source is moved.
    pub fn connect_counter(&self) -> Arc<AtomicU32> {
        Arc::clone(&self.connect_count)
    }
}

impl Default for ScriptedSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RecordSource for ScriptedSource {
    async fn connect(&mut self) -> Result<()> {
        self.connect_count.fetch_add(1, Ordering::SeqCst);
        self.connect_results.pop_front().unwrap_or(Ok(()))
    }

    async fn next_record(&mut self) -> Option<RawRecord> {
        self.records.pop_front().flatten()
    }

    fn source_name(&self) -> &'static str {
        "scripted"
    }
}

// ---------------------------------------------------------------------------
// ChannelSource
// ---------------------------------------------------------------------------

/// A source fed through an mpsc channel; dropping the sender ends the feed.
pub struct ChannelSource {
    rx: mpsc::Receiver<RawRecord>,
}

impl ChannelSource {
    pub fn new(capacity: usize) -> (mpsc::Sender<RawRecord>, Self) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (tx, Self { rx })
    }
}

#[async_trait]
impl RecordSource for ChannelSource {
    async fn connect(&mut self) -> Result<()> {
        Ok(())
    }

    async fn next_record(&mut self) -> Option<RawRecord> {
        self.rx.recv().await
    }

    fn source_name(&self) -> &'static str {
        "channel"
    }
}
