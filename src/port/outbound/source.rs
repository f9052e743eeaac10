//! Record source port.
//!
//! The watch loop treats the engine's event feed as an opaque asynchronous
//! sequence of [`RawRecord`]s. Adapters provide the transport.

use async_trait::async_trait;

use crate::domain::event::RawRecord;
use crate::error::Error;

/// Real-time feed of raw lifecycle records.
#[async_trait]
pub trait RecordSource: Send {
    /// Open the underlying feed.
    async fn connect(&mut self) -> Result<(), Error>;

    /// Receive the next record.
    ///
    /// Waits until a record is available. Returns `None` when the feed is
    /// closed.
    async fn next_record(&mut self) -> Option<RawRecord>;

    /// Source name for logging.
    fn source_name(&self) -> &'static str;
}

#[async_trait]
impl RecordSource for Box<dyn RecordSource> {
    async fn connect(&mut self) -> Result<(), Error> {
        (**self).connect().await
    }

    async fn next_record(&mut self) -> Option<RawRecord> {
        (**self).next_record().await
    }

    fn source_name(&self) -> &'static str {
        (**self).source_name()
    }
}
