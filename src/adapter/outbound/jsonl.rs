//! Newline-delimited JSON record source.
//!
//! Replays records from any async reader, typically stdin or a captured
//! `docker events --format '{{json .}}'` file. End of input ends the feed.

use async_trait::async_trait;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Stdin};
use tracing::warn;

use super::docker::stream::parse_line;
use crate::domain::event::RawRecord;
use crate::error::Result;
use crate::port::outbound::source::RecordSource;

/// [`RecordSource`] reading one JSON object per line.
pub struct JsonLinesSource<R> {
    reader: R,
    line: Vec<u8>,
    line_no: usize,
}

impl<R: AsyncBufRead + Unpin + Send> JsonLinesSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line: Vec::new(),
            line_no: 0,
        }
    }
}

impl JsonLinesSource<BufReader<Stdin>> {
    pub fn stdin() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()))
    }
}

#[async_trait]
impl<R: AsyncBufRead + Unpin + Send> RecordSource for JsonLinesSource<R> {
    async fn connect(&mut self) -> Result<()> {
        Ok(())
    }

    async fn next_record(&mut self) -> Option<RawRecord> {
        // `read_until` keeps bytes read before a cancellation in `line`, so
        // the buffer is only cleared once a full line is consumed.
        loop {
            match self.reader.read_until(b'\n', &mut self.line).await {
                Ok(0) if self.line.is_empty() => return None,
                Ok(_) => {
                    self.line_no += 1;
                    let parsed = parse_line(&self.line);
                    self.line.clear();
                    if parsed.is_some() {
                        return parsed;
                    }
                }
                Err(e) => {
                    warn!(line = self.line_no + 1, error = %e, "Failed to read input");
                    return None;
                }
            }
        }
    }

    fn source_name(&self) -> &'static str {
        "jsonl"
    }
}
