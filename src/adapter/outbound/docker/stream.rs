//! Engine event stream over HTTP.
//!
//! `GET /events` answers with a never-ending body of newline-delimited JSON
//! objects. The body is read chunk by chunk and split on `\n`; a record may
//! span several chunks.

use async_trait::async_trait;
use reqwest::{Client as HttpClient, Response};
use tracing::{debug, info, warn};

use crate::domain::event::RawRecord;
use crate::error::{Error, Result};
use crate::port::outbound::source::RecordSource;

/// [`RecordSource`] reading the engine's `/events` endpoint.
pub struct DockerEventStream {
    http: HttpClient,
    url: String,
    response: Option<Response>,
    buffer: Vec<u8>,
}

impl DockerEventStream {
    #[must_use]
    pub fn new(base_url: &str) -> Self {
        Self {
            http: HttpClient::new(),
            url: format!("{}/events", base_url.trim_end_matches('/')),
            response: None,
            buffer: Vec::new(),
        }
    }

    /// Pop the next complete line from the buffer, if any.
    fn take_line(&mut self) -> Option<Vec<u8>> {
        let pos = self.buffer.iter().position(|b| *b == b'\n')?;
        let mut line: Vec<u8> = self.buffer.drain(..=pos).collect();
        line.pop();
        Some(line)
    }
}

/// Parse one line of the feed; blank and malformed lines yield `None`.
pub(crate) fn parse_line(line: &[u8]) -> Option<RawRecord> {
    let text = String::from_utf8_lossy(line);
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    let parsed = serde_json::from_str::<serde_json::Value>(text)
        .map_err(Error::from)
        .and_then(RawRecord::try_from);
    match parsed {
        Ok(record) => Some(record),
        Err(e) => {
            warn!(error = %e, "Skipping unparseable event line");
            None
        }
    }
}

#[async_trait]
impl RecordSource for DockerEventStream {
    async fn connect(&mut self) -> Result<()> {
        info!(url = %self.url, "Connecting to event stream");
        let response = self.http.get(&self.url).send().await?.error_for_status()?;
        self.response = Some(response);
        self.buffer.clear();
        Ok(())
    }

    async fn next_record(&mut self) -> Option<RawRecord> {
        loop {
            while let Some(line) = self.take_line() {
                if let Some(record) = parse_line(&line) {
                    return Some(record);
                }
            }

            let response = self.response.as_mut()?;
            match response.chunk().await {
                Ok(Some(bytes)) => self.buffer.extend_from_slice(&bytes),
                Ok(None) => {
                    debug!("Event stream body ended");
                    self.response = None;
                    let rest = std::mem::take(&mut self.buffer);
                    return parse_line(&rest);
                }
                Err(e) => {
                    warn!(error = %e, "Event stream read failed");
                    self.response = None;
                    self.buffer.clear();
                    return None;
                }
            }
        }
    }

    fn source_name(&self) -> &'static str {
        "docker"
    }
}
