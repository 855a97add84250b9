use std::time::Duration;

use futures::StreamExt;
use tokio::sync::mpsc;
use url::Url;

use crate::content::NotificationRecord;

/// Reconnect delay until the server advises another with `retry:`.
pub const DEFAULT_RETRY: Duration = Duration::from_secs(3);

/// A single event larger than this is dropped and the buffer reset.
const MAX_EVENT_SIZE: usize = 1024 * 1024;

// ============================================================================
// Parser
// ============================================================================

/// One dispatched server-sent event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseEvent {
    pub event: Option<String>,
    pub data: String,
}

/// Incremental `text/event-stream` parser.
///
/// Feed it chunks as they arrive; complete events come out as soon as their
/// terminating blank line is seen. Lines may end in `\n`, `\r\n` or `\r`.
#[derive(Debug, Default)]
pub struct SseParser {
    line: Vec<u8>,
    data: String,
    event: Option<String>,
    retry: Option<Duration>,
    last_was_cr: bool,
    oversized: bool,
}

impl SseParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Latest `retry:` value seen, if any.
    pub fn retry(&self) -> Option<Duration> {
        self.retry
    }

    pub fn feed(&mut self, chunk: &[u8]) -> Vec<SseEvent> {
        let mut events = Vec::new();
        for &byte in chunk {
            match byte {
                b'\n' if self.last_was_cr => {
                    self.last_was_cr = false;
                }
                b'\n' | b'\r' => {
                    self.last_was_cr = byte == b'\r';
                    let line = std::mem::take(&mut self.line);
                    if let Some(event) = self.process_line(&line) {
                        events.push(event);
                    }
                }
                _ => {
                    self.last_was_cr = false;
                    if self.line.len() + self.data.len() < MAX_EVENT_SIZE {
                        self.line.push(byte);
                    } else {
                        self.oversized = true;
                    }
                }
            }
        }
        events
    }

    fn process_line(&mut self, raw: &[u8]) -> Option<SseEvent> {
        if raw.is_empty() {
            return self.dispatch();
        }

        let line = String::from_utf8_lossy(raw);
        // Comment line
        if line.starts_with(':') {
            return None;
        }
        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (&*line, ""),
        };

        match field {
            "data" => {
                if self.data.len() + value.len() >= MAX_EVENT_SIZE {
                    self.oversized = true;
                } else {
                    self.data.push_str(value);
                    self.data.push('\n');
                }
            }
            "event" => self.event = Some(value.to_string()),
            "retry" => {
                if let Ok(ms) = value.parse::<u64>() {
                    self.retry = Some(Duration::from_millis(ms));
                }
            }
            // `id` only matters for Last-Event-ID, which this endpoint ignores
            _ => {}
        }
        None
    }

    fn dispatch(&mut self) -> Option<SseEvent> {
        let mut data = std::mem::take(&mut self.data);
        let event = self.event.take();
        if std::mem::take(&mut self.oversized) {
            tracing::warn!(limit = MAX_EVENT_SIZE, "Dropped oversized notification event");
            return None;
        }
        if data.is_empty() {
            return None;
        }
        data.pop();
        Some(SseEvent { event, data })
    }
}

/// Decode a pushed message: a JSON array replacing the whole list.
pub fn parse_notification_message(data: &str) -> Result<Vec<NotificationRecord>, serde_json::Error> {
    serde_json::from_str(data)
}

// ============================================================================
// Stream task
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamStatus {
    Connected,
    /// Disconnected; next attempt after the delay
    Reconnecting(Duration),
    /// Server refused the stream; no further attempts
    Closed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    Notifications(Vec<NotificationRecord>),
    Status(StreamStatus),
}

/// Hold the notification stream open until `tx` closes.
///
/// Transport failures and clean disconnects reconnect after the current
/// retry delay. An HTTP error status or a non-event-stream content type ends
/// the task, as a browser `EventSource` would.
pub async fn run_notification_stream(
    client: reqwest::Client,
    url: Url,
    tx: mpsc::Sender<StreamEvent>,
) {
    let mut retry = DEFAULT_RETRY;

    loop {
        match connect(&client, &url).await {
            Ok(response) => {
                if tx
                    .send(StreamEvent::Status(StreamStatus::Connected))
                    .await
                    .is_err()
                {
                    return;
                }
                tracing::info!(url = %url, "Notification stream connected");

                match pump(response, &tx).await {
                    Pump::ReceiverGone => return,
                    Pump::Ended { retry: advised } => {
                        if let Some(advised) = advised {
                            retry = advised;
                        }
                    }
                }
            }
            Err(ConnectError::Refused(reason)) => {
                tracing::warn!(url = %url, reason = %reason, "Notification stream refused");
                let _ = tx.send(StreamEvent::Status(StreamStatus::Closed)).await;
                return;
            }
            Err(ConnectError::Transport(e)) => {
                tracing::debug!(url = %url, error = %e, "Notification stream unavailable");
            }
        }

        if tx
            .send(StreamEvent::Status(StreamStatus::Reconnecting(retry)))
            .await
            .is_err()
        {
            return;
        }
        tokio::time::sleep(retry).await;
    }
}

enum ConnectError {
    Transport(reqwest::Error),
    Refused(String),
}

async fn connect(client: &reqwest::Client, url: &Url) -> Result<reqwest::Response, ConnectError> {
    let response = client
        .get(url.clone())
        .header(reqwest::header::ACCEPT, "text/event-stream")
        .header(reqwest::header::CACHE_CONTROL, "no-cache")
        .send()
        .await
        .map_err(ConnectError::Transport)?;

    let status = response.status();
    if !status.is_success() {
        return Err(ConnectError::Refused(format!("HTTP {}", status.as_u16())));
    }

    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    if !content_type.starts_with("text/event-stream") {
        return Err(ConnectError::Refused(format!(
            "unexpected content type '{content_type}'"
        )));
    }
    Ok(response)
}

enum Pump {
    ReceiverGone,
    Ended { retry: Option<Duration> },
}

async fn pump(response: reqwest::Response, tx: &mpsc::Sender<StreamEvent>) -> Pump {
    let mut parser = SseParser::new();
    let mut body = response.bytes_stream();

    while let Some(chunk) = body.next().await {
        let chunk = match chunk {
            Ok(chunk) => chunk,
            Err(e) => {
                tracing::debug!(error = %e, "Notification stream interrupted");
                break;
            }
        };

        for event in parser.feed(&chunk) {
            if event.event.as_deref().is_some_and(|name| name != "message") {
                continue;
            }
            match parse_notification_message(&event.data) {
                Ok(records) => {
                    if tx.send(StreamEvent::Notifications(records)).await.is_err() {
                        return Pump::ReceiverGone;
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Skipping malformed notification message");
                }
            }
        }
    }

    Pump::Ended {
        retry: parser.retry(),
    }
}
