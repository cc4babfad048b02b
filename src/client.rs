//! HTTP client for a running coupon-sniper server.

use std::time::Duration;

use anyhow::{Context, bail};
use futures::StreamExt;
use serde_json::{Value, json};

use sniper_protocols::{CaptureState, Response};

/// Talks to the capture API of a running server.
pub(crate) struct CaptureClient {
    base_url: String,
    http: reqwest::Client,
}

impl CaptureClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/capture/{}", self.base_url, path)
    }

    /// Current record, `None` when idle.
    pub async fn snapshot(&self) -> anyhow::Result<Option<CaptureState>> {
        let response = self
            .http
            .get(self.url("snapshot"))
            .timeout(Duration::from_secs(10))
            .send()
            .await
            .with_context(|| format!("server not reachable at {}", self.base_url))?
            .json::<Response>()
            .await?;
        let response = check(response)?;
        Ok(response.state.flatten())
    }

    pub async fn start(
        &self,
        tab: Option<String>,
        filter: String,
        schedule: Option<String>,
    ) -> anyhow::Result<()> {
        let mut body = json!({ "filter": filter });
        if let Some(tab) = tab {
            body["tabId"] = Value::String(tab);
        }
        if let Some(schedule) = schedule {
            body["schedule"] = Value::String(schedule);
        }
        self.post("start", body).await
    }

    pub async fn pause(&self, minutes: Option<u64>) -> anyhow::Result<()> {
        let body = match minutes {
            Some(minutes) => json!({ "minutes": minutes }),
            None => json!({}),
        };
        self.post("pause", body).await
    }

    pub async fn cancel(&self) -> anyhow::Result<()> {
        self.post("cancel", json!({})).await
    }

    async fn post(&self, path: &str, body: Value) -> anyhow::Result<()> {
        let response = self
            .http
            .post(self.url(path))
            .timeout(Duration::from_secs(30))
            .json(&body)
            .send()
            .await
            .with_context(|| format!("server not reachable at {}", self.base_url))?
            .json::<Response>()
            .await?;
        check(response).map(|_| ())
    }

    /// Follow the record, calling `on_change` once per change notification.
    ///
    /// Returns when the server closes the stream.
    pub async fn watch<F>(&self, mut on_change: F) -> anyhow::Result<()>
    where
        F: FnMut(Option<CaptureState>),
    {
        let response = self
            .http
            .get(self.url("events"))
            .header("accept", "text/event-stream")
            .send()
            .await
            .with_context(|| format!("server not reachable at {}", self.base_url))?
            .error_for_status()?;

        let mut parser = EventParser::default();
        let mut body = response.bytes_stream();
        while let Some(chunk) = body.next().await {
            let chunk = chunk?;
            for data in parser.feed(&String::from_utf8_lossy(&chunk)) {
                match serde_json::from_str::<Option<CaptureState>>(&data) {
                    Ok(record) => on_change(record),
                    Err(e) => tracing::warn!("Ignoring malformed event: {}", e),
                }
            }
        }
        Ok(())
    }
}

fn check(response: Response) -> anyhow::Result<Response> {
    if response.ok {
        return Ok(response);
    }
    let error = response.error.unwrap_or_else(|| "request failed".to_string());
    match response.code {
        Some(code) => bail!("{error} ({code})"),
        None => bail!("{error}"),
    }
}

/// Incremental server-sent events parser yielding the `data` of each event.
#[derive(Default)]
pub(crate) struct EventParser {
    buffer: String,
    data: Vec<String>,
}

impl EventParser {
    pub fn feed(&mut self, text: &str) -> Vec<String> {
        self.buffer.push_str(text);
        let mut events = Vec::new();

        while let Some(pos) = self.buffer.find('\n') {
            let line: String = self.buffer.drain(..=pos).collect();
            let line = line.trim_end_matches(['\n', '\r']);

            if line.is_empty() {
                if !self.data.is_empty() {
                    events.push(self.data.join("\n"));
                    self.data.clear();
                }
            } else if let Some(value) = line.strip_prefix("data:") {
                self.data.push(value.strip_prefix(' ').unwrap_or(value).to_string());
            }
        }

        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parser_splits_events() {
        let mut parser = EventParser::default();
        let events = parser.feed("event: capture\ndata: null\n\nevent: capture\ndata: {\"a\":1}\n\n");
        assert_eq!(events, vec!["null".to_string(), "{\"a\":1}".to_string()]);
    }

    #[test]
    fn test_parser_handles_split_chunks_and_comments() {
        let mut parser = EventParser::default();
        assert!(parser.feed(":\n\nevent: capture\nda").is_empty());
        assert!(parser.feed("ta: {\"status\"").is_empty());
        let events = parser.feed(":\"DONE\"}\r\n\r\n");
        assert_eq!(events, vec!["{\"status\":\"DONE\"}".to_string()]);
    }

    #[test]
    fn test_check_surfaces_error_and_code() {
        let response = Response {
            ok: false,
            state: None,
            error: Some("No active capture".to_string()),
            code: Some("no_active_run".to_string()),
        };
        let err = check(response).unwrap_err();
        assert_eq!(err.to_string(), "No active capture (no_active_run)");
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let client = CaptureClient::new("http://127.0.0.1:8787/");
        assert_eq!(client.url("snapshot"), "http://127.0.0.1:8787/api/capture/snapshot");
    }
}
