use std::collections::VecDeque;
use std::time::Duration;

use serde::Deserialize;
use serde_json::{json, Value};
use tokio::time::{timeout_at, Instant};
use tracing::debug;

use crate::app::{Result, ScrapeError};
use crate::devtools::Transport;

/// An id-less message pushed by the browser, e.g. `Page.loadEventFired`
#[derive(Debug, Clone, PartialEq)]
pub struct ProtocolEvent {
    pub method: String,
    pub params: Value,
}

#[derive(Debug, Deserialize)]
struct Inbound {
    id: Option<u64>,
    method: Option<String>,
    #[serde(default)]
    params: Value,
    result: Option<Value>,
    error: Option<Value>,
}

/// A live control connection bound to one tab.
///
/// The session is its own dispatch loop: `send` reads frames until the
/// response carrying its id shows up, parking any events it passes on the
/// way so that [`Session::next_event`] can hand them out later. Taking
/// `&mut self` keeps exactly one request in flight.
pub struct Session {
    tab_id: String,
    transport: Box<dyn Transport>,
    next_id: u64,
    events: VecDeque<ProtocolEvent>,
    closed: bool,
}

impl Session {
    pub fn new(tab_id: impl Into<String>, transport: Box<dyn Transport>) -> Self {
        Self {
            tab_id: tab_id.into(),
            transport,
            next_id: 0,
            events: VecDeque::new(),
            closed: false,
        }
    }

    pub fn tab_id(&self) -> &str {
        &self.tab_id
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Send one command and wait for its result.
    ///
    /// Never retried; callers that need a bound wrap this in a timeout.
    pub async fn send(&mut self, method: &str, params: Value) -> Result<Value> {
        self.ensure_open()?;

        self.next_id += 1;
        let id = self.next_id;
        let request = json!({ "id": id, "method": method, "params": params });
        debug!(tab = %self.tab_id, id, method, "-> command");
        self.transport.send_text(request.to_string()).await?;

        loop {
            let Some(text) = self.transport.recv_text().await? else {
                return Err(ScrapeError::Protocol(format!(
                    "connection to tab {} closed while waiting for {} (id {})",
                    self.tab_id, method, id
                )));
            };

            let inbound = parse_inbound(&text)?;
            match inbound.id {
                Some(response_id) if response_id == id => {
                    if let Some(error) = inbound.error {
                        return Err(ScrapeError::Protocol(format!(
                            "{} failed: {}",
                            method,
                            describe_error(&error)
                        )));
                    }
                    debug!(tab = %self.tab_id, id, "<- result");
                    return Ok(inbound.result.unwrap_or_else(|| json!({})));
                }
                Some(stale) => {
                    debug!(
                        tab = %self.tab_id,
                        stale,
                        expected = id,
                        "discarding unmatched response"
                    );
                }
                None => self.park_event(inbound),
            }
        }
    }

    /// Next event, waiting at most `wait` for one to arrive.
    pub async fn next_event(&mut self, wait: Duration) -> Result<Option<ProtocolEvent>> {
        if let Some(event) = self.events.pop_front() {
            return Ok(Some(event));
        }
        self.ensure_open()?;

        let deadline = Instant::now() + wait;
        loop {
            let frame = match timeout_at(deadline, self.transport.recv_text()).await {
                Err(_elapsed) => return Ok(None),
                Ok(frame) => frame?,
            };
            let Some(text) = frame else {
                return Err(ScrapeError::Protocol(format!(
                    "connection to tab {} closed while waiting for events",
                    self.tab_id
                )));
            };

            let inbound = parse_inbound(&text)?;
            if let Some(stale) = inbound.id {
                debug!(tab = %self.tab_id, stale, "discarding response with no waiter");
                continue;
            }
            if let Some(method) = inbound.method {
                return Ok(Some(ProtocolEvent {
                    method,
                    params: inbound.params,
                }));
            }
        }
    }

    /// Drop events buffered so far
    pub fn clear_events(&mut self) {
        self.events.clear();
    }

    /// Close the connection. Calling it again is a no-op.
    pub async fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.events.clear();
        debug!(tab = %self.tab_id, "closing session");
        self.transport.close().await
    }

    fn park_event(&mut self, inbound: Inbound) {
        match inbound.method {
            Some(method) => self.events.push_back(ProtocolEvent {
                method,
                params: inbound.params,
            }),
            None => debug!(tab = %self.tab_id, "discarding frame without id or method"),
        }
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed {
            return Err(ScrapeError::Protocol(format!(
                "session for tab {} is closed",
                self.tab_id
            )));
        }
        Ok(())
    }
}

fn parse_inbound(text: &str) -> Result<Inbound> {
    serde_json::from_str(text)
        .map_err(|e| ScrapeError::Protocol(format!("malformed frame ({}): {}", e, text)))
}

fn describe_error(error: &Value) -> String {
    let message = error
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or("unknown error");
    match error.get("code").and_then(Value::as_i64) {
        Some(code) => format!("{} (code {})", message, code),
        None => message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::devtools::fake::ScriptedTransport;
    use tokio_test::assert_err;

    #[tokio::test]
    async fn test_send_returns_matching_result_past_events() {
        let (transport, sent) = ScriptedTransport::new(vec![
            json!({"method": "Page.frameStartedLoading", "params": {"frameId": "F"}}),
            json!({"id": 99, "result": {"stale": true}}),
            json!({"method": "Page.loadEventFired", "params": {"timestamp": 1.5}}),
            json!({"id": 1, "result": {"frameId": "F"}}),
        ]);
        let mut session = Session::new("T1", Box::new(transport));

        let result = session
            .send("Page.navigate", json!({"url": "https://example.com"}))
            .await
            .unwrap();
        assert_eq!(result, json!({"frameId": "F"}));

        let sent = sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0]["id"], 1);
        assert_eq!(sent[0]["method"], "Page.navigate");
        assert_eq!(sent[0]["params"]["url"], "https://example.com");
    }

    #[tokio::test]
    async fn test_events_seen_during_send_are_kept() {
        let (transport, _) = ScriptedTransport::new(vec![
            json!({"method": "Page.loadEventFired", "params": {"timestamp": 2.0}}),
            json!({"id": 1, "result": {}}),
        ]);
        let mut session = Session::new("T1", Box::new(transport));
        session.send("Page.enable", json!({})).await.unwrap();

        let event = session
            .next_event(Duration::from_millis(10))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(event.method, "Page.loadEventFired");
        assert_eq!(event.params["timestamp"], 2.0);
    }

    #[tokio::test]
    async fn test_request_ids_increase() {
        let (transport, sent) = ScriptedTransport::new(vec![
            json!({"id": 1, "result": {}}),
            json!({"id": 2, "result": {}}),
            json!({"id": 3, "result": {}}),
        ]);
        let mut session = Session::new("T1", Box::new(transport));
        for _ in 0..3 {
            session.send("Page.enable", json!({})).await.unwrap();
        }

        let ids: Vec<u64> = sent
            .lock()
            .unwrap()
            .iter()
            .map(|m| m["id"].as_u64().unwrap())
            .collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_missing_result_is_empty_object() {
        let (transport, _) = ScriptedTransport::new(vec![json!({"id": 1})]);
        let mut session = Session::new("T1", Box::new(transport));
        let result = session.send("Page.enable", json!({})).await.unwrap();
        assert_eq!(result, json!({}));
    }

    #[tokio::test]
    async fn test_error_member_is_protocol_error() {
        let (transport, _) = ScriptedTransport::new(vec![json!({
            "id": 1,
            "error": {"code": -32601, "message": "'Page.bogus' wasn't found"}
        })]);
        let mut session = Session::new("T1", Box::new(transport));

        let err = session.send("Page.bogus", json!({})).await.unwrap_err();
        match err {
            ScrapeError::Protocol(msg) => {
                assert!(msg.contains("Page.bogus"));
                assert!(msg.contains("-32601"));
            }
            other => panic!("expected protocol error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_malformed_frame_is_protocol_error() {
        let transport = ScriptedTransport::from_raw(vec!["not json".to_string()]);
        let mut session = Session::new("T1", Box::new(transport));
        let err = session.send("Page.enable", json!({})).await.unwrap_err();
        assert!(matches!(err, ScrapeError::Protocol(_)));
    }

    #[tokio::test]
    async fn test_peer_close_while_waiting_is_protocol_error() {
        let (transport, _) =
            ScriptedTransport::new(vec![json!({"method": "Inspector.detached", "params": {}})]);
        let mut session = Session::new("T1", Box::new(transport.ending_when_drained()));
        let err = session.send("Page.enable", json!({})).await.unwrap_err();
        assert!(err.to_string().contains("closed"));
    }

    #[tokio::test]
    async fn test_next_event_times_out_quietly() {
        let (transport, _) = ScriptedTransport::new(vec![]);
        let mut session = Session::new("T1", Box::new(transport));
        let event = session.next_event(Duration::from_millis(20)).await.unwrap();
        assert!(event.is_none());
    }

    #[tokio::test]
    async fn test_clear_events_drops_buffer() {
        let (transport, _) = ScriptedTransport::new(vec![
            json!({"method": "Page.loadEventFired", "params": {}}),
            json!({"id": 1, "result": {}}),
        ]);
        let mut session = Session::new("T1", Box::new(transport));
        session.send("Page.enable", json!({})).await.unwrap();
        session.clear_events();
        let event = session.next_event(Duration::from_millis(10)).await.unwrap();
        assert!(event.is_none());
    }

    #[tokio::test]
    async fn test_close_is_idempotent() {
        let (transport, _) = ScriptedTransport::new(vec![]);
        let closes = transport.close_counter();
        let mut session = Session::new("T1", Box::new(transport));

        session.close().await.unwrap();
        session.close().await.unwrap();
        assert!(session.is_closed());
        assert_eq!(closes.load(std::sync::atomic::Ordering::SeqCst), 1);
        assert_err!(session.send("Page.enable", json!({})).await);
    }
}
