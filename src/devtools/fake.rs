//! In-memory stand-ins for the browser, used by unit tests.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::app::{Result, ScrapeError};
use crate::devtools::{DebugPort, Session, Tab, Transport};

/// Replays pre-seeded frames regardless of what is sent.
pub(crate) struct ScriptedTransport {
    inbound: VecDeque<String>,
    sent: Arc<Mutex<Vec<Value>>>,
    closes: Arc<AtomicUsize>,
    end_when_drained: bool,
}

impl ScriptedTransport {
    pub fn new(frames: Vec<Value>) -> (Self, Arc<Mutex<Vec<Value>>>) {
        let transport = Self::from_raw(frames.iter().map(Value::to_string).collect());
        let sent = transport.sent.clone();
        (transport, sent)
    }

    pub fn from_raw(frames: Vec<String>) -> Self {
        Self {
            inbound: frames.into(),
            sent: Arc::new(Mutex::new(Vec::new())),
            closes: Arc::new(AtomicUsize::new(0)),
            end_when_drained: false,
        }
    }

    /// Report a closed peer once the script runs out instead of hanging
    pub fn ending_when_drained(mut self) -> Self {
        self.end_when_drained = true;
        self
    }

    pub fn close_counter(&self) -> Arc<AtomicUsize> {
        self.closes.clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send_text(&mut self, text: String) -> Result<()> {
        let value: Value = serde_json::from_str(&text)?;
        self.sent.lock().unwrap().push(value);
        Ok(())
    }

    async fn recv_text(&mut self) -> Result<Option<String>> {
        match self.inbound.pop_front() {
            Some(frame) => Ok(Some(frame)),
            None if self.end_when_drained => Ok(None),
            None => futures::future::pending().await,
        }
    }

    async fn close(&mut self) -> Result<()> {
        self.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// A page served by [`FakeSite`]
#[derive(Debug, Clone, Default)]
pub(crate) struct FakePage {
    pub title: String,
    pub content: String,
    pub next: Option<String>,
    pub throws: bool,
    pub never_loads: bool,
}

impl FakePage {
    pub fn new(title: &str, content: &str) -> Self {
        Self {
            title: title.to_string(),
            content: content.to_string(),
            ..Default::default()
        }
    }

    pub fn next(mut self, url: &str) -> Self {
        self.next = Some(url.to_string());
        self
    }

    pub fn throwing(mut self) -> Self {
        self.throws = true;
        self
    }

    pub fn never_loading(mut self) -> Self {
        self.never_loads = true;
        self
    }
}

#[derive(Debug, Default)]
pub(crate) struct FakeSite {
    pages: HashMap<String, FakePage>,
}

impl FakeSite {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, url: &str, page: FakePage) -> Self {
        self.pages.insert(url.to_string(), page);
        self
    }
}

/// Counters shared between a [`FakeDebugPort`] and its sessions
#[derive(Debug, Default)]
pub(crate) struct BrowserLog {
    pub navigations: Mutex<Vec<String>>,
    pub sessions_opened: AtomicUsize,
    pub sessions_closed: AtomicUsize,
    pub tabs_closed: Mutex<Vec<String>>,
}

/// Answers `Page.*` and `Runtime.evaluate` the way a tab would.
pub(crate) struct BrowserTransport {
    site: Arc<FakeSite>,
    log: Arc<BrowserLog>,
    current_url: String,
    outbox: VecDeque<String>,
}

impl BrowserTransport {
    pub fn new(site: Arc<FakeSite>, log: Arc<BrowserLog>) -> Self {
        Self {
            site,
            log,
            current_url: "about:blank".to_string(),
            outbox: VecDeque::new(),
        }
    }

    fn reply(&mut self, id: u64, result: Value) {
        self.outbox.push_back(json!({ "id": id, "result": result }).to_string());
    }

    fn emit(&mut self, method: &str, params: Value) {
        self.outbox
            .push_back(json!({ "method": method, "params": params }).to_string());
    }

    fn evaluate(&self) -> Value {
        let Some(page) = self.site.pages.get(&self.current_url) else {
            return json!({ "result": { "type": "object", "value": {
                "title": "", "url": self.current_url, "content": "", "nextChapterUrl": null
            }}});
        };
        if page.throws {
            return json!({
                "result": { "type": "object", "subtype": "error" },
                "exceptionDetails": {
                    "text": "Uncaught",
                    "exception": { "description": "TypeError: Cannot read properties of null" }
                }
            });
        }
        json!({ "result": { "type": "object", "value": {
            "title": page.title,
            "url": self.current_url,
            "content": page.content,
            "nextChapterUrl": page.next,
        }}})
    }
}

#[async_trait]
impl Transport for BrowserTransport {
    async fn send_text(&mut self, text: String) -> Result<()> {
        let request: Value = serde_json::from_str(&text)?;
        let id = request["id"].as_u64().unwrap_or_default();
        let method = request["method"].as_str().unwrap_or_default().to_string();

        match method.as_str() {
            "Page.enable" => self.reply(id, json!({})),
            "Page.navigate" => {
                let url = request["params"]["url"].as_str().unwrap_or_default().to_string();
                self.log.navigations.lock().unwrap().push(url.clone());
                self.emit("Page.frameStartedLoading", json!({ "frameId": "F1" }));
                match self.site.pages.get(&url).cloned() {
                    Some(page) => {
                        self.current_url = url;
                        self.reply(id, json!({ "frameId": "F1", "loaderId": "L1" }));
                        if !page.never_loads {
                            self.emit("Page.loadEventFired", json!({ "timestamp": 1.0 }));
                        }
                    }
                    None => self.reply(
                        id,
                        json!({ "frameId": "F1", "errorText": "net::ERR_NAME_NOT_RESOLVED" }),
                    ),
                }
            }
            "Runtime.evaluate" => {
                let result = self.evaluate();
                self.reply(id, result);
            }
            _ => {
                let error = json!({
                    "code": -32601,
                    "message": format!("'{}' wasn't found", method),
                });
                self.outbox.push_back(json!({ "id": id, "error": error }).to_string());
            }
        }
        Ok(())
    }

    async fn recv_text(&mut self) -> Result<Option<String>> {
        match self.outbox.pop_front() {
            Some(frame) => Ok(Some(frame)),
            None => futures::future::pending().await,
        }
    }

    async fn close(&mut self) -> Result<()> {
        self.log.sessions_closed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// A debug port backed by a [`FakeSite`]
pub(crate) struct FakeDebugPort {
    site: Arc<FakeSite>,
    pub log: Arc<BrowserLog>,
    tabs: Mutex<Vec<Tab>>,
    next_tab: AtomicUsize,
    unreachable: bool,
    /// `new_tab` fails with a connection error once this many tabs were created
    tab_budget: Option<usize>,
    tabs_created: AtomicUsize,
}

impl FakeDebugPort {
    pub fn new(site: FakeSite) -> Self {
        Self {
            site: Arc::new(site),
            log: Arc::new(BrowserLog::default()),
            tabs: Mutex::new(Vec::new()),
            next_tab: AtomicUsize::new(1),
            unreachable: false,
            tab_budget: None,
            tabs_created: AtomicUsize::new(0),
        }
    }

    pub fn unreachable() -> Self {
        Self {
            unreachable: true,
            ..Self::new(FakeSite::new())
        }
    }

    /// Simulate the browser going away after `n` tabs were opened
    pub fn failing_after(mut self, n: usize) -> Self {
        self.tab_budget = Some(n);
        self
    }

    /// Pretend a tab is already open at `url`
    pub fn with_open_tab(self, url: &str) -> Self {
        let tab = self.make_tab(url);
        self.tabs.lock().unwrap().push(tab);
        self
    }

    fn make_tab(&self, url: &str) -> Tab {
        let n = self.next_tab.fetch_add(1, Ordering::SeqCst);
        Tab {
            id: format!("TAB{}", n),
            kind: "page".to_string(),
            title: String::new(),
            url: url.to_string(),
            web_socket_debugger_url: Some(format!("ws://fake/devtools/page/TAB{}", n)),
        }
    }

    fn check_reachable(&self) -> Result<()> {
        if self.unreachable {
            return Err(ScrapeError::Connection {
                endpoint: "http://127.0.0.1:9222".to_string(),
                reason: "connection refused".to_string(),
            });
        }
        Ok(())
    }

    pub fn open_tab_count(&self) -> usize {
        self.tabs.lock().unwrap().len()
    }
}

#[async_trait]
impl DebugPort for FakeDebugPort {
    async fn list_tabs(&self) -> Result<Vec<Tab>> {
        self.check_reachable()?;
        Ok(self.tabs.lock().unwrap().clone())
    }

    async fn new_tab(&self, url: &str) -> Result<Tab> {
        self.check_reachable()?;
        let created = self.tabs_created.fetch_add(1, Ordering::SeqCst);
        if self.tab_budget.is_some_and(|budget| created >= budget) {
            return Err(ScrapeError::Connection {
                endpoint: "http://127.0.0.1:9222/json/new".to_string(),
                reason: "connection reset".to_string(),
            });
        }
        let tab = self.make_tab(url);
        self.tabs.lock().unwrap().push(tab.clone());
        Ok(tab)
    }

    async fn close_tab(&self, id: &str) -> Result<()> {
        self.check_reachable()?;
        self.tabs.lock().unwrap().retain(|t| t.id != id);
        self.log.tabs_closed.lock().unwrap().push(id.to_string());
        Ok(())
    }

    async fn connect(&self, tab: &Tab) -> Result<Session> {
        self.check_reachable()?;
        self.log.sessions_opened.fetch_add(1, Ordering::SeqCst);
        let transport = BrowserTransport::new(self.site.clone(), self.log.clone());
        Ok(Session::new(tab.id.clone(), Box::new(transport)))
    }
}
