//! Browser remote-debugging plumbing.
//!
//! # Architecture
//!
//! ```text
//! DebugPort (REST: list/new/close tabs) → Session (websocket, id matching) → Transport
//! ```
//!
//! The browser is expected to be running already with
//! `--remote-debugging-port`; nothing here launches it.

mod client;
mod config;
mod session;
mod transport;

#[cfg(test)]
pub(crate) mod fake;

pub use client::DebugPortClient;
pub use config::DevtoolsConfig;
pub use session::{ProtocolEvent, Session};
pub use transport::{Transport, WsTransport};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::app::Result;

/// A browser target as reported by the debug port's `/json` endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tab {
    pub id: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
    /// Absent while another client is attached to the tab
    #[serde(default)]
    pub web_socket_debugger_url: Option<String>,
}

impl Tab {
    pub fn is_page(&self) -> bool {
        self.kind == "page"
    }
}

/// Tab management on the browser's debug port.
///
/// Implemented over HTTP by [`DebugPortClient`]; the crawler only talks to
/// this trait.
#[async_trait]
pub trait DebugPort: Send + Sync {
    /// Enumerate open targets
    async fn list_tabs(&self) -> Result<Vec<Tab>>;

    /// Open a new tab at `url`
    async fn new_tab(&self, url: &str) -> Result<Tab>;

    /// Close a tab by id
    async fn close_tab(&self, id: &str) -> Result<()>;

    /// Open a protocol session on the tab's websocket
    async fn connect(&self, tab: &Tab) -> Result<Session>;
}
