use async_trait::async_trait;
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::app::{Result, ScrapeError};
use crate::devtools::{DebugPort, DevtoolsConfig, Session, Tab, WsTransport};

/// REST client for the browser's `/json` endpoints
pub struct DebugPortClient {
    client: Client,
    base: Url,
}

impl DebugPortClient {
    pub fn new(config: &DevtoolsConfig) -> Result<Self> {
        let base = Url::parse(&config.base_url())?;
        let client = Client::builder().timeout(config.http_timeout()).build()?;

        Ok(Self { client, base })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(self.base.join(path)?)
    }

    async fn call<T: DeserializeOwned>(&self, method: Method, url: Url) -> Result<T> {
        debug!(%method, %url, "debug port request");
        let response = self
            .client
            .request(method, url)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let response = response.error_for_status()?;
        Ok(response.json::<T>().await?)
    }

    /// Failing to reach the port at all is fatal; anything else is plain HTTP.
    fn classify(&self, error: reqwest::Error) -> ScrapeError {
        if error.is_connect() || error.is_timeout() {
            ScrapeError::Connection {
                endpoint: self.base.to_string(),
                reason: error.to_string(),
            }
        } else {
            ScrapeError::Http(error)
        }
    }
}

#[async_trait]
impl DebugPort for DebugPortClient {
    async fn list_tabs(&self) -> Result<Vec<Tab>> {
        let url = self.endpoint("/json/list")?;
        self.call(Method::GET, url).await
    }

    async fn new_tab(&self, target: &str) -> Result<Tab> {
        let mut url = self.endpoint("/json/new")?;
        url.set_query(Some(target));
        // Chromium refuses GET here since version 111
        self.call(Method::PUT, url).await
    }

    async fn close_tab(&self, id: &str) -> Result<()> {
        let url = self.endpoint(&format!("/json/close/{}", id))?;
        debug!(%url, "closing tab");
        self.client
            .get(url)
            .send()
            .await
            .map_err(|e| self.classify(e))?
            .error_for_status()?;
        Ok(())
    }

    async fn connect(&self, tab: &Tab) -> Result<Session> {
        let ws_url = tab
            .web_socket_debugger_url
            .as_deref()
            .ok_or_else(|| ScrapeError::Connection {
                endpoint: self.base.to_string(),
                reason: format!("tab {} has no websocket URL (another debugger attached?)", tab.id),
            })?;

        let transport = WsTransport::connect(ws_url).await?;
        Ok(Session::new(tab.id.clone(), Box::new(transport)))
    }
}
