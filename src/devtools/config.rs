use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Where the browser's debug port listens
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DevtoolsConfig {
    /// Host of the debug port (default: 127.0.0.1)
    pub host: String,

    /// Remote debugging port (default: 9222)
    pub port: u16,

    /// Timeout for REST calls against the debug port in seconds (default: 10)
    pub http_timeout_secs: u64,
}

impl Default for DevtoolsConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 9222,
            http_timeout_secs: 10,
        }
    }
}

impl DevtoolsConfig {
    /// Base URL of the REST surface, e.g. `http://127.0.0.1:9222`
    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}
