use std::sync::Arc;

use crate::app::error::Result;
use crate::config::Config;
use crate::crawler::Crawler;
use crate::devtools::{DebugPort, DebugPortClient};
use crate::store::FileStore;

pub struct AppContext {
    pub config: Config,
    pub port: Arc<dyn DebugPort>,
    pub store: FileStore,
}

impl AppContext {
    pub fn new(config: Config) -> Result<Self> {
        let port: Arc<dyn DebugPort> = Arc::new(DebugPortClient::new(&config.devtools)?);
        Ok(Self::with_port(config, port))
    }

    /// Build a context around an existing debug port, e.g. a fake one in tests.
    pub fn with_port(config: Config, port: Arc<dyn DebugPort>) -> Self {
        let store = FileStore::new(config.output.chapters_dir.clone());
        Self {
            config,
            port,
            store,
        }
    }

    pub fn crawler(&self) -> Result<Crawler> {
        Crawler::new(
            self.port.clone(),
            &self.config.scraper,
            self.config.crawler.clone(),
        )
    }
}
