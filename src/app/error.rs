use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScrapeError {
    #[error("Cannot reach browser debug port at {endpoint}: {reason}")]
    Connection { endpoint: String, reason: String },

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Extraction failed: {0}")]
    Extraction(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ScrapeError {
    /// Errors that end the whole run rather than a single page.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ScrapeError::Connection { .. })
    }
}

pub type Result<T> = std::result::Result<T, ScrapeError>;
