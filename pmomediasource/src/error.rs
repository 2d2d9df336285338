//! Error types for the playlist provider

/// Result type alias for playlist operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while loading the playlist
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed
    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    /// Fallback file parsing failed
    #[error("Fallback parsing failed: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Listing endpoint returned an error status
    #[error("API error: {0}")]
    Api(String),
}

impl Error {
    /// Create an API error
    pub fn api_error(msg: impl Into<String>) -> Self {
        Self::Api(msg.into())
    }
}
