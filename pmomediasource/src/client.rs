//! HTTP client for the remote media listing
//!
//! The listing endpoint returns the whole playlist as a JSON array:
//!
//! ```json
//! [
//!   {"url": "https://cdn.example.com/welcome.jpg", "type": "image", "durationInSeconds": 5},
//!   {"url": "https://cdn.example.com/spot.mp4", "type": "video"}
//! ]
//! ```
//!
//! # Example
//!
//! ```no_run
//! use pmomediasource::PlaylistClient;
//!
//! #[tokio::main]
//! async fn main() -> pmomediasource::Result<()> {
//!     let client = PlaylistClient::new("http://localhost:8080/")?;
//!     let playlist = client.fetch_playlist().await?;
//!     println!("{} item(s) in rotation", playlist.len());
//!     Ok(())
//! }
//! ```

use crate::error::{Error, Result};
use crate::models::{MediaDescriptor, MediaItemEntry};
use reqwest::Client;
use std::time::Duration;

/// Default timeout for listing requests (30 seconds)
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Default User-Agent
pub const DEFAULT_USER_AGENT: &str = "PMOSignage/0.1 (pmomediasource)";

/// Client for the remote playlist endpoint
///
/// The client is stateless and does not cache responses internally; fallback
/// handling lives in
/// [`RemotePlaylistProvider`](crate::provider::RemotePlaylistProvider).
#[derive(Debug, Clone)]
pub struct PlaylistClient {
    client: Client,
    listing_url: String,
}

impl PlaylistClient {
    /// Create a new client with default settings
    pub fn new(listing_url: impl Into<String>) -> Result<Self> {
        Self::builder(listing_url).build()
    }

    /// Create a builder for configuring the client
    pub fn builder(listing_url: impl Into<String>) -> ClientBuilder {
        ClientBuilder {
            listing_url: listing_url.into(),
            timeout: None,
        }
    }

    /// Get the listing URL
    pub fn listing_url(&self) -> &str {
        &self.listing_url
    }

    /// Fetch the media listing and convert it to descriptors
    ///
    /// The returned order is the playback order.
    pub async fn fetch_playlist(&self) -> Result<Vec<MediaDescriptor>> {
        tracing::debug!(url = %self.listing_url, "Fetching media listing");

        let response = self.client.get(&self.listing_url).send().await?;

        if !response.status().is_success() {
            return Err(Error::api_error(format!(
                "Server error: {}",
                response.status()
            )));
        }

        let entries: Vec<MediaItemEntry> = response.json().await?;
        tracing::info!(count = entries.len(), "Loaded media listing");

        Ok(entries
            .into_iter()
            .map(MediaItemEntry::into_descriptor)
            .collect())
    }
}

/// Builder for [`PlaylistClient`]
#[derive(Debug)]
pub struct ClientBuilder {
    listing_url: String,
    timeout: Option<Duration>,
}

impl ClientBuilder {
    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build the client
    pub fn build(self) -> Result<PlaylistClient> {
        let timeout = self
            .timeout
            .unwrap_or(Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS));

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(DEFAULT_USER_AGENT)
            .build()?;

        Ok(PlaylistClient {
            client,
            listing_url: self.listing_url,
        })
    }
}
