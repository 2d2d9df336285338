//! Playlist provider abstraction
//!
//! A provider supplies the ordered list of media descriptors the scheduler
//! loops over. The standard implementation queries the remote listing and
//! falls back to an on-device file when the listing is unreachable or
//! empty.

use crate::client::PlaylistClient;
use crate::error::Result;
use crate::fallback::load_fallback;
use crate::models::MediaDescriptor;
use async_trait::async_trait;
use std::path::PathBuf;

/// Source of the ordered media playlist
#[async_trait]
pub trait PlaylistProvider: Send + Sync {
    /// Return the ordered playlist
    ///
    /// An empty list is a valid answer; deciding whether that is fatal
    /// belongs to the caller.
    async fn get_playlist(&self) -> Result<Vec<MediaDescriptor>>;
}

/// Remote listing with an on-device fallback
///
/// The fallback file is consulted only when the remote endpoint is
/// unreachable, returns an error status, or yields an empty list.
pub struct RemotePlaylistProvider {
    client: PlaylistClient,
    fallback_path: Option<PathBuf>,
}

impl RemotePlaylistProvider {
    /// Create a provider without a fallback file
    pub fn new(client: PlaylistClient) -> Self {
        Self {
            client,
            fallback_path: None,
        }
    }

    /// Create a provider with an on-device fallback file
    pub fn with_fallback(client: PlaylistClient, fallback_path: impl Into<PathBuf>) -> Self {
        Self {
            client,
            fallback_path: Some(fallback_path.into()),
        }
    }

    fn fallback(&self) -> Result<Vec<MediaDescriptor>> {
        match &self.fallback_path {
            Some(path) => load_fallback(path),
            None => Ok(Vec::new()),
        }
    }
}

#[async_trait]
impl PlaylistProvider for RemotePlaylistProvider {
    async fn get_playlist(&self) -> Result<Vec<MediaDescriptor>> {
        match self.client.fetch_playlist().await {
            Ok(items) if !items.is_empty() => Ok(items),
            Ok(_) => {
                tracing::warn!("Remote listing is empty, using fallback playlist");
                self.fallback()
            }
            Err(err) => {
                tracing::warn!(error = %err, "Remote listing unavailable, using fallback playlist");
                self.fallback()
            }
        }
    }
}

/// Fixed in-memory playlist
///
/// Useful for hosts with a static rotation and for tests.
pub struct StaticPlaylist {
    items: Vec<MediaDescriptor>,
}

impl StaticPlaylist {
    /// Create a provider serving a fixed list
    pub fn new(items: Vec<MediaDescriptor>) -> Self {
        Self { items }
    }
}

#[async_trait]
impl PlaylistProvider for StaticPlaylist {
    async fn get_playlist(&self) -> Result<Vec<MediaDescriptor>> {
        Ok(self.items.clone())
    }
}
