//! # pmomediasource
//!
//! Playlist provider for the PMOSignage media player.
//!
//! This crate knows where the rotation comes from: a remote listing
//! endpoint serving a JSON array of media entries, with an on-device YAML
//! fallback used when the endpoint is unreachable or empty. It produces the
//! immutable [`MediaDescriptor`] values the playback scheduler loops over,
//! applying the default display durations (5 s for images, 15 s for
//! videos) when the listing does not carry an explicit one.
//!
//! # Example
//!
//! ```no_run
//! use pmomediasource::{PlaylistClient, PlaylistProvider, RemotePlaylistProvider};
//!
//! #[tokio::main]
//! async fn main() -> pmomediasource::Result<()> {
//!     let client = PlaylistClient::new("http://localhost:8080/")?;
//!     let provider = RemotePlaylistProvider::with_fallback(client, "playlist.yaml");
//!
//!     for item in provider.get_playlist().await? {
//!         println!("{} ({:?}, {:?})", item.source_uri(), item.kind(), item.duration());
//!     }
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod error;
pub mod fallback;
pub mod models;
pub mod provider;

pub use client::{ClientBuilder, PlaylistClient};
pub use error::{Error, Result};
pub use fallback::load_fallback;
pub use models::{
    MediaDescriptor, MediaItemEntry, MediaKind, DEFAULT_IMAGE_DURATION, DEFAULT_VIDEO_DURATION,
};
pub use provider::{PlaylistProvider, RemotePlaylistProvider, StaticPlaylist};
