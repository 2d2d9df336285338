//! # pmosignplayer - Boucle de lecture pour PMOSignage
//!
//! Cette crate implémente le séquenceur de lecture du panneau d'affichage :
//! il parcourt la playlist en boucle, demande chaque média au cache, le
//! confie au renderer pour la durée calculée, et avance (y compris sur
//! échec) sans jamais bloquer la rotation.
//!
//! ## Architecture
//!
//! ```text
//! pmosignplayer
//!     ├── scheduler.rs  - Machine à états et boucle de contrôle
//!     ├── renderer.rs   - Interface du renderer + LogRenderer
//!     ├── events.rs     - Événements publiés (compte à rebours, skips)
//!     └── countdown.rs  - Calcul et format mm:ss du temps restant
//! ```
//!
//! Une seule tâche de contrôle possède l'état de lecture ; le renderer, les
//! timers et les commandes communiquent avec elle exclusivement par
//! channels.
//!
//! ## Utilisation
//!
//! ```rust,no_run
//! use pmomediacache::MediaCache;
//! use pmomediasource::{PlaylistClient, RemotePlaylistProvider};
//! use pmosignplayer::{LogRenderer, Scheduler, SchedulerConfig};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let cache = Arc::new(MediaCache::new("./media_cache")?);
//!     let client = PlaylistClient::new("http://localhost:8080/")?;
//!     let provider = Arc::new(RemotePlaylistProvider::new(client));
//!
//!     let scheduler = Scheduler::new(
//!         cache,
//!         provider,
//!         LogRenderer::new(),
//!         SchedulerConfig::default(),
//!     );
//!     let handle = scheduler.handle();
//!
//!     tokio::spawn(async move {
//!         tokio::time::sleep(std::time::Duration::from_secs(60)).await;
//!         handle.stop().await;
//!     });
//!
//!     scheduler.run().await?;
//!     Ok(())
//! }
//! ```

pub mod countdown;
pub mod error;
pub mod events;
pub mod renderer;
pub mod scheduler;

pub use countdown::{format_remaining, remaining_until};
pub use error::{Error, Result};
pub use events::{CountdownTick, EventPublisher, ItemSkipped, ItemStarted, PlayerEvent};
pub use renderer::{LogRenderer, ReadyAsset, Renderer, RendererEvent};
pub use scheduler::{Scheduler, SchedulerConfig, SchedulerHandle};
