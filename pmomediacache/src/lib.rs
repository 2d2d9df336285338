//! # pmomediacache - Cache de médias pour PMOSignage
//!
//! Cette crate fournit le cache de contenu du lecteur d'affichage : chaque
//! URI distante est téléchargée au plus une fois, stockée sur disque sous un
//! nom dérivé de l'URI, et exposée via une requête synchrone « est-ce prêt ? ».
//!
//! ## Vue d'ensemble
//!
//! `pmomediacache` fournit les composants de base pour :
//! - Dériver un nom de fichier stable et sûr à partir d'une URI source
//! - Télécharger les médias en tâche de fond, au plus une fois par URI
//! - Partager le résultat d'un téléchargement entre tous les appelants
//! - Purger le cache et mesurer sa taille
//!
//! ## Architecture
//!
//! ```text
//! pmomediacache
//!     ├── key.rs       - Dérivation des clés et extensions
//!     ├── download.rs  - Téléchargement en tâche de fond
//!     └── cache.rs     - Cache de fichiers médias
//! ```
//!
//! ## Utilisation
//!
//! ```rust,no_run
//! use pmomediacache::MediaCache;
//!
//! #[tokio::main]
//! async fn main() -> pmomediacache::Result<()> {
//!     let cache = MediaCache::new("./media_cache")?;
//!
//!     // Vérification locale, jamais bloquante
//!     assert!(!cache.is_cached("https://example.com/spot.mp4"));
//!
//!     // Télécharge si nécessaire, s'attache si déjà en cours
//!     let path = cache.ensure_cached("https://example.com/spot.mp4").await?;
//!     println!("Media stocké à: {:?}", path);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Structure des fichiers
//!
//! ```text
//! media_cache/
//! ├── 1a2b3c4d....jpg               # Image publiée
//! ├── 5e6f7a8b....mp4               # Vidéo publiée
//! └── 9c0d1e2f....mp4.part          # Téléchargement en cours
//! ```
//!
//! Un fichier n'est visible sous son nom final qu'après un téléchargement
//! complet : l'écriture passe par un fichier `.part` renommé atomiquement.
//!
//! ## Dépendances principales
//!
//! - `reqwest` : Téléchargement HTTP
//! - `sha2` / `hex` : Génération des clés
//! - `tokio` : Runtime asynchrone

pub mod cache;
pub mod download;
pub mod error;
pub mod key;

pub use cache::MediaCache;
pub use download::{download, Download};
pub use error::{Error, Result};
pub use key::{cache_filename, cache_key};
