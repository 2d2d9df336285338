//! Types d'erreurs pour pmosignplayer

/// Erreurs du lecteur
///
/// Les échecs par élément (téléchargement, affichage) sont absorbés par la
/// boucle de lecture et convertis en avancement ; seules les conditions qui
/// invalident la boucle entière remontent à l'hôte.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// La playlist est vide : erreur de configuration, la boucle ne démarre pas
    #[error("Playlist is empty: nothing to display")]
    EmptyPlaylist,

    /// Le renderer a signalé un échec d'affichage
    #[error("Render failed: {0}")]
    RenderFailed(String),

    /// Erreur du cache de médias
    #[error("Cache error: {0}")]
    Cache(#[from] pmomediacache::Error),

    /// Erreur du fournisseur de playlist
    #[error("Playlist error: {0}")]
    Playlist(#[from] pmomediasource::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Type Result spécialisé pour pmosignplayer
pub type Result<T> = std::result::Result<T, Error>;
