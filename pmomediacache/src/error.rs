//! Types d'erreurs pour pmomediacache

/// Erreurs du cache de médias
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Le téléchargement a échoué (réseau, statut HTTP, écriture disque).
    /// Jamais réessayé par le cache lui-même : la politique de reprise
    /// appartient à l'appelant.
    #[error("Fetch failed for {uri}: {reason}")]
    FetchFailed { uri: String, reason: String },

    /// Le répertoire du cache est inaccessible
    #[error("Cache IO error: {0}")]
    CacheIo(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Type Result spécialisé pour pmomediacache
pub type Result<T> = std::result::Result<T, Error>;
