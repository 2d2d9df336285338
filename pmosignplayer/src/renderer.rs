//! Interface du renderer
//!
//! Le renderer est le collaborateur externe qui affiche réellement un média
//! sur la surface du panneau. Le scheduler lui fournit un fichier local
//! déjà publié par le cache et une durée demandée ; le renderer signale la
//! fin naturelle ou l'échec via un channel valable pour un seul cycle
//! d'affichage.

use crate::error::Result;
use async_trait::async_trait;
use pmomediasource::MediaKind;
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::mpsc;

/// Un média local prêt à être affiché
#[derive(Debug, Clone)]
pub struct ReadyAsset {
    /// Chemin du fichier local publié par le cache
    pub path: PathBuf,
    /// Type de média
    pub kind: MediaKind,
    /// Durée d'affichage demandée (borne supérieure pour une vidéo)
    pub duration: Duration,
}

/// Événement émis par le renderer pendant un cycle d'affichage
///
/// Au plus un événement est pris en compte par cycle : le premier signal
/// gagne, les suivants sont ignorés par le scheduler.
#[derive(Debug, Clone)]
pub enum RendererEvent {
    /// Fin naturelle du média (vidéo arrivée à son terme)
    Completed,
    /// Échec de décodage ou d'affichage
    Failed(String),
}

/// Interface du renderer consommée par le scheduler
///
/// `show` démarre l'affichage et retourne la durée intrinsèque du média si
/// elle est connue (vidéo), `None` sinon (image). Les signaux de fin
/// arrivent ensuite sur le channel `events`, créé par le scheduler pour ce
/// cycle uniquement : un signal tardif d'un ancien cycle tombe dans un
/// channel fermé et reste sans effet.
#[async_trait]
pub trait Renderer: Send + Sync {
    /// Démarre l'affichage d'un média
    ///
    /// Une erreur immédiate (fichier manquant, décodage impossible) est
    /// retournée ici ; un échec ultérieur passe par `events`.
    async fn show(
        &self,
        asset: &ReadyAsset,
        events: mpsc::Sender<RendererEvent>,
    ) -> Result<Option<Duration>>;

    /// Fige l'affichage en cours
    async fn pause(&self);

    /// Reprend un affichage figé
    async fn resume(&self);

    /// Libère les ressources d'affichage
    async fn stop(&self);
}

/// Renderer de journalisation, sans surface d'affichage
///
/// N'annonce aucune durée intrinsèque et n'émet aucun événement :
/// l'avancement est entièrement piloté par le timer de durée du scheduler.
/// Utilisé par le binaire hôte en attendant une vraie surface, et par les
/// tests.
#[derive(Debug, Default)]
pub struct LogRenderer;

impl LogRenderer {
    /// Crée un nouveau renderer de journalisation
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Renderer for LogRenderer {
    async fn show(
        &self,
        asset: &ReadyAsset,
        _events: mpsc::Sender<RendererEvent>,
    ) -> Result<Option<Duration>> {
        tracing::info!(
            path = %asset.path.display(),
            kind = ?asset.kind,
            duration_ms = asset.duration.as_millis() as u64,
            "Displaying media"
        );
        Ok(None)
    }

    async fn pause(&self) {
        tracing::debug!("Renderer paused");
    }

    async fn resume(&self) {
        tracing::debug!("Renderer resumed");
    }

    async fn stop(&self) {
        tracing::debug!("Renderer stopped");
    }
}
