//! Téléchargement des médias en tâche de fond
//!
//! Chaque téléchargement écrit dans un fichier temporaire `{final}.part`
//! puis publie le résultat par un rename atomique : le chemin final n'est
//! jamais visible avant la fin complète du téléchargement, et aucun fichier
//! partiel ne survit à un échec.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

/// État interne du téléchargement
#[derive(Debug, Clone)]
struct DownloadState {
    /// Indique si le téléchargement est terminé
    finished: bool,
    /// Erreur éventuelle lors du téléchargement
    error: Option<String>,
}

/// Objet représentant un téléchargement en cours
///
/// L'état est partagé entre la tâche de téléchargement et tous les
/// appelants en attente : chacun observe le même succès ou le même échec.
#[derive(Debug)]
pub struct Download {
    /// État partagé entre le téléchargement et les attentes
    state: Arc<RwLock<DownloadState>>,
}

impl Download {
    /// Crée une nouvelle instance de Download
    fn new() -> Arc<Self> {
        Arc::new(Self {
            state: Arc::new(RwLock::new(DownloadState {
                finished: false,
                error: None,
            })),
        })
    }

    /// Attend que le téléchargement soit complètement terminé
    ///
    /// Tous les appelants en attente reçoivent le même résultat.
    pub async fn wait_until_finished(&self) -> Result<(), String> {
        loop {
            let state = self.state.read().await;

            // Vérifier s'il y a eu une erreur
            if let Some(ref error) = state.error {
                return Err(error.clone());
            }

            if state.finished {
                return Ok(());
            }

            drop(state); // Libérer le lock avant de dormir
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
    }
}

/// Chemin du fichier temporaire associé à un chemin final
pub(crate) fn temp_path(final_path: &Path) -> PathBuf {
    let mut name = final_path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".part");
    final_path.with_file_name(name)
}

/// Lance le téléchargement d'une URL vers un chemin final
///
/// Le contenu est écrit dans `{final}.part` puis renommé atomiquement vers
/// le chemin final une fois complet. En cas d'échec, le fichier temporaire
/// est supprimé et l'erreur est visible par tous les appelants en attente.
///
/// # Arguments
/// * `final_path` - Chemin de publication du fichier
/// * `url` - URL à télécharger
///
/// # Returns
/// Un `Arc<Download>` qui permet d'attendre la fin du téléchargement
pub fn download<P: AsRef<Path>>(final_path: P, url: &str) -> Arc<Download> {
    let final_path = final_path.as_ref().to_path_buf();
    let url = url.to_string();

    let download = Download::new();
    let state = Arc::clone(&download.state);

    // Lancer le téléchargement en tâche de fond
    tokio::spawn(async move {
        if let Err(e) = download_impl(final_path, url, state).await {
            tracing::warn!("Download error: {}", e);
        }
    });

    download
}

/// Implémentation du téléchargement
async fn download_impl(
    final_path: PathBuf,
    url: String,
    state: Arc<RwLock<DownloadState>>,
) -> Result<(), String> {
    let tmp_path = temp_path(&final_path);

    match fetch_to_file(&tmp_path, &url).await {
        Ok(()) => {
            // Publication atomique : le fichier final n'apparaît qu'une
            // fois complet
            if let Err(e) = tokio::fs::rename(&tmp_path, &final_path).await {
                let error = format!("Failed to publish file: {}", e);
                let _ = tokio::fs::remove_file(&tmp_path).await;
                let mut s = state.write().await;
                s.error = Some(error.clone());
                s.finished = true;
                return Err(error);
            }

            let mut s = state.write().await;
            s.finished = true;
            Ok(())
        }
        Err(error) => {
            // Aucun fichier partiel ne doit survivre à un échec
            let _ = tokio::fs::remove_file(&tmp_path).await;
            let mut s = state.write().await;
            s.error = Some(error.clone());
            s.finished = true;
            Err(error)
        }
    }
}

/// Télécharge l'URL dans le fichier temporaire
async fn fetch_to_file(tmp_path: &Path, url: &str) -> Result<(), String> {
    use futures_util::StreamExt;
    use tokio::io::AsyncWriteExt;

    // Créer le client HTTP
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(300))
        .build()
        .map_err(|e| e.to_string())?;

    // Lancer la requête
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| format!("Failed to fetch URL: {}", e))?;

    // Vérifier le statut
    if !response.status().is_success() {
        return Err(format!("HTTP error: {}", response.status()));
    }

    // Créer le fichier temporaire
    let mut file = tokio::fs::File::create(tmp_path)
        .await
        .map_err(|e| format!("Failed to create file: {}", e))?;

    let mut stream = response.bytes_stream();

    while let Some(chunk_result) = stream.next().await {
        let chunk = chunk_result.map_err(|e| format!("Failed to read chunk: {}", e))?;

        file.write_all(&chunk)
            .await
            .map_err(|e| format!("Failed to write to file: {}", e))?;
    }

    file.flush()
        .await
        .map_err(|e| format!("Failed to flush file: {}", e))?;

    Ok(())
}
