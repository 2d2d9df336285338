//! Cache de fichiers médias sur disque
//!
//! Ce module associe chaque URI source à un fichier local, téléchargé au
//! plus une fois quel que soit le nombre d'appelants concurrents. Un
//! fichier n'est présent dans le cache que sous sa forme complète : les
//! téléchargements en cours écrivent dans un fichier `.part` invisible des
//! lecteurs.

use crate::download::{download, temp_path, Download};
use crate::error::{Error, Result};
use crate::key::cache_filename;
use std::collections::{HashMap, HashSet};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Cache de médias pour le lecteur d'affichage
///
/// Gère le téléchargement et le stockage des médias référencés par la
/// playlist. Le cache n'a aucune politique d'éviction : la playlist d'un
/// panneau est petite et stable, les entrées ne sont supprimées que par
/// [`clear`](MediaCache::clear).
///
/// Note : Ce type est conçu pour être partagé derrière un `Arc<MediaCache>`
/// entre le scheduler et ses tâches de préchargement. La map des
/// téléchargements en cours est la seule donnée partagée entre les tâches
/// et est protégée par un RwLock ; aucune E/S n'est faite sous ce verrou.
pub struct MediaCache {
    /// Répertoire de stockage
    dir: PathBuf,
    /// Map des téléchargements en cours (nom de fichier -> Download)
    downloads: Arc<RwLock<HashMap<String, Arc<Download>>>>,
}

impl MediaCache {
    /// Crée un nouveau cache dans le répertoire donné
    ///
    /// Le répertoire est créé s'il n'existe pas. Un répertoire qui ne peut
    /// pas être créé est une erreur fatale dès la construction.
    pub fn new(dir: impl AsRef<Path>) -> Result<Self> {
        let directory = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&directory)?;

        Ok(Self {
            dir: directory,
            downloads: Arc::new(RwLock::new(HashMap::new())),
        })
    }

    /// Retourne le répertoire du cache
    pub fn cache_dir(&self) -> &Path {
        &self.dir
    }

    /// Chemin local dérivé d'une URI source
    pub fn media_path(&self, uri: &str) -> PathBuf {
        self.dir.join(cache_filename(uri))
    }

    /// Indique si une URI est déjà présente dans le cache
    ///
    /// Vérification purement locale : aucun accès réseau, jamais bloquante.
    /// Un téléchargement en cours écrit dans un fichier `.part` et n'est
    /// donc pas considéré comme présent.
    pub fn is_cached(&self, uri: &str) -> bool {
        self.media_path(uri).exists()
    }

    /// Garantit qu'une URI est présente dans le cache et retourne son chemin
    ///
    /// # Workflow
    ///
    /// 1. Si le fichier est déjà publié, retourne immédiatement sans réseau.
    /// 2. Si un téléchargement est en cours pour cette URI, s'y attache :
    ///    aucun second téléchargement n'est lancé et l'appelant reçoit le
    ///    même résultat que l'initiateur.
    /// 3. Sinon, réclame la clé dans la map des téléchargements (re-vérifiée
    ///    sous le verrou en écriture) et lance le téléchargement.
    ///
    /// La clé est libérée par une tâche de fond dès que le téléchargement
    /// se termine, même si plus aucun appelant n'attend le résultat : un
    /// appelant annulé laisse le téléchargement se terminer en arrière-plan.
    /// Après un échec, la clé est immédiatement rééligible à un nouvel essai.
    pub async fn ensure_cached(&self, uri: &str) -> Result<PathBuf> {
        let path = self.media_path(uri);
        if path.exists() {
            return Ok(path);
        }

        let filename = cache_filename(uri);

        // S'attacher à un téléchargement déjà en cours
        if let Some(existing) = self.downloads.read().await.get(&filename).cloned() {
            tracing::debug!(uri, "Attaching to in-flight download");
            return await_download(uri, &path, existing).await;
        }

        // Un téléchargement a pu se terminer et publier le fichier entre la
        // première vérification et maintenant
        if path.exists() {
            return Ok(path);
        }

        let download = {
            let mut downloads = self.downloads.write().await;
            if let Some(existing) = downloads.get(&filename).cloned() {
                // Un autre appelant a réclamé la clé entre-temps
                existing
            } else {
                tracing::debug!(uri, file = %filename, "Starting download");
                let download = download(&path, uri);
                downloads.insert(filename.clone(), download.clone());

                // Libérer la clé à la fin du téléchargement, qu'un appelant
                // attende encore le résultat ou non
                let downloads_map = self.downloads.clone();
                let finished = download.clone();
                tokio::spawn(async move {
                    let _ = finished.wait_until_finished().await;
                    downloads_map.write().await.remove(&filename);
                });

                download
            }
        };

        await_download(uri, &path, download).await
    }

    /// Supprime les fichiers du cache
    ///
    /// Les fichiers réclamés par un téléchargement en cours (fichier final
    /// et fichier `.part`) sont conservés : leur suppression est différée
    /// plutôt que de tirer le tapis sous une écriture en cours.
    pub async fn clear(&self) -> Result<()> {
        // Noms réclamés par les téléchargements en cours
        let claimed: HashSet<OsString> = {
            let downloads = self.downloads.read().await;
            downloads
                .keys()
                .flat_map(|name| {
                    let final_name = OsString::from(name.clone());
                    let part_name = temp_path(Path::new(name)).into_os_string();
                    [final_name, part_name]
                })
                .collect()
        };

        let mut removed = 0usize;
        let mut deferred = 0usize;

        let mut entries = tokio::fs::read_dir(&self.dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            if !entry.path().is_file() {
                continue;
            }
            if claimed.contains(&entry.file_name()) {
                deferred += 1;
                continue;
            }
            tokio::fs::remove_file(entry.path()).await?;
            removed += 1;
        }

        if deferred > 0 {
            tracing::warn!(removed, deferred, "Cache cleared with downloads in flight");
        } else {
            tracing::info!(removed, "Cache cleared");
        }

        Ok(())
    }

    /// Taille totale du cache en octets
    ///
    /// Valeur indicative seulement : le cache n'applique aucune limite ni
    /// éviction.
    pub async fn size_bytes(&self) -> Result<u64> {
        let mut size = 0u64;

        let mut entries = tokio::fs::read_dir(&self.dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            if entry.path().is_file() {
                size += entry.metadata().await?.len();
            }
        }

        Ok(size)
    }
}

/// Attend la fin d'un téléchargement et convertit son issue
async fn await_download(uri: &str, path: &Path, download: Arc<Download>) -> Result<PathBuf> {
    match download.wait_until_finished().await {
        Ok(()) => Ok(path.to_path_buf()),
        Err(reason) => Err(Error::FetchFailed {
            uri: uri.to_string(),
            reason,
        }),
    }
}
