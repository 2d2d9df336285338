//! Boucle de lecture du panneau d'affichage
//!
//! Le scheduler possède l'intégralité de l'état de lecture (index courant,
//! échéance, état) et le mute uniquement depuis sa propre tâche de
//! contrôle. Tous les événements externes (commandes de cycle de vie,
//! signaux du renderer, timers) sont rapatriés dans cette tâche via des
//! channels : aucun callback ne touche l'état directement.
//!
//! # Machine à états
//!
//! ```text
//! Idle → Prefetching → Displaying(0) → Advancing → Displaying(1) → ...
//!                          ↑  ↓
//!                   AwaitingAsset(i)   (élément pas encore en cache)
//! ```
//!
//! La boucle ne s'arrête jamais sur un échec d'élément : chaque échec se
//! termine par un avancement après une pause fixe. Seule une playlist vide
//! est fatale.

use crate::countdown::{format_remaining, remaining_until};
use crate::error::{Error, Result};
use crate::events::{CountdownTick, EventPublisher, ItemSkipped, ItemStarted};
use crate::renderer::{ReadyAsset, Renderer, RendererEvent};
use pmomediacache::MediaCache;
use pmomediasource::{MediaDescriptor, PlaylistProvider};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{sleep_until, Instant};

/// Paramètres temporels du scheduler
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Délai de grâce accordé au préchargement avant de démarrer la lecture
    pub prefetch_grace: Duration,
    /// Pause fixe après un échec avant d'avancer
    pub failure_backoff: Duration,
    /// Période d'émission du compte à rebours
    pub countdown_tick: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            prefetch_grace: Duration::from_millis(2000),
            failure_backoff: Duration::from_millis(1000),
            countdown_tick: Duration::from_millis(1000),
        }
    }
}

/// Commandes de cycle de vie acceptées par la boucle de contrôle
#[derive(Debug)]
enum Command {
    Pause,
    Resume,
    Stop,
}

/// Handle de contrôle du scheduler
///
/// Clonable ; toutes les commandes sont rapatriées sur la tâche de
/// contrôle, jamais appliquées depuis le contexte de l'appelant.
#[derive(Clone)]
pub struct SchedulerHandle {
    tx: mpsc::Sender<Command>,
}

impl SchedulerHandle {
    /// Fige la lecture en cours (valide pendant un affichage)
    pub async fn pause(&self) {
        let _ = self.tx.send(Command::Pause).await;
    }

    /// Reprend une lecture figée
    pub async fn resume(&self) {
        let _ = self.tx.send(Command::Resume).await;
    }

    /// Arrête le scheduler, depuis n'importe quel état
    pub async fn stop(&self) {
        let _ = self.tx.send(Command::Stop).await;
    }
}

/// État courant de la boucle de lecture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PlayerState {
    Idle,
    Prefetching,
    AwaitingAsset(usize),
    Displaying(usize),
    Advancing,
}

/// Issue d'une phase de la boucle
enum Outcome {
    Advance,
    Stopped,
}

/// Signal résolu par un tour de la boucle d'affichage
enum DisplaySignal {
    Elapsed,
    Completed,
    Failed(String),
    Detached,
    Command(Option<Command>),
    Tick,
}

/// Scheduler de lecture
///
/// Construit explicitement avec son cache, son fournisseur de playlist et
/// son renderer ; aucun état global. `run` consomme le scheduler et boucle
/// jusqu'à `stop`.
pub struct Scheduler<R: Renderer> {
    cache: Arc<MediaCache>,
    provider: Arc<dyn PlaylistProvider>,
    renderer: R,
    config: SchedulerConfig,
    state: PlayerState,
    commands: mpsc::Receiver<Command>,
    handle_tx: mpsc::Sender<Command>,
    countdown_events: EventPublisher<CountdownTick>,
    started_events: EventPublisher<ItemStarted>,
    skipped_events: EventPublisher<ItemSkipped>,
}

impl<R: Renderer> Scheduler<R> {
    /// Crée un nouveau scheduler
    pub fn new(
        cache: Arc<MediaCache>,
        provider: Arc<dyn PlaylistProvider>,
        renderer: R,
        config: SchedulerConfig,
    ) -> Self {
        let (handle_tx, commands) = mpsc::channel(16);

        Self {
            cache,
            provider,
            renderer,
            config,
            state: PlayerState::Idle,
            commands,
            handle_tx,
            countdown_events: EventPublisher::new(),
            started_events: EventPublisher::new(),
            skipped_events: EventPublisher::new(),
        }
    }

    /// Retourne un handle de contrôle (pause/resume/stop)
    pub fn handle(&self) -> SchedulerHandle {
        SchedulerHandle {
            tx: self.handle_tx.clone(),
        }
    }

    /// S'abonne aux ticks du compte à rebours
    pub fn subscribe_countdown(&mut self, tx: mpsc::Sender<CountdownTick>) {
        self.countdown_events.subscribe(tx);
    }

    /// S'abonne aux démarrages d'éléments
    pub fn subscribe_started(&mut self, tx: mpsc::Sender<ItemStarted>) {
        self.started_events.subscribe(tx);
    }

    /// S'abonne aux éléments sautés
    pub fn subscribe_skipped(&mut self, tx: mpsc::Sender<ItemSkipped>) {
        self.skipped_events.subscribe(tx);
    }

    fn set_state(&mut self, state: PlayerState) {
        tracing::trace!(from = ?self.state, to = ?state, "State transition");
        self.state = state;
    }

    /// Exécute la boucle de lecture jusqu'à `stop`
    ///
    /// Retourne `Err(EmptyPlaylist)` si la playlist est vide : la boucle ne
    /// démarre pas et l'état halte est visible de l'hôte. Toute autre issue
    /// d'échec est absorbée par la boucle elle-même.
    pub async fn run(mut self) -> Result<()> {
        let playlist = self.provider.get_playlist().await?;
        if playlist.is_empty() {
            tracing::error!("Playlist is empty, refusing to start the playback loop");
            return Err(Error::EmptyPlaylist);
        }
        tracing::info!(items = playlist.len(), "Starting playback loop");

        if let Outcome::Stopped = self.prefetch(&playlist).await {
            self.renderer.stop().await;
            self.set_state(PlayerState::Idle);
            return Ok(());
        }

        let mut index = 0usize;
        loop {
            match self.play_item(&playlist, index).await {
                Outcome::Advance => {
                    self.set_state(PlayerState::Advancing);
                    index = (index + 1) % playlist.len();
                }
                Outcome::Stopped => {
                    self.renderer.stop().await;
                    self.set_state(PlayerState::Idle);
                    tracing::info!("Playback loop stopped");
                    return Ok(());
                }
            }
        }
    }

    /// Précharge toute la playlist, borné par le délai de grâce
    ///
    /// Chaque élément est résolu indépendamment : succès et échec comptent
    /// tous deux comme résolus, un échec sur l'élément k ne retarde jamais
    /// l'élément k+1. Les téléchargements encore en cours à l'expiration du
    /// délai de grâce continuent en arrière-plan et seront trouvés dans le
    /// cache au moment de leur affichage.
    async fn prefetch(&mut self, playlist: &[MediaDescriptor]) -> Outcome {
        self.set_state(PlayerState::Prefetching);
        let total = playlist.len();
        let (done_tx, mut done_rx) = mpsc::channel::<()>(total);

        for item in playlist {
            let cache = self.cache.clone();
            let uri = item.source_uri().to_string();
            let done = done_tx.clone();
            tokio::spawn(async move {
                match cache.ensure_cached(&uri).await {
                    Ok(path) => tracing::debug!(uri, path = %path.display(), "Prefetched"),
                    Err(err) => tracing::warn!(uri, error = %err, "Prefetch failed"),
                }
                let _ = done.send(()).await;
            });
        }
        drop(done_tx);

        let deadline = Instant::now() + self.config.prefetch_grace;
        let mut resolved = 0usize;

        loop {
            tokio::select! {
                maybe = done_rx.recv() => {
                    match maybe {
                        Some(()) => {
                            resolved += 1;
                            if resolved == total {
                                tracing::info!(resolved, "Prefetch complete");
                                return Outcome::Advance;
                            }
                        }
                        None => return Outcome::Advance,
                    }
                }
                _ = sleep_until(deadline) => {
                    tracing::info!(resolved, total, "Prefetch grace elapsed, starting playback");
                    return Outcome::Advance;
                }
                cmd = self.commands.recv() => {
                    if matches!(cmd, Some(Command::Stop) | None) {
                        return Outcome::Stopped;
                    }
                    // Pause/Resume hors affichage : ignorées
                }
            }
        }
    }

    /// Joue l'élément `index` : acquisition, affichage, avancement
    ///
    /// Quelle que soit l'issue, cette méthode se termine par `Advance` ou
    /// `Stopped`, jamais par un blocage indéfini sur un élément.
    async fn play_item(&mut self, playlist: &[MediaDescriptor], index: usize) -> Outcome {
        let item = &playlist[index];

        // Acquisition : au plus une tentative de téléchargement par passage
        let path = if self.cache.is_cached(item.source_uri()) {
            self.cache.media_path(item.source_uri())
        } else {
            self.set_state(PlayerState::AwaitingAsset(index));
            tracing::debug!(index, uri = item.source_uri(), "Asset not cached, fetching on demand");

            let cache = self.cache.clone();
            let uri = item.source_uri().to_string();
            let fetch = async move { cache.ensure_cached(&uri).await };
            tokio::pin!(fetch);

            let result = loop {
                tokio::select! {
                    result = &mut fetch => break result,
                    cmd = self.commands.recv() => {
                        // `stop` reste prioritaire même pendant l'attente ;
                        // le téléchargement abandonné se termine en fond
                        if matches!(cmd, Some(Command::Stop) | None) {
                            return Outcome::Stopped;
                        }
                    }
                }
            };

            match result {
                Ok(path) => path,
                Err(err) => {
                    return self
                        .skip_item(index, item, format!("fetch failed: {err}"))
                        .await;
                }
            }
        };

        let asset = ReadyAsset {
            path,
            kind: item.kind(),
            duration: item.duration(),
        };

        // Channel d'événements valable pour ce seul cycle : un signal
        // tardif d'un cycle précédent ne peut pas provoquer de double
        // avancement
        let (renderer_tx, mut renderer_rx) = mpsc::channel::<RendererEvent>(4);
        let mut renderer_open = true;

        self.set_state(PlayerState::Displaying(index));
        let natural = match self.renderer.show(&asset, renderer_tx).await {
            Ok(natural) => natural,
            Err(err) => {
                return self
                    .skip_item(index, item, format!("render failed: {err}"))
                    .await;
            }
        };

        // Durée effective : bornée par la durée intrinsèque si connue
        let effective = match natural {
            Some(natural) => item.duration().min(natural),
            None => item.duration(),
        };

        let acquired = Instant::now();
        let mut deadline = acquired + effective;

        self.started_events
            .publish(ItemStarted {
                index,
                uri: item.source_uri().to_string(),
                duration: effective,
            })
            .await;

        let tick_period = self.config.countdown_tick.max(Duration::from_millis(1));
        let mut ticker = tokio::time::interval_at(acquired + tick_period, tick_period);

        loop {
            let signal = tokio::select! {
                _ = sleep_until(deadline) => DisplaySignal::Elapsed,
                event = renderer_rx.recv(), if renderer_open => match event {
                    Some(RendererEvent::Completed) => DisplaySignal::Completed,
                    Some(RendererEvent::Failed(reason)) => DisplaySignal::Failed(reason),
                    None => DisplaySignal::Detached,
                },
                cmd = self.commands.recv() => DisplaySignal::Command(cmd),
                _ = ticker.tick() => DisplaySignal::Tick,
            };

            match signal {
                DisplaySignal::Elapsed => {
                    tracing::debug!(index, "Display duration elapsed");
                    return Outcome::Advance;
                }
                DisplaySignal::Completed => {
                    tracing::debug!(index, "Renderer reported natural completion");
                    return Outcome::Advance;
                }
                DisplaySignal::Failed(reason) => {
                    return self
                        .skip_item(index, item, format!("render failed: {reason}"))
                        .await;
                }
                DisplaySignal::Detached => {
                    // Le renderer a lâché le channel : le timer pilote seul
                    renderer_open = false;
                }
                DisplaySignal::Command(Some(Command::Stop)) | DisplaySignal::Command(None) => {
                    return Outcome::Stopped;
                }
                DisplaySignal::Command(Some(Command::Pause)) => {
                    let remaining = remaining_until(deadline, Instant::now());
                    self.renderer.pause().await;
                    tracing::info!(
                        index,
                        remaining_ms = remaining.as_millis() as u64,
                        "Playback paused"
                    );

                    loop {
                        match self.commands.recv().await {
                            Some(Command::Resume) => {
                                deadline = Instant::now() + remaining;
                                ticker.reset();
                                self.renderer.resume().await;
                                tracing::info!(index, "Playback resumed");
                                break;
                            }
                            Some(Command::Pause) => {} // déjà en pause
                            Some(Command::Stop) | None => return Outcome::Stopped,
                        }
                    }
                }
                DisplaySignal::Command(Some(Command::Resume)) => {} // pas en pause
                DisplaySignal::Tick => {
                    let remaining = remaining_until(deadline, Instant::now());
                    self.countdown_events
                        .publish(CountdownTick {
                            index,
                            remaining,
                            display: format_remaining(remaining),
                        })
                        .await;
                }
            }
        }
    }

    /// Publie l'échec, applique la pause fixe, puis avance
    ///
    /// La pause rend l'échec observable et évite une boucle serrée sur un
    /// élément définitivement cassé ; elle reste sensible à `stop`.
    async fn skip_item(&mut self, index: usize, item: &MediaDescriptor, reason: String) -> Outcome {
        tracing::warn!(index, uri = item.source_uri(), reason = %reason, "Skipping item");
        self.skipped_events
            .publish(ItemSkipped {
                index,
                uri: item.source_uri().to_string(),
                reason,
            })
            .await;

        let deadline = Instant::now() + self.config.failure_backoff;
        loop {
            tokio::select! {
                _ = sleep_until(deadline) => return Outcome::Advance,
                cmd = self.commands.recv() => {
                    if matches!(cmd, Some(Command::Stop) | None) {
                        return Outcome::Stopped;
                    }
                }
            }
        }
    }
}
