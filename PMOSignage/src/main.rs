use pmomediacache::MediaCache;
use pmomediasource::{PlaylistClient, RemotePlaylistProvider};
use pmosignconfig::get_config;
use pmosignplayer::{LogRenderer, Scheduler, SchedulerConfig};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    // ========== PHASE 1 : Configuration ==========

    let config = get_config();
    let cache_dir = config.get_media_cache_dir()?;
    let playlist_url = config.get_playlist_url();
    let fallback_path = config.get_fallback_playlist_path();
    info!(cache_dir = %cache_dir, playlist_url = %playlist_url, "Configuration loaded");

    // ========== PHASE 2 : Assemblage du lecteur ==========

    info!("🖼 Initializing media cache...");
    let cache = Arc::new(MediaCache::new(&cache_dir)?);
    info!(
        "Cache holds {} byte(s) from previous runs",
        cache.size_bytes().await?
    );

    info!("📡 Initializing playlist provider...");
    let client = PlaylistClient::new(&playlist_url)?;
    let provider = Arc::new(RemotePlaylistProvider::with_fallback(client, fallback_path));

    let scheduler_config = SchedulerConfig {
        prefetch_grace: Duration::from_millis(config.get_prefetch_grace_ms()),
        failure_backoff: Duration::from_millis(config.get_failure_backoff_ms()),
        countdown_tick: Duration::from_millis(config.get_countdown_tick_ms()),
    };
    let mut scheduler = Scheduler::new(cache, provider, LogRenderer::new(), scheduler_config);

    // Journaliser le compte à rebours du panneau
    let (tick_tx, mut tick_rx) = mpsc::channel(16);
    scheduler.subscribe_countdown(tick_tx);
    tokio::spawn(async move {
        while let Some(tick) = tick_rx.recv().await {
            info!(index = tick.index, remaining = %tick.display, "Countdown");
        }
    });

    let handle = scheduler.handle();

    // ========== PHASE 3 : Boucle de lecture ==========

    info!("✅ PMOSignage is ready!");
    info!("Press Ctrl+C to stop...");

    let mut player = tokio::spawn(scheduler.run());

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Shutting down...");
            handle.stop().await;
            player.await??;
        }
        result = &mut player => {
            result??;
        }
    }

    Ok(())
}
