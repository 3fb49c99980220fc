use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use captionparty::{api, assets::FsAssets, config::AppConfig, state::AppState, watcher};

#[tokio::main]
async fn main() {
    // Load .env file if present (before any env var reads)
    if let Err(e) = dotenvy::dotenv() {
        // Not an error if .env doesn't exist, only log if it's a different issue
        if !matches!(e, dotenvy::Error::Io(_)) {
            eprintln!("Warning: Failed to load .env file: {}", e);
        }
    }

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "captionparty=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Caption Party...");

    let config = AppConfig::from_env();

    let assets = FsAssets::new(&config.asset_dir);
    if let Err(e) = assets.bootstrap() {
        tracing::warn!(
            "Could not create asset directories under {}: {}",
            config.asset_dir.display(),
            e
        );
    }

    let state = Arc::new(
        AppState::new(config.game.clone(), Arc::new(assets))
            .with_render_config(config.render.clone()),
    );

    match config.deadline_tick {
        Some(interval) => {
            tracing::info!(?interval, "Background deadline watcher enabled");
            watcher::spawn_deadline_watcher(state.clone(), interval);
        }
        None => tracing::info!("Deadlines are reconciled on request"),
    }

    let app = api::router(state, &config.asset_dir);

    let listener = match tokio::net::TcpListener::bind(config.bind_addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("Failed to bind {}: {}", config.bind_addr, e);
            std::process::exit(1);
        }
    };
    tracing::info!("Listening on http://{}", config.bind_addr);

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
