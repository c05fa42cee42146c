mod config;

use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use shutter_api::AppStateInner;
use shutter_db::Database;

use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "shutter=debug,shutter_api=debug,shutter_db=info,tower_http=debug".into()
            }),
        )
        .init();

    let cfg = Config::from_env()?;
    let addr = cfg.addr()?;

    let db = Database::open(&cfg.db_path)?;
    let state = AppStateInner::new(db);

    let mut app = shutter_api::router(state, cfg.max_upload_bytes);
    if cfg.cors_permissive {
        app = app.layer(CorsLayer::permissive());
    } else {
        warn!("CORS disabled, browsers on other origins will be rejected");
    }
    let app = app.layer(TraceLayer::new_for_http());

    info!("Shutter server listening on {}", addr);
    info!("Max upload size: {} bytes", cfg.max_upload_bytes);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    {
        let mut sigterm =
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(s) => s,
                Err(e) => {
                    warn!("Failed to install SIGTERM handler: {}", e);
                    ctrl_c.await.ok();
                    info!("Received Ctrl+C, shutting down...");
                    return;
                }
            };
        tokio::select! {
            _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
            _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
        }
    }
    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
        info!("Received Ctrl+C, shutting down...");
    }
}
