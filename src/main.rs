use std::sync::Arc;

use anyhow::Context;
use servicex::api::{self, AppState};
use servicex::config::{AppConfig, SinkConfig};
use servicex::lead::LeadSink;
use servicex::rest_sink::RestLeadSink;
use servicex::store::{ContentStore, LibSqlStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = AppConfig::from_env()?;

    eprintln!("servicex v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   HTTP: http://0.0.0.0:{}", config.http_port);
    eprintln!("   Changes WS: ws://0.0.0.0:{}/ws/changes", config.http_port);
    eprintln!("   Database: {}", config.db_path.display());

    // ── Database ─────────────────────────────────────────────────────────
    let store = Arc::new(
        LibSqlStore::new_local(&config.db_path)
            .await
            .with_context(|| format!("Failed to open database at {}", config.db_path.display()))?,
    );

    // ── Lead sink ────────────────────────────────────────────────────────
    let sink: Arc<dyn LeadSink> = match &config.sink {
        SinkConfig::Store => {
            eprintln!("   Leads: local contacts table");
            Arc::clone(&store) as Arc<dyn LeadSink>
        }
        SinkConfig::Rest { url, api_key } => {
            eprintln!("   Leads: {url}/rest/v1/contacts");
            Arc::new(RestLeadSink::new(url.clone(), api_key.clone()))
        }
    };

    let store: Arc<dyn ContentStore> = store;
    let state = AppState::new(store, sink);
    let _sweeper = state.registry.spawn_sweeper();
    let app = api::router(state);

    let addr = format!("0.0.0.0:{}", config.http_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!(port = config.http_port, "HTTP server started");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutting down");
        })
        .await?;

    Ok(())
}
