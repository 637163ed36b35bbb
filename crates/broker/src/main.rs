// Файл: crates/broker/src/main.rs
use std::net::SocketAddr;

use anyhow::{Context, Result};
use tracing_subscriber::{fmt, EnvFilter};

use broker::config::BrokerConfig;
use broker::http_api::{router, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let cfg = BrokerConfig::from_env();
    let addr: SocketAddr = cfg
        .addr
        .parse()
        .with_context(|| format!("bad DC_ADDR: {}", cfg.addr))?;

    let state = AppState::from_config(&cfg);

    if cfg.verify_on_start {
        // расхождение total — только предупреждение, сервис стартует в любом случае
        match state.coord.verify().await {
            Ok(report) if report.total_matches() => {
                tracing::info!(
                    total = report.scanned_total,
                    shards = report.per_shard.len(),
                    missing_ids = report.missing_ids,
                    "export verified"
                );
            }
            Ok(report) => {
                tracing::warn!(
                    declared = report.declared_total,
                    scanned = report.scanned_total,
                    "manifest total does not match shard contents"
                );
            }
            Err(err) => {
                tracing::warn!(error = %err, "export verification failed");
            }
        }
    }

    let app = router(state);

    tracing::info!(address = %addr, export_dir = %cfg.export_dir, "broker listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).with_target(false).try_init();
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %err, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
