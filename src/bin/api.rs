use anyhow::{Context, Result};
use recap::{app_state::AppState, config::Config, pipeline::Pipeline, router::build_router};
use tokio::signal;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

const ENV_LOG_FORMAT: &str = "LOG_FORMAT";

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    match std::env::var(ENV_LOG_FORMAT).as_deref() {
        Ok("json") => registry
            .with(tracing_subscriber::fmt::layer().json().with_current_span(true))
            .init(),
        _ => registry
            .with(tracing_subscriber::fmt::layer().with_target(true))
            .init(),
    }
}

/// Resolves once a listener finishes. A listener that could not be installed
/// never resolves, so a setup failure does not read as a shutdown request.
async fn listen_or_park<E: std::fmt::Display>(result: Result<(), E>, signal_name: &str) {
    if let Err(e) = result {
        tracing::error!(error = %e, signal = signal_name, "failed to listen for signal");
        std::future::pending::<()>().await;
    }
}

async fn shutdown_signal() {
    let ctrl_c = async { listen_or_park(signal::ctrl_c().await, "ctrl-c").await };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => listen_or_park(Err(e), "SIGTERM").await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("shutdown signal received");
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = Config::from_env().context("Failed to load configuration")?;
    let pipeline = Pipeline::from_config(&config).context("Failed to build pipeline")?;
    let app = build_router(AppState::new(pipeline));

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind_addr))?;
    info!(addr = %config.bind_addr, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    Ok(())
}
