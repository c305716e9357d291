use clap::Parser; // for cli
use std::sync::Arc;
use tokio::signal;
use tracing::{info, warn};

use prodraft_gateway::config::Args;
use prodraft_gateway::state::AppState;
use prodraft_gateway::{app, logging, sweeper};

// this is main async function with tokio
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // parse cli arguments
    let args = Args::parse();
    logging::init(args.log_json);

    let client = reqwest::Client::new();
    let state = Arc::new(AppState::from_args(&args, client));

    match &state.provider {
        Some(provider) => info!(
            provider = provider.name(),
            model = provider.model(),
            "provider configured"
        ),
        None => warn!(
            provider = args.provider.display_name(),
            env = args.provider.key_env(),
            "API key missing, generate requests will fail"
        ),
    }

    // optional cleanup of stale rate limit windows and cache entries
    if let Some(every) = args.sweep_interval() {
        tokio::spawn(sweeper::sweeper(Arc::clone(&state), every));
    }

    info!(
        limit = state.rate_limiter.limit(),
        window = ?state.rate_limiter.window(),
        "rate limit configured"
    );

    let router = app(state);

    let addr = format!("{}:{}", args.host, args.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!(%addr, "gateway listening");
    info!(cache_ttl_secs = args.cache_ttl, "response cache configured");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("gateway stopped");
    Ok(())
}

// Wait for Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received Ctrl+C, shutting down"),
        _ = terminate => info!("received SIGTERM, shutting down"),
    }
}
