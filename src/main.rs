use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};

use simplewaf::logging::init_tracing;
use simplewaf::router::init_router;
use simplewaf::state::init_app_state;
use simplewaf_config::{BootstrapConfig, ServerConfig};

#[derive(Parser, Debug)]
#[command(name = "simplewaf", version, about = "SimpleWAF management API")]
struct Args {
    /// Overrides HOST
    #[arg(long)]
    host: Option<String>,

    /// Overrides PORT
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    simplewaf_config::load_dotenv();
    let args = Args::parse();

    let mut server = ServerConfig::from_env();
    if let Some(host) = args.host {
        server.host = host;
    }
    if let Some(port) = args.port {
        server.port = port;
    }

    init_tracing(&server.log_dir)?;

    let state = init_app_state(&server, &BootstrapConfig::from_env()).await?;

    let mut restarts = state.subscribe_restarts();
    tokio::spawn(async move {
        while let Ok(request) = restarts.recv().await {
            warn!(
                requested_by = %request.requested_by,
                requested_at = %request.requested_at,
                "engine restart requested"
            );
        }
    });

    let app = init_router(state);

    let address = server.bind_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("binding {address}"))?;
    info!("🚀 Server running on http://{address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
