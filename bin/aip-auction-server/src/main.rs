//! The auction coordinator's process entry point: load config, build
//! shared state, bind and serve (§6), grounded in the node binary's
//! CLI/tracing-init/serve wiring.

use clap::Parser;

use aip_server::config::ServerConfig;
use aip_server::{build_router, AppState};

#[derive(Parser)]
#[clap(about = "AIP auction coordinator")]
struct Cli {
    /// Overrides the listen host from the loaded config.
    #[clap(long)]
    host: Option<String>,
    /// Overrides the listen port from the loaded config.
    #[clap(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env_filter = tracing_subscriber::EnvFilter::from_default_env();
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();
    let mut config = ServerConfig::load()?;
    if let Some(host) = cli.host {
        config.listen.host = host;
    }
    if let Some(port) = cli.port {
        config.listen.port = port;
    }

    let addr = format!("{}:{}", config.listen.host, config.listen.port);
    let state = AppState::build(config).await?;
    let router = build_router(std::sync::Arc::new(state));

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "aip auction coordinator listening");
    axum::serve(listener, router).await?;

    Ok(())
}
