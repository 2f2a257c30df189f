use std::sync::Arc;

use clap::Parser;
use tracing::{info, warn};

use studybot_server::{build_router, AppState};

// ── CLI ─────────────────────────────────────────────────────────────

/// StudyBot API server.
#[derive(Parser, Debug)]
#[command(name = "studybot-server", version, about)]
struct Cli {
    /// Bind address; overrides HOST.
    #[arg(long)]
    host: Option<String>,

    /// Listen port; overrides PORT.
    #[arg(long)]
    port: Option<u16>,

    /// Config profile, e.g. PROD reads PROD_* variables first.
    #[arg(long, env = "STUDYBOT_PROFILE")]
    profile: Option<String>,
}

fn load_config(cli: &Cli) -> studybot_core::Config {
    studybot_core::config::load_dotenv();
    let mut config = match &cli.profile {
        Some(profile) => studybot_core::Config::for_profile(profile),
        None => studybot_core::Config::from_env(),
    };
    if let Some(host) = &cli.host {
        config.server.host = host.clone();
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    config
}

// ── main ────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli);
    config.log_summary();

    let state = AppState::from_config(config)?;
    if let Err(e) = state.gateway.resolve(None) {
        warn!("default LLM provider unusable, requests without a provider will fail: {}", e);
    }

    let addr = format!("{}:{}", state.config.server.host, state.config.server.port);
    let app = build_router(Arc::new(state));

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Server listening on http://{}", addr);
    info!("API docs at http://{}/docs", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
