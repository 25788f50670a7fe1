use anyhow::{Context, Result};
use clap::Parser;
use interview_practice::collab::{NatsCollaborator, QuestionGenerator};
use interview_practice::http::{create_router, AppState};
use interview_practice::store::SessionStore;
use interview_practice::Config;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "interview-practice")]
#[command(about = "Interview practice session service")]
struct Args {
    /// Config file, without extension (`config` crate convention)
    #[arg(short, long, default_value = "config/interview-practice")]
    config: String,

    /// Override the HTTP port from the config file
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let cfg = Config::load(&args.config)?;

    info!("{} starting", cfg.service.name);

    let db_path = shellexpand::tilde(&cfg.storage.path);
    let db_path = PathBuf::from(db_path.as_ref());

    let store = SessionStore::open_with_timeout(
        db_path,
        Duration::from_millis(cfg.storage.open_timeout_ms),
    )
    .await
    .context("Failed to open session store")?;

    let request_timeout = Duration::from_secs(cfg.collaborators.request_timeout_secs);
    let generator: Option<Arc<dyn QuestionGenerator>> =
        match NatsCollaborator::connect(&cfg.collaborators.nats_url, request_timeout).await {
            Ok(client) => Some(Arc::new(client)),
            Err(e) => {
                warn!(
                    "Collaborator bus unreachable, question generation will serve the built-in bank: {}",
                    e
                );
                None
            }
        };

    let state = AppState::new(store, generator);
    let router = create_router(state);

    let port = args.port.unwrap_or(cfg.service.http.port);
    let addr = format!("{}:{}", cfg.service.http.bind, port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("HTTP server listening on {}", addr);

    axum::serve(listener, router)
        .await
        .context("HTTP server error")?;

    Ok(())
}
