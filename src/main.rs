//! CardioGuard: HTTP service for pre-trained heart-disease classifiers.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use cardioguard::cli::{Cli, Commands};
use cardioguard::config::load_config;
use cardioguard::consensus::ConsensusPolicy;
use cardioguard::registry::ModelRegistry;
use cardioguard::web::{build_router, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let mut config = load_config().context("failed to load configuration")?;

    match cli.command {
        Some(Commands::ValidateModels { models_dir }) => {
            if let Some(dir) = models_dir {
                config.models_dir = dir;
            }
            let registry = ModelRegistry::load(Path::new(&config.models_dir))
                .context("model validation failed")?;
            for (name, artifact) in registry.all() {
                println!("{name}: version {} ok", artifact.version);
            }
            Ok(())
        }
        Some(Commands::Serve { bind, models_dir }) => {
            if let Some(bind) = bind {
                config.bind = bind;
            }
            if let Some(dir) = models_dir {
                config.models_dir = dir;
            }
            serve(config).await
        }
        None => serve(config).await,
    }
}

async fn serve(config: cardioguard::config::AppConfig) -> Result<()> {
    tracing::info!(models_dir = %config.models_dir, "loading classifier artifacts");
    let registry = ModelRegistry::load(Path::new(&config.models_dir))
        .context("model registry initialization failed")?;

    let state = Arc::new(AppState {
        registry: Arc::new(registry),
        policy: ConsensusPolicy::new(config.consensus_threshold),
        designated_model: config.designated_model.clone(),
    });
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind)
        .await
        .with_context(|| format!("cannot bind {}", config.bind))?;
    tracing::info!(bind = %config.bind, "CardioGuard listening");

    axum::serve(listener, app).await.context("server error")
}
