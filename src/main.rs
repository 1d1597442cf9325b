use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod error;
mod flash;
mod handlers;
mod model;
mod pages;
mod upload;
mod utils;
mod verdict;

use config::Config;
use handlers::{router, AppState};
use model::Model;
use utils::{ensure_model_exists, ensure_upload_dir};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tumour_screen_rs=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    tracing::debug!(?config, "loaded configuration");

    ensure_model_exists(&config.model_path, config.model_url.as_deref()).await?;
    ensure_upload_dir(&config.upload_folder).await?;

    let model = Model::new(&config.model_path, &config.input_op, &config.output_op)?;
    let shared_state = Arc::new(AppState {
        classifier: Mutex::new(Box::new(model)),
        threshold: config.threshold,
        upload_dir: PathBuf::from(&config.upload_folder),
    });

    let app = router(shared_state, config.body_limit_bytes());
    let addr = config.bind_addr()?;

    tracing::info!(%addr, threshold = config.threshold, "listening");
    axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
