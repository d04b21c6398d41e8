//! Tabloid submission API service.
//!
//! Accepts multipart tabloid submissions and persists them across
//! Postgres and S3-compatible object storage through the ingestion
//! coordinator.

use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use ingestion::IngestionCoordinator;
use tabloid_api::config::ApiConfig;
use tabloid_api::server::{self, ServerState};
use storage::{ImageStore, ObjectStorage, TabloidRepository};

#[derive(Parser, Debug)]
#[command(name = "tabloid-api")]
#[command(about = "Tabloid submission API")]
struct Args {
    /// Override the configured listen port
    #[arg(short, long)]
    port: Option<u16>,

    /// Skip the embedded schema migration on startup
    #[arg(long)]
    no_migrate: bool,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize tracing
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .json()
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    // Local runs pick up a .env file; absence is fine.
    dotenvy::dotenv().ok();

    let config = ApiConfig::from_env()?;
    info!(bucket = %config.storage.bucket, namespace = %config.namespace, "Loaded configuration");

    let repository = Arc::new(TabloidRepository::connect(&config.database_url).await?);
    if !args.no_migrate {
        repository.migrate().await?;
        info!("Schema migration complete");
    }

    let object_storage = Arc::new(ObjectStorage::new(&config.storage)?);
    let image_store = Arc::new(ImageStore::new(object_storage, config.namespace.clone()));

    let mut coordinator = IngestionCoordinator::new(
        Arc::clone(&repository) as Arc<dyn ingestion::RegionLookup>,
        image_store,
        Arc::clone(&repository) as Arc<dyn ingestion::RelationalWriter>,
    );
    if let Some(cdn_url) = &config.cdn_url {
        coordinator = coordinator.with_cdn_url(cdn_url.clone());
    }

    let state = Arc::new(ServerState { coordinator });
    let port = args.port.unwrap_or(config.port);

    server::start_server(state, port).await
}
