use std::path::PathBuf;
use std::sync::Arc;

use adoptindie_core::config::{
    parse_storage_backend, BlobBackend, CliConfigOverrides, ServiceConfig, StorageBackend,
};
use adoptindie_store::memory::{MemoryBlobStore, MemorySightingStore};
use adoptindie_store::ports::{BlobStore, SightingStore};
use adoptindie_store::postgres::{PostgresConfig, PostgresStore};
use adoptindie_store::supabase::SupabaseBlobStore;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use adoptindie_api::{create_router, ApiConfig, AppState};

/// AdoptIndie - stray dog reporting backend
#[derive(Parser, Debug)]
#[command(name = "adoptindie-api")]
#[command(about = "Stray dog reporting backend", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(long, global = true, env = "ADOPTINDIE_CONFIG")]
    config: Option<PathBuf>,

    /// Port to listen on
    #[arg(long, global = true)]
    port: Option<u16>,

    /// Record store backend (memory or postgres)
    #[arg(long, global = true)]
    storage: Option<String>,

    /// PostgreSQL connection URL
    #[arg(long, global = true)]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP server (default)
    Serve,

    /// Apply pending PostgreSQL migrations and exit
    Migrate,

    /// Print the resolved configuration and where each value came from
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "adoptindie_api=info,adoptindie_store=info,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve(config).await,
        Commands::Migrate => migrate(config).await,
        Commands::Config => {
            print_config(&config);
            Ok(())
        }
    }
}

fn load_config(cli: &Cli) -> Result<ServiceConfig> {
    let mut config = ServiceConfig::with_defaults();

    if let Some(path) = &cli.config {
        config = config
            .load_from_file(path)
            .with_context(|| format!("Failed to load config file {}", path.display()))?;
    }

    config = config.load_from_env();

    let storage = cli
        .storage
        .as_deref()
        .map(parse_storage_backend)
        .transpose()
        .context("Invalid --storage")?;

    config.update_from_cli(CliConfigOverrides {
        port: cli.port,
        storage,
        database_url: cli.database_url.clone(),
    });

    config.validate().context("Invalid configuration")?;

    Ok(config)
}

async fn serve(config: ServiceConfig) -> Result<()> {
    let api_config = ApiConfig::from_service_config(&config)?;

    tracing::info!(
        bind = %api_config.bind_address,
        storage = ?config.storage_backend(),
        origins = ?config.cors_origins.value,
        "Starting AdoptIndie API server"
    );

    let (sighting_store, postgres): (Arc<dyn SightingStore>, Option<Arc<PostgresStore>>) =
        match config.storage_backend() {
            StorageBackend::Postgres => {
                let store = Arc::new(connect_postgres(&config).await?);
                (store.clone(), Some(store))
            }
            StorageBackend::Memory => {
                tracing::info!("Using in-memory record storage (set DATABASE_URL for PostgreSQL)");
                (Arc::new(MemorySightingStore::new()), None)
            }
        };

    let blob_store: Arc<dyn BlobStore> = match config.blob_backend() {
        BlobBackend::Supabase { url, key } => {
            tracing::info!(url = %url, bucket = %config.bucket.value, "Using Supabase Storage");
            Arc::new(SupabaseBlobStore::new(url, key, config.bucket.value.clone()))
        }
        BlobBackend::Memory { public_base_url } => {
            tracing::warn!("Using in-memory blob storage; uploaded images are lost on restart");
            Arc::new(MemoryBlobStore::new(public_base_url))
        }
    };

    let state = Arc::new(AppState::new(sighting_store, blob_store, api_config.nearby));
    let app = create_router(state, &api_config);

    let listener = tokio::net::TcpListener::bind(&api_config.bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", api_config.bind_address))?;

    tracing::info!("Listening on {}", api_config.bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    if let Some(store) = postgres {
        store.close().await;
    }

    tracing::info!("Server stopped");
    Ok(())
}

async fn migrate(config: ServiceConfig) -> Result<()> {
    let mut store_config = postgres_config(&config)?;
    store_config.run_migrations = false;

    let store = PostgresStore::new(store_config).await.context("Failed to connect to PostgreSQL")?;

    let pending = store.migration_status().await?.iter().filter(|m| !m.applied).count();
    tracing::info!(pending = pending, "Applying migrations");
    store.run_migrations().await?;

    for migration in store.migration_status().await? {
        tracing::info!(
            version = migration.version,
            description = %migration.description,
            applied = migration.applied,
            "Migration"
        );
    }

    store.close().await;
    Ok(())
}

fn postgres_config(config: &ServiceConfig) -> Result<PostgresConfig> {
    let url = config
        .database_url
        .value
        .clone()
        .context("DATABASE_URL is required for PostgreSQL storage")?;
    PostgresConfig::new(url).context("Invalid DATABASE_URL")
}

async fn connect_postgres(config: &ServiceConfig) -> Result<PostgresStore> {
    let store_config = postgres_config(config)?;

    tracing::info!("Connecting to PostgreSQL...");
    PostgresStore::connect(store_config).await.context(
        "Failed to connect to PostgreSQL. Ensure it is running with the PostGIS extension \
         available and that DATABASE_URL points to an existing database",
    )
}

fn print_config(config: &ServiceConfig) {
    let mut entries: Vec<_> = config.to_inspection_map().into_iter().collect();
    entries.sort_by(|a, b| a.0.cmp(&b.0));

    for (key, (value, source)) in entries {
        println!("{:<24} {:<48} ({:?})", key, value, source);
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
        tracing::info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
                tracing::info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
