//! # roster-server
//!
//! Main Axum server for Roster.
//!
//! Combines the resource API with health probes, and selects the storage
//! engine from configuration: `PostgreSQL` in production, the in-memory engine
//! for tests and local experiments.
//!
//! ## Usage
//!
//! ```ignore
//! use roster_core::Config;
//! use roster_server::Server;
//!
//! let config = Config::from_env()?;
//! let server = Server::new(config).await?;
//! server.run().await?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod router;

pub use router::create_router;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use roster_catalog::Catalog;
use roster_core::{Config, StorageMode};
use roster_storage::MemoryRepository;
use roster_storage_sql::{PgRepository, PoolConfig};
use tokio::net::TcpListener;

/// The storage engine selected at startup.
enum Backend {
    Memory(Arc<MemoryRepository>),
    Postgres(Arc<PgRepository>),
}

/// The Roster server.
pub struct Server {
    config: Config,
    catalog: Arc<Catalog>,
    backend: Backend,
}

impl Server {
    /// Creates a new server instance.
    ///
    /// Builds the catalog, then connects to the configured storage engine and
    /// applies the bundled migration when enabled.
    ///
    /// ## Errors
    ///
    /// Fails on an invalid catalog, an unreachable database, or a failed
    /// migration.
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let catalog = Arc::new(Catalog::standard()?);

        let backend = match config.storage.mode {
            StorageMode::Memory => {
                tracing::info!("Using in-memory storage");
                Backend::Memory(Arc::new(MemoryRepository::new()))
            }
            StorageMode::Postgres => {
                let url = config
                    .storage
                    .database_url
                    .as_deref()
                    .ok_or_else(|| anyhow::anyhow!("DATABASE_URL is required for postgres storage"))?;
                let pool_config = PoolConfig::new(url)
                    .max_connections(config.storage.max_connections)
                    .min_connections(config.storage.min_connections)
                    .acquire_timeout(config.storage.acquire_timeout)
                    .statement_timeout(config.storage.statement_timeout)
                    .idle_timeout(Duration::from_secs(600));

                let pool = roster_storage_sql::create_pool(&pool_config).await?;
                tracing::info!("Database connection pool created");

                if config.storage.run_migrations {
                    roster_storage_sql::migrate(&pool).await?;
                }
                Backend::Postgres(Arc::new(PgRepository::new(pool)))
            }
        };

        Ok(Self {
            config,
            catalog,
            backend,
        })
    }

    /// Returns the server configuration.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Builds the application router without starting the server.
    pub fn router(&self) -> Router {
        let catalog = Arc::clone(&self.catalog);
        match &self.backend {
            Backend::Memory(repository) => create_router(&self.config, Arc::clone(repository), catalog),
            Backend::Postgres(repository) => create_router(&self.config, Arc::clone(repository), catalog),
        }
    }

    /// Runs the server.
    ///
    /// Binds the configured address and blocks until it receives a shutdown
    /// signal.
    ///
    /// ## Errors
    ///
    /// Fails if the address cannot be bound or the server stops abnormally.
    pub async fn run(self) -> anyhow::Result<()> {
        let listener = TcpListener::bind(self.config.bind_address()).await?;
        self.serve(listener, shutdown_signal()).await
    }

    /// Serves on an already bound listener until `shutdown` completes.
    ///
    /// ## Errors
    ///
    /// Fails if the server stops abnormally.
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> anyhow::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let app = self.router();
        tracing::info!(
            "Server listening on http://{} (links rooted at {}{})",
            listener.local_addr()?,
            self.config.server.base_url,
            self.config.server.base_path
        );

        // Run server with graceful shutdown
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }
}

/// Waits for a shutdown signal.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
