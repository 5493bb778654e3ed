pub mod api;
pub mod config;
pub mod logic;
pub mod model;
pub mod store;

// Export API types
pub use api::handlers;
pub use api::routes;

pub use logic::Validator;

// Export all model types
pub use model::*;

// Export store types
pub use store::{MemoryStore, PostgresStore, SchoolStore, StoreError};

use crate::config::{AppConfig, StorageBackend};

/// Connect the configured storage backend and serve until the listener fails
pub async fn run_server(config: AppConfig) -> anyhow::Result<()> {
    use axum::serve;
    use tokio::net::TcpListener;

    let app = match config.storage {
        StorageBackend::Postgres => {
            let database_url = config.database_url();
            let store = PostgresStore::new(&database_url, &config.database).await?;
            log::info!("Connected to PostgreSQL");

            if config.database.run_migrations {
                store.migrate().await?;
                log::info!("Database migrations applied");
            }

            api::build_app(store, &config.server.environment, config.request_timeout())
        }
        StorageBackend::Memory => {
            log::warn!("Using in-memory storage, data will not survive a restart");
            api::build_app(
                MemoryStore::new(),
                &config.server.environment,
                config.request_timeout(),
            )
        }
    };

    let bind_address = config.server_address();
    let listener = TcpListener::bind(&bind_address).await?;
    log::info!(
        "Starting {} server on http://{}",
        config.server.environment,
        bind_address
    );

    serve(listener, app).await?;

    Ok(())
}
