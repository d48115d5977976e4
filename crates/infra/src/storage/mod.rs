//! Persistence boundary for pickup points, receptions and products.
//!
//! The service layer only sees [`PvzStorage`]; adapters are selected at
//! startup by [`connect`].

pub mod in_memory;
pub mod postgres;
pub mod r#trait;

use std::sync::Arc;

use secrecy::ExposeSecret;

pub use in_memory::InMemoryPvzStorage;
pub use postgres::PostgresPvzStorage;
pub use r#trait::{PvzStorage, StorageError};

use crate::config::{StorageBackend, StorageConfig};

/// Cities present in a fresh deployment.
pub const SEED_CITIES: &[&str] = &["Москва", "Санкт-Петербург", "Казань"];

/// Product types present in a fresh deployment.
pub const SEED_PRODUCT_TYPES: &[&str] = &["электроника", "одежда", "обувь"];

/// Build the storage adapter described by `config`.
pub async fn connect(config: &StorageConfig) -> Result<Arc<dyn PvzStorage>, StorageError> {
    match config.backend {
        StorageBackend::Memory => {
            tracing::info!("using in-memory storage");
            Ok(Arc::new(InMemoryPvzStorage::new()))
        }
        StorageBackend::Postgres => {
            let url = config.database_url.as_ref().ok_or_else(|| {
                StorageError::Unavailable("DATABASE_URL is required for postgres storage".to_string())
            })?;
            let storage = PostgresPvzStorage::connect(url.expose_secret(), config.max_connections).await?;
            Ok(Arc::new(storage))
        }
    }
}
