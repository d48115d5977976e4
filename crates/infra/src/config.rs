//! Storage configuration.

use core::str::FromStr;

use secrecy::SecretString;

/// Which storage adapter backs the service.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum StorageBackend {
    #[default]
    Memory,
    Postgres,
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" | "in_memory" => Ok(StorageBackend::Memory),
            "postgres" | "postgresql" => Ok(StorageBackend::Postgres),
            other => Err(format!("unknown storage backend '{other}' (expected memory|postgres)")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    /// Required when `backend` is `Postgres`.
    pub database_url: Option<SecretString>,
    pub max_connections: u32,
}

impl StorageConfig {
    pub const DEFAULT_MAX_CONNECTIONS: u32 = 10;

    pub fn in_memory() -> Self {
        Self {
            backend: StorageBackend::Memory,
            database_url: None,
            max_connections: Self::DEFAULT_MAX_CONNECTIONS,
        }
    }

    pub fn postgres(database_url: impl Into<String>) -> Self {
        Self {
            backend: StorageBackend::Postgres,
            database_url: Some(SecretString::from(database_url.into())),
            max_connections: Self::DEFAULT_MAX_CONNECTIONS,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self::in_memory()
    }
}
