//! Infrastructure layer: storage adapters, configuration and the application
//! service that drives the pickup point domain through them.

pub mod config;
pub mod service;
pub mod storage;

pub use config::{StorageBackend, StorageConfig};
pub use service::{Clock, PvzService, ServiceError, ServiceResult, SystemClock};
pub use storage::{connect, InMemoryPvzStorage, PostgresPvzStorage, PvzStorage, StorageError};
