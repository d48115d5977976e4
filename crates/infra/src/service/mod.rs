//! Application service: the business operations of the pickup point system.
//!
//! Every operation follows the same shape:
//!
//! ```text
//! request
//!   ↓
//! 1. Resolve references (city / product type / pickup point / open reception)
//!   ↓
//! 2. Apply the domain rule (pure, in `pvz-pickup`)
//!   ↓
//! 3. Persist through `PvzStorage` (conditional write where a race is possible)
//!   ↓
//! 4. Map storage conflicts onto business errors, propagate the rest
//! ```
//!
//! Business rejections are logged at `info`, storage failures at `error`.
//! The service holds no mutable state of its own; all concurrency control is
//! delegated to the storage adapter.

mod ledger;
mod listing;
mod reception;
mod reference;
mod registry;

use std::sync::Arc;

use chrono::{DateTime, SubsecRound, Utc};
use thiserror::Error;

use pvz_core::DomainError;

use crate::storage::{PvzStorage, StorageError};

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    /// Deterministic business failure.
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Infrastructure failure, propagated unchanged.
    #[error("storage failure: {0}")]
    Storage(StorageError),
}

impl ServiceError {
    fn trace(&self, operation: &'static str) {
        match self {
            ServiceError::Domain(err) => {
                tracing::info!(operation, code = err.code(), error = %err, "request rejected");
            }
            ServiceError::Storage(err) => {
                tracing::error!(operation, error = %err, "storage failure");
            }
        }
    }
}

impl From<StorageError> for ServiceError {
    fn from(value: StorageError) -> Self {
        match value {
            StorageError::OpenReceptionExists => DomainError::ActiveReceptionExists.into(),
            StorageError::ReceptionNotOpen => DomainError::NoActiveReception.into(),
            StorageError::DuplicateId(_) => DomainError::AlreadyExists.into(),
            other => ServiceError::Storage(other),
        }
    }
}

/// Attach operation context to a failure and log it at the right level.
trait Traced<T> {
    fn traced(self, operation: &'static str) -> ServiceResult<T>;
}

impl<T, E> Traced<T> for Result<T, E>
where
    E: Into<ServiceError>,
{
    fn traced(self, operation: &'static str) -> ServiceResult<T> {
        self.map_err(|err| {
            let err = err.into();
            err.trace(operation);
            err
        })
    }
}

/// Source of "now" for generated timestamps.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

/// Microsecond precision, matching what `timestamptz` stores.
impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now().trunc_subsecs(6)
    }
}

/// Business operations over an injected [`PvzStorage`].
#[derive(Clone)]
pub struct PvzService {
    storage: Arc<dyn PvzStorage>,
    clock: Arc<dyn Clock>,
}

impl PvzService {
    pub fn new(storage: Arc<dyn PvzStorage>) -> Self {
        Self::with_clock(storage, Arc::new(SystemClock))
    }

    pub fn with_clock(storage: Arc<dyn PvzStorage>, clock: Arc<dyn Clock>) -> Self {
        Self { storage, clock }
    }

    fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }
}

impl core::fmt::Debug for PvzService {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PvzService").finish_non_exhaustive()
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::atomic::{AtomicI64, Ordering};
    use std::sync::Arc;

    use chrono::{DateTime, Duration, TimeZone, Utc};

    use super::{Clock, PvzService};
    use crate::storage::InMemoryPvzStorage;

    /// Clock that advances one second per reading, starting at a fixed instant.
    #[derive(Debug)]
    pub struct SteppingClock {
        start: DateTime<Utc>,
        ticks: AtomicI64,
    }

    impl SteppingClock {
        pub fn starting_at(start: DateTime<Utc>) -> Self {
            Self {
                start,
                ticks: AtomicI64::new(0),
            }
        }

        /// Jump so the next reading is `at`.
        pub fn set(&self, at: DateTime<Utc>) {
            let ticks = (at - self.start).num_seconds();
            self.ticks.store(ticks, Ordering::SeqCst);
        }
    }

    impl Clock for SteppingClock {
        fn now(&self) -> DateTime<Utc> {
            let tick = self.ticks.fetch_add(1, Ordering::SeqCst);
            self.start + Duration::seconds(tick)
        }
    }

    pub fn base_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 4, 1, 9, 0, 0).unwrap()
    }

    pub fn service() -> (PvzService, Arc<InMemoryPvzStorage>, Arc<SteppingClock>) {
        let storage = Arc::new(InMemoryPvzStorage::new());
        let clock = Arc::new(SteppingClock::starting_at(base_time()));
        let service = PvzService::with_clock(storage.clone(), clock.clone());
        (service, storage, clock)
    }
}
