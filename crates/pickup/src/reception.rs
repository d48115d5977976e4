//! Reception lifecycle.
//!
//! ```text
//! {absent} --start--> {open} --close--> {closed}
//! ```
//!
//! `closed` is terminal. The "one open reception per pickup point" rule spans
//! several receptions and is enforced where receptions are created (storage),
//! not here.

use core::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use pvz_core::{DomainError, DomainResult, Entity, PickupPointId, ReceptionId};

/// Lifecycle status of a reception.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReceptionStatus {
    #[serde(rename = "in_progress")]
    Open,
    #[serde(rename = "close")]
    Closed,
}

impl ReceptionStatus {
    /// Persisted / wire representation.
    pub fn as_str(self) -> &'static str {
        match self {
            ReceptionStatus::Open => "in_progress",
            ReceptionStatus::Closed => "close",
        }
    }
}

impl core::fmt::Display for ReceptionStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReceptionStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "in_progress" => Ok(ReceptionStatus::Open),
            "close" => Ok(ReceptionStatus::Closed),
            other => Err(DomainError::validation(format!(
                "unknown reception status '{other}'"
            ))),
        }
    }
}

/// A bounded work session at a pickup point during which products are logged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reception {
    pub id: ReceptionId,
    pub started_at: DateTime<Utc>,
    pub pickup_point_id: PickupPointId,
    pub status: ReceptionStatus,
}

impl Entity for Reception {
    type Id = ReceptionId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl Reception {
    /// Start a new, open reception for a pickup point.
    pub fn start(pickup_point_id: PickupPointId, now: DateTime<Utc>) -> Self {
        Self {
            id: ReceptionId::new(),
            started_at: now,
            pickup_point_id,
            status: ReceptionStatus::Open,
        }
    }

    pub fn is_open(&self) -> bool {
        self.status == ReceptionStatus::Open
    }

    /// Fails with `NoActiveReception` unless the reception is still open.
    pub fn ensure_open(&self) -> DomainResult<()> {
        if self.is_open() {
            Ok(())
        } else {
            Err(DomainError::NoActiveReception)
        }
    }

    /// Transition `open → closed`. Closed receptions are not active, so a
    /// second close fails with `NoActiveReception`.
    pub fn close(&mut self) -> DomainResult<()> {
        self.ensure_open()?;
        self.status = ReceptionStatus::Closed;
        Ok(())
    }
}
