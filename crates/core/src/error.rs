//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic business failures (unknown reference
/// data, reception lifecycle rules, ledger discipline). Storage and transport
/// failures are modelled by the layers that own them and are never folded
/// into this enum.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A requested resource was not found (domain-level).
    #[error("not found")]
    NotFound,

    /// An entity with the same identifier already exists.
    #[error("already exists")]
    AlreadyExists,

    /// The city name does not resolve to a known city.
    #[error("city not allowed")]
    CityNotAllowed,

    /// The product type name does not resolve to a known product type.
    #[error("product type not allowed")]
    ProductTypeNotAllowed,

    /// The pickup point already has an open reception.
    #[error("active reception already exists")]
    ActiveReceptionExists,

    /// The pickup point has no open reception.
    #[error("no active reception")]
    NoActiveReception,

    /// The open reception holds no products.
    #[error("no product")]
    NoProduct,

    /// The referenced pickup point does not exist.
    #[error("pickup point not found")]
    PickupPointNotFound,

    /// A value failed validation (e.g. malformed input).
    #[error("validation failed: {0}")]
    Validation(String),

    /// A concurrent change invalidated the operation's precondition.
    #[error("conflict: {0}")]
    Conflict(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    /// Stable machine-readable code, used by façades in error payloads.
    pub fn code(&self) -> &'static str {
        match self {
            DomainError::NotFound => "not_found",
            DomainError::AlreadyExists => "already_exists",
            DomainError::CityNotAllowed => "city_not_allowed",
            DomainError::ProductTypeNotAllowed => "product_type_not_allowed",
            DomainError::ActiveReceptionExists => "active_reception_exists",
            DomainError::NoActiveReception => "no_active_reception",
            DomainError::NoProduct => "no_product",
            DomainError::PickupPointNotFound => "pickup_point_not_found",
            DomainError::Validation(_) => "validation_error",
            DomainError::Conflict(_) => "conflict",
        }
    }
}
