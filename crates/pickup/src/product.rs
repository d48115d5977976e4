use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use pvz_core::{DomainResult, Entity, ProductId, ProductTypeId, ReceptionId};

use crate::reception::Reception;

/// A product type from the immutable reference table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductType {
    pub id: ProductTypeId,
    pub name: String,
}

impl ProductType {
    pub fn new(id: ProductTypeId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// An item logged against an open reception.
///
/// Products are append-only; only the most recently logged one of an open
/// reception may be removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub created_at: DateTime<Utc>,
    pub product_type: ProductType,
    pub reception_id: ReceptionId,
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl Product {
    /// Log a new product against `reception`, which must be open.
    pub fn log(
        reception: &Reception,
        product_type: ProductType,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        reception.ensure_open()?;
        Ok(Self {
            id: ProductId::new(),
            created_at: now,
            product_type,
            reception_id: reception.id,
        })
    }
}
