//! Name → id resolution against the immutable reference tables.
//!
//! No caching: every lookup reads storage, so an unknown name is always
//! reported as unknown.

use tracing::instrument;

use pvz_core::DomainError;
use pvz_pickup::{City, ProductType};

use super::{PvzService, ServiceResult, Traced};

impl PvzService {
    #[instrument(skip(self))]
    pub async fn resolve_city(&self, name: &str) -> ServiceResult<City> {
        const OP: &str = "resolve_city";
        self.storage
            .resolve_city(name)
            .await
            .traced(OP)?
            .ok_or(DomainError::CityNotAllowed)
            .traced(OP)
    }

    #[instrument(skip(self))]
    pub async fn resolve_product_type(&self, name: &str) -> ServiceResult<ProductType> {
        const OP: &str = "resolve_product_type";
        self.storage
            .resolve_product_type(name)
            .await
            .traced(OP)?
            .ok_or(DomainError::ProductTypeNotAllowed)
            .traced(OP)
    }
}
