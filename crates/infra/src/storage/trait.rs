use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use pvz_core::{PickupPointId, ProductId, ReceptionId};
use pvz_pickup::{City, PickupPoint, Product, ProductType, Reception, TimeWindow};

/// Storage operation error.
///
/// The first three variants are *conditional-write* outcomes: the storage
/// refused a write because a concurrency guard did not hold. The service layer
/// maps them onto business errors. Everything else is an infrastructure
/// failure and is propagated unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    /// The pickup point already has a reception in progress.
    #[error("pickup point already has an open reception")]
    OpenReceptionExists,

    /// The target reception is missing or no longer open.
    #[error("reception is not open")]
    ReceptionNotOpen,

    /// A row with the same primary key already exists.
    #[error("duplicate id: {0}")]
    DuplicateId(String),

    #[error("database error: {0}")]
    Database(String),

    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// A stored row could not be decoded into a domain value.
    #[error("corrupt row: {0}")]
    Corrupt(String),
}

/// Persistence port for pickup points, receptions and products.
///
/// Reads that may legitimately find nothing return `Ok(None)`; `Err` is
/// reserved for genuine failures. Writes that race with other writers are
/// *conditional*: they either apply atomically or fail with one of the
/// conflict variants of [`StorageError`].
#[async_trait]
pub trait PvzStorage: Send + Sync {
    // Reference data

    async fn resolve_city(&self, name: &str) -> Result<Option<City>, StorageError>;

    async fn resolve_product_type(&self, name: &str) -> Result<Option<ProductType>, StorageError>;

    async fn list_cities(&self) -> Result<Vec<City>, StorageError>;

    async fn list_product_types(&self) -> Result<Vec<ProductType>, StorageError>;

    // Pickup points

    /// Fails with `DuplicateId` if the id is taken.
    async fn insert_pickup_point(&self, point: &PickupPoint) -> Result<(), StorageError>;

    async fn pickup_point_exists(&self, id: PickupPointId) -> Result<bool, StorageError>;

    /// Every pickup point, newest registration first.
    async fn list_all_pickup_points(&self) -> Result<Vec<PickupPoint>, StorageError>;

    /// Pickup points having at least one reception started inside `window`,
    /// ordered by `(registered_at DESC, id DESC)`, then `offset`/`limit` applied.
    async fn list_pickup_points(
        &self,
        window: TimeWindow,
        limit: u32,
        offset: u64,
    ) -> Result<Vec<PickupPoint>, StorageError>;

    // Receptions

    /// Fails with `OpenReceptionExists` if the pickup point already has an open
    /// reception, even when the competing insert is concurrent.
    async fn insert_reception(&self, reception: &Reception) -> Result<(), StorageError>;

    async fn open_reception(
        &self,
        pickup_point_id: PickupPointId,
    ) -> Result<Option<Reception>, StorageError>;

    /// Compare-and-set `open → closed`. Fails with `ReceptionNotOpen` when the
    /// reception was closed (or never existed) at the time of the write.
    async fn close_reception(&self, id: ReceptionId) -> Result<Reception, StorageError>;

    /// Receptions of the given points started inside `window`, ordered by
    /// `(started_at DESC, id DESC)`.
    async fn list_receptions_for_pickup_points(
        &self,
        pickup_point_ids: &[PickupPointId],
        window: TimeWindow,
    ) -> Result<Vec<Reception>, StorageError>;

    // Products

    /// Fails with `ReceptionNotOpen` unless the reception is still open when
    /// the row is written.
    async fn insert_product(&self, product: &Product) -> Result<(), StorageError>;

    /// Pick the most recent product of a still-open reception, by
    /// `(created_at, insertion order)`, and delete it atomically. `Ok(None)` when the reception holds no products; fails with
    /// `ReceptionNotOpen` when the reception is closed at the time of the write.
    async fn delete_latest_product(
        &self,
        reception_id: ReceptionId,
    ) -> Result<Option<ProductId>, StorageError>;

    /// Products of the given receptions, newest first (insertion order breaks ties).
    async fn list_products_for_receptions(
        &self,
        reception_ids: &[ReceptionId],
    ) -> Result<Vec<Product>, StorageError>;
}

#[async_trait]
impl<S> PvzStorage for Arc<S>
where
    S: PvzStorage + ?Sized,
{
    async fn resolve_city(&self, name: &str) -> Result<Option<City>, StorageError> {
        (**self).resolve_city(name).await
    }

    async fn resolve_product_type(&self, name: &str) -> Result<Option<ProductType>, StorageError> {
        (**self).resolve_product_type(name).await
    }

    async fn list_cities(&self) -> Result<Vec<City>, StorageError> {
        (**self).list_cities().await
    }

    async fn list_product_types(&self) -> Result<Vec<ProductType>, StorageError> {
        (**self).list_product_types().await
    }

    async fn insert_pickup_point(&self, point: &PickupPoint) -> Result<(), StorageError> {
        (**self).insert_pickup_point(point).await
    }

    async fn pickup_point_exists(&self, id: PickupPointId) -> Result<bool, StorageError> {
        (**self).pickup_point_exists(id).await
    }

    async fn list_all_pickup_points(&self) -> Result<Vec<PickupPoint>, StorageError> {
        (**self).list_all_pickup_points().await
    }

    async fn list_pickup_points(
        &self,
        window: TimeWindow,
        limit: u32,
        offset: u64,
    ) -> Result<Vec<PickupPoint>, StorageError> {
        (**self).list_pickup_points(window, limit, offset).await
    }

    async fn insert_reception(&self, reception: &Reception) -> Result<(), StorageError> {
        (**self).insert_reception(reception).await
    }

    async fn open_reception(
        &self,
        pickup_point_id: PickupPointId,
    ) -> Result<Option<Reception>, StorageError> {
        (**self).open_reception(pickup_point_id).await
    }

    async fn close_reception(&self, id: ReceptionId) -> Result<Reception, StorageError> {
        (**self).close_reception(id).await
    }

    async fn list_receptions_for_pickup_points(
        &self,
        pickup_point_ids: &[PickupPointId],
        window: TimeWindow,
    ) -> Result<Vec<Reception>, StorageError> {
        (**self)
            .list_receptions_for_pickup_points(pickup_point_ids, window)
            .await
    }

    async fn insert_product(&self, product: &Product) -> Result<(), StorageError> {
        (**self).insert_product(product).await
    }

    async fn delete_latest_product(
        &self,
        reception_id: ReceptionId,
    ) -> Result<Option<ProductId>, StorageError> {
        (**self).delete_latest_product(reception_id).await
    }

    async fn list_products_for_receptions(
        &self,
        reception_ids: &[ReceptionId],
    ) -> Result<Vec<Product>, StorageError> {
        (**self).list_products_for_receptions(reception_ids).await
    }
}
