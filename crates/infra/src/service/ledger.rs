//! Append-only product list of an open reception, with LIFO undo.

use tracing::instrument;

use pvz_core::{DomainError, PickupPointId};
use pvz_pickup::Product;

use super::{PvzService, ServiceResult, Traced};

impl PvzService {
    /// Log a product of a known type against the pickup point's open reception.
    #[instrument(skip(self), fields(pickup_point_id = %pickup_point_id))]
    pub async fn add_product(
        &self,
        pickup_point_id: PickupPointId,
        product_type: &str,
    ) -> ServiceResult<Product> {
        const OP: &str = "add_product";

        let reception = self.open_reception(pickup_point_id, OP).await?;
        let product_type = self.resolve_product_type(product_type).await?;
        let product = Product::log(&reception, product_type, self.now()).traced(OP)?;

        // Fails with ReceptionNotOpen if the reception was closed since it was read.
        self.storage.insert_product(&product).await.traced(OP)?;

        tracing::info!(product_id = %product.id, reception_id = %reception.id, "product added");
        Ok(product)
    }

    /// Remove the most recently logged product of the open reception.
    ///
    /// Picking the product and deleting it is one storage step, so concurrent
    /// deletes each take a different product. If the reception closes first,
    /// nothing is removed and the call fails with `NoActiveReception`.
    #[instrument(skip(self), fields(pickup_point_id = %pickup_point_id))]
    pub async fn delete_last_product(&self, pickup_point_id: PickupPointId) -> ServiceResult<()> {
        const OP: &str = "delete_last_product";

        let reception = self.open_reception(pickup_point_id, OP).await?;
        let deleted = self
            .storage
            .delete_latest_product(reception.id)
            .await
            .traced(OP)?
            .ok_or(DomainError::NoProduct)
            .traced(OP)?;

        tracing::info!(product_id = %deleted, reception_id = %reception.id, "last product deleted");
        Ok(())
    }
}
