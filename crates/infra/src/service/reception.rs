use tracing::instrument;

use pvz_core::{DomainError, PickupPointId};
use pvz_pickup::Reception;

use super::{PvzService, ServiceResult, Traced};

impl PvzService {
    /// Open a new reception at a pickup point.
    ///
    /// The read of the current open reception only short-circuits the common
    /// case; the storage insert is what enforces "one open reception per
    /// pickup point" when two starts race.
    #[instrument(skip(self), fields(pickup_point_id = %pickup_point_id))]
    pub async fn start_reception(&self, pickup_point_id: PickupPointId) -> ServiceResult<Reception> {
        const OP: &str = "start_reception";

        if !self
            .storage
            .pickup_point_exists(pickup_point_id)
            .await
            .traced(OP)?
        {
            return Err(DomainError::PickupPointNotFound).traced(OP);
        }

        if self
            .storage
            .open_reception(pickup_point_id)
            .await
            .traced(OP)?
            .is_some()
        {
            return Err(DomainError::ActiveReceptionExists).traced(OP);
        }

        let reception = Reception::start(pickup_point_id, self.now());
        self.storage.insert_reception(&reception).await.traced(OP)?;

        tracing::info!(reception_id = %reception.id, "reception started");
        Ok(reception)
    }

    /// Close the open reception of a pickup point and return it.
    #[instrument(skip(self), fields(pickup_point_id = %pickup_point_id))]
    pub async fn close_reception(&self, pickup_point_id: PickupPointId) -> ServiceResult<Reception> {
        const OP: &str = "close_reception";

        let reception = self.open_reception(pickup_point_id, OP).await?;

        // Compare-and-set: a concurrent close makes this fail with NoActiveReception.
        let closed = self.storage.close_reception(reception.id).await.traced(OP)?;
        tracing::info!(reception_id = %closed.id, "reception closed");
        Ok(closed)
    }

    /// The open reception of a pickup point, or `NoActiveReception`.
    pub(super) async fn open_reception(
        &self,
        pickup_point_id: PickupPointId,
        operation: &'static str,
    ) -> ServiceResult<Reception> {
        self.storage
            .open_reception(pickup_point_id)
            .await
            .traced(operation)?
            .ok_or(DomainError::NoActiveReception)
            .traced(operation)
    }
}
