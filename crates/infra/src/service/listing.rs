use tracing::instrument;

use pvz_core::{PickupPointId, ReceptionId};
use pvz_pickup::{assemble, ListQuery, PickupPointView};

use super::{PvzService, ServiceResult, Traced};

impl PvzService {
    /// Windowed, paginated pickup point → reception → product tree.
    ///
    /// Three sequential reads (points, receptions, products) followed by an
    /// in-memory grouping that keeps each read's order. Any storage failure
    /// aborts the whole call; an empty first page short-circuits the rest.
    #[instrument(
        skip(self, query),
        fields(page = query.page.number(), limit = query.page.limit())
    )]
    pub async fn list_pickup_points(&self, query: ListQuery) -> ServiceResult<Vec<PickupPointView>> {
        const OP: &str = "list_pickup_points";

        let points = self
            .storage
            .list_pickup_points(query.window, query.page.limit(), query.page.offset())
            .await
            .traced(OP)?;
        if points.is_empty() {
            return Ok(Vec::new());
        }

        let point_ids: Vec<PickupPointId> = points.iter().map(|p| p.id).collect();
        let receptions = self
            .storage
            .list_receptions_for_pickup_points(&point_ids, query.window)
            .await
            .traced(OP)?;

        let reception_ids: Vec<ReceptionId> = receptions.iter().map(|r| r.id).collect();
        let products = if reception_ids.is_empty() {
            Vec::new()
        } else {
            self.storage
                .list_products_for_receptions(&reception_ids)
                .await
                .traced(OP)?
        };

        tracing::debug!(
            points = points.len(),
            receptions = receptions.len(),
            products = products.len(),
            "pickup point listing assembled"
        );
        Ok(assemble(points, receptions, products))
    }
}
