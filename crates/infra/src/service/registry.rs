use tracing::instrument;

use pvz_pickup::{PickupPoint, RegisterPickupPoint};

use super::{PvzService, ServiceResult, Traced};

impl PvzService {
    /// Register a pickup point in a known city.
    ///
    /// A missing id is generated and a missing registration time defaults to
    /// now. Reusing an existing id fails with `AlreadyExists`.
    #[instrument(skip(self, request), fields(city = %request.city_name))]
    pub async fn create_pickup_point(&self, request: RegisterPickupPoint) -> ServiceResult<PickupPoint> {
        const OP: &str = "create_pickup_point";
        request.validate().traced(OP)?;

        let city = self.resolve_city(&request.city_name).await?;
        let point = request.into_pickup_point(city, self.now());

        self.storage.insert_pickup_point(&point).await.traced(OP)?;
        tracing::info!(pickup_point_id = %point.id, "pickup point registered");
        Ok(point)
    }

    /// Every pickup point, newest registration first, without pagination.
    #[instrument(skip(self))]
    pub async fn list_all_pickup_points(&self) -> ServiceResult<Vec<PickupPoint>> {
        self.storage
            .list_all_pickup_points()
            .await
            .traced("list_all_pickup_points")
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{Duration, TimeZone, Utc};
    use pvz_core::{CityId, DomainError, PickupPointId};
    use pvz_pickup::RegisterPickupPoint;

    use crate::service::test_support::{base_time, service, SteppingClock};
    use crate::service::{PvzService, ServiceError};
    use crate::storage::{InMemoryPvzStorage, PvzStorage, SEED_PRODUCT_TYPES};

    #[tokio::test]
    async fn resolves_city_and_generates_missing_fields() {
        let storage = Arc::new(InMemoryPvzStorage::with_reference_data(
            &["Казань", "Санкт-Петербург", "Москва"],
            SEED_PRODUCT_TYPES,
        ));
        let clock = Arc::new(SteppingClock::starting_at(base_time()));
        let service = PvzService::with_clock(storage.clone(), clock);

        let point = service
            .create_pickup_point(RegisterPickupPoint::in_city("Москва"))
            .await
            .unwrap();

        assert_eq!(point.city.id, CityId(3));
        assert_eq!(point.city.name, "Москва");
        assert_eq!(point.registered_at, base_time());
        assert!(storage.pickup_point_exists(point.id).await.unwrap());
    }

    #[tokio::test]
    async fn keeps_caller_supplied_id_and_date() {
        let (service, _, _) = service();
        let id = PickupPointId::new();
        let at = Utc.with_ymd_and_hms(2024, 12, 31, 23, 59, 0).unwrap();

        let point = service
            .create_pickup_point(
                RegisterPickupPoint::in_city("Казань")
                    .with_id(id)
                    .registered_at(at),
            )
            .await
            .unwrap();

        assert_eq!(point.id, id);
        assert_eq!(point.registered_at, at);
    }

    #[tokio::test]
    async fn unknown_city_is_rejected_without_insert() {
        let (service, storage, _) = service();

        let err = service
            .create_pickup_point(RegisterPickupPoint::in_city("Новосибирск"))
            .await
            .unwrap_err();

        assert_eq!(err, ServiceError::Domain(DomainError::CityNotAllowed));
        assert!(storage.list_all_pickup_points().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn duplicate_id_is_already_exists() {
        let (service, _, _) = service();
        let id = PickupPointId::new();

        service
            .create_pickup_point(RegisterPickupPoint::in_city("Москва").with_id(id))
            .await
            .unwrap();
        let err = service
            .create_pickup_point(RegisterPickupPoint::in_city("Казань").with_id(id))
            .await
            .unwrap_err();

        assert_eq!(err, ServiceError::Domain(DomainError::AlreadyExists));
    }

    #[tokio::test]
    async fn list_all_is_unfiltered_and_newest_first() {
        let (service, _, _) = service();
        let old = base_time() - Duration::days(30);

        let older = service
            .create_pickup_point(RegisterPickupPoint::in_city("Москва").registered_at(old))
            .await
            .unwrap();
        let newer = service
            .create_pickup_point(RegisterPickupPoint::in_city("Казань"))
            .await
            .unwrap();

        let all = service.list_all_pickup_points().await.unwrap();
        assert_eq!(all, vec![newer, older]);
    }
}
