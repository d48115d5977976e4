//! Postgres adapter checks against a real database.
//!
//! Run with `TEST_DATABASE_URL=postgres://... cargo test -p pvz-infra -- --ignored`.
//! Each test registers its own pickup points, so the database can be shared.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use pvz_core::DomainError;
use pvz_infra::{PostgresPvzStorage, PvzService, PvzStorage, ServiceError};
use pvz_pickup::{ListQuery, RegisterPickupPoint};

async fn storage() -> Arc<PostgresPvzStorage> {
    let url = std::env::var("TEST_DATABASE_URL").expect("TEST_DATABASE_URL must be set");
    Arc::new(PostgresPvzStorage::connect(&url, 5).await.expect("connect"))
}

#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL"]
async fn reference_data_is_seeded() {
    let storage = storage().await;

    assert!(storage.resolve_city("Москва").await.unwrap().is_some());
    assert!(storage.resolve_city("Moscow").await.unwrap().is_none());
    assert!(storage.resolve_product_type("обувь").await.unwrap().is_some());
    assert!(storage.resolve_product_type("furniture").await.unwrap().is_none());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[ignore = "requires TEST_DATABASE_URL"]
async fn unique_index_admits_one_open_reception() {
    let storage = storage().await;
    let service = Arc::new(PvzService::new(storage.clone()));
    let point = service
        .create_pickup_point(RegisterPickupPoint::in_city("Казань"))
        .await
        .unwrap();

    let attempts: Vec<_> = (0..8)
        .map(|_| {
            let service = Arc::clone(&service);
            tokio::spawn(async move { service.start_reception(point.id).await })
        })
        .collect();

    let mut successes = 0;
    for attempt in attempts {
        match attempt.await.unwrap() {
            Ok(_) => successes += 1,
            Err(err) => assert_eq!(err, ServiceError::Domain(DomainError::ActiveReceptionExists)),
        }
    }
    assert_eq!(successes, 1);
}

#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL"]
async fn full_reception_cycle_round_trips() {
    let storage = storage().await;
    let service = PvzService::new(storage.clone());

    let point = service
        .create_pickup_point(RegisterPickupPoint::in_city("Санкт-Петербург"))
        .await
        .unwrap();
    let reception = service.start_reception(point.id).await.unwrap();
    let a = service.add_product(point.id, "электроника").await.unwrap();
    let b = service.add_product(point.id, "одежда").await.unwrap();
    let c = service.add_product(point.id, "обувь").await.unwrap();

    service.delete_last_product(point.id).await.unwrap();
    let left = storage
        .list_products_for_receptions(&[reception.id])
        .await
        .unwrap();
    assert_eq!(left.first().map(|p| p.id), Some(b.id));

    let closed = service.close_reception(point.id).await.unwrap();
    assert!(!closed.is_open());
    assert_eq!(
        service.add_product(point.id, "обувь").await,
        Err(ServiceError::Domain(DomainError::NoActiveReception))
    );

    let window_start = reception.started_at - Duration::seconds(1);
    let query = ListQuery::from_parts(
        Some(window_start),
        Some(Utc::now() + Duration::minutes(1)),
        None,
        Some(30),
        Utc::now(),
    )
    .unwrap();
    let tree = service.list_pickup_points(query).await.unwrap();
    let view = tree
        .iter()
        .find(|view| view.pickup_point.id == point.id)
        .expect("registered point is listed");

    let ids: Vec<_> = view.receptions[0].products.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![b.id, a.id]);
    assert!(!ids.contains(&c.id));
}

#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL"]
async fn registration_date_round_trips_with_microsecond_precision() {
    let storage = storage().await;
    let service = PvzService::new(storage.clone());
    let at: DateTime<Utc> = "2024-02-29T10:15:30.123456Z".parse().unwrap();

    let point = service
        .create_pickup_point(RegisterPickupPoint::in_city("Москва").registered_at(at))
        .await
        .unwrap();

    let all = storage.list_all_pickup_points().await.unwrap();
    let stored = all.iter().find(|p| p.id == point.id).unwrap();
    assert_eq!(stored.registered_at, at);
}

#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL"]
async fn generated_timestamps_match_their_stored_form() {
    let storage = storage().await;
    let service = PvzService::new(storage.clone());

    let point = service
        .create_pickup_point(RegisterPickupPoint::in_city("Москва"))
        .await
        .unwrap();
    let reception = service.start_reception(point.id).await.unwrap();
    let product = service.add_product(point.id, "обувь").await.unwrap();

    let all = storage.list_all_pickup_points().await.unwrap();
    assert!(all.contains(&point));
    assert_eq!(storage.open_reception(point.id).await.unwrap(), Some(reception.clone()));
    assert_eq!(
        storage.list_products_for_receptions(&[reception.id]).await.unwrap(),
        vec![product]
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[ignore = "requires TEST_DATABASE_URL"]
async fn concurrent_deletes_each_remove_one_product() {
    let storage = storage().await;
    let service = Arc::new(PvzService::new(storage.clone()));
    let point = service
        .create_pickup_point(RegisterPickupPoint::in_city("Казань"))
        .await
        .unwrap();
    let reception = service.start_reception(point.id).await.unwrap();

    for _ in 0..10 {
        let oldest = service.add_product(point.id, "электроника").await.unwrap();
        service.add_product(point.id, "одежда").await.unwrap();
        service.add_product(point.id, "обувь").await.unwrap();

        let deletes: Vec<_> = (0..2)
            .map(|_| {
                let service = Arc::clone(&service);
                tokio::spawn(async move { service.delete_last_product(point.id).await })
            })
            .collect();
        for delete in deletes {
            delete.await.unwrap().unwrap();
        }

        let remaining = storage
            .list_products_for_receptions(&[reception.id])
            .await
            .unwrap();
        assert_eq!(remaining, vec![oldest]);

        service.delete_last_product(point.id).await.unwrap();
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[ignore = "requires TEST_DATABASE_URL"]
async fn racing_closes_and_deletes_stay_consistent() {
    let storage = storage().await;
    let service = Arc::new(PvzService::new(storage.clone()));

    for _ in 0..10 {
        let point = service
            .create_pickup_point(RegisterPickupPoint::in_city("Москва"))
            .await
            .unwrap();
        let reception = service.start_reception(point.id).await.unwrap();
        for product_type in ["электроника", "одежда", "обувь"] {
            service.add_product(point.id, product_type).await.unwrap();
        }

        let delete = {
            let service = Arc::clone(&service);
            tokio::spawn(async move { service.delete_last_product(point.id).await })
        };
        let closes: Vec<_> = (0..2)
            .map(|_| {
                let service = Arc::clone(&service);
                tokio::spawn(async move { service.close_reception(point.id).await })
            })
            .collect();

        let mut closed = 0;
        for close in closes {
            match close.await.unwrap() {
                Ok(_) => closed += 1,
                Err(err) => assert_eq!(err, ServiceError::Domain(DomainError::NoActiveReception)),
            }
        }
        assert_eq!(closed, 1);

        let deleted = delete.await.unwrap();
        let remaining = storage
            .list_products_for_receptions(&[reception.id])
            .await
            .unwrap();
        match deleted {
            Ok(()) => assert_eq!(remaining.len(), 2),
            Err(err) => {
                assert_eq!(err, ServiceError::Domain(DomainError::NoActiveReception));
                assert_eq!(remaining.len(), 3);
            }
        }
    }
}
