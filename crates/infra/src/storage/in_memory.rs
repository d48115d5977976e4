use std::cmp::Reverse;
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use pvz_core::{CityId, PickupPointId, ProductId, ProductTypeId, ReceptionId};
use pvz_pickup::{City, PickupPoint, Product, ProductType, Reception, TimeWindow};

use super::r#trait::{PvzStorage, StorageError};
use super::{SEED_CITIES, SEED_PRODUCT_TYPES};

#[derive(Debug, Clone)]
struct StoredProduct {
    /// Insertion order; breaks ties between equal timestamps.
    seq: u64,
    product: Product,
}

#[derive(Debug, Default)]
struct State {
    cities: Vec<City>,
    product_types: Vec<ProductType>,
    points: HashMap<PickupPointId, PickupPoint>,
    receptions: HashMap<ReceptionId, Reception>,
    products: Vec<StoredProduct>,
    next_seq: u64,
}

impl State {
    fn latest_product(&self, reception_id: ReceptionId) -> Option<&StoredProduct> {
        self.products
            .iter()
            .filter(|p| p.product.reception_id == reception_id)
            .max_by_key(|p| (p.product.created_at, p.seq))
    }
}

/// In-memory storage for tests/dev.
///
/// A single lock guards all tables, so every conditional write observes a
/// consistent snapshot and applies atomically.
#[derive(Debug)]
pub struct InMemoryPvzStorage {
    state: RwLock<State>,
}

impl InMemoryPvzStorage {
    /// Storage seeded with the default city and product type tables.
    pub fn new() -> Self {
        Self::with_reference_data(SEED_CITIES, SEED_PRODUCT_TYPES)
    }

    pub fn with_reference_data(cities: &[&str], product_types: &[&str]) -> Self {
        let cities = (1..)
            .zip(cities)
            .map(|(id, name)| City::new(CityId(id), *name))
            .collect();
        let product_types = (1..)
            .zip(product_types)
            .map(|(id, name)| ProductType::new(ProductTypeId(id), *name))
            .collect();

        Self {
            state: RwLock::new(State {
                cities,
                product_types,
                ..State::default()
            }),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, State>, StorageError> {
        self.state
            .read()
            .map_err(|_| StorageError::Unavailable("in-memory storage lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, State>, StorageError> {
        self.state
            .write()
            .map_err(|_| StorageError::Unavailable("in-memory storage lock poisoned".to_string()))
    }
}

impl Default for InMemoryPvzStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PvzStorage for InMemoryPvzStorage {
    async fn resolve_city(&self, name: &str) -> Result<Option<City>, StorageError> {
        let state = self.read()?;
        Ok(state.cities.iter().find(|c| c.name == name).cloned())
    }

    async fn resolve_product_type(&self, name: &str) -> Result<Option<ProductType>, StorageError> {
        let state = self.read()?;
        Ok(state.product_types.iter().find(|t| t.name == name).cloned())
    }

    async fn list_cities(&self) -> Result<Vec<City>, StorageError> {
        Ok(self.read()?.cities.clone())
    }

    async fn list_product_types(&self) -> Result<Vec<ProductType>, StorageError> {
        Ok(self.read()?.product_types.clone())
    }

    async fn insert_pickup_point(&self, point: &PickupPoint) -> Result<(), StorageError> {
        let mut state = self.write()?;
        if state.points.contains_key(&point.id) {
            return Err(StorageError::DuplicateId(point.id.to_string()));
        }
        state.points.insert(point.id, point.clone());
        Ok(())
    }

    async fn pickup_point_exists(&self, id: PickupPointId) -> Result<bool, StorageError> {
        Ok(self.read()?.points.contains_key(&id))
    }

    async fn list_all_pickup_points(&self) -> Result<Vec<PickupPoint>, StorageError> {
        let state = self.read()?;
        let mut points: Vec<PickupPoint> = state.points.values().cloned().collect();
        points.sort_by_key(|p| Reverse((p.registered_at, p.id)));
        Ok(points)
    }

    async fn list_pickup_points(
        &self,
        window: TimeWindow,
        limit: u32,
        offset: u64,
    ) -> Result<Vec<PickupPoint>, StorageError> {
        let state = self.read()?;
        let mut points: Vec<PickupPoint> = state
            .points
            .values()
            .filter(|p| {
                state
                    .receptions
                    .values()
                    .any(|r| r.pickup_point_id == p.id && window.contains(r.started_at))
            })
            .cloned()
            .collect();
        points.sort_by_key(|p| Reverse((p.registered_at, p.id)));

        let skip = usize::try_from(offset).unwrap_or(usize::MAX);
        Ok(points.into_iter().skip(skip).take(limit as usize).collect())
    }

    async fn insert_reception(&self, reception: &Reception) -> Result<(), StorageError> {
        let mut state = self.write()?;
        if state.receptions.contains_key(&reception.id) {
            return Err(StorageError::DuplicateId(reception.id.to_string()));
        }
        if reception.is_open()
            && state
                .receptions
                .values()
                .any(|r| r.pickup_point_id == reception.pickup_point_id && r.is_open())
        {
            return Err(StorageError::OpenReceptionExists);
        }
        state.receptions.insert(reception.id, reception.clone());
        Ok(())
    }

    async fn open_reception(
        &self,
        pickup_point_id: PickupPointId,
    ) -> Result<Option<Reception>, StorageError> {
        let state = self.read()?;
        Ok(state
            .receptions
            .values()
            .filter(|r| r.pickup_point_id == pickup_point_id && r.is_open())
            .max_by_key(|r| (r.started_at, r.id))
            .cloned())
    }

    async fn close_reception(&self, id: ReceptionId) -> Result<Reception, StorageError> {
        let mut state = self.write()?;
        let reception = state
            .receptions
            .get_mut(&id)
            .ok_or(StorageError::ReceptionNotOpen)?;
        reception
            .close()
            .map_err(|_| StorageError::ReceptionNotOpen)?;
        Ok(reception.clone())
    }

    async fn list_receptions_for_pickup_points(
        &self,
        pickup_point_ids: &[PickupPointId],
        window: TimeWindow,
    ) -> Result<Vec<Reception>, StorageError> {
        let state = self.read()?;
        let mut receptions: Vec<Reception> = state
            .receptions
            .values()
            .filter(|r| pickup_point_ids.contains(&r.pickup_point_id) && window.contains(r.started_at))
            .cloned()
            .collect();
        receptions.sort_by_key(|r| Reverse((r.started_at, r.id)));
        Ok(receptions)
    }

    async fn insert_product(&self, product: &Product) -> Result<(), StorageError> {
        let mut state = self.write()?;
        let open = state
            .receptions
            .get(&product.reception_id)
            .is_some_and(Reception::is_open);
        if !open {
            return Err(StorageError::ReceptionNotOpen);
        }
        if state.products.iter().any(|p| p.product.id == product.id) {
            return Err(StorageError::DuplicateId(product.id.to_string()));
        }

        state.next_seq += 1;
        let seq = state.next_seq;
        state.products.push(StoredProduct {
            seq,
            product: product.clone(),
        });
        Ok(())
    }

    async fn delete_latest_product(
        &self,
        reception_id: ReceptionId,
    ) -> Result<Option<ProductId>, StorageError> {
        let mut state = self.write()?;
        let open = state
            .receptions
            .get(&reception_id)
            .is_some_and(Reception::is_open);
        if !open {
            return Err(StorageError::ReceptionNotOpen);
        }

        let Some(latest) = state.latest_product(reception_id).map(|p| p.product.id) else {
            return Ok(None);
        };
        state.products.retain(|p| p.product.id != latest);
        Ok(Some(latest))
    }

    async fn list_products_for_receptions(
        &self,
        reception_ids: &[ReceptionId],
    ) -> Result<Vec<Product>, StorageError> {
        let state = self.read()?;
        let mut products: Vec<&StoredProduct> = state
            .products
            .iter()
            .filter(|p| reception_ids.contains(&p.product.reception_id))
            .collect();
        products.sort_by_key(|p| Reverse((p.product.created_at, p.seq)));
        Ok(products.into_iter().map(|p| p.product.clone()).collect())
    }
}
