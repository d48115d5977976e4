//! Postgres-backed storage.
//!
//! Concurrency guards live in the database so they hold across processes:
//!
//! | Operation | Guard |
//! |-----------|-------|
//! | `insert_reception` | partial unique index `receptions_one_open_per_pvz` on `pvz_id WHERE status = 'in_progress'` |
//! | `insert_product` | reception row locked `FOR SHARE` and checked open inside the insert transaction |
//! | `close_reception` | `UPDATE ... WHERE status = 'in_progress'`, zero rows means already closed |
//! | `delete_latest_product` | reception row locked `FOR UPDATE`, latest product picked and deleted in the same transaction |
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Error Code | StorageError |
//! |------------|----------------------|--------------|
//! | Database (unique violation on the open-reception index) | `23505` | `OpenReceptionExists` |
//! | Database (other unique violation) | `23505` | `DuplicateId` |
//! | Database (other) | any | `Database` |
//! | PoolClosed / PoolTimedOut / Io | N/A | `Unavailable` |
//! | ColumnDecode / Decode | N/A | `Corrupt` |

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use tracing::instrument;
use uuid::Uuid;

use pvz_core::{CityId, PickupPointId, ProductId, ProductTypeId, ReceptionId};
use pvz_pickup::{City, PickupPoint, Product, ProductType, Reception, ReceptionStatus, TimeWindow};

use super::r#trait::{PvzStorage, StorageError};

const OPEN_RECEPTION_INDEX: &str = "receptions_one_open_per_pvz";

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

/// Postgres-backed storage sharing one connection pool.
#[derive(Debug, Clone)]
pub struct PostgresPvzStorage {
    pool: Arc<PgPool>,
}

impl PostgresPvzStorage {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Open a pool against `database_url` and bring the schema up to date.
    #[instrument(skip(database_url), err)]
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, StorageError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;

        MIGRATOR
            .run(&pool)
            .await
            .map_err(|e| StorageError::Database(format!("migration failed: {e}")))?;

        tracing::info!(max_connections, "postgres storage ready");
        Ok(Self::new(pool))
    }
}

#[async_trait]
impl PvzStorage for PostgresPvzStorage {
    #[instrument(skip(self), err)]
    async fn resolve_city(&self, name: &str) -> Result<Option<City>, StorageError> {
        let row = sqlx::query("SELECT id, name FROM cities WHERE name = $1")
            .bind(name)
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("resolve_city", e))?;

        row.map(|row| city_from_row(&row, "id", "name")).transpose()
    }

    #[instrument(skip(self), err)]
    async fn resolve_product_type(&self, name: &str) -> Result<Option<ProductType>, StorageError> {
        let row = sqlx::query("SELECT id, name FROM product_types WHERE name = $1")
            .bind(name)
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("resolve_product_type", e))?;

        row.map(|row| product_type_from_row(&row, "id", "name"))
            .transpose()
    }

    #[instrument(skip(self), err)]
    async fn list_cities(&self) -> Result<Vec<City>, StorageError> {
        let rows = sqlx::query("SELECT id, name FROM cities ORDER BY id")
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_cities", e))?;

        rows.iter()
            .map(|row| city_from_row(row, "id", "name"))
            .collect()
    }

    #[instrument(skip(self), err)]
    async fn list_product_types(&self) -> Result<Vec<ProductType>, StorageError> {
        let rows = sqlx::query("SELECT id, name FROM product_types ORDER BY id")
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_product_types", e))?;

        rows.iter()
            .map(|row| product_type_from_row(row, "id", "name"))
            .collect()
    }

    #[instrument(skip(self, point), fields(pickup_point_id = %point.id), err)]
    async fn insert_pickup_point(&self, point: &PickupPoint) -> Result<(), StorageError> {
        sqlx::query("INSERT INTO pvz (id, registration_date, city_id) VALUES ($1, $2, $3)")
            .bind(point.id.as_uuid())
            .bind(point.registered_at)
            .bind(point.city.id.0)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("insert_pickup_point", e))?;
        Ok(())
    }

    #[instrument(skip(self), fields(pickup_point_id = %id), err)]
    async fn pickup_point_exists(&self, id: PickupPointId) -> Result<bool, StorageError> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM pvz WHERE id = $1)")
            .bind(id.as_uuid())
            .fetch_one(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("pickup_point_exists", e))?;
        Ok(exists)
    }

    #[instrument(skip(self), err)]
    async fn list_all_pickup_points(&self) -> Result<Vec<PickupPoint>, StorageError> {
        let rows = sqlx::query(
            r#"
            SELECT p.id, p.registration_date, c.id AS city_id, c.name AS city_name
            FROM pvz p
            JOIN cities c ON c.id = p.city_id
            ORDER BY p.registration_date DESC, p.id DESC
            "#,
        )
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_all_pickup_points", e))?;

        rows.iter().map(pickup_point_from_row).collect()
    }

    #[instrument(skip(self), err)]
    async fn list_pickup_points(
        &self,
        window: TimeWindow,
        limit: u32,
        offset: u64,
    ) -> Result<Vec<PickupPoint>, StorageError> {
        let rows = sqlx::query(
            r#"
            SELECT p.id, p.registration_date, c.id AS city_id, c.name AS city_name
            FROM pvz p
            JOIN cities c ON c.id = p.city_id
            WHERE EXISTS (
                SELECT 1 FROM receptions r
                WHERE r.pvz_id = p.id AND r.date_time BETWEEN $1 AND $2
            )
            ORDER BY p.registration_date DESC, p.id DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(window.from)
        .bind(window.to)
        .bind(i64::from(limit))
        .bind(i64::try_from(offset).unwrap_or(i64::MAX))
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_pickup_points", e))?;

        rows.iter().map(pickup_point_from_row).collect()
    }

    #[instrument(skip(self, reception), fields(reception_id = %reception.id, pickup_point_id = %reception.pickup_point_id), err)]
    async fn insert_reception(&self, reception: &Reception) -> Result<(), StorageError> {
        sqlx::query("INSERT INTO receptions (id, date_time, pvz_id, status) VALUES ($1, $2, $3, $4)")
            .bind(reception.id.as_uuid())
            .bind(reception.started_at)
            .bind(reception.pickup_point_id.as_uuid())
            .bind(reception.status.as_str())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("insert_reception", e))?;
        Ok(())
    }

    #[instrument(skip(self), fields(pickup_point_id = %pickup_point_id), err)]
    async fn open_reception(
        &self,
        pickup_point_id: PickupPointId,
    ) -> Result<Option<Reception>, StorageError> {
        let row = sqlx::query(
            r#"
            SELECT id, date_time, pvz_id, status
            FROM receptions
            WHERE pvz_id = $1 AND status = 'in_progress'
            ORDER BY date_time DESC, id DESC
            LIMIT 1
            "#,
        )
        .bind(pickup_point_id.as_uuid())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("open_reception", e))?;

        row.as_ref().map(reception_from_row).transpose()
    }

    #[instrument(skip(self), fields(reception_id = %id), err)]
    async fn close_reception(&self, id: ReceptionId) -> Result<Reception, StorageError> {
        let row = sqlx::query(
            r#"
            UPDATE receptions
            SET status = 'close'
            WHERE id = $1 AND status = 'in_progress'
            RETURNING id, date_time, pvz_id, status
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("close_reception", e))?;

        match row {
            Some(row) => reception_from_row(&row),
            None => Err(StorageError::ReceptionNotOpen),
        }
    }

    #[instrument(skip(self, pickup_point_ids), fields(point_count = pickup_point_ids.len()), err)]
    async fn list_receptions_for_pickup_points(
        &self,
        pickup_point_ids: &[PickupPointId],
        window: TimeWindow,
    ) -> Result<Vec<Reception>, StorageError> {
        let ids: Vec<Uuid> = pickup_point_ids.iter().map(|id| *id.as_uuid()).collect();
        let rows = sqlx::query(
            r#"
            SELECT id, date_time, pvz_id, status
            FROM receptions
            WHERE pvz_id = ANY($1) AND date_time BETWEEN $2 AND $3
            ORDER BY date_time DESC, id DESC
            "#,
        )
        .bind(&ids)
        .bind(window.from)
        .bind(window.to)
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_receptions_for_pickup_points", e))?;

        rows.iter().map(reception_from_row).collect()
    }

    #[instrument(skip(self, product), fields(product_id = %product.id, reception_id = %product.reception_id), err)]
    async fn insert_product(&self, product: &Product) -> Result<(), StorageError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("insert_product", e))?;

        // Shared lock: concurrent inserts proceed, a concurrent close or delete waits.
        let status: Option<String> =
            sqlx::query_scalar("SELECT status FROM receptions WHERE id = $1 FOR SHARE")
                .bind(product.reception_id.as_uuid())
                .fetch_optional(&mut *tx)
                .await
                .map_err(|e| map_sqlx_error("insert_product", e))?;

        if status.as_deref() != Some(ReceptionStatus::Open.as_str()) {
            return Err(StorageError::ReceptionNotOpen);
        }

        sqlx::query(
            "INSERT INTO products (id, date_time, type_id, reception_id) VALUES ($1, $2, $3, $4)",
        )
        .bind(product.id.as_uuid())
        .bind(product.created_at)
        .bind(product.product_type.id.0)
        .bind(product.reception_id.as_uuid())
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("insert_product", e))?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("insert_product", e))
    }

    #[instrument(skip(self), fields(reception_id = %reception_id), err)]
    async fn delete_latest_product(
        &self,
        reception_id: ReceptionId,
    ) -> Result<Option<ProductId>, StorageError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("delete_latest_product", e))?;

        // Serialises against concurrent deletes, closes and inserts on the same reception.
        let status: Option<String> =
            sqlx::query_scalar("SELECT status FROM receptions WHERE id = $1 FOR UPDATE")
                .bind(reception_id.as_uuid())
                .fetch_optional(&mut *tx)
                .await
                .map_err(|e| map_sqlx_error("delete_latest_product", e))?;

        if status.as_deref() != Some(ReceptionStatus::Open.as_str()) {
            return Err(StorageError::ReceptionNotOpen);
        }

        let deleted: Option<Uuid> = sqlx::query_scalar(
            r#"
            DELETE FROM products
            WHERE id = (
                SELECT id FROM products
                WHERE reception_id = $1
                ORDER BY date_time DESC, seq DESC
                LIMIT 1
            )
            RETURNING id
            "#,
        )
        .bind(reception_id.as_uuid())
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("delete_latest_product", e))?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("delete_latest_product", e))?;

        Ok(deleted.map(ProductId::from_uuid))
    }

    #[instrument(skip(self, reception_ids), fields(reception_count = reception_ids.len()), err)]
    async fn list_products_for_receptions(
        &self,
        reception_ids: &[ReceptionId],
    ) -> Result<Vec<Product>, StorageError> {
        let ids: Vec<Uuid> = reception_ids.iter().map(|id| *id.as_uuid()).collect();
        let rows = sqlx::query(
            r#"
            SELECT pr.id, pr.date_time, pr.reception_id, t.id AS type_id, t.name AS type_name
            FROM products pr
            JOIN product_types t ON t.id = pr.type_id
            WHERE pr.reception_id = ANY($1)
            ORDER BY pr.date_time DESC, pr.seq DESC
            "#,
        )
        .bind(&ids)
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_products_for_receptions", e))?;

        rows.iter().map(product_from_row).collect()
    }
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StorageError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());
            match db_err.code().as_deref() {
                Some("23505") if db_err.constraint() == Some(OPEN_RECEPTION_INDEX) => {
                    StorageError::OpenReceptionExists
                }
                Some("23505") => StorageError::DuplicateId(msg),
                _ => StorageError::Database(msg),
            }
        }
        sqlx::Error::PoolClosed | sqlx::Error::PoolTimedOut | sqlx::Error::Io(_) => {
            StorageError::Unavailable(format!("{operation}: {err}"))
        }
        sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => {
            StorageError::Corrupt(format!("{operation}: {err}"))
        }
        _ => StorageError::Database(format!("sqlx error in {operation}: {err}")),
    }
}

fn decode<T>(row: &PgRow, column: &str) -> Result<T, StorageError>
where
    T: for<'r> sqlx::Decode<'r, sqlx::Postgres> + sqlx::Type<sqlx::Postgres>,
{
    row.try_get(column)
        .map_err(|e| StorageError::Corrupt(format!("column {column}: {e}")))
}

fn city_from_row(row: &PgRow, id: &str, name: &str) -> Result<City, StorageError> {
    Ok(City::new(CityId(decode(row, id)?), decode::<String>(row, name)?))
}

fn product_type_from_row(row: &PgRow, id: &str, name: &str) -> Result<ProductType, StorageError> {
    Ok(ProductType::new(
        ProductTypeId(decode(row, id)?),
        decode::<String>(row, name)?,
    ))
}

fn pickup_point_from_row(row: &PgRow) -> Result<PickupPoint, StorageError> {
    Ok(PickupPoint {
        id: PickupPointId::from_uuid(decode(row, "id")?),
        registered_at: decode::<DateTime<Utc>>(row, "registration_date")?,
        city: city_from_row(row, "city_id", "city_name")?,
    })
}

fn reception_from_row(row: &PgRow) -> Result<Reception, StorageError> {
    let status: String = decode(row, "status")?;
    let status = status
        .parse::<ReceptionStatus>()
        .map_err(|e| StorageError::Corrupt(e.to_string()))?;

    Ok(Reception {
        id: ReceptionId::from_uuid(decode(row, "id")?),
        started_at: decode::<DateTime<Utc>>(row, "date_time")?,
        pickup_point_id: PickupPointId::from_uuid(decode(row, "pvz_id")?),
        status,
    })
}

fn product_from_row(row: &PgRow) -> Result<Product, StorageError> {
    Ok(Product {
        id: ProductId::from_uuid(decode(row, "id")?),
        created_at: decode::<DateTime<Utc>>(row, "date_time")?,
        product_type: product_type_from_row(row, "type_id", "type_name")?,
        reception_id: ReceptionId::from_uuid(decode(row, "reception_id")?),
    })
}
