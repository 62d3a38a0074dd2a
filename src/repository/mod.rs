//! Transactional CRUD and proximity search over the `addresses` table.
//!
//! Callers are expected to have validated create/update payloads already;
//! nothing read back from the store is re-validated.

pub mod store;

use sqlx::sqlite::SqlitePool;
use sqlx::{QueryBuilder, Sqlite, Transaction};
use tracing::{debug, info, instrument, warn};

use crate::domain::{Address, AddressCreate, AddressPatch, ProximityQuery};
use crate::error::{is_unique_violation, AddressError};
use crate::geo::{distance_km, BoundingBox, LongitudeRange};

const SELECT_ADDRESS: &str =
    "SELECT id, name, street, city, state, country, latitude, longitude FROM addresses";
const SELECT_ADDRESS_BY_ID: &str =
    "SELECT id, name, street, city, state, country, latitude, longitude FROM addresses WHERE id = ?";

/// Handle to the address table. Cheap to clone; clones share the pool.
#[derive(Clone)]
pub struct AddressRepository {
    pool: SqlitePool,
}

impl AddressRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Opens a transaction that holds the write lock from its first statement.
    ///
    /// A deferred transaction that reads first cannot wait for the write lock
    /// later; SQLite reports it busy at once.
    async fn begin_write(&self) -> Result<Transaction<'static, Sqlite>, sqlx::Error> {
        self.pool.begin_with("BEGIN IMMEDIATE").await
    }

    /// Inserts a new address and returns it with its assigned id.
    ///
    /// Fails with [`AddressError::Conflict`] when `name` is already taken.
    #[instrument(fields(address_name = %address.name), skip(self, address))]
    pub async fn create(&self, address: &AddressCreate) -> Result<Address, AddressError> {
        let mut tx = self.begin_write().await?;

        let created = sqlx::query_as::<_, Address>(
            "INSERT INTO addresses (name, street, city, state, country, latitude, longitude)
             VALUES (?, ?, ?, ?, ?, ?, ?)
             RETURNING id, name, street, city, state, country, latitude, longitude",
        )
        .bind(&address.name)
        .bind(&address.street)
        .bind(&address.city)
        .bind(&address.state)
        .bind(&address.country)
        .bind(address.latitude)
        .bind(address.longitude)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                warn!("Address name already taken");
                AddressError::Conflict(address.name.clone())
            } else {
                AddressError::from(e)
            }
        })?;

        tx.commit().await?;
        debug!(address_id = created.id, "Address inserted");
        Ok(created)
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: i64) -> Result<Address, AddressError> {
        sqlx::query_as::<_, Address>(SELECT_ADDRESS_BY_ID)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(AddressError::NotFound(id))
    }

    /// Writes the present fields of `patch` and returns the full updated row.
    ///
    /// The write and the re-read share one transaction. An empty patch
    /// touches nothing and returns the current row.
    #[instrument(skip(self, patch))]
    pub async fn update(&self, id: i64, patch: &AddressPatch) -> Result<Address, AddressError> {
        let mut tx = self.begin_write().await?;

        if !patch.is_empty() {
            let mut builder = update_statement(id, patch);
            let result = builder.build().execute(&mut *tx).await.map_err(|e| {
                if is_unique_violation(&e) {
                    warn!("Update would duplicate an address name");
                    AddressError::BadRequest(format!(
                        "name {:?} is already used by another address",
                        patch.name.as_deref().unwrap_or_default()
                    ))
                } else {
                    AddressError::from(e)
                }
            })?;
            if result.rows_affected() == 0 {
                return Err(AddressError::NotFound(id));
            }
        }

        let updated = sqlx::query_as::<_, Address>(SELECT_ADDRESS_BY_ID)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(AddressError::NotFound(id))?;

        tx.commit().await?;
        Ok(updated)
    }

    /// Removes an address. A missing id is an error, not a no-op.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: i64) -> Result<(), AddressError> {
        let mut tx = self.begin_write().await?;

        let exists = sqlx::query_scalar::<_, i64>("SELECT id FROM addresses WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
        if exists.is_none() {
            return Err(AddressError::NotFound(id));
        }

        sqlx::query("DELETE FROM addresses WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Every address whose geodesic distance from the origin is at most
    /// `query.distance_km`.
    ///
    /// Scans the whole table and checks each row exactly; cost grows
    /// linearly with the number of stored addresses. Result order is the
    /// store's iteration order.
    #[instrument(
        fields(distance_km = query.distance_km, latitude = query.origin.latitude, longitude = query.origin.longitude),
        skip(self, query)
    )]
    pub async fn find_within_distance(&self, query: &ProximityQuery) -> Result<Vec<Address>, AddressError> {
        let all = sqlx::query_as::<_, Address>(SELECT_ADDRESS)
            .fetch_all(&self.pool)
            .await?;
        let scanned = all.len();

        let matches = within(all, query);
        info!(scanned, matched = matches.len(), "Proximity scan finished");
        Ok(matches)
    }

    /// Same result set as [`find_within_distance`](Self::find_within_distance),
    /// but only rows inside the search circle's bounding box are loaded.
    #[instrument(
        fields(distance_km = query.distance_km, latitude = query.origin.latitude, longitude = query.origin.longitude),
        skip(self, query)
    )]
    pub async fn find_within_distance_prefiltered(
        &self,
        query: &ProximityQuery,
    ) -> Result<Vec<Address>, AddressError> {
        let Some(bbox) = BoundingBox::around(query.origin, query.distance_km) else {
            return Ok(Vec::new());
        };

        let mut builder = QueryBuilder::<Sqlite>::new(SELECT_ADDRESS);
        builder
            .push(" WHERE latitude BETWEEN ")
            .push_bind(bbox.min_latitude)
            .push(" AND ")
            .push_bind(bbox.max_latitude);
        match bbox.longitude {
            LongitudeRange::Full => {}
            LongitudeRange::Contiguous { min, max } => {
                builder.push(" AND longitude BETWEEN ").push_bind(min).push(" AND ").push_bind(max);
            }
            LongitudeRange::Wrapped { west, east } => {
                builder
                    .push(" AND (longitude >= ")
                    .push_bind(west)
                    .push(" OR longitude <= ")
                    .push_bind(east)
                    .push(")");
            }
        }

        let candidates = builder.build_query_as::<Address>().fetch_all(&self.pool).await?;
        let scanned = candidates.len();

        let matches = within(candidates, query);
        debug_assert!(matches.iter().all(|a| bbox.contains(a.coordinates())));
        info!(scanned, matched = matches.len(), "Prefiltered proximity search finished");
        Ok(matches)
    }
}

fn within(addresses: Vec<Address>, query: &ProximityQuery) -> Vec<Address> {
    addresses
        .into_iter()
        .filter(|a| distance_km(query.origin, a.coordinates()) <= query.distance_km)
        .collect()
}

fn update_statement(id: i64, patch: &AddressPatch) -> QueryBuilder<'static, Sqlite> {
    let mut builder = QueryBuilder::<Sqlite>::new("UPDATE addresses SET ");
    let mut columns = builder.separated(", ");

    let text_columns = [
        ("name", &patch.name),
        ("street", &patch.street),
        ("city", &patch.city),
        ("state", &patch.state),
        ("country", &patch.country),
    ];
    for (column, value) in text_columns {
        if let Some(value) = value {
            columns.push(format!("{column} = ")).push_bind_unseparated(value.clone());
        }
    }
    if let Some(latitude) = patch.latitude {
        columns.push("latitude = ").push_bind_unseparated(latitude);
    }
    if let Some(longitude) = patch.longitude {
        columns.push("longitude = ").push_bind_unseparated(longitude);
    }

    builder.push(" WHERE id = ").push_bind(id);
    builder
}
