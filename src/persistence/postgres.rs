//! PostgreSQL implementation of the persistence layer.

use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use super::models::{StationRow, station_from_row};
use super::{PersistenceError, PersistenceLayer, PriceWrite};
use crate::config::PipelineConfig;
use crate::domain::{PriceRecord, StationRecord};

/// First delay between connection attempts; doubles up to [`MAX_BACKOFF`].
const INITIAL_BACKOFF: Duration = Duration::from_millis(500);
const MAX_BACKOFF: Duration = Duration::from_secs(10);

/// Opens a connection pool, retrying with exponential backoff.
///
/// Makes `database_connect_retries + 1` attempts in total.
///
/// # Errors
///
/// Returns the last [`PersistenceError::Database`] once every attempt has
/// failed.
pub async fn connect(config: &PipelineConfig) -> Result<PgPool, PersistenceError> {
    let options = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .min_connections(config.database_min_connections)
        .acquire_timeout(Duration::from_secs(config.database_connect_timeout_secs));

    let mut backoff = INITIAL_BACKOFF;
    let mut attempt: u32 = 0;
    loop {
        attempt = attempt.saturating_add(1);
        match options.clone().connect(&config.database_url).await {
            Ok(pool) => {
                tracing::info!(attempt, "connected to postgres");
                return Ok(pool);
            }
            Err(e) if attempt <= config.database_connect_retries => {
                tracing::warn!(
                    attempt,
                    error = %e,
                    retry_in_ms = backoff.as_millis() as u64,
                    "postgres connection failed, retrying"
                );
                tokio::time::sleep(backoff).await;
                backoff = (backoff * 2).min(MAX_BACKOFF);
            }
            Err(e) => return Err(e.into()),
        }
    }
}

/// PostgreSQL-backed persistence layer using `sqlx::PgPool`.
#[derive(Debug, Clone)]
pub struct PostgresPersistence {
    pool: PgPool,
}

impl PostgresPersistence {
    /// Creates a new persistence layer with the given connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Applies the bundled schema migrations (`station` and `price`).
    ///
    /// # Errors
    ///
    /// Returns a [`PersistenceError::Migration`] on failure.
    pub async fn migrate(&self) -> Result<(), PersistenceError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    async fn station_exists(&self, code: &str) -> Result<bool, PersistenceError> {
        let found = sqlx::query_scalar::<_, i32>("SELECT 1 FROM station WHERE code = $1")
            .bind(code)
            .fetch_optional(&self.pool)
            .await?;
        Ok(found.is_some())
    }
}

#[async_trait]
impl PersistenceLayer for PostgresPersistence {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn load_watermark(&self) -> Result<Option<NaiveDateTime>, PersistenceError> {
        let latest = sqlx::query_scalar::<_, Option<NaiveDateTime>>(
            "SELECT MAX(lastupdated) FROM price",
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(latest)
    }

    async fn load_stations(&self) -> Result<Vec<StationRecord>, PersistenceError> {
        let rows = sqlx::query_as::<_, StationRow>(
            "SELECT code, stationid, brandid, brand, name, address, latitude, longitude \
             FROM station",
        )
        .fetch_all(&self.pool)
        .await?;

        let total = rows.len();
        let stations: Vec<StationRecord> = rows.into_iter().filter_map(station_from_row).collect();
        if stations.len() < total {
            tracing::warn!(
                skipped = total - stations.len(),
                "stored stations with null attributes were not loaded"
            );
        }
        Ok(stations)
    }

    async fn upsert_station(&self, record: &StationRecord) -> Result<(), PersistenceError> {
        sqlx::query(
            r#"
            INSERT INTO station (stationid, brandid, brand, code, name, address, latitude, longitude)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (code) DO UPDATE SET
                stationid = EXCLUDED.stationid,
                brandid = EXCLUDED.brandid,
                brand = EXCLUDED.brand,
                name = EXCLUDED.name,
                address = EXCLUDED.address,
                latitude = EXCLUDED.latitude,
                longitude = EXCLUDED.longitude
            "#,
        )
        .bind(&record.station_id)
        .bind(&record.brand_id)
        .bind(&record.brand)
        .bind(&record.code)
        .bind(&record.name)
        .bind(&record.address)
        .bind(record.latitude())
        .bind(record.longitude())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn upsert_price(&self, record: &PriceRecord) -> Result<PriceWrite, PersistenceError> {
        if !self.station_exists(&record.station_code).await? {
            return Ok(PriceWrite::StationMissing);
        }

        sqlx::query(
            r#"
            INSERT INTO price (stationcode, fueltype, price, lastupdated)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (stationcode, fueltype, lastupdated) DO UPDATE SET
                price = EXCLUDED.price
            "#,
        )
        .bind(&record.station_code)
        .bind(&record.fuel_type)
        .bind(record.price)
        .bind(record.last_updated)
        .execute(&self.pool)
        .await?;

        Ok(PriceWrite::Written)
    }

    async fn health_check(&self) -> Result<(), PersistenceError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
