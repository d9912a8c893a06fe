//! InfluxDB 1.x backend using the `influxdb` HTTP client.

use async_trait::async_trait;
use influxdb::{Client, ReadQuery, Timestamp, WriteQuery};

use super::PointStore;
use crate::config::InfluxConfig;
use crate::utils::types::{PricePoint, MEASUREMENT, METAL_TAG, PRICE_FIELD};
use crate::{Error, Result};

/// Writes price points to one InfluxDB database. The database is selected at
/// construction; [`PointStore::ensure_database`] creates it if missing.
#[derive(Clone)]
pub struct InfluxStore {
    client: Client,
    database: String,
}

impl InfluxStore {
    pub fn new(cfg: &InfluxConfig) -> Self {
        let mut client = Client::new(cfg.url(), cfg.database.clone());
        if let (Some(user), Some(password)) = (&cfg.username, &cfg.password) {
            client = client.with_auth(user.clone(), password.clone());
        }
        Self { client, database: cfg.database.clone() }
    }

    pub fn database(&self) -> &str {
        &self.database
    }
}

/// `CREATE DATABASE` is a no-op on InfluxDB 1.x when the database already exists.
pub(crate) fn create_database_statement(database: &str) -> String {
    format!("CREATE DATABASE \"{}\"", database.replace('\\', "\\\\").replace('"', "\\\""))
}

pub(crate) fn to_write_query(point: &PricePoint) -> WriteQuery {
    WriteQuery::new(Timestamp::Nanoseconds(point.timestamp_nanos().max(0) as u128), MEASUREMENT)
        .add_tag(METAL_TAG, point.symbol.clone())
        .add_field(PRICE_FIELD, point.price)
}

#[async_trait]
impl PointStore for InfluxStore {
    async fn ensure_database(&self) -> Result<()> {
        self.client
            .query(ReadQuery::new(create_database_statement(&self.database)))
            .await
            .map_err(|e| Error::StoreError(format!("create database {}: {}", self.database, e)))?;
        Ok(())
    }

    async fn write_points(&self, points: &[PricePoint]) -> Result<()> {
        if points.is_empty() {
            return Ok(());
        }
        let batch: Vec<WriteQuery> = points.iter().map(to_write_query).collect();
        self.client
            .query(batch)
            .await
            .map_err(|e| Error::StoreError(format!("write to {}: {}", self.database, e)))?;
        Ok(())
    }
}
