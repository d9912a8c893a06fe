//! Persistence layer traits and implementations
//!
//! The ingestion loop only sees [`PointStore`]; InfluxDB is the production
//! backend and [`MemoryStore`] backs tests and dry runs.

use async_trait::async_trait;
use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::utils::types::PricePoint;
use crate::{Error, Result};

pub mod influx;

pub use influx::InfluxStore;

#[async_trait]
pub trait PointStore: Send + Sync {
    /// Create the target database if it does not exist yet. Must be idempotent.
    async fn ensure_database(&self) -> Result<()>;

    /// Write one iteration's batch in a single call.
    async fn write_points(&self, points: &[PricePoint]) -> Result<()>;
}

/// In-process store. Clones share the same contents.
#[derive(Clone, Debug)]
pub struct MemoryStore {
    database: String,
    state: Arc<Mutex<MemoryState>>,
}

#[derive(Debug, Default)]
struct MemoryState {
    databases: BTreeSet<String>,
    batches: Vec<Vec<PricePoint>>,
    fail_writes: bool,
}

impl MemoryStore {
    pub fn new(database: impl Into<String>) -> Self {
        Self { database: database.into(), state: Arc::new(Mutex::new(MemoryState::default())) }
    }

    /// Make every subsequent `write_points` call fail (or succeed again).
    pub fn set_fail_writes(&self, fail: bool) {
        self.lock().fail_writes = fail;
    }

    pub fn databases(&self) -> Vec<String> {
        self.lock().databases.iter().cloned().collect()
    }

    /// Batches in write order.
    pub fn batches(&self) -> Vec<Vec<PricePoint>> {
        self.lock().batches.clone()
    }

    /// All stored points, flattened.
    pub fn points(&self) -> Vec<PricePoint> {
        self.lock().batches.iter().flatten().cloned().collect()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl PointStore for MemoryStore {
    async fn ensure_database(&self) -> Result<()> {
        self.lock().databases.insert(self.database.clone());
        Ok(())
    }

    async fn write_points(&self, points: &[PricePoint]) -> Result<()> {
        let mut state = self.lock();
        if state.fail_writes {
            return Err(Error::StoreError(format!("write to {} refused", self.database)));
        }
        if !state.databases.contains(&self.database) {
            return Err(Error::StoreError(format!("database not found: {}", self.database)));
        }
        state.batches.push(points.to_vec());
        Ok(())
    }
}
