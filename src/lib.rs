//! # metals-feed
//! Polls spot prices for precious and base metals and stores them in InfluxDB.
//!
//! Each iteration captures one timestamp, asks the price API for every
//! configured symbol in order, writes the successful readings as a single
//! batch and sleeps for the poll interval. See [`engine::IngestionLoop`].

pub use crate::utils::error::{Error, Result};

pub mod clock;
pub mod config;
pub mod engine;
pub mod persistence;
pub mod source;
pub mod utils;

pub use crate::clock::{Clock, ManualClock, SystemClock};
pub use crate::config::{Config, MetalEntry, StoreErrorPolicy};
pub use crate::engine::{IngestionLoop, IterationReport, SymbolOutcome, WriteOutcome};
pub use crate::persistence::{InfluxStore, MemoryStore, PointStore};
pub use crate::source::{GoldApiSource, PriceSource};
pub use crate::utils::types::PricePoint;
