//! Ingestion engine: the polling loop and the reports it produces.

pub mod ingestion;
pub mod report;

pub use ingestion::IngestionLoop;
pub use report::{IterationReport, SymbolOutcome, SymbolReport, WriteOutcome};
