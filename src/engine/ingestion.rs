//! The poll → transform → store loop.

use log::{debug, error, info, warn};
use std::time::Duration;

use super::report::{IterationReport, SymbolOutcome, SymbolReport, WriteOutcome};
use crate::clock::{Clock, SystemClock};
use crate::config::{Config, MetalEntry, StoreErrorPolicy};
use crate::persistence::{InfluxStore, PointStore};
use crate::source::{GoldApiSource, PriceSource};
use crate::utils::types::PricePoint;
use crate::Result;

/// Polls every registry symbol once per iteration, writes the successful
/// readings as one batch, then sleeps for the poll interval.
///
/// Symbols are fetched strictly one after another; a failing symbol never
/// aborts the iteration.
pub struct IngestionLoop {
    metals: Vec<MetalEntry>,
    poll_interval: Duration,
    on_store_error: StoreErrorPolicy,
    source: Box<dyn PriceSource>,
    store: Box<dyn PointStore>,
    clock: Box<dyn Clock>,
    iterations: u64,
}

impl IngestionLoop {
    pub fn new(
        config: &Config, source: Box<dyn PriceSource>, store: Box<dyn PointStore>,
        clock: Box<dyn Clock>,
    ) -> Self {
        Self {
            metals: config.metals.clone(),
            poll_interval: config.feed.poll_interval(),
            on_store_error: config.feed.on_store_error,
            source,
            store,
            clock,
            iterations: 0,
        }
    }

    /// Production wiring: HTTP price API, InfluxDB, wall clock.
    pub fn from_config(config: &Config) -> Result<Self> {
        let source = GoldApiSource::new(&config.feed)?;
        let store = InfluxStore::new(&config.influx);
        Ok(Self::new(config, Box::new(source), Box::new(store), Box::new(SystemClock)))
    }

    /// Number of completed iterations.
    pub fn iterations(&self) -> u64 {
        self.iterations
    }

    /// Make sure the target database exists. Failure here is fatal to the caller.
    pub async fn setup(&self) -> Result<()> {
        self.store.ensure_database().await?;
        let symbols: Vec<&str> = self.metals.iter().map(|m| m.symbol.as_str()).collect();
        println!(
            "Polling {} every {}s",
            symbols.join(", "),
            self.poll_interval.as_secs_f64()
        );
        info!("Database ready; {} symbols registered", symbols.len());
        Ok(())
    }

    /// One pass over the registry followed by at most one batch write.
    /// Does not sleep.
    pub async fn run_iteration(&mut self) -> IterationReport {
        self.iterations += 1;
        let timestamp = self.clock.now();
        let mut symbols = Vec::with_capacity(self.metals.len());
        let mut points = Vec::with_capacity(self.metals.len());

        for metal in &self.metals {
            let outcome = match self.source.fetch_price(&metal.symbol).await {
                | Ok(Some(price)) => {
                    points.push(PricePoint::new(metal.symbol.clone(), timestamp, price));
                    SymbolOutcome::Recorded(price)
                }
                | Ok(None) => SymbolOutcome::Unavailable,
                | Err(e) => {
                    warn!("{} ({}) fetch failed: {}", metal.name, metal.symbol, e);
                    SymbolOutcome::Failed(e)
                }
            };
            let report = SymbolReport {
                symbol: metal.symbol.clone(),
                name: metal.name.clone(),
                timestamp,
                outcome,
            };
            println!("{}", report);
            debug!("{}", report);
            symbols.push(report);
        }

        let write = if points.is_empty() {
            debug!("iteration {}: no points to write", self.iterations);
            WriteOutcome::Skipped
        } else {
            match self.store.write_points(&points).await {
                | Ok(()) => {
                    for p in &points {
                        debug!("wrote {}", p.to_line_protocol());
                    }
                    WriteOutcome::Written(points.len())
                }
                | Err(e) => {
                    error!("iteration {}: writing {} points failed: {}", self.iterations, points.len(), e);
                    WriteOutcome::Failed(e)
                }
            }
        };

        IterationReport { iteration: self.iterations, timestamp, symbols, points, write }
    }

    /// Run `max_iterations` iterations (forever when `None`), sleeping the poll
    /// interval between them. The final bounded iteration does not sleep, and
    /// `Some(0)` returns without polling.
    ///
    /// Returns the store error when a write fails under [`StoreErrorPolicy::Abort`].
    pub async fn run_for(&mut self, max_iterations: Option<u64>) -> Result<u64> {
        let mut completed = 0u64;
        if max_iterations == Some(0) {
            return Ok(completed);
        }
        loop {
            let report = self.run_iteration().await;
            completed += 1;

            if let WriteOutcome::Failed(e) = report.write {
                match self.on_store_error {
                    | StoreErrorPolicy::Abort => return Err(e),
                    | StoreErrorPolicy::Continue => {
                        warn!("dropped {} points, continuing", report.points.len())
                    }
                }
            }

            if max_iterations.map_or(false, |max| completed >= max) {
                return Ok(completed);
            }
            self.clock.sleep(self.poll_interval).await;
        }
    }

    /// Poll forever. Only returns on a store failure under the abort policy.
    pub async fn run(&mut self) -> Result<()> {
        self.run_for(None).await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::persistence::MemoryStore;
    use crate::Error;
    use assert_matches::assert_matches;
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    /// Canned answers per symbol; records the order of requests.
    #[derive(Clone, Default)]
    struct ScriptedSource {
        answers: HashMap<String, std::result::Result<Option<f64>, String>>,
        calls: Arc<Mutex<Vec<String>>>,
    }

    impl ScriptedSource {
        fn with(mut self, symbol: &str, answer: std::result::Result<Option<f64>, &str>) -> Self {
            self.answers.insert(symbol.to_string(), answer.map_err(str::to_string));
            self
        }
    }

    #[async_trait]
    impl PriceSource for ScriptedSource {
        async fn fetch_price(&self, symbol: &str) -> Result<Option<f64>> {
            self.calls.lock().unwrap().push(symbol.to_string());
            match self.answers.get(symbol) {
                | Some(Ok(p)) => Ok(*p),
                | Some(Err(e)) => Err(Error::ConnectionError(e.clone())),
                | None => Ok(None),
            }
        }
    }

    fn clock() -> ManualClock {
        ManualClock::new(Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap())
    }

    fn build(
        config: &Config, source: ScriptedSource, store: &MemoryStore, clock: &ManualClock,
    ) -> IngestionLoop {
        IngestionLoop::new(config, Box::new(source), Box::new(store.clone()), Box::new(clock.clone()))
    }

    #[tokio::test]
    async fn mixed_outcomes_write_only_successes() {
        let config = Config::default();
        let source = ScriptedSource::default()
            .with("XAU", Ok(Some(2034.5)))
            .with("XAG", Err("HTTP status server error (500 Internal Server Error)"))
            .with("XPT", Ok(None))
            .with("HG", Ok(Some(4.1)));
        let calls = source.calls.clone();
        let store = MemoryStore::new("metals_db");
        let clock = clock();
        let mut feed = build(&config, source, &store, &clock);
        feed.setup().await.unwrap();

        let report = feed.run_iteration().await;

        assert_eq!(*calls.lock().unwrap(), vec!["XAU", "XAG", "XPT", "HG"]);
        assert_eq!(report.points_written(), 2);
        assert_eq!(store.batches().len(), 1);
        let tagged: Vec<(&str, f64)> =
            report.points.iter().map(|p| (p.symbol.as_str(), p.price)).collect();
        assert_eq!(tagged, vec![("XAU", 2034.5), ("HG", 4.1)]);
        assert!(report.points.iter().all(|p| p.timestamp == report.timestamp));

        let lines = report.status_lines();
        assert!(lines[0].ends_with("Gold (XAU): 2034.5 USD/oz"));
        assert!(lines[1].contains("Silver (XAG): Error:"));
        assert!(lines[2].ends_with("Platinum (XPT): unavailable"));
        assert!(lines[3].ends_with("Copper (HG): 4.1 USD/oz"));
        assert!(clock.sleeps().is_empty());
    }

    #[tokio::test]
    async fn nothing_written_when_every_symbol_fails() {
        let config = Config::default();
        let store = MemoryStore::new("metals_db");
        store.ensure_database().await.unwrap();
        let clock = clock();
        let mut feed = build(&config, ScriptedSource::default(), &store, &clock);

        let report = feed.run_iteration().await;

        assert_matches!(report.write, WriteOutcome::Skipped);
        assert!(store.batches().is_empty());
        assert_eq!(report.symbols.len(), config.metals.len());
    }

    #[tokio::test]
    async fn bounded_run_sleeps_between_iterations() {
        let config = Config::default();
        let source = ScriptedSource::default().with("XAU", Ok(Some(1.0)));
        let store = MemoryStore::new("metals_db");
        store.ensure_database().await.unwrap();
        let clock = clock();
        let start = clock.now();
        let mut feed = build(&config, source, &store, &clock);

        let completed = feed.run_for(Some(3)).await.unwrap();

        assert_eq!(completed, 3);
        assert_eq!(feed.iterations(), 3);
        assert_eq!(clock.sleeps(), vec![Duration::from_secs(5); 2]);
        let stamps: Vec<_> = store.batches().iter().map(|b| b[0].timestamp).collect();
        assert_eq!(stamps, vec![
            start,
            start + chrono::Duration::seconds(5),
            start + chrono::Duration::seconds(10)
        ]);
    }

    #[tokio::test]
    async fn zero_iterations_polls_nothing() {
        let config = Config::default();
        let source = ScriptedSource::default().with("XAU", Ok(Some(1.0)));
        let calls = source.calls.clone();
        let store = MemoryStore::new("metals_db");
        store.ensure_database().await.unwrap();
        let clock = clock();
        let mut feed = build(&config, source, &store, &clock);

        assert_eq!(feed.run_for(Some(0)).await.unwrap(), 0);
        assert_eq!(feed.iterations(), 0);
        assert!(calls.lock().unwrap().is_empty());
        assert!(store.batches().is_empty());
        assert!(clock.sleeps().is_empty());
    }

    #[tokio::test]
    async fn store_failure_continue_policy_keeps_polling() {
        let config = Config::default();
        let source = ScriptedSource::default().with("XAU", Ok(Some(1.0)));
        let store = MemoryStore::new("metals_db");
        store.ensure_database().await.unwrap();
        store.set_fail_writes(true);
        let clock = clock();
        let mut feed = build(&config, source, &store, &clock);

        assert_eq!(feed.run_for(Some(2)).await.unwrap(), 2);
        assert!(store.batches().is_empty());
    }

    #[tokio::test]
    async fn store_failure_abort_policy_stops() {
        let mut config = Config::default();
        config.feed.on_store_error = StoreErrorPolicy::Abort;
        let source = ScriptedSource::default().with("XAU", Ok(Some(1.0)));
        let store = MemoryStore::new("metals_db");
        store.ensure_database().await.unwrap();
        store.set_fail_writes(true);
        let clock = clock();
        let mut feed = build(&config, source, &store, &clock);

        assert_matches!(feed.run_for(Some(5)).await, Err(Error::StoreError(_)));
        assert_eq!(feed.iterations(), 1);
        assert!(clock.sleeps().is_empty());
    }
}
