//! Per-iteration outcome records and the status lines derived from them.

use chrono::{DateTime, Utc};
use std::fmt;

use crate::utils::types::{iso_timestamp, PricePoint};
use crate::Error;

/// What happened to one registry entry during an iteration.
#[derive(Debug)]
pub enum SymbolOutcome {
    /// A price was read and a point was queued.
    Recorded(f64),
    /// The endpoint answered without a price.
    Unavailable,
    /// Transport failure, non-2xx or malformed body.
    Failed(Error),
}

#[derive(Debug)]
pub struct SymbolReport {
    pub symbol: String,
    pub name: String,
    pub timestamp: DateTime<Utc>,
    pub outcome: SymbolOutcome,
}

impl SymbolReport {
    pub fn is_recorded(&self) -> bool {
        matches!(self.outcome, SymbolOutcome::Recorded(_))
    }
}

impl fmt::Display for SymbolReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ts = iso_timestamp(&self.timestamp);
        match &self.outcome {
            | SymbolOutcome::Recorded(price) => {
                write!(f, "{} — {} ({}): {:?} USD/oz", ts, self.name, self.symbol, price)
            }
            | SymbolOutcome::Unavailable => {
                write!(f, "{} — {} ({}): unavailable", ts, self.name, self.symbol)
            }
            | SymbolOutcome::Failed(e) => {
                write!(f, "{} — {} ({}): Error: {}", ts, self.name, self.symbol, e)
            }
        }
    }
}

/// Result of the single batch write at the end of an iteration.
#[derive(Debug)]
pub enum WriteOutcome {
    /// No point succeeded, so nothing was written.
    Skipped,
    /// The batch of this many points was accepted by the store.
    Written(usize),
    /// The store rejected the batch.
    Failed(Error),
}

/// Everything observable about one pass over the registry.
#[derive(Debug)]
pub struct IterationReport {
    /// 1-based iteration counter
    pub iteration: u64,
    pub timestamp: DateTime<Utc>,
    /// One entry per registry symbol, in registry order
    pub symbols: Vec<SymbolReport>,
    /// Points queued for the store, in registry order
    pub points: Vec<PricePoint>,
    pub write: WriteOutcome,
}

impl IterationReport {
    pub fn status_lines(&self) -> Vec<String> {
        self.symbols.iter().map(ToString::to_string).collect()
    }

    pub fn points_written(&self) -> usize {
        match self.write {
            | WriteOutcome::Written(n) => n,
            | _ => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn report(outcome: SymbolOutcome) -> SymbolReport {
        SymbolReport {
            symbol: "XAU".into(),
            name: "Gold".into(),
            timestamp: Utc.with_ymd_and_hms(2024, 6, 1, 9, 15, 0).unwrap(),
            outcome,
        }
    }

    #[test]
    fn status_line_formats() {
        assert_eq!(
            report(SymbolOutcome::Recorded(2331.4)).to_string(),
            "2024-06-01T09:15:00.000000Z — Gold (XAU): 2331.4 USD/oz"
        );
        assert_eq!(
            report(SymbolOutcome::Unavailable).to_string(),
            "2024-06-01T09:15:00.000000Z — Gold (XAU): unavailable"
        );
        let failed = report(SymbolOutcome::Failed(Error::ConnectionError("timed out".into())));
        assert_eq!(
            failed.to_string(),
            "2024-06-01T09:15:00.000000Z — Gold (XAU): Error: Connection error: timed out"
        );
        assert!(!failed.is_recorded());
    }

    #[test]
    fn whole_prices_keep_decimal_point() {
        assert_eq!(
            report(SymbolOutcome::Recorded(2000.0)).to_string(),
            "2024-06-01T09:15:00.000000Z — Gold (XAU): 2000.0 USD/oz"
        );
    }
}
