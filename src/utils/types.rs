//! Common types used throughout the metals feed.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Measurement name every price point is written under.
pub const MEASUREMENT: &str = "metals";

/// Tag key carrying the metal ticker.
pub const METAL_TAG: &str = "metal";

/// Field key carrying the spot price.
pub const PRICE_FIELD: &str = "price";

/// One timestamped price observation destined for the time-series store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    /// Ticker code, e.g. "XAU"
    pub symbol: String,
    /// Iteration timestamp shared by every point of the same batch
    pub timestamp: DateTime<Utc>,
    /// Spot price in USD per troy ounce
    pub price: f64,
}

impl PricePoint {
    /// Create a new price point
    pub fn new(symbol: impl Into<String>, timestamp: DateTime<Utc>, price: f64) -> Self {
        Self { symbol: symbol.into(), timestamp, price }
    }

    pub fn measurement(&self) -> &'static str {
        MEASUREMENT
    }

    /// ISO-8601 rendering of the point's timestamp (UTC, microsecond precision)
    pub fn iso_timestamp(&self) -> String {
        iso_timestamp(&self.timestamp)
    }

    /// Nanoseconds since the Unix epoch.
    pub fn timestamp_nanos(&self) -> i64 {
        self.timestamp
            .timestamp_nanos_opt()
            .unwrap_or_else(|| self.timestamp.timestamp_micros().saturating_mul(1_000))
    }

    /// Render as InfluxDB line protocol, e.g. `metals,metal=XAU price=1234.5 1700000000000000000`
    pub fn to_line_protocol(&self) -> String {
        format!(
            "{},{}={} {}={} {}",
            MEASUREMENT,
            METAL_TAG,
            escape_tag_value(&self.symbol),
            PRICE_FIELD,
            self.price,
            self.timestamp_nanos()
        )
    }
}

/// Format a UTC timestamp the way status lines and points display it.
pub fn iso_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

// Commas, spaces and equals signs must be escaped in tag values.
fn escape_tag_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, ',' | ' ' | '=') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
