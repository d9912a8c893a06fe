//! Price sources polled by the ingestion loop.

pub mod gold_api;

use async_trait::async_trait;
use serde_json::Value;

use crate::utils::types::PRICE_FIELD;
use crate::{Error, Result};

pub use gold_api::GoldApiSource;

/// Anything that can quote a spot price for a ticker.
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Fetch the current price for `symbol`.
    ///
    /// `Ok(None)` means the endpoint answered but carried no usable price
    /// (`"price"` missing or null). Transport failures and non-2xx responses
    /// are `Error::ConnectionError`; unparsable bodies are `Error::DataError`.
    async fn fetch_price(&self, symbol: &str) -> Result<Option<f64>>;
}

/// Pull the `"price"` field out of a quote body.
///
/// Numbers are taken as-is and numeric strings are coerced; anything else is a
/// data error.
pub fn extract_price(body: &Value) -> Result<Option<f64>> {
    let obj = body
        .as_object()
        .ok_or_else(|| Error::DataError(format!("expected a JSON object, got {}", body)))?;

    let price = match obj.get(PRICE_FIELD) {
        | None | Some(Value::Null) => return Ok(None),
        | Some(Value::Number(n)) => n.as_f64(),
        | Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        | Some(_) => None,
    };

    match price {
        | Some(p) if p.is_finite() => Ok(Some(p)),
        | _ => Err(Error::DataError(format!("price field is not a number: {}", obj[PRICE_FIELD]))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case(json!({"price": 1234.5}), Some(1234.5))]
    #[case(json!({"price": 30, "symbol": "XAG"}), Some(30.0))]
    #[case(json!({"price": "4.25"}), Some(4.25))]
    #[case(json!({"price": null}), None)]
    #[case(json!({"name": "Gold"}), None)]
    fn extracts_price(#[case] body: Value, #[case] expected: Option<f64>) {
        assert_eq!(extract_price(&body).unwrap(), expected);
    }

    #[rstest]
    #[case(json!({"price": "n/a"}))]
    #[case(json!({"price": true}))]
    #[case(json!({"price": {"usd": 1.0}}))]
    #[case(json!({"price": "NaN"}))]
    #[case(json!([1, 2, 3]))]
    fn rejects_malformed_price(#[case] body: Value) {
        assert_matches!(extract_price(&body), Err(Error::DataError(_)));
    }
}
