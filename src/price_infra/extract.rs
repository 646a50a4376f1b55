use serde_json::Value;
use crate::error::{Error, Result};

/// Walk `document` along a slash-delimited path and read a finite number.
///
/// Object segments are keys, array segments are indices. Numeric strings are
/// accepted since most exchanges quote prices as strings. An empty path
/// selects the document itself.
pub fn extract_price(document: &Value, path: &str) -> Result<f64> {
    let mut value = document;

    for segment in path.split('/').filter(|s| !s.is_empty()) {
        value = match value {
            Value::Object(map) => map.get(segment),
            Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        }
        .ok_or_else(|| Error::Extraction {
            path: path.to_string(),
            reason: format!("segment {:?} not found", segment),
        })?;
    }

    let price = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .ok_or_else(|| Error::Extraction {
        path: path.to_string(),
        reason: format!("value is not numeric: {}", value),
    })?;

    if !price.is_finite() {
        return Err(Error::Extraction {
            path: path.to_string(),
            reason: format!("value is not finite: {}", price),
        });
    }

    Ok(price)
}
