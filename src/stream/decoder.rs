use serde_json::{Number, Value};
use tracing::trace;

use crate::{error::{StatsError, StatsResult}, stream::tuple::Tuple};

pub const COUNT_KEY: &str = "count(*)";

/// Turns a statistics response into a single flat tuple.
pub struct ResponseDecoder;

impl ResponseDecoder {
    pub fn decode(response: &Value, count_requested: bool) -> StatsResult<Tuple> {
        let mut tuple = Tuple::new();

        if count_requested {
            let num_found = response
                .get("response")
                .and_then(|r| r.get("numFound"))
                .ok_or_else(|| StatsError::ResponseShape("missing response.numFound".into()))?;
            tuple.put(COUNT_KEY, Self::real_value(num_found));
        }

        let stats = response
            .get("stats")
            .ok_or_else(|| StatsError::ResponseShape("missing stats section".into()))?;
        let stats_fields = Self::named_get(stats, "stats_fields")
            .ok_or_else(|| StatsError::ResponseShape("missing stats.stats_fields".into()))?;

        for (field, field_stats) in Self::named_entries(stats_fields)? {
            for (stat, raw) in Self::named_entries(field_stats)? {
                let function = if stat == "mean" { "avg" } else { stat };
                let key = format!("{}({})", function, field);
                let value = Self::real_value(raw);
                trace!(%key, ?value, "decoded statistic");
                tuple.put(key, value);
            }
        }

        Ok(tuple)
    }

    /// Narrows whole-number floats that fit in an `i64` back to integers.
    /// `i64::MAX as f64` rounds up to 2^63, so the upper bound is exclusive.
    pub fn real_value(value: &Value) -> Value {
        if let Value::Number(n) = value {
            if n.is_f64() {
                if let Some(f) = n.as_f64() {
                    if f % 1.0 == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 {
                        return Value::Number(Number::from(f as i64));
                    }
                }
            }
        }
        value.clone()
    }

    /// Reads a named list in any of the shapes the service emits: an object,
    /// a flat `[name, value, ...]` array or an array of `[name, value]` pairs.
    pub fn named_entries(value: &Value) -> StatsResult<Vec<(&str, &Value)>> {
        match value {
            Value::Object(map) => Ok(map.iter().map(|(k, v)| (k.as_str(), v)).collect()),
            Value::Array(items) if items.iter().all(Self::is_pair) => Ok(items
                .iter()
                .filter_map(|pair| match pair.as_array().map(Vec::as_slice) {
                    Some([Value::String(k), v]) => Some((k.as_str(), v)),
                    _ => None,
                })
                .collect()),
            Value::Array(items) if items.len() % 2 == 0 => items
                .chunks(2)
                .map(|chunk| match chunk {
                    [Value::String(k), v] => Ok((k.as_str(), v)),
                    _ => Err(StatsError::ResponseShape(format!("expected name at {:?}", chunk[0]))),
                })
                .collect(),
            other => Err(StatsError::ResponseShape(format!("expected named list, got {}", other))),
        }
    }

    fn named_get<'a>(value: &'a Value, name: &str) -> Option<&'a Value> {
        match value {
            Value::Object(map) => map.get(name),
            Value::Array(_) => Self::named_entries(value)
                .ok()?
                .into_iter()
                .find(|(k, _)| *k == name)
                .map(|(_, v)| v),
            _ => None,
        }
    }

    fn is_pair(item: &Value) -> bool {
        matches!(item.as_array().map(Vec::as_slice), Some([Value::String(_), _]))
    }
}
