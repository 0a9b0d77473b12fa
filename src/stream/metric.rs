use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{error::{StatsError, StatsResult}, stream::expression::{StreamExpression, StreamExpressionParameter}};

static METRIC_IDENTIFIER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*([A-Za-z_]+)\(\s*([^()\s]+)\s*\)\s*$").expect("metric identifier regex")
});

pub const WILDCARD: &str = "*";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatFunction {
    Min,
    Max,
    Sum,
    Avg,
    Count,
}

impl StatFunction {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "min" => Some(StatFunction::Min),
            "max" => Some(StatFunction::Max),
            "sum" => Some(StatFunction::Sum),
            "avg" => Some(StatFunction::Avg),
            "count" => Some(StatFunction::Count),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            StatFunction::Min => "min",
            StatFunction::Max => "max",
            StatFunction::Sum => "sum",
            StatFunction::Avg => "avg",
            StatFunction::Count => "count",
        }
    }

    /// Statistic name on the wire; `count` is not a per-field statistic.
    pub fn wire_name(&self) -> Option<&'static str> {
        match self {
            StatFunction::Avg => Some("mean"),
            StatFunction::Count => None,
            other => Some(other.name()),
        }
    }
}

impl fmt::Display for StatFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One requested aggregate, e.g. `sum(price)` or `count(*)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MetricSpec {
    pub function: StatFunction,
    pub column: String,
}

impl MetricSpec {
    pub fn new(function: StatFunction, column: &str) -> Self {
        Self { function, column: column.to_string() }
    }

    pub fn count_all() -> Self {
        Self::new(StatFunction::Count, WILDCARD)
    }

    pub fn parse(identifier: &str) -> StatsResult<Self> {
        let caps = METRIC_IDENTIFIER
            .captures(identifier)
            .ok_or_else(|| StatsError::InvalidMetric(identifier.to_string()))?;
        let function = StatFunction::from_name(&caps[1])
            .ok_or_else(|| StatsError::InvalidMetric(identifier.to_string()))?;
        Ok(Self::new(function, &caps[2]))
    }

    /// Builds a metric from a sub-expression such as `avg(price)`.
    pub fn from_expression(expression: &StreamExpression) -> StatsResult<Self> {
        let function = StatFunction::from_name(&expression.function_name)
            .ok_or_else(|| StatsError::InvalidMetric(expression.to_string()))?;
        match expression.parameters.as_slice() {
            [StreamExpressionParameter::Value(column)] => Ok(Self::new(function, column.trim())),
            _ => Err(StatsError::InvalidMetric(expression.to_string())),
        }
    }

    pub fn is_wildcard(&self) -> bool {
        self.column == WILDCARD
    }

    pub fn identifier(&self) -> String {
        format!("{}({})", self.function, self.column)
    }

    pub fn to_expression(&self) -> StreamExpression {
        StreamExpression::new(self.function.name()).with_value(&self.column)
    }
}

impl fmt::Display for MetricSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.identifier())
    }
}
