use std::{collections::HashMap, fmt};

use crate::{error::StatsResult, stream::metric::{MetricSpec, StatFunction}};

/// Already-parsed stream expression, e.g.
/// `stats(orders,q="*:*",sum(price),count(*))`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamExpression {
    pub function_name: String,
    pub parameters: Vec<StreamExpressionParameter>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamExpressionParameter {
    Value(String),
    Named { name: String, value: Box<StreamExpressionParameter> },
    Expression(StreamExpression),
}

impl StreamExpression {
    pub fn new(function_name: &str) -> Self {
        Self { function_name: function_name.to_string(), parameters: Vec::new() }
    }

    pub fn with_value(mut self, value: &str) -> Self {
        self.parameters.push(StreamExpressionParameter::Value(value.to_string()));
        self
    }

    pub fn with_named(mut self, name: &str, value: &str) -> Self {
        self.parameters.push(StreamExpressionParameter::named(name, value));
        self
    }

    pub fn with_expression(mut self, expression: StreamExpression) -> Self {
        self.parameters.push(StreamExpressionParameter::Expression(expression));
        self
    }

    pub fn add_parameter(&mut self, parameter: StreamExpressionParameter) {
        self.parameters.push(parameter);
    }
}

impl StreamExpressionParameter {
    pub fn named(name: &str, value: &str) -> Self {
        StreamExpressionParameter::Named {
            name: name.to_string(),
            value: Box::new(StreamExpressionParameter::Value(value.to_string())),
        }
    }

    fn quote(value: &str) -> String {
        let needs_quotes = value.is_empty()
            || value.chars().any(|c| c.is_whitespace() || matches!(c, ',' | '(' | ')' | '"'));
        if needs_quotes {
            format!("\"{}\"", value.replace('"', "\\\""))
        } else {
            value.to_string()
        }
    }
}

impl fmt::Display for StreamExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.function_name)?;
        for (i, p) in self.parameters.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}", p)?;
        }
        f.write_str(")")
    }
}

impl fmt::Display for StreamExpressionParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamExpressionParameter::Value(v) => f.write_str(v),
            StreamExpressionParameter::Named { name, value } => match value.as_ref() {
                StreamExpressionParameter::Value(v) => write!(f, "{}={}", name, Self::quote(v)),
                other => write!(f, "{}={}", name, other),
            },
            StreamExpressionParameter::Expression(e) => write!(f, "{}", e),
        }
    }
}

/// Service discovery: maps an identifier (usually a collection) to the
/// address of the service hosting it.
pub trait EndpointResolver {
    fn resolve_endpoint(&self, identifier: &str) -> Option<String>;
}

/// Registry used when binding expressions to streams.
#[derive(Debug, Clone)]
pub struct StreamFactory {
    stats_function_name: String,
    default_zk_host: Option<String>,
    collection_zk_hosts: HashMap<String, String>,
}

impl Default for StreamFactory {
    fn default() -> Self {
        Self {
            stats_function_name: "stats".to_string(),
            default_zk_host: None,
            collection_zk_hosts: HashMap::new(),
        }
    }
}

impl StreamFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_default_zk_host(mut self, zk_host: &str) -> Self {
        self.default_zk_host = Some(zk_host.to_string());
        self
    }

    pub fn with_collection_zk_host(mut self, collection: &str, zk_host: &str) -> Self {
        self.collection_zk_hosts.insert(collection.to_string(), zk_host.to_string());
        self
    }

    pub fn with_stats_function_name(mut self, name: &str) -> Self {
        self.stats_function_name = name.to_string();
        self
    }

    pub fn stats_function_name(&self) -> &str {
        &self.stats_function_name
    }

    pub fn default_zk_host(&self) -> Option<&str> {
        self.default_zk_host.as_deref()
    }

    pub fn collection_zk_host(&self, collection: &str) -> Option<&str> {
        self.collection_zk_hosts.get(collection).map(String::as_str)
    }

    /// The `index`-th positional value operand.
    pub fn value_operand<'a>(&self, expression: &'a StreamExpression, index: usize) -> Option<&'a str> {
        expression
            .parameters
            .iter()
            .filter_map(|p| match p {
                StreamExpressionParameter::Value(v) => Some(v.as_str()),
                _ => None,
            })
            .nth(index)
    }

    pub fn named_operands<'a>(&self, expression: &'a StreamExpression) -> Vec<(&'a str, &'a StreamExpressionParameter)> {
        expression
            .parameters
            .iter()
            .filter_map(|p| match p {
                StreamExpressionParameter::Named { name, value } => Some((name.as_str(), value.as_ref())),
                _ => None,
            })
            .collect()
    }

    pub fn named_operand<'a>(&self, expression: &'a StreamExpression, name: &str) -> Option<&'a StreamExpressionParameter> {
        self.named_operands(expression)
            .into_iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v)
    }

    /// Sub-expressions naming one of the known metric functions.
    pub fn metric_operands<'a>(&self, expression: &'a StreamExpression) -> Vec<&'a StreamExpression> {
        expression
            .parameters
            .iter()
            .filter_map(|p| match p {
                StreamExpressionParameter::Expression(e) if StatFunction::from_name(&e.function_name).is_some() => Some(e),
                _ => None,
            })
            .collect()
    }

    pub fn construct_metric(&self, expression: &StreamExpression) -> StatsResult<MetricSpec> {
        MetricSpec::from_expression(expression)
    }
}

impl EndpointResolver for StreamFactory {
    fn resolve_endpoint(&self, identifier: &str) -> Option<String> {
        self.collection_zk_host(identifier)
            .or(self.default_zk_host())
            .map(str::to_string)
    }
}
