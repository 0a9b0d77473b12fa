use thiserror::Error;

/// Boxed error produced by the transport collaborator.
pub type TransportError = Box<dyn std::error::Error + Send + Sync + 'static>;

pub type StatsResult<T> = Result<T, StatsError>;

#[derive(Debug, Error)]
pub enum StatsError {
    /// A plan node handed the compiler more than one input.
    #[error("malformed plan: {node} node has {inputs} inputs, expected at most one")]
    MalformedPlan { node: &'static str, inputs: usize },

    /// The plan scans a different collection than the stream targets.
    #[error("plan scans collection '{plan}' but the stream targets '{stream}'")]
    CollectionMismatch { plan: String, stream: String },

    #[error("missing required parameter: {0}")]
    MissingParameter(String),

    #[error(transparent)]
    Transport(TransportError),

    #[error("unexpected response shape: {0}")]
    ResponseShape(String),

    #[error("invalid expression {expression} - {reason}")]
    InvalidExpression { expression: String, reason: String },

    #[error("invalid metric '{0}'")]
    InvalidMetric(String),

    #[error("invalid stream state: {0}")]
    InvalidState(&'static str),

    #[error("config error: {0}")]
    Config(String),
}

impl StatsError {
    pub fn invalid_expression(expression: impl ToString, reason: impl Into<String>) -> Self {
        Self::InvalidExpression { expression: expression.to_string(), reason: reason.into() }
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, StatsError::Transport(_))
    }
}

impl From<std::io::Error> for StatsError {
    fn from(e: std::io::Error) -> Self {
        StatsError::Config(e.to_string())
    }
}

impl From<serde_json::Error> for StatsError {
    fn from(e: serde_json::Error) -> Self {
        StatsError::Config(e.to_string())
    }
}
