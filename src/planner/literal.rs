use ordered_float::NotNan;
use std::fmt::{self, Display};

/// Characters with meaning in the standard query parser syntax.
const SPECIAL_CHARS: &[char] = &[
    '+', '-', '&', '|', '!', '(', ')', '{', '}', '[', ']', '^', '"', '~', '*', '?', ':', '\\', '/',
];

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Literal {
    String(String),
    Int(i64),
    Float(NotNan<f64>),
    Bool(bool),
}

impl Literal {
    pub fn string(s: impl Into<String>) -> Self {
        Literal::String(s.into())
    }

    /// Returns `None` for NaN.
    pub fn float(f: f64) -> Option<Self> {
        NotNan::new(f).ok().map(Literal::Float)
    }

    /// Renders the literal as a query-syntax term.
    pub fn to_query_term(&self) -> String {
        match self {
            Literal::String(s) => Self::quote_if_needed(s),
            Literal::Int(i) => i.to_string(),
            Literal::Float(f) => f.into_inner().to_string(),
            Literal::Bool(b) => b.to_string(),
        }
    }

    fn quote_if_needed(s: &str) -> String {
        let needs_quotes = s.is_empty()
            || s.chars().any(|c| c.is_whitespace() || SPECIAL_CHARS.contains(&c));
        if !needs_quotes {
            return s.to_string();
        }
        let mut out = String::with_capacity(s.len() + 2);
        out.push('"');
        for c in s.chars() {
            if c == '"' || c == '\\' {
                out.push('\\');
            }
            out.push(c);
        }
        out.push('"');
        out
    }
}

impl Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_query_term())
    }
}

impl From<&str> for Literal {
    fn from(s: &str) -> Self { Literal::String(s.to_string()) }
}

impl From<i64> for Literal {
    fn from(i: i64) -> Self { Literal::Int(i) }
}

impl From<bool> for Literal {
    fn from(b: bool) -> Self { Literal::Bool(b) }
}
