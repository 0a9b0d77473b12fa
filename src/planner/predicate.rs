use std::fmt;

use crate::planner::literal::Literal;

/// Filter condition pushed down to the search service.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    Term { field: String, value: Literal },
    /// `None` bounds are open (`*`).
    Range {
        field: String,
        lower: Option<Literal>,
        upper: Option<Literal>,
        inclusive: bool,
    },
    Not(Box<Predicate>),
    /// Already in query syntax; passed through verbatim.
    Raw(String),
}

impl Predicate {
    pub fn term(field: &str, value: impl Into<Literal>) -> Self {
        Predicate::Term { field: field.to_string(), value: value.into() }
    }

    pub fn range(field: &str, lower: Option<Literal>, upper: Option<Literal>, inclusive: bool) -> Self {
        Predicate::Range { field: field.to_string(), lower, upper, inclusive }
    }

    pub fn negate(self) -> Self {
        Predicate::Not(Box::new(self))
    }

    pub fn raw(clause: &str) -> Self {
        Predicate::Raw(clause.to_string())
    }

    pub fn to_query_clause(&self) -> String {
        match self {
            Predicate::Term { field, value } => format!("{}:{}", field, value.to_query_term()),
            Predicate::Range { field, lower, upper, inclusive } => {
                let (open, close) = if *inclusive { ('[', ']') } else { ('{', '}') };
                let bound = |b: &Option<Literal>| b.as_ref()
                    .map(Literal::to_query_term)
                    .unwrap_or_else(|| "*".to_string());
                format!("{}:{}{} TO {}{}", field, open, bound(lower), bound(upper), close)
            }
            Predicate::Not(inner) => format!("-({})", inner.to_query_clause()),
            Predicate::Raw(s) => s.clone(),
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_query_clause())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn term_clause() {
        assert_eq!(Predicate::term("status", "shipped").to_query_clause(), "status:shipped");
        assert_eq!(Predicate::term("city", "Porto Alegre").to_query_clause(), "city:\"Porto Alegre\"");
        assert_eq!(Predicate::term("qty", 3i64).to_query_clause(), "qty:3");
    }

    #[test]
    fn range_clause_inclusive_and_exclusive() {
        let p = Predicate::range("price", Some(Literal::Int(10)), Some(Literal::Int(20)), true);
        assert_eq!(p.to_query_clause(), "price:[10 TO 20]");

        let p = Predicate::range("price", Some(Literal::Int(10)), None, false);
        assert_eq!(p.to_query_clause(), "price:{10 TO *}");
    }

    #[test]
    fn negation_wraps_inner_clause() {
        let p = Predicate::term("vip", true).negate();
        assert_eq!(p.to_query_clause(), "-(vip:true)");
    }

    #[test]
    fn raw_is_verbatim() {
        assert_eq!(Predicate::raw("name:foo*").to_string(), "name:foo*");
    }
}
