//! Query predicates and ordering expressions

use std::fmt;

/// An `at(path, value)` predicate: documents whose `path` equals `value`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Predicate {
    pub path: String,
    pub value: String,
}

impl Predicate {
    pub fn at(path: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            value: value.into(),
        }
    }

    /// Combine predicates into the `q` query parameter
    pub fn to_query(predicates: &[Predicate]) -> String {
        let inner: String = predicates.iter().map(|p| p.to_string()).collect();
        format!("[{}]", inner)
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = serde_json::to_string(&self.value).map_err(|_| fmt::Error)?;
        write!(f, "[at({}, {})]", self.path, value)
    }
}

/// One term of an orderings expression such as
/// `[document.last_publication_date desc, my.post.title]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ordering {
    pub field: String,
    pub descending: bool,
}

impl Ordering {
    /// Parse an orderings expression; blank terms are skipped
    pub fn parse_list(expr: &str) -> Vec<Ordering> {
        expr.trim()
            .trim_start_matches('[')
            .trim_end_matches(']')
            .split(',')
            .filter_map(|term| {
                let mut parts = term.split_whitespace();
                let field = parts.next()?.to_string();
                let descending = matches!(parts.next(), Some("desc"));
                Some(Ordering { field, descending })
            })
            .collect()
    }
}
