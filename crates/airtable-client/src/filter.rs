//! Equality/AND filter formulas for table queries.
//!
//! The store expects a formula string like `AND({Name} = 'Acme Corp',
//! {Status} = 'Draft')`. Only equality and conjunction are ever needed,
//! so the builder stays deliberately small.

/// A conjunction of field-equals-literal clauses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    clauses: Vec<String>,
}

impl Filter {
    /// `{field} = 'value'`
    pub fn eq(field: &str, value: &str) -> Self {
        Self {
            clauses: vec![format!("{{{}}} = '{}'", field, escape_literal(value))],
        }
    }

    /// Conjoin another filter's clauses onto this one.
    pub fn and(mut self, other: Filter) -> Self {
        self.clauses.extend(other.clauses);
        self
    }

    /// Render the formula string for the wire.
    pub fn render(&self) -> String {
        match self.clauses.as_slice() {
            [] => String::new(),
            [single] => single.clone(),
            many => format!("AND({})", many.join(", ")),
        }
    }
}

/// Escape single quotes inside a formula string literal.
fn escape_literal(value: &str) -> String {
    value.replace('\'', "\\'")
}
