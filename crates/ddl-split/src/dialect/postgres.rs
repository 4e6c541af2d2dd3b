//! PostgreSQL SQL dialect.

use super::Dialect;

/// PostgreSQL dialect implementation.
#[derive(Debug, Clone, Copy, Default)]
pub struct PostgresDialect;

impl Dialect for PostgresDialect {
    fn name(&self) -> &str {
        "postgres"
    }

    fn quote_ident(&self, name: &str) -> String {
        // Double quotes, embedded quotes doubled
        format!("\"{}\"", name.replace('"', "\"\""))
    }

    fn max_ident_len(&self) -> usize {
        63
    }

    fn identity_clause(&self) -> &str {
        "GENERATED BY DEFAULT AS IDENTITY"
    }
}
