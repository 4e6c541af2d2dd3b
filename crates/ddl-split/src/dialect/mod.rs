//! SQL dialect strategies.
//!
//! The dialect decides syntax-level details of emitted DDL: identifier
//! quoting, identity clauses, and identifier length limits. Semantic
//! decisions (what goes into which phase) never live here.
//!
//! Dialects are dispatched statically through [`DialectKind`] instead of
//! `Box<dyn Dialect>`; the compiler generates a match instead of a vtable
//! call, and the enum stays `Copy`-cheap to hand around.

mod mssql;
mod postgres;

pub use mssql::MssqlDialect;
pub use postgres::PostgresDialect;

/// SQL syntax strategy for a database engine.
pub trait Dialect: Send + Sync {
    /// Get the dialect identifier (e.g., "mssql", "postgres").
    fn name(&self) -> &str;

    /// Quote an identifier (table name, column name, etc.).
    fn quote_ident(&self, name: &str) -> String;

    /// Maximum identifier length; generated constraint names are truncated
    /// to fit.
    fn max_ident_len(&self) -> usize;

    /// Column clause for identity/auto-increment columns.
    fn identity_clause(&self) -> &str;

    /// Fully qualify a table name with an optional namespace.
    fn qualify(&self, schema: Option<&str>, table: &str) -> String {
        match schema {
            Some(s) => format!("{}.{}", self.quote_ident(s), self.quote_ident(table)),
            None => self.quote_ident(table),
        }
    }
}

/// Enum-based static dispatch for dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialectKind {
    Postgres,
    Mssql,
}

impl DialectKind {
    fn as_dialect(&self) -> &'static dyn Dialect {
        match self {
            DialectKind::Postgres => &PostgresDialect,
            DialectKind::Mssql => &MssqlDialect,
        }
    }
}

impl Dialect for DialectKind {
    fn name(&self) -> &str {
        self.as_dialect().name()
    }

    fn quote_ident(&self, name: &str) -> String {
        self.as_dialect().quote_ident(name)
    }

    fn max_ident_len(&self) -> usize {
        self.as_dialect().max_ident_len()
    }

    fn identity_clause(&self) -> &str {
        self.as_dialect().identity_clause()
    }
}
