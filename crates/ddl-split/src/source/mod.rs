//! Schema source abstraction.
//!
//! The extractor never talks to a live catalog directly; it reads through
//! [`SchemaSource`], and concrete adapters wrap whatever catalog connection
//! the embedder uses. Extraction is read-only and stateless per call, so
//! callers may query different tables concurrently.

mod memory;

pub use memory::MemorySource;

use async_trait::async_trait;
use std::collections::BTreeSet;

use crate::dialect::DialectKind;
use crate::error::Result;
use crate::schema::{ColumnSpec, ConstraintSpec};

/// Read-only view of a database catalog, scoped to one namespace.
#[async_trait]
pub trait SchemaSource: Send + Sync {
    /// The SQL dialect emitted DDL must target.
    fn dialect(&self) -> DialectKind;

    /// The namespace/schema this source is scoped to, if any.
    fn namespace(&self) -> Option<&str>;

    /// List the tables visible in the source.
    async fn list_tables(&self) -> Result<BTreeSet<String>>;

    /// Get column definitions for a table, in ordinal order.
    async fn get_columns(&self, table: &str) -> Result<Vec<ColumnSpec>>;

    /// Get the primary key column names for a table (empty if none).
    async fn get_primary_key(&self, table: &str) -> Result<Vec<String>>;

    /// Get all non-primary-key constraint objects for a table.
    async fn get_constraints(&self, table: &str) -> Result<Vec<ConstraintSpec>>;
}
