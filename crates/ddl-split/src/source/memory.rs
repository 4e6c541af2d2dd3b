//! In-memory schema source.
//!
//! Backs the [`SchemaSource`] trait with plain maps. Used by the test suite
//! and by embedders that already hold reflected metadata and only need DDL
//! synthesis.

use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet};

use super::SchemaSource;
use crate::dialect::DialectKind;
use crate::error::{DdlError, Result};
use crate::schema::{ColumnSpec, ConstraintSpec, TableSpec};

/// A [`SchemaSource`] backed by in-memory table specs.
#[derive(Debug, Clone)]
pub struct MemorySource {
    dialect: DialectKind,
    namespace: Option<String>,
    tables: BTreeMap<String, TableSpec>,
    constraints: BTreeMap<String, Vec<ConstraintSpec>>,
}

impl MemorySource {
    /// Create an empty source for the given dialect.
    pub fn new(dialect: DialectKind) -> Self {
        Self {
            dialect,
            namespace: None,
            tables: BTreeMap::new(),
            constraints: BTreeMap::new(),
        }
    }

    /// Scope the source to a namespace.
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Register a table. Replaces any existing table with the same name.
    pub fn add_table(&mut self, table: TableSpec) -> &mut Self {
        self.tables.insert(table.name.clone(), table);
        self
    }

    /// Register a constraint on its owning table.
    pub fn add_constraint(&mut self, constraint: ConstraintSpec) -> &mut Self {
        self.constraints
            .entry(constraint.table.clone())
            .or_default()
            .push(constraint);
        self
    }

    fn require(&self, table: &str) -> Result<&TableSpec> {
        self.tables
            .get(table)
            .ok_or_else(|| DdlError::NotFound(table.to_string()))
    }
}

#[async_trait]
impl SchemaSource for MemorySource {
    fn dialect(&self) -> DialectKind {
        self.dialect
    }

    fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    async fn list_tables(&self) -> Result<BTreeSet<String>> {
        Ok(self.tables.keys().cloned().collect())
    }

    async fn get_columns(&self, table: &str) -> Result<Vec<ColumnSpec>> {
        Ok(self.require(table)?.columns.clone())
    }

    async fn get_primary_key(&self, table: &str) -> Result<Vec<String>> {
        Ok(self.require(table)?.primary_key.clone())
    }

    async fn get_constraints(&self, table: &str) -> Result<Vec<ConstraintSpec>> {
        self.require(table)?;
        Ok(self.constraints.get(table).cloned().unwrap_or_default())
    }
}
