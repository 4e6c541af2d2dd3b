//! Schema and metadata types for tables, columns, and constraints.
//!
//! These types are database-agnostic snapshots of catalog state. They are
//! derived, never mutated: re-extraction produces a fresh snapshot, and no
//! in-place update API exists.

use serde::{Deserialize, Serialize};

/// Column metadata snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSpec {
    /// Column name.
    pub name: String,

    /// SQL type as rendered by the source dialect (e.g. "bigint", "varchar(255)").
    pub data_type: String,

    /// Whether the column allows NULL.
    pub is_nullable: bool,

    /// Default expression, verbatim from the catalog.
    pub default: Option<String>,

    /// Whether the column is an identity/auto-increment column.
    pub is_identity: bool,
}

/// Table metadata snapshot.
///
/// Owns its columns and primary-key column set. Constraints are not owned
/// here; they are listed separately by the schema source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSpec {
    /// Schema/namespace name, if the source is namespace-qualified.
    pub schema: Option<String>,

    /// Table name.
    pub name: String,

    /// Column definitions in ordinal order.
    pub columns: Vec<ColumnSpec>,

    /// Primary key column names (empty if the table has no PK).
    pub primary_key: Vec<String>,
}

impl TableSpec {
    /// Get the fully qualified table name.
    pub fn full_name(&self) -> String {
        match &self.schema {
            Some(s) => format!("{}.{}", s, self.name),
            None => self.name.clone(),
        }
    }

    /// Check if the table has a primary key.
    pub fn has_pk(&self) -> bool {
        !self.primary_key.is_empty()
    }
}

/// Constraint kind, carrying the kind-specific metadata.
///
/// Exhaustively matched at the base/constraint split point, so adding a new
/// kind forces a visible classification decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConstraintKind {
    /// Foreign key referencing another (or the same) table.
    ForeignKey {
        /// Referenced table name.
        ref_table: String,
        /// Referenced column names.
        ref_columns: Vec<String>,
        /// ON DELETE action, catalog-normalized (e.g. "CASCADE", "NO_ACTION").
        on_delete: String,
        /// ON UPDATE action.
        on_update: String,
    },

    /// Unique secondary index (not the primary key).
    UniqueIndex,

    /// Non-unique secondary index.
    NonUniqueIndex {
        /// Included (non-key) columns.
        include_cols: Vec<String>,
    },

    /// Check constraint with its predicate text.
    Check {
        /// Constraint definition (SQL expression).
        expression: String,
    },

    /// Composite unique constraint declared at table level.
    CompositeKey,
}

/// Constraint metadata snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstraintSpec {
    /// Constraint name as reflected from the catalog, if it has one.
    pub name: Option<String>,

    /// Owning table name.
    pub table: String,

    /// Constrained column names (empty for check constraints).
    pub columns: Vec<String>,

    /// Kind and kind-specific metadata.
    pub kind: ConstraintKind,

    /// Whether the constraint is DEFERRABLE / INITIALLY DEFERRED.
    pub deferrable: bool,

    /// Vendor-specific storage parameters the catalog reported
    /// (e.g. clustered-index fill factor clauses).
    pub storage_params: Vec<String>,
}

impl ConstraintSpec {
    /// Create a constraint with no name, no deferral, and no storage params.
    pub fn new(table: impl Into<String>, columns: Vec<String>, kind: ConstraintKind) -> Self {
        Self {
            name: None,
            table: table.into(),
            columns,
            kind,
            deferrable: false,
            storage_params: Vec::new(),
        }
    }

    /// Set the reflected constraint name.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Check whether this constraint is a foreign key.
    pub fn is_foreign_key(&self) -> bool {
        matches!(self.kind, ConstraintKind::ForeignKey { .. })
    }

    /// The table this constraint references, if it is a foreign key.
    pub fn referenced_table(&self) -> Option<&str> {
        match &self.kind {
            ConstraintKind::ForeignKey { ref_table, .. } => Some(ref_table.as_str()),
            _ => None,
        }
    }
}

/// DDL phase tag.
///
/// Base DDL creates the storage shape (columns, types, primary key); the
/// constraint phase adds everything with cross-row or cross-table semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// Tables, columns, primary keys.
    Base,
    /// Foreign keys, secondary indexes, checks, unique constraints.
    Constraint,
}

impl Phase {
    /// Classify a constraint kind into its phase.
    ///
    /// Every reflected constraint object belongs to the constraint phase;
    /// primary keys are never modeled as [`ConstraintSpec`] and ride along in
    /// base DDL instead. The match is exhaustive on purpose: a new kind must
    /// be placed here before it compiles.
    pub fn of(kind: &ConstraintKind) -> Phase {
        match kind {
            ConstraintKind::ForeignKey { .. }
            | ConstraintKind::UniqueIndex
            | ConstraintKind::NonUniqueIndex { .. }
            | ConstraintKind::Check { .. }
            | ConstraintKind::CompositeKey => Phase::Constraint,
        }
    }
}

/// An ordered batch of DDL statements for one phase.
///
/// Read-only once produced; the applier consumes it by value exactly once.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DdlBatch {
    /// Which phase these statements belong to.
    pub phase: Phase,

    /// Statements in application order.
    pub statements: Vec<String>,
}

impl DdlBatch {
    /// Create a base-phase batch.
    pub fn base(statements: Vec<String>) -> Self {
        Self {
            phase: Phase::Base,
            statements,
        }
    }

    /// Create a constraint-phase batch.
    pub fn constraint(statements: Vec<String>) -> Self {
        Self {
            phase: Phase::Constraint,
            statements,
        }
    }

    /// Number of statements in the batch.
    pub fn len(&self) -> usize {
        self.statements.len()
    }

    /// Check if the batch is empty.
    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }
}
