//! # ddl-split
//!
//! Two-phase DDL replication core.
//!
//! Splits schema creation into a **base** phase (tables, columns, primary
//! keys) and a **constraint** phase (foreign keys, secondary indexes, check
//! and unique constraints), so bulk data loading can run in parallel between
//! the two phases without integrity-ordering concerns:
//!
//! 1. Apply every table's base DDL
//! 2. Load data, any order, any parallelism
//! 3. Apply constraint DDL, dependency-ordered
//!
//! The library is driver-free: catalogs are read through the
//! [`SchemaSource`] trait and statements are applied through the
//! [`Executor`] trait, both injected at construction time.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use ddl_split::{DdlApplier, DdlBatch, DdlExtractor, Executor, SchemaSource};
//!
//! async fn replicate(
//!     source: Arc<dyn SchemaSource>,
//!     target: Arc<dyn Executor>,
//! ) -> ddl_split::Result<()> {
//!     let extractor = DdlExtractor::new(source);
//!     let applier = DdlApplier::new(target);
//!
//!     let tables = vec!["orders".to_string(), "order_items".to_string()];
//!     applier.apply(extractor.base_batch(&tables).await?).await?;
//!
//!     // ... bulk load rows here ...
//!
//!     let plan = extractor.constraint_plan(&tables).await?;
//!     let statements = plan.into_iter().map(|(_, stmt)| stmt).collect();
//!     applier.apply(DdlBatch::constraint(statements)).await
//! }
//! ```

pub mod applier;
pub mod dialect;
pub mod error;
pub mod extractor;
pub mod plan;
pub mod schema;
pub mod source;

// Re-exports for convenient access
pub use applier::{DdlApplier, Executor, Transaction};
pub use dialect::{Dialect, DialectKind, MssqlDialect, PostgresDialect};
pub use error::{DdlError, Result};
pub use extractor::{DdlExtractor, ExtractOptions};
pub use plan::{dependency_order, DependencyOrder};
pub use schema::{ColumnSpec, ConstraintKind, ConstraintSpec, DdlBatch, Phase, TableSpec};
pub use source::{MemorySource, SchemaSource};
