//! DDL applier - all-or-nothing application of a statement batch.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::error::{DdlError, Result};
use crate::schema::DdlBatch;

/// Target-side statement executor.
///
/// Adapters wrap a live connection or pool. The applier asks for one
/// transaction per batch and never holds more than one at a time.
#[async_trait]
pub trait Executor: Send + Sync {
    /// Begin a transaction against the target.
    async fn begin(&self) -> Result<Box<dyn Transaction>>;
}

/// An open transaction handle.
///
/// Commit and rollback consume the handle, so a transaction cannot be used
/// after it is finished.
#[async_trait]
pub trait Transaction: Send {
    /// Execute one DDL statement.
    async fn execute(&mut self, statement: &str) -> Result<()>;

    /// Commit the transaction.
    async fn commit(self: Box<Self>) -> Result<()>;

    /// Roll the transaction back.
    async fn rollback(self: Box<Self>) -> Result<()>;
}

/// Applies DDL batches atomically.
///
/// Statements run strictly in order inside one transaction. The first
/// failure aborts the batch: the transaction is rolled back and the error is
/// surfaced with the failing statement's index. Nothing is retried here;
/// retry policy belongs to the caller.
///
/// Atomicity assumes the target supports transactional DDL. On stores that
/// auto-commit DDL (e.g. MySQL, older MariaDB) a failed batch may leave
/// earlier statements applied; that limitation is the adapter's to document.
pub struct DdlApplier {
    executor: Arc<dyn Executor>,
}

impl DdlApplier {
    /// Create an applier over an executor.
    pub fn new(executor: Arc<dyn Executor>) -> Self {
        Self { executor }
    }

    /// Apply a batch: commit on success, roll back on the first failure.
    ///
    /// Empty and whitespace-only statements are skipped without counting as
    /// failures. Statement indexes in errors refer to positions in the
    /// original batch.
    pub async fn apply(&self, batch: DdlBatch) -> Result<()> {
        let total = batch.len();
        let mut tx = self.executor.begin().await?;

        for (index, statement) in batch.statements.iter().enumerate() {
            if statement.trim().is_empty() {
                continue;
            }

            debug!("Executing DDL [{}/{}]: {}", index + 1, total, preview(statement));

            if let Err(cause) = tx.execute(statement).await {
                if let Err(rb) = tx.rollback().await {
                    warn!("Rollback failed after DDL error: {}", rb);
                }
                return Err(DdlError::Apply {
                    statement_index: index,
                    cause: Box::new(cause),
                });
            }
        }

        tx.commit().await?;
        info!("Applied {} DDL statements ({:?} phase)", total, batch.phase);
        Ok(())
    }
}

/// Truncated statement text for log lines.
fn preview(statement: &str) -> &str {
    match statement.char_indices().nth(80) {
        Some((idx, _)) => &statement[..idx],
        None => statement,
    }
}
