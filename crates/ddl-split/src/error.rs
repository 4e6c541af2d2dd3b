//! Error types for schema extraction and DDL application.

use thiserror::Error;

/// Boxed cause for errors surfaced by source and executor adapters.
pub type Cause = Box<dyn std::error::Error + Send + Sync>;

/// Main error type for two-phase DDL operations.
#[derive(Error, Debug)]
pub enum DdlError {
    /// Requested table does not exist in the schema source.
    #[error("Table '{0}' not found in schema source")]
    NotFound(String),

    /// A schema object the extractor cannot safely classify into the
    /// base or constraint phase.
    #[error("Unsupported schema object on table '{table}': {reason}")]
    UnsupportedSchema { table: String, reason: String },

    /// DDL execution failed; the whole batch was rolled back.
    #[error("Apply failed at statement {statement_index}: {cause}")]
    Apply {
        statement_index: usize,
        #[source]
        cause: Cause,
    },

    /// Schema source adapter error (catalog query, connection, etc.)
    #[error("Schema source error: {0}")]
    Source(#[source] Cause),

    /// Executor adapter error (begin/commit/rollback, connection, etc.)
    #[error("Executor error: {0}")]
    Executor(#[source] Cause),
}

impl DdlError {
    /// Wrap an adapter error as a source error.
    pub fn source(cause: impl Into<Cause>) -> Self {
        DdlError::Source(cause.into())
    }

    /// Wrap an adapter error as an executor error.
    pub fn executor(cause: impl Into<Cause>) -> Self {
        DdlError::Executor(cause.into())
    }

    /// Create an UnsupportedSchema error.
    pub fn unsupported(table: impl Into<String>, reason: impl Into<String>) -> Self {
        DdlError::UnsupportedSchema {
            table: table.into(),
            reason: reason.into(),
        }
    }

    /// Format error with full details including error chain.
    pub fn format_detailed(&self) -> String {
        let mut output = format!("Error: {}\n", self);

        let mut source = std::error::Error::source(self);
        let mut depth = 1;
        while let Some(err) = source {
            output.push_str(&format!("\nCaused by:\n  {}: {}", depth, err));
            source = err.source();
            depth += 1;
        }

        output
    }
}

/// Result type alias for two-phase DDL operations.
pub type Result<T> = std::result::Result<T, DdlError>;
