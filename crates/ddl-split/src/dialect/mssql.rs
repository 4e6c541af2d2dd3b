//! Microsoft SQL Server SQL dialect.

use super::Dialect;

/// SQL Server dialect implementation.
#[derive(Debug, Clone, Copy, Default)]
pub struct MssqlDialect;

impl Dialect for MssqlDialect {
    fn name(&self) -> &str {
        "mssql"
    }

    fn quote_ident(&self, name: &str) -> String {
        // Square brackets, embedded closing brackets doubled
        format!("[{}]", name.replace(']', "]]"))
    }

    fn max_ident_len(&self) -> usize {
        128
    }

    fn identity_clause(&self) -> &str {
        "IDENTITY(1,1)"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_ident() {
        let d = MssqlDialect;
        assert_eq!(d.quote_ident("Users"), "[Users]");
        assert_eq!(d.quote_ident("we]ird"), "[we]]ird]");
    }
}
