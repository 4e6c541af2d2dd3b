//! DDL extractor - converts catalog metadata into phased DDL.
//!
//! For every table the extractor produces two artifacts: a single base
//! `CREATE TABLE` statement (columns, types, nullability, defaults, identity,
//! primary key) and an ordered list of constraint statements (secondary
//! indexes, unique and check constraints, foreign keys). Applying all base
//! DDL, loading data, then applying all constraint DDL reproduces the source
//! schema while keeping the load phase free of FK ordering concerns.
//!
//! Primary keys stay in base DDL: they carry no cross-table dependency and a
//! table is not self-contained without one. Everything else is deferred.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, info};

use crate::dialect::{Dialect, DialectKind};
use crate::error::{DdlError, Result};
use crate::plan::{dependency_order, DependencyOrder};
use crate::schema::{ColumnSpec, ConstraintKind, ConstraintSpec, DdlBatch, Phase, TableSpec};
use crate::source::SchemaSource;

/// Which constraint families the extractor emits.
///
/// All on by default; switching one off drops that family from constraint
/// DDL output entirely.
#[derive(Debug, Clone, Copy)]
pub struct ExtractOptions {
    /// Emit secondary indexes and unique constraints.
    pub include_indexes: bool,
    /// Emit foreign keys.
    pub include_foreign_keys: bool,
    /// Emit check constraints.
    pub include_check_constraints: bool,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            include_indexes: true,
            include_foreign_keys: true,
            include_check_constraints: true,
        }
    }
}

/// Extracts phased DDL from a [`SchemaSource`].
///
/// Stateless per call: every method re-reads the source and returns a fresh
/// snapshot, so concurrent extraction of different tables is safe.
pub struct DdlExtractor {
    source: Arc<dyn SchemaSource>,
    options: ExtractOptions,
}

impl DdlExtractor {
    /// Create an extractor over a schema source.
    pub fn new(source: Arc<dyn SchemaSource>) -> Self {
        Self {
            source,
            options: ExtractOptions::default(),
        }
    }

    /// Create an extractor with explicit options.
    pub fn with_options(source: Arc<dyn SchemaSource>, options: ExtractOptions) -> Self {
        Self { source, options }
    }

    /// Take a full metadata snapshot of one table.
    pub async fn table_spec(&self, table: &str) -> Result<TableSpec> {
        self.require_table(table).await?;
        Ok(TableSpec {
            schema: self.source.namespace().map(str::to_string),
            name: table.to_string(),
            columns: self.source.get_columns(table).await?,
            primary_key: self.source.get_primary_key(table).await?,
        })
    }

    /// Generate the base `CREATE TABLE` statement for a table.
    ///
    /// Contains every column with type, nullability, default, and identity
    /// clause, plus the PRIMARY KEY clause if the table has one. Never
    /// contains foreign keys, secondary indexes, or check constraints.
    pub async fn base_ddl(&self, table: &str) -> Result<String> {
        let spec = self.table_spec(table).await?;
        let dialect = self.source.dialect();

        let mut lines: Vec<String> = spec
            .columns
            .iter()
            .map(|col| format!("    {}", render_column(&dialect, col)))
            .collect();

        if spec.has_pk() {
            let pk_cols: Vec<String> = spec
                .primary_key
                .iter()
                .map(|c| dialect.quote_ident(c))
                .collect();
            lines.push(format!("    PRIMARY KEY ({})", pk_cols.join(", ")));
        }

        let ddl = format!(
            "CREATE TABLE {} (\n{}\n)",
            dialect.qualify(spec.schema.as_deref(), &spec.name),
            lines.join(",\n")
        );

        debug!("Generated base DDL for {}", spec.full_name());
        Ok(ddl)
    }

    /// Generate the base-phase batch for many tables.
    pub async fn base_batch(&self, tables: &[String]) -> Result<DdlBatch> {
        let mut statements = Vec::with_capacity(tables.len());
        for table in tables {
            statements.push(self.base_ddl(table).await?);
        }
        Ok(DdlBatch::base(statements))
    }

    /// Generate constraint-phase DDL for one table.
    ///
    /// One statement per object, in a stable order: unique constraints and
    /// indexes first, then check constraints, foreign keys last. Fails with
    /// [`DdlError::UnsupportedSchema`] before emitting anything if any
    /// constraint cannot be safely classified.
    pub async fn constraint_ddl(&self, table: &str) -> Result<Vec<String>> {
        self.require_table(table).await?;
        let constraints = self.source.get_constraints(table).await?;
        let statements = self.render_constraints(&constraints)?;
        debug!(
            "Generated {} constraint statements for {}",
            statements.len(),
            table
        );
        Ok(statements)
    }

    /// Generate constraint DDL for many tables, dependency-ordered.
    ///
    /// Tables are topologically sorted over the foreign-key reference graph
    /// so a table's own constraints land before constraints that reference
    /// it. A cyclic graph is not an error: since all base DDL is applied
    /// before any constraint DDL runs, cycles are already safe, and the plan
    /// falls back to emitting every table's non-FK statements in name order
    /// followed by every table's FK statements in name order.
    pub async fn constraint_plan(&self, tables: &[String]) -> Result<Vec<(String, String)>> {
        let mut constraints: BTreeMap<String, Vec<ConstraintSpec>> = BTreeMap::new();
        for table in tables {
            self.require_table(table).await?;
            let specs = self.source.get_constraints(table).await?;
            for spec in &specs {
                self.validate(spec)?;
            }
            constraints.insert(table.clone(), specs);
        }

        let mut plan = Vec::new();
        match dependency_order(&constraints) {
            DependencyOrder::Ordered(order) => {
                for table in &order {
                    for stmt in self.render_constraints(&constraints[table])? {
                        plan.push((table.clone(), stmt));
                    }
                }
            }
            DependencyOrder::Cyclic => {
                debug!("FK reference graph is cyclic; falling back to name order");
                for (table, specs) in &constraints {
                    let non_fk: Vec<ConstraintSpec> = specs
                        .iter()
                        .filter(|c| !c.is_foreign_key())
                        .cloned()
                        .collect();
                    for stmt in self.render_constraints(&non_fk)? {
                        plan.push((table.clone(), stmt));
                    }
                }
                for (table, specs) in &constraints {
                    let fks: Vec<ConstraintSpec> =
                        specs.iter().filter(|c| c.is_foreign_key()).cloned().collect();
                    for stmt in self.render_constraints(&fks)? {
                        plan.push((table.clone(), stmt));
                    }
                }
            }
        }

        info!(
            "Planned {} constraint statements across {} tables",
            plan.len(),
            constraints.len()
        );
        Ok(plan)
    }

    async fn require_table(&self, table: &str) -> Result<()> {
        let tables = self.source.list_tables().await?;
        if tables.contains(table) {
            Ok(())
        } else {
            Err(DdlError::NotFound(table.to_string()))
        }
    }

    /// Reject constraints whose placement cannot be decided safely.
    ///
    /// Deferred-constraint syntax and vendor storage parameters are surfaced
    /// as errors instead of being guessed at or silently dropped.
    fn validate(&self, spec: &ConstraintSpec) -> Result<()> {
        if spec.deferrable {
            return Err(DdlError::unsupported(
                &spec.table,
                format!(
                    "deferrable constraint '{}' cannot be classified",
                    spec.name.as_deref().unwrap_or("<unnamed>")
                ),
            ));
        }
        if !spec.storage_params.is_empty() {
            return Err(DdlError::unsupported(
                &spec.table,
                format!(
                    "constraint '{}' carries vendor storage parameters: {}",
                    spec.name.as_deref().unwrap_or("<unnamed>"),
                    spec.storage_params.join(", ")
                ),
            ));
        }
        Ok(())
    }

    fn included(&self, kind: &ConstraintKind) -> bool {
        match kind {
            ConstraintKind::ForeignKey { .. } => self.options.include_foreign_keys,
            ConstraintKind::Check { .. } => self.options.include_check_constraints,
            ConstraintKind::UniqueIndex
            | ConstraintKind::NonUniqueIndex { .. }
            | ConstraintKind::CompositeKey => self.options.include_indexes,
        }
    }

    /// Validate, classify, order, and render a table's constraints.
    ///
    /// Classification goes through [`Phase::of`]; only constraint-phase
    /// objects are rendered here. All-or-nothing: any validation failure
    /// aborts before a single statement is produced.
    fn render_constraints(&self, constraints: &[ConstraintSpec]) -> Result<Vec<String>> {
        for spec in constraints {
            self.validate(spec)?;
        }

        let mut ordered: Vec<&ConstraintSpec> = constraints
            .iter()
            .filter(|c| Phase::of(&c.kind) == Phase::Constraint)
            .filter(|c| self.included(&c.kind))
            .collect();
        ordered.sort_by_key(|c| phase_rank(&c.kind));

        let dialect = self.source.dialect();
        let namespace = self.source.namespace();
        Ok(ordered
            .into_iter()
            .map(|c| render_constraint(&dialect, namespace, c))
            .collect())
    }
}

/// Ordering rank within the constraint phase: indexes and unique
/// constraints, then checks, foreign keys last. FK validation is the most
/// expensive and the most order-sensitive step.
fn phase_rank(kind: &ConstraintKind) -> u8 {
    match kind {
        ConstraintKind::UniqueIndex
        | ConstraintKind::NonUniqueIndex { .. }
        | ConstraintKind::CompositeKey => 0,
        ConstraintKind::Check { .. } => 1,
        ConstraintKind::ForeignKey { .. } => 2,
    }
}

fn render_column(dialect: &DialectKind, col: &ColumnSpec) -> String {
    let mut def = format!("{} {}", dialect.quote_ident(&col.name), col.data_type);
    if let Some(default) = &col.default {
        def.push_str(&format!(" DEFAULT {}", default));
    }
    if !col.is_nullable {
        def.push_str(" NOT NULL");
    }
    if col.is_identity {
        def.push(' ');
        def.push_str(dialect.identity_clause());
    }
    def
}

fn render_constraint(dialect: &DialectKind, namespace: Option<&str>, spec: &ConstraintSpec) -> String {
    let table = dialect.qualify(namespace, &spec.table);
    let cols = quote_all(dialect, &spec.columns);
    let name = dialect.quote_ident(&constraint_name(dialect, spec));

    match &spec.kind {
        ConstraintKind::UniqueIndex => {
            format!("CREATE UNIQUE INDEX {} ON {} ({})", name, table, cols)
        }
        ConstraintKind::NonUniqueIndex { include_cols } => {
            let mut sql = format!("CREATE INDEX {} ON {} ({})", name, table, cols);
            if !include_cols.is_empty() {
                sql.push_str(&format!(" INCLUDE ({})", quote_all(dialect, include_cols)));
            }
            sql
        }
        ConstraintKind::Check { expression } => {
            let expr = expression.trim();
            let expr = if expr.starts_with('(') {
                expr.to_string()
            } else {
                format!("({})", expr)
            };
            format!("ALTER TABLE {} ADD CONSTRAINT {} CHECK {}", table, name, expr)
        }
        ConstraintKind::CompositeKey => {
            format!("ALTER TABLE {} ADD CONSTRAINT {} UNIQUE ({})", table, name, cols)
        }
        ConstraintKind::ForeignKey {
            ref_table,
            ref_columns,
            on_delete,
            on_update,
        } => {
            format!(
                "ALTER TABLE {} ADD CONSTRAINT {} FOREIGN KEY ({}) REFERENCES {} ({}) ON DELETE {} ON UPDATE {}",
                table,
                name,
                cols,
                dialect.qualify(namespace, ref_table),
                quote_all(dialect, ref_columns),
                map_referential_action(on_delete),
                map_referential_action(on_update),
            )
        }
    }
}

/// Use the reflected constraint name when the catalog has one, otherwise
/// generate a deterministic name from kind, table, and columns, truncated to
/// the dialect's identifier limit.
fn constraint_name(dialect: &DialectKind, spec: &ConstraintSpec) -> String {
    if let Some(name) = &spec.name {
        return name.clone();
    }

    let prefix = match &spec.kind {
        ConstraintKind::ForeignKey { .. } => "fk",
        ConstraintKind::UniqueIndex => "uq",
        ConstraintKind::NonUniqueIndex { .. } => "idx",
        ConstraintKind::Check { .. } => "chk",
        ConstraintKind::CompositeKey => "uq",
    };

    let mut name = format!("{}_{}_{}", prefix, spec.table, spec.columns.join("_"));
    if name.len() > dialect.max_ident_len() {
        // Identifiers may contain multi-byte characters; cut on a char
        // boundary at or below the byte limit.
        let mut end = dialect.max_ident_len();
        while !name.is_char_boundary(end) {
            end -= 1;
        }
        name.truncate(end);
    }
    name
}

fn quote_all(dialect: &DialectKind, cols: &[String]) -> String {
    cols.iter()
        .map(|c| dialect.quote_ident(c))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Normalize catalog-reported referential actions to SQL keywords.
fn map_referential_action(action: &str) -> &str {
    match action.to_uppercase().as_str() {
        "CASCADE" => "CASCADE",
        "SET NULL" | "SET_NULL" => "SET NULL",
        "SET DEFAULT" | "SET_DEFAULT" => "SET DEFAULT",
        "RESTRICT" => "RESTRICT",
        _ => "NO ACTION",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MemorySource;

    fn col(name: &str, data_type: &str, nullable: bool) -> ColumnSpec {
        ColumnSpec {
            name: name.to_string(),
            data_type: data_type.to_string(),
            is_nullable: nullable,
            default: None,
            is_identity: false,
        }
    }

    fn extractor_for(source: MemorySource) -> DdlExtractor {
        DdlExtractor::new(Arc::new(source))
    }

    fn users_source() -> MemorySource {
        let mut source = MemorySource::new(DialectKind::Postgres);
        source.add_table(TableSpec {
            schema: None,
            name: "users".to_string(),
            columns: vec![
                ColumnSpec {
                    name: "id".to_string(),
                    data_type: "bigint".to_string(),
                    is_nullable: false,
                    default: None,
                    is_identity: true,
                },
                col("email", "varchar(255)", false),
                col("manager_id", "bigint", true),
            ],
            primary_key: vec!["id".to_string()],
        });
        source
    }

    #[tokio::test]
    async fn test_base_ddl_shape() {
        let extractor = extractor_for(users_source());
        let ddl = extractor.base_ddl("users").await.unwrap();

        assert!(ddl.starts_with("CREATE TABLE \"users\" ("));
        assert!(ddl.contains("\"id\" bigint NOT NULL GENERATED BY DEFAULT AS IDENTITY"));
        assert!(ddl.contains("\"email\" varchar(255) NOT NULL"));
        assert!(ddl.contains("\"manager_id\" bigint"));
        assert!(ddl.contains("PRIMARY KEY (\"id\")"));
    }

    #[tokio::test]
    async fn test_base_ddl_missing_table() {
        let extractor = extractor_for(users_source());
        let err = extractor.base_ddl("ghost").await.unwrap_err();
        assert!(matches!(err, DdlError::NotFound(name) if name == "ghost"));
    }

    #[tokio::test]
    async fn test_base_ddl_default_expression() {
        let mut source = MemorySource::new(DialectKind::Postgres);
        source.add_table(TableSpec {
            schema: None,
            name: "events".to_string(),
            columns: vec![ColumnSpec {
                name: "created_at".to_string(),
                data_type: "timestamptz".to_string(),
                is_nullable: false,
                default: Some("now()".to_string()),
                is_identity: false,
            }],
            primary_key: vec![],
        });
        let ddl = extractor_for(source).base_ddl("events").await.unwrap();
        assert!(ddl.contains("\"created_at\" timestamptz DEFAULT now() NOT NULL"));
        assert!(!ddl.contains("PRIMARY KEY"));
    }

    #[tokio::test]
    async fn test_namespace_qualification() {
        let source = users_source().with_namespace("app");
        let ddl = extractor_for(source).base_ddl("users").await.unwrap();
        assert!(ddl.starts_with("CREATE TABLE \"app\".\"users\""));
    }

    #[tokio::test]
    async fn test_constraint_ordering_within_table() {
        let mut source = users_source();
        source.add_constraint(ConstraintSpec::new(
            "users",
            vec!["manager_id".to_string()],
            ConstraintKind::ForeignKey {
                ref_table: "users".to_string(),
                ref_columns: vec!["id".to_string()],
                on_delete: "SET_NULL".to_string(),
                on_update: "NO_ACTION".to_string(),
            },
        ));
        source.add_constraint(ConstraintSpec::new(
            "users",
            vec![],
            ConstraintKind::Check {
                expression: "email <> ''".to_string(),
            },
        ));
        source.add_constraint(ConstraintSpec::new(
            "users",
            vec!["email".to_string()],
            ConstraintKind::UniqueIndex,
        ));

        let stmts = extractor_for(source).constraint_ddl("users").await.unwrap();
        assert_eq!(stmts.len(), 3);
        assert!(stmts[0].starts_with("CREATE UNIQUE INDEX"));
        assert!(stmts[1].contains("CHECK (email <> '')"));
        assert!(stmts[2].contains("FOREIGN KEY (\"manager_id\") REFERENCES \"users\" (\"id\")"));
        assert!(stmts[2].contains("ON DELETE SET NULL"));
        assert!(stmts[2].contains("ON UPDATE NO ACTION"));
    }

    #[tokio::test]
    async fn test_deferrable_constraint_is_unsupported() {
        let mut source = users_source();
        let mut spec = ConstraintSpec::new(
            "users",
            vec!["email".to_string()],
            ConstraintKind::UniqueIndex,
        );
        spec.deferrable = true;
        source.add_constraint(spec);

        let err = extractor_for(source).constraint_ddl("users").await.unwrap_err();
        assert!(matches!(err, DdlError::UnsupportedSchema { table, .. } if table == "users"));
    }

    #[tokio::test]
    async fn test_storage_params_are_unsupported() {
        let mut source = users_source();
        let mut spec = ConstraintSpec::new(
            "users",
            vec!["email".to_string()],
            ConstraintKind::NonUniqueIndex {
                include_cols: vec![],
            },
        )
        .named("ix_users_email");
        spec.storage_params = vec!["FILLFACTOR = 70".to_string()];
        source.add_constraint(spec);

        let err = extractor_for(source).constraint_ddl("users").await.unwrap_err();
        let DdlError::UnsupportedSchema { reason, .. } = err else {
            panic!("expected UnsupportedSchema");
        };
        assert!(reason.contains("ix_users_email"));
        assert!(reason.contains("FILLFACTOR"));
    }

    #[tokio::test]
    async fn test_generated_name_truncated_to_dialect_limit() {
        let long_col = "a".repeat(80);
        let mut source = MemorySource::new(DialectKind::Postgres);
        source.add_table(TableSpec {
            schema: None,
            name: "wide".to_string(),
            columns: vec![col(&long_col, "text", true)],
            primary_key: vec![],
        });
        source.add_constraint(ConstraintSpec::new(
            "wide",
            vec![long_col],
            ConstraintKind::NonUniqueIndex {
                include_cols: vec![],
            },
        ));

        let stmts = extractor_for(source).constraint_ddl("wide").await.unwrap();
        // Name between the first pair of quotes must fit PostgreSQL's limit.
        let name = stmts[0]
            .split('"')
            .nth(1)
            .expect("quoted index name");
        assert!(name.len() <= 63);
    }

    #[tokio::test]
    async fn test_generated_name_truncation_respects_char_boundaries() {
        // Quoted identifiers may be non-ASCII; truncation must not land
        // inside a multi-byte character.
        let accented_col = "é".repeat(40);
        let mut source = MemorySource::new(DialectKind::Postgres);
        source.add_table(TableSpec {
            schema: None,
            name: "widee".to_string(),
            columns: vec![col(&accented_col, "text", true)],
            primary_key: vec![],
        });
        source.add_constraint(ConstraintSpec::new(
            "widee",
            vec![accented_col],
            ConstraintKind::NonUniqueIndex {
                include_cols: vec![],
            },
        ));

        let stmts = extractor_for(source).constraint_ddl("widee").await.unwrap();
        let name = stmts[0].split('"').nth(1).expect("quoted index name");
        assert!(name.len() <= 63);
        assert!(name.chars().all(|c| c == 'é' || c.is_ascii()));
    }

    #[tokio::test]
    async fn test_options_filter_families() {
        let mut source = users_source();
        source.add_constraint(ConstraintSpec::new(
            "users",
            vec!["email".to_string()],
            ConstraintKind::UniqueIndex,
        ));
        source.add_constraint(ConstraintSpec::new(
            "users",
            vec!["manager_id".to_string()],
            ConstraintKind::ForeignKey {
                ref_table: "users".to_string(),
                ref_columns: vec!["id".to_string()],
                on_delete: "NO_ACTION".to_string(),
                on_update: "NO_ACTION".to_string(),
            },
        ));

        let extractor = DdlExtractor::with_options(
            Arc::new(source),
            ExtractOptions {
                include_indexes: false,
                include_foreign_keys: true,
                include_check_constraints: true,
            },
        );
        let stmts = extractor.constraint_ddl("users").await.unwrap();
        assert_eq!(stmts.len(), 1);
        assert!(stmts[0].contains("FOREIGN KEY"));
    }

    #[tokio::test]
    async fn test_mssql_rendering() {
        let mut source = MemorySource::new(DialectKind::Mssql).with_namespace("dbo");
        source.add_table(TableSpec {
            schema: Some("dbo".to_string()),
            name: "Orders".to_string(),
            columns: vec![ColumnSpec {
                name: "Id".to_string(),
                data_type: "int".to_string(),
                is_nullable: false,
                default: None,
                is_identity: true,
            }],
            primary_key: vec!["Id".to_string()],
        });

        let ddl = extractor_for(source).base_ddl("Orders").await.unwrap();
        assert!(ddl.starts_with("CREATE TABLE [dbo].[Orders]"));
        assert!(ddl.contains("[Id] int NOT NULL IDENTITY(1,1)"));
    }
}
