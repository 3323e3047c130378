use tracing::debug;

use crate::domain::{
    boolean_rewrite::rewrite_boolean_inserts,
    dump_file::DumpFile,
    namespace::Namespace,
    schema_introspection::detect_boolean_columns,
    sql_dialect::{PostgresDialect, strip_transaction_markers},
};

/// Everything executed for one dump file, in order.
#[derive(Debug, Clone)]
pub struct DeploymentScript {
    pub namespace: Namespace,
    pub schema_statement: String,
    pub body: String,
    pub statements_rewritten: usize,
    pub values_rewritten: usize,
}

impl DeploymentScript {
    pub fn prepare(dump_file: &DumpFile) -> Self {
        let namespace = dump_file.namespace().clone();
        let sql_text = strip_transaction_markers(dump_file.sql_text());

        let boolean_map = detect_boolean_columns(&sql_text);
        debug!(
            %namespace,
            tables = boolean_map.len(),
            "Tables with boolean columns detected"
        );
        let rewrite = rewrite_boolean_inserts(&sql_text, &boolean_map);

        let body = format!(
            "{}\n{}",
            PostgresDialect::search_path_directive(&namespace),
            rewrite.sql
        );

        Self {
            schema_statement: PostgresDialect::create_schema_statement(&namespace),
            namespace,
            body,
            statements_rewritten: rewrite.statements_rewritten,
            values_rewritten: rewrite.values_rewritten,
        }
    }

    /// The whole script as a single text, as written by a dry run.
    pub fn render(&self) -> String {
        let mut rendered = format!("{}\n{}", self.schema_statement, self.body);
        if !rendered.ends_with('\n') {
            rendered.push('\n');
        }
        rendered
    }
}
