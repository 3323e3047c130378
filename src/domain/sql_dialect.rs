use crate::domain::{namespace::Namespace, tuple_values::QuoteState};

/// Lines of a source dump that open or close its own transaction.
const SOURCE_TRANSACTION_MARKERS: [&str; 3] = ["BEGIN TRANSACTION;", "BEGIN;", "COMMIT;"];

/// The target engine the dumps are replayed into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PostgresDialect;

impl PostgresDialect {
    pub fn quote_ident(name: &str) -> String {
        format!("\"{}\"", name.replace('"', "\"\""))
    }

    pub fn boolean_literal(value: bool) -> &'static str {
        if value { "TRUE" } else { "FALSE" }
    }

    pub fn create_schema_statement(namespace: &Namespace) -> String {
        format!(
            "CREATE SCHEMA IF NOT EXISTS {};",
            Self::quote_ident(namespace.as_str())
        )
    }

    /// Makes unqualified names in the rest of the script resolve inside `namespace`.
    pub fn search_path_directive(namespace: &Namespace) -> String {
        format!(
            "SET search_path = {}, public;",
            Self::quote_ident(namespace.as_str())
        )
    }
}

/// Drops the dump's own `BEGIN TRANSACTION;` / `COMMIT;` lines; the deployer
/// owns the transaction boundaries.
///
/// A marker only counts when it starts a statement outside any string
/// literal. Every other byte, line endings included, is copied through.
pub fn strip_transaction_markers(sql_text: &str) -> String {
    let mut stripped = String::with_capacity(sql_text.len());
    let mut quote_state = QuoteState::default();
    let mut at_statement_start = true;

    for line in sql_text.split_inclusive('\n') {
        let trimmed = line.trim();
        let is_marker = at_statement_start
            && !quote_state.is_open()
            && SOURCE_TRANSACTION_MARKERS
                .iter()
                .any(|marker| trimmed.eq_ignore_ascii_case(marker));
        if is_marker {
            continue;
        }

        stripped.push_str(line);
        for byte in line.bytes() {
            quote_state.observe(byte);
            if !quote_state.is_open() && !byte.is_ascii_whitespace() {
                at_statement_start = byte == b';';
            }
        }
    }
    stripped
}
