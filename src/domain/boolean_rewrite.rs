use std::sync::LazyLock;

use regex::Regex;

use crate::domain::{
    schema_introspection::BooleanOrdinalMap,
    sql_dialect::PostgresDialect,
    tuple_values::{QuoteState, ValueToken, split_tuple_values},
};

static INSERT_HEAD_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)INSERT INTO\s+"(?P<table>[^"]+)"\s+VALUES\s*\("#)
        .expect("insert pattern should compile")
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BooleanRewrite {
    pub sql: String,
    pub statements_rewritten: usize,
    pub values_rewritten: usize,
}

/// Turns `0`/`1` (bare or quoted) at boolean ordinals of single-tuple
/// `INSERT INTO "<table>" VALUES (...);` statements into `FALSE`/`TRUE`.
///
/// Only the tuple text of a statement that actually changes is replaced;
/// everything else is copied through untouched, so a second pass is a no-op.
pub fn rewrite_boolean_inserts(sql_text: &str, boolean_map: &BooleanOrdinalMap) -> BooleanRewrite {
    let mut rewrite = BooleanRewrite {
        sql: String::with_capacity(sql_text.len()),
        statements_rewritten: 0,
        values_rewritten: 0,
    };
    if boolean_map.is_empty() {
        rewrite.sql.push_str(sql_text);
        return rewrite;
    }

    let bytes = sql_text.as_bytes();
    let mut quote_state = QuoteState::default();
    let mut scanned_until = 0usize;
    let mut copied_until = 0usize;
    for captures in INSERT_HEAD_PATTERN.captures_iter(sql_text) {
        let Some(head) = captures.get(0) else {
            continue;
        };
        if head.start() < scanned_until {
            continue;
        }
        // Heads that start inside a string literal are data, not statements.
        for &byte in &bytes[scanned_until..head.start()] {
            quote_state.observe(byte);
        }
        scanned_until = head.start();
        if quote_state.is_open() {
            continue;
        }

        let values_start = head.end();
        let Some(values_end) = find_tuple_end(sql_text, values_start) else {
            continue;
        };
        scanned_until = values_end;

        let Some(ordinals) = boolean_map.ordinals_for(&captures["table"]) else {
            continue;
        };
        let raw_values = &sql_text[values_start..values_end];
        let (rewritten_values, changed) = rewrite_tuple(raw_values, ordinals);
        if changed == 0 {
            continue;
        }

        rewrite.sql.push_str(&sql_text[copied_until..values_start]);
        rewrite.sql.push_str(&rewritten_values);
        copied_until = values_end;
        rewrite.statements_rewritten += 1;
        rewrite.values_rewritten += changed;
    }
    rewrite.sql.push_str(&sql_text[copied_until..]);
    rewrite
}

fn rewrite_tuple(raw_values: &str, ordinals: &[usize]) -> (String, usize) {
    let mut values = split_tuple_values(raw_values)
        .into_iter()
        .map(|raw| (ValueToken::new(raw), None::<String>))
        .collect::<Vec<_>>();

    let mut changed = 0usize;
    for &ordinal in ordinals {
        let Some((token, replacement)) = values.get_mut(ordinal) else {
            continue;
        };
        if let Some(flag) = token.as_numeric_boolean() {
            *replacement = Some(token.replaced_with(PostgresDialect::boolean_literal(flag)));
            changed += 1;
        }
    }

    let joined = values
        .iter()
        .map(|(token, replacement)| replacement.as_deref().unwrap_or(token.raw()))
        .collect::<Vec<_>>()
        .join(",");
    (joined, changed)
}

/// Byte offset of the `)` closing a tuple that starts at `values_start`,
/// provided it is followed by the statement's `;`.
fn find_tuple_end(sql_text: &str, values_start: usize) -> Option<usize> {
    let bytes = sql_text.as_bytes();
    let mut inside_quotes = false;
    let mut index = values_start;

    while index < bytes.len() {
        match (inside_quotes, bytes[index]) {
            (false, b'\'') => inside_quotes = true,
            (true, b'\'') => {
                if bytes.get(index + 1) == Some(&b'\'') {
                    index += 1;
                } else {
                    inside_quotes = false;
                }
            }
            (false, b')') => {
                let rest = sql_text[index + 1..].trim_start();
                return rest.starts_with(';').then_some(index);
            }
            _ => {}
        }
        index += 1;
    }
    None
}
