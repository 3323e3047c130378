use std::{collections::HashMap, sync::LazyLock};

use regex::Regex;

pub const BOOLEAN_TYPE_KEYWORD: &str = "BOOLEAN";

static CREATE_TABLE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)CREATE TABLE IF NOT EXISTS\s+"(?P<table>[^"]+)"\s*\((?P<body>.*?)\);"#)
        .expect("create table pattern should compile")
});

static COLUMN_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^(?:"(?P<quoted>[^"]+)"|(?P<bare>[A-Za-z_][A-Za-z0-9_]*))\s+(?P<column_type>[A-Za-z_][A-Za-z0-9_]*)"#)
        .expect("column pattern should compile")
});

/// Table-level clauses that share the `<word> <word>` shape of a column.
const CONSTRAINT_KEYWORDS: [&str; 5] = ["PRIMARY", "FOREIGN", "UNIQUE", "CHECK", "CONSTRAINT"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDefinition {
    pub name: String,
    pub declared_type: String,
}

/// Columns of one `CREATE TABLE`, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableDefinition {
    pub name: String,
    pub columns: Vec<ColumnDefinition>,
}

impl TableDefinition {
    pub fn boolean_ordinals(&self) -> Vec<usize> {
        self.columns
            .iter()
            .enumerate()
            .filter(|(_, column)| column.declared_type == BOOLEAN_TYPE_KEYWORD)
            .map(|(ordinal, _)| ordinal)
            .collect()
    }
}

/// Table name to the zero-based positions of its `BOOLEAN` columns.
///
/// Tables without boolean columns are absent, so a miss means "nothing to
/// rewrite", not "unknown table".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BooleanOrdinalMap {
    ordinals_by_table: HashMap<String, Vec<usize>>,
}

impl BooleanOrdinalMap {
    pub fn from_tables<'a>(tables: impl IntoIterator<Item = &'a TableDefinition>) -> Self {
        let ordinals_by_table = tables
            .into_iter()
            .filter_map(|table| {
                let ordinals = table.boolean_ordinals();
                (!ordinals.is_empty()).then(|| (table.name.clone(), ordinals))
            })
            .collect();
        Self { ordinals_by_table }
    }

    pub fn ordinals_for(&self, table: &str) -> Option<&[usize]> {
        self.ordinals_by_table.get(table).map(Vec::as_slice)
    }

    pub fn is_empty(&self) -> bool {
        self.ordinals_by_table.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ordinals_by_table.len()
    }
}

/// Finds every `CREATE TABLE IF NOT EXISTS "<name>" (...);` in a dump.
///
/// Statements that do not have this exact shape are skipped silently.
pub fn introspect_tables(sql_text: &str) -> Vec<TableDefinition> {
    CREATE_TABLE_PATTERN
        .captures_iter(sql_text)
        .map(|captures| TableDefinition {
            name: captures["table"].to_string(),
            columns: split_column_definitions(&captures["body"])
                .into_iter()
                .filter_map(parse_column_definition)
                .collect(),
        })
        .collect()
}

pub fn detect_boolean_columns(sql_text: &str) -> BooleanOrdinalMap {
    BooleanOrdinalMap::from_tables(&introspect_tables(sql_text))
}

fn parse_column_definition(definition: &str) -> Option<ColumnDefinition> {
    let captures = COLUMN_PATTERN.captures(definition.trim())?;
    let name = match (captures.name("quoted"), captures.name("bare")) {
        (Some(quoted), _) => quoted.as_str(),
        (None, Some(bare)) => {
            let keyword = bare.as_str().to_ascii_uppercase();
            if CONSTRAINT_KEYWORDS.contains(&keyword.as_str()) {
                return None;
            }
            bare.as_str()
        }
        (None, None) => return None,
    };

    Some(ColumnDefinition {
        name: name.to_string(),
        declared_type: captures["column_type"].to_ascii_uppercase(),
    })
}

/// Splits a table body on commas that are outside parentheses and quotes,
/// so `DECIMAL(10,2)` stays inside its column definition.
fn split_column_definitions(body: &str) -> Vec<&str> {
    let mut definitions = Vec::new();
    let mut depth = 0usize;
    let mut open_quote: Option<char> = None;
    let mut definition_start = 0usize;

    for (index, character) in body.char_indices() {
        match (open_quote, character) {
            (Some(quote), current) if current == quote => open_quote = None,
            (Some(_), _) => {}
            (None, '\'' | '"') => open_quote = Some(character),
            (None, '(') => depth += 1,
            (None, ')') => depth = depth.saturating_sub(1),
            (None, ',') if depth == 0 => {
                definitions.push(&body[definition_start..index]);
                definition_start = index + 1;
            }
            _ => {}
        }
    }
    definitions.push(&body[definition_start..]);

    definitions
        .into_iter()
        .filter(|definition| !definition.trim().is_empty())
        .collect()
}
