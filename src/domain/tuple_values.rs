/// Splits the inside of a `VALUES (...)` clause into its positional literals.
///
/// Commas inside single-quoted strings do not separate values, and a doubled
/// quote (`''`) inside a string is an escaped apostrophe rather than the end
/// of the string. Every returned slice is the exact original text between two
/// separating commas, surrounding quotes and whitespace included.
///
/// An unterminated string swallows the rest of the input as a single value.
pub fn split_tuple_values(raw_values: &str) -> Vec<&str> {
    let mut values = Vec::new();
    if raw_values.is_empty() {
        return values;
    }

    let bytes = raw_values.as_bytes();
    let mut value_start = 0usize;
    let mut inside_quotes = false;
    let mut index = 0usize;

    while index < bytes.len() {
        match (inside_quotes, bytes[index]) {
            (false, b',') => {
                values.push(&raw_values[value_start..index]);
                value_start = index + 1;
            }
            (false, b'\'') => inside_quotes = true,
            (true, b'\'') => {
                if bytes.get(index + 1) == Some(&b'\'') {
                    index += 1;
                } else {
                    inside_quotes = false;
                }
            }
            _ => {}
        }
        index += 1;
    }

    values.push(&raw_values[value_start..]);
    values
}

/// Tracks whether a left-to-right byte scan is inside a single-quoted string.
///
/// A doubled quote closes and reopens the string, so escaped apostrophes
/// need no lookahead.
#[derive(Debug, Clone, Copy, Default)]
pub struct QuoteState {
    inside_quotes: bool,
}

impl QuoteState {
    pub fn observe(&mut self, byte: u8) {
        if byte == b'\'' {
            self.inside_quotes = !self.inside_quotes;
        }
    }

    pub fn is_open(&self) -> bool {
        self.inside_quotes
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    QuotedString,
    DialectBoolean,
    Bare,
}

/// One positional literal of an `INSERT` tuple.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValueToken<'a> {
    raw: &'a str,
}

impl<'a> ValueToken<'a> {
    pub fn new(raw: &'a str) -> Self {
        Self { raw }
    }

    pub fn raw(&self) -> &'a str {
        self.raw
    }

    pub fn trimmed(&self) -> &'a str {
        self.raw.trim()
    }

    pub fn kind(&self) -> ValueKind {
        let trimmed = self.trimmed();
        if trimmed.len() >= 2 && trimmed.starts_with('\'') && trimmed.ends_with('\'') {
            ValueKind::QuotedString
        } else if trimmed.eq_ignore_ascii_case("TRUE") || trimmed.eq_ignore_ascii_case("FALSE") {
            ValueKind::DialectBoolean
        } else {
            ValueKind::Bare
        }
    }

    /// Reads the token as a `0`/`1` boolean encoding, quoted or bare.
    pub fn as_numeric_boolean(&self) -> Option<bool> {
        let trimmed = self.trimmed();
        let digits = match self.kind() {
            ValueKind::QuotedString => &trimmed[1..trimmed.len() - 1],
            ValueKind::Bare => trimmed,
            ValueKind::DialectBoolean => return None,
        };
        match digits {
            "1" => Some(true),
            "0" => Some(false),
            _ => None,
        }
    }

    /// Swaps the literal for `replacement`, keeping the whitespace around it.
    pub fn replaced_with(&self, replacement: &str) -> String {
        let leading = self.raw.len() - self.raw.trim_start().len();
        let trailing_start = self.raw.trim_end().len();
        format!(
            "{}{replacement}{}",
            &self.raw[..leading],
            &self.raw[trailing_start..]
        )
    }
}
