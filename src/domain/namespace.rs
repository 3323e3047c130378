use std::{fmt, path::Path, sync::LazyLock};

use regex::Regex;

const DUMP_SUFFIX: &str = ".db.sql";
const DIGIT_PREFIX: &str = "s_";
const FALLBACK_NAME: &str = "dump";

static NON_ALPHANUMERIC_RUN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[^0-9a-zA-Z]+").expect("non-alphanumeric pattern should compile")
});

/// The schema a dump file is deployed into.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Namespace(String);

impl Namespace {
    /// `datamart_ventas.db.sql` becomes `datamart_ventas`, `3stats.sql`
    /// becomes `s_3stats`.
    pub fn from_dump_path(path: &Path) -> Self {
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        let base_name = if file_name.to_ascii_lowercase().ends_with(DUMP_SUFFIX) {
            file_name[..file_name.len() - DUMP_SUFFIX.len()].to_string()
        } else {
            Path::new(&file_name)
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_default()
        };

        let mut name = NON_ALPHANUMERIC_RUN
            .replace_all(&base_name, "_")
            .to_ascii_lowercase();
        if name.is_empty() {
            name = FALLBACK_NAME.to_string();
        }
        if name.starts_with(|character: char| character.is_ascii_digit()) {
            name.insert_str(0, DIGIT_PREFIX);
        }
        Self(name)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::Namespace;

    fn namespace_of(path: &str) -> String {
        Namespace::from_dump_path(Path::new(path)).to_string()
    }

    #[test]
    fn strips_dump_suffix() {
        assert_eq!(namespace_of("dbs/sql/datamart_ventas.db.sql"), "datamart_ventas");
        assert_eq!(namespace_of("DATAMART_RRHH.DB.SQL"), "datamart_rrhh");
    }

    #[test]
    fn prefixes_names_starting_with_a_digit() {
        assert_eq!(namespace_of("3stats.sql"), "s_3stats");
    }

    #[test]
    fn collapses_non_alphanumeric_runs() {
        assert_eq!(namespace_of("Data Mart--Producción.db.sql"), "data_mart_producci_n");
        assert_eq!(namespace_of("/tmp/ventas.v2.sql"), "ventas_v2");
    }

    #[test]
    fn falls_back_when_nothing_is_left() {
        assert_eq!(namespace_of("--.db.sql"), "_");
        assert_eq!(namespace_of(".db.sql"), "dump");
    }
}
