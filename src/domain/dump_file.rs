use std::path::{Path, PathBuf};

use crate::domain::namespace::Namespace;

/// A source dump and the schema it belongs in. Immutable once loaded.
#[derive(Debug, Clone)]
pub struct DumpFile {
    path: PathBuf,
    sql_text: String,
    namespace: Namespace,
}

impl DumpFile {
    pub fn new(path: PathBuf, sql_text: String) -> Self {
        let namespace = Namespace::from_dump_path(&path);
        Self {
            path,
            sql_text,
            namespace,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn sql_text(&self) -> &str {
        &self.sql_text
    }

    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }
}
