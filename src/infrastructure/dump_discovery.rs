use std::path::{Path, PathBuf};

use glob::glob;
use tracing::debug;

use crate::error::DeployError;

/// Lists the files in `dump_dir` matching `pattern`, sorted by path.
///
/// Finding nothing is a configuration error: the run would otherwise
/// "succeed" without deploying anything.
pub fn discover_dump_files(dump_dir: &Path, pattern: &str) -> Result<Vec<PathBuf>, DeployError> {
    let full_pattern = dump_dir.join(pattern);
    let full_pattern = full_pattern.to_string_lossy();

    let entries = glob(&full_pattern).map_err(|error| {
        DeployError::configuration(format!("Invalid dump file pattern {full_pattern}: {error}"))
    })?;

    let mut dump_paths = entries
        .filter_map(|entry| match entry {
            Ok(path) if path.is_file() => Some(path),
            Ok(_) => None,
            Err(error) => {
                debug!("Skipping unreadable path: {error}");
                None
            }
        })
        .collect::<Vec<_>>();
    dump_paths.sort();

    if dump_paths.is_empty() {
        return Err(DeployError::configuration(format!(
            "No dump files found matching {full_pattern}"
        )));
    }
    Ok(dump_paths)
}

#[cfg(test)]
mod tests {
    use std::{
        fs,
        time::{SystemTime, UNIX_EPOCH},
    };

    use crate::error::DeployError;

    use super::discover_dump_files;

    #[test]
    fn finds_matching_dumps_in_sorted_order() {
        let unique_suffix = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time should be after unix epoch")
            .as_nanos();
        let dir = std::env::temp_dir().join(format!("dump_deployer_discovery_{unique_suffix}"));
        fs::create_dir_all(&dir).expect("temp dir should be created");
        for name in [
            "datamart_ventas.db.sql",
            "datamart_calidad.db.sql",
            "molinera.db.sql",
            "datamart_notes.txt",
        ] {
            fs::write(dir.join(name), "").expect("temp file should be written");
        }

        let dump_paths =
            discover_dump_files(&dir, "datamart_*.db.sql").expect("dumps should be found");

        assert_eq!(dump_paths, vec![
            dir.join("datamart_calidad.db.sql"),
            dir.join("datamart_ventas.db.sql"),
        ]);

        let error = discover_dump_files(&dir, "nothing_*.sql").expect_err("no match should fail");
        assert!(matches!(error, DeployError::Configuration(_)));
        assert_eq!(error.exit_code(), 1);

        fs::remove_dir_all(dir).expect("temp dir should be removed");
    }
}
