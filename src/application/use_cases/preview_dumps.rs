use std::{
    fs::{self, File},
    io::{BufWriter, Write},
};

use anyhow::{Context, Result};
use tracing::info;

use crate::{
    application::{
        commands::{PreviewDumpsCommand, PreviewDumpsResult},
        deployment_script::DeploymentScript,
    },
    domain::dump_file::DumpFile,
};

/// Writes the scripts a deployment would run, one `<namespace>.sql` per dump,
/// without touching any database.
#[derive(Debug, Default)]
pub struct PreviewDumpsUseCase;

impl PreviewDumpsUseCase {
    pub fn execute(&self, command: PreviewDumpsCommand) -> Result<PreviewDumpsResult> {
        fs::create_dir_all(&command.output_dir).with_context(|| {
            format!(
                "Unable to create output directory: {}",
                command.output_dir.display()
            )
        })?;

        let mut dump_paths = command.dump_paths;
        dump_paths.sort();

        let mut written_paths = Vec::with_capacity(dump_paths.len());
        for dump_path in dump_paths {
            let sql_text = fs::read_to_string(&dump_path)
                .with_context(|| format!("Unable to read dump file: {}", dump_path.display()))?;
            let dump_file = DumpFile::new(dump_path, sql_text);
            let script = DeploymentScript::prepare(&dump_file);

            let output_path = command
                .output_dir
                .join(format!("{}.sql", script.namespace));
            let output_file = File::create(&output_path).with_context(|| {
                format!("Unable to create file: {}", output_path.display())
            })?;
            let mut output_writer = BufWriter::new(output_file);
            output_writer.write_all(script.render().as_bytes())?;
            output_writer.flush()?;

            info!(
                file = %dump_file.path().display(),
                output = %output_path.display(),
                values = script.values_rewritten,
                "Preview written"
            );
            written_paths.push(output_path);
        }

        Ok(PreviewDumpsResult { written_paths })
    }
}
