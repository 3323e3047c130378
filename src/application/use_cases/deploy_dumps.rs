use std::{fs, path::Path};

use tracing::{debug, error, info, warn};

use crate::{
    application::{
        commands::{DeployDumpsCommand, DeploymentReport, FailurePolicy, FileOutcome},
        deployment_script::DeploymentScript,
        executor::DumpExecutor,
    },
    domain::{deployment_stage::DeploymentStage, dump_file::DumpFile, namespace::Namespace},
    error::{DeployError, ExecutorError},
};

#[derive(Debug, Default)]
pub struct DeployDumpsUseCase;

impl DeployDumpsUseCase {
    /// Deploys every dump in path order, one transaction per file.
    ///
    /// With [`FailurePolicy::Abort`] the first failing file ends the run;
    /// files committed before it stay committed and are listed in the report
    /// next to the error in [`DeploymentReport::halted`].
    pub fn execute<E: DumpExecutor>(
        &self,
        command: DeployDumpsCommand,
        executor: &mut E,
    ) -> DeploymentReport {
        let mut dump_paths = command.dump_paths;
        dump_paths.sort();

        let mut report = DeploymentReport::default();
        for dump_path in &dump_paths {
            let deployed = load_dump_file(dump_path)
                .and_then(|dump_file| deploy_dump_file(&dump_file, executor));
            match deployed {
                Ok(outcome) => report.applied.push(outcome),
                Err(DeployError::Execution {
                    file,
                    stage,
                    message,
                }) if command.failure_policy == FailurePolicy::Continue => {
                    error!(file = %file.display(), %stage, "{message}");
                    report.failed.push(FileOutcome {
                        namespace: Namespace::from_dump_path(&file),
                        path: file,
                        stage: DeploymentStage::Failed,
                        values_rewritten: 0,
                        error: Some(message),
                    });
                }
                Err(failure) => {
                    error!(file = %dump_path.display(), "{failure}");
                    report.halted = Some(failure);
                    break;
                }
            }
        }

        info!(
            applied = report.applied.len(),
            failed = report.failed.len(),
            halted = report.halted.is_some(),
            "Deployment run finished"
        );
        report
    }
}

fn load_dump_file(path: &Path) -> Result<DumpFile, DeployError> {
    let sql_text = fs::read_to_string(path).map_err(|source| DeployError::io(path, source))?;
    Ok(DumpFile::new(path.to_path_buf(), sql_text))
}

fn deploy_dump_file<E: DumpExecutor>(
    dump_file: &DumpFile,
    executor: &mut E,
) -> Result<FileOutcome, DeployError> {
    let namespace = dump_file.namespace();
    let mut stage = DeploymentStage::Pending;
    info!(file = %dump_file.path().display(), %namespace, %stage, "Deploying dump file");

    executor
        .begin()
        .map_err(|failure| into_deploy_error(dump_file, stage, failure))?;

    let applied = apply_in_transaction(dump_file, namespace, &mut stage, executor);
    match applied {
        Ok(values_rewritten) => {
            executor
                .commit()
                .map_err(|failure| into_deploy_error(dump_file, stage, failure))?;
            stage = DeploymentStage::Applied;
            info!(file = %dump_file.path().display(), %namespace, %stage, "Dump file applied");
            Ok(FileOutcome {
                path: dump_file.path().to_path_buf(),
                namespace: namespace.clone(),
                stage,
                values_rewritten,
                error: None,
            })
        }
        Err(failure) => {
            if let Err(rollback_failure) = executor.rollback() {
                warn!(file = %dump_file.path().display(), "Rollback failed: {rollback_failure}");
                if let ExecutorError::Connection(message) = rollback_failure {
                    return Err(DeployError::Connection(message));
                }
            }
            debug!(file = %dump_file.path().display(), "Transaction rolled back");
            Err(into_deploy_error(dump_file, stage, failure))
        }
    }
}

/// Runs schema creation and the rewritten body inside the open transaction,
/// advancing `stage` as it goes.
fn apply_in_transaction<E: DumpExecutor>(
    dump_file: &DumpFile,
    namespace: &Namespace,
    stage: &mut DeploymentStage,
    executor: &mut E,
) -> Result<usize, ExecutorError> {
    let script = DeploymentScript::prepare(dump_file);

    executor.execute_batch(&script.schema_statement)?;
    *stage = DeploymentStage::SchemaEnsured;
    debug!(%namespace, %stage, "Schema ensured");

    *stage = DeploymentStage::Rewritten;
    debug!(
        %namespace,
        %stage,
        statements = script.statements_rewritten,
        values = script.values_rewritten,
        "Boolean values rewritten"
    );

    executor.execute_batch(&script.body)?;
    Ok(script.values_rewritten)
}

fn into_deploy_error(
    dump_file: &DumpFile,
    stage: DeploymentStage,
    failure: ExecutorError,
) -> DeployError {
    match failure {
        ExecutorError::Rejected(message) => DeployError::Execution {
            file: dump_file.path().to_path_buf(),
            stage,
            message,
        },
        ExecutorError::Connection(message) => DeployError::Connection(message),
    }
}

#[cfg(test)]
mod tests {
    use std::{
        fs,
        path::{Path, PathBuf},
        time::{SystemTime, UNIX_EPOCH},
    };

    use crate::{
        application::{
            commands::{DeployDumpsCommand, FailurePolicy},
            executor::DumpExecutor,
        },
        domain::deployment_stage::DeploymentStage,
        error::{DeployError, ExecutorError},
    };

    use super::DeployDumpsUseCase;

    const BROKEN_MARKER: &str = "INSERT INTO broken";

    /// Keeps the batches of every committed transaction and fails any batch
    /// containing [`BROKEN_MARKER`].
    #[derive(Debug, Default)]
    struct RecordingExecutor {
        open_transaction: Option<Vec<String>>,
        committed: Vec<Vec<String>>,
        attempted: Vec<String>,
        rollbacks: usize,
        drop_connection: bool,
    }

    impl DumpExecutor for RecordingExecutor {
        fn begin(&mut self) -> Result<(), ExecutorError> {
            if self.drop_connection {
                return Err(ExecutorError::Connection("server closed the connection".into()));
            }
            assert!(self.open_transaction.is_none(), "transactions must not nest");
            self.open_transaction = Some(Vec::new());
            Ok(())
        }

        fn execute_batch(&mut self, sql: &str) -> Result<(), ExecutorError> {
            self.attempted.push(sql.to_string());
            if sql.contains(BROKEN_MARKER) {
                return Err(ExecutorError::Rejected(
                    "syntax error at or near \"broken\"".into(),
                ));
            }
            self.open_transaction
                .as_mut()
                .expect("batches run inside a transaction")
                .push(sql.to_string());
            Ok(())
        }

        fn commit(&mut self) -> Result<(), ExecutorError> {
            let batches = self
                .open_transaction
                .take()
                .expect("commit needs an open transaction");
            self.committed.push(batches);
            Ok(())
        }

        fn rollback(&mut self) -> Result<(), ExecutorError> {
            self.open_transaction
                .take()
                .expect("rollback needs an open transaction");
            self.rollbacks += 1;
            Ok(())
        }
    }

    fn build_temp_dump_dir(files: &[(&str, &str)]) -> PathBuf {
        let unique_suffix = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time should be after unix epoch")
            .as_nanos();
        let dir = std::env::temp_dir().join(format!("dump_deployer_use_case_{unique_suffix}"));
        fs::create_dir_all(&dir).expect("temp dump dir should be created");
        for (name, content) in files {
            fs::write(dir.join(name), content).expect("temp dump file should be written");
        }
        dir
    }

    fn dump_paths(dir: &Path, names: &[&str]) -> Vec<PathBuf> {
        names.iter().map(|name| dir.join(name)).collect()
    }

    const GOOD_DUMP: &str = concat!(
        "BEGIN TRANSACTION;\n",
        "CREATE TABLE IF NOT EXISTS \"dim_producto\" (\n",
        "\t\"id\"\tINTEGER,\n",
        "\t\"requiere_refrigeracion\"\tBOOLEAN\n",
        ");\n",
        "INSERT INTO \"dim_producto\" VALUES (1,1);\n",
        "COMMIT;\n",
    );

    const BROKEN_DUMP: &str = concat!(
        "CREATE TABLE IF NOT EXISTS \"fact_ventas\" (\"id\" INTEGER);\n",
        "INSERT INTO broken VALUES (;\n",
    );

    #[test]
    fn commits_earlier_files_and_stops_at_first_failure() {
        let dir = build_temp_dump_dir(&[
            ("datamart_a.db.sql", GOOD_DUMP),
            ("datamart_b.db.sql", BROKEN_DUMP),
            ("datamart_c.db.sql", GOOD_DUMP),
        ]);
        let mut executor = RecordingExecutor::default();
        let command = DeployDumpsCommand {
            dump_paths: dump_paths(&dir, &[
                "datamart_c.db.sql",
                "datamart_b.db.sql",
                "datamart_a.db.sql",
            ]),
            failure_policy: FailurePolicy::Abort,
        };

        let report = DeployDumpsUseCase.execute(command, &mut executor);

        assert_eq!(report.applied.len(), 1);
        assert_eq!(report.applied[0].namespace.as_str(), "datamart_a");
        assert_eq!(report.applied[0].stage, DeploymentStage::Applied);
        assert!(report.failed.is_empty());
        match report.halted.expect("broken dump should abort the run") {
            DeployError::Execution { file, stage, .. } => {
                assert_eq!(file, dir.join("datamart_b.db.sql"));
                assert_eq!(stage, DeploymentStage::Rewritten);
            }
            other => panic!("expected execution error, got {other:?}"),
        }
        assert_eq!(executor.committed.len(), 1);
        assert_eq!(
            executor.committed[0][0],
            "CREATE SCHEMA IF NOT EXISTS \"datamart_a\";"
        );
        assert!(executor.committed[0][1].contains("INSERT INTO \"dim_producto\" VALUES (1,TRUE);"));
        assert_eq!(executor.rollbacks, 1);
        assert!(
            executor
                .attempted
                .iter()
                .all(|batch| !batch.contains("datamart_c"))
        );

        fs::remove_dir_all(dir).expect("temp dump dir should be removed");
    }

    #[test]
    fn continue_policy_attempts_every_file() {
        let dir = build_temp_dump_dir(&[
            ("datamart_a.db.sql", GOOD_DUMP),
            ("datamart_b.db.sql", BROKEN_DUMP),
            ("datamart_c.db.sql", GOOD_DUMP),
        ]);
        let mut executor = RecordingExecutor::default();
        let command = DeployDumpsCommand {
            dump_paths: dump_paths(&dir, &[
                "datamart_a.db.sql",
                "datamart_b.db.sql",
                "datamart_c.db.sql",
            ]),
            failure_policy: FailurePolicy::Continue,
        };

        let report = DeployDumpsUseCase.execute(command, &mut executor);

        assert!(report.halted.is_none());
        assert_eq!(report.total(), 3);
        assert_eq!(report.applied.len(), 2);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].namespace.as_str(), "datamart_b");
        assert_eq!(report.failed[0].stage, DeploymentStage::Failed);
        assert!(
            report
                .applied
                .iter()
                .all(|outcome| outcome.stage == DeploymentStage::Applied)
        );
        assert_eq!(report.applied[1].values_rewritten, 1);
        assert_eq!(executor.committed.len(), 2);
        assert_eq!(executor.rollbacks, 1);

        fs::remove_dir_all(dir).expect("temp dump dir should be removed");
    }

    #[test]
    fn connection_failure_is_not_an_execution_failure() {
        let dir = build_temp_dump_dir(&[("datamart_a.db.sql", GOOD_DUMP)]);
        let mut executor = RecordingExecutor {
            drop_connection: true,
            ..RecordingExecutor::default()
        };
        let command = DeployDumpsCommand {
            dump_paths: dump_paths(&dir, &["datamart_a.db.sql"]),
            failure_policy: FailurePolicy::Continue,
        };

        let error = DeployDumpsUseCase
            .execute(command, &mut executor)
            .halted
            .expect("lost connection should end the run");

        assert!(matches!(error, DeployError::Connection(_)));
        assert_eq!(error.exit_code(), 3);

        fs::remove_dir_all(dir).expect("temp dump dir should be removed");
    }

    #[test]
    fn missing_dump_file_is_reported_before_any_transaction() {
        let mut executor = RecordingExecutor::default();
        let command = DeployDumpsCommand {
            dump_paths: vec![PathBuf::from("/nonexistent/datamart_x.db.sql")],
            failure_policy: FailurePolicy::Abort,
        };

        let error = DeployDumpsUseCase
            .execute(command, &mut executor)
            .halted
            .expect("missing file should fail");

        assert!(matches!(error, DeployError::Io { .. }));
        assert!(executor.attempted.is_empty());
    }
}
