//! Error types for dump deployment.

use std::path::PathBuf;

use thiserror::Error;

use crate::domain::deployment_stage::DeploymentStage;

const EXIT_CONFIGURATION: u8 = 1;
const EXIT_EXECUTION: u8 = 2;
const EXIT_CONNECTION: u8 = 3;

/// Failure reported by a [`crate::application::executor::DumpExecutor`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExecutorError {
    /// The server refused a statement
    #[error("statement rejected: {0}")]
    Rejected(String),

    /// The session or transport broke down
    #[error("connection failure: {0}")]
    Connection(String),
}

/// Main error type of a deployment run.
#[derive(Error, Debug)]
pub enum DeployError {
    /// Missing connection string, no dump files found, bad option values
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The target rejected a statement; the file's transaction was rolled back
    #[error("Failed to apply {} (stage: {stage}): {message}", file.display())]
    Execution {
        file: PathBuf,
        stage: DeploymentStage,
        message: String,
    },

    /// Some files failed while running with `--on-error continue`
    #[error("{failed} of {total} dump files failed to deploy")]
    Incomplete { failed: usize, total: usize },

    /// Could not reach the target, or lost it mid-run
    #[error("Connection error: {0}")]
    Connection(String),

    /// Reading a dump or writing a preview failed
    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl DeployError {
    pub fn configuration(message: impl Into<String>) -> Self {
        DeployError::Configuration(message.into())
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        DeployError::Io {
            path: path.into(),
            source,
        }
    }

    /// Process exit code, so operators can tell content failures (2) from
    /// infrastructure failures (3).
    pub fn exit_code(&self) -> u8 {
        match self {
            DeployError::Configuration(_) | DeployError::Io { .. } => EXIT_CONFIGURATION,
            DeployError::Execution { .. } | DeployError::Incomplete { .. } => EXIT_EXECUTION,
            DeployError::Connection(_) => EXIT_CONNECTION,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use crate::domain::deployment_stage::DeploymentStage;

    use super::DeployError;

    #[test]
    fn exit_codes_separate_content_from_infrastructure_failures() {
        let execution = DeployError::Execution {
            file: PathBuf::from("datamart_ventas.db.sql"),
            stage: DeploymentStage::Rewritten,
            message: "syntax error".to_string(),
        };

        assert_eq!(DeployError::configuration("DATABASE_URL is not set").exit_code(), 1);
        assert_eq!(execution.exit_code(), 2);
        assert_eq!(DeployError::Connection("refused".to_string()).exit_code(), 3);
        assert_eq!(
            execution.to_string(),
            "Failed to apply datamart_ventas.db.sql (stage: rewritten): syntax error"
        );
    }
}
