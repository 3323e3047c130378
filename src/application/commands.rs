use std::{fmt, path::PathBuf};

use crate::{
    domain::{deployment_stage::DeploymentStage, namespace::Namespace},
    error::DeployError,
};

/// What happens to the rest of the run after one file fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    #[default]
    Abort,
    Continue,
}

impl FailurePolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            FailurePolicy::Abort => "abort",
            FailurePolicy::Continue => "continue",
        }
    }
}

impl fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug)]
pub struct DeployDumpsCommand {
    pub dump_paths: Vec<PathBuf>,
    pub failure_policy: FailurePolicy,
}

#[derive(Debug)]
pub struct PreviewDumpsCommand {
    pub dump_paths: Vec<PathBuf>,
    pub output_dir: PathBuf,
}

#[derive(Debug, Clone)]
pub struct FileOutcome {
    pub path: PathBuf,
    pub namespace: Namespace,
    pub stage: DeploymentStage,
    pub values_rewritten: usize,
    pub error: Option<String>,
}

/// Everything a deployment run did, including the files committed before an
/// abort.
#[derive(Debug, Default)]
pub struct DeploymentReport {
    pub applied: Vec<FileOutcome>,
    pub failed: Vec<FileOutcome>,
    /// Set when the run stopped before reaching every file.
    pub halted: Option<DeployError>,
}

impl DeploymentReport {
    pub fn total(&self) -> usize {
        self.applied.len() + self.failed.len()
    }
}

#[derive(Debug)]
pub struct PreviewDumpsResult {
    pub written_paths: Vec<PathBuf>,
}
