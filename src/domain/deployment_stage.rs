use std::fmt;

/// Where a dump file is in its deployment.
///
/// `Applied` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeploymentStage {
    Pending,
    SchemaEnsured,
    Rewritten,
    Applied,
    Failed,
}

impl DeploymentStage {
    pub fn as_str(self) -> &'static str {
        match self {
            DeploymentStage::Pending => "pending",
            DeploymentStage::SchemaEnsured => "schema-ensured",
            DeploymentStage::Rewritten => "rewritten",
            DeploymentStage::Applied => "applied",
            DeploymentStage::Failed => "failed",
        }
    }
}

impl fmt::Display for DeploymentStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
