use crate::error::ExecutorError;

/// A connection that can run SQL scripts inside explicit transactions.
///
/// The deployment use case owns the transaction boundaries: one `begin`
/// per dump file, closed by exactly one `commit` or `rollback`.
pub trait DumpExecutor {
    fn begin(&mut self) -> Result<(), ExecutorError>;

    /// Runs one or more `;`-separated statements.
    fn execute_batch(&mut self, sql: &str) -> Result<(), ExecutorError>;

    fn commit(&mut self) -> Result<(), ExecutorError>;

    fn rollback(&mut self) -> Result<(), ExecutorError>;
}
