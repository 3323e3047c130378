use native_tls::TlsConnector;
use postgres::{Client, Config, Error as PgError, config::SslMode};
use postgres_native_tls::MakeTlsConnector;
use tracing::{debug, info, warn};

use crate::{
    application::executor::DumpExecutor,
    error::{DeployError, ExecutorError},
};

/// [`DumpExecutor`] over a blocking PostgreSQL client.
///
/// Scripts go through the simple query protocol, so a whole dump runs in a
/// single round trip; transactions are plain `BEGIN`/`COMMIT`/`ROLLBACK`.
pub struct PostgresExecutor {
    client: Client,
}

impl PostgresExecutor {
    /// TLS is negotiated according to the URL's `sslmode`.
    pub fn connect(database_url: &str) -> Result<Self, DeployError> {
        let config = database_url.parse::<Config>().map_err(|error| {
            DeployError::configuration(format!("Invalid DATABASE_URL: {error}"))
        })?;

        let mut builder = TlsConnector::builder();
        if skips_certificate_verification(config.get_ssl_mode()) {
            warn!(
                "sslmode={:?}: TLS enabled but server certificate is not verified",
                config.get_ssl_mode()
            );
            builder
                .danger_accept_invalid_certs(true)
                .danger_accept_invalid_hostnames(true);
        }
        let connector = builder
            .build()
            .map_err(|error| DeployError::Connection(format!("TLS setup failed: {error}")))?;
        let client = config
            .connect(MakeTlsConnector::new(connector))
            .map_err(|error| DeployError::Connection(error.to_string()))?;
        info!("Connected to target database");
        Ok(Self { client })
    }

    fn run(&mut self, sql: &str) -> Result<(), ExecutorError> {
        self.client.batch_execute(sql).map_err(classify_error)
    }
}

impl DumpExecutor for PostgresExecutor {
    fn begin(&mut self) -> Result<(), ExecutorError> {
        debug!("BEGIN");
        self.run("BEGIN")
    }

    fn execute_batch(&mut self, sql: &str) -> Result<(), ExecutorError> {
        debug!(bytes = sql.len(), "Executing batch");
        self.run(sql)
    }

    fn commit(&mut self) -> Result<(), ExecutorError> {
        debug!("COMMIT");
        self.run("COMMIT")
    }

    fn rollback(&mut self) -> Result<(), ExecutorError> {
        debug!("ROLLBACK");
        self.run("ROLLBACK")
    }
}

/// `prefer` and `require` only ask for an encrypted channel, as libpq does;
/// they never check who is on the other end.
fn skips_certificate_verification(ssl_mode: SslMode) -> bool {
    matches!(ssl_mode, SslMode::Prefer | SslMode::Require)
}

/// Server-side errors mean the content was refused; anything else means the
/// session itself is gone.
fn classify_error(error: PgError) -> ExecutorError {
    match error.as_db_error() {
        Some(db_error) => ExecutorError::Rejected(format!(
            "{} ({})",
            db_error.message(),
            db_error.code().code()
        )),
        None => ExecutorError::Connection(error.to_string()),
    }
}
