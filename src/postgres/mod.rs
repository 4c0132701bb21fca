//! PostgreSQL connectivity check and database administration.
//!
//! Every operation reports its outcome as a [`PgResponse`] instead of an
//! error: callers branch on `code`, which is a SQLSTATE where one exists.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::timeout;
use tokio_postgres::{tls::NoTlsStream, Connection, Error, NoTls, Socket};
use tracing::{debug, warn};

use crate::config::Config;

pub const SUCCESS_CODE: &str = "00000";
pub const UNKNOWN_CODE: &str = "unknown";
pub const TIMEOUT_CODE: &str = "timeout";
/// SQLSTATE `invalid_name`.
pub const INVALID_NAME_CODE: &str = "42602";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PgResponse {
    pub code: String,
    pub message: String,
}

impl PgResponse {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            code: SUCCESS_CODE.to_string(),
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.code == SUCCESS_CODE
    }

    fn from_error(error: &Error) -> Self {
        match error.as_db_error() {
            Some(db_error) => Self {
                code: db_error.code().code().to_string(),
                message: db_error.message().to_string(),
            },
            None => Self {
                code: UNKNOWN_CODE.to_string(),
                message: error.to_string(),
            },
        }
    }

    fn timed_out(limit: Duration) -> Self {
        Self {
            code: TIMEOUT_CODE.to_string(),
            message: format!("no response from server within {}s", limit.as_secs_f32()),
        }
    }

    fn invalid_name(name: &str) -> Self {
        Self {
            code: INVALID_NAME_CODE.to_string(),
            message: format!("invalid database name {:?}", name),
        }
    }
}

/// Runs admin statements against a server, one connection per call.
#[derive(Debug, Clone, Default)]
pub struct PgAdmin {
    timeout: Option<Duration>,
}

impl PgAdmin {
    pub fn from_config(cfg: &Config) -> Self {
        Self {
            timeout: cfg.pg_timeout(),
        }
    }

    pub fn with_timeout(timeout: Option<Duration>) -> Self {
        Self { timeout }
    }

    pub async fn test_url(&self, url: &str) -> PgResponse {
        self.execute(url, "SELECT 1", || "Success".to_string()).await
    }

    pub async fn create_database(&self, url: &str, database: &str) -> PgResponse {
        if !is_valid_name(database) {
            return PgResponse::invalid_name(database);
        }
        let statement = format!("CREATE DATABASE {}", quote_ident(database));
        self.execute(url, &statement, || {
            format!("Successfully created database '{}'", database)
        })
        .await
    }

    pub async fn rename_database(
        &self,
        url: &str,
        database: &str,
        new_database_name: &str,
    ) -> PgResponse {
        for name in [database, new_database_name] {
            if !is_valid_name(name) {
                return PgResponse::invalid_name(name);
            }
        }
        let statement = format!(
            "ALTER DATABASE {} RENAME TO {}",
            quote_ident(database),
            quote_ident(new_database_name)
        );
        self.execute(url, &statement, || {
            format!("Database {} renamed to {}", database, new_database_name)
        })
        .await
    }

    async fn execute(
        &self,
        url: &str,
        statement: &str,
        on_success: impl FnOnce() -> String,
    ) -> PgResponse {
        debug!(statement, "running postgres statement");
        let work = run_statement(url, statement);
        let outcome = match self.timeout {
            Some(limit) => match timeout(limit, work).await {
                Ok(outcome) => outcome,
                Err(_) => return PgResponse::timed_out(limit),
            },
            None => work.await,
        };
        match outcome {
            Ok(()) => PgResponse::success(on_success()),
            Err(error) => {
                let response = PgResponse::from_error(&error);
                debug!(
                    code = %response.code,
                    message = %response.message,
                    "postgres statement failed"
                );
                response
            }
        }
    }
}

pub async fn test_postgres_url(url: &str) -> PgResponse {
    PgAdmin::from_config(&Config::load()).test_url(url).await
}

pub async fn create_database(url: &str, database: &str) -> PgResponse {
    PgAdmin::from_config(&Config::load())
        .create_database(url, database)
        .await
}

pub async fn rename_database(url: &str, database: &str, new_database_name: &str) -> PgResponse {
    PgAdmin::from_config(&Config::load())
        .rename_database(url, database, new_database_name)
        .await
}

// Connect, run one statement, then close: the client is dropped and the
// driver task awaited on every path that gets past the connect.
async fn run_statement(url: &str, statement: &str) -> Result<(), Error> {
    let (client, connection) = tokio_postgres::connect(url, NoTls).await?;
    let driver = tokio::spawn(drive_connection(connection));

    let outcome = client.batch_execute(statement).await;

    drop(client);
    if let Err(e) = driver.await {
        warn!(error = %e, "postgres connection task failed");
    }
    outcome
}

async fn drive_connection(connection: Connection<Socket, NoTlsStream>) {
    if let Err(error) = connection.await {
        let message = error
            .as_db_error()
            .map(|db| db.message().to_string())
            .unwrap_or_else(|| error.to_string());
        warn!(%message, "postgres connection error");
    }
}

fn is_valid_name(name: &str) -> bool {
    !name.is_empty() && !name.contains('\0')
}

/// Quote as a delimited identifier, doubling embedded quotes.
fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
