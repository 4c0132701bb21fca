//! Redis connection-parameter check.
//!
//! Unlike the postgres helpers this reports a bare string: the server's reply
//! to `PING` on success, or an `error: ...` description.

use std::time::Duration;

use redis::IntoConnectionInfo;
use tokio::time::timeout;
use tracing::debug;

use crate::config::Config;

pub const ERROR_PREFIX: &str = "error: ";

pub async fn test_redis_parameters(
    host: &str,
    username: Option<&str>,
    password: Option<&str>,
) -> String {
    let limit = Config::load().redis_timeout();
    test_redis_parameters_with_timeout(host, username, password, limit).await
}

pub async fn test_redis_parameters_with_timeout(
    host: &str,
    username: Option<&str>,
    password: Option<&str>,
    limit: Option<Duration>,
) -> String {
    let work = ping(host, username, password);
    let outcome = match limit {
        Some(limit) => match timeout(limit, work).await {
            Ok(outcome) => outcome,
            Err(_) => Err(format!(
                "no response from {} within {}s",
                host,
                limit.as_secs_f32()
            )),
        },
        None => work.await,
    };
    match outcome {
        Ok(reply) => reply,
        Err(e) => {
            debug!(host, error = %e, "redis check failed");
            format!("{ERROR_PREFIX}{e}")
        }
    }
}

/// True when a status string from [`test_redis_parameters`] reports a failure.
pub fn is_error(status: &str) -> bool {
    status.starts_with(ERROR_PREFIX)
}

async fn ping(
    host: &str,
    username: Option<&str>,
    password: Option<&str>,
) -> Result<String, String> {
    let host = host.trim();
    if host.is_empty() {
        return Err("host is empty".to_string());
    }
    // AUTH is only sent with a password; a lone username would be ignored.
    if username.is_some() && password.is_none() {
        return Err("username requires a password".to_string());
    }
    let mut info = format!("redis://{}/", host)
        .into_connection_info()
        .map_err(|e| e.to_string())?;
    // Set after parsing so credentials never need URL escaping.
    info.redis.username = username.map(str::to_string);
    info.redis.password = password.map(str::to_string);

    let client = redis::Client::open(info).map_err(|e| e.to_string())?;
    let mut conn = client
        .get_multiplexed_async_connection()
        .await
        .map_err(|e| e.to_string())?;
    let reply: String = redis::cmd("PING")
        .query_async(&mut conn)
        .await
        .map_err(|e| e.to_string())?;
    Ok(reply)
}
