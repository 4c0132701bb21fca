use std::sync::Once;

use anyhow::{anyhow, Result};
use tracing_subscriber::EnvFilter;

static LOGGING_INIT: Once = Once::new();

/// Install the global stderr subscriber; `RUST_LOG` overrides the `warn` default.
///
/// Only the first call does anything.
pub fn init_logging(json: bool) -> Result<()> {
    let mut init_result = Ok(());

    LOGGING_INIT.call_once(|| {
        let builder = tracing_subscriber::fmt()
            .with_env_filter(default_env_filter())
            .with_writer(std::io::stderr);
        let installed = if json {
            builder.json().try_init()
        } else {
            builder.try_init()
        };
        init_result = installed.map_err(|e| anyhow!("failed to initialize logging: {}", e));
    });

    init_result
}

fn default_env_filter() -> EnvFilter {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::new("warn"),
    }
}

#[cfg(test)]
mod tests {
    use super::init_logging;

    #[test]
    fn init_logging_is_idempotent() {
        assert!(init_logging(false).is_ok());
        assert!(init_logging(true).is_ok());
    }
}
