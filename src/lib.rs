//! Small host utilities: PostgreSQL and Redis checks, file helpers,
//! env-file/JSON conversion and an npm script runner.
//!
//! Every operation stands alone; none keeps state between calls.

pub mod config;
pub mod envfile;
pub mod files;
pub mod kv;
pub mod logging;
pub mod postgres;
pub mod script;

pub use envfile::{env_to_json_string, json_string_to_env, parse_env, EnvError};
pub use files::{copy_file, file_exists, find_nonexistent_files, FileError};
pub use kv::test_redis_parameters;
pub use postgres::{create_database, rename_database, test_postgres_url, PgAdmin, PgResponse};
pub use script::{run_npm_script, ProcessOutput, ScriptError, ScriptRunner};
