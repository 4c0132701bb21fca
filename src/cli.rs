use clap::{Parser, Subcommand};

#[derive(Parser, Debug, Clone)]
#[command(name = "hostkit", about = "Database, Redis, file and npm helpers", version)]
pub struct Cli {
    /// Emit logs as JSON (overrides LOG_FORMAT).
    #[arg(long = "log-json", global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Check that a PostgreSQL connection string works.
    #[command(name = "pg-test")]
    PgTest {
        #[arg(value_name = "URL")]
        url: String,
    },

    /// Create a database through an existing connection.
    #[command(name = "db-create")]
    DbCreate {
        #[arg(value_name = "URL")]
        url: String,
        #[arg(value_name = "NAME")]
        name: String,
    },

    /// Rename a database.
    #[command(name = "db-rename")]
    DbRename {
        #[arg(value_name = "URL")]
        url: String,
        #[arg(value_name = "NAME")]
        name: String,
        #[arg(value_name = "NEW_NAME")]
        new_name: String,
    },

    /// PING a Redis server with optional credentials.
    #[command(name = "redis-test")]
    RedisTest {
        /// host or host:port
        #[arg(value_name = "HOST")]
        host: String,
        #[arg(long)]
        username: Option<String>,
        #[arg(long)]
        password: Option<String>,
    },

    /// Report whether a regular file exists.
    Exists {
        #[arg(value_name = "PATH")]
        path: String,
    },

    /// Print the given paths that do not exist, in order.
    Missing {
        #[arg(value_name = "PATH", required = true)]
        paths: Vec<String>,
    },

    /// Copy a file.
    Copy {
        #[arg(value_name = "SOURCE")]
        source: String,
        #[arg(value_name = "DESTINATION")]
        destination: String,
        /// Create the destination directory if it is missing.
        #[arg(long = "create-dest")]
        create_dest: bool,
    },

    /// Print an env file as a JSON object.
    #[command(name = "env-to-json")]
    EnvToJson {
        #[arg(value_name = "ENV_FILE")]
        path: String,
    },

    /// Write a JSON object (use "-" for stdin) to an env file.
    #[command(name = "json-to-env")]
    JsonToEnv {
        #[arg(value_name = "JSON")]
        json: String,
        #[arg(value_name = "ENV_FILE")]
        path: String,
    },

    /// Run `npm run <SCRIPT>` and report status and output.
    #[command(name = "npm-run")]
    NpmRun {
        #[arg(value_name = "SCRIPT")]
        script: String,
        /// Give up after this many seconds (0 waits forever).
        #[arg(long, value_parser = clap::value_parser!(u64))]
        timeout: Option<u64>,
    },
}

impl Cli {
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }
}
