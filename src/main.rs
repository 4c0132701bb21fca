mod cli;

use std::{
    io::{self, Read},
    process::ExitCode,
    time::Duration,
};

use anyhow::{Context, Result};
use hostkit::{
    config::Config,
    envfile, files, kv, logging,
    postgres::{PgAdmin, PgResponse},
    script::ScriptRunner,
};
use is_terminal::IsTerminal;
use owo_colors::OwoColorize;
use serde::Serialize;
use tracing::info;

use cli::Command;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = cli::Cli::parse();

    // Load config
    let cfg = Config::load();
    logging::init_logging(args.log_json || cfg.log_json())?;

    match args.command {
        Command::PgTest { url } => {
            let response = PgAdmin::from_config(&cfg).test_url(&url).await;
            report_pg(&response)
        }
        Command::DbCreate { url, name } => {
            let response = PgAdmin::from_config(&cfg).create_database(&url, &name).await;
            report_pg(&response)
        }
        Command::DbRename { url, name, new_name } => {
            let response = PgAdmin::from_config(&cfg)
                .rename_database(&url, &name, &new_name)
                .await;
            report_pg(&response)
        }
        Command::RedisTest {
            host,
            username,
            password,
        } => {
            let status = kv::test_redis_parameters_with_timeout(
                &host,
                username.as_deref(),
                password.as_deref(),
                cfg.redis_timeout(),
            )
            .await;
            println!("{}", status);
            let ok = !kv::is_error(&status);
            status_line(ok, &format!("redis {}", host));
            Ok(exit_code(ok))
        }
        Command::Exists { path } => {
            let exists = files::file_exists(&path);
            println!("{}", exists);
            Ok(exit_code(exists))
        }
        Command::Missing { paths } => {
            let missing = files::find_nonexistent_files(&paths);
            for p in &missing {
                println!("{}", p);
            }
            Ok(exit_code(missing.is_empty()))
        }
        Command::Copy {
            source,
            destination,
            create_dest,
        } => {
            files::copy_file(&source, &destination, Some(create_dest))?;
            info!(%source, %destination, "copied");
            Ok(ExitCode::SUCCESS)
        }
        Command::EnvToJson { path } => {
            println!("{}", envfile::env_to_json_string(&path)?);
            Ok(ExitCode::SUCCESS)
        }
        Command::JsonToEnv { json, path } => {
            let json = if json == "-" {
                let mut buf = String::new();
                io::stdin()
                    .read_to_string(&mut buf)
                    .context("reading JSON from stdin")?;
                buf
            } else {
                json
            };
            envfile::json_string_to_env(&json, &path)?;
            info!(%path, "wrote env file");
            Ok(ExitCode::SUCCESS)
        }
        Command::NpmRun { script, timeout } => {
            let mut runner = ScriptRunner::from_config(&cfg);
            // CLI overrides config; 0 disables the limit
            if let Some(secs) = timeout {
                let limit = Some(secs).filter(|s| *s > 0).map(Duration::from_secs);
                runner = runner.with_timeout(limit);
            }
            let output = runner.run(&script).await?;
            print_json(&output)?;
            let ok = output.status == 0;
            status_line(ok, &format!("npm run {} exited with {}", script, output.status));
            Ok(exit_code(ok))
        }
    }
}

fn report_pg(response: &PgResponse) -> Result<ExitCode> {
    print_json(response)?;
    status_line(
        response.is_success(),
        &format!("[{}] {}", response.code, response.message),
    );
    Ok(exit_code(response.is_success()))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn status_line(ok: bool, text: &str) {
    if !io::stderr().is_terminal() {
        eprintln!("{}", text);
    } else if ok {
        eprintln!("{}", text.green());
    } else {
        eprintln!("{}", text.red());
    }
}

fn exit_code(ok: bool) -> ExitCode {
    if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
