//! Package-manager script runner.

use std::{
    env,
    ffi::OsString,
    io,
    path::PathBuf,
    process::Stdio,
    time::Duration,
};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::{process::Command, time::timeout};
use tracing::debug;

use crate::config::Config;

/// Exit status and full captured output of a finished script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessOutput {
    /// Exit code, or -1 when the process was killed by a signal.
    pub status: i32,
    pub stdout: String,
    pub stderr: String,
}

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("failed to spawn {program}: {source}")]
    Spawn { program: String, source: io::Error },
    #[error("failed waiting for {program}: {source}")]
    Wait { program: String, source: io::Error },
    #[error("script {script:?} did not finish within {}s", .limit.as_secs_f32())]
    Timeout { script: String, limit: Duration },
}

#[derive(Debug, Clone)]
pub struct ScriptRunner {
    program: String,
    global_bin: Option<PathBuf>,
    timeout: Option<Duration>,
}

impl ScriptRunner {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            global_bin: None,
            timeout: None,
        }
    }

    pub fn from_config(cfg: &Config) -> Self {
        Self {
            program: cfg.npm_program(),
            global_bin: cfg.npm_global_bin(),
            timeout: cfg.get_duration_secs("NPM_SCRIPT_TIMEOUT"),
        }
    }

    /// `None` waits for the process to exit however long it takes.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Extra directory appended to the child's `PATH`.
    pub fn with_global_bin(mut self, dir: Option<PathBuf>) -> Self {
        self.global_bin = dir;
        self
    }

    /// Run `<program> run <script>` and capture everything it prints.
    ///
    /// A non-zero exit is still `Ok`; output is returned verbatim, trailing
    /// newlines included.
    pub async fn run(&self, script: &str) -> Result<ProcessOutput, ScriptError> {
        let mut cmd = self.command(script);
        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(path) = self.child_path() {
            cmd.env("PATH", path);
        }

        debug!(program = %self.program, script, "spawning script");
        let child = cmd.spawn().map_err(|source| ScriptError::Spawn {
            program: self.program.clone(),
            source,
        })?;

        let waited = match self.timeout {
            // Dropping the child on expiry kills it.
            Some(limit) => timeout(limit, child.wait_with_output())
                .await
                .map_err(|_| ScriptError::Timeout {
                    script: script.to_string(),
                    limit,
                })?,
            None => child.wait_with_output().await,
        };
        let out = waited.map_err(|source| ScriptError::Wait {
            program: self.program.clone(),
            source,
        })?;

        let status = out.status.code().unwrap_or(-1);
        debug!(script, status, "script finished");
        Ok(ProcessOutput {
            status,
            stdout: String::from_utf8_lossy(&out.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&out.stderr).into_owned(),
        })
    }

    fn command(&self, script: &str) -> Command {
        if cfg!(windows) {
            // npm is a .cmd shim on Windows and needs the command interpreter
            let mut cmd = Command::new("cmd");
            cmd.args(["/C", self.program.as_str(), "run", script]);
            cmd
        } else {
            let mut cmd = Command::new(&self.program);
            cmd.arg("run").arg(script);
            cmd
        }
    }

    fn child_path(&self) -> Option<OsString> {
        let dir = self.global_bin.as_ref()?;
        let current = env::var_os("PATH").unwrap_or_default();
        let mut dirs: Vec<PathBuf> = env::split_paths(&current).collect();
        dirs.push(dir.clone());
        match env::join_paths(dirs) {
            Ok(path) => Some(path),
            Err(e) => {
                debug!(dir = %dir.display(), error = %e, "not adding directory to PATH");
                None
            }
        }
    }
}

/// Run an npm script with the runner described by the loaded config.
pub async fn run_npm_script(script: &str) -> Result<ProcessOutput, ScriptError> {
    ScriptRunner::from_config(&Config::load()).run(script).await
}
