//! `KEY=VALUE` env files <-> flat JSON objects.

use std::{
    fs,
    io::{self, BufWriter, Write},
    path::{Path, PathBuf},
};

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum EnvError {
    #[error("failed to read {}: {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to write {}: {source}", .path.display())]
    Write { path: PathBuf, source: io::Error },
    #[error("failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("JSON document is not an object")]
    NotAnObject,
    #[error("invalid env key {0:?}")]
    InvalidKey(String),
    #[error("unsupported value for {key}: {reason}")]
    UnsupportedValue { key: String, reason: &'static str },
}

/// Parse env-file text into an ordered map.
///
/// Keys keep the order they were first seen in; a repeated key overwrites the
/// earlier value in place. Values are everything after the first `=`, untouched.
pub fn parse_env(text: &str) -> Map<String, Value> {
    let mut map = Map::new();
    for (idx, line) in text.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            debug!(line = idx + 1, "skipping env line without '='");
            continue;
        };
        let key = key.trim();
        if key.is_empty() {
            debug!(line = idx + 1, "skipping env line with empty key");
            continue;
        }
        map.insert(key.to_string(), Value::String(value.to_string()));
    }
    map
}

/// Read an env file and return it as a compact JSON object string.
pub fn env_to_json_string(env_path: impl AsRef<Path>) -> Result<String, EnvError> {
    let path = env_path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| EnvError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let map = parse_env(&text);
    debug!(path = %path.display(), keys = map.len(), "parsed env file");
    Ok(serde_json::to_string(&map)?)
}

/// Write a flat JSON object to `env_path` as `KEY=VALUE` lines, replacing the file.
///
/// Strings are written as-is, numbers and booleans as their JSON text and
/// `null` as an empty value. Arrays, objects and anything that would not read
/// back as the same pair are rejected before the file is touched.
pub fn json_string_to_env(json_str: &str, env_path: impl AsRef<Path>) -> Result<(), EnvError> {
    let path = env_path.as_ref();
    let data: Value = serde_json::from_str(json_str)?;
    let obj = data.as_object().ok_or(EnvError::NotAnObject)?;

    let mut lines = Vec::with_capacity(obj.len());
    for (key, value) in obj {
        // Surrounding spaces are trimmed and a leading '#' makes a comment on read-back.
        if key.is_empty()
            || key.trim() != key
            || key.starts_with('#')
            || key.contains(['=', '\n', '\r'])
        {
            return Err(EnvError::InvalidKey(key.clone()));
        }
        lines.push((key.as_str(), env_value(key, value)?));
    }

    let write_err = |source| EnvError::Write {
        path: path.to_path_buf(),
        source,
    };
    let file = fs::File::create(path).map_err(write_err)?;
    let mut out = BufWriter::new(file);
    for (key, value) in &lines {
        writeln!(out, "{}={}", key, value).map_err(write_err)?;
    }
    out.flush().map_err(write_err)?;
    debug!(path = %path.display(), keys = lines.len(), "wrote env file");
    Ok(())
}

fn env_value(key: &str, value: &Value) -> Result<String, EnvError> {
    let text = match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        Value::Array(_) | Value::Object(_) => {
            return Err(EnvError::UnsupportedValue {
                key: key.to_string(),
                reason: "nested arrays and objects have no env representation",
            })
        }
    };
    if text.contains(['\n', '\r']) {
        return Err(EnvError::UnsupportedValue {
            key: key.to_string(),
            reason: "values cannot span lines",
        });
    }
    Ok(text)
}
