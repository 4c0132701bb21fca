use std::{
    collections::HashMap,
    env, fs,
    path::{Path, PathBuf},
    time::Duration,
};

use directories::BaseDirs;
use tracing::debug;

use crate::envfile::parse_env;

#[derive(Debug, Clone)]
pub struct Config {
    inner: HashMap<String, String>,
    pub config_path: PathBuf,
}

impl Config {
    pub fn load() -> Self {
        let config_path = default_config_path();
        let mut map = default_map();

        // Read .hostkitrc if exists
        if config_path.exists() {
            match fs::read_to_string(&config_path) {
                Ok(text) => map.extend(read_rc(&text)),
                Err(e) => {
                    debug!(
                        path = %config_path.display(),
                        error = %e,
                        "ignoring unreadable rc file"
                    );
                }
            }
        }

        // Overlay environment variables (take precedence)
        for (k, v) in env::vars() {
            if is_config_key(&k) {
                map.insert(k, v);
            }
        }

        Self { inner: map, config_path }
    }

    /// Build a config from explicit values on top of the defaults, without
    /// looking at the rc file or the process environment.
    pub fn from_map<I, K, V>(values: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut inner = default_map();
        inner.extend(values.into_iter().map(|(k, v)| (k.into(), v.into())));
        Self {
            inner,
            config_path: PathBuf::new(),
        }
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.inner.get(key).cloned()
    }

    pub fn get_u64(&self, key: &str) -> Option<u64> {
        self.get(key).and_then(|v| v.trim().parse::<u64>().ok())
    }

    pub fn get_path(&self, key: &str) -> Option<PathBuf> {
        self.get(key).filter(|v| !v.is_empty()).map(PathBuf::from)
    }

    /// Seconds value as a duration; `0` or an unparsable value means "no limit".
    pub fn get_duration_secs(&self, key: &str) -> Option<Duration> {
        self.get_u64(key)
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }

    pub fn pg_timeout(&self) -> Option<Duration> {
        self.get_duration_secs("PG_CONNECT_TIMEOUT")
    }

    pub fn redis_timeout(&self) -> Option<Duration> {
        self.get_duration_secs("REDIS_CONNECT_TIMEOUT")
    }

    pub fn npm_program(&self) -> String {
        self.get("NPM_PROGRAM")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| "npm".to_string())
    }

    pub fn npm_global_bin(&self) -> Option<PathBuf> {
        self.get_path("NPM_GLOBAL_BIN").or_else(default_npm_global_bin)
    }

    pub fn log_json(&self) -> bool {
        self.get("LOG_FORMAT")
            .map(|v| v.eq_ignore_ascii_case("json"))
            .unwrap_or(false)
    }
}

// The rc file shares the env-file syntax; config values are trimmed.
fn read_rc(text: &str) -> HashMap<String, String> {
    parse_env(text)
        .into_iter()
        .filter_map(|(k, v)| v.as_str().map(|s| (k, s.trim().to_string())))
        .collect()
}

fn is_config_key(k: &str) -> bool {
    const KEYS: &[&str] = &[
        "PG_CONNECT_TIMEOUT",
        "REDIS_CONNECT_TIMEOUT",
        "NPM_SCRIPT_TIMEOUT",
        "NPM_PROGRAM",
        "NPM_GLOBAL_BIN",
        "LOG_FORMAT",
    ];

    KEYS.contains(&k)
}

fn default_config_path() -> PathBuf {
    let base = BaseDirs::new()
        .map(|b| b.config_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("~/.config"));
    base.join("hostkit").join(".hostkitrc")
}

fn default_npm_global_bin() -> Option<PathBuf> {
    let home = BaseDirs::new().map(|b| b.home_dir().to_path_buf())?;
    Some(npm_global_bin_under(&home))
}

fn npm_global_bin_under(home: &Path) -> PathBuf {
    if cfg!(windows) {
        home.join("AppData").join("Roaming").join("npm")
    } else {
        home.join(".npm-global").join("bin")
    }
}

fn default_map() -> HashMap<String, String> {
    let mut m = HashMap::new();

    // Timeouts, seconds
    m.insert("PG_CONNECT_TIMEOUT".into(), "10".into());
    m.insert("REDIS_CONNECT_TIMEOUT".into(), "5".into());
    m.insert("NPM_SCRIPT_TIMEOUT".into(), "0".into());

    m.insert("NPM_PROGRAM".into(), "npm".into());
    m.insert("LOG_FORMAT".into(), "text".into());

    m
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_without_overrides() {
        let cfg = Config::from_map(Vec::<(String, String)>::new());
        assert_eq!(cfg.pg_timeout(), Some(Duration::from_secs(10)));
        assert_eq!(cfg.redis_timeout(), Some(Duration::from_secs(5)));
        assert_eq!(cfg.get_duration_secs("NPM_SCRIPT_TIMEOUT"), None);
        assert_eq!(cfg.npm_program(), "npm");
        assert!(!cfg.log_json());
    }

    #[test]
    fn overrides_replace_defaults() {
        let cfg = Config::from_map([
            ("PG_CONNECT_TIMEOUT", "3"),
            ("NPM_PROGRAM", "pnpm"),
            ("LOG_FORMAT", "JSON"),
        ]);
        assert_eq!(cfg.pg_timeout(), Some(Duration::from_secs(3)));
        assert_eq!(cfg.npm_program(), "pnpm");
        assert!(cfg.log_json());
    }

    #[test]
    fn rc_values_are_trimmed() {
        let rc = read_rc("# hostkit\nPG_CONNECT_TIMEOUT = 7 \n\nNPM_PROGRAM=yarn\n");
        assert_eq!(rc.get("PG_CONNECT_TIMEOUT").map(String::as_str), Some("7"));
        assert_eq!(rc.get("NPM_PROGRAM").map(String::as_str), Some("yarn"));
    }

    #[test]
    fn only_known_keys_are_taken_from_env() {
        assert!(is_config_key("NPM_SCRIPT_TIMEOUT"));
        assert!(!is_config_key("HOSTKIT_ANYTHING"));
        assert!(!is_config_key("PATH"));
    }

    #[test]
    fn npm_global_bin_is_under_home() {
        let home = Path::new("/home/u");
        let expected = if cfg!(windows) {
            home.join("AppData").join("Roaming").join("npm")
        } else {
            home.join(".npm-global").join("bin")
        };
        assert_eq!(npm_global_bin_under(home), expected);
    }
}
