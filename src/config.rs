// Configuration module for laridx
// Reads from environment variables with sensible defaults

use std::env;
use std::sync::OnceLock;

/// Global configuration instance
static CONFIG: OnceLock<Config> = OnceLock::new();

pub const DEFAULT_MAX_FILE_BYTES: u64 = 2 * 1024 * 1024;
pub const DEFAULT_EXCLUDE_DIRS: &[&str] = &["vendor", "node_modules", "storage", ".git", ".idea"];

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Files larger than this are skipped (LARIDX_MAX_FILE_BYTES)
    pub max_file_bytes: u64,

    /// Directory names skipped by the project-wide walk (LARIDX_EXCLUDE_DIRS)
    pub exclude_dirs: Vec<String>,

    /// Parse flat JSON translation files strictly (LARIDX_STRICT_JSON)
    pub strict_json: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_file_bytes: DEFAULT_MAX_FILE_BYTES,
            exclude_dirs: DEFAULT_EXCLUDE_DIRS.iter().map(|s| s.to_string()).collect(),
            strict_json: false,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Config::default();

        if let Some(val) = lookup("LARIDX_MAX_FILE_BYTES") {
            match val.trim().parse() {
                Ok(parsed) => config.max_file_bytes = parsed,
                Err(_) => tracing::warn!(
                    "invalid LARIDX_MAX_FILE_BYTES value: {}, using default: {}",
                    val,
                    config.max_file_bytes
                ),
            }
        }

        if let Some(val) = lookup("LARIDX_EXCLUDE_DIRS") {
            let dirs: Vec<String> = val
                .split(',')
                .map(|s| s.trim())
                .filter(|s| !s.is_empty())
                .map(|s| s.to_string())
                .collect();
            config.exclude_dirs = dirs;
        }

        if let Some(val) = lookup("LARIDX_STRICT_JSON") {
            match parse_bool(&val) {
                Some(parsed) => config.strict_json = parsed,
                None => tracing::warn!(
                    "invalid LARIDX_STRICT_JSON value: {}, using default: {}",
                    val,
                    config.strict_json
                ),
            }
        }

        config
    }

    /// Get the global configuration instance
    pub fn get() -> &'static Config {
        CONFIG.get_or_init(Config::from_env)
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}

/// Effective settings handed to the source tree and indexers.
#[derive(Debug, Clone)]
pub struct IndexOptions {
    pub no_ignore: bool,
    pub strict_json: bool,
    pub max_file_bytes: u64,
    pub exclude_dirs: Vec<String>,
}

impl IndexOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            no_ignore: false,
            strict_json: config.strict_json,
            max_file_bytes: config.max_file_bytes,
            exclude_dirs: config.exclude_dirs.clone(),
        }
    }

    pub fn with_no_ignore(mut self, no_ignore: bool) -> Self {
        self.no_ignore = no_ignore;
        self
    }

    /// The flag can only switch strict parsing on; the env value stays otherwise.
    pub fn with_strict_json(mut self, strict_json: bool) -> Self {
        self.strict_json = self.strict_json || strict_json;
        self
    }
}

impl Default for IndexOptions {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.max_file_bytes, 2 * 1024 * 1024);
        assert!(config.exclude_dirs.iter().any(|d| d == "vendor"));
        assert!(!config.strict_json);
    }

    #[test]
    fn env_values_override_defaults() {
        let vars: HashMap<&str, &str> = [
            ("LARIDX_MAX_FILE_BYTES", "1024"),
            ("LARIDX_EXCLUDE_DIRS", "vendor, dist ,"),
            ("LARIDX_STRICT_JSON", "yes"),
        ]
        .into_iter()
        .collect();
        let config = Config::from_lookup(|key| vars.get(key).map(|v| v.to_string()));
        assert_eq!(config.max_file_bytes, 1024);
        assert_eq!(config.exclude_dirs, vec!["vendor", "dist"]);
        assert!(config.strict_json);
    }

    #[test]
    fn invalid_values_fall_back() {
        let config = Config::from_lookup(|key| match key {
            "LARIDX_MAX_FILE_BYTES" => Some("lots".to_string()),
            "LARIDX_STRICT_JSON" => Some("maybe".to_string()),
            _ => None,
        });
        assert_eq!(config.max_file_bytes, DEFAULT_MAX_FILE_BYTES);
        assert!(!config.strict_json);
    }

    #[test]
    fn cli_flag_only_enables_strict_json() {
        let base = IndexOptions::default();
        assert!(base.clone().with_strict_json(true).strict_json);
        let mut env_strict = base;
        env_strict.strict_json = true;
        assert!(env_strict.with_strict_json(false).strict_json);
    }
}
