//! Configuration management for adless.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use reqwest::Url;
use std::time::Duration;
use tracing::debug;

use crate::error::ConfigError;

const CONFIG_FILE_NAME: &str = "config.yml";
const APP_DIR_NAME: &str = "adless";

const DEFAULT_BLOCKLIST: &str =
    "https://raw.githubusercontent.com/StevenBlack/hosts/master/data/StevenBlack/hosts";
const DEFAULT_WHITELIST: &str =
    "https://raw.githubusercontent.com/anudeepND/whitelist/master/domains/whitelist.txt";
const DEFAULT_TIMEOUT: &str = "10s";

/// Parse a duration such as "10s", "2m" or "1h".
/// Requires ASCII-only input to prevent Unicode-related edge cases
pub fn parse_interval(interval: &str) -> Option<Duration> {
    if !interval.is_ascii() || interval.len() < 2 {
        return None;
    }

    let (num_part, suffix) = interval.split_at(interval.len() - 1);
    let value: u64 = num_part.parse().ok().filter(|v| *v > 0)?;

    let secs = match suffix {
        "s" => value,
        "m" => value.checked_mul(60)?,
        "h" => value.checked_mul(3600)?,
        _ => return None,
    };
    Some(Duration::from_secs(secs))
}

/// A well-formed `http://` or `https://` URL naming a host
fn is_http_url(target: &str) -> bool {
    match Url::parse(target) {
        Ok(url) => {
            matches!(url.scheme(), "http" | "https")
                && url.host_str().is_some_and(|host| !host.is_empty())
        }
        Err(_) => false,
    }
}

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Lists of domains to block
    pub blocklists: Vec<ListSource>,

    /// Lists of domains that must never be blocked
    pub whitelists: Vec<ListSource>,

    /// HTTP client settings
    pub http: HttpConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            blocklists: vec![ListSource::new(DEFAULT_BLOCKLIST)],
            whitelists: vec![ListSource::new(DEFAULT_WHITELIST)],
            http: HttpConfig::default(),
        }
    }
}

/// A remote list, identified by its URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListSource {
    pub target: String,
}

impl ListSource {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Timeout for connecting, TLS handshake and the whole request (e.g. "10s")
    pub timeout: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT.to_string(),
        }
    }
}

impl HttpConfig {
    /// Effective timeout. Falls back to the default for unparsable values,
    /// which `Config::validate` rejects anyway.
    pub fn timeout(&self) -> Duration {
        parse_interval(&self.timeout).unwrap_or(Duration::from_secs(10))
    }
}

impl Config {
    /// Load configuration from YAML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| ConfigError(format!("Failed to read config file: {:?}", path)))?;
        let config = Self::from_yaml(&content)
            .with_context(|| ConfigError(format!("Failed to parse config file: {:?}", path)))?;

        debug!("Config file loaded from {:?}", path);
        Ok(config)
    }

    /// Load configuration from the default location, or the built-in
    /// defaults when no file exists there.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            debug!("No config file at {:?}, using defaults", path);
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// Parse and validate configuration from a YAML document
    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.blocklists.is_empty() {
            return Err(ConfigError("no blocklists provided".to_string()));
        }

        for source in self.blocklists.iter().chain(&self.whitelists) {
            if !is_http_url(&source.target) {
                return Err(ConfigError(format!(
                    "List target must be an HTTP(S) URL with a host: {}",
                    source.target
                )));
            }
        }

        if parse_interval(&self.http.timeout).is_none() {
            return Err(ConfigError(format!(
                "Invalid http.timeout '{}'. Use format like '10s', '2m', '1h'",
                self.http.timeout
            )));
        }

        Ok(())
    }

    /// Save configuration to YAML file atomically
    ///
    /// Uses tempfile + rename pattern to prevent corruption on crash.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        use std::io::Write;
        use tempfile::NamedTempFile;

        let path = path.as_ref();
        let content = self.to_yaml()?;

        let parent_dir = match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(parent_dir)
            .with_context(|| format!("Failed to create config directory: {:?}", parent_dir))?;

        let mut temp_file = NamedTempFile::new_in(parent_dir)
            .context("Failed to create temporary file for config")?;

        temp_file.write_all(content.as_bytes())?;
        temp_file.as_file().sync_all()?;

        temp_file
            .persist(path)
            .with_context(|| format!("Failed to persist config file: {:?}", path))?;

        Ok(())
    }

    /// Serialize to YAML
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("Failed to serialize config")
    }

    /// Write the default configuration if no file exists yet.
    /// Returns `false` when a file was already there.
    pub fn init<P: AsRef<Path>>(path: P) -> Result<bool> {
        let path = path.as_ref();
        if path.exists() {
            debug!("Config file has already been initialized at {:?}", path);
            return Ok(false);
        }
        Self::default().save(path)?;
        Ok(true)
    }

    /// Default location of the config file.
    ///
    /// Resolution order: `ADLESS_CONFIG_PATH`, `$ADLESS_CONFIG_HOME/config.yml`,
    /// `$XDG_CONFIG_HOME/adless/config.yml`, `~/.config/adless/config.yml`.
    pub fn location() -> PathBuf {
        resolve_location(|key| env::var(key).ok().filter(|v| !v.is_empty()))
    }
}

fn resolve_location<F>(var: F) -> PathBuf
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(path) = var("ADLESS_CONFIG_PATH") {
        return PathBuf::from(path);
    }
    if let Some(home) = var("ADLESS_CONFIG_HOME") {
        return Path::new(&home).join(CONFIG_FILE_NAME);
    }
    if let Some(xdg) = var("XDG_CONFIG_HOME") {
        return Path::new(&xdg).join(APP_DIR_NAME).join(CONFIG_FILE_NAME);
    }

    // Under sudo, keep using the invoking user's config
    let home = var("SUDO_USER")
        .and_then(|user| home_dir_of(&user))
        .or_else(|| var("HOME").map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("."));

    home.join(".config").join(APP_DIR_NAME).join(CONFIG_FILE_NAME)
}

/// Look up a user's home directory in /etc/passwd.
fn home_dir_of(user: &str) -> Option<PathBuf> {
    let passwd = std::fs::read_to_string("/etc/passwd").ok()?;
    home_dir_from_passwd(&passwd, user)
}

fn home_dir_from_passwd(passwd: &str, user: &str) -> Option<PathBuf> {
    passwd
        .lines()
        .map(|line| line.split(':').collect::<Vec<_>>())
        .find(|fields| fields.len() >= 7 && fields[0] == user)
        .map(|fields| PathBuf::from(fields[5]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_parse_interval() {
        assert_eq!(parse_interval("10s"), Some(Duration::from_secs(10)));
        assert_eq!(parse_interval("2m"), Some(Duration::from_secs(120)));
        assert_eq!(parse_interval("1h"), Some(Duration::from_secs(3600)));
        assert_eq!(parse_interval("0s"), None);
        assert_eq!(parse_interval("10"), None);
        assert_eq!(parse_interval("s"), None);
        assert_eq!(parse_interval("10d"), None);
        assert_eq!(parse_interval("-5s"), None);
        assert_eq!(parse_interval("１０s"), None);
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.blocklists.len(), 1);
        assert_eq!(config.whitelists.len(), 1);
        assert_eq!(config.http.timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_from_yaml_minimal() {
        let config = Config::from_yaml("blocklists:\n- target: https://test.com").unwrap();
        assert_eq!(config.blocklists, vec![ListSource::new("https://test.com")]);
        // Omitted sections fall back to defaults
        assert_eq!(config.whitelists, Config::default().whitelists);
        assert_eq!(config.http, HttpConfig::default());
    }

    #[test]
    fn test_from_yaml_full() {
        let yaml = r#"
blocklists:
  - target: https://a.example.com/hosts
  - target: http://b.example.com/abp.txt
whitelists: []
http:
  timeout: 30s
"#;
        let config = Config::from_yaml(yaml).unwrap();
        assert_eq!(config.blocklists.len(), 2);
        assert!(config.whitelists.is_empty());
        assert_eq!(config.http.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_from_yaml_invalid() {
        assert!(Config::from_yaml("invalid yml content").is_err());
    }

    #[test]
    fn test_zero_blocklists_rejected() {
        let err = Config::from_yaml("blocklists: []\n").unwrap_err();
        assert!(err.to_string().contains("no blocklists provided"));
        assert!(err.downcast_ref::<ConfigError>().is_some());
    }

    #[test]
    fn test_non_http_target_rejected() {
        let err = Config::from_yaml("blocklists:\n- target: ftp://lists.example.com\n").unwrap_err();
        assert!(err.to_string().contains("HTTP(S) URL"));

        let err = Config::from_yaml(
            "blocklists:\n- target: https://ok.example.com\nwhitelists:\n- target: file:///etc/passwd\n",
        )
        .unwrap_err();
        assert!(err.to_string().contains("file:///etc/passwd"));
    }

    #[test]
    fn test_malformed_url_rejected() {
        for target in ["http://", "https:// not a url", "http://exa mple.com/x"] {
            let yaml = format!("blocklists:\n- target: \"{}\"\n", target);
            let err = Config::from_yaml(&yaml).unwrap_err();
            assert!(err.downcast_ref::<ConfigError>().is_some(), "accepted {:?}", target);
        }
    }

    #[test]
    fn test_http_url_check() {
        assert!(is_http_url("https://raw.githubusercontent.com/StevenBlack/hosts/master/hosts"));
        assert!(is_http_url("http://127.0.0.1:8080/list.txt"));
        assert!(!is_http_url("ftp://lists.example.com/hosts"));
        assert!(!is_http_url("lists.example.com/hosts"));
        assert!(!is_http_url(""));
    }

    #[test]
    fn test_invalid_timeout_rejected() {
        let err = Config::from_yaml(
            "blocklists:\n- target: https://ok.example.com\nhttp:\n  timeout: forever\n",
        )
        .unwrap_err();
        assert!(err.to_string().contains("http.timeout"));
    }

    #[test]
    fn test_load_missing_file_errors() {
        let temp_dir = TempDir::new().unwrap();
        let err = Config::load(temp_dir.path().join("missing.yml")).unwrap_err();
        assert!(err.downcast_ref::<ConfigError>().is_some());
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config::load_or_default(temp_dir.path().join("missing.yml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("config.yml");

        let mut config = Config::default();
        config.blocklists.push(ListSource::new("https://extra.example.com/list"));
        config.http.timeout = "5s".to_string();
        config.save(&path).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_init_does_not_overwrite() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.yml");

        assert!(Config::init(&path).unwrap());
        std::fs::write(&path, "blocklists:\n- target: https://mine.example.com\n").unwrap();
        assert!(!Config::init(&path).unwrap());

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded.blocklists, vec![ListSource::new("https://mine.example.com")]);
    }

    #[test]
    fn test_location_resolution_order() {
        let all = env_of(&[
            ("ADLESS_CONFIG_PATH", "/custom/adless.yml"),
            ("ADLESS_CONFIG_HOME", "/opt/adless"),
            ("XDG_CONFIG_HOME", "/home/u/.xdg"),
            ("HOME", "/home/u"),
        ]);
        assert_eq!(resolve_location(all), PathBuf::from("/custom/adless.yml"));

        let home = env_of(&[("ADLESS_CONFIG_HOME", "/opt/adless"), ("HOME", "/home/u")]);
        assert_eq!(resolve_location(home), PathBuf::from("/opt/adless/config.yml"));

        let xdg = env_of(&[("XDG_CONFIG_HOME", "/home/u/.xdg"), ("HOME", "/home/u")]);
        assert_eq!(resolve_location(xdg), PathBuf::from("/home/u/.xdg/adless/config.yml"));

        let plain = env_of(&[("HOME", "/home/u")]);
        assert_eq!(
            resolve_location(plain),
            PathBuf::from("/home/u/.config/adless/config.yml")
        );
    }

    #[test]
    fn test_home_dir_from_passwd() {
        let passwd = "root:x:0:0:root:/root:/bin/bash\nalice:x:1000:1000:Alice:/home/alice:/bin/zsh\n";
        assert_eq!(
            home_dir_from_passwd(passwd, "alice"),
            Some(PathBuf::from("/home/alice"))
        );
        assert_eq!(home_dir_from_passwd(passwd, "bob"), None);
    }
}
