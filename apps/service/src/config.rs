use std::{env, fmt, fs, io, net::SocketAddr, path, time::Duration};

use hostwatch::PoolConfig;
use serde::{Deserialize, Serialize};

use crate::dns::DEFAULT_DNS_ENDPOINT;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to read config file {path}: {source}")]
    ReadFailed { path: path::PathBuf, source: io::Error },
    #[error("failed to write config file {path}: {source}")]
    WriteFailed { path: path::PathBuf, source: io::Error },
    #[error("failed to parse config file: {0}")]
    ParseFailed(#[from] toml::de::Error),
    #[error("failed to serialize config: {0}")]
    SerializeFailed(#[from] toml::ser::Error),
    #[error("no config directory available, set XDG_CONFIG_HOME or HOME")]
    ConfigPathUnavailable,
    #[error("invalid monitoring settings: {0}")]
    Invalid(#[from] hostwatch::ConfigError),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Hosts monitored from boot, `"<host> down"` seeds a host as down
    pub hosts: Vec<String>,
    pub monitor: Monitor,
    pub store: Store,
    pub admin: Admin,
    pub hub: Hub,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Monitor {
    pub interval_seconds: u64,
    pub fail_limit: u32,
    pub timeout_seconds: u64,
    pub channel_capacity: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Store {
    /// LibSQL file holding monitored hosts and their statuses
    pub path: Option<path::PathBuf>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Admin {
    /// Address of the HTTP admin endpoint, disabled when unset
    pub listen: Option<SocketAddr>,
    pub dns_preflight: bool,
    pub dns_endpoint: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Hub {
    pub url: Option<String>,
    pub topic_prefix: String,
}

impl Default for Monitor {
    fn default() -> Self {
        let pool = PoolConfig::default();
        Self {
            interval_seconds: pool.interval.as_secs(),
            fail_limit: pool.fail_limit,
            timeout_seconds: pool.timeout.as_secs(),
            channel_capacity: pool.channel_capacity,
        }
    }
}

impl Default for Hub {
    fn default() -> Self {
        Self { url: None, topic_prefix: "hostwatch".into() }
    }
}

impl Admin {
    fn with_defaults(mut self) -> Self {
        if self.dns_endpoint.is_empty() {
            self.dns_endpoint = DEFAULT_DNS_ENDPOINT.into();
        }
        self
    }
}

/// Used to ensure we are actually reading a toml file
fn normalize_toml_path(path: &path::Path) -> path::PathBuf {
    let mut path = path.to_path_buf();
    if path.extension().map(|ext| ext != "toml").unwrap_or(true) {
        path.set_extension("toml");
    }
    path
}

/// Get default config path ($XDG_CONFIG_HOME/hostwatch/config.toml or
/// $HOME/.config/...)
fn default_config_path() -> Result<path::PathBuf, Error> {
    let path = if let Ok(config_home) = env::var("XDG_CONFIG_HOME") {
        path::PathBuf::from(config_home)
    } else if let Some(home_dir) = env::home_dir() {
        home_dir.join(".config")
    } else {
        return Err(Error::ConfigPathUnavailable);
    };

    Ok(path.join("hostwatch/config.toml"))
}

fn display_or<T: fmt::Display>(value: &Option<T>, fallback: &str) -> String {
    value.as_ref().map(ToString::to_string).unwrap_or_else(|| fallback.to_string())
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let write_indented = |level: usize| {
            move |f: &mut fmt::Formatter<'_>, label: &str, value: &dyn fmt::Display| {
                writeln!(f, "  {:indent$}{}: {}", "", label, value, indent = level * 2)
            }
        };
        let write_title_indented = |level: usize| {
            move |f: &mut fmt::Formatter<'_>, label: &str| {
                writeln!(f, "{:indent$}{}", "", label, indent = level * 2)
            }
        };

        let write_title_1 = write_title_indented(1);
        let write_1 = write_indented(1);

        writeln!(f, "Current Internal Configuration State:")?;
        write_title_1(f, "Monitor")?;
        write_1(f, "Interval (s)", &self.monitor.interval_seconds)?;
        write_1(f, "Fail Limit", &self.monitor.fail_limit)?;
        write_1(f, "Timeout (s)", &self.monitor.timeout_seconds)?;
        write_1(f, "Channel Capacity", &self.monitor.channel_capacity)?;
        write_1(f, "Static Hosts", &self.hosts.len())?;

        write_title_1(f, "Store")?;
        write_1(f, "Path", &display_or(&self.store.path.as_ref().map(|p| p.display()), "disabled"))?;

        write_title_1(f, "Admin")?;
        write_1(f, "Listen", &display_or(&self.admin.listen, "disabled"))?;
        write_1(f, "DNS Preflight", &self.admin.dns_preflight)?;
        write_1(f, "DNS Endpoint", &self.admin.dns_endpoint)?;

        write_title_1(f, "Hub")?;
        write_1(f, "URL", &display_or(&self.hub.url, "disabled"))?;
        write_1(f, "Topic Prefix", &self.hub.topic_prefix)?;

        Ok(())
    }
}

impl Config {
    /// Generate Config structure from file
    ///
    /// Creates a default config in ~/.config/hostwatch/config.toml
    ///  or the specified path, with the name config.toml if one does not exist
    pub fn from_config(optional_path: Option<impl AsRef<path::Path>>) -> Result<Self, Error> {
        let config_path: path::PathBuf = if let Some(path) = optional_path {
            normalize_toml_path(path.as_ref())
        } else {
            default_config_path()?
        };

        let config = if config_path.exists() {
            let raw_string = fs::read_to_string(&config_path)
                .map_err(|source| Error::ReadFailed { path: config_path.clone(), source })?;
            toml::from_str::<Self>(raw_string.as_str())?
        } else {
            let config = Self::default();
            config.write_config(&config_path)?;
            config
        };

        Ok(config.with_defaults())
    }

    fn with_defaults(mut self) -> Self {
        self.admin = self.admin.with_defaults();
        self
    }

    /// Serialize and write a config to a file
    pub fn write_config(&self, path: &path::Path) -> Result<(), Error> {
        let config_str: String = toml::to_string_pretty(&self.clone().with_defaults())?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|source| Error::WriteFailed { path: path.to_path_buf(), source })?;
        }

        fs::write(path, config_str)
            .map_err(|source| Error::WriteFailed { path: path.to_path_buf(), source })
    }

    /// Monitoring parameters for the pool, validated
    pub fn to_pool_config(&self) -> Result<PoolConfig, Error> {
        let pool = PoolConfig {
            interval: Duration::from_secs(self.monitor.interval_seconds),
            fail_limit: self.monitor.fail_limit,
            timeout: Duration::from_secs(self.monitor.timeout_seconds),
            channel_capacity: self.monitor.channel_capacity,
        };
        pool.validate()?;
        Ok(pool)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_writes_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/config.toml");

        let config = Config::from_config(Some(&path)).unwrap();
        assert!(path.exists());
        assert_eq!(config.monitor.fail_limit, 6);
        assert_eq!(config.admin.dns_endpoint, DEFAULT_DNS_ENDPOINT);

        let reread = Config::from_config(Some(&path)).unwrap();
        assert_eq!(reread.monitor.interval_seconds, 10);
        assert_eq!(reread.hub.topic_prefix, "hostwatch");
    }

    #[test]
    fn test_extension_is_normalized() {
        assert_eq!(normalize_toml_path(path::Path::new("/tmp/cfg")), path::PathBuf::from("/tmp/cfg.toml"));
        assert_eq!(
            normalize_toml_path(path::Path::new("/tmp/cfg.toml")),
            path::PathBuf::from("/tmp/cfg.toml")
        );
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
hosts = ["example.com", "db:5432 down"]

[monitor]
fail_limit = 3

[admin]
listen = "127.0.0.1:8080"
"#,
        )
        .unwrap();

        let config = Config::from_config(Some(&path)).unwrap();
        assert_eq!(config.hosts, vec!["example.com", "db:5432 down"]);
        assert_eq!(config.monitor.fail_limit, 3);
        assert_eq!(config.monitor.timeout_seconds, 5);
        assert_eq!(config.admin.listen, Some("127.0.0.1:8080".parse().unwrap()));
        assert!(!config.admin.dns_preflight);
    }

    #[test]
    fn test_pool_config_validation() {
        let mut config = Config::default();
        let pool = config.to_pool_config().unwrap();
        assert_eq!(pool.interval, Duration::from_secs(10));

        config.monitor.timeout_seconds = 10;
        assert!(matches!(config.to_pool_config(), Err(Error::Invalid(_))));
    }

    #[test]
    fn test_garbage_file_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "monitor = 12").unwrap();
        assert!(matches!(Config::from_config(Some(&path)), Err(Error::ParseFailed(_))));
    }
}
