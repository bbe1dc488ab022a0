use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::info;

pub mod defaults;
pub mod duration_serde;

use defaults::*;
use duration_serde::duration;

use crate::errors::{AppError, AppResult};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub probe: ProbeConfig,
    #[serde(default)]
    pub playlist: PlaylistConfig,
    #[serde(default)]
    pub playback: PlaybackConfig,
    /// Named playlist URLs that can be loaded by name
    #[serde(default)]
    pub categories: Vec<PlaylistCategory>,
}

/// Reachability probing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeConfig {
    /// Time allowed for a single channel's check
    #[serde(default = "default_probe_timeout", with = "duration")]
    pub timeout: Duration,
    /// Probes allowed in flight at once; 0 dispatches every channel at once
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,
    /// Publish a registry snapshot after this many available channels
    #[serde(default = "default_publish_every")]
    pub publish_every: usize,
    #[serde(default)]
    pub method: ProbeMethod,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

/// HTTP method used for reachability checks
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProbeMethod {
    /// Plain request; only the response head is awaited
    #[default]
    Get,
    Head,
}

/// Playlist acquisition configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaylistConfig {
    #[serde(default = "default_fetch_timeout", with = "duration")]
    pub fetch_timeout: Duration,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

/// External player configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaybackConfig {
    #[serde(default = "default_player_command")]
    pub command: String,
    /// Extra arguments placed before the stream URL
    #[serde(default)]
    pub args: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistCategory {
    pub name: String,
    pub url: String,
}

fn default_probe_timeout() -> Duration {
    DEFAULT_PROBE_TIMEOUT
}
fn default_max_concurrent() -> usize {
    DEFAULT_MAX_CONCURRENT_PROBES
}
fn default_publish_every() -> usize {
    DEFAULT_PUBLISH_EVERY
}
fn default_fetch_timeout() -> Duration {
    DEFAULT_FETCH_TIMEOUT
}
fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}
fn default_player_command() -> String {
    DEFAULT_PLAYER_COMMAND.to_string()
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            timeout: default_probe_timeout(),
            max_concurrent: default_max_concurrent(),
            publish_every: default_publish_every(),
            method: ProbeMethod::default(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for PlaylistConfig {
    fn default() -> Self {
        Self {
            fetch_timeout: default_fetch_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            command: default_player_command(),
            args: Vec::new(),
        }
    }
}

impl ProbeConfig {
    /// Validate probe settings
    pub fn validate(&self) -> AppResult<()> {
        if self.timeout.is_zero() {
            return Err(AppError::configuration("probe.timeout must be greater than zero"));
        }
        if self.publish_every == 0 {
            return Err(AppError::configuration(
                "probe.publish_every must be greater than zero",
            ));
        }
        Ok(())
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_file =
            std::env::var(CONFIG_FILE_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
        Self::load_from_file(&config_file)
    }

    pub fn load_from_file(config_file: &str) -> Result<Self> {
        let config = if Path::new(config_file).exists() {
            let contents = std::fs::read_to_string(config_file)?;
            let config: Config = toml::from_str(&contents)?;
            info!("Configuration loaded from: {}", config_file);
            config
        } else {
            info!("No config file at {}, using defaults", config_file);
            Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> AppResult<()> {
        self.probe.validate()?;
        for category in &self.categories {
            if category.name.trim().is_empty() || category.url.trim().is_empty() {
                return Err(AppError::configuration(
                    "categories entries need both a name and a url",
                ));
            }
        }
        Ok(())
    }

    /// Find a configured category by name, ignoring case
    pub fn category(&self, name: &str) -> Option<&PlaylistCategory> {
        self.categories
            .iter()
            .find(|category| category.name.eq_ignore_ascii_case(name.trim()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.probe.timeout, Duration::from_secs(30));
        assert_eq!(config.probe.publish_every, 5);
        assert_eq!(config.probe.method, ProbeMethod::Get);
        assert_eq!(config.playback.command, "mpv");
        assert!(config.categories.is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_falls_back_to_defaults() {
        let config: Config = toml::from_str(
            r#"
            [probe]
            timeout = "5s"
            max_concurrent = 0
            method = "head"

            [[categories]]
            name = "News"
            url = "http://example.com/news.m3u"
            "#,
        )
        .unwrap();

        assert_eq!(config.probe.timeout, Duration::from_secs(5));
        assert_eq!(config.probe.max_concurrent, 0);
        assert_eq!(config.probe.method, ProbeMethod::Head);
        assert_eq!(config.probe.publish_every, 5);
        assert_eq!(config.playlist.fetch_timeout, Duration::from_secs(30));
        assert_eq!(
            config.category("news").map(|c| c.url.as_str()),
            Some("http://example.com/news.m3u")
        );
        assert!(config.category("sport").is_none());
    }

    #[test]
    fn test_validation_rejects_zero_publish_interval() {
        let mut config = Config::default();
        config.probe.publish_every = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.probe.timeout = Duration::ZERO;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[playback]\ncommand = \"vlc\"\nargs = [\"--fullscreen\"]").unwrap();

        let config = Config::load_from_file(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.playback.command, "vlc");
        assert_eq!(config.playback.args, vec!["--fullscreen"]);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        let config = Config::load_from_file(path.to_str().unwrap()).unwrap();
        assert_eq!(config.probe.max_concurrent, 64);
        assert!(!path.exists());
    }
}
