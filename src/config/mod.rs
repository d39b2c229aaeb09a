//! Configuration management for threadcast.
//!
//! Configuration is read from `~/.config/threadcast/config.toml` at
//! startup. If the file doesn't exist, a default configuration with
//! comments is created. Missing fields fall back to defaults; the
//! `[destinations.*]` table is the only part with no useful default.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io::Write;
use std::path::PathBuf;

use serde::Deserialize;
use thiserror::Error;

use crate::fetcher::SourceEndpoints;
use crate::sink::webhook::WebhookDestination;

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub daemon: DaemonSection,
    pub source: SourceSection,
    pub destinations: BTreeMap<String, DestinationSection>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DaemonSection {
    /// Poll interval string like "60s", "5m", "1h".
    pub poll_interval: String,
    /// Run a synchronization pass immediately on daemon start.
    pub tick_on_start: bool,
}

impl Default for DaemonSection {
    fn default() -> Self {
        Self {
            poll_interval: "60s".to_string(),
            tick_on_start: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SourceSection {
    pub api_base: String,
    pub boards_base: String,
    pub media_base: String,
    pub timeout_secs: u64,
}

impl Default for SourceSection {
    fn default() -> Self {
        let endpoints = SourceEndpoints::default();
        Self {
            api_base: endpoints.api_base,
            boards_base: endpoints.boards_base,
            media_base: endpoints.media_base,
            timeout_secs: 15,
        }
    }
}

impl SourceSection {
    pub fn endpoints(&self) -> SourceEndpoints {
        SourceEndpoints {
            api_base: self.api_base.clone(),
            boards_base: self.boards_base.clone(),
            media_base: self.media_base.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DestinationSection {
    pub webhook_url: String,
    #[serde(default = "default_embed")]
    pub embed_default: bool,
    #[serde(default = "default_accent")]
    pub accent_color: String,
}

fn default_embed() -> bool {
    true
}

fn default_accent() -> String {
    "#8E9297".to_string()
}

impl Config {
    /// Load configuration from the default path.
    ///
    /// If the config file doesn't exist, creates a default one with
    /// comments. Missing fields in the file use default values.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::default_config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
            return Ok(Self::default());
        }

        Self::load_from(&config_path)
    }

    pub fn load_from(path: &PathBuf) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.clone(),
            source: e,
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.clone(),
            source: e,
        })?;

        Ok(config)
    }

    /// Get the default config file path: `~/.config/threadcast/config.toml`
    pub fn default_config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("threadcast").join("config.toml"))
    }

    /// Create a default config file with comments.
    fn create_default_config(path: &PathBuf) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let default_config = Self::default_config_content();

        let mut file = fs::File::create(path).map_err(|e| ConfigError::Io {
            path: path.clone(),
            source: e,
        })?;

        file.write_all(default_config.as_bytes())
            .map_err(|e| ConfigError::Io {
                path: path.clone(),
                source: e,
            })?;

        Ok(())
    }

    fn default_config_content() -> String {
        r##"# threadcast configuration
#
# Feeds are managed with the CLI (threadcast add/remove/...); this file
# holds the runtime settings and delivery destinations.

[daemon]
# How often the background daemon polls watched threads.
poll_interval = "60s"
# Run a synchronization pass immediately when the daemon starts.
tick_on_start = true

[source]
# 4chan-compatible API endpoints. Point these at a mirror if needed.
api_base = "https://a.4cdn.org"
boards_base = "https://boards.4chan.org"
media_base = "https://i.4cdn.org"
timeout_secs = 15

# One [destinations.<id>] section per delivery target. The id is what
# the CLI's --destination flag refers to.
#
# [destinations.mychannel]
# webhook_url = "https://discord.com/api/webhooks/..."
# embed_default = true
# accent_color = "#8E9297"
"##
        .to_string()
    }

    /// Destinations resolved into sink form, with accent colors parsed.
    pub fn webhook_destinations(
        &self,
    ) -> Result<HashMap<String, WebhookDestination>, ConfigError> {
        let mut destinations = HashMap::new();
        for (id, section) in &self.destinations {
            let accent_color = parse_color(&section.accent_color)
                .ok_or_else(|| ConfigError::InvalidColor(section.accent_color.clone()))?;
            destinations.insert(
                id.clone(),
                WebhookDestination {
                    webhook_url: section.webhook_url.clone(),
                    embed_default: section.embed_default,
                    accent_color,
                },
            );
        }
        Ok(destinations)
    }

    /// Resolve the destination a command operates on: an explicit id
    /// must exist; with none given, the sole configured destination is
    /// used.
    pub fn resolve_destination(&self, requested: Option<&str>) -> Result<String, ConfigError> {
        match requested {
            Some(id) => {
                if self.destinations.contains_key(id) {
                    Ok(id.to_string())
                } else {
                    Err(ConfigError::UnknownDestination(id.to_string()))
                }
            }
            None => {
                let mut ids = self.destinations.keys();
                match (ids.next(), ids.next()) {
                    (Some(only), None) => Ok(only.clone()),
                    (None, _) => Err(ConfigError::NoDestinations),
                    (Some(_), Some(_)) => Err(ConfigError::AmbiguousDestination),
                }
            }
        }
    }
}

/// Parse `#RRGGBB` or `#RGB` (leading `#` optional) into 0xRRGGBB.
pub fn parse_color(s: &str) -> Option<u32> {
    let hex = s.trim().strip_prefix('#').unwrap_or(s.trim());

    match hex.len() {
        6 => u32::from_str_radix(hex, 16).ok(),
        3 => {
            let expanded: String = hex.chars().flat_map(|c| [c, c]).collect();
            u32::from_str_radix(&expanded, 16).ok()
        }
        _ => None,
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid accent color '{0}' (use #RRGGBB)")]
    InvalidColor(String),

    #[error("Unknown destination '{0}'")]
    UnknownDestination(String),

    #[error("No destinations configured; add a [destinations.<id>] section")]
    NoDestinations,

    #[error("Multiple destinations configured; pass --destination")]
    AmbiguousDestination,
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r##"
[daemon]
poll_interval = "5m"

[source]
timeout_secs = 10

[destinations.main]
webhook_url = "https://discord.com/api/webhooks/1/abc"

[destinations.backup]
webhook_url = "https://discord.com/api/webhooks/2/def"
embed_default = false
accent_color = "#00FF00"
"##;

    #[test]
    fn test_parse_sample_config() {
        let config: Config = toml::from_str(SAMPLE).unwrap();
        assert_eq!(config.daemon.poll_interval, "5m");
        assert!(config.daemon.tick_on_start);
        assert_eq!(config.source.timeout_secs, 10);
        // Unset source fields keep their defaults.
        assert_eq!(config.source.api_base, "https://a.4cdn.org");
        assert_eq!(config.destinations.len(), 2);
        assert!(!config.destinations["backup"].embed_default);
    }

    #[test]
    fn test_webhook_destinations_parses_colors() {
        let config: Config = toml::from_str(SAMPLE).unwrap();
        let destinations = config.webhook_destinations().unwrap();
        assert_eq!(destinations["backup"].accent_color, 0x00FF00);
        assert_eq!(destinations["main"].accent_color, 0x8E9297);
    }

    #[test]
    fn test_resolve_destination_explicit() {
        let config: Config = toml::from_str(SAMPLE).unwrap();
        assert_eq!(config.resolve_destination(Some("main")).unwrap(), "main");
        assert!(config.resolve_destination(Some("missing")).is_err());
    }

    #[test]
    fn test_resolve_destination_ambiguous_without_flag() {
        let config: Config = toml::from_str(SAMPLE).unwrap();
        assert!(matches!(
            config.resolve_destination(None),
            Err(ConfigError::AmbiguousDestination)
        ));
    }

    #[test]
    fn test_resolve_sole_destination() {
        let config: Config = toml::from_str(
            r#"
[destinations.only]
webhook_url = "https://discord.com/api/webhooks/1/abc"
"#,
        )
        .unwrap();
        assert_eq!(config.resolve_destination(None).unwrap(), "only");
    }

    #[test]
    fn test_parse_color_forms() {
        assert_eq!(parse_color("#FF0000"), Some(0xFF0000));
        assert_eq!(parse_color("00ff00"), Some(0x00FF00));
        assert_eq!(parse_color("#abc"), Some(0xAABBCC));
        assert_eq!(parse_color("#12345"), None);
        assert_eq!(parse_color("notacolor"), None);
    }

    #[test]
    fn test_default_config_content_is_valid_toml() {
        let config: Config = toml::from_str(&Config::default_config_content()).unwrap();
        assert_eq!(config.daemon.poll_interval, "60s");
        assert!(config.destinations.is_empty());
    }
}
