use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use writeup_markdown_engine::{DEFAULT_SUMMARY_LENGTH, Policy, Preset};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {config_path}: {source}")]
    ConfigReadError {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {config_path}: {source}")]
    ConfigParseError {
        config_path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Unknown policy '{0}': not a preset and not defined under [policies]")]
    UnknownPolicy(String),
}

/// Pipeline defaults and named transformation policies.
///
/// ```toml
/// summary_length = 200
/// link_base = "https://github.com/org/ctf-2024/blob/main/"
///
/// [policies.teaser]
/// clip = ["h1", "fence", "blockquote"]
/// strip_links = true
/// compress = true
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub summary_length: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link_base: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_base: Option<String>,
    pub policies: BTreeMap<String, Policy>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            summary_length: DEFAULT_SUMMARY_LENGTH,
            link_base: None,
            image_base: None,
            policies: BTreeMap::new(),
        }
    }
}

impl Config {
    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Option<Self>, ConfigError> {
        let config_path = config_path.as_ref();
        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(config_path).map_err(|source| {
            ConfigError::ConfigReadError {
                config_path: config_path.to_path_buf(),
                source,
            }
        })?;

        let config: Config =
            toml::from_str(&content).map_err(|source| ConfigError::ConfigParseError {
                config_path: config_path.to_path_buf(),
                source,
            })?;

        Ok(Some(config))
    }

    pub fn load() -> Result<Option<Self>, ConfigError> {
        let config_path = Self::config_path();
        Self::load_from_path(&config_path)
    }

    pub fn config_path() -> PathBuf {
        let config_dir = shellexpand::tilde("~/.config/writeup-markdown");
        PathBuf::from(config_dir.as_ref()).join("config.toml")
    }

    /// Resolves a policy by name.
    ///
    /// Policies defined under `[policies]` shadow the `full` and `summary`
    /// presets. Configured base URLs fill in bases the policy leaves unset.
    pub fn policy(&self, name: &str) -> Result<Policy, ConfigError> {
        let policy = match self.policies.get(name) {
            Some(policy) => policy.clone(),
            None => name
                .parse::<Preset>()
                .map(Policy::from)
                .map_err(|_| ConfigError::UnknownPolicy(name.to_string()))?,
        };
        Ok(self.with_bases(policy))
    }

    fn with_bases(&self, mut policy: Policy) -> Policy {
        if policy.link_base.is_none() {
            policy.link_base = self.link_base.clone();
        }
        if policy.image_base.is_none() {
            policy.image_base = self.image_base.clone();
        }
        policy
    }
}
