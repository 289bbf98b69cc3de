// Converter configuration, read once at startup.

use regex::{Captures, Regex};
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_PATH: &str = "/var/th2/config/converter-config.yml";
pub const DEFAULT_CONVERTED_SUFFIX: &str = "-converted";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Cannot read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid config: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("Environment variable '{0}' referenced in config is not set")]
    MissingEnv(String),
    #[error("Invalid placeholder pattern: {0}")]
    Pattern(#[from] regex::Error),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConverterConfig {
    pub repository: RepositoryConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryConfig {
    /// Directory holding one sub-directory per schema.
    pub root: PathBuf,
    #[serde(default = "default_converted_suffix")]
    pub converted_suffix: String,
}

fn default_converted_suffix() -> String {
    DEFAULT_CONVERTED_SUFFIX.to_string()
}

impl ConverterConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_yaml(&text, |name| std::env::var(name).ok())?;
        tracing::info!(path = %path.display(), root = %config.repository.root.display(), "loaded configuration");
        Ok(config)
    }

    pub fn from_yaml(
        text: &str,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let text = substitute_env(text, lookup)?;
        Ok(serde_yaml::from_str(&text)?)
    }
}

/// Replaces `${VAR}` with the looked up value. Any unset variable fails the load.
fn substitute_env(text: &str, lookup: impl Fn(&str) -> Option<String>) -> Result<String, ConfigError> {
    let pattern = Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}")?;

    let mut missing = None;
    let out = pattern.replace_all(text, |caps: &Captures| match lookup(&caps[1]) {
        Some(value) => value,
        None => {
            missing.get_or_insert_with(|| caps[1].to_string());
            String::new()
        }
    });
    match missing {
        Some(name) => Err(ConfigError::MissingEnv(name)),
        None => Ok(out.into_owned()),
    }
}
