use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::api::DEFAULT_API_URL;
use crate::cli::Cli;
use crate::error::{Error, Result};
use crate::summary::SUMMARY_FORMAT;

#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub api_url: Option<String>,
    pub summary_format: Option<String>,
    pub session_dir: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub api_url: String,
    pub summary_format: String,
    pub session_dir: Option<String>,
}

impl Config {
    /// Load the config file and merge CLI overrides on top (CLI wins).
    /// An explicitly passed `--config` path must exist; the default
    /// path is optional.
    pub fn load(cli: &Cli) -> Result<Self> {
        let file_config = match cli.config {
            Some(ref path) => {
                let path = Path::new(path);
                if !path.exists() {
                    return Err(Error::ConfigNotFound(path.to_path_buf()));
                }
                parse_config(&std::fs::read_to_string(path)?)?
            }
            None => {
                let path = default_config_path();
                if path.exists() {
                    parse_config(&std::fs::read_to_string(&path)?)?
                } else {
                    ConfigFile::default()
                }
            }
        };

        Ok(merge(file_config, cli))
    }
}

/// Default config path: `$HOME/.config/standup/config.toml`.
pub fn default_config_path() -> PathBuf {
    match std::env::var_os("HOME") {
        Some(home) => Path::new(&home)
            .join(".config")
            .join("standup")
            .join("config.toml"),
        None => PathBuf::from(".standup").join("config.toml"),
    }
}

pub fn parse_config(content: &str) -> Result<ConfigFile> {
    let config: ConfigFile = toml::from_str(content)?;
    validate(&config)?;
    Ok(config)
}

fn validate(config: &ConfigFile) -> Result<()> {
    if let Some(ref api_url) = config.api_url
        && !api_url.starts_with("http://")
        && !api_url.starts_with("https://")
    {
        return Err(Error::ConfigValidation(format!(
            "api_url must start with http:// or https:// (got: {api_url})"
        )));
    }
    if let Some(ref format) = config.summary_format
        && format.trim().is_empty()
    {
        return Err(Error::ConfigValidation(
            "summary_format must not be empty".to_string(),
        ));
    }
    Ok(())
}

pub fn merge(file: ConfigFile, cli: &Cli) -> Config {
    Config {
        api_url: cli
            .api_url
            .clone()
            .or(file.api_url)
            .unwrap_or_else(|| DEFAULT_API_URL.to_string()),
        summary_format: file
            .summary_format
            .unwrap_or_else(|| SUMMARY_FORMAT.to_string()),
        session_dir: file.session_dir,
    }
}
