//! Loading the TOML run configuration.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, info};

use cdr_model::AppConfig;

/// Looked up in the working directory when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "cdr.toml";

/// Parses and validates one configuration document.
pub fn parse_config(text: &str) -> Result<AppConfig> {
    let config: AppConfig = toml::from_str(text).context("parse configuration")?;
    config.validate()?;
    Ok(config)
}

/// Loads `path`, or `./cdr.toml` when present, or the built-in defaults.
///
/// An explicit path that does not exist is an error.
pub fn load_config(path: Option<&Path>) -> Result<(AppConfig, Option<PathBuf>)> {
    let source = match path {
        Some(path) => Some(path.to_path_buf()),
        None => {
            let fallback = PathBuf::from(DEFAULT_CONFIG_FILE);
            fallback.is_file().then_some(fallback)
        }
    };
    let Some(source) = source else {
        debug!("no configuration file; using defaults");
        return Ok((AppConfig::default(), None));
    };
    let text = fs::read_to_string(&source)
        .with_context(|| format!("read configuration {}", source.display()))?;
    let config =
        parse_config(&text).with_context(|| format!("load configuration {}", source.display()))?;
    info!(path = %source.display(), "loaded configuration");
    Ok((config, Some(source)))
}

/// The effective configuration as TOML.
pub fn render_config(config: &AppConfig) -> Result<String> {
    toml::to_string_pretty(config).context("serialize configuration")
}
