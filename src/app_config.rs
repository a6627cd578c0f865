//! Application configuration loading for CLI defaults.
//!
//! The config file is a flat list of `key = value` lines at
//! `$XDG_CONFIG_HOME/librova/config.toml` (or `~/.config/librova/config.toml`).
//! Command-line flags take precedence over file values.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use librova_reader::fetch::{CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS};
use librova_reader::render::{DEFAULT_FONT_SIZE, MAX_FONT_SIZE, MIN_FONT_SIZE};
use librova_reader::storage;
use librova_reader::storage::default_config_dir;

use crate::cli::Args;

/// API base used when neither the flag nor the config file names one.
pub const DEFAULT_API_BASE: &str = "http://localhost:8080/api";

const CONFIG_FILE_NAME: &str = "config.toml";

/// File configuration; every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileConfig {
    /// Backend API base URL.
    pub api_base_url: Option<String>,
    /// Storage file for positions and the session token.
    pub storage_path: Option<PathBuf>,
    /// Asset request connect timeout in seconds.
    pub connect_timeout_secs: Option<u64>,
    /// Asset request total timeout in seconds.
    pub read_timeout_secs: Option<u64>,
    /// Initial font size in percent.
    pub font_size: Option<u16>,
}

impl FileConfig {
    /// Validates config values against runtime and CLI constraints.
    pub fn validate(&self) -> Result<()> {
        if let Some(url) = &self.api_base_url
            && !(url.starts_with("http://") || url.starts_with("https://"))
        {
            bail!("Invalid config value for `api_base_url`: {url}. Expected an http(s) URL");
        }
        validate_timeout_secs("connect_timeout_secs", self.connect_timeout_secs)?;
        validate_timeout_secs("read_timeout_secs", self.read_timeout_secs)?;
        if let Some(font_size) = self.font_size
            && !(MIN_FONT_SIZE..=MAX_FONT_SIZE).contains(&font_size)
        {
            bail!(
                "Invalid config value for `font_size`: {font_size}. Expected range: {MIN_FONT_SIZE}..={MAX_FONT_SIZE}"
            );
        }
        Ok(())
    }
}

fn validate_timeout_secs(field: &str, value: Option<u64>) -> Result<()> {
    let Some(value) = value else {
        return Ok(());
    };
    if !(1..=3600).contains(&value) {
        bail!("Invalid config value for `{field}`: {value}. Expected range: 1..=3600");
    }
    Ok(())
}

/// Loaded config metadata.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    /// Resolved config path if a base directory is known.
    pub path: Option<PathBuf>,
    /// Parsed file config when a config file exists and was valid.
    pub config: Option<FileConfig>,
}

/// Effective settings after merging flags, file and defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub api_base: String,
    pub store_path: PathBuf,
    pub connect_timeout_secs: u64,
    pub read_timeout_secs: u64,
    pub font_size: u16,
}

impl Settings {
    /// Merges CLI flags over file values over built-in defaults.
    ///
    /// `default_store` is consulted only when neither source names a store.
    pub fn resolve(
        args: &Args,
        file: Option<&FileConfig>,
        default_store: impl FnOnce() -> Result<PathBuf>,
    ) -> Result<Self> {
        let file = file.cloned().unwrap_or_default();

        let store_path = match args.store.clone().or(file.storage_path) {
            Some(path) => path,
            None => default_store()?,
        };

        Ok(Self {
            api_base: args
                .api_base
                .clone()
                .or(file.api_base_url)
                .unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            store_path,
            connect_timeout_secs: file.connect_timeout_secs.unwrap_or(CONNECT_TIMEOUT_SECS),
            read_timeout_secs: file.read_timeout_secs.unwrap_or(READ_TIMEOUT_SECS),
            font_size: file.font_size.unwrap_or(DEFAULT_FONT_SIZE),
        })
    }
}

/// Returns the default store file (`~/.config/librova/store.json`).
pub fn default_store_path() -> Result<PathBuf> {
    storage::default_store_path().context("Failed to resolve the storage location; pass --store")
}

/// Resolves default config path.
///
/// Priority:
/// 1. `$XDG_CONFIG_HOME/librova/config.toml`
/// 2. `$HOME/.config/librova/config.toml`
#[must_use]
pub fn resolve_default_config_path() -> Option<PathBuf> {
    default_config_dir().ok().map(|dir| dir.join(CONFIG_FILE_NAME))
}

/// Loads config from default path if present.
pub fn load_default_file_config() -> Result<LoadedConfig> {
    let path = resolve_default_config_path();
    let Some(path_ref) = path.as_deref() else {
        return Ok(LoadedConfig { path, config: None });
    };

    if !path_ref.exists() {
        return Ok(LoadedConfig { path, config: None });
    }

    let config = load_file_config(path_ref)?;
    Ok(LoadedConfig {
        path,
        config: Some(config),
    })
}

fn load_file_config(path: &Path) -> Result<FileConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
    parse_config_str(&raw)
        .with_context(|| format!("Failed to parse config file '{}'", path.display()))
}

fn parse_config_str(raw: &str) -> Result<FileConfig> {
    let mut cfg = FileConfig::default();
    for (line_index, raw_line) in raw.lines().enumerate() {
        let line_no = line_index + 1;
        let line = strip_inline_comment(raw_line).trim();
        if line.is_empty() {
            continue;
        }

        let Some((raw_key, raw_value)) = line.split_once('=') else {
            bail!("Invalid config syntax on line {line_no}: expected key = value");
        };

        let key = raw_key.trim();
        let value = raw_value.trim();

        match key {
            "api_base_url" => {
                let parsed = parse_string_literal(value)
                    .with_context(|| format!("Invalid `api_base_url` value on line {line_no}"))?;
                cfg.api_base_url = Some(parsed);
            }
            "storage_path" => {
                let parsed = parse_string_literal(value)
                    .with_context(|| format!("Invalid `storage_path` value on line {line_no}"))?;
                cfg.storage_path = Some(PathBuf::from(parsed));
            }
            "connect_timeout_secs" => {
                let parsed = parse_integer_u64(value).with_context(|| {
                    format!("Invalid `connect_timeout_secs` value on line {line_no}")
                })?;
                cfg.connect_timeout_secs = Some(parsed);
            }
            "read_timeout_secs" => {
                let parsed = parse_integer_u64(value)
                    .with_context(|| format!("Invalid `read_timeout_secs` value on line {line_no}"))?;
                cfg.read_timeout_secs = Some(parsed);
            }
            "font_size" => {
                let parsed = parse_integer_u64(value)
                    .with_context(|| format!("Invalid `font_size` value on line {line_no}"))?;
                let n = u16::try_from(parsed)
                    .map_err(|_| anyhow::anyhow!("font_size out of range for u16"))?;
                cfg.font_size = Some(n);
            }
            unknown => {
                bail!("Unknown configuration key: '{unknown}' on line {line_no}");
            }
        }
    }
    cfg.validate()?;
    Ok(cfg)
}

fn strip_inline_comment(line: &str) -> &str {
    let mut in_string = false;
    for (index, ch) in line.char_indices() {
        match ch {
            '"' => in_string = !in_string,
            '#' if !in_string => return &line[..index],
            _ => {}
        }
    }
    line
}

fn parse_string_literal(raw_value: &str) -> Result<String> {
    if raw_value.len() < 2 || !raw_value.starts_with('"') || !raw_value.ends_with('"') {
        bail!("Expected double-quoted string");
    }
    Ok(raw_value[1..raw_value.len() - 1].to_string())
}

fn parse_integer_u64(raw_value: &str) -> Result<u64> {
    let token = raw_value.trim();
    if token.is_empty() {
        bail!("Expected integer value");
    }
    let value = token.parse::<i128>()?;
    if value < 0 {
        bail!("Expected non-negative integer");
    }
    u64::try_from(value).map_err(|_| anyhow::anyhow!("Integer value out of range for u64"))
}
