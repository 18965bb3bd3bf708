//! File configuration for `fakeua` defaults.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use fakeua_core::Settings;

/// Flat `key = value` file configuration. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileConfig {
    /// Dataset cache location.
    pub data_path: Option<PathBuf>,
    /// Per-request HTTP timeout in seconds.
    pub http_timeout_secs: Option<u64>,
    /// Attempts per fetch, including the first.
    pub http_retries: Option<u64>,
    /// Delay between fetch attempts in milliseconds.
    pub http_delay_ms: Option<u64>,
    /// Delay between scrape requests in milliseconds.
    pub request_delay_ms: Option<u64>,
    /// Whether TLS certificates are checked.
    pub verify_tls: Option<bool>,
    /// Whether the cache server is tried when scraping fails.
    pub use_remote_fallback: Option<bool>,
    /// Remote pre-built dataset URL.
    pub cache_server: Option<String>,
}

impl FileConfig {
    /// Validates values against the ranges the CLI accepts.
    pub fn validate(&self) -> Result<()> {
        validate_range("http_timeout_secs", self.http_timeout_secs, 1, 3600)?;
        validate_range("http_retries", self.http_retries, 1, 10)?;
        validate_range("http_delay_ms", self.http_delay_ms, 0, 60_000)?;
        validate_range("request_delay_ms", self.request_delay_ms, 0, 60_000)?;

        if let Some(server) = &self.cache_server
            && url::Url::parse(server).is_err()
        {
            bail!("Invalid config value for `cache_server`: {server}. Expected an absolute URL");
        }
        Ok(())
    }

    /// Applies the configured values on top of `settings`.
    pub fn apply(&self, settings: &mut Settings) {
        if let Some(path) = &self.data_path {
            settings.data_path.clone_from(path);
        }
        if let Some(secs) = self.http_timeout_secs {
            settings.http_timeout = Duration::from_secs(secs);
        }
        if let Some(retries) = self.http_retries.and_then(|n| u32::try_from(n).ok()) {
            settings.http_retries = retries;
        }
        if let Some(ms) = self.http_delay_ms {
            settings.http_delay = Duration::from_millis(ms);
        }
        if let Some(ms) = self.request_delay_ms {
            settings.request_delay = Duration::from_millis(ms);
        }
        if let Some(server) = &self.cache_server {
            settings.cache_server.clone_from(server);
        }
    }
}

fn validate_range(field: &str, value: Option<u64>, min: u64, max: u64) -> Result<()> {
    let Some(value) = value else {
        return Ok(());
    };
    if !(min..=max).contains(&value) {
        bail!("Invalid config value for `{field}`: {value}. Expected range: {min}..={max}");
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

impl LoadedConfig {
    /// The parsed config, or an empty one when no file was found.
    #[must_use]
    pub fn file_config(&self) -> FileConfig {
        self.config.clone().unwrap_or_default()
    }
}

/// Resolves the default config path.
///
/// Priority:
/// 1. `$XDG_CONFIG_HOME/fakeua/config.toml`
/// 2. `$HOME/.config/fakeua/config.toml`
#[must_use]
pub fn resolve_default_config_path() -> Option<PathBuf> {
    if let Some(xdg_config_home) = env_var_non_empty_os("XDG_CONFIG_HOME") {
        return Some(
            PathBuf::from(xdg_config_home)
                .join("fakeua")
                .join("config.toml"),
        );
    }

    let home = env_var_non_empty_os("HOME")?;
    Some(
        PathBuf::from(home)
            .join(".config")
            .join("fakeua")
            .join("config.toml"),
    )
}

fn env_var_non_empty_os(name: &str) -> Option<std::ffi::OsString> {
    let value = env::var_os(name)?;
    if value.is_empty() { None } else { Some(value) }
}

/// Loads config from the default path if present.
pub fn load_default_file_config() -> Result<LoadedConfig> {
    let path = resolve_default_config_path();
    let config = match path.as_deref() {
        Some(path_ref) if path_ref.exists() => Some(load_file_config(path_ref)?),
        _ => None,
    };
    Ok(LoadedConfig { path, config })
}

fn load_file_config(path: &Path) -> Result<FileConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    parse_config_str(&content)
        .with_context(|| format!("Failed to parse config file {}", path.display()))
}

pub(crate) fn parse_config_str(content: &str) -> Result<FileConfig> {
    let mut cfg = FileConfig::default();

    for (line_index, raw_line) in content.lines().enumerate() {
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
            "data_path" => {
                let parsed = parse_string_literal(value)
                    .with_context(|| format!("Invalid `data_path` value on line {line_no}"))?;
                cfg.data_path = Some(PathBuf::from(parsed));
            }
            "cache_server" => {
                let parsed = parse_string_literal(value)
                    .with_context(|| format!("Invalid `cache_server` value on line {line_no}"))?;
                cfg.cache_server = Some(parsed);
            }
            "http_timeout_secs" | "http_retries" | "http_delay_ms" | "request_delay_ms" => {
                let parsed = parse_integer_u64(value)
                    .with_context(|| format!("Invalid `{key}` value on line {line_no}"))?;
                let slot = match key {
                    "http_timeout_secs" => &mut cfg.http_timeout_secs,
                    "http_retries" => &mut cfg.http_retries,
                    "http_delay_ms" => &mut cfg.http_delay_ms,
                    _ => &mut cfg.request_delay_ms,
                };
                *slot = Some(parsed);
            }
            "verify_tls" => {
                let parsed = parse_boolean(value)
                    .with_context(|| format!("Invalid `verify_tls` value on line {line_no}"))?;
                cfg.verify_tls = Some(parsed);
            }
            "use_remote_fallback" => {
                let parsed = parse_boolean(value).with_context(|| {
                    format!("Invalid `use_remote_fallback` value on line {line_no}")
                })?;
                cfg.use_remote_fallback = Some(parsed);
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

fn parse_boolean(raw_value: &str) -> Result<bool> {
    match raw_value.trim() {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => bail!("Expected 'true' or 'false'"),
    }
}
