// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Configuration is loaded from the environment at startup. Command-line
//! flags, when given, take precedence over the variables below.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `API_URL` | Base URL of the dispatch API | Required |
//! | `DATA_DIR` | Directory holding the token file | `.despacho` |
//! | `READ_RETRIES` | Extra attempts for failed read queries | `1` |
//! | `HTTP_TIMEOUT_SECS` | Per-request timeout | `15` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `warn` |

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use url::Url;

use crate::storage::paths::DATA_ROOT;

pub const API_URL_ENV: &str = "API_URL";
pub const DATA_DIR_ENV: &str = "DATA_DIR";
pub const READ_RETRIES_ENV: &str = "READ_RETRIES";
pub const HTTP_TIMEOUT_ENV: &str = "HTTP_TIMEOUT_SECS";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

pub const DEFAULT_READ_RETRIES: u32 = 1;
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 15;

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            _ => Err(ConfigError::Invalid {
                var: LOG_FORMAT_ENV,
                value: s.to_string(),
            }),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} is required")]
    Missing(&'static str),
    #[error("{var} is not a valid URL ({value}): {source}")]
    InvalidUrl {
        var: &'static str,
        value: String,
        source: url::ParseError,
    },
    #[error("{var} has an invalid value: {value}")]
    Invalid { var: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: Url,
    pub data_dir: PathBuf,
    pub read_retries: u32,
    pub http_timeout: Duration,
    pub log_format: LogFormat,
}

impl Config {
    /// Load from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup (environment, CLI overrides, tests).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let raw_url = get(API_URL_ENV).ok_or(ConfigError::Missing(API_URL_ENV))?;
        let api_url = Url::parse(raw_url.trim()).map_err(|source| ConfigError::InvalidUrl {
            var: API_URL_ENV,
            value: raw_url.clone(),
            source,
        })?;
        if !matches!(api_url.scheme(), "http" | "https") {
            return Err(ConfigError::Invalid {
                var: API_URL_ENV,
                value: raw_url,
            });
        }

        let data_dir = get(DATA_DIR_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DATA_ROOT));

        let read_retries = parse_or(get(READ_RETRIES_ENV), READ_RETRIES_ENV, DEFAULT_READ_RETRIES)?;
        let timeout_secs = parse_or(get(HTTP_TIMEOUT_ENV), HTTP_TIMEOUT_ENV, DEFAULT_HTTP_TIMEOUT_SECS)?;

        let log_format = match get(LOG_FORMAT_ENV) {
            Some(v) => v.parse()?,
            None => LogFormat::default(),
        };

        Ok(Self {
            api_url,
            data_dir,
            read_retries,
            http_timeout: Duration::from_secs(timeout_secs),
            log_format,
        })
    }
}

fn parse_or<T: FromStr>(value: Option<String>, var: &'static str, default: T) -> Result<T, ConfigError> {
    match value {
        Some(v) => v.trim().parse().map_err(|_| ConfigError::Invalid { var, value: v }),
        None => Ok(default),
    }
}
