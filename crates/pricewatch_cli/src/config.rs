//! Loading and validating the app list.
//!
//! The file is JSON of the form `{"apps": {"<name>": "<url>", ...}}`. Key
//! order in the file is the order apps are checked in.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use pricewatch_engine::AppEntry;
use pricewatch_logging::{scrape_info, scrape_warn};
use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;
use url::Url;

pub const DEFAULT_CONFIG_PATH: &str = "apps_config.json";
pub const EXAMPLE_CONFIG_PATH: &str = "apps_config.example.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(
        "configuration file not found: {}\nCopy '{example}' to '{default}' and edit it.",
        .path.display(),
        example = EXAMPLE_CONFIG_PATH,
        default = DEFAULT_CONFIG_PATH
    )]
    NotFound { path: PathBuf },
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid JSON in {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid URL for {name}: value is not a string")]
    NotAString { name: String },
    #[error("invalid URL for {name}: {url}")]
    InvalidUrl { name: String, url: String },
}

#[derive(Debug, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    apps: Option<Map<String, Value>>,
}

pub fn load_apps(path: &Path) -> Result<Vec<AppEntry>, ConfigError> {
    let text = fs::read_to_string(path).map_err(|source| {
        if source.kind() == io::ErrorKind::NotFound {
            ConfigError::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            ConfigError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;

    let apps = parse_apps(&text).map_err(|err| match err {
        ParseFailure::Json(source) => ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        },
        ParseFailure::Invalid(err) => err,
    })?;
    scrape_info!("Loaded {} apps from {:?}", apps.len(), path);
    Ok(apps)
}

#[derive(Debug)]
enum ParseFailure {
    Json(serde_json::Error),
    Invalid(ConfigError),
}

fn parse_apps(text: &str) -> Result<Vec<AppEntry>, ParseFailure> {
    let file: ConfigFile = serde_json::from_str(text).map_err(ParseFailure::Json)?;
    let apps = file.apps.unwrap_or_default();
    if apps.is_empty() {
        scrape_warn!("Configuration file lists no apps");
    }

    apps.into_iter()
        .map(|(name, value)| validate_entry(name, value).map_err(ParseFailure::Invalid))
        .collect()
}

fn validate_entry(name: String, value: Value) -> Result<AppEntry, ConfigError> {
    let Value::String(url) = value else {
        return Err(ConfigError::NotAString { name });
    };
    if !url.starts_with("http") || !is_http_url(&url) {
        return Err(ConfigError::InvalidUrl { name, url });
    }
    Ok(AppEntry::new(name, url))
}

fn is_http_url(raw: &str) -> bool {
    Url::parse(raw)
        .map(|url| matches!(url.scheme(), "http" | "https") && url.has_host())
        .unwrap_or(false)
}
