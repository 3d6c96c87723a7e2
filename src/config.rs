use std::path::{Path, PathBuf};

use reqwest::Url;
use serde::Deserialize;
use thiserror::Error;

use crate::notify::{DEFAULT_TITLE, Delivery};
use crate::report::DEFAULT_REPORT_PATH;

/// Config file looked up in the working directory when `--config` is not given.
pub const CONFIG_FILE: &str = "reportbot.toml";

/// Environment variables checked for each setting, first match wins. The
/// second name of each pair is what older CI jobs export.
const WEBHOOK_VARS: [&str; 2] = ["WEBHOOK_URL", "FEISHU_WEBHOOK_URL"];
const REPORT_BASE_VARS: [&str; 2] = ["REPORT_BASE_URL", "GITHUB_PAGES_URL"];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no webhook configured: set WEBHOOK_URL or notify.webhook_url in reportbot.toml")]
    MissingWebhook,

    #[error("invalid {key} {value:?}: {reason}")]
    InvalidUrl {
        key: &'static str,
        value: String,
        reason: String,
    },

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub report: ReportConfig,
    #[serde(default)]
    pub notify: NotifyConfig,
}

/// Where to find the generated report.
#[derive(Debug, Default, Deserialize)]
pub struct ReportConfig {
    /// Path of the HTML report. Defaults to `reports/aomaker-report.html`.
    pub path: Option<PathBuf>,
}

/// Chat-bot delivery settings.
#[derive(Debug, Default, Deserialize)]
pub struct NotifyConfig {
    pub webhook_url: Option<String>,
    /// Public root the reports are published under, e.g. a GitHub Pages site.
    pub report_base_url: Option<String>,
    /// Card title. Example: "🎯 Nightly API tests"
    pub title: Option<String>,
}

/// Source of environment variables, swappable in tests.
pub trait EnvSource {
    fn var(&self, key: &str) -> Option<String>;
}

/// The process environment.
pub struct SystemEnv;

impl EnvSource for SystemEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

impl Config {
    /// Load `reportbot.toml` from `dir`, falling back to defaults if absent.
    pub fn load(dir: &Path) -> Result<Self, ConfigError> {
        let path = dir.join(CONFIG_FILE);
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load_from(&path)
    }

    /// Load an explicitly named config file, which must exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Let non-empty environment variables override file values.
    pub fn with_env(mut self, env: &dyn EnvSource) -> Self {
        if let Some(url) = first_var(env, &WEBHOOK_VARS) {
            self.notify.webhook_url = Some(url);
        }
        if let Some(url) = first_var(env, &REPORT_BASE_VARS) {
            self.notify.report_base_url = Some(url);
        }
        self
    }

    pub fn report_path(&self) -> PathBuf {
        self.report
            .path
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_REPORT_PATH))
    }

    /// Validate the delivery settings. The webhook is mandatory; a malformed
    /// report base URL only drops the report links.
    pub fn delivery(&self) -> Result<Delivery, ConfigError> {
        let webhook_url = self
            .notify
            .webhook_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .ok_or(ConfigError::MissingWebhook)?;
        validate_http_url("webhook_url", webhook_url)?;

        let report_base_url = match non_empty(self.notify.report_base_url.as_deref()) {
            Some(base) => match validate_http_url("report_base_url", base) {
                Ok(()) => Some(base.to_string()),
                Err(e) => {
                    tracing::warn!(error = %e, "Ignoring report base URL, no report links will be sent");
                    None
                }
            },
            None => None,
        };

        Ok(Delivery {
            webhook_url: webhook_url.to_string(),
            report_base_url,
            title: non_empty(self.notify.title.as_deref())
                .unwrap_or(DEFAULT_TITLE)
                .to_string(),
        })
    }
}

fn first_var(env: &dyn EnvSource, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| env.var(key))
        .find(|value| !value.trim().is_empty())
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn validate_http_url(key: &'static str, value: &str) -> Result<(), ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidUrl {
        key,
        value: value.to_string(),
        reason,
    };
    let url = Url::parse(value).map_err(|e| invalid(e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme {}", url.scheme())));
    }
    if url.host_str().is_none() {
        return Err(invalid("missing host".to_string()));
    }
    Ok(())
}
