//! Runtime settings: a TOML file, then `GAMECHECK_*` environment overrides.
//!
//! Every field has a default, so an empty file (or no file at all) gives a
//! working configuration against the live sites.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::GameCheckError;
use crate::rate_limit::RetryPolicy;
use crate::sources::Source;

/// File looked up in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "gamecheck.toml";

/// Per-source overrides; unset fields fall back to the source defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceSettings {
    pub base_url: Option<String>,
    pub delay_ms: Option<u64>,
    pub jitter_ms: Option<u64>,
}

/// Resolved connection settings for one source.
#[derive(Debug, Clone, PartialEq)]
pub struct Endpoint {
    pub base_url: Url,
    pub delay: Duration,
    pub jitter: Duration,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub games_file: PathBuf,
    pub times_file: PathBuf,
    pub scores_file: PathBuf,
    pub report_file: PathBuf,
    pub images_file: PathBuf,
    /// Dump fetched HTML when a lookup finds nothing.
    pub debug_html: bool,
    pub debug_dir: PathBuf,
    /// Games priced at once by the `prices` command.
    pub concurrency: usize,
    pub timeout_secs: u64,
    /// Zero disables the lookup cache.
    pub cache_ttl_secs: u64,
    pub max_retries: usize,
    pub retry_base_ms: u64,
    pub retry_max_ms: u64,
    /// Jitter added to every source's delay unless the source sets its own.
    pub jitter_ms: u64,
    pub sources: BTreeMap<Source, SourceSettings>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            games_file: PathBuf::from("games.txt"),
            times_file: PathBuf::from("howlongtobeat_times.txt"),
            scores_file: PathBuf::from("metacritic_scores.txt"),
            report_file: PathBuf::from("report.html"),
            images_file: PathBuf::from("images.json"),
            debug_html: false,
            debug_dir: PathBuf::from("debug_html"),
            concurrency: 6,
            timeout_secs: 25,
            cache_ttl_secs: 3600,
            max_retries: 2,
            retry_base_ms: 2000,
            retry_max_ms: 30000,
            jitter_ms: 500,
            sources: BTreeMap::new(),
        }
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T, GameCheckError> {
    raw.trim()
        .parse()
        .map_err(|_| GameCheckError::Config(format!("{} has an invalid value '{}'", key, raw)))
}

fn parse_bool(key: &str, raw: &str) -> Result<bool, GameCheckError> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(GameCheckError::Config(format!(
            "{} has an invalid value '{}'",
            key, raw
        ))),
    }
}

impl Settings {
    /// Reads `path`, or `gamecheck.toml` when present, or the defaults;
    /// then applies environment overrides and validates.
    pub fn load(path: Option<&Path>) -> Result<Self, GameCheckError> {
        let mut settings = match path {
            Some(path) => Self::from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => Self::default(),
        };
        settings.apply_env()?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn from_file(path: &Path) -> Result<Self, GameCheckError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            GameCheckError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        tracing::debug!("loaded settings from {}", path.display());
        Self::from_toml_str(&raw)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, GameCheckError> {
        Ok(toml::from_str(raw)?)
    }

    pub fn apply_env(&mut self) -> Result<(), GameCheckError> {
        self.apply_env_with(|key| std::env::var(key).ok())
    }

    /// Applies overrides read through `lookup`, which maps a variable name
    /// to its value.
    pub fn apply_env_with<F>(&mut self, lookup: F) -> Result<(), GameCheckError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get("GAMECHECK_GAMES_FILE") {
            self.games_file = PathBuf::from(v);
        }
        if let Some(v) = get("GAMECHECK_DEBUG_DIR") {
            self.debug_dir = PathBuf::from(v);
        }
        if let Some(v) = get("GAMECHECK_DEBUG_HTML") {
            self.debug_html = parse_bool("GAMECHECK_DEBUG_HTML", &v)?;
        }
        if let Some(v) = get("GAMECHECK_CONCURRENCY") {
            self.concurrency = parse_env("GAMECHECK_CONCURRENCY", &v)?;
        }
        if let Some(v) = get("GAMECHECK_TIMEOUT_SECS") {
            self.timeout_secs = parse_env("GAMECHECK_TIMEOUT_SECS", &v)?;
        }
        if let Some(v) = get("GAMECHECK_CACHE_TTL_SECS") {
            self.cache_ttl_secs = parse_env("GAMECHECK_CACHE_TTL_SECS", &v)?;
        }
        if let Some(v) = get("GAMECHECK_RETRY_MAX") {
            self.max_retries = parse_env("GAMECHECK_RETRY_MAX", &v)?;
        }
        if let Some(v) = get("GAMECHECK_RETRY_BASE_MS") {
            self.retry_base_ms = parse_env("GAMECHECK_RETRY_BASE_MS", &v)?;
        }
        if let Some(v) = get("GAMECHECK_RETRY_MAX_MS") {
            self.retry_max_ms = parse_env("GAMECHECK_RETRY_MAX_MS", &v)?;
        }

        for source in Source::ALL {
            let prefix = format!("GAMECHECK_{}", source.key().to_uppercase());
            let base_key = format!("{}_BASE_URL", prefix);
            let delay_key = format!("{}_DELAY_MS", prefix);
            if let Some(v) = get(&base_key) {
                self.sources.entry(source).or_default().base_url = Some(v.trim().to_string());
            }
            if let Some(v) = get(&delay_key) {
                self.sources.entry(source).or_default().delay_ms = Some(parse_env(&delay_key, &v)?);
            }
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), GameCheckError> {
        if self.concurrency == 0 {
            return Err(GameCheckError::Config(
                "concurrency must be at least 1".to_string(),
            ));
        }
        if self.timeout_secs == 0 {
            return Err(GameCheckError::Config(
                "timeout_secs must be at least 1".to_string(),
            ));
        }
        for source in Source::ALL {
            self.endpoint(source)?;
        }
        Ok(())
    }

    /// Base URL and pacing for `source`, with overrides applied.
    pub fn endpoint(&self, source: Source) -> Result<Endpoint, GameCheckError> {
        let overrides = self.sources.get(&source).cloned().unwrap_or_default();
        let raw = overrides
            .base_url
            .as_deref()
            .unwrap_or(source.default_base_url());
        let base_url = Url::parse(raw).map_err(|e| {
            GameCheckError::Config(format!("invalid base_url '{}' for {}: {}", raw, source, e))
        })?;
        Ok(Endpoint {
            base_url,
            delay: overrides
                .delay_ms
                .map(Duration::from_millis)
                .unwrap_or_else(|| source.default_delay()),
            jitter: Duration::from_millis(overrides.jitter_ms.unwrap_or(self.jitter_ms)),
        })
    }

    /// Points `source` at `base_url` with no request spacing.
    pub fn with_base_url(mut self, source: Source, base_url: &str) -> Self {
        let entry = self.sources.entry(source).or_default();
        entry.base_url = Some(base_url.to_string());
        entry.delay_ms = Some(0);
        entry.jitter_ms = Some(0);
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries,
            base_delay: Duration::from_millis(self.retry_base_ms),
            max_delay: Duration::from_millis(self.retry_max_ms),
        }
    }
}
