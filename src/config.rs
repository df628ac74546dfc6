//! Runtime configuration: an optional YAML file plus `WFSTATS_*` environment overrides.

use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::data::sources::{default_sources, SourceSpec, DEFAULT_DATA_DIR};
use crate::metrics::MetricKind;

pub const CONFIG_ENV: &str = "WFSTATS_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "warframe-stats.yaml";
pub const DEFAULT_BIND: &str = "127.0.0.1:3000";
/// Roughly two days, matching the upstream static data cadence.
pub const DEFAULT_REFRESH_SECS: u64 = 166_666;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub bind: String,
    pub data_dir: PathBuf,
    pub refresh_interval_secs: u64,
    /// Profiles computed by `metrics` runs without an explicit username.
    pub usernames: Vec<String>,
    pub metrics: Vec<MetricKind>,
    pub unknown_placeholder: Option<String>,
    /// Rayon pool size for multi-profile runs; 0 uses all cores.
    pub workers: usize,
    pub sources: Vec<SourceSpec>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            bind: DEFAULT_BIND.to_string(),
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            refresh_interval_secs: DEFAULT_REFRESH_SECS,
            usernames: Vec::new(),
            metrics: MetricKind::ALL.to_vec(),
            unknown_placeholder: None,
            workers: 0,
            sources: default_sources(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("invalid value for {var}: '{value}'")]
    InvalidOverride { var: &'static str, value: String },
}

impl Config {
    /// Load from `WFSTATS_CONFIG` (or `warframe-stats.yaml`) and apply environment overrides.
    /// A missing default file is not an error; a missing explicitly named file is.
    pub fn load() -> Result<Config, ConfigError> {
        let explicit = env::var(CONFIG_ENV).ok();
        let path = PathBuf::from(explicit.as_deref().unwrap_or(DEFAULT_CONFIG_PATH));
        let mut config = match Self::from_file(&path) {
            Ok(config) => config,
            Err(ConfigError::Read { source, .. })
                if explicit.is_none() && source.kind() == io::ErrorKind::NotFound =>
            {
                Config::default()
            }
            Err(err) => return Err(err),
        };
        config.apply_overrides(|var| env::var(var).ok())?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Config, ConfigError> {
        let display = path.display().to_string();
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: display.clone(),
            source,
        })?;
        Self::parse(&raw, &display)
    }

    pub fn from_yaml_str(raw: &str) -> Result<Config, ConfigError> {
        Self::parse(raw, "<inline>")
    }

    fn parse(raw: &str, path: &str) -> Result<Config, ConfigError> {
        if raw.trim().is_empty() {
            return Ok(Config::default());
        }
        serde_yaml::from_str(raw).map_err(|source| ConfigError::Parse {
            path: path.to_string(),
            source,
        })
    }

    /// Apply `WFSTATS_BIND`, `WFSTATS_DATA_DIR` and `WFSTATS_REFRESH_SECS` from `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(bind) = lookup("WFSTATS_BIND") {
            self.bind = bind;
        }
        if let Some(dir) = lookup("WFSTATS_DATA_DIR") {
            self.data_dir = PathBuf::from(dir);
        }
        if let Some(raw) = lookup("WFSTATS_REFRESH_SECS") {
            self.refresh_interval_secs = match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => secs,
                _ => {
                    return Err(ConfigError::InvalidOverride {
                        var: "WFSTATS_REFRESH_SECS",
                        value: raw,
                    })
                }
            };
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::SourceKind;

    #[test]
    fn partial_yaml_keeps_defaults() {
        let config = Config::from_yaml_str(
            "bind: 0.0.0.0:8080\nusernames: [Tenno]\nmetrics: [rank, star_chart]\nunknown_placeholder: Unknown\n",
        )
        .unwrap();
        assert_eq!(config.bind, "0.0.0.0:8080");
        assert_eq!(config.usernames, vec!["Tenno"]);
        assert_eq!(config.metrics, vec![MetricKind::Rank, MetricKind::StarChart]);
        assert_eq!(config.refresh_interval_secs, DEFAULT_REFRESH_SECS);
        assert_eq!(config.sources, default_sources());
    }

    #[test]
    fn sources_can_be_overridden() {
        let config = Config::from_yaml_str(
            "sources:\n  - name: nodes\n    kind: translations\n    path: solNodes.json\n",
        )
        .unwrap();
        assert_eq!(config.sources, vec![SourceSpec::new("nodes", SourceKind::Translations, "solNodes.json")]);
    }

    #[test]
    fn environment_overrides_apply() {
        let mut config = Config::default();
        config
            .apply_overrides(|var| match var {
                "WFSTATS_DATA_DIR" => Some("/tmp/wf".to_string()),
                "WFSTATS_REFRESH_SECS" => Some("60".to_string()),
                _ => None,
            })
            .unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/tmp/wf"));
        assert_eq!(config.refresh_interval_secs, 60);

        let err = config.apply_overrides(|var| (var == "WFSTATS_REFRESH_SECS").then(|| "soon".to_string()));
        assert!(matches!(err, Err(ConfigError::InvalidOverride { .. })));
    }

    #[test]
    fn malformed_yaml_is_an_error() {
        assert!(matches!(Config::from_yaml_str("bind: [unterminated"), Err(ConfigError::Parse { .. })));
    }
}
