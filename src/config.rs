//! Onboarding service configuration
//!
//! Defines the serde schema for `config/onboarding.yaml`. Every key is
//! optional; a missing file yields the defaults.
//!
//! Environment overrides (a `.env` file is honoured):
//!
//! | Variable | Effect |
//! |----------|--------|
//! | `ONBOARDING_CONFIG` | Path of the YAML file |
//! | `ONBOARDING_LOG_FILTER` | Replaces `log_filter` |
//! | `ONBOARDING_ROUTE_BASE` | Replaces `routes.base_path` |

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use ob_onboarding_flow::EngineOptions;
use ob_onboarding_types::RouteConfig;
use serde::{Deserialize, Serialize};

pub const DEFAULT_CONFIG_PATH: &str = "config/onboarding.yaml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config YAML: {0}")]
    Parse(#[from] serde_yaml::Error),
}

/// Root configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OnboardingConfig {
    /// `tracing` filter directive; `RUST_LOG` wins when set.
    pub log_filter: String,
    pub routes: RouteConfig,
    /// Earliest year accepted for "since year" answers.
    pub min_plausible_year: i32,
    /// Fixed reference date for deterministic runs. The system clock is used
    /// when absent.
    pub today: Option<NaiveDate>,
}

impl Default for OnboardingConfig {
    fn default() -> Self {
        Self {
            log_filter: "info".to_string(),
            routes: RouteConfig::default(),
            min_plausible_year: 1900,
            today: None,
        }
    }
}

impl OnboardingConfig {
    /// Load configuration from YAML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&content)
    }

    /// Load configuration from YAML string (for testing)
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Load `.env`, then the YAML file named by `ONBOARDING_CONFIG` (or the
    /// default path), then apply environment overrides.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let path = lookup("ONBOARDING_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));

        let config = if path.exists() {
            Self::load(&path)?
        } else {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            Self::default()
        };
        Ok(config.with_overrides(lookup))
    }

    fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(filter) = lookup("ONBOARDING_LOG_FILTER") {
            self.log_filter = filter;
        }
        if let Some(base) = lookup("ONBOARDING_ROUTE_BASE") {
            self.routes.base_path = base;
        }
        self
    }

    /// Engine inputs, with `clock_today` used unless `today` is pinned.
    pub fn engine_options(&self, clock_today: NaiveDate) -> EngineOptions {
        EngineOptions::new(self.today.unwrap_or(clock_today))
            .with_routes(self.routes.clone())
            .with_min_plausible_year(self.min_plausible_year)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = OnboardingConfig::from_yaml(
            r#"
log_filter: "debug,ob_onboarding_flow=trace"
routes:
  base_path: "/advisor/clients"
"#,
        )
        .unwrap();
        assert_eq!(config.log_filter, "debug,ob_onboarding_flow=trace");
        assert_eq!(config.routes.base_path, "/advisor/clients");
        assert_eq!(config.routes.workspace_segment, "workspace");
        assert_eq!(config.min_plausible_year, 1900);
        assert!(config.today.is_none());
    }

    #[test]
    fn test_load_from_file_and_pinned_today() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "today: 2026-02-01\nmin_plausible_year: 1950").unwrap();

        let config = OnboardingConfig::load(file.path()).unwrap();
        let options = config.engine_options(NaiveDate::from_ymd_opt(2030, 1, 1).unwrap());
        assert_eq!(options.today, NaiveDate::from_ymd_opt(2026, 2, 1).unwrap());
        assert_eq!(options.min_plausible_year, 1950);
    }

    #[test]
    fn test_missing_file_and_env_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.yaml");
        let env: HashMap<&str, String> = HashMap::from([
            ("ONBOARDING_CONFIG", missing.display().to_string()),
            ("ONBOARDING_LOG_FILTER", "warn".to_string()),
            ("ONBOARDING_ROUTE_BASE", "/c".to_string()),
        ]);

        let config = OnboardingConfig::from_lookup(|name| env.get(name).cloned()).unwrap();
        assert_eq!(config.log_filter, "warn");
        assert_eq!(config.routes.base_path, "/c");
        assert_eq!(config.min_plausible_year, 1900);
    }

    #[test]
    fn test_invalid_yaml_is_an_error() {
        let err = OnboardingConfig::from_yaml("min_plausible_year: [1, 2]").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
