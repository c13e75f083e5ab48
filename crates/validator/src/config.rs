//! Configuration loading and validation for the validator.
//!
//! Operational settings are read from environment variables at startup; the
//! object to validate comes from the command line (see [`crate::cli`]). Every
//! setting has a default matching the established storage layout, so an empty
//! environment is a valid configuration.

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::compare::CompareSettings;
use crate::select::SelectorPolicy;

/// Output encoding of log records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Text,
}

/// Validated validator configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Tracing log level (e.g. `"info"`, `"debug"`). `RUST_LOG` takes precedence.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log record format.
    #[serde(default = "default_log_format")]
    pub log_format: LogFormat,

    /// Append logs to this file instead of stderr.
    #[serde(default)]
    pub log_file: Option<String>,

    /// Keystore object key, relative to the prefix.
    #[serde(default = "default_keystore_object")]
    pub keystore_object: String,

    /// Number of trailing key segments replaced when deriving the unencrypted key.
    #[serde(default = "default_encrypted_path_depth")]
    pub encrypted_path_depth: usize,

    /// Listing pages read in batch mode.
    #[serde(default = "default_selector_max_pages")]
    pub selector_max_pages: usize,

    /// Keys compared in batch mode.
    #[serde(default = "default_selector_max_results")]
    pub selector_max_results: usize,

    /// Listed keys containing this substring are skipped in batch mode.
    #[serde(default = "default_selector_exclude_marker")]
    pub selector_exclude_marker: String,

    /// Custom S3 endpoint (e.g. LocalStack). Enables path-style addressing.
    #[serde(default)]
    pub s3_endpoint_url: Option<String>,
}

fn default_log_level() -> String {
    "info".into()
}
fn default_log_format() -> LogFormat {
    LogFormat::Json
}
fn default_keystore_object() -> String {
    "cloud_encryption_keys/cloud_encryption_keys.json".into()
}
fn default_encrypted_path_depth() -> usize {
    3
}
fn default_selector_max_pages() -> usize {
    5
}
fn default_selector_max_results() -> usize {
    10
}
fn default_selector_exclude_marker() -> String {
    "metadata".into()
}

impl Config {
    /// Load and validate configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable cannot be parsed or fails validation.
    pub fn from_env() -> Result<Self> {
        Self::load(config::Config::builder().add_source(config::Environment::default()))
    }

    fn load(builder: config::ConfigBuilder<config::builder::DefaultState>) -> Result<Self> {
        let cfg = builder
            .build()
            .context("failed to build configuration from environment")?;

        let c: Config = cfg
            .try_deserialize()
            .context("failed to deserialise configuration")?;

        c.validate()?;
        Ok(c)
    }

    /// Validate all fields, returning a descriptive error on the first failure.
    fn validate(&self) -> Result<()> {
        ensure_non_empty(&self.keystore_object, "KEYSTORE_OBJECT")?;
        ensure_non_empty(&self.selector_exclude_marker, "SELECTOR_EXCLUDE_MARKER")?;

        if self.encrypted_path_depth == 0 {
            anyhow::bail!("ENCRYPTED_PATH_DEPTH must be > 0");
        }
        if self.selector_max_pages == 0 {
            anyhow::bail!("SELECTOR_MAX_PAGES must be > 0");
        }
        if self.selector_max_results == 0 {
            anyhow::bail!("SELECTOR_MAX_RESULTS must be > 0");
        }
        if let Some(url) = &self.s3_endpoint_url {
            ensure_non_empty(url, "S3_ENDPOINT_URL")?;
        }
        Ok(())
    }

    pub fn compare_settings(&self) -> CompareSettings {
        CompareSettings {
            keystore_object: self.keystore_object.clone(),
            path_depth: self.encrypted_path_depth,
        }
    }

    pub fn selector_policy(&self) -> SelectorPolicy {
        SelectorPolicy {
            max_pages: self.selector_max_pages,
            max_results: self.selector_max_results,
            exclude_marker: self.selector_exclude_marker.clone(),
        }
    }
}

fn ensure_non_empty(value: &str, name: &str) -> Result<()> {
    if value.trim().is_empty() {
        anyhow::bail!("{name} must not be empty");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defaults() -> Config {
        Config {
            log_level: default_log_level(),
            log_format: default_log_format(),
            log_file: None,
            keystore_object: default_keystore_object(),
            encrypted_path_depth: default_encrypted_path_depth(),
            selector_max_pages: default_selector_max_pages(),
            selector_max_results: default_selector_max_results(),
            selector_exclude_marker: default_selector_exclude_marker(),
            s3_endpoint_url: None,
        }
    }

    #[test]
    fn defaults_are_correct() {
        assert_eq!(default_log_level(), "info");
        assert_eq!(default_log_format(), LogFormat::Json);
        assert_eq!(
            default_keystore_object(),
            "cloud_encryption_keys/cloud_encryption_keys.json"
        );
        assert_eq!(default_encrypted_path_depth(), 3);
        assert_eq!(default_selector_max_pages(), 5);
        assert_eq!(default_selector_max_results(), 10);
        assert_eq!(default_selector_exclude_marker(), "metadata");
    }

    #[test]
    fn empty_source_uses_defaults() {
        let cfg = Config::load(config::Config::builder()).unwrap();
        assert_eq!(cfg.selector_max_pages, 5);
        assert_eq!(cfg.log_format, LogFormat::Json);
        assert!(cfg.log_file.is_none());
        assert!(cfg.s3_endpoint_url.is_none());
    }

    #[test]
    fn overrides_are_applied() {
        let builder = config::Config::builder()
            .set_override("selector_max_pages", 7)
            .unwrap()
            .set_override("log_format", "text")
            .unwrap()
            .set_override("s3_endpoint_url", "http://localhost:4566")
            .unwrap();
        let cfg = Config::load(builder).unwrap();
        assert_eq!(cfg.selector_max_pages, 7);
        assert_eq!(cfg.log_format, LogFormat::Text);
        assert_eq!(cfg.s3_endpoint_url.as_deref(), Some("http://localhost:4566"));
    }

    #[test]
    fn validate_accepts_defaults() {
        assert!(defaults().validate().is_ok());
    }

    #[test]
    fn validate_rejects_zero_depth() {
        let cfg = Config {
            encrypted_path_depth: 0,
            ..defaults()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_pages() {
        let cfg = Config {
            selector_max_pages: 0,
            ..defaults()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn validate_rejects_empty_marker() {
        let cfg = Config {
            selector_exclude_marker: " ".into(),
            ..defaults()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn settings_carry_config_values() {
        let cfg = defaults();
        assert_eq!(cfg.compare_settings().path_depth, 3);
        let policy = cfg.selector_policy();
        assert_eq!(policy.max_pages, 5);
        assert_eq!(policy.max_results, 10);
        assert_eq!(policy.exclude_marker, "metadata");
    }
}
