//! Configuration module

use std::env;
use std::path::PathBuf;

use crate::constants::*;
use crate::messages::Locale;

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Bind address
    pub host: String,

    /// Server port
    pub port: u16,

    /// Path to the serialized model bundle
    pub bundle_path: PathBuf,

    /// Upper bound for request bodies (CSV uploads)
    pub max_upload_bytes: usize,

    /// Language of client-visible error messages
    pub locale: Locale,

    /// Confidence below this is flagged for manual review in the UI
    pub confidence_low: f64,

    /// Confidence below this (and above `confidence_low`) is "medium"
    pub confidence_medium: f64,

    pub log_format: LogFormat,

    /// Environment (development, production)
    pub environment: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            bundle_path: PathBuf::from(DEFAULT_BUNDLE_PATH),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            locale: Locale::default(),
            confidence_low: DEFAULT_CONFIDENCE_LOW,
            confidence_medium: DEFAULT_CONFIDENCE_MEDIUM,
            log_format: LogFormat::Pretty,
            environment: "development".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup. Unparseable values fall
    /// back to their defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let confidence_low = lookup("CONFIDENCE_LOW")
            .and_then(|v| v.parse::<f64>().ok())
            .filter(|v| v.is_finite())
            .map(|v| v.clamp(0.0, 1.0))
            .unwrap_or(defaults.confidence_low);

        let confidence_medium = lookup("CONFIDENCE_MEDIUM")
            .and_then(|v| v.parse::<f64>().ok())
            .filter(|v| v.is_finite())
            .map(|v| v.clamp(0.0, 1.0))
            .unwrap_or(defaults.confidence_medium)
            .max(confidence_low);

        Self {
            host: lookup("HOST").unwrap_or(defaults.host),

            port: lookup("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),

            bundle_path: lookup("MODEL_BUNDLE_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.bundle_path),

            max_upload_bytes: lookup("MAX_UPLOAD_BYTES")
                .and_then(|v| v.parse().ok())
                .filter(|v| *v > 0)
                .unwrap_or(defaults.max_upload_bytes),

            locale: lookup("MESSAGE_LOCALE")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.locale),

            confidence_low,
            confidence_medium,

            log_format: match lookup("LOG_FORMAT").as_deref() {
                Some("json") => LogFormat::Json,
                _ => LogFormat::Pretty,
            },

            environment: lookup("ENVIRONMENT").unwrap_or(defaults.environment),
        }
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_with(pairs: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = config_with(&[]);
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.bundle_path, PathBuf::from(DEFAULT_BUNDLE_PATH));
        assert_eq!(config.locale, Locale::Ru);
        assert_eq!(config.log_format, LogFormat::Pretty);
        assert!(!config.is_production());
    }

    #[test]
    fn test_overrides() {
        let config = config_with(&[
            ("PORT", "9100"),
            ("MODEL_BUNDLE_PATH", "/srv/model/bundle.json"),
            ("MESSAGE_LOCALE", "en"),
            ("LOG_FORMAT", "json"),
            ("ENVIRONMENT", "production"),
        ]);
        assert_eq!(config.port, 9100);
        assert_eq!(config.bundle_path, PathBuf::from("/srv/model/bundle.json"));
        assert_eq!(config.locale, Locale::En);
        assert_eq!(config.log_format, LogFormat::Json);
        assert!(config.is_production());
    }

    #[test]
    fn test_invalid_numbers_fall_back() {
        let config = config_with(&[("PORT", "http"), ("MAX_UPLOAD_BYTES", "0")]);
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.max_upload_bytes, DEFAULT_MAX_UPLOAD_BYTES);
    }

    #[test]
    fn test_thresholds_clamped_and_ordered() {
        let config = config_with(&[("CONFIDENCE_LOW", "1.7"), ("CONFIDENCE_MEDIUM", "0.5")]);
        assert_eq!(config.confidence_low, 1.0);
        assert_eq!(config.confidence_medium, 1.0);
    }
}
