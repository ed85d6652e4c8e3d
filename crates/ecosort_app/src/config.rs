use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use ecosort_engine::{ClassifierSettings, DEFAULT_NAMESPACE};
use ecosort_logging::eco_info;
use serde::{Deserialize, Serialize};

use crate::logging::LogDestination;

pub const DEFAULT_CONFIG_FILE: &str = "ecosort.ron";
pub const API_KEY_VARS: [&str; 2] = ["ECOSORT_API_KEY", "GEMINI_API_KEY"];

/// Runtime configuration, read from a RON file. Every field is optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub namespace: String,
    pub log_destination: LogDestination,
    pub classifier: ClassifierConfig,
    /// Time per auto-capture countdown step. Zero disables the ticker.
    pub countdown_interval_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("ecosort_data"),
            namespace: DEFAULT_NAMESPACE.to_string(),
            log_destination: LogDestination::default(),
            classifier: ClassifierConfig::default(),
            countdown_interval_ms: 1000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    pub base_url: String,
    pub model: String,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
    pub max_response_bytes: u64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        let settings = ClassifierSettings::default();
        Self {
            base_url: settings.base_url,
            model: settings.model,
            connect_timeout_secs: settings.connect_timeout.as_secs(),
            request_timeout_secs: settings.request_timeout.as_secs(),
            max_response_bytes: settings.max_response_bytes,
        }
    }
}

impl AppConfig {
    /// Reads `path`; a missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let content = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                eco_info!("no config at {:?}, using defaults", path);
                return Ok(Self::default());
            }
            Err(err) => {
                return Err(err).with_context(|| format!("reading config {}", path.display()))
            }
        };
        ron::from_str(&content).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn load_default() -> Result<Self> {
        Self::load(Path::new(DEFAULT_CONFIG_FILE))
    }

    pub fn countdown_interval(&self) -> Option<Duration> {
        (self.countdown_interval_ms > 0).then(|| Duration::from_millis(self.countdown_interval_ms))
    }

    /// Engine settings with the API key taken from the environment.
    pub fn classifier_settings(&self) -> ClassifierSettings {
        self.classifier_settings_with(|name| std::env::var(name).ok())
    }

    pub fn classifier_settings_with(
        &self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> ClassifierSettings {
        let api_key = API_KEY_VARS
            .iter()
            .filter_map(|name| lookup(name))
            .find(|value| !value.trim().is_empty())
            .unwrap_or_default();
        ClassifierSettings {
            base_url: self.classifier.base_url.clone(),
            model: self.classifier.model.clone(),
            api_key,
            connect_timeout: Duration::from_secs(self.classifier.connect_timeout_secs),
            request_timeout: Duration::from_secs(self.classifier.request_timeout_secs),
            max_response_bytes: self.classifier.max_response_bytes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn missing_file_gives_defaults() {
        let temp = tempfile::TempDir::new().unwrap();
        let config = AppConfig::load(&temp.path().join("absent.ron")).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.namespace, "ecosort_data");
        assert_eq!(config.countdown_interval(), Some(Duration::from_secs(1)));
    }

    #[test]
    fn partial_file_overrides_only_named_fields() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("ecosort.ron");
        fs::write(
            &path,
            r#"(namespace: "staging", log_destination: Both, classifier: (model: "other-model"), countdown_interval_ms: 0)"#,
        )
        .unwrap();

        let config = AppConfig::load(&path).unwrap();
        assert_eq!(config.namespace, "staging");
        assert_eq!(config.log_destination, LogDestination::Both);
        assert_eq!(config.classifier.model, "other-model");
        assert_eq!(config.classifier.base_url, ClassifierConfig::default().base_url);
        assert_eq!(config.countdown_interval(), None);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("ecosort.ron");
        fs::write(&path, "(namespace: ").unwrap();
        let err = AppConfig::load(&path).unwrap_err();
        assert!(err.to_string().contains("parsing config"));
    }

    #[test]
    fn api_key_prefers_ecosort_variable() {
        let config = AppConfig::default();
        let settings = config.classifier_settings_with(|name| match name {
            "ECOSORT_API_KEY" => Some("primary".to_string()),
            "GEMINI_API_KEY" => Some("fallback".to_string()),
            _ => None,
        });
        assert_eq!(settings.api_key, "primary");

        let settings = config.classifier_settings_with(|name| {
            (name == "GEMINI_API_KEY").then(|| "fallback".to_string())
        });
        assert_eq!(settings.api_key, "fallback");
        assert_eq!(settings.request_timeout, Duration::from_secs(30));

        assert!(config.classifier_settings_with(|_| None).api_key.is_empty());
    }
}
