use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use critiqe_contracts::catalog::Catalog;
use serde::{Deserialize, Serialize};

use crate::media::ConversionPolicy;

pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_IMAGE_MODEL: &str = "gemini-2.5-flash-image";
pub const DEFAULT_TEXT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_MAX_UPLOAD_MB: u64 = 20;

const DEFAULT_REQUEST_TIMEOUT_S: f64 = 120.0;
const MIN_REQUEST_TIMEOUT_S: f64 = 5.0;
const MAX_REQUEST_TIMEOUT_S: f64 = 600.0;

pub const API_KEY_ENV_VARS: &[&str] = &["GEMINI_API_KEY", "GOOGLE_API_KEY", "API_KEY"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StudioConfig {
    pub api_base: String,
    pub image_model: String,
    pub text_model: String,
    /// Explicit key; when absent the environment is consulted on every call.
    pub api_key: Option<String>,
    /// Environment variables checked, in order, for the key.
    pub api_key_env: Vec<String>,
    pub request_timeout_secs: f64,
    pub max_upload_mb: u64,
    /// Converter argv with `{input}`, `{output}` and `{quality}` placeholders.
    pub converter_command: Vec<String>,
    pub single_upload_policy: ConversionPolicy,
    pub batch_upload_policy: ConversionPolicy,
    pub catalog_path: Option<PathBuf>,
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            image_model: DEFAULT_IMAGE_MODEL.to_string(),
            text_model: DEFAULT_TEXT_MODEL.to_string(),
            api_key: None,
            api_key_env: API_KEY_ENV_VARS.iter().map(|key| key.to_string()).collect(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_S,
            max_upload_mb: DEFAULT_MAX_UPLOAD_MB,
            converter_command: vec![
                "heif-convert".to_string(),
                "-q".to_string(),
                "{quality}".to_string(),
                "{input}".to_string(),
                "{output}".to_string(),
            ],
            single_upload_policy: ConversionPolicy::FailFast,
            batch_upload_policy: ConversionPolicy::BestEffort,
            catalog_path: None,
        }
    }
}

impl StudioConfig {
    /// Defaults, then the optional JSON file, then environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_overrides(non_empty_env);
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed reading config {}", path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("invalid config {}", path.display()))
    }

    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(value) = lookup("GEMINI_API_BASE") {
            self.api_base = value.trim().trim_end_matches('/').to_string();
        }
        if let Some(value) = lookup("CRITIQE_IMAGE_MODEL") {
            self.image_model = value;
        }
        if let Some(value) = lookup("CRITIQE_TEXT_MODEL") {
            self.text_model = value;
        }
        if let Some(value) = lookup("CRITIQE_REQUEST_TIMEOUT") {
            if let Ok(parsed) = value.trim().parse::<f64>() {
                self.request_timeout_secs = parsed;
            }
        }
        if let Some(value) = lookup("CRITIQE_MAX_UPLOAD_MB") {
            if let Ok(parsed) = value.trim().parse::<u64>() {
                self.max_upload_mb = parsed;
            }
        }
        if let Some(value) = lookup("CRITIQE_CONVERTER") {
            let argv: Vec<String> = value.split_whitespace().map(str::to_string).collect();
            if !argv.is_empty() {
                self.converter_command = argv;
            }
        }
    }

    pub fn request_timeout(&self) -> Duration {
        let secs = if self.request_timeout_secs.is_finite() {
            self.request_timeout_secs
                .clamp(MIN_REQUEST_TIMEOUT_S, MAX_REQUEST_TIMEOUT_S)
        } else {
            DEFAULT_REQUEST_TIMEOUT_S
        };
        Duration::from_secs_f64(secs)
    }

    pub fn max_upload_bytes(&self) -> u64 {
        self.max_upload_mb.saturating_mul(1024 * 1024)
    }

    /// Resolved on every model call so a revoked key is noticed on next use.
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string)
            .or_else(|| {
                self.api_key_env
                    .iter()
                    .find_map(|key| non_empty_env(key))
            })
    }

    pub fn catalog(&self) -> Result<Catalog> {
        match self.catalog_path.as_deref() {
            Some(path) => Catalog::load(path),
            None => Ok(Catalog::builtin()),
        }
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::time::Duration;

    use super::StudioConfig;
    use crate::media::ConversionPolicy;

    #[test]
    fn defaults_match_upload_and_model_contract() {
        let config = StudioConfig::default();
        assert_eq!(config.image_model, "gemini-2.5-flash-image");
        assert_eq!(config.max_upload_bytes(), 20 * 1024 * 1024);
        assert_eq!(config.single_upload_policy, ConversionPolicy::FailFast);
        assert_eq!(config.batch_upload_policy, ConversionPolicy::BestEffort);
        assert_eq!(config.request_timeout(), Duration::from_secs(120));
    }

    #[test]
    fn overrides_apply_and_timeouts_clamp() {
        let env: HashMap<&str, &str> = [
            ("GEMINI_API_BASE", "https://proxy.test/v1beta/"),
            ("CRITIQE_REQUEST_TIMEOUT", "9000"),
            ("CRITIQE_MAX_UPLOAD_MB", "5"),
            ("CRITIQE_CONVERTER", "magick {input} -quality {quality} {output}"),
        ]
        .into_iter()
        .collect();
        let mut config = StudioConfig::default();
        config.apply_overrides(|key| env.get(key).map(|value| value.to_string()));

        assert_eq!(config.api_base, "https://proxy.test/v1beta");
        assert_eq!(config.request_timeout(), Duration::from_secs(600));
        assert_eq!(config.max_upload_bytes(), 5 * 1024 * 1024);
        assert_eq!(config.converter_command[0], "magick");

        config.request_timeout_secs = 0.5;
        assert_eq!(config.request_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn file_config_fills_missing_fields_with_defaults() -> anyhow::Result<()> {
        let temp = tempfile::tempdir()?;
        let path = temp.path().join("critiqe.json");
        std::fs::write(
            &path,
            r#"{"image_model": "gemini-3-pro-image-preview", "batch_upload_policy": "fail_fast"}"#,
        )?;
        let config = StudioConfig::from_file(&path)?;
        assert_eq!(config.image_model, "gemini-3-pro-image-preview");
        assert_eq!(config.batch_upload_policy, ConversionPolicy::FailFast);
        assert_eq!(config.text_model, "gemini-2.5-flash");
        Ok(())
    }

    #[test]
    fn missing_key_resolves_to_none() {
        let config = StudioConfig {
            api_key: Some("   ".to_string()),
            api_key_env: vec!["CRITIQE_TEST_KEY_THAT_IS_NEVER_SET".to_string()],
            ..StudioConfig::default()
        };
        assert_eq!(config.resolve_api_key(), None);
    }

    #[test]
    fn explicit_key_wins_over_environment() {
        let config = StudioConfig {
            api_key: Some("  configured-key ".to_string()),
            ..StudioConfig::default()
        };
        assert_eq!(config.resolve_api_key().as_deref(), Some("configured-key"));
    }
}
