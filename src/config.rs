use reqwest::Url;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:8000";
pub const DEFAULT_CAROUSEL_INTERVAL_MS: u64 = 3200;
pub const DEFAULT_FINETUNE_DATASET: &str = "cybersec";
pub const DEFAULT_FINETUNE_NAME: &str = "my-finetuned-model";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{key} is not a valid URL ({value}): {message}")]
    InvalidUrl {
        key: &'static str,
        value: String,
        message: String,
    },
    #[error("{key} must be a positive integer, got {value:?}")]
    InvalidNumber { key: &'static str, value: String },
    #[error("{key} must not be empty")]
    Empty { key: &'static str },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Backend origin without a trailing slash; request paths are appended as-is.
    pub api_base_url: String,
    pub carousel_interval: Duration,
    pub finetune_dataset: String,
    pub finetune_default_name: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            carousel_interval: Duration::from_millis(DEFAULT_CAROUSEL_INTERVAL_MS),
            finetune_dataset: DEFAULT_FINETUNE_DATASET.to_string(),
            finetune_default_name: DEFAULT_FINETUNE_NAME.to_string(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let api_base_url = match read("SLM_API_BASE_URL") {
            Some(raw) => normalize_base_url("SLM_API_BASE_URL", &raw)?,
            None => defaults.api_base_url,
        };

        let carousel_interval = match read("SLM_CAROUSEL_INTERVAL_MS") {
            Some(raw) => match raw.parse::<u64>() {
                Ok(millis) if millis > 0 => Duration::from_millis(millis),
                _ => {
                    return Err(ConfigError::InvalidNumber {
                        key: "SLM_CAROUSEL_INTERVAL_MS",
                        value: raw,
                    })
                }
            },
            None => defaults.carousel_interval,
        };

        let finetune_dataset = read("SLM_FINETUNE_DATASET").unwrap_or(defaults.finetune_dataset);
        let finetune_default_name =
            read("SLM_FINETUNE_DEFAULT_NAME").unwrap_or(defaults.finetune_default_name);

        Ok(Self {
            api_base_url,
            carousel_interval,
            finetune_dataset,
            finetune_default_name,
        })
    }
}

fn normalize_base_url(key: &'static str, raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(ConfigError::Empty { key });
    }

    Url::parse(trimmed).map_err(|err| ConfigError::InvalidUrl {
        key,
        value: raw.to_string(),
        message: err.to_string(),
    })?;

    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::{AppConfig, ConfigError};
    use std::collections::HashMap;
    use std::time::Duration;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn missing_variables_fall_back_to_defaults() {
        let config = AppConfig::from_lookup(lookup(&[])).expect("defaults should load");
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.carousel_interval, Duration::from_millis(3200));
    }

    #[test]
    fn base_url_is_trimmed_of_trailing_slashes() {
        let config = AppConfig::from_lookup(lookup(&[(
            "SLM_API_BASE_URL",
            " http://10.0.0.5:9000// ",
        )]))
        .expect("valid url should load");
        assert_eq!(config.api_base_url, "http://10.0.0.5:9000");
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let error = AppConfig::from_lookup(lookup(&[("SLM_API_BASE_URL", "not a url")]))
            .expect_err("garbage url should fail");
        assert!(matches!(error, ConfigError::InvalidUrl { .. }));
    }

    #[test]
    fn carousel_interval_must_be_positive() {
        let error = AppConfig::from_lookup(lookup(&[("SLM_CAROUSEL_INTERVAL_MS", "0")]))
            .expect_err("zero interval should fail");
        assert_eq!(
            error,
            ConfigError::InvalidNumber {
                key: "SLM_CAROUSEL_INTERVAL_MS",
                value: "0".to_string(),
            }
        );

        let config = AppConfig::from_lookup(lookup(&[
            ("SLM_CAROUSEL_INTERVAL_MS", "1500"),
            ("SLM_FINETUNE_DATASET", "legal"),
        ]))
        .expect("valid overrides should load");
        assert_eq!(config.carousel_interval, Duration::from_millis(1500));
        assert_eq!(config.finetune_dataset, "legal");
    }
}
