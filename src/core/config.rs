use crate::core::decision::AlertBounds;
use crate::core::error::AlertError;
use crate::core::rate::ConversionRequest;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};
use tracing::debug;

pub const DEFAULT_EXCHANGE_URL: &str = "https://openexchangerates.org/api/latest.json";
pub const DEFAULT_TABLE_NAME: &str = "fx_rate";
pub const DEFAULT_THRESHOLD_PERCENT: f64 = 5.0;

/// Environment variable consulted for the config file location.
pub const CONFIG_PATH_ENV: &str = "CONFIG_PATH";

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ExchangeProviderConfig {
    pub base_url: String,
    pub app_id: Option<String>,
}

impl Default for ExchangeProviderConfig {
    fn default() -> Self {
        ExchangeProviderConfig {
            base_url: DEFAULT_EXCHANGE_URL.to_string(),
            app_id: None,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct EmailProviderConfig {
    pub base_url: String,
    pub api_key: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct ProvidersConfig {
    #[serde(default)]
    pub exchange: ExchangeProviderConfig,
    pub email: Option<EmailProviderConfig>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct StoreConfig {
    #[serde(default = "default_table_name")]
    pub table_name: String,
    pub data_path: Option<String>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            table_name: default_table_name(),
            data_path: None,
        }
    }
}

fn default_table_name() -> String {
    DEFAULT_TABLE_NAME.to_string()
}

fn default_threshold() -> f64 {
    DEFAULT_THRESHOLD_PERCENT
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    pub from_currency: Option<String>,
    pub to_currency: Option<String>,
    pub lower_bound: Option<f64>,
    pub upper_bound: Option<f64>,
    #[serde(default = "default_threshold")]
    pub threshold_percent: f64,
    pub to_email: Option<String>,
    pub from_email: Option<String>,
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default)]
    pub store: StoreConfig,
}

/// Validated inputs of a single alert run.
#[derive(Debug, Clone, PartialEq)]
pub struct AlertSettings {
    pub request: ConversionRequest,
    pub bounds: AlertBounds,
    pub threshold_percent: f64,
    pub to_email: String,
    pub from_email: String,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) if !path.is_empty() => PathBuf::from(path),
            _ => Self::default_config_path()?,
        };
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("dev", "fxalert", "fxalert")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn default_data_path(&self) -> Result<PathBuf> {
        if let Some(custom_path) = &self.store.data_path {
            return Ok(PathBuf::from(custom_path));
        }
        let proj_dirs = ProjectDirs::from("dev", "fxalert", "fxalert")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.data_dir().to_path_buf())
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let mut config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        config.apply_overrides(|name| std::env::var(name).ok())?;
        debug!("Successfully loaded config");
        Ok(config)
    }

    /// Overlays values from `lookup` (normally the process environment) on
    /// top of the file values.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), AlertError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(v) = get("FROM_CURRENCY") {
            self.from_currency = Some(v);
        }
        if let Some(v) = get("TO_CURRENCY") {
            self.to_currency = Some(v);
        }
        if let Some(v) = get("TO_EMAIL") {
            self.to_email = Some(v);
        }
        if let Some(v) = get("APP_ID") {
            self.providers.exchange.app_id = Some(v);
        }
        if let Some(v) = get("LOWER_BOUND") {
            self.lower_bound = Some(parse_number("LOWER_BOUND", &v)?);
        }
        if let Some(v) = get("UPPER_BOUND") {
            self.upper_bound = Some(parse_number("UPPER_BOUND", &v)?);
        }
        if let Some(v) = get("THRESHOLD_PERCENT") {
            self.threshold_percent = parse_number("THRESHOLD_PERCENT", &v)?;
        }
        Ok(())
    }

    pub fn alert_settings(&self) -> Result<AlertSettings, AlertError> {
        let from = currency_code("from_currency", self.from_currency.as_deref())?;
        let to = currency_code("to_currency", self.to_currency.as_deref())?;

        let lower = self
            .lower_bound
            .ok_or_else(|| AlertError::Config("lower_bound is not set".to_string()))?;
        let upper = self
            .upper_bound
            .ok_or_else(|| AlertError::Config("upper_bound is not set".to_string()))?;
        if lower >= upper {
            return Err(AlertError::Config(format!(
                "lower_bound ({lower}) must be below upper_bound ({upper})"
            )));
        }
        if self.threshold_percent.is_nan() || self.threshold_percent < 0.0 {
            return Err(AlertError::Config(format!(
                "threshold_percent must be non-negative, got {}",
                self.threshold_percent
            )));
        }

        let to_email = self
            .to_email
            .clone()
            .filter(|e| !e.trim().is_empty())
            .ok_or_else(|| AlertError::Config("to_email is not set".to_string()))?;
        let from_email = self.from_email.clone().unwrap_or_else(|| to_email.clone());

        Ok(AlertSettings {
            request: ConversionRequest::new(&from, &to),
            bounds: AlertBounds::new(lower as f32, upper as f32),
            threshold_percent: self.threshold_percent,
            to_email,
            from_email,
        })
    }
}

fn parse_number(name: &str, value: &str) -> Result<f64, AlertError> {
    value
        .trim()
        .parse()
        .map_err(|e| AlertError::Config(format!("failed loading {name}={value}: {e}")))
}

fn currency_code(name: &str, value: Option<&str>) -> Result<String, AlertError> {
    let code = value
        .map(str::trim)
        .ok_or_else(|| AlertError::Config(format!("{name} is not set")))?;
    if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(AlertError::Config(format!(
            "{name} must be a 3-letter currency code, got '{code}'"
        )));
    }
    Ok(code.to_ascii_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const YAML: &str = r#"
from_currency: "AUD"
to_currency: "INR"
lower_bound: 55
upper_bound: 58
to_email: "test@example.com"
providers:
  exchange:
    base_url: "http://example.com/latest.json"
    app_id: "abc"
  email:
    base_url: "http://example.com/email"
    api_key: "secret"
store:
  table_name: "rates"
"#;

    fn env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_config_deserialization() {
        let config: AppConfig = serde_yaml::from_str(YAML).expect("Failed to deserialize");
        assert_eq!(config.from_currency.as_deref(), Some("AUD"));
        assert_eq!(config.to_currency.as_deref(), Some("INR"));
        assert_eq!(config.lower_bound, Some(55.0));
        assert_eq!(config.upper_bound, Some(58.0));
        assert_eq!(config.threshold_percent, DEFAULT_THRESHOLD_PERCENT);
        assert_eq!(
            config.providers.exchange.base_url,
            "http://example.com/latest.json"
        );
        assert_eq!(config.providers.exchange.app_id.as_deref(), Some("abc"));
        let email = config.providers.email.unwrap();
        assert_eq!(email.base_url, "http://example.com/email");
        assert_eq!(email.api_key.as_deref(), Some("secret"));
        assert_eq!(config.store.table_name, "rates");
        assert!(config.store.data_path.is_none());
    }

    #[test]
    fn test_defaults_for_minimal_config() {
        let config: AppConfig = serde_yaml::from_str("to_email: a@b.c").unwrap();
        assert_eq!(config.providers.exchange.base_url, DEFAULT_EXCHANGE_URL);
        assert!(config.providers.email.is_none());
        assert_eq!(config.store.table_name, DEFAULT_TABLE_NAME);
        assert_eq!(config.threshold_percent, 5.0);
    }

    #[test]
    fn test_env_overrides_file_values() {
        let mut config: AppConfig = serde_yaml::from_str(YAML).unwrap();
        config
            .apply_overrides(env(&[
                ("FROM_CURRENCY", "usd"),
                ("LOWER_BOUND", "50.5"),
                ("THRESHOLD_PERCENT", "2"),
                ("APP_ID", "from-env"),
                ("TO_EMAIL", ""),
            ]))
            .unwrap();

        assert_eq!(config.from_currency.as_deref(), Some("usd"));
        assert_eq!(config.lower_bound, Some(50.5));
        assert_eq!(config.threshold_percent, 2.0);
        assert_eq!(config.providers.exchange.app_id.as_deref(), Some("from-env"));
        assert_eq!(config.to_email.as_deref(), Some("test@example.com"));
    }

    #[test]
    fn test_unparseable_bound_is_config_error() {
        let mut config: AppConfig = serde_yaml::from_str(YAML).unwrap();
        let err = config
            .apply_overrides(env(&[("UPPER_BOUND", "high")]))
            .unwrap_err();
        assert!(matches!(err, AlertError::Config(_)));
        assert!(err.to_string().contains("UPPER_BOUND"));
    }

    #[test]
    fn test_alert_settings() {
        let config: AppConfig = serde_yaml::from_str(YAML).unwrap();
        let settings = config.alert_settings().unwrap();
        assert_eq!(settings.request, ConversionRequest::new("AUD", "INR"));
        assert_eq!(settings.bounds, AlertBounds::new(55.0, 58.0));
        assert_eq!(settings.threshold_percent, 5.0);
        assert_eq!(settings.to_email, "test@example.com");
        assert_eq!(settings.from_email, "test@example.com");
    }

    #[test]
    fn test_alert_settings_rejects_bad_input() {
        let base: AppConfig = serde_yaml::from_str(YAML).unwrap();

        let mut config = base.clone();
        config.lower_bound = None;
        assert!(config.alert_settings().is_err());

        let mut config = base.clone();
        config.lower_bound = Some(60.0);
        assert!(config.alert_settings().is_err());

        let mut config = base.clone();
        config.to_currency = Some("RUPEE".to_string());
        assert!(config.alert_settings().is_err());

        let mut config = base.clone();
        config.to_email = None;
        assert!(config.alert_settings().is_err());

        let mut config = base;
        config.threshold_percent = -1.0;
        assert!(config.alert_settings().is_err());
    }

    #[test]
    fn test_load_from_path() {
        let file = tempfile::NamedTempFile::new().unwrap();
        fs::write(file.path(), YAML).unwrap();
        let config = AppConfig::load_from_path(file.path()).unwrap();
        assert_eq!(config.store.table_name, "rates");
    }

    #[test]
    fn test_load_from_missing_path_fails() {
        let err = AppConfig::load_from_path("/nonexistent/fxalert.yaml").unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
