use crate::error::{Result, VouchrError};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use url::Url;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub endpoints: EndpointConfig,
    pub parser: ParserConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EndpointConfig {
    pub save_url: String,
    pub list_url: String,
    pub timeout: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ParserConfig {
    pub default_shared_via: String,
    pub brands: Vec<BrandConfig>,
}

/// One entry of the ordered brand list. Earlier entries win.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct BrandConfig {
    pub pattern: String,
    pub label: String,
}

impl BrandConfig {
    pub fn new<P: Into<String>, L: Into<String>>(pattern: P, label: L) -> Self {
        Self {
            pattern: pattern.into(),
            label: label.into(),
        }
    }
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            save_url: "http://127.0.0.1:8080/vouchers".to_string(),
            list_url: "http://127.0.0.1:8080/vouchers".to_string(),
            timeout: 30,
        }
    }
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            default_shared_via: "Google Pay".to_string(),
            brands: vec![
                BrandConfig::new("rummycircle", "RummyCircle"),
                BrandConfig::new(r"goindigo\.in|indigo", "IndiGo"),
                BrandConfig::new("spotify", "Spotify"),
                BrandConfig::new("zomato", "Zomato"),
                BrandConfig::new("swiggy", "Swiggy"),
                BrandConfig::new("flipkart", "Flipkart"),
                BrandConfig::new("myntra", "Myntra"),
                BrandConfig::new("paytm", "Paytm"),
                BrandConfig::new("amazon", "Amazon"),
                BrandConfig::new("phonepe", "PhonePe"),
            ],
        }
    }
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(VouchrError::Config {
                message: format!("Configuration file not found: {}", path.display()),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| VouchrError::Config {
            message: format!("Failed to read config file {}: {}", path.display(), e),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| VouchrError::Config {
            message: format!("Failed to parse config file {}: {}", path.display(), e),
        })?;

        tracing::debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    pub fn load_with_defaults<P: AsRef<Path>>(config_path: Option<P>) -> Result<Self> {
        match config_path {
            Some(path) => Self::load_from_file(path),
            None => {
                let default_paths = ["vouchr.toml", ".vouchr.toml"];

                for default_path in &default_paths {
                    if Path::new(default_path).exists() {
                        return Self::load_from_file(default_path);
                    }
                }

                Ok(Self::default())
            }
        }
    }

    pub fn merge_with_cli_args(&mut self, cli_args: &CliOverrides) {
        if let Some(ref save_url) = cli_args.save_url {
            self.endpoints.save_url = save_url.clone();
        }

        if let Some(ref list_url) = cli_args.list_url {
            self.endpoints.list_url = list_url.clone();
        }

        if let Some(timeout) = cli_args.timeout {
            self.endpoints.timeout = timeout;
        }

        if let Some(ref shared_via) = cli_args.default_shared_via {
            self.parser.default_shared_via = shared_via.clone();
        }
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self).map_err(|e| VouchrError::Config {
            message: format!("Failed to serialize config: {}", e),
        })?;

        std::fs::write(path, content).map_err(|e| VouchrError::Config {
            message: format!("Failed to write config file {}: {}", path.display(), e),
        })?;

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        validate_endpoint_url("save_url", &self.endpoints.save_url)?;
        validate_endpoint_url("list_url", &self.endpoints.list_url)?;

        if self.endpoints.timeout == 0 {
            return Err(VouchrError::Config {
                message: "Request timeout must be greater than 0".to_string(),
            });
        }

        if self.parser.default_shared_via.trim().is_empty() {
            return Err(VouchrError::Config {
                message: "default_shared_via must not be empty".to_string(),
            });
        }

        if self.parser.brands.is_empty() {
            return Err(VouchrError::Config {
                message: "At least one brand pattern must be specified".to_string(),
            });
        }

        for brand in &self.parser.brands {
            if let Err(e) = Regex::new(&brand.pattern) {
                return Err(VouchrError::Config {
                    message: format!("Brand pattern for '{}' does not compile: {}", brand.label, e),
                });
            }
        }

        Ok(())
    }
}

fn validate_endpoint_url(name: &str, value: &str) -> Result<()> {
    let url = Url::parse(value).map_err(|e| VouchrError::Config {
        message: format!("{} '{}' is not a valid URL: {}", name, value, e),
    })?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(VouchrError::Config {
            message: format!("{} must use http or https, got '{}'", name, url.scheme()),
        });
    }

    Ok(())
}

#[derive(Debug, Default)]
pub struct CliOverrides {
    pub save_url: Option<String>,
    pub list_url: Option<String>,
    pub timeout: Option<u64>,
    pub default_shared_via: Option<String>,
}

impl CliOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_save_url(mut self, save_url: Option<String>) -> Self {
        self.save_url = save_url;
        self
    }

    pub fn with_list_url(mut self, list_url: Option<String>) -> Self {
        self.list_url = list_url;
        self
    }

    pub fn with_timeout(mut self, timeout: Option<u64>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_default_shared_via(mut self, shared_via: Option<String>) -> Self {
        self.default_shared_via = shared_via;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.parser.brands.len(), 10);
        assert_eq!(config.parser.brands[0].label, "RummyCircle");
        assert_eq!(config.parser.default_shared_via, "Google Pay");
        assert_eq!(config.endpoints.timeout, 30);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();
        config.endpoints.save_url = "ftp://example.com/save".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.endpoints.list_url = "not a url".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.endpoints.timeout = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.parser.brands.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_brand_pattern_rejected() {
        let mut config = Config::default();
        config.parser.brands.push(BrandConfig::new("(broken", "Broken"));

        let error = config.validate().unwrap_err();
        assert!(error.to_string().contains("Broken"));
    }

    #[test]
    fn test_config_file_operations() {
        let mut config = Config::default();
        config.endpoints.timeout = 12;
        let temp_file = NamedTempFile::new().unwrap();

        config.save_to_file(temp_file.path()).unwrap();

        let loaded_config = Config::load_from_file(temp_file.path()).unwrap();
        assert_eq!(loaded_config.endpoints.timeout, 12);
        assert_eq!(loaded_config.parser.brands, config.parser.brands);
    }

    #[test]
    fn test_load_hand_written_config() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            r#"
[endpoints]
save_url = "https://api.example.com/save"
list_url = "https://api.example.com/list"
timeout = 5

[parser]
default_shared_via = "PhonePe"

[[parser.brands]]
pattern = "bigbasket"
label = "BigBasket"
"#
        )
        .unwrap();

        let config = Config::load_from_file(temp_file.path()).unwrap();
        assert_eq!(config.endpoints.list_url, "https://api.example.com/list");
        assert_eq!(config.parser.brands, vec![BrandConfig::new("bigbasket", "BigBasket")]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "[endpoints]\ntimeout = 9").unwrap();

        let config = Config::load_from_file(temp_file.path()).unwrap();
        assert_eq!(config.endpoints.timeout, 9);
        assert_eq!(config.endpoints.save_url, EndpointConfig::default().save_url);
        assert_eq!(config.parser.brands.len(), 10);
    }

    #[test]
    fn test_missing_config_file() {
        let result = Config::load_from_file("/definitely/not/here/vouchr.toml");
        assert!(matches!(result, Err(VouchrError::Config { .. })));
    }

    #[test]
    fn test_cli_overrides() {
        let mut config = Config::default();

        let overrides = CliOverrides::new()
            .with_timeout(Some(90))
            .with_save_url(Some("https://save.example.com/".to_string()))
            .with_default_shared_via(Some("Paytm".to_string()));

        config.merge_with_cli_args(&overrides);

        assert_eq!(config.endpoints.timeout, 90);
        assert_eq!(config.endpoints.save_url, "https://save.example.com/");
        assert_eq!(config.endpoints.list_url, EndpointConfig::default().list_url);
        assert_eq!(config.parser.default_shared_via, "Paytm");
    }

    #[test]
    fn test_sample_config_generation() {
        let temp_file = NamedTempFile::new().unwrap();
        Config::default().save_to_file(temp_file.path()).unwrap();

        let sample = std::fs::read_to_string(temp_file.path()).unwrap();
        assert!(sample.contains("[endpoints]"));
        assert!(sample.contains("[parser]"));
        assert!(sample.contains("[[parser.brands]]"));
        assert!(sample.contains("rummycircle"));
    }
}
