//! Persistent CLI configuration.
//!
//! A YAML file in the platform configuration directory holds the API and
//! auth endpoints, the project/region scope and the credentials (permanent
//! API key, or an access/refresh token pair). Environment variables
//! override the stored credentials so CI jobs never need a config file.

use crate::client::Credentials;
use crate::format::{format_output, CsvRecordProducer, Formattable, FormattingError, OutputFormat};
use dirs::config_dir;
use serde::{Deserialize, Serialize};
use std::{
    fs::{self, File},
    io::Write,
    path::PathBuf,
};
use tracing::debug;

pub const DEFAULT_APPLICATION_ID: &str = "nimbuscli";
pub const DEFAULT_CONFIGURATION_FILE_NAME: &str = "config.yml";
pub const DEFAULT_API_URL: &str = "https://api.nimbuscloud.io/";
pub const DEFAULT_AUTH_URL: &str = "https://api.nimbuscloud.io/iam";

pub const ENV_CONFIG_DIR: &str = "NIMBUSCLI_CONFIG_DIR";
pub const ENV_API_KEY: &str = "NIMBUSCLI_API_KEY";
pub const ENV_ACCESS_TOKEN: &str = "NIMBUSCLI_ACCESS_TOKEN";
pub const ENV_REFRESH_TOKEN: &str = "NIMBUSCLI_REFRESH_TOKEN";

#[derive(Debug, thiserror::Error)]
pub enum ConfigurationError {
    #[error("failed to resolve the configuration directory")]
    FailedToFindConfigurationDirectory,
    #[error("failed to load configuration data, because of: {cause:?}")]
    FailedToLoadData { cause: Box<dyn std::error::Error> },
    #[error("failed to write configuration data to file, because of: {cause:?}")]
    FailedToWriteData { cause: Box<dyn std::error::Error> },
    #[error("missing value for property {name:?}")]
    MissingRequiredPropertyValue { name: String },
    #[error("{cause:?}")]
    FormattingError {
        #[from]
        cause: FormattingError,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Configuration {
    #[serde(skip_serializing_if = "Option::is_none")]
    api_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    auth_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    project: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    region: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    access_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    refresh_token: Option<String>,
}

impl Configuration {
    pub fn get_default_configuration_file_path() -> Result<PathBuf, ConfigurationError> {
        // Environment variable wins over the platform directory.
        if let Ok(config_dir_str) = std::env::var(ENV_CONFIG_DIR) {
            let mut config_path = PathBuf::from(config_dir_str);
            config_path.push(DEFAULT_CONFIGURATION_FILE_NAME);
            return Ok(config_path);
        }

        match config_dir() {
            Some(configuration_directory) => {
                let mut default_config_file_path = configuration_directory;
                default_config_file_path.push(DEFAULT_APPLICATION_ID);
                default_config_file_path.push(DEFAULT_CONFIGURATION_FILE_NAME);
                Ok(default_config_file_path)
            }
            None => Err(ConfigurationError::FailedToFindConfigurationDirectory),
        }
    }

    pub fn load_default() -> Result<Configuration, ConfigurationError> {
        let default_file_path = Configuration::get_default_configuration_file_path()?;
        debug!("loading configuration from {}", default_file_path.display());
        let mut configuration = Configuration::load_from_file(default_file_path)?;
        configuration.apply_env_overrides();
        Ok(configuration)
    }

    /// Load the default configuration, creating an empty one if the file
    /// does not exist yet.
    pub fn load_or_create_default() -> Result<Configuration, ConfigurationError> {
        let default_file_path = Configuration::get_default_configuration_file_path()?;
        match Configuration::load_from_file(default_file_path.clone()) {
            Ok(mut configuration) => {
                configuration.apply_env_overrides();
                Ok(configuration)
            }
            Err(ConfigurationError::FailedToLoadData { cause })
                if cause
                    .downcast_ref::<std::io::Error>()
                    .map(|io| io.kind() == std::io::ErrorKind::NotFound)
                    .unwrap_or(false) =>
            {
                debug!("configuration file not found, creating a default one");
                let mut configuration = Configuration::default();
                configuration.save(&default_file_path)?;
                configuration.apply_env_overrides();
                Ok(configuration)
            }
            Err(e) => Err(e),
        }
    }

    pub fn load_from_file(path: PathBuf) -> Result<Configuration, ConfigurationError> {
        let raw = fs::read_to_string(path)
            .map_err(|cause| ConfigurationError::FailedToLoadData {
                cause: Box::new(cause),
            })?;
        serde_yaml::from_str(&raw).map_err(|cause| ConfigurationError::FailedToLoadData {
            cause: Box::new(cause),
        })
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(key) = std::env::var(ENV_API_KEY) {
            self.api_key = Some(key);
        }
        if let Ok(token) = std::env::var(ENV_ACCESS_TOKEN) {
            self.access_token = Some(token);
        }
        if let Ok(token) = std::env::var(ENV_REFRESH_TOKEN) {
            self.refresh_token = Some(token);
        }
    }

    pub fn write(&self, writer: Box<dyn Write>) -> Result<(), ConfigurationError> {
        serde_yaml::to_writer(writer, self)
            .map_err(|e| ConfigurationError::FailedToWriteData { cause: Box::new(e) })
    }

    pub fn save(&self, path: &PathBuf) -> Result<(), ConfigurationError> {
        match path.parent() {
            Some(parent) => fs::create_dir_all(parent)
                .map_err(|_| ConfigurationError::FailedToFindConfigurationDirectory)?,
            None => return Err(ConfigurationError::FailedToFindConfigurationDirectory),
        }

        let file = File::create(path)
            .map_err(|e| ConfigurationError::FailedToWriteData { cause: Box::new(e) })?;
        self.write(Box::new(file))
    }

    pub fn save_to_default(&self) -> Result<(), ConfigurationError> {
        self.save(&Self::get_default_configuration_file_path()?)
    }

    pub fn api_url(&self) -> &str {
        self.api_url.as_deref().unwrap_or(DEFAULT_API_URL)
    }

    pub fn auth_url(&self) -> &str {
        self.auth_url.as_deref().unwrap_or(DEFAULT_AUTH_URL)
    }

    pub fn set_api_url(&mut self, url: impl Into<String>) {
        self.api_url = Some(url.into());
    }

    pub fn set_auth_url(&mut self, url: impl Into<String>) {
        self.auth_url = Some(url.into());
    }

    pub fn project(&self) -> Result<u64, ConfigurationError> {
        self.project
            .ok_or_else(|| ConfigurationError::MissingRequiredPropertyValue {
                name: "project".to_string(),
            })
    }

    pub fn region(&self) -> Result<u64, ConfigurationError> {
        self.region
            .ok_or_else(|| ConfigurationError::MissingRequiredPropertyValue {
                name: "region".to_string(),
            })
    }

    pub fn set_project(&mut self, project: u64) {
        self.project = Some(project);
    }

    pub fn set_region(&mut self, region: u64) {
        self.region = Some(region);
    }

    /// Resolve the configured credentials. A permanent API key takes
    /// precedence over a token pair.
    pub fn credentials(&self) -> Result<Credentials, ConfigurationError> {
        if let Some(key) = &self.api_key {
            return Ok(Credentials::ApiKey { key: key.clone() });
        }
        match (&self.access_token, &self.refresh_token) {
            (Some(access), Some(refresh)) => Ok(Credentials::Token {
                access_token: access.clone(),
                refresh_token: refresh.clone(),
            }),
            _ => Err(ConfigurationError::MissingRequiredPropertyValue {
                name: "api_key or access_token/refresh_token".to_string(),
            }),
        }
    }

    pub fn set_api_key(&mut self, key: impl Into<String>) {
        self.api_key = Some(key.into());
    }

    /// Store a refreshed token pair, e.g. after a successful
    /// reauthentication.
    pub fn set_tokens(&mut self, access: impl Into<String>, refresh: impl Into<String>) {
        self.access_token = Some(access.into());
        self.refresh_token = Some(refresh.into());
    }
}

impl CsvRecordProducer for Configuration {
    fn csv_header() -> Vec<String> {
        vec![
            "API_URL".to_string(),
            "AUTH_URL".to_string(),
            "PROJECT".to_string(),
            "REGION".to_string(),
        ]
    }

    fn as_csv_records(&self) -> Vec<Vec<String>> {
        vec![vec![
            self.api_url().to_string(),
            self.auth_url().to_string(),
            self.project.map(|p| p.to_string()).unwrap_or_default(),
            self.region.map(|r| r.to_string()).unwrap_or_default(),
        ]]
    }
}

impl Formattable for Configuration {
    fn format(&self, f: &OutputFormat) -> Result<String, FormattingError> {
        format_output(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.yml");

        let mut configuration = Configuration::default();
        configuration.set_api_url("https://api.example.test/");
        configuration.set_project(1234);
        configuration.set_region(7);
        configuration.set_api_key("secret-key");
        configuration.save(&path).unwrap();

        let loaded = Configuration::load_from_file(path).unwrap();
        assert_eq!(loaded, configuration);
        assert_eq!(loaded.api_url(), "https://api.example.test/");
        assert_eq!(loaded.project().unwrap(), 1234);
        assert_eq!(loaded.region().unwrap(), 7);
    }

    #[test]
    fn test_api_key_takes_precedence_over_tokens() {
        let mut configuration = Configuration::default();
        configuration.set_tokens("access", "refresh");
        configuration.set_api_key("key");
        assert!(matches!(
            configuration.credentials().unwrap(),
            Credentials::ApiKey { .. }
        ));
    }

    #[test]
    fn test_missing_credentials_is_an_error() {
        let configuration = Configuration::default();
        assert!(matches!(
            configuration.credentials(),
            Err(ConfigurationError::MissingRequiredPropertyValue { .. })
        ));
    }

    #[test]
    fn test_defaults_apply_when_unset() {
        let configuration = Configuration::default();
        assert_eq!(configuration.api_url(), DEFAULT_API_URL);
        assert_eq!(configuration.auth_url(), DEFAULT_AUTH_URL);
        assert!(configuration.project().is_err());
    }
}
