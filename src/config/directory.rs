//! Directory collaborator configuration

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::error::ValidationError;

/// Directory service configuration (referral counts, driver roles)
#[derive(Debug, Clone, Deserialize)]
pub struct DirectoryConfig {
    /// Base URL of the directory's internal API
    pub base_url: String,

    /// API key for the internal API
    pub api_key: SecretString,

    /// Request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl DirectoryConfig {
    /// Validate directory configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.base_url.is_empty() {
            return Err(ValidationError::MissingRequired("DIRECTORY__BASE_URL"));
        }
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ValidationError::InvalidDirectoryUrl);
        }
        if self.api_key.expose_secret().is_empty() {
            return Err(ValidationError::MissingRequired("DIRECTORY__API_KEY"));
        }
        Ok(())
    }
}

fn default_request_timeout() -> u64 {
    5
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(base_url: &str, api_key: &str) -> DirectoryConfig {
        DirectoryConfig {
            base_url: base_url.to_string(),
            api_key: SecretString::new(api_key.to_string()),
            request_timeout_secs: default_request_timeout(),
        }
    }

    #[test]
    fn test_validation_missing_base_url() {
        assert!(config("", "key").validate().is_err());
    }

    #[test]
    fn test_validation_non_http_url() {
        assert!(config("ftp://directory", "key").validate().is_err());
    }

    #[test]
    fn test_validation_missing_api_key() {
        assert!(config("http://directory", "").validate().is_err());
    }

    #[test]
    fn test_validation_valid_config() {
        assert!(config("https://directory.internal", "dir_key")
            .validate()
            .is_ok());
    }
}
