//! HTTP client for the marketplace directory service.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::time::Duration;

use crate::config::DirectoryConfig;
use crate::domain::foundation::DriverId;
use crate::ports::{CollaboratorError, EligibilityChecker, ReferralSource};

/// Client for the directory's internal API.
///
/// Serves both collaborator ports: the referral total and the role check
/// come from the same service.
pub struct DirectoryApiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: SecretString,
}

#[derive(Debug, Deserialize)]
struct ReferralSummaryResponse {
    referral_total: u32,
}

#[derive(Debug, Deserialize)]
struct RoleResponse {
    is_driver: bool,
}

impl DirectoryApiClient {
    /// Build a client from configuration.
    pub fn new(config: &DirectoryConfig) -> Result<Self, CollaboratorError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| CollaboratorError::Unavailable(format!("client build failed: {}", e)))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<T, CollaboratorError> {
        let response = self
            .http
            .get(format!("{}{}", self.base_url, path))
            .bearer_auth(self.api_key.expose_secret())
            .send()
            .await
            .map_err(|e| CollaboratorError::Unavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(CollaboratorError::InvalidResponse(format!(
                "directory returned {} for {}",
                response.status(),
                path
            )));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| CollaboratorError::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl ReferralSource for DirectoryApiClient {
    async fn referral_total(&self, driver_id: &DriverId) -> Result<u32, CollaboratorError> {
        let summary: ReferralSummaryResponse = self
            .get_json(&format!("/internal/drivers/{}/referrals", driver_id))
            .await?;
        Ok(summary.referral_total)
    }
}

#[async_trait]
impl EligibilityChecker for DirectoryApiClient {
    async fn is_eligible(&self, driver_id: &DriverId) -> Result<bool, CollaboratorError> {
        let role: RoleResponse = self
            .get_json(&format!("/internal/drivers/{}/role", driver_id))
            .await?;
        Ok(role.is_driver)
    }
}
