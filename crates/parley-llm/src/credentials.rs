// Request authentication for Azure endpoints.
//
// Two modes exist: a static api-key header, or a bearer token obtained from
// the instance metadata service when running with a managed identity. The
// mode is selected once at construction, never per call.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use reqwest::header::{HeaderName, HeaderValue, AUTHORIZATION};
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::error::{LlmError, Result};

/// Token audience for Azure OpenAI / AI Inference endpoints.
pub const COGNITIVE_SERVICES_RESOURCE: &str = "https://cognitiveservices.azure.com";

/// Token audience for Azure Blob Storage.
pub const STORAGE_RESOURCE: &str = "https://storage.azure.com";

const IMDS_TOKEN_URL: &str = "http://169.254.169.254/metadata/identity/oauth2/token";
const IMDS_API_VERSION: &str = "2018-02-01";

/// Authentication capability applied to each outbound request.
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    /// Header pair to attach to the request.
    async fn auth_header(&self) -> Result<(HeaderName, HeaderValue)>;
}

/// Static key credential, sent as `api-key: <key>`.
pub struct ApiKeyCredential {
    value: HeaderValue,
}

impl ApiKeyCredential {
    pub fn new(key: &str) -> Result<Self> {
        let mut value = HeaderValue::from_str(key).map_err(|_| {
            LlmError::Configuration("API key contains invalid header characters".to_string())
        })?;
        value.set_sensitive(true);
        Ok(Self { value })
    }
}

#[async_trait]
impl CredentialProvider for ApiKeyCredential {
    async fn auth_header(&self) -> Result<(HeaderName, HeaderValue)> {
        Ok((HeaderName::from_static("api-key"), self.value.clone()))
    }
}

#[derive(Debug, Deserialize)]
struct ImdsTokenResponse {
    access_token: String,
    // Unix seconds, delivered as a string.
    expires_on: String,
}

struct CachedToken {
    value: HeaderValue,
    expires_at: DateTime<Utc>,
}

/// Managed-identity credential backed by the Azure instance metadata service.
///
/// Tokens are cached and re-fetched shortly before expiry; the audience
/// (`resource`) is fixed at construction.
pub struct ManagedIdentityCredential {
    http: reqwest::Client,
    resource: String,
    cached: Mutex<Option<CachedToken>>,
}

impl ManagedIdentityCredential {
    pub fn new(resource: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            resource: resource.into(),
            cached: Mutex::new(None),
        }
    }

    async fn fetch_token(&self) -> Result<CachedToken> {
        let response = self
            .http
            .get(IMDS_TOKEN_URL)
            .query(&[
                ("api-version", IMDS_API_VERSION),
                ("resource", self.resource.as_str()),
            ])
            .header("Metadata", "true")
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Credential(format!(
                "token endpoint returned {}: {}",
                status, body
            )));
        }

        let token: ImdsTokenResponse = response
            .json()
            .await
            .map_err(|e| LlmError::Credential(format!("invalid token response: {}", e)))?;

        let expires_secs: i64 = token
            .expires_on
            .parse()
            .map_err(|_| LlmError::Credential("non-numeric expires_on in token response".to_string()))?;
        let expires_at = DateTime::from_timestamp(expires_secs, 0)
            .ok_or_else(|| LlmError::Credential("out-of-range expires_on in token response".to_string()))?;

        let mut value = HeaderValue::from_str(&format!("Bearer {}", token.access_token))
            .map_err(|_| LlmError::Credential("token contains invalid header characters".to_string()))?;
        value.set_sensitive(true);

        Ok(CachedToken { value, expires_at })
    }
}

#[async_trait]
impl CredentialProvider for ManagedIdentityCredential {
    async fn auth_header(&self) -> Result<(HeaderName, HeaderValue)> {
        let mut cached = self.cached.lock().await;

        // Refresh when within two minutes of expiry.
        let fresh = cached
            .as_ref()
            .filter(|t| t.expires_at - Utc::now() > Duration::minutes(2));
        if let Some(token) = fresh {
            return Ok((AUTHORIZATION, token.value.clone()));
        }

        tracing::debug!(resource = %self.resource, "fetching managed identity token");
        let token = self.fetch_token().await?;
        let value = token.value.clone();
        *cached = Some(token);
        Ok((AUTHORIZATION, value))
    }
}

/// Select the credential mode once, from configuration.
///
/// An absent (or empty) key selects managed identity; a present key can
/// still be overridden by the `use_managed_identity` flag.
pub fn select_credential(
    api_key: Option<&str>,
    use_managed_identity: bool,
    resource: &str,
) -> Result<Arc<dyn CredentialProvider>> {
    match api_key {
        Some(key) if !key.is_empty() && !use_managed_identity => {
            Ok(Arc::new(ApiKeyCredential::new(key)?))
        }
        _ => Ok(Arc::new(ManagedIdentityCredential::new(resource))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_api_key_header() {
        let credential = ApiKeyCredential::new("secret-key").unwrap();
        let (name, value) = credential.auth_header().await.unwrap();
        assert_eq!(name.as_str(), "api-key");
        assert_eq!(value.to_str().unwrap(), "secret-key");
    }

    #[test]
    fn test_api_key_rejects_control_characters() {
        assert!(ApiKeyCredential::new("bad\nkey").is_err());
    }

    #[tokio::test]
    async fn test_select_credential_prefers_key() {
        let credential =
            select_credential(Some("secret"), false, COGNITIVE_SERVICES_RESOURCE).unwrap();
        let (name, _) = credential.auth_header().await.unwrap();
        assert_eq!(name.as_str(), "api-key");
    }
}
