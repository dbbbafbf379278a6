// Azure Blob Storage backend (HTTP direct, no SDK)
//
// Objects live at https://{account}.blob.core.windows.net/{container}/{key}.
// Authorization is a bearer token from a CredentialProvider scoped to the
// storage resource; account-key request signing is not supported.

use async_trait::async_trait;
use reqwest::StatusCode;
use std::sync::Arc;

use parley_llm::CredentialProvider;

use super::BlobStore;
use crate::error::{PersistError, Result};

const STORAGE_API_VERSION: &str = "2021-08-06";

pub struct AzureBlobStore {
    http: reqwest::Client,
    base_url: String,
    credential: Arc<dyn CredentialProvider>,
}

impl AzureBlobStore {
    /// Point the store at one container of one storage account.
    pub fn new(
        account: impl AsRef<str>,
        container: impl AsRef<str>,
        credential: Arc<dyn CredentialProvider>,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: format!(
                "https://{}.blob.core.windows.net/{}",
                account.as_ref(),
                container.as_ref()
            ),
            credential,
        }
    }

    fn blob_url(&self, key: &str) -> String {
        format!("{}/{}", self.base_url, key.trim_start_matches('/'))
    }

    async fn request(&self, method: reqwest::Method, key: &str) -> Result<reqwest::RequestBuilder> {
        let (header_name, header_value) = self.credential.auth_header().await?;
        Ok(self
            .http
            .request(method, self.blob_url(key))
            .header(header_name, header_value)
            .header("x-ms-version", STORAGE_API_VERSION))
    }
}

#[async_trait]
impl BlobStore for AzureBlobStore {
    async fn read(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let response = self
            .request(reqwest::Method::GET, key)
            .await?
            .send()
            .await
            .map_err(|e| PersistError::Storage(e.to_string()))?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => {
                let bytes = response
                    .bytes()
                    .await
                    .map_err(|e| PersistError::Storage(e.to_string()))?;
                Ok(Some(bytes.to_vec()))
            }
            status => Err(PersistError::Storage(format!(
                "GET {} returned {}",
                key, status
            ))),
        }
    }

    async fn write(&self, key: &str, data: &[u8]) -> Result<()> {
        let response = self
            .request(reqwest::Method::PUT, key)
            .await?
            .header("x-ms-blob-type", "BlockBlob")
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(data.to_vec())
            .send()
            .await
            .map_err(|e| PersistError::Storage(e.to_string()))?;

        if !response.status().is_success() {
            return Err(PersistError::Storage(format!(
                "PUT {} returned {}",
                key,
                response.status()
            )));
        }
        tracing::debug!(key, bytes = data.len(), "wrote blob");
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let response = self
            .request(reqwest::Method::DELETE, key)
            .await?
            .send()
            .await
            .map_err(|e| PersistError::Storage(e.to_string()))?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(()),
            status if status.is_success() => Ok(()),
            status => Err(PersistError::Storage(format!(
                "DELETE {} returned {}",
                key, status
            ))),
        }
    }
}
