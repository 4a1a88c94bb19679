//! HTTP gateways: blob storage and payment provider

use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;

use crate::domain::repository::{BlobStore, PaymentProvider};
use crate::error::{AccountError, AccountResult};

const BLOB_SERVICE: &str = "blob store";
const PAYMENT_SERVICE: &str = "payment provider";

fn map_transport(service: &'static str, err: reqwest::Error) -> AccountError {
    if err.is_connect() || err.is_timeout() {
        AccountError::unavailable(service, err)
    } else {
        AccountError::upstream(service, err)
    }
}

fn map_status(service: &'static str, status: StatusCode) -> AccountError {
    if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
        AccountError::unavailable(service, status)
    } else {
        AccountError::upstream(service, status)
    }
}

// ============================================================================
// Blob store
// ============================================================================

/// Blob storage over a plain PUT/DELETE object API
///
/// Objects are written to `{api_url}/{key}` and served from
/// `{public_url}/{key}`.
#[derive(Clone)]
pub struct HttpBlobStore {
    client: Client,
    api_url: String,
    public_url: String,
}

impl HttpBlobStore {
    pub fn new(client: Client, api_url: impl Into<String>, public_url: impl Into<String>) -> Self {
        Self {
            client,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            public_url: public_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Object key of a public URL we issued
    fn key_of<'a>(&self, url: &'a str) -> Option<&'a str> {
        url.strip_prefix(&self.public_url)?
            .strip_prefix('/')
            .filter(|key| !key.is_empty())
    }
}

impl BlobStore for HttpBlobStore {
    async fn upload(&self, key: &str, content_type: &str, bytes: Vec<u8>) -> AccountResult<String> {
        let response = self
            .client
            .put(format!("{}/{}", self.api_url, key))
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await
            .map_err(|e| map_transport(BLOB_SERVICE, e))?;

        if !response.status().is_success() {
            return Err(map_status(BLOB_SERVICE, response.status()));
        }

        Ok(format!("{}/{}", self.public_url, key))
    }

    async fn delete(&self, url: &str) -> AccountResult<()> {
        let Some(key) = self.key_of(url) else {
            // External URL (e.g. an imported avatar): nothing stored by us
            tracing::debug!(url = %url, "Skipping blob outside our storage");
            return Ok(());
        };

        let response = self
            .client
            .delete(format!("{}/{}", self.api_url, key))
            .send()
            .await
            .map_err(|e| map_transport(BLOB_SERVICE, e))?;

        match response.status() {
            status if status.is_success() => Ok(()),
            StatusCode::NOT_FOUND => Ok(()),
            status => Err(map_status(BLOB_SERVICE, status)),
        }
    }
}

// ============================================================================
// Payment provider
// ============================================================================

#[derive(Deserialize)]
struct CreatedObject {
    id: String,
}

/// Payment provider REST client
#[derive(Clone)]
pub struct HttpPaymentProvider {
    client: Client,
    api_url: String,
    api_key: String,
}

impl HttpPaymentProvider {
    pub fn new(client: Client, api_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    async fn create(&self, path: &str, body: serde_json::Value) -> AccountResult<String> {
        let response = self
            .client
            .post(format!("{}/{}", self.api_url, path))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| map_transport(PAYMENT_SERVICE, e))?;

        if !response.status().is_success() {
            return Err(map_status(PAYMENT_SERVICE, response.status()));
        }

        let created: CreatedObject = response
            .json()
            .await
            .map_err(|e| AccountError::upstream(PAYMENT_SERVICE, e))?;
        Ok(created.id)
    }
}

impl PaymentProvider for HttpPaymentProvider {
    async fn create_customer(&self, email: &str) -> AccountResult<String> {
        self.create("customers", json!({ "email": email })).await
    }

    async fn create_card(&self, card_token: &str, customer_id: &str) -> AccountResult<String> {
        self.create(
            &format!("customers/{customer_id}/cards"),
            json!({ "token": card_token }),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_of_public_url() {
        let store = HttpBlobStore::new(Client::new(), "http://blob-api/", "https://cdn.example/media/");

        assert_eq!(
            store.key_of("https://cdn.example/media/pictures/a.png"),
            Some("pictures/a.png")
        );
        assert_eq!(store.key_of("https://elsewhere.example/a.png"), None);
        assert_eq!(store.key_of("https://cdn.example/media/"), None);
        assert_eq!(store.key_of("https://cdn.example/mediax/a.png"), None);
    }

    #[test]
    fn test_status_mapping() {
        assert!(matches!(
            map_status(BLOB_SERVICE, StatusCode::SERVICE_UNAVAILABLE),
            AccountError::UpstreamUnavailable { .. }
        ));
        assert!(matches!(
            map_status(PAYMENT_SERVICE, StatusCode::PAYMENT_REQUIRED),
            AccountError::Upstream { .. }
        ));
    }
}
