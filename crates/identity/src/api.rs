//! REST client for the identity platform's organization endpoint.
//!
//! Wraps `POST /organizations` of the management API using [`reqwest`]
//! and classifies failures so the caller can tell conflicts (422) and
//! rate limits (429) apart from everything else.

use async_trait::async_trait;

use crate::organization::{CreatedOrganization, NewOrganization};
use crate::secret::SecretKey;

/// Default management API base URL.
pub const DEFAULT_API_URL: &str = "https://api.clerk.com/v1";

/// Status returned when the organization already exists.
pub const STATUS_CONFLICT: u16 = 422;

/// Status returned when the caller exceeds its request quota.
pub const STATUS_RATE_LIMITED: u16 = 429;

/// Errors from the identity platform REST layer.
#[derive(Debug, thiserror::Error)]
pub enum IdentityApiError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The platform returned a non-2xx status code.
    #[error("Identity API error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },
}

impl IdentityApiError {
    /// HTTP status, if the platform answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Request(e) => e.status().map(|s| s.as_u16()),
            Self::Api { status, .. } => Some(*status),
        }
    }

    pub fn is_conflict(&self) -> bool {
        self.status() == Some(STATUS_CONFLICT)
    }

    pub fn is_rate_limited(&self) -> bool {
        self.status() == Some(STATUS_RATE_LIMITED)
    }

    /// Error body for the failure log: parsed JSON when the platform sent
    /// JSON, otherwise the raw text.
    pub fn details(&self) -> Option<serde_json::Value> {
        match self {
            Self::Request(_) => None,
            Self::Api { body, .. } if body.is_empty() => None,
            Self::Api { body, .. } => Some(
                serde_json::from_str(body)
                    .unwrap_or_else(|_| serde_json::Value::String(body.clone())),
            ),
        }
    }
}

/// The one operation the migration needs from the identity platform.
#[async_trait]
pub trait OrganizationApi: Send + Sync {
    async fn create_organization(
        &self,
        organization: &NewOrganization,
    ) -> Result<CreatedOrganization, IdentityApiError>;
}

/// HTTP client for the management API of a single instance.
pub struct IdentityApi {
    client: reqwest::Client,
    api_url: String,
    secret_key: SecretKey,
}

impl IdentityApi {
    /// Create a new API client.
    ///
    /// * `api_url` - Base URL, e.g. `https://api.clerk.com/v1`.
    pub fn new(api_url: impl Into<String>, secret_key: SecretKey) -> Self {
        Self::with_client(reqwest::Client::new(), api_url, secret_key)
    }

    /// Create an API client reusing an existing [`reqwest::Client`].
    pub fn with_client(
        client: reqwest::Client,
        api_url: impl Into<String>,
        secret_key: SecretKey,
    ) -> Self {
        let api_url = api_url.into().trim_end_matches('/').to_string();
        Self {
            client,
            api_url,
            secret_key,
        }
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    // ---- private helpers ----

    /// Ensure the response has a success status code. Returns the
    /// response unchanged on success, or an [`IdentityApiError::Api`]
    /// containing the status and body text on failure.
    async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, IdentityApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(IdentityApiError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    /// Decode a successful create response. The organization already
    /// exists at this point, so an unreadable or unexpected body only
    /// loses the logged details.
    async fn decode_created(response: reqwest::Response) -> CreatedOrganization {
        let body = match response.bytes().await {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!(error = %e, "Could not read create response body");
                return CreatedOrganization::default();
            }
        };
        serde_json::from_slice(&body).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Unexpected create response body");
            CreatedOrganization::default()
        })
    }
}

#[async_trait]
impl OrganizationApi for IdentityApi {
    /// Sends a `POST /organizations` request and decodes the created
    /// organization.
    async fn create_organization(
        &self,
        organization: &NewOrganization,
    ) -> Result<CreatedOrganization, IdentityApiError> {
        tracing::debug!(name = %organization.name, "Creating organization");

        let response = self
            .client
            .post(format!("{}/organizations", self.api_url))
            .bearer_auth(self.secret_key.expose())
            .json(organization)
            .send()
            .await?;

        let response = Self::ensure_success(response).await?;
        Ok(Self::decode_created(response).await)
    }
}
