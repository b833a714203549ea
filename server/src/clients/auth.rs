use crate::error::{AppError, Result};
use async_trait::async_trait;
use serde::Deserialize;

/// Identity asserted by the external auth provider for one request.
#[derive(Debug, Clone, Deserialize)]
pub struct ExternalIdentity {
    /// Provider-issued stable identifier
    pub id: String,
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub username: Option<String>,
    pub picture: Option<String>,
}

/// Verifies bearer tokens. The core never issues or decodes tokens itself.
#[async_trait]
pub trait AuthVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<ExternalIdentity>;
}

/// Verifier backed by the provider's token introspection endpoint.
pub struct RemoteAuthVerifier {
    http: reqwest::Client,
    verify_url: String,
}

impl RemoteAuthVerifier {
    pub fn new(verify_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            verify_url: verify_url.into(),
        }
    }
}

#[async_trait]
impl AuthVerifier for RemoteAuthVerifier {
    async fn verify(&self, token: &str) -> Result<ExternalIdentity> {
        let response = self
            .http
            .get(&self.verify_url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| AppError::Internal(format!("identity provider unreachable: {e}")))?;

        if !response.status().is_success() {
            return Err(AppError::Unauthenticated(
                "invalid or expired token".to_string(),
            ));
        }

        response
            .json::<ExternalIdentity>()
            .await
            .map_err(|e| AppError::Internal(format!("malformed identity response: {e}")))
    }
}
