//! Remote face-login verification.
//!
//! The validated descriptor is posted with the user's identifier to the
//! authentication server, which owns matching and session creation.

use crate::errors::{FaceCaptureError, Result};
use crate::types::FaceDescriptor;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Message used when the server rejects a login without saying why.
pub const DEFAULT_FAILURE_MESSAGE: &str = "Face login failed";

/// User record returned by a successful face login.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerifiedUser {
    #[serde(default, alias = "_id")]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Body of the face-login request.
#[derive(Debug, Serialize)]
pub struct FaceLoginRequest<'a> {
    pub email: &'a str,
    pub descriptor: &'a FaceDescriptor,
}

#[derive(Debug, Deserialize)]
struct FaceLoginResponse {
    #[serde(default)]
    user: Option<VerifiedUser>,
    #[serde(default)]
    message: Option<String>,
}

#[async_trait]
pub trait FaceVerifier: Send + Sync {
    async fn verify(&self, identifier: &str, descriptor: &FaceDescriptor) -> Result<Option<VerifiedUser>>;
}

/// Face-login client over HTTP.
#[derive(Debug, Clone)]
pub struct HttpFaceVerifier {
    client: reqwest::Client,
    endpoint: reqwest::Url,
}

impl HttpFaceVerifier {
    pub fn new(endpoint: &str, timeout: Option<Duration>) -> Result<Self> {
        let endpoint = reqwest::Url::parse(endpoint)
            .map_err(|e| FaceCaptureError::Config(format!("invalid verification endpoint '{}': {}", endpoint, e)))?;
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
            endpoint,
        })
    }

    pub fn endpoint(&self) -> &reqwest::Url {
        &self.endpoint
    }
}

/// Turn a status code and raw body into the login outcome.
pub fn interpret_response(status: reqwest::StatusCode, body: &[u8]) -> Result<Option<VerifiedUser>> {
    let parsed = serde_json::from_slice::<FaceLoginResponse>(body);

    if !status.is_success() {
        let message = parsed
            .ok()
            .and_then(|r| r.message)
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_FAILURE_MESSAGE.to_string());
        return Err(FaceCaptureError::RemoteVerificationFailed(message));
    }

    Ok(parsed?.user)
}

#[async_trait]
impl FaceVerifier for HttpFaceVerifier {
    async fn verify(&self, identifier: &str, descriptor: &FaceDescriptor) -> Result<Option<VerifiedUser>> {
        log::info!("Sending face descriptor ({} values) to {}", descriptor.len(), self.endpoint);

        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&FaceLoginRequest {
                email: identifier,
                descriptor,
            })
            .send()
            .await?;

        let status = response.status();
        let body = response.bytes().await?;
        log::debug!("Face login responded {} ({} bytes)", status, body.len());

        let outcome = interpret_response(status, &body);
        match &outcome {
            Ok(_) => log::info!("Face login accepted"),
            Err(e) => log::warn!("Face login rejected: {}", e),
        }
        outcome
    }
}
