use std::sync::Arc;
use futures::future::join_all;
use rustrict::CensorStr;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, warn};

pub const DEFAULT_PERSPECTIVE_URL: &str = "https://commentanalyzer.googleapis.com/v1alpha1/comments:analyze";
pub const DEFAULT_TOXICITY_THRESHOLD: f64 = 0.5;

#[derive(Debug, Error)]
pub enum ModerationError {
    #[error("Moderation request failed: {0}")]
    Network(String),
    #[error("Moderation service returned status {0}")]
    Status(u16),
    #[error("Unexpected moderation response format")]
    MalformedResponse,
}

/// Scores free text for toxicity in `[0, 1]`.
#[rocket::async_trait]
pub trait Moderator: Send + Sync {
    async fn toxicity(&self, text: &str) -> Result<f64, ModerationError>;
}

pub struct PerspectiveModerator {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl PerspectiveModerator {
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
            api_key: api_key.into(),
        }
    }
}

pub(crate) fn parse_toxicity(body: &Value) -> Result<f64, ModerationError> {
    body.pointer("/attributeScores/TOXICITY/summaryScore/value")
        .and_then(Value::as_f64)
        .ok_or(ModerationError::MalformedResponse)
}

#[rocket::async_trait]
impl Moderator for PerspectiveModerator {
    async fn toxicity(&self, text: &str) -> Result<f64, ModerationError> {
        let body = json!({
            "comment": { "text": text },
            "languages": ["en"],
            "requestedAttributes": { "TOXICITY": {} },
        });

        let response = self.client
            .post(&self.endpoint)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(|e| ModerationError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ModerationError::Status(response.status().as_u16()));
        }

        let payload: Value = response.json()
            .await
            .map_err(|_| ModerationError::MalformedResponse)?;
        parse_toxicity(&payload)
    }
}

/// Offline word-list check for deployments without an API key.
pub struct LocalModerator;

#[rocket::async_trait]
impl Moderator for LocalModerator {
    async fn toxicity(&self, text: &str) -> Result<f64, ModerationError> {
        Ok(if text.is_inappropriate() { 1.0 } else { 0.0 })
    }
}

/// Turns scores into accept/reject decisions.
///
/// Text scoring at or above the threshold is rejected. When the moderator
/// cannot produce a score the text is accepted.
#[derive(Clone)]
pub struct ModerationGate {
    moderator: Arc<dyn Moderator>,
    threshold: f64,
}

impl ModerationGate {
    pub fn new(moderator: Arc<dyn Moderator>, threshold: f64) -> Self {
        Self { moderator, threshold }
    }

    pub async fn is_acceptable(&self, text: &str) -> bool {
        match self.moderator.toxicity(text).await {
            Ok(score) => {
                debug!(score, "Toxicity scored");
                score < self.threshold
            }
            Err(e) => {
                warn!("Moderation unavailable, accepting text: {}", e);
                true
            }
        }
    }

    /// Checks every non-blank field concurrently and names the first rejected one.
    pub async fn first_rejected(&self, fields: &[(String, &str)]) -> Option<String> {
        let checks = fields.iter()
            .filter(|(_, text)| !text.trim().is_empty())
            .map(|(name, text)| async move { (name, self.is_acceptable(text).await) });

        join_all(checks).await
            .into_iter()
            .find(|(_, accepted)| !accepted)
            .map(|(name, _)| name.clone())
    }
}
