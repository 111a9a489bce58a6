use std::{fmt::Display, str::FromStr};
use shuttle_runtime::SecretStore;
use tracing::{info, warn};

use crate::moderation::{DEFAULT_PERSPECTIVE_URL, DEFAULT_TOXICITY_THRESHOLD};
use crate::store::DEFAULT_MAX_ATTEMPTS;

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub perspective_api_key: Option<String>,
    pub perspective_url: String,
    pub toxicity_threshold: f64,
    pub vote_max_attempts: u32,
    pub create_poll_limit: u32,
    pub create_poll_window_minutes: i64,
    pub allowed_origin: String,
}

impl Config {
    pub fn from_secrets(secrets: &SecretStore) -> Self {
        Self::from_lookup(|key| secrets.get(key))
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let perspective_api_key = lookup("PERSPECTIVE_API_KEY").filter(|key| !key.trim().is_empty());
        if perspective_api_key.is_none() {
            warn!("PERSPECTIVE_API_KEY not found - falling back to local word-list moderation");
        }

        Self {
            perspective_api_key,
            perspective_url: try_load(&lookup, "PERSPECTIVE_URL", DEFAULT_PERSPECTIVE_URL.to_string()),
            toxicity_threshold: try_load(&lookup, "TOXICITY_THRESHOLD", DEFAULT_TOXICITY_THRESHOLD),
            vote_max_attempts: try_load(&lookup, "VOTE_MAX_ATTEMPTS", DEFAULT_MAX_ATTEMPTS).max(1),
            create_poll_limit: try_load(&lookup, "CREATE_POLL_LIMIT", 1),
            create_poll_window_minutes: try_load(&lookup, "CREATE_POLL_WINDOW_MINUTES", 1),
            allowed_origin: try_load(&lookup, "ALLOWED_ORIGIN", "http://localhost".to_string()),
        }
    }
}

fn try_load<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T
where
    T: FromStr + Display,
    T::Err: Display,
{
    let Some(raw) = lookup(key) else {
        info!("{key} not set, using default: {default}");
        return default;
    };

    raw.trim().parse().unwrap_or_else(|e| {
        warn!("Invalid {key} value {raw:?}: {e}; using default: {default}");
        default
    })
}
