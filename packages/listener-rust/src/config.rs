//! Process-level configuration for the listener.

use std::sync::Arc;

use indexmessenger_core::{AlvinMessageClassifier, MessageClassifier};
use reqwest::Url;

use crate::client::ClientConfig;
use crate::messaging::RoutingInfo;

/// Which classifier the process runs with. Selected once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ClassifierKind {
    /// Change notifications from Alvin Classic.
    #[default]
    Alvin,
}

impl ClassifierKind {
    #[must_use]
    pub fn build(self) -> Arc<dyn MessageClassifier> {
        match self {
            Self::Alvin => Arc::new(AlvinMessageClassifier::new()),
        }
    }
}

/// Everything needed to wire one listener process.
#[derive(Debug, Clone, Default)]
pub struct ListenerConfig {
    pub messaging: RoutingInfo,
    pub client: ClientConfig,
    pub classifier: ClassifierKind,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("property {0} must not be empty")]
    Empty(&'static str),
    #[error("property {name} is not a valid url: {reason}")]
    InvalidUrl { name: &'static str, reason: String },
}

impl ListenerConfig {
    /// Checks required values before any connection is attempted.
    ///
    /// # Errors
    ///
    /// Returns the first empty required property or unparsable URL.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let required = [
            ("messaging.hostname", &self.messaging.hostname),
            ("messaging.exchange", &self.messaging.exchange),
            ("messaging.routingKey", &self.messaging.routing_key),
            ("userId", &self.client.user_id),
            ("appToken", &self.client.app_token),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(ConfigError::Empty(name));
            }
        }
        check_url("baseUrl", &self.client.base_url)?;
        check_url("appTokenVerifierUrl", &self.client.app_token_verifier_url)?;
        Ok(())
    }
}

fn check_url(name: &'static str, url: &str) -> Result<(), ConfigError> {
    Url::parse(url)
        .map(|_| ())
        .map_err(|e| ConfigError::InvalidUrl {
            name,
            reason: e.to_string(),
        })
}
