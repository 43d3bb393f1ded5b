//! Command-line and environment configuration.

use std::fmt;
use std::net::SocketAddr;
use std::time::Duration;

use clap::Parser;

use crate::client::config::REDACTED;
use crate::client::ClientConfig;
use crate::config::{ClassifierKind, ListenerConfig};
use crate::messaging::RoutingInfo;
use crate::telemetry::LogFormat;

/// Listens for record change notifications and asks the records API to index
/// the changed records.
#[derive(Clone, Parser)]
#[command(name = "indexmessenger", version, about)]
pub struct ListenerArgs {
    /// Broker host.
    #[arg(long, env = "MESSAGING_HOSTNAME")]
    pub messaging_hostname: String,

    #[arg(long, env = "MESSAGING_PORT", default_value_t = 5672)]
    pub messaging_port: u16,

    #[arg(long, env = "MESSAGING_VIRTUAL_HOST", default_value = "/")]
    pub messaging_virtual_host: String,

    /// Topic exchange carrying change notifications.
    #[arg(long, env = "MESSAGING_EXCHANGE")]
    pub messaging_exchange: String,

    /// Binding key, e.g. `alvin.updates.#`.
    #[arg(long, env = "MESSAGING_ROUTING_KEY")]
    pub messaging_routing_key: String,

    /// Unacknowledged deliveries held at once.
    #[arg(long, env = "MESSAGING_PREFETCH", default_value_t = 1)]
    pub prefetch: u16,

    /// Record REST endpoint base, e.g. `https://host/alvin/rest/record/`.
    #[arg(long, env = "CORA_BASE_URL")]
    pub base_url: String,

    #[arg(long, env = "CORA_APP_TOKEN_VERIFIER_URL")]
    pub app_token_verifier_url: String,

    #[arg(long, env = "CORA_USER_ID")]
    pub user_id: String,

    #[arg(long, env = "CORA_APP_TOKEN", hide_env_values = true)]
    pub app_token: String,

    #[arg(long, env = "CORA_REQUEST_TIMEOUT_SECS", default_value_t = 30)]
    pub request_timeout_secs: u64,

    #[arg(long, env = "INDEXMESSENGER_CLASSIFIER", value_enum, default_value_t = ClassifierKind::Alvin)]
    pub classifier: ClassifierKind,

    #[arg(long, env = "INDEXMESSENGER_LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    /// Serve Prometheus metrics on this address when set.
    #[arg(long, env = "INDEXMESSENGER_METRICS_ADDR")]
    pub metrics_addr: Option<SocketAddr>,
}

impl ListenerArgs {
    #[must_use]
    pub fn to_config(&self) -> ListenerConfig {
        ListenerConfig {
            messaging: RoutingInfo {
                hostname: self.messaging_hostname.clone(),
                port: self.messaging_port,
                virtual_host: self.messaging_virtual_host.clone(),
                exchange: self.messaging_exchange.clone(),
                routing_key: self.messaging_routing_key.clone(),
                prefetch: self.prefetch,
            },
            client: ClientConfig {
                base_url: self.base_url.clone(),
                app_token_verifier_url: self.app_token_verifier_url.clone(),
                user_id: self.user_id.clone(),
                app_token: self.app_token.clone(),
                request_timeout: Duration::from_secs(self.request_timeout_secs),
            },
            classifier: self.classifier,
        }
    }
}

impl fmt::Debug for ListenerArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerArgs")
            .field("messaging_hostname", &self.messaging_hostname)
            .field("messaging_port", &self.messaging_port)
            .field("messaging_virtual_host", &self.messaging_virtual_host)
            .field("messaging_exchange", &self.messaging_exchange)
            .field("messaging_routing_key", &self.messaging_routing_key)
            .field("prefetch", &self.prefetch)
            .field("base_url", &self.base_url)
            .field("app_token_verifier_url", &self.app_token_verifier_url)
            .field("user_id", &self.user_id)
            .field("app_token", &REDACTED)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("classifier", &self.classifier)
            .field("log_format", &self.log_format)
            .field("metrics_addr", &self.metrics_addr)
            .finish()
    }
}
