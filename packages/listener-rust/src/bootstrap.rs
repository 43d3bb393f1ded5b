//! Process wiring: configuration -> records client -> dispatcher -> listener.

use std::sync::Arc;

use anyhow::Context;
use tracing::info;

use crate::client::HttpRecordClient;
use crate::config::ListenerConfig;
use crate::dispatch::IndexRequestDispatcher;
use crate::messaging::{ListenOutcome, TopicListener};
use crate::shutdown::ShutdownController;

/// Builds the single dispatcher of the process and runs the topic listener
/// with it.
pub struct ListenerBootstrap {
    config: ListenerConfig,
    shutdown: Arc<ShutdownController>,
}

impl ListenerBootstrap {
    #[must_use]
    pub fn new(config: ListenerConfig) -> Self {
        Self {
            config,
            shutdown: Arc::new(ShutdownController::new()),
        }
    }

    #[must_use]
    pub fn config(&self) -> &ListenerConfig {
        &self.config
    }

    /// Handle used by the binary to trigger shutdown.
    #[must_use]
    pub fn shutdown_controller(&self) -> Arc<ShutdownController> {
        Arc::clone(&self.shutdown)
    }

    /// Validates the configuration and assembles the dispatcher.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the HTTP client
    /// cannot be built.
    pub fn build_dispatcher(&self) -> anyhow::Result<IndexRequestDispatcher> {
        self.config.validate().context("invalid configuration")?;
        let client = HttpRecordClient::new(&self.config.client)
            .context("failed to build records client")?;
        let classifier = self.config.classifier.build();
        Ok(IndexRequestDispatcher::new(Arc::new(client), classifier))
    }

    /// Builds the dispatcher and consumes until the topic closes or shutdown
    /// is triggered.
    ///
    /// # Errors
    ///
    /// Returns an error if the dispatcher cannot be built or the subscription
    /// cannot be set up.
    pub async fn run(&self) -> anyhow::Result<ListenOutcome> {
        let dispatcher = Arc::new(self.build_dispatcher()?);
        if self.shutdown.is_shutting_down() {
            return Ok(ListenOutcome::Shutdown);
        }
        let listener = TopicListener::new(self.config.messaging.clone(), self.shutdown_controller());
        info!(
            classifier = ?self.config.classifier,
            base_url = %self.config.client.base_url,
            "Starting IndexMessenger"
        );
        let outcome = listener
            .listen(dispatcher)
            .await
            .context("failed to subscribe to topic")?;
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use crate::client::ClientConfig;
    use crate::config::ClassifierKind;
    use crate::messaging::RoutingInfo;

    use super::*;

    fn config() -> ListenerConfig {
        ListenerConfig {
            messaging: RoutingInfo {
                hostname: "localhost".to_string(),
                port: 1,
                exchange: "index".to_string(),
                routing_key: "alvin.updates.#".to_string(),
                ..RoutingInfo::default()
            },
            client: ClientConfig {
                base_url: "http://localhost:8080/alvin/rest/record/".to_string(),
                app_token_verifier_url: "http://localhost:8180/apptokenverifier/".to_string(),
                user_id: "141414".to_string(),
                app_token: "secret".to_string(),
                ..ClientConfig::default()
            },
            classifier: ClassifierKind::Alvin,
        }
    }

    #[test]
    fn builds_dispatcher_from_valid_config() {
        let bootstrap = ListenerBootstrap::new(config());
        assert!(bootstrap.build_dispatcher().is_ok());
    }

    #[test]
    fn invalid_config_fails_before_connecting() {
        let mut config = config();
        config.client.user_id = String::new();
        let bootstrap = ListenerBootstrap::new(config);

        let err = bootstrap.build_dispatcher().unwrap_err();
        assert!(format!("{err:#}").contains("userId"));
    }

    #[tokio::test]
    async fn run_reports_unreachable_broker() {
        // Port 1 is never an AMQP broker.
        let bootstrap = ListenerBootstrap::new(config());

        let err = bootstrap.run().await.unwrap_err();

        assert!(format!("{err:#}").contains("failed to subscribe to topic"));
        assert!(!bootstrap.shutdown_controller().is_shutting_down());
    }

    #[tokio::test]
    async fn shutdown_before_subscribe_skips_connecting() {
        // Port 1 would fail the connect if it were attempted.
        let bootstrap = ListenerBootstrap::new(config());
        bootstrap.shutdown_controller().trigger_shutdown();

        let outcome = bootstrap.run().await.unwrap();

        assert_eq!(outcome, ListenOutcome::Shutdown);
    }

    #[test]
    fn shutdown_controller_is_shared() {
        let bootstrap = ListenerBootstrap::new(config());
        bootstrap.shutdown_controller().trigger_shutdown();
        assert!(bootstrap.shutdown_controller().is_shutting_down());
    }
}
