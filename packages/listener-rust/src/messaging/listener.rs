//! Topic subscription: consumes deliveries and hands them to a
//! [`MessageReceiver`] one at a time.

use std::fmt::Display;
use std::sync::Arc;

use async_trait::async_trait;
use futures_util::{Stream, StreamExt};
use indexmessenger_core::InboundMessage;
use lapin::message::Delivery;
use lapin::options::{
    BasicAckOptions, BasicConsumeOptions, BasicQosOptions, QueueBindOptions, QueueDeclareOptions,
};
use lapin::types::FieldTable;
use lapin::{Connection, ConnectionProperties};
use tracing::{info, warn};
use uuid::Uuid;

use super::config::RoutingInfo;
use super::headers::headers_to_map;
use crate::shutdown::ShutdownController;
use crate::traits::MessageReceiver;

/// Counter of deliveries taken off the queue.
pub const DELIVERIES_TOTAL: &str = "indexmessenger_deliveries_total";

/// Counter of deliveries whose acknowledgement failed.
pub const ACK_FAILURES_TOTAL: &str = "indexmessenger_ack_failures_total";

/// Why consuming stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenOutcome {
    /// The broker ended the subscription.
    TopicClosed,
    /// A local shutdown was requested.
    Shutdown,
}

/// Errors while setting up the subscription.
#[derive(Debug, thiserror::Error)]
pub enum ListenerError {
    #[error("failed to connect to {uri}: {source}")]
    Connect {
        uri: String,
        #[source]
        source: lapin::Error,
    },
    #[error("failed to open channel: {0}")]
    Channel(#[source] lapin::Error),
    #[error("failed to subscribe to exchange '{exchange}' with routing key '{routing_key}': {source}")]
    Subscribe {
        exchange: String,
        routing_key: String,
        #[source]
        source: lapin::Error,
    },
}

// ---------------------------------------------------------------------------
// InboundDelivery
// ---------------------------------------------------------------------------

/// A broker delivery that can be read as an [`InboundMessage`] and acknowledged.
#[async_trait]
pub trait InboundDelivery: Send {
    fn to_message(&self) -> InboundMessage;

    async fn ack(self) -> anyhow::Result<()>;
}

#[async_trait]
impl InboundDelivery for Delivery {
    fn to_message(&self) -> InboundMessage {
        InboundMessage::new(
            headers_to_map(self.properties.headers().as_ref()),
            String::from_utf8_lossy(&self.data).into_owned(),
        )
    }

    async fn ack(self) -> anyhow::Result<()> {
        self.acker.ack(BasicAckOptions::default()).await?;
        Ok(())
    }
}

/// Dispatches deliveries until the stream ends, fails, or shutdown is triggered.
///
/// Each delivery is dispatched and then acknowledged, whatever the dispatch
/// outcome. Shutdown is checked between deliveries only, so the delivery in
/// hand always completes. End of stream and stream errors both close the topic: the
/// receiver's `topic_closed` is called exactly once. Shutdown returns without
/// calling it.
pub async fn drive<S, D, E>(
    deliveries: S,
    receiver: &dyn MessageReceiver,
    shutdown: &ShutdownController,
) -> ListenOutcome
where
    S: Stream<Item = Result<D, E>>,
    D: InboundDelivery,
    E: Display,
{
    let mut deliveries = std::pin::pin!(deliveries);
    let mut stop = shutdown.shutdown_receiver();
    if *stop.borrow() {
        return ListenOutcome::Shutdown;
    }

    loop {
        let next = tokio::select! {
            biased;
            _ = stop.changed() => return ListenOutcome::Shutdown,
            next = deliveries.next() => next,
        };

        match next {
            Some(Ok(delivery)) => {
                metrics::counter!(DELIVERIES_TOTAL).increment(1);
                receiver.receive_message(delivery.to_message()).await;
                if let Err(err) = delivery.ack().await {
                    metrics::counter!(ACK_FAILURES_TOTAL).increment(1);
                    warn!(error = %err, "failed to acknowledge delivery");
                }
            }
            Some(Err(err)) => {
                warn!(error = %err, "consumer stream failed");
                receiver.topic_closed();
                return ListenOutcome::TopicClosed;
            }
            None => {
                receiver.topic_closed();
                return ListenOutcome::TopicClosed;
            }
        }
    }
}

// ---------------------------------------------------------------------------
// TopicListener
// ---------------------------------------------------------------------------

/// Subscribes a private, auto-deleted queue to the configured topic exchange.
pub struct TopicListener {
    routing: RoutingInfo,
    shutdown: Arc<ShutdownController>,
}

impl TopicListener {
    #[must_use]
    pub fn new(routing: RoutingInfo, shutdown: Arc<ShutdownController>) -> Self {
        Self { routing, shutdown }
    }

    #[must_use]
    pub fn routing(&self) -> &RoutingInfo {
        &self.routing
    }

    /// Connects, subscribes and dispatches deliveries to `receiver` until the
    /// topic closes or shutdown is triggered.
    ///
    /// # Errors
    ///
    /// Returns `ListenerError` if the connection, channel or subscription
    /// cannot be set up. Failures after that end as `ListenOutcome::TopicClosed`.
    pub async fn listen(
        &self,
        receiver: Arc<dyn MessageReceiver>,
    ) -> Result<ListenOutcome, ListenerError> {
        let uri = self.routing.amqp_uri();
        let connection = Connection::connect(&uri, ConnectionProperties::default())
            .await
            .map_err(|source| ListenerError::Connect {
                uri: uri.clone(),
                source,
            })?;
        let channel = connection
            .create_channel()
            .await
            .map_err(ListenerError::Channel)?;
        channel
            .basic_qos(self.routing.prefetch, BasicQosOptions::default())
            .await
            .map_err(ListenerError::Channel)?;

        let subscribe_error = |source| ListenerError::Subscribe {
            exchange: self.routing.exchange.clone(),
            routing_key: self.routing.routing_key.clone(),
            source,
        };
        let queue = channel
            .queue_declare(
                "",
                QueueDeclareOptions {
                    exclusive: true,
                    auto_delete: true,
                    ..QueueDeclareOptions::default()
                },
                FieldTable::default(),
            )
            .await
            .map_err(subscribe_error)?;
        channel
            .queue_bind(
                queue.name().as_str(),
                &self.routing.exchange,
                &self.routing.routing_key,
                QueueBindOptions::default(),
                FieldTable::default(),
            )
            .await
            .map_err(subscribe_error)?;
        let consumer_tag = format!("indexmessenger-{}", Uuid::new_v4());
        let consumer = channel
            .basic_consume(
                queue.name().as_str(),
                &consumer_tag,
                BasicConsumeOptions::default(),
                FieldTable::default(),
            )
            .await
            .map_err(subscribe_error)?;

        info!(
            host = %self.routing.hostname,
            exchange = %self.routing.exchange,
            routing_key = %self.routing.routing_key,
            queue = %queue.name().as_str(),
            "Subscribed to topic"
        );
        let outcome = drive(consumer, receiver.as_ref(), &self.shutdown).await;

        if outcome == ListenOutcome::Shutdown {
            // Best effort; the broker drops the exclusive queue either way.
            let _ = channel.close(200, "shutting down").await;
            let _ = connection.close(200, "shutting down").await;
        }
        Ok(outcome)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
