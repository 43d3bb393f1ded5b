//! Index request dispatch: classify -> build work order -> create downstream.
//!
//! The dispatcher holds no mutable state. Each `on_message` call is an
//! independent unit of work and all failures end as a log entry.

use std::sync::Arc;

use async_trait::async_trait;
use indexmessenger_core::{
    Classification, InboundMessage, IndexTarget, MessageClassifier, SkipReason, WorkOrder,
    WORK_ORDER_RECORD_TYPE,
};
use tracing::{error, info};

use crate::traits::{MessageReceiver, RecordClient};

/// Counter incremented once per handled message, labelled by outcome.
pub const MESSAGES_TOTAL: &str = "indexmessenger_messages_total";

/// What happened to one message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Work order created downstream.
    Created { record_type: String, record_id: String },
    /// Downstream create call failed; the message is dropped.
    Failed { record_type: String, record_id: String },
    /// No work order was attempted.
    Skipped(SkipReason),
}

impl DispatchOutcome {
    /// Metric label for this outcome.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Created { .. } => "created",
            Self::Failed { .. } => "failed",
            Self::Skipped(reason) => reason.label(),
        }
    }
}

/// Turns classified change messages into downstream work order creations.
pub struct IndexRequestDispatcher {
    client: Arc<dyn RecordClient>,
    classifier: Arc<dyn MessageClassifier>,
}

impl IndexRequestDispatcher {
    #[must_use]
    pub fn new(client: Arc<dyn RecordClient>, classifier: Arc<dyn MessageClassifier>) -> Self {
        Self { client, classifier }
    }

    /// Handle one message. Never fails; the returned outcome is informational.
    pub async fn on_message(&self, message: &InboundMessage) -> DispatchOutcome {
        let outcome = match self.classifier.classify(message) {
            Classification::Skip(reason) => DispatchOutcome::Skipped(reason),
            Classification::Indexable(target) => self.create_work_order(target).await,
        };
        metrics::counter!(MESSAGES_TOTAL, "outcome" => outcome.label()).increment(1);
        outcome
    }

    async fn create_work_order(&self, target: IndexTarget) -> DispatchOutcome {
        let work_order = WorkOrder::build(target.clone());
        let (record_type, record_id) = target.into_parts();

        match self.client.create(WORK_ORDER_RECORD_TYPE, work_order).await {
            Ok(()) => {
                info!(
                    record_type = %record_type,
                    record_id = %record_id,
                    "Index workOrder created for type: {record_type} and id: {record_id}"
                );
                DispatchOutcome::Created {
                    record_type,
                    record_id,
                }
            }
            Err(err) => {
                let cause = format!("{err:#}");
                error!(
                    record_type = %record_type,
                    record_id = %record_id,
                    error = %cause,
                    "Index workOrder NOT created for type: {record_type} and id: {record_id}"
                );
                DispatchOutcome::Failed {
                    record_type,
                    record_id,
                }
            }
        }
    }

    /// The subscription ended. Logged as fatal; restart policy lives outside
    /// this process.
    pub fn on_topic_closed(&self) {
        error!(fatal = true, "Topic closed!");
    }
}

impl std::fmt::Debug for IndexRequestDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexRequestDispatcher").finish_non_exhaustive()
    }
}

#[async_trait]
impl MessageReceiver for IndexRequestDispatcher {
    async fn receive_message(&self, message: InboundMessage) {
        self.on_message(&message).await;
    }

    fn topic_closed(&self) {
        self.on_topic_closed();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
