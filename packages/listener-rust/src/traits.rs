use async_trait::async_trait;
use indexmessenger_core::{InboundMessage, WorkOrder};

/// Write access to the downstream records API.
/// Implementations: HTTP (`HttpRecordClient`), spies (tests).
#[async_trait]
pub trait RecordClient: Send + Sync {
    /// Create a record of `record_type` from the given work order document.
    /// Any failure is reported as an opaque error; callers only need to know
    /// whether the record was created.
    async fn create(&self, record_type: &str, document: WorkOrder) -> anyhow::Result<()>;
}

/// Consumer side of a topic subscription.
/// The listener hands every delivery to `receive_message` and reports the end
/// of the subscription through `topic_closed`.
#[async_trait]
pub trait MessageReceiver: Send + Sync {
    /// Handle one delivery. Must not fail: outcomes are logged, not returned.
    async fn receive_message(&self, message: InboundMessage);

    /// The subscription has ended. Called at most once.
    fn topic_closed(&self);
}
