//! `IndexMessenger` Core — change-message classification, the downstream record
//! data format, and index work orders.

pub mod classify;
pub mod data;
pub mod message;
#[cfg(any(test, feature = "test-util"))]
pub mod testing;
pub mod work_order;

pub use classify::{AlvinMessageClassifier, Classification, IndexTarget, MessageClassifier, SkipReason};
pub use data::{DataAtomic, DataElement, DataGroup};
pub use message::InboundMessage;
pub use work_order::{WorkOrder, WORK_ORDER_RECORD_TYPE};

#[cfg(test)]
mod tests {
    #[test]
    fn crate_loads() {
        // Empty body: if this test runs, the crate compiles and loads.
    }
}
