//! Index work orders: the document asking the downstream system to (re)index
//! one record.

use serde::{Serialize, Serializer};

use crate::classify::IndexTarget;
use crate::data::{DataAtomic, DataGroup};

/// Record type under which work orders are created downstream.
pub const WORK_ORDER_RECORD_TYPE: &str = "workOrder";

/// The only work order kind this system produces.
pub const INDEX_WORK_ORDER_KIND: &str = "index";

const TYPE: &str = "type";
const RECORD_TYPE: &str = "recordType";
const RECORD_ID: &str = "recordId";

/// An `index` work order for a single record.
///
/// Only constructible from an [`IndexTarget`], so both identifiers are
/// non-empty. Serializes as the downstream data group:
///
/// ```text
/// workOrder
/// ├── type = "index"
/// ├── recordType -> link(recordType, <record type>)
/// └── recordId = <record id>
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkOrder {
    target: IndexTarget,
}

impl WorkOrder {
    #[must_use]
    pub fn build(target: IndexTarget) -> Self {
        Self { target }
    }

    #[must_use]
    pub fn kind(&self) -> &'static str {
        INDEX_WORK_ORDER_KIND
    }

    #[must_use]
    pub fn record_type(&self) -> &str {
        self.target.record_type()
    }

    #[must_use]
    pub fn record_id(&self) -> &str {
        self.target.record_id()
    }

    #[must_use]
    pub fn to_data_group(&self) -> DataGroup {
        DataGroup::new(WORK_ORDER_RECORD_TYPE)
            .with_child(DataAtomic::new(TYPE, INDEX_WORK_ORDER_KIND))
            .with_child(DataGroup::link(RECORD_TYPE, RECORD_TYPE, self.record_type()))
            .with_child(DataAtomic::new(RECORD_ID, self.record_id()))
    }
}

impl From<IndexTarget> for WorkOrder {
    fn from(target: IndexTarget) -> Self {
        Self::build(target)
    }
}

impl Serialize for WorkOrder {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_data_group().serialize(serializer)
    }
}
