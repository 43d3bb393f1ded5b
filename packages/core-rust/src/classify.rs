//! Message classification: decides whether an inbound change notification
//! should produce an index work order, and for which record.

use std::sync::LazyLock;

use regex::Regex;
use tracing::error;

use crate::message::{InboundMessage, MESSAGE_SENT_FROM_HEADER, PID_HEADER, SELF_ORIGIN};

/// First quoted `alvin.updates.<type>` token in the body; group 1 is the type.
static RECORD_TYPE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""alvin\.updates\.(\S*?)""#).expect("record type pattern is valid")
});

// ---------------------------------------------------------------------------
// Classification result
// ---------------------------------------------------------------------------

/// The record a work order should be created for.
///
/// Both parts are non-empty; [`IndexTarget::new`] refuses empty input.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IndexTarget {
    record_type: String,
    record_id: String,
}

impl IndexTarget {
    /// Returns `None` when either part is empty.
    #[must_use]
    pub fn new(record_type: impl Into<String>, record_id: impl Into<String>) -> Option<Self> {
        let record_type = record_type.into();
        let record_id = record_id.into();
        if record_type.is_empty() || record_id.is_empty() {
            return None;
        }
        Some(Self {
            record_type,
            record_id,
        })
    }

    #[must_use]
    pub fn record_type(&self) -> &str {
        &self.record_type
    }

    #[must_use]
    pub fn record_id(&self) -> &str {
        &self.record_id
    }

    /// Splits into `(record_type, record_id)`.
    #[must_use]
    pub fn into_parts(self) -> (String, String) {
        (self.record_type, self.record_id)
    }
}

/// Why a message does not lead to a work order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, thiserror::Error)]
pub enum SkipReason {
    /// Echo of the downstream system's own write.
    #[error("self-originated")]
    SelfOriginated,
    #[error("No pid found in header")]
    MissingPid,
    #[error("No recordType found")]
    MissingRecordType,
}

impl SkipReason {
    /// Stable snake_case label, used for metrics.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::SelfOriginated => "self_originated",
            Self::MissingPid => "missing_pid",
            Self::MissingRecordType => "missing_record_type",
        }
    }

    /// Malformed input, as opposed to an expected skip.
    #[must_use]
    pub fn is_error(self) -> bool {
        !matches!(self, Self::SelfOriginated)
    }
}

/// Outcome of classifying one message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    Indexable(IndexTarget),
    Skip(SkipReason),
}

impl Classification {
    #[must_use]
    pub fn is_indexable(&self) -> bool {
        matches!(self, Self::Indexable(_))
    }
}

// ---------------------------------------------------------------------------
// MessageClassifier
// ---------------------------------------------------------------------------

/// Turns an inbound message into a [`Classification`].
///
/// Implementations must be pure: classifying the same message twice yields the
/// same result, and no failure escapes as a panic or error.
pub trait MessageClassifier: Send + Sync {
    fn classify(&self, message: &InboundMessage) -> Classification;
}

/// Classifier for change notifications published by the Alvin Classic system.
///
/// The record id comes from the `PID` header, the record type from the
/// `alvin.updates.<type>` routing token embedded in the body. Messages whose
/// `messageSentFrom` header is `Cora` are echoes and are skipped silently.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlvinMessageClassifier;

impl AlvinMessageClassifier {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn is_self_originated(message: &InboundMessage) -> bool {
        message.header(MESSAGE_SENT_FROM_HEADER) == Some(SELF_ORIGIN)
    }

    fn extract_record_id(message: &InboundMessage) -> Result<&str, SkipReason> {
        message
            .header(PID_HEADER)
            .filter(|pid| !pid.is_empty())
            .ok_or(SkipReason::MissingPid)
    }

    fn extract_record_type(body: &str) -> Result<&str, SkipReason> {
        RECORD_TYPE_PATTERN
            .captures(body)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
            .filter(|record_type| !record_type.is_empty())
            .ok_or(SkipReason::MissingRecordType)
    }

    fn try_classify(message: &InboundMessage) -> Result<IndexTarget, SkipReason> {
        let record_id = Self::extract_record_id(message)?;
        let record_type = Self::extract_record_type(&message.body)?;
        IndexTarget::new(record_type, record_id).ok_or(SkipReason::MissingRecordType)
    }
}

impl MessageClassifier for AlvinMessageClassifier {
    fn classify(&self, message: &InboundMessage) -> Classification {
        if Self::is_self_originated(message) {
            return Classification::Skip(SkipReason::SelfOriginated);
        }
        match Self::try_classify(message) {
            Ok(target) => Classification::Indexable(target),
            Err(reason) => {
                error!("{reason}");
                Classification::Skip(reason)
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
