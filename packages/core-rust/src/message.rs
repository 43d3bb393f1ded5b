//! Inbound broker message as seen by the classification pipeline.

use std::collections::HashMap;

/// Header naming the system that published the message.
pub const MESSAGE_SENT_FROM_HEADER: &str = "messageSentFrom";

/// Header carrying the id of the changed record.
pub const PID_HEADER: &str = "PID";

/// `messageSentFrom` value marking an echo of the downstream system's own write.
pub const SELF_ORIGIN: &str = "Cora";

/// One delivery from the change-notification topic.
///
/// Header keys are case-sensitive. The body is kept raw: only a single quoted
/// token inside it is ever inspected, so it does not need to be valid JSON.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InboundMessage {
    pub headers: HashMap<String, String>,
    pub body: String,
}

impl InboundMessage {
    #[must_use]
    pub fn new(headers: HashMap<String, String>, body: impl Into<String>) -> Self {
        Self {
            headers,
            body: body.into(),
        }
    }

    /// Returns the value of a header, if present.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }

    /// Builder-style helper used mostly by tests and adapters.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_lookup_is_case_sensitive() {
        let msg = InboundMessage::default().with_header(PID_HEADER, "alvin-place:1");
        assert_eq!(msg.header("PID"), Some("alvin-place:1"));
        assert_eq!(msg.header("pid"), None);
    }

    #[test]
    fn with_header_overwrites_existing_value() {
        let msg = InboundMessage::default()
            .with_header(MESSAGE_SENT_FROM_HEADER, "Classic")
            .with_header(MESSAGE_SENT_FROM_HEADER, SELF_ORIGIN);
        assert_eq!(msg.header(MESSAGE_SENT_FROM_HEADER), Some("Cora"));
        assert_eq!(msg.headers.len(), 1);
    }
}
