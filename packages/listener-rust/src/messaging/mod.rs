//! AMQP topic subscription: routing configuration, header conversion, and the
//! consume loop that feeds the dispatcher.

pub mod config;
pub mod headers;
pub mod listener;

pub use config::RoutingInfo;
pub use headers::headers_to_map;
pub use listener::{drive, InboundDelivery, ListenOutcome, ListenerError, TopicListener};
