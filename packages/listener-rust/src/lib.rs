//! `IndexMessenger` Listener — subscribes to record change notifications on an
//! AMQP topic and creates index work orders through the records REST API.

pub mod bootstrap;
pub mod cli;
pub mod client;
pub mod config;
pub mod dispatch;
pub mod messaging;
pub mod shutdown;
pub mod telemetry;
pub mod traits;

pub use bootstrap::ListenerBootstrap;
pub use cli::ListenerArgs;
pub use client::{ClientConfig, ClientError, HttpRecordClient};
pub use config::{ClassifierKind, ConfigError, ListenerConfig};
pub use dispatch::{DispatchOutcome, IndexRequestDispatcher};
pub use messaging::{ListenOutcome, ListenerError, RoutingInfo, TopicListener};
pub use shutdown::ShutdownController;
pub use traits::{MessageReceiver, RecordClient};
