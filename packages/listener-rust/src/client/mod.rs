//! Downstream records API client.

pub mod config;
pub mod http;

pub use config::ClientConfig;
pub use http::{ClientError, HttpRecordClient};
