//! Downstream records API configuration.

use std::fmt;
use std::time::Duration;

/// Printed in place of secrets by `Debug` impls.
pub(crate) const REDACTED: &str = "<redacted>";

/// Where and as whom the records API is called.
#[derive(Clone)]
pub struct ClientConfig {
    /// Base URL of the record REST endpoint, e.g. `https://host/alvin/rest/record/`.
    pub base_url: String,
    /// Base URL of the app token verifier, e.g. `https://host/apptokenverifier/`.
    pub app_token_verifier_url: String,
    /// User the app token belongs to.
    pub user_id: String,
    pub app_token: String,
    /// Upper bound for a single HTTP request.
    pub request_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            app_token_verifier_url: String::new(),
            user_id: String::new(),
            app_token: String::new(),
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("app_token_verifier_url", &self.app_token_verifier_url)
            .field("user_id", &self.user_id)
            .field("app_token", &REDACTED)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

/// Appends a trailing `/` so relative paths join below the base, not beside it.
pub(crate) fn with_trailing_slash(url: &str) -> String {
    if url.ends_with('/') {
        url.to_string()
    } else {
        format!("{url}/")
    }
}
