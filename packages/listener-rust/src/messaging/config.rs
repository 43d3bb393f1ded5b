//! Broker routing configuration.

/// Where the change-notification topic lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutingInfo {
    pub hostname: String,
    pub port: u16,
    pub virtual_host: String,
    /// Topic exchange the legacy system publishes to.
    pub exchange: String,
    /// Binding key for the subscription queue, e.g. `alvin.updates.#`.
    pub routing_key: String,
    /// Maximum unacknowledged deliveries held by this consumer.
    pub prefetch: u16,
}

impl Default for RoutingInfo {
    fn default() -> Self {
        Self {
            hostname: "localhost".to_string(),
            port: 5672,
            virtual_host: "/".to_string(),
            exchange: String::new(),
            routing_key: "#".to_string(),
            prefetch: 1,
        }
    }
}

impl RoutingInfo {
    /// AMQP URI for this host and virtual host. The virtual host is a single
    /// path segment, so `/` and `%` inside it are percent-encoded.
    #[must_use]
    pub fn amqp_uri(&self) -> String {
        let vhost = self.virtual_host.replace('%', "%25").replace('/', "%2f");
        format!("amqp://{}:{}/{}", self.hostname, self.port, vhost)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn routing_info_defaults() {
        let routing = RoutingInfo::default();
        assert_eq!(routing.port, 5672);
        assert_eq!(routing.virtual_host, "/");
        assert_eq!(routing.prefetch, 1);
    }

    #[test]
    fn default_vhost_is_encoded() {
        let routing = RoutingInfo {
            hostname: "messaging.alvin-portal.org".to_string(),
            ..RoutingInfo::default()
        };
        assert_eq!(routing.amqp_uri(), "amqp://messaging.alvin-portal.org:5672/%2f");
    }

    #[test]
    fn named_vhost_is_kept() {
        let routing = RoutingInfo {
            hostname: "localhost".to_string(),
            port: 5673,
            virtual_host: "alvin".to_string(),
            ..RoutingInfo::default()
        };
        assert_eq!(routing.amqp_uri(), "amqp://localhost:5673/alvin");
    }
}
