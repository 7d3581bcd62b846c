// crates/chat-client/src/config.rs

use std::time::Duration;

pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 3410;

/// Settings for one client run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub username: String,
    pub server_addr: String,
    pub poll_interval: Duration,
}

impl ClientConfig {
    pub fn new(username: &str, host: &str, poll_interval: Duration) -> Self {
        Self {
            username: username.to_string(),
            server_addr: resolve_address(host),
            poll_interval,
        }
    }
}

/// Turn a loose `--host` value into a `host:port` string.
///
/// - `""`          → `localhost:3410`
/// - `":4000"`     → `localhost:4000`
/// - `"host:4000"` → as given
/// - `"host"`      → `host:3410`
pub fn resolve_address(host: &str) -> String {
    let host = host.trim();

    if host.is_empty() {
        format!("{}:{}", DEFAULT_HOST, DEFAULT_PORT)
    } else if let Some(port) = host.strip_prefix(':') {
        format!("{}:{}", DEFAULT_HOST, port)
    } else if host.contains(':') {
        host.to_string()
    } else {
        format!("{}:{}", host, DEFAULT_PORT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_host_forms() {
        assert_eq!(resolve_address(""), "localhost:3410");
        assert_eq!(resolve_address(":4000"), "localhost:4000");
        assert_eq!(resolve_address("chat.example:4000"), "chat.example:4000");
        assert_eq!(resolve_address("chat.example"), "chat.example:3410");
        assert_eq!(resolve_address("  10.0.0.2 "), "10.0.0.2:3410");
    }

    #[test]
    fn config_resolves_host() {
        let config = ClientConfig::new("fred", ":5000", Duration::from_millis(250));
        assert_eq!(config.server_addr, "localhost:5000");
        assert_eq!(config.username, "fred");
    }
}
