use std::time::Duration;

pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 9000;
pub const DEFAULT_CONNECT_ATTEMPTS: u32 = 30;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeConfig {
    pub host: String,
    pub port: u16,
    /// Number of connect polls before giving up. One poll per `poll_interval`.
    pub connect_attempts: u32,
    pub poll_interval: Duration,
    /// How long to wait for the server greeting after the TCP connect succeeds.
    pub handshake_timeout: Duration,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            connect_attempts: DEFAULT_CONNECT_ATTEMPTS,
            poll_interval: Duration::from_secs(1),
            handshake_timeout: Duration::from_secs(5),
        }
    }
}

impl BridgeConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Self::default()
        }
    }

    pub fn from_env() -> Self {
        let host = std::env::var("UNREALCV_HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string());

        let port = std::env::var("UNREALCV_PORT")
            .ok()
            .and_then(|v| v.parse::<u16>().ok())
            .unwrap_or(DEFAULT_PORT);

        let connect_attempts = std::env::var("UNREALCV_CONNECT_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(DEFAULT_CONNECT_ATTEMPTS);

        Self {
            host,
            port,
            connect_attempts,
            ..Self::default()
        }
    }

    pub fn with_connect_attempts(mut self, attempts: u32) -> Self {
        self.connect_attempts = attempts;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_handshake_timeout(mut self, timeout: Duration) -> Self {
        self.handshake_timeout = timeout;
        self
    }

    pub fn endpoint(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = BridgeConfig::default();
        assert_eq!(config.host, "localhost");
        assert_eq!(config.port, 9000);
        assert_eq!(config.connect_attempts, 30);
        assert_eq!(config.poll_interval, Duration::from_secs(1));
        assert_eq!(config.endpoint(), "localhost:9000");
    }

    #[test]
    fn test_new_config() {
        let config = BridgeConfig::new("10.0.0.5", 9010);
        assert_eq!(config.endpoint(), "10.0.0.5:9010");
        assert_eq!(config.connect_attempts, DEFAULT_CONNECT_ATTEMPTS);
    }

    #[test]
    fn test_builder_overrides() {
        let config = BridgeConfig::default()
            .with_connect_attempts(3)
            .with_poll_interval(Duration::ZERO)
            .with_handshake_timeout(Duration::from_millis(250));
        assert_eq!(config.connect_attempts, 3);
        assert_eq!(config.poll_interval, Duration::ZERO);
        assert_eq!(config.handshake_timeout, Duration::from_millis(250));
    }

    // Both env cases live in one test so they cannot race each other.
    #[test]
    fn test_from_env() {
        std::env::remove_var("UNREALCV_HOST");
        std::env::remove_var("UNREALCV_PORT");
        std::env::remove_var("UNREALCV_CONNECT_TIMEOUT_SECS");

        let config = BridgeConfig::from_env();
        assert_eq!(config, BridgeConfig::default());

        std::env::set_var("UNREALCV_HOST", "game-box");
        std::env::set_var("UNREALCV_PORT", "9100");
        std::env::set_var("UNREALCV_CONNECT_TIMEOUT_SECS", "not-a-number");

        let config = BridgeConfig::from_env();
        assert_eq!(config.host, "game-box");
        assert_eq!(config.port, 9100);
        assert_eq!(config.connect_attempts, DEFAULT_CONNECT_ATTEMPTS);

        std::env::remove_var("UNREALCV_HOST");
        std::env::remove_var("UNREALCV_PORT");
        std::env::remove_var("UNREALCV_CONNECT_TIMEOUT_SECS");
    }
}
