//! Environment and socket configuration

use std::time::Duration;
use thiserror::Error;

pub const ENV_API_ROOT: &str = "REFRACTOR_API_ROOT";
pub const ENV_KRATOS_ROOT: &str = "REFRACTOR_KRATOS_ROOT";
pub const ENV_WS_ROOT: &str = "REFRACTOR_WS_ROOT";
pub const ENV_SESSION_COOKIE: &str = "REFRACTOR_SESSION_COOKIE";

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(&'static str),

    #[error("invalid url for {name}: {value}")]
    InvalidUrl { name: &'static str, value: String },
}

/// Backend endpoints the console talks to
///
/// All three roots are supplied externally; nothing here is derived from
/// another root.
#[derive(Debug, Clone)]
pub struct EnvConfig {
    /// REST API root, e.g. "https://refractor.example.com/api/v1"
    pub api_root: String,

    /// Identity provider root, e.g. "https://refractor.example.com/kp"
    pub kratos_root: String,

    /// WebSocket endpoint, e.g. "wss://refractor.example.com/ws"
    pub ws_root: String,

    /// Raw `Cookie` header value carrying the session, for non-browser use
    pub session_cookie: Option<String>,
}

impl EnvConfig {
    pub fn new(
        api_root: impl Into<String>,
        kratos_root: impl Into<String>,
        ws_root: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            api_root: normalize_root(ENV_API_ROOT, api_root.into(), &["http://", "https://"])?,
            kratos_root: normalize_root(
                ENV_KRATOS_ROOT,
                kratos_root.into(),
                &["http://", "https://"],
            )?,
            ws_root: normalize_root(ENV_WS_ROOT, ws_root.into(), &["ws://", "wss://"])?,
            session_cookie: None,
        })
    }

    /// Attach a session cookie sent with every REST and socket request
    pub fn session_cookie(mut self, cookie: impl Into<String>) -> Self {
        self.session_cookie = Some(cookie.into());
        self
    }
}

fn normalize_root(
    name: &'static str,
    value: String,
    schemes: &[&str],
) -> Result<String, ConfigError> {
    let trimmed = value.trim().trim_end_matches('/');
    let valid = schemes
        .iter()
        .any(|scheme| trimmed.len() > scheme.len() && trimmed.starts_with(scheme));

    if !valid {
        return Err(ConfigError::InvalidUrl { name, value });
    }

    Ok(trimmed.to_string())
}

/// Tuning for the live-update socket
#[derive(Debug, Clone)]
pub struct SocketConfig {
    /// Whether to reconnect after an unexpected closure
    pub auto_reconnect: bool,

    /// Delay before the first reconnect attempt
    pub reconnect_delay: Duration,

    /// Upper bound on the reconnect delay
    pub max_reconnect_delay: Duration,

    /// Growth factor applied to the delay after each failed attempt
    pub backoff_factor: f64,

    /// Interval between keepalive pings
    pub ping_interval: Duration,

    /// Timeout for the WebSocket handshake
    pub connect_timeout: Duration,

    /// Cookie sent with the upgrade request
    pub session_cookie: Option<String>,
}

impl Default for SocketConfig {
    fn default() -> Self {
        Self {
            auto_reconnect: true,
            reconnect_delay: Duration::from_secs(1),
            max_reconnect_delay: Duration::from_secs(30),
            backoff_factor: 1.2,
            ping_interval: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            session_cookie: None,
        }
    }
}

impl SocketConfig {
    /// Disable automatic reconnection
    pub fn no_reconnect(mut self) -> Self {
        self.auto_reconnect = false;
        self
    }

    /// Set the reconnection delay range
    pub fn reconnect_delay(mut self, initial: Duration, max: Duration) -> Self {
        self.reconnect_delay = initial;
        self.max_reconnect_delay = max;
        self
    }

    /// Set the backoff growth factor (values below 1.0 are clamped to 1.0)
    pub fn backoff_factor(mut self, factor: f64) -> Self {
        self.backoff_factor = factor.max(1.0);
        self
    }

    /// Set the ping interval
    pub fn ping_interval(mut self, interval: Duration) -> Self {
        self.ping_interval = interval;
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn session_cookie(mut self, cookie: impl Into<String>) -> Self {
        self.session_cookie = Some(cookie.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_config_trims_trailing_slash() {
        let config = EnvConfig::new(
            "https://refractor.test/api/v1/",
            "https://refractor.test/kp",
            "wss://refractor.test/ws/",
        )
        .unwrap();

        assert_eq!(config.api_root, "https://refractor.test/api/v1");
        assert_eq!(config.kratos_root, "https://refractor.test/kp");
        assert_eq!(config.ws_root, "wss://refractor.test/ws");
        assert!(config.session_cookie.is_none());
    }

    #[test]
    fn test_env_config_rejects_wrong_scheme() {
        let err = EnvConfig::new(
            "https://refractor.test/api",
            "https://refractor.test/kp",
            "https://refractor.test/ws",
        )
        .unwrap_err();

        assert!(matches!(err, ConfigError::InvalidUrl { name: ENV_WS_ROOT, .. }));
    }

    #[test]
    fn test_env_config_session_cookie() {
        let config = EnvConfig::new("http://a", "http://b", "ws://c")
            .unwrap()
            .session_cookie("ory_kratos_session=abc");

        assert_eq!(config.session_cookie.as_deref(), Some("ory_kratos_session=abc"));
    }

    #[test]
    fn test_socket_config_defaults() {
        let config = SocketConfig::default();

        assert!(config.auto_reconnect);
        assert_eq!(config.reconnect_delay, Duration::from_secs(1));
        assert_eq!(config.max_reconnect_delay, Duration::from_secs(30));
        assert_eq!(config.ping_interval, Duration::from_secs(30));
        assert!((config.backoff_factor - 1.2).abs() < f64::EPSILON);
        assert!(config.session_cookie.is_none());
    }

    #[test]
    fn test_socket_config_builder_chain() {
        let config = SocketConfig::default()
            .no_reconnect()
            .reconnect_delay(Duration::from_millis(50), Duration::from_millis(200))
            .backoff_factor(0.5)
            .ping_interval(Duration::from_secs(5));

        assert!(!config.auto_reconnect);
        assert_eq!(config.reconnect_delay, Duration::from_millis(50));
        assert_eq!(config.max_reconnect_delay, Duration::from_millis(200));
        assert!((config.backoff_factor - 1.0).abs() < f64::EPSILON);
        assert_eq!(config.ping_interval, Duration::from_secs(5));
    }
}
