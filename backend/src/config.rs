//! Server configuration from environment variables.
//!
//! | Variable               | Default   |
//! |------------------------|-----------|
//! | `FUNNEL_HOST`          | `0.0.0.0` |
//! | `FUNNEL_PORT`          | `3000`    |
//! | `FUNNEL_MAX_UPLOAD_MB` | `50`      |
//! | `FUNNEL_STATIC_DIR`    | unset     |
//! | `FUNNEL_SESSION_IDLE_MINUTES` | `30` |
//! | `FUNNEL_MAX_SESSIONS`  | `64`      |

use std::env;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{ServerError, ServerResult};

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_MAX_UPLOAD_MB: usize = 50;
pub const DEFAULT_SESSION_IDLE_MINUTES: u64 = 30;
pub const DEFAULT_MAX_SESSIONS: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: IpAddr,
    pub port: u16,
    pub max_upload_bytes: usize,
    /// Built frontend to serve for non-API paths
    pub static_dir: Option<PathBuf>,
    /// Sessions untouched for this long are dropped
    pub session_idle: Duration,
    /// Oldest-accessed sessions are dropped beyond this count
    pub max_sessions: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_MB * 1024 * 1024,
            static_dir: None,
            session_idle: Duration::from_secs(DEFAULT_SESSION_IDLE_MINUTES * 60),
            max_sessions: DEFAULT_MAX_SESSIONS,
        }
    }
}

impl ServerConfig {
    /// Read the configuration, loading `.env` first if present.
    pub fn from_env() -> ServerResult<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; unset or empty keys take defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> ServerResult<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(host) = get("FUNNEL_HOST") {
            config.host = parse_var("FUNNEL_HOST", &host)?;
        }
        if let Some(port) = get("FUNNEL_PORT") {
            config.port = parse_var("FUNNEL_PORT", &port)?;
        }
        if let Some(mb) = get("FUNNEL_MAX_UPLOAD_MB") {
            let parsed: usize = parse_var("FUNNEL_MAX_UPLOAD_MB", &mb)?;
            config.max_upload_bytes = parsed
                .checked_mul(1024 * 1024)
                .ok_or_else(|| ServerError::Config(format!("FUNNEL_MAX_UPLOAD_MB too large: {mb}")))?;
        }
        config.static_dir = get("FUNNEL_STATIC_DIR").map(PathBuf::from);
        if let Some(minutes) = get("FUNNEL_SESSION_IDLE_MINUTES") {
            let parsed: u64 = parse_var("FUNNEL_SESSION_IDLE_MINUTES", &minutes)?;
            let secs = parsed.checked_mul(60).ok_or_else(|| {
                ServerError::Config(format!("FUNNEL_SESSION_IDLE_MINUTES too large: {minutes}"))
            })?;
            config.session_idle = Duration::from_secs(secs);
        }
        if let Some(max) = get("FUNNEL_MAX_SESSIONS") {
            config.max_sessions = parse_var("FUNNEL_MAX_SESSIONS", &max)?;
            if config.max_sessions == 0 {
                return Err(ServerError::Config("FUNNEL_MAX_SESSIONS must be at least 1".into()));
            }
        }

        Ok(config)
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

fn parse_var<T: std::str::FromStr>(key: &str, value: &str) -> ServerResult<T> {
    value
        .trim()
        .parse()
        .map_err(|_| ServerError::Config(format!("invalid {key}: {value:?}")))
}
