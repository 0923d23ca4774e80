//! Typed connection settings.

use std::fmt;
use std::path::PathBuf;

/// Default daemon host.
pub const DEFAULT_HOST: &str = "127.0.0.1";
/// Default daemon RPC port.
pub const DEFAULT_PORT: u16 = 9091;
/// Default RPC endpoint path.
pub const DEFAULT_RPC_PATH: &str = "/transmission/rpc";

/// URL scheme used to reach the daemon.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Protocol {
    /// Plain HTTP.
    #[default]
    Http,
    /// HTTP over TLS.
    Https,
}

impl Protocol {
    /// Scheme string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Http => "http",
            Self::Https => "https",
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolved settings for one daemon connection.
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    /// URL scheme.
    pub protocol: Protocol,
    /// Daemon host name or address.
    pub host: String,
    /// Daemon RPC port.
    pub port: u16,
    /// Basic-auth user.
    pub username: Option<String>,
    /// Basic-auth password.
    pub password: Option<String>,
    /// RPC endpoint path, starting with `/`.
    pub path: String,
}

impl ConnectionConfig {
    /// Full RPC endpoint URL.
    #[must_use]
    pub fn rpc_endpoint(&self) -> String {
        format!(
            "{}://{}:{}{}",
            self.protocol, self.host, self.port, self.path
        )
    }
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            protocol: Protocol::Http,
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            username: None,
            password: None,
            path: DEFAULT_RPC_PATH.to_string(),
        }
    }
}

impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("protocol", &self.protocol)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("path", &self.path)
            .finish()
    }
}

/// Values supplied on the command line; `None` means "not given".
#[derive(Debug, Clone, Default)]
pub struct ConnectionOverrides {
    /// Daemon `settings.json` to read port, user, and path from.
    pub settings_file: Option<PathBuf>,
    /// URL scheme.
    pub protocol: Option<Protocol>,
    /// Daemon host.
    pub host: Option<String>,
    /// Daemon port.
    pub port: Option<u16>,
    /// Basic-auth user.
    pub username: Option<String>,
    /// Basic-auth password.
    pub password: Option<String>,
    /// RPC endpoint path.
    pub path: Option<String>,
}
