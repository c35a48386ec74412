//! Transport selection and listener settings.
//!
//! Values are filled in by [`Config::load`](crate::core::Config::load): the
//! `MCP_TRANSPORT`, `MCP_TCP_*` and `MCP_HTTP_*` variables first, then the
//! `--transport`, `--host` and `--port` flags.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Transport names accepted from the environment and the command line.
///
/// All kinds parse in every build; [`TransportConfig::for_kind`] rejects the
/// ones whose feature is disabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    Stdio,
    Tcp,
    Http,
}

impl FromStr for TransportKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "stdio" => Ok(Self::Stdio),
            "tcp" => Ok(Self::Tcp),
            "http" => Ok(Self::Http),
            other => Err(format!("unknown transport: {}", other)),
        }
    }
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Stdio => "stdio",
            Self::Tcp => "tcp",
            Self::Http => "http",
        })
    }
}

/// The transport the server runs on, with its listener settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TransportConfig {
    /// Newline-delimited JSON-RPC on stdin/stdout.
    #[cfg(feature = "stdio")]
    Stdio,

    /// Newline-delimited JSON-RPC, one MCP session per TCP connection.
    #[cfg(feature = "tcp")]
    Tcp(TcpConfig),

    /// One JSON-RPC message per HTTP POST.
    #[cfg(feature = "http")]
    Http(HttpConfig),
}

/// TCP listener settings.
#[cfg(feature = "tcp")]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TcpConfig {
    pub host: String,
    pub port: u16,
}

#[cfg(feature = "tcp")]
impl Default for TcpConfig {
    fn default() -> Self {
        Self {
            host: LOCALHOST.to_string(),
            port: 3000,
        }
    }
}

/// HTTP listener settings.
#[cfg(feature = "http")]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    pub host: String,
    pub port: u16,

    /// Path of the JSON-RPC endpoint.
    pub rpc_path: String,

    /// Answer CORS preflights from any origin.
    pub enable_cors: bool,
}

#[cfg(feature = "http")]
impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: LOCALHOST.to_string(),
            port: 8080,
            rpc_path: "/mcp".to_string(),
            enable_cors: true,
        }
    }
}

#[cfg(any(feature = "tcp", feature = "http"))]
const LOCALHOST: &str = "127.0.0.1";

#[cfg(any(feature = "tcp", feature = "http"))]
fn override_listener(
    current_host: &mut String,
    current_port: &mut u16,
    host: Option<String>,
    port: Option<u16>,
) {
    if let Some(host) = host {
        *current_host = host;
    }
    if let Some(port) = port {
        *current_port = port;
    }
}

#[cfg(not(any(feature = "stdio", feature = "tcp", feature = "http")))]
compile_error!("At least one transport feature must be enabled: stdio, tcp, or http");

impl Default for TransportConfig {
    /// STDIO when compiled in, else the first enabled listener.
    fn default() -> Self {
        #[cfg(feature = "stdio")]
        let config = Self::Stdio;
        #[cfg(all(not(feature = "stdio"), feature = "tcp"))]
        let config = Self::Tcp(TcpConfig::default());
        #[cfg(all(not(feature = "stdio"), not(feature = "tcp"), feature = "http"))]
        let config = Self::Http(HttpConfig::default());
        config
    }
}

impl TransportConfig {
    /// Default settings for `kind`, or an error naming the missing feature.
    pub fn for_kind(kind: TransportKind) -> Result<Self, String> {
        match kind {
            #[cfg(feature = "stdio")]
            TransportKind::Stdio => Ok(Self::Stdio),
            #[cfg(feature = "tcp")]
            TransportKind::Tcp => Ok(Self::Tcp(TcpConfig::default())),
            #[cfg(feature = "http")]
            TransportKind::Http => Ok(Self::Http(HttpConfig::default())),
            #[allow(unreachable_patterns)]
            other => Err(format!(
                "transport '{}' is not available in this build (enable the \"{}\" feature)",
                other, other
            )),
        }
    }

    pub fn kind(&self) -> TransportKind {
        match self {
            #[cfg(feature = "stdio")]
            Self::Stdio => TransportKind::Stdio,
            #[cfg(feature = "tcp")]
            Self::Tcp(_) => TransportKind::Tcp,
            #[cfg(feature = "http")]
            Self::Http(_) => TransportKind::Http,
        }
    }

    /// Switch to `kind`, keeping the current settings when it is already
    /// selected.
    pub fn select(&mut self, kind: TransportKind) -> Result<(), String> {
        if self.kind() != kind {
            *self = Self::for_kind(kind)?;
        }
        Ok(())
    }

    /// Override the listener address. No effect on STDIO.
    pub fn set_listener(&mut self, host: Option<String>, port: Option<u16>) {
        match self {
            #[cfg(feature = "tcp")]
            Self::Tcp(cfg) => override_listener(&mut cfg.host, &mut cfg.port, host, port),
            #[cfg(feature = "http")]
            Self::Http(cfg) => override_listener(&mut cfg.host, &mut cfg.port, host, port),
            #[allow(unreachable_patterns)]
            _ => {
                let _ = (host, port);
            }
        }
    }

    /// Get a description of this transport for logging.
    pub fn description(&self) -> String {
        match self {
            #[cfg(feature = "stdio")]
            Self::Stdio => "STDIO (standard MCP mode)".to_string(),
            #[cfg(feature = "tcp")]
            Self::Tcp(cfg) => format!("TCP on {}:{}", cfg.host, cfg.port),
            #[cfg(feature = "http")]
            Self::Http(cfg) => format!("HTTP on {}:{}{}", cfg.host, cfg.port, cfg.rpc_path),
        }
    }
}
