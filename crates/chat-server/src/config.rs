//! Configuration for the chat TCP server.
//!
//! Defaults can be overridden via a few environment variables:
//!
//! - `CHAT_BIND_ADDR`   (default: "0.0.0.0")
//! - `CHAT_PORT`        (default: "3410")
//! - `CHAT_MAX_CLIENTS` (default: "1024")
//!
//! The binary additionally accepts `--bind` / `--port` flags, which win
//! over the environment.

use std::env;
use std::str::FromStr;

use crate::error::ServerError;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 3410;
pub const DEFAULT_MAX_CLIENTS: usize = 1024;

/// Server configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// IP address / interface to bind to (e.g. "0.0.0.0" or "127.0.0.1").
    pub bind_addr: String,

    /// TCP port to listen on. `0` picks an ephemeral port.
    pub port: u16,

    /// Maximum number of simultaneously connected clients.
    pub max_clients: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            port: DEFAULT_PORT,
            max_clients: DEFAULT_MAX_CLIENTS,
        }
    }
}

impl Config {
    /// Construct a `Config` from environment variables, falling back
    /// to defaults.
    pub fn from_env() -> Result<Self, ServerError> {
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Same as [`Config::from_env`] but reading from an arbitrary lookup.
    pub fn from_vars<F>(lookup: F) -> Result<Self, ServerError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bind_addr = lookup("CHAT_BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let port = parse_or_default(&lookup, "CHAT_PORT", DEFAULT_PORT)?;
        let max_clients = parse_or_default(&lookup, "CHAT_MAX_CLIENTS", DEFAULT_MAX_CLIENTS)?;

        if max_clients == 0 {
            return Err(ServerError::Config(
                "CHAT_MAX_CLIENTS must be at least 1".to_string(),
            ));
        }

        Ok(Config {
            bind_addr,
            port,
            max_clients,
        })
    }

    /// Apply command-line overrides on top of this config.
    pub fn with_overrides(mut self, bind_addr: Option<String>, port: Option<u16>) -> Self {
        if let Some(bind_addr) = bind_addr {
            self.bind_addr = bind_addr;
        }
        if let Some(port) = port {
            self.port = port;
        }
        self
    }

    /// Convenience: `addr:port` socket string.
    pub fn socket_addr_string(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }
}

fn parse_or_default<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ServerError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(val) => val
            .trim()
            .parse::<T>()
            .map_err(|e| ServerError::Config(format!("{key}={val:?}: {e}"))),
        None => Ok(default),
    }
}
