//! Configuration for ntsync
//!
//! Centralized configuration with sensible defaults.

use std::time::Duration;

use crate::error::{NtError, Result};
use crate::protocol::PROTOCOL_VERSION;

/// Default server port
pub const DEFAULT_PORT: u16 = 1735;

/// Main configuration for a client session
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Endpoint Configuration
    // -------------------------------------------------------------------------
    /// Server host name or IP address
    pub server: String,

    /// Server TCP port
    pub port: u16,

    // -------------------------------------------------------------------------
    // Network Configuration
    // -------------------------------------------------------------------------
    /// Connect timeout (milliseconds, 0 = OS default)
    pub connect_timeout_ms: u64,

    /// Read timeout for a blocking receive (milliseconds, 0 = block forever)
    pub read_timeout_ms: u64,

    /// Write timeout (milliseconds, 0 = block forever)
    pub write_timeout_ms: u64,

    // -------------------------------------------------------------------------
    // Protocol Configuration
    // -------------------------------------------------------------------------
    /// Version announced in the outbound HELLO
    pub protocol_version: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
            connect_timeout_ms: 5000,
            read_timeout_ms: 1000,
            write_timeout_ms: 5000,
            protocol_version: PROTOCOL_VERSION,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Build a config from a `host` or `host:port` target
    ///
    /// Bracketed IPv6 literals (`[::1]:1735`) are accepted.
    pub fn from_target(target: &str) -> Result<Self> {
        let (server, port) = parse_target(target)?;
        Ok(Self::builder().server(server).port(port).build())
    }

    /// `host:port` string suitable for address resolution
    pub fn addr(&self) -> String {
        if self.server.contains(':') && !self.server.starts_with('[') {
            format!("[{}]:{}", self.server, self.port)
        } else {
            format!("{}:{}", self.server, self.port)
        }
    }

    pub fn read_timeout(&self) -> Option<Duration> {
        millis(self.read_timeout_ms)
    }

    pub fn write_timeout(&self) -> Option<Duration> {
        millis(self.write_timeout_ms)
    }

    pub fn connect_timeout(&self) -> Option<Duration> {
        millis(self.connect_timeout_ms)
    }

    /// Check that the config can be used to open a connection
    pub fn validate(&self) -> Result<()> {
        if self.server.trim().is_empty() {
            return Err(NtError::Config("server must not be empty".to_string()));
        }
        if self.port == 0 {
            return Err(NtError::Config("port must not be 0".to_string()));
        }
        Ok(())
    }
}

fn millis(ms: u64) -> Option<Duration> {
    (ms > 0).then(|| Duration::from_millis(ms))
}

fn parse_target(target: &str) -> Result<(String, u16)> {
    let target = target.trim();
    if target.is_empty() {
        return Err(NtError::Config("empty target".to_string()));
    }

    // [v6]:port or [v6]
    if let Some(rest) = target.strip_prefix('[') {
        let (host, tail) = rest
            .split_once(']')
            .ok_or_else(|| NtError::Config(format!("unterminated '[' in {target}")))?;
        return match tail.strip_prefix(':') {
            Some(port) => Ok((host.to_string(), parse_port(port)?)),
            None if tail.is_empty() => Ok((host.to_string(), DEFAULT_PORT)),
            None => Err(NtError::Config(format!("unexpected '{tail}' in {target}"))),
        };
    }

    match target.rsplit_once(':') {
        // a bare v6 literal has more than one colon
        Some((host, _)) if host.contains(':') => Ok((target.to_string(), DEFAULT_PORT)),
        Some((host, port)) => Ok((host.to_string(), parse_port(port)?)),
        None => Ok((target.to_string(), DEFAULT_PORT)),
    }
}

fn parse_port(port: &str) -> Result<u16> {
    port.parse::<u16>()
        .map_err(|e| NtError::Config(format!("invalid port '{port}': {e}")))
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the server host
    pub fn server(mut self, server: impl Into<String>) -> Self {
        self.config.server = server.into();
        self
    }

    /// Set the server port
    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    /// Set the connect timeout (in milliseconds)
    pub fn connect_timeout_ms(mut self, ms: u64) -> Self {
        self.config.connect_timeout_ms = ms;
        self
    }

    /// Set the read timeout (in milliseconds)
    pub fn read_timeout_ms(mut self, ms: u64) -> Self {
        self.config.read_timeout_ms = ms;
        self
    }

    /// Set the write timeout (in milliseconds)
    pub fn write_timeout_ms(mut self, ms: u64) -> Self {
        self.config.write_timeout_ms = ms;
        self
    }

    /// Set the protocol version sent in HELLO
    pub fn protocol_version(mut self, version: u16) -> Self {
        self.config.protocol_version = version;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
