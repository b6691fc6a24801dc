//! Connection
//!
//! Blocking TCP stream to the table server.

use std::io::{self, Read, Write};
use std::net::{Shutdown, SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

use crate::config::Config;
use crate::error::{NtError, Result};

/// A connected stream to the server
pub struct Connection {
    stream: TcpStream,

    /// Peer address for logging
    peer_addr: String,
}

impl Connection {
    /// Resolve and connect to the configured endpoint, then apply timeouts
    ///
    /// Every resolved address is tried in order; the last error is returned
    /// if none accepts.
    pub fn connect(config: &Config) -> Result<Self> {
        config.validate()?;
        let addr = config.addr();

        let addrs: Vec<SocketAddr> = addr.to_socket_addrs()?.collect();
        if addrs.is_empty() {
            return Err(NtError::Config(format!("{addr} did not resolve to any address")));
        }

        let mut last_err = None;
        for candidate in addrs {
            let attempt = match config.connect_timeout() {
                Some(timeout) => TcpStream::connect_timeout(&candidate, timeout),
                None => TcpStream::connect(candidate),
            };
            match attempt {
                Ok(stream) => {
                    tracing::debug!("Connected to {} ({})", addr, candidate);
                    let mut connection = Self::from_stream(stream)?;
                    connection.set_timeouts(config.read_timeout(), config.write_timeout())?;
                    return Ok(connection);
                }
                Err(e) => {
                    tracing::debug!("Connect to {} failed: {}", candidate, e);
                    last_err = Some(e);
                }
            }
        }

        Err(last_err.map(NtError::Io).unwrap_or(NtError::ConnectionClosed))
    }

    /// Wrap an already connected stream
    pub fn from_stream(stream: TcpStream) -> Result<Self> {
        let peer_addr = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "unknown".to_string());

        // Disable Nagle's algorithm for low latency
        stream.set_nodelay(true)?;

        Ok(Self { stream, peer_addr })
    }

    /// Configure read and write deadlines (`None` blocks forever)
    pub fn set_timeouts(&mut self, read: Option<Duration>, write: Option<Duration>) -> Result<()> {
        self.stream.set_read_timeout(read)?;
        self.stream.set_write_timeout(write)?;
        Ok(())
    }

    /// Handle that can close this connection from another thread
    pub fn shutdown_handle(&self) -> Result<ShutdownHandle> {
        Ok(ShutdownHandle {
            stream: self.stream.try_clone()?,
        })
    }

    /// Close both directions; blocked reads fail promptly afterwards
    pub fn shutdown(&self) -> Result<()> {
        shutdown_stream(&self.stream)
    }

    /// Get the peer address string
    pub fn peer_addr(&self) -> &str {
        &self.peer_addr
    }
}

impl Read for Connection {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.stream.read(buf)
    }
}

impl Write for Connection {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.stream.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.stream.flush()
    }
}

/// Closes a [`Connection`] from outside the thread that reads it
#[derive(Debug)]
pub struct ShutdownHandle {
    stream: TcpStream,
}

impl ShutdownHandle {
    pub fn shutdown(&self) -> Result<()> {
        shutdown_stream(&self.stream)
    }
}

fn shutdown_stream(stream: &TcpStream) -> Result<()> {
    match stream.shutdown(Shutdown::Both) {
        Ok(()) => Ok(()),
        // already closed by the other side
        Err(e) if e.kind() == io::ErrorKind::NotConnected => Ok(()),
        Err(e) => Err(NtError::Io(e)),
    }
}
