//! Error types for ntsync
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

/// Result type alias using NtError
pub type Result<T> = std::result::Result<T, NtError>;

/// Unified error type for ntsync operations
#[derive(Debug, Error)]
pub enum NtError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Read timed out")]
    Timeout,

    #[error("Connection closed by peer")]
    ConnectionClosed,

    // -------------------------------------------------------------------------
    // Protocol Errors
    // -------------------------------------------------------------------------
    /// UPDATE named an id that was never assigned. The value that follows
    /// cannot be sized without the entry's type, so the session that read it
    /// is faulted as well; the table is left unchanged.
    #[error("Update for unknown entry id {id}")]
    UnknownEntry { id: u16 },

    #[error("Unknown message kind: 0x{0:02x}")]
    UnknownMessageKind(u8),

    #[error("Encode error: {0}")]
    Encode(String),

    // -------------------------------------------------------------------------
    // Session Errors
    // -------------------------------------------------------------------------
    #[error("Session faulted: stream framing was lost")]
    SessionFaulted,

    #[error("Session closed")]
    SessionClosed,

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl NtError {
    /// Map an I/O error from a blocking read into the matching variant.
    ///
    /// `WouldBlock` is what unix sockets report when a read timeout elapses;
    /// Windows reports `TimedOut`.
    pub fn from_read(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut => NtError::Timeout,
            std::io::ErrorKind::UnexpectedEof => NtError::ConnectionClosed,
            _ => NtError::Io(err),
        }
    }

    /// True when the error was a read deadline expiring
    pub fn is_timeout(&self) -> bool {
        matches!(self, NtError::Timeout)
    }

    /// True when the peer went away (EOF, reset, abort, broken pipe)
    pub fn is_disconnect(&self) -> bool {
        match self {
            NtError::ConnectionClosed => true,
            NtError::Io(e) => matches!(
                e.kind(),
                std::io::ErrorKind::ConnectionReset
                    | std::io::ErrorKind::ConnectionAborted
                    | std::io::ErrorKind::BrokenPipe
                    | std::io::ErrorKind::NotConnected
            ),
            _ => false,
        }
    }
}
