//! Session Module
//!
//! One connection to the server plus the table it keeps in sync.
//!
//! ## Lifecycle
//! ```text
//! Connecting ──HELLO sent──▶ Established ──framing lost──▶ Faulted
//!                                 │
//!                                 └──────close()─────────▶ Closed
//! ```
//!
//! Processing is strictly sequential: `process()` blocks until one whole
//! message has been read and applied. There is no background thread and
//! no locking; a caller that shares the session across threads must wrap
//! it in its own lock.

use std::io::{BufReader, Read, Write};

use crate::config::Config;
use crate::error::{NtError, Result};
use crate::network::{Connection, ShutdownHandle};
use crate::protocol::{encode_message, read_message, Message, WireReader};
use crate::table::{EntryTable, Snapshot};

/// Session state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Stream open, HELLO not yet sent
    Connecting,

    /// HELLO sent; inbound messages are being processed
    Established,

    /// A message could not be framed; the stream position is unknown
    Faulted,

    /// Closed by the caller
    Closed,
}

/// A client session over any blocking byte stream
pub struct Session<S: Read + Write> {
    /// Buffered cursor over the stream; writes go to the inner stream directly
    reader: WireReader<BufReader<S>>,

    /// Local mirror of the server's entries
    table: EntryTable,

    state: SessionState,

    /// Version announced in HELLO
    protocol_version: u16,

    messages_processed: u64,
}

impl Session<Connection> {
    /// Connect to the configured server and send HELLO
    pub fn connect(config: &Config) -> Result<Self> {
        let connection = Connection::connect(config)?;
        tracing::info!("Connected to {}", connection.peer_addr());
        Self::handshake(connection, config.protocol_version)
    }

    /// Handle that can close the socket while `process()` blocks on another thread
    pub fn shutdown_handle(&self) -> Result<ShutdownHandle> {
        self.get_ref().shutdown_handle()
    }

    /// Shut the socket down; later calls to `process()` fail with `SessionClosed`
    pub fn close(&mut self) -> Result<()> {
        if self.state == SessionState::Closed {
            return Ok(());
        }
        self.state = SessionState::Closed;
        tracing::debug!("Closing session to {}", self.get_ref().peer_addr());
        self.get_ref().shutdown()
    }
}

impl<S: Read + Write> Session<S> {
    /// Start a session on an open stream: send HELLO with `version`
    ///
    /// No acknowledgement is awaited; the session is `Established` as soon
    /// as the HELLO is written.
    pub fn handshake(stream: S, version: u16) -> Result<Self> {
        let mut session = Self {
            reader: WireReader::new(BufReader::new(stream)),
            table: EntryTable::new(),
            state: SessionState::Connecting,
            protocol_version: version,
            messages_processed: 0,
        };

        tracing::debug!("Sending HELLO (version 0x{:04x})", version);
        session.send(&Message::Hello { version })?;
        session.state = SessionState::Established;

        Ok(session)
    }

    /// Read and apply exactly one message
    ///
    /// Returns the decoded message, which doubles as a description of what
    /// happened (`Display` renders it for humans).
    ///
    /// Errors:
    /// - `Timeout` before any byte of the message arrived: the session stays
    ///   usable and the call may be repeated
    /// - `UnknownMessageKind`, `UnknownEntry`, a truncated read, a timeout in
    ///   the middle of a message, or any other I/O failure: the session is
    ///   faulted and every later call returns `SessionFaulted`
    pub fn process(&mut self) -> Result<Message> {
        match self.state {
            SessionState::Faulted => return Err(NtError::SessionFaulted),
            SessionState::Closed => return Err(NtError::SessionClosed),
            SessionState::Connecting | SessionState::Established => {}
        }

        let start = self.reader.position();
        let table = &self.table;
        let message = match read_message(&mut self.reader, |id| table.type_of(id)) {
            Ok(message) => message,
            Err(e) => return Err(self.fail(e, start)),
        };

        self.apply(&message)?;
        self.messages_processed += 1;

        tracing::debug!(
            bytes = self.reader.position() - start,
            "Processed {}",
            message
        );

        Ok(message)
    }

    /// Apply a decoded message to the table
    fn apply(&mut self, message: &Message) -> Result<()> {
        match message {
            Message::Noop => {}
            Message::Hello { version } => {
                tracing::warn!("Server sent HELLO (version 0x{:04x}); ignoring", version);
            }
            Message::Unsupported { version } => {
                tracing::warn!(
                    "Server does not support version 0x{:04x}; it supports 0x{:04x}",
                    self.protocol_version,
                    version
                );
            }
            Message::HelloComplete => {
                tracing::info!("Initial table received ({} entries)", self.table.len());
            }
            Message::Assign { name, type_tag, id, seq, value } => {
                if value.is_none() {
                    warn_unknown_type(*id, *type_tag);
                }
                self.table.assign(*id, name.clone(), *type_tag, value.clone(), *seq);
            }
            Message::Update { id, seq, type_tag, value } => {
                if value.is_none() {
                    warn_unknown_type(*id, *type_tag);
                }
                self.table.update(*id, value.clone(), *seq)?;
            }
        }
        Ok(())
    }

    /// Classify a read failure, faulting the session unless it is safe to retry
    fn fail(&mut self, err: NtError, start: u64) -> NtError {
        if err.is_timeout() && self.reader.position() == start {
            tracing::trace!("Read timed out between messages");
            return err;
        }

        if err.is_timeout() {
            tracing::warn!(
                "Read timed out {} bytes into a message; session faulted",
                self.reader.position() - start
            );
        } else {
            tracing::warn!("Session faulted: {}", err);
        }
        self.state = SessionState::Faulted;
        err
    }

    fn send(&mut self, message: &Message) -> Result<()> {
        let bytes = encode_message(message)?;
        let stream = self.reader.get_mut().get_mut();
        stream.write_all(&bytes)?;
        stream.flush()?;
        Ok(())
    }

    /// Current table contents, read-only
    pub fn table(&self) -> &EntryTable {
        &self.table
    }

    /// Owned, id-ordered copy of the table
    pub fn snapshot(&self) -> Snapshot {
        self.table.snapshot()
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn protocol_version(&self) -> u16 {
        self.protocol_version
    }

    /// Number of messages successfully processed so far
    pub fn messages_processed(&self) -> u64 {
        self.messages_processed
    }

    /// Total inbound bytes consumed
    pub fn bytes_read(&self) -> u64 {
        self.reader.position()
    }

    /// The underlying stream
    pub fn get_ref(&self) -> &S {
        self.reader.get_ref().get_ref()
    }
}

fn warn_unknown_type(id: u16, type_tag: u8) {
    tracing::warn!(
        "Entry {} has unknown type tag 0x{:02x}; value dropped",
        id,
        type_tag
    );
}
