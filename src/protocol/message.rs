//! Message definitions
//!
//! One variant per message kind, plus stream framing in both directions.

use std::fmt;
use std::io::Read;

use bytes::{BufMut, BytesMut};

use crate::error::{NtError, Result};
use super::codec::{decode_value, encode_value, put_string, WireReader};
use super::{TypeTag, Value};

/// Message kinds (first byte of every message)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum MessageKind {
    Noop = 0x00,
    Hello = 0x01,
    Unsupported = 0x02,
    HelloComplete = 0x03,
    Assign = 0x10,
    Update = 0x11,
}

impl MessageKind {
    pub fn from_u8(kind: u8) -> Option<Self> {
        match kind {
            0x00 => Some(MessageKind::Noop),
            0x01 => Some(MessageKind::Hello),
            0x02 => Some(MessageKind::Unsupported),
            0x03 => Some(MessageKind::HelloComplete),
            0x10 => Some(MessageKind::Assign),
            0x11 => Some(MessageKind::Update),
            _ => None,
        }
    }
}

/// A parsed protocol message
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    /// Keep-alive
    Noop,

    /// Version announcement (outbound from clients; inbound only from a misbehaving peer)
    Hello { version: u16 },

    /// Peer rejected our version; `version` is the one it speaks
    Unsupported { version: u16 },

    /// Peer finished sending its initial table
    HelloComplete,

    /// Create or replace an entry
    Assign {
        name: Vec<u8>,
        type_tag: u8,
        id: u16,
        seq: u16,
        /// `None` when `type_tag` is not understood
        value: Option<Value>,
    },

    /// New value for an existing entry, typed by the entry's assigned tag
    Update {
        id: u16,
        seq: u16,
        type_tag: u8,
        value: Option<Value>,
    },
}

impl Message {
    pub fn kind(&self) -> MessageKind {
        match self {
            Message::Noop => MessageKind::Noop,
            Message::Hello { .. } => MessageKind::Hello,
            Message::Unsupported { .. } => MessageKind::Unsupported,
            Message::HelloComplete => MessageKind::HelloComplete,
            Message::Assign { .. } => MessageKind::Assign,
            Message::Update { .. } => MessageKind::Update,
        }
    }

    /// Build an ASSIGN carrying a known value
    pub fn assign(id: u16, seq: u16, name: impl AsRef<[u8]>, value: Value) -> Self {
        Message::Assign {
            name: name.as_ref().to_vec(),
            type_tag: value.type_tag() as u8,
            id,
            seq,
            value: Some(value),
        }
    }

    /// Build an UPDATE carrying a known value
    pub fn update(id: u16, seq: u16, value: Value) -> Self {
        Message::Update {
            id,
            seq,
            type_tag: value.type_tag() as u8,
            value: Some(value),
        }
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Message::Noop => f.write_str("NOOP"),
            Message::Hello { version } => write!(f, "HELLO version=0x{version:04x}"),
            Message::Unsupported { version } => {
                write!(f, "UNSUPPORTED peer supports version=0x{version:04x}")
            }
            Message::HelloComplete => f.write_str("HELLO_COMPLETE"),
            Message::Assign { name, type_tag, id, seq, value } => {
                write!(
                    f,
                    "ASSIGN id={id} seq={seq} name={:?} type={} value=",
                    String::from_utf8_lossy(name),
                    TagName(*type_tag)
                )?;
                write_value(f, value.as_ref())
            }
            Message::Update { id, seq, type_tag, value } => {
                write!(f, "UPDATE id={id} seq={seq} type={} value=", TagName(*type_tag))?;
                write_value(f, value.as_ref())
            }
        }
    }
}

struct TagName(u8);

impl fmt::Display for TagName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match TypeTag::from_u8(self.0) {
            Some(tag) => write!(f, "{tag}"),
            None => write!(f, "unknown(0x{:02x})", self.0),
        }
    }
}

fn write_value(f: &mut fmt::Formatter<'_>, value: Option<&Value>) -> fmt::Result {
    match value {
        Some(v) => write!(f, "{v}"),
        None => f.write_str("<absent>"),
    }
}

// =============================================================================
// Stream decoding
// =============================================================================

/// Read exactly one message from the stream
///
/// `type_of` resolves the recorded type tag of an entry id; it is only
/// consulted for UPDATE, whose payload is typed by the earlier ASSIGN.
///
/// Errors:
/// - `UnknownMessageKind` when the first byte is not a known kind (nothing
///   past that byte is consumed)
/// - `UnknownEntry` when an UPDATE names an id `type_of` does not know (the
///   value bytes are left unread)
pub fn read_message<R, F>(reader: &mut WireReader<R>, type_of: F) -> Result<Message>
where
    R: Read,
    F: FnOnce(u16) -> Option<u8>,
{
    let kind_byte = reader.read_u8()?;
    let kind = MessageKind::from_u8(kind_byte).ok_or(NtError::UnknownMessageKind(kind_byte))?;

    let message = match kind {
        MessageKind::Noop => Message::Noop,
        MessageKind::Hello => Message::Hello {
            version: reader.read_u16()?,
        },
        MessageKind::Unsupported => Message::Unsupported {
            version: reader.read_u16()?,
        },
        MessageKind::HelloComplete => Message::HelloComplete,
        MessageKind::Assign => {
            let name_len = reader.read_u16()? as usize;
            let name = reader.read_bytes(name_len)?;
            let type_tag = reader.read_u8()?;
            let id = reader.read_u16()?;
            let seq = reader.read_u16()?;
            let value = decode_value(type_tag, reader)?.map(|(v, _)| v);
            Message::Assign { name, type_tag, id, seq, value }
        }
        MessageKind::Update => {
            let id = reader.read_u16()?;
            let seq = reader.read_u16()?;
            let type_tag = type_of(id).ok_or(NtError::UnknownEntry { id })?;
            let value = decode_value(type_tag, reader)?.map(|(v, _)| v);
            Message::Update { id, seq, type_tag, value }
        }
    };

    Ok(message)
}

// =============================================================================
// Encoding
// =============================================================================

/// Encode a message to bytes
///
/// An absent value encodes as no payload, which is only what a peer would
/// send for a tag it cannot encode either.
pub fn encode_message(message: &Message) -> Result<BytesMut> {
    let mut buf = BytesMut::with_capacity(16);
    buf.put_u8(message.kind() as u8);

    match message {
        Message::Noop | Message::HelloComplete => {}
        Message::Hello { version } | Message::Unsupported { version } => buf.put_u16(*version),
        Message::Assign { name, type_tag, id, seq, value } => {
            put_string(&mut buf, name)?;
            buf.put_u8(*type_tag);
            buf.put_u16(*id);
            buf.put_u16(*seq);
            if let Some(value) = value {
                encode_value(value, &mut buf)?;
            }
        }
        Message::Update { id, seq, value, .. } => {
            buf.put_u16(*id);
            buf.put_u16(*seq);
            if let Some(value) = value {
                encode_value(value, &mut buf)?;
            }
        }
    }

    Ok(buf)
}
