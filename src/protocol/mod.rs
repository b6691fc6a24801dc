//! Protocol Module
//!
//! Defines the wire protocol spoken with the table server.
//!
//! ## Message Format
//!
//! Every message starts with a one-byte kind. There is no overall length
//! prefix: each layout is fixed or carries its own length fields, so the
//! stream can only be framed by decoding every message completely.
//!
//! ```text
//! NOOP            0x00
//! HELLO           0x01  version(2)
//! UNSUPPORTED     0x02  version(2)
//! HELLO_COMPLETE  0x03
//! ASSIGN          0x10  name_len(2) name type(1) id(2) seq(2) value
//! UPDATE          0x11  id(2) seq(2) value
//! ```
//!
//! All integers are big-endian.
//!
//! ### Type Tags
//! - 0x00: bool
//! - 0x01: number (f64)
//! - 0x02: string
//! - 0x10: bool array
//! - 0x11: number array
//! - 0x12: string array

mod value;
mod codec;
mod message;

pub use value::{TypeTag, Value};
pub use codec::{decode_value, encode_value, encoded_len, WireReader};
pub use message::{encode_message, read_message, Message, MessageKind};

/// Protocol version announced in HELLO
pub const PROTOCOL_VERSION: u16 = 0x0200;
