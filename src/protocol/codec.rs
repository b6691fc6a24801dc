//! Value codec
//!
//! Big-endian encoding and decoding of the six value shapes.
//!
//! ## Wire Format
//! ```text
//! bool      : u8 (0 = false, anything else = true)
//! number    : f64, 8 bytes IEEE-754
//! string    : u16 len + len raw bytes
//! xxx array : u8 count + count elements, each encoded as the scalar
//! ```
//!
//! Decoding reads straight from the stream through a [`WireReader`]. Each
//! field is read with `read_exact`, so a value is never interpreted from a
//! partial read and nothing past the value is consumed.

use std::io::Read;

use bytes::{BufMut, BytesMut};

use crate::error::{NtError, Result};
use super::{TypeTag, Value};

/// Byte cursor over a blocking stream
///
/// Counts every byte handed out so callers can tell how far a decode advanced.
#[derive(Debug)]
pub struct WireReader<R> {
    inner: R,
    position: u64,
}

impl<R: Read> WireReader<R> {
    pub fn new(inner: R) -> Self {
        Self { inner, position: 0 }
    }

    /// Total bytes consumed since creation
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Fill `buf` completely, blocking until every byte has arrived
    pub fn read_into(&mut self, buf: &mut [u8]) -> Result<()> {
        self.inner.read_exact(buf).map_err(NtError::from_read)?;
        self.position += buf.len() as u64;
        Ok(())
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        let mut buf = [0u8; 1];
        self.read_into(&mut buf)?;
        Ok(buf[0])
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        let mut buf = [0u8; 2];
        self.read_into(&mut buf)?;
        Ok(u16::from_be_bytes(buf))
    }

    pub fn read_f64(&mut self) -> Result<f64> {
        let mut buf = [0u8; 8];
        self.read_into(&mut buf)?;
        Ok(f64::from_be_bytes(buf))
    }

    /// Read exactly `len` raw bytes
    pub fn read_bytes(&mut self, len: usize) -> Result<Vec<u8>> {
        let mut buf = vec![0u8; len];
        if len > 0 {
            self.read_into(&mut buf)?;
        }
        Ok(buf)
    }

    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    pub fn get_mut(&mut self) -> &mut R {
        &mut self.inner
    }
}

// =============================================================================
// Decoding
// =============================================================================

/// Decode one value of type `tag` from the reader
///
/// Returns the value and the number of bytes it occupied. An unknown tag
/// yields `Ok(None)` without consuming anything, since its payload length
/// cannot be known.
pub fn decode_value<R: Read>(tag: u8, reader: &mut WireReader<R>) -> Result<Option<(Value, usize)>> {
    let Some(tag) = TypeTag::from_u8(tag) else {
        return Ok(None);
    };

    let start = reader.position();
    let value = match tag {
        TypeTag::Bool => Value::Bool(read_bool(reader)?),
        TypeTag::Number => Value::Number(reader.read_f64()?),
        TypeTag::String => Value::String(read_string(reader)?),
        TypeTag::BoolArray => Value::BoolArray(read_array(reader, read_bool)?),
        TypeTag::NumberArray => Value::NumberArray(read_array(reader, |r| r.read_f64())?),
        TypeTag::StringArray => Value::StringArray(read_array(reader, read_string)?),
    };

    Ok(Some((value, (reader.position() - start) as usize)))
}

fn read_bool<R: Read>(reader: &mut WireReader<R>) -> Result<bool> {
    Ok(reader.read_u8()? != 0)
}

fn read_string<R: Read>(reader: &mut WireReader<R>) -> Result<Vec<u8>> {
    let len = reader.read_u16()? as usize;
    reader.read_bytes(len)
}

fn read_array<R, T, F>(reader: &mut WireReader<R>, mut read_one: F) -> Result<Vec<T>>
where
    R: Read,
    F: FnMut(&mut WireReader<R>) -> Result<T>,
{
    let count = reader.read_u8()? as usize;
    let mut items = Vec::with_capacity(count);
    for _ in 0..count {
        items.push(read_one(reader)?);
    }
    Ok(items)
}

// =============================================================================
// Encoding
// =============================================================================

/// Append the wire encoding of `value` to `buf`
///
/// Fails when a string is longer than `u16::MAX` bytes or an array holds
/// more than `u8::MAX` elements.
pub fn encode_value(value: &Value, buf: &mut BytesMut) -> Result<()> {
    match value {
        Value::Bool(b) => buf.put_u8(u8::from(*b)),
        Value::Number(n) => buf.put_f64(*n),
        Value::String(s) => put_string(buf, s)?,
        Value::BoolArray(items) => {
            put_count(buf, items.len())?;
            for b in items {
                buf.put_u8(u8::from(*b));
            }
        }
        Value::NumberArray(items) => {
            put_count(buf, items.len())?;
            for n in items {
                buf.put_f64(*n);
            }
        }
        Value::StringArray(items) => {
            put_count(buf, items.len())?;
            for s in items {
                put_string(buf, s)?;
            }
        }
    }
    Ok(())
}

/// Size in bytes of the wire encoding of `value`
pub fn encoded_len(value: &Value) -> usize {
    match value {
        Value::Bool(_) => 1,
        Value::Number(_) => 8,
        Value::String(s) => 2 + s.len(),
        Value::BoolArray(items) => 1 + items.len(),
        Value::NumberArray(items) => 1 + 8 * items.len(),
        Value::StringArray(items) => 1 + items.iter().map(|s| 2 + s.len()).sum::<usize>(),
    }
}

pub(crate) fn put_string(buf: &mut BytesMut, s: &[u8]) -> Result<()> {
    let len = u16::try_from(s.len())
        .map_err(|_| NtError::Encode(format!("string of {} bytes exceeds u16 length", s.len())))?;
    buf.put_u16(len);
    buf.put_slice(s);
    Ok(())
}

fn put_count(buf: &mut BytesMut, count: usize) -> Result<()> {
    let count = u8::try_from(count)
        .map_err(|_| NtError::Encode(format!("array of {count} elements exceeds u8 count")))?;
    buf.put_u8(count);
    Ok(())
}
