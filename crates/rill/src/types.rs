// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Type support for rill payloads.
//!
//! A type crosses the middleware when it implements [`DdsType`]: a stable
//! type name (used for endpoint matching) plus CDR-style encode/decode. The
//! wire format is private to the middleware; consumers never see encoded
//! bytes.

use crate::Result;

/// Serialization seam between user types and the middleware.
///
/// The type name participates in endpoint matching: a writer and a reader
/// only bind when topic name and type name agree.
pub trait DdsType: Send + Sync + 'static {
    /// Stable type name announced to the domain registry.
    fn type_name() -> &'static str;

    /// Append the CDR encoding of `self` to `buf`.
    fn encode_cdr(&self, buf: &mut Vec<u8>) -> Result<()>;

    /// Decode a value from an encoded buffer.
    fn decode_cdr(buf: &[u8]) -> Result<Self>
    where
        Self: Sized;
}

/// Little-endian CDR-style primitive codecs.
///
/// Strings are encoded as a u32 byte length followed by UTF-8 bytes, no
/// terminator.
pub mod cdr {
    use crate::{Error, Result};

    /// Append a little-endian u32.
    pub fn put_u32(buf: &mut Vec<u8>, value: u32) {
        buf.extend_from_slice(&value.to_le_bytes());
    }

    /// Read a little-endian u32 at `*pos`, advancing it.
    pub fn get_u32(buf: &[u8], pos: &mut usize) -> Result<u32> {
        let end = pos.checked_add(4).ok_or(Error::BufferTooSmall)?;
        let bytes = buf.get(*pos..end).ok_or(Error::BufferTooSmall)?;
        *pos = end;
        // get() guarantees 4 bytes
        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// Append a length-prefixed UTF-8 string.
    pub fn put_string(buf: &mut Vec<u8>, value: &str) {
        put_u32(buf, value.len() as u32);
        buf.extend_from_slice(value.as_bytes());
    }

    /// Read a length-prefixed UTF-8 string at `*pos`, advancing it.
    pub fn get_string(buf: &[u8], pos: &mut usize) -> Result<String> {
        let len = get_u32(buf, pos)? as usize;
        let end = pos.checked_add(len).ok_or(Error::BufferTooSmall)?;
        let bytes = buf.get(*pos..end).ok_or(Error::BufferTooSmall)?;
        *pos = end;
        String::from_utf8(bytes.to_vec()).map_err(|_| Error::SerializationError)
    }
}
