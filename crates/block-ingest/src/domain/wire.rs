//! Low-level wire primitives.
//!
//! Integers are little-endian. Variable-length fields carry a compact-size
//! prefix: values below `0xFD` take one byte, then `0xFD`+u16, `0xFE`+u32,
//! `0xFF`+u64. Decoders only accept the shortest form.

use thiserror::Error;

/// Upper bound for any single variable-length field.
pub const MAX_VAR_BYTES: usize = 4 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("unexpected end of input: needed {needed} bytes, {remaining} remaining")]
    UnexpectedEof { needed: usize, remaining: usize },

    #[error("{0} trailing bytes after message")]
    TrailingBytes(usize),

    #[error("non-canonical compact size encoding")]
    NonCanonicalVarInt,

    #[error("length {len} exceeds limit {max}")]
    LengthOverflow { len: u64, max: usize },
}

pub type CodecResult<T> = Result<T, CodecError>;

pub trait WireEncode {
    fn encode(&self, out: &mut Vec<u8>);

    fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        self.encode(&mut out);
        out
    }
}

pub trait WireDecode: Sized {
    fn decode(input: &mut &[u8]) -> CodecResult<Self>;

    /// Decode a complete message, rejecting trailing bytes.
    fn from_bytes(bytes: &[u8]) -> CodecResult<Self> {
        let mut input = bytes;
        let value = Self::decode(&mut input)?;
        if !input.is_empty() {
            return Err(CodecError::TrailingBytes(input.len()));
        }
        Ok(value)
    }
}

pub fn put_u16(out: &mut Vec<u8>, value: u16) {
    out.extend_from_slice(&value.to_le_bytes());
}

pub fn put_u32(out: &mut Vec<u8>, value: u32) {
    out.extend_from_slice(&value.to_le_bytes());
}

pub fn put_u64(out: &mut Vec<u8>, value: u64) {
    out.extend_from_slice(&value.to_le_bytes());
}

pub fn put_bytes(out: &mut Vec<u8>, bytes: &[u8]) {
    out.extend_from_slice(bytes);
}

pub fn put_varint(out: &mut Vec<u8>, value: u64) {
    match value {
        0..=0xFC => out.push(value as u8),
        0xFD..=0xFFFF => {
            out.push(0xFD);
            put_u16(out, value as u16);
        }
        0x1_0000..=0xFFFF_FFFF => {
            out.push(0xFE);
            put_u32(out, value as u32);
        }
        _ => {
            out.push(0xFF);
            put_u64(out, value);
        }
    }
}

pub fn put_var_bytes(out: &mut Vec<u8>, bytes: &[u8]) {
    put_varint(out, bytes.len() as u64);
    put_bytes(out, bytes);
}

fn take<'a>(input: &mut &'a [u8], n: usize) -> CodecResult<&'a [u8]> {
    if input.len() < n {
        return Err(CodecError::UnexpectedEof {
            needed: n,
            remaining: input.len(),
        });
    }
    let (head, tail) = input.split_at(n);
    *input = tail;
    Ok(head)
}

pub fn get_u8(input: &mut &[u8]) -> CodecResult<u8> {
    Ok(take(input, 1)?[0])
}

pub fn get_u16(input: &mut &[u8]) -> CodecResult<u16> {
    let mut buf = [0u8; 2];
    buf.copy_from_slice(take(input, 2)?);
    Ok(u16::from_le_bytes(buf))
}

pub fn get_u32(input: &mut &[u8]) -> CodecResult<u32> {
    let mut buf = [0u8; 4];
    buf.copy_from_slice(take(input, 4)?);
    Ok(u32::from_le_bytes(buf))
}

pub fn get_u64(input: &mut &[u8]) -> CodecResult<u64> {
    let mut buf = [0u8; 8];
    buf.copy_from_slice(take(input, 8)?);
    Ok(u64::from_le_bytes(buf))
}

pub fn get_array<const N: usize>(input: &mut &[u8]) -> CodecResult<[u8; N]> {
    let mut buf = [0u8; N];
    buf.copy_from_slice(take(input, N)?);
    Ok(buf)
}

pub fn get_varint(input: &mut &[u8]) -> CodecResult<u64> {
    let (value, min) = match get_u8(input)? {
        0xFD => (u64::from(get_u16(input)?), 0xFD),
        0xFE => (u64::from(get_u32(input)?), 0x1_0000),
        0xFF => (get_u64(input)?, 0x1_0000_0000),
        small => return Ok(u64::from(small)),
    };
    if value < min {
        return Err(CodecError::NonCanonicalVarInt);
    }
    Ok(value)
}

/// Read a compact-size length and check it against `max`.
pub fn get_len(input: &mut &[u8], max: usize) -> CodecResult<usize> {
    let len = get_varint(input)?;
    if len > max as u64 {
        return Err(CodecError::LengthOverflow { len, max });
    }
    Ok(len as usize)
}

pub fn get_var_bytes(input: &mut &[u8]) -> CodecResult<Vec<u8>> {
    let len = get_len(input, MAX_VAR_BYTES)?;
    Ok(take(input, len)?.to_vec())
}
