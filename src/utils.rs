//! Bounds-checked big-endian reads over an immutable byte buffer
//!
//! Every multi-byte integer in an ABIF file is big-endian. These helpers never
//! index past the end of the buffer: they either return the decoded value or a
//! [`ReadError::OutOfBounds`].

use std::ops::Range;

use byteorder::{BigEndian, ByteOrder};

use crate::error::{ReadError, Result};

/// Returns the `width` bytes starting at `offset`, or an out-of-bounds error
fn window(buffer: &[u8], offset: usize, width: usize) -> Result<&[u8]> {
    match offset.checked_add(width) {
        Some(end) if end <= buffer.len() => Ok(&buffer[offset..end]),
        _ => Err(ReadError::OutOfBounds {
            offset,
            width,
            len: buffer.len(),
        }
        .into()),
    }
}

pub fn read_u8(buffer: &[u8], offset: usize) -> Result<u8> {
    Ok(window(buffer, offset, 1)?[0])
}

pub fn read_u16(buffer: &[u8], offset: usize) -> Result<u16> {
    window(buffer, offset, 2).map(BigEndian::read_u16)
}

pub fn read_u32(buffer: &[u8], offset: usize) -> Result<u32> {
    window(buffer, offset, 4).map(BigEndian::read_u32)
}

pub fn read_i32(buffer: &[u8], offset: usize) -> Result<i32> {
    window(buffer, offset, 4).map(BigEndian::read_i32)
}

/// Reads a fixed-size byte array starting at `offset`
pub fn read_array<const N: usize>(buffer: &[u8], offset: usize) -> Result<[u8; N]> {
    let mut out = [0u8; N];
    out.copy_from_slice(window(buffer, offset, N)?);
    Ok(out)
}

/// Clamps the range `start..start + size` to a buffer of length `len`
///
/// Returns an empty range (`start..start`, or `len..len` when `start` lies past
/// the end) whenever the clamped end does not exceed the start. Overflowing
/// arithmetic clamps to `len` instead of wrapping.
#[must_use]
pub fn clamped_range(len: usize, start: usize, size: usize) -> Range<usize> {
    let end = start.saturating_add(size).min(len);
    if end <= start {
        let start = start.min(len);
        return start..start;
    }
    start..end
}
