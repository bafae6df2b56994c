//! Directory entry module
//!
//! An ABIF directory is a flat table of fixed-size 28-byte records. Each record
//! names one tag, describes the type and width of its elements, and either points
//! to the tag's data elsewhere in the file or (for payloads of four bytes or less)
//! carries the data inline in its offset field.
//!
//! ## Directory entry layout (28 bytes, big-endian)
//!
//! | Offset | Size (bytes) | Name         | Description                             | Type    |
//! | ------ | ------------ | ------------ | --------------------------------------- | ------- |
//! | 0      | 4            | name         | Tag name (ASCII, not NUL-terminated)    | `[u8;4]`|
//! | 4      | 4            | number       | Tag instance number                     | uint32  |
//! | 8      | 2            | element_type | Element type code                       | uint16  |
//! | 10     | 2            | element_size | Size of one element in bytes            | uint16  |
//! | 12     | 4            | num_elements | Number of elements                      | uint32  |
//! | 16     | 4            | data_size    | Total payload size in bytes             | uint32  |
//! | 20     | 4            | data_offset  | Payload offset, or inline payload       | uint32  |
//! | 24     | 4            | handle       | Reserved                                | uint32  |

use std::fmt;
use std::ops::Range;

use crate::error::Result;
use crate::utils::{clamped_range, read_array, read_u16, read_u32};

/// Size of a directory entry in bytes
pub const SIZE_DIR_ENTRY: usize = 28;

/// Position of the data offset field (and of inline payloads) within an entry
pub const INLINE_DATA_OFFSET: usize = 20;

/// Payloads of at most this many bytes are stored inline
pub const INLINE_DATA_LIMIT: u32 = 4;

/// A four byte tag name such as `DATA` or `PBAS`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TagName([u8; 4]);
impl TagName {
    #[must_use]
    pub const fn new(name: [u8; 4]) -> Self {
        Self(name)
    }

    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 4] {
        &self.0
    }
}
impl fmt::Display for TagName {
    /// Each byte is rendered as the character with the same code point
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &b in &self.0 {
            write!(f, "{}", b as char)?;
        }
        Ok(())
    }
}
impl From<[u8; 4]> for TagName {
    fn from(name: [u8; 4]) -> Self {
        Self(name)
    }
}

/// Composite key identifying a tag in the directory: (name, number)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TagKey {
    pub name: TagName,
    pub number: u32,
}
impl TagKey {
    #[must_use]
    pub const fn new(name: &[u8; 4], number: u32) -> Self {
        Self {
            name: TagName::new(*name),
            number,
        }
    }
}
impl fmt::Display for TagKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.name, self.number)
    }
}

/// A decoded directory entry
///
/// Field values are stored exactly as found in the file. None of them are
/// trusted: consumers clamp every offset and size against the buffer before
/// touching payload bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirEntry {
    /// Tag name
    pub name: TagName,

    /// Tag instance number
    pub number: u32,

    /// Element type code (unused by the decoder)
    pub element_type: u16,

    /// Size of one element in bytes
    pub element_size: u16,

    /// Declared number of elements
    pub num_elements: u32,

    /// Total payload size in bytes
    pub data_size: u32,

    /// Absolute payload offset (meaningless for inline payloads)
    pub data_offset: u32,

    /// Reserved data handle
    pub handle: u32,

    /// Absolute offset of this entry within the buffer
    pub offset: usize,
}
impl DirEntry {
    /// Decodes the 28-byte entry starting at `offset`
    ///
    /// Fails only if the entry itself would run past the end of the buffer.
    pub fn from_buffer(buffer: &[u8], offset: usize) -> Result<Self> {
        // read the last field first so a truncated entry fails before any work
        let handle = read_u32(buffer, offset.saturating_add(24))?;
        Ok(Self {
            name: TagName::new(read_array::<4>(buffer, offset)?),
            number: read_u32(buffer, offset + 4)?,
            element_type: read_u16(buffer, offset + 8)?,
            element_size: read_u16(buffer, offset + 10)?,
            num_elements: read_u32(buffer, offset + 12)?,
            data_size: read_u32(buffer, offset + 16)?,
            data_offset: read_u32(buffer, offset + 20)?,
            handle,
            offset,
        })
    }

    /// The (name, number) key of this entry
    #[must_use]
    pub fn key(&self) -> TagKey {
        TagKey {
            name: self.name,
            number: self.number,
        }
    }

    /// Whether the payload is stored inline in the data offset field
    #[must_use]
    pub fn is_inline(&self) -> bool {
        self.data_size <= INLINE_DATA_LIMIT
    }

    /// Range of the payload bytes, clamped to a buffer of length `len`
    ///
    /// The range is empty when the payload lies entirely outside the buffer.
    #[must_use]
    pub fn data_range(&self, len: usize) -> Range<usize> {
        let start = if self.is_inline() {
            self.offset.saturating_add(INLINE_DATA_OFFSET)
        } else {
            self.data_offset as usize
        };
        clamped_range(len, start, self.data_size as usize)
    }
}
