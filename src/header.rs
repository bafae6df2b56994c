//! Header module for the abif library
//!
//! An ABIF file opens with a 4-byte magic number, a 2-byte version and the root
//! directory entry, which locates the directory table.
//!
//! | Offset | Size (bytes) | Name    | Description                   | Type     |
//! | ------ | ------------ | ------- | ----------------------------- | -------- |
//! | 0      | 4            | magic   | Magic bytes (`ABIF`)          | `[u8;4]` |
//! | 4      | 2            | version | Format version                | uint16   |
//! | 6      | 28           | root    | Root directory entry          | entry    |

use crate::entry::{DirEntry, SIZE_DIR_ENTRY};
use crate::error::{HeaderError, Result};
use crate::utils::read_u16;

/// Magic bytes identifying an ABIF file
pub const MAGIC: &[u8; 4] = b"ABIF";

/// Offset of the root directory entry
pub const ROOT_ENTRY_OFFSET: usize = 6;

/// Size of the header (magic + version + root entry) in bytes
pub const SIZE_HEADER: usize = ROOT_ENTRY_OFFSET + SIZE_DIR_ENTRY;

/// Checks that the buffer begins with the `ABIF` magic bytes
///
/// Buffers shorter than four bytes are reported with their bytes zero-padded.
pub fn validate_magic(buffer: &[u8]) -> Result<()> {
    if buffer.starts_with(MAGIC) {
        return Ok(());
    }
    let mut found = [0u8; 4];
    let n = buffer.len().min(4);
    found[..n].copy_from_slice(&buffer[..n]);
    Err(HeaderError::InvalidMagicNumber(found).into())
}

/// Header structure for ABIF files
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AbifHeader {
    /// Format version
    ///
    /// 2 bytes
    pub version: u16,

    /// Root directory entry pointing at the directory table
    ///
    /// 28 bytes
    pub root: DirEntry,
}
impl AbifHeader {
    /// Parses the header from the start of a buffer
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// * The magic bytes are not `ABIF`
    /// * The buffer is smaller than `SIZE_HEADER`
    pub fn from_buffer(buffer: &[u8]) -> Result<Self> {
        validate_magic(buffer)?;
        if buffer.len() < SIZE_HEADER {
            return Err(HeaderError::InvalidSize(buffer.len(), SIZE_HEADER).into());
        }
        Ok(Self {
            version: read_u16(buffer, 4)?,
            root: DirEntry::from_buffer(buffer, ROOT_ENTRY_OFFSET)?,
        })
    }
}
