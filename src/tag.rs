//! Tag payload resolution and decoding
//!
//! A [`TagResolver`] looks tags up in a [`Directory`], extracts their payload
//! bytes from the buffer (inline or by offset, always clamped to the buffer) and
//! decodes them either as text or as a sequence of big-endian integers.
//!
//! Missing tags are not errors: lookups return `None` and callers decide which
//! candidate key to try next.

use crate::directory::Directory;
use crate::entry::{DirEntry, TagKey};
use crate::utils::{read_i32, read_u16, read_u8};

/// A decoded tag payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagValue {
    /// Text with trailing NUL bytes removed
    Text(String),
    /// Big-endian integers of the tag's element width
    Integers(Vec<i32>),
}
impl TagValue {
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::Integers(_) => None,
        }
    }

    #[must_use]
    pub fn as_integers(&self) -> Option<&[i32]> {
        match self {
            Self::Integers(v) => Some(v),
            Self::Text(_) => None,
        }
    }
}

/// How a payload should be interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Text,
    Integers,
}

/// Decodes bytes as text, one character per byte, dropping trailing NULs
#[must_use]
pub fn decode_text(bytes: &[u8]) -> String {
    let end = bytes.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1);
    bytes[..end].iter().map(|&b| b as char).collect()
}

/// Decodes bytes as big-endian integers of `element_size` bytes
///
/// Widths 1 and 2 are unsigned, width 4 is signed. Any other width yields one
/// unsigned byte per element, `floor(len / element_size)` elements in total (one
/// per byte when the width is zero). Trailing partial elements are dropped.
#[must_use]
pub fn decode_integers(bytes: &[u8], element_size: u16) -> Vec<i32> {
    let count = match element_size {
        0 => bytes.len(),
        width => bytes.len() / width as usize,
    };
    (0..count)
        .map_while(|idx| {
            match element_size {
                2 => read_u16(bytes, idx * 2).map(i32::from),
                4 => read_i32(bytes, idx * 4),
                _ => read_u8(bytes, idx).map(i32::from),
            }
            .ok()
        })
        .collect()
}

/// Resolves tag keys to decoded payloads over a borrowed buffer
#[derive(Debug, Clone, Copy)]
pub struct TagResolver<'a> {
    buffer: &'a [u8],
    directory: &'a Directory,
}
impl<'a> TagResolver<'a> {
    #[must_use]
    pub fn new(buffer: &'a [u8], directory: &'a Directory) -> Self {
        Self { buffer, directory }
    }

    #[must_use]
    pub fn directory(&self) -> &'a Directory {
        self.directory
    }

    /// Payload bytes of an entry, clamped to the buffer
    #[must_use]
    pub fn entry_bytes(&self, entry: &DirEntry) -> &'a [u8] {
        &self.buffer[entry.data_range(self.buffer.len())]
    }

    /// Copies out the payload bytes of `key`
    #[must_use]
    pub fn raw_bytes(&self, key: &TagKey) -> Option<Vec<u8>> {
        self.directory
            .get(key)
            .map(|entry| self.entry_bytes(entry).to_vec())
    }

    #[must_use]
    pub fn text(&self, key: &TagKey) -> Option<String> {
        self.directory
            .get(key)
            .map(|entry| decode_text(self.entry_bytes(entry)))
    }

    #[must_use]
    pub fn integers(&self, key: &TagKey) -> Option<Vec<i32>> {
        self.directory
            .get(key)
            .map(|entry| decode_integers(self.entry_bytes(entry), entry.element_size))
    }

    #[must_use]
    pub fn value(&self, key: &TagKey, kind: ValueKind) -> Option<TagValue> {
        match kind {
            ValueKind::Text => self.text(key).map(TagValue::Text),
            ValueKind::Integers => self.integers(key).map(TagValue::Integers),
        }
    }

    /// Evaluates `keys` in priority order and returns the first decoded value
    ///
    /// A candidate counts as present when `decode` returns `Some`.
    pub fn first_present<T, F>(&self, keys: &[TagKey], decode: F) -> Option<T>
    where
        F: Fn(&Self, &TagKey) -> Option<T>,
    {
        keys.iter().find_map(|key| decode(self, key))
    }
}

#[cfg(test)]
mod testing {
    use super::*;
    use crate::fixture::{encode_entry, AbifBuilder};
    use crate::header::AbifHeader;
    use anyhow::Result;

    fn directory(buf: &[u8]) -> Result<Directory> {
        let header = AbifHeader::from_buffer(buf)?;
        Ok(Directory::scan(buf, &header.root))
    }

    #[test]
    fn test_decode_text() {
        assert_eq!(decode_text(b"ACGT\0\0"), "ACGT");
        assert_eq!(decode_text(b"AC\0GT"), "AC\0GT");
        assert_eq!(decode_text(b"\0\0"), "");
        assert_eq!(decode_text(b""), "");
        assert_eq!(decode_text(&[0xE9]), "\u{e9}");
    }

    #[test]
    fn test_decode_integers() {
        let bytes = [0x00, 0x0A, 0xFF, 0xFF, 0x80];
        assert_eq!(decode_integers(&bytes, 1), [0, 10, 255, 255, 128]);
        assert_eq!(decode_integers(&bytes, 2), [10, 65535]);
        assert_eq!(decode_integers(&[0xFF, 0xFF, 0xFF, 0xFF, 0x00], 4), [-1]);
        assert_eq!(decode_integers(&[0, 0, 1], 4), Vec::<i32>::new());
        // unusual widths fall back to one unsigned byte per element
        assert_eq!(decode_integers(&[1, 2, 3, 4, 5, 6, 7], 3), [1, 2]);
        assert_eq!(decode_integers(&[1, 2, 3], 8), Vec::<i32>::new());
        assert_eq!(decode_integers(&[7, 8], 0), [7, 8]);
    }

    #[test]
    fn test_resolve_tags() -> Result<()> {
        let buf = AbifBuilder::new()
            .text(b"PBAS", 2, "ACGTN\0")
            .integers(b"PLOC", 2, 2, &[10, 20, 300])
            .integers(b"DATA", 9, 4, &[-5, 70000])
            .build();
        let dir = directory(&buf)?;
        let resolver = TagResolver::new(&buf, &dir);

        assert_eq!(resolver.text(&TagKey::new(b"PBAS", 2)).as_deref(), Some("ACGTN"));
        assert_eq!(resolver.integers(&TagKey::new(b"PLOC", 2)), Some(vec![10, 20, 300]));
        assert_eq!(resolver.integers(&TagKey::new(b"DATA", 9)), Some(vec![-5, 70000]));
        assert_eq!(resolver.text(&TagKey::new(b"PBAS", 1)), None);
        assert_eq!(resolver.integers(&TagKey::new(b"PCON", 2)), None);

        let value = resolver.value(&TagKey::new(b"PLOC", 2), ValueKind::Integers);
        assert_eq!(value.as_ref().and_then(TagValue::as_integers), Some(&[10, 20, 300][..]));
        assert!(value.and_then(|v| v.as_text().map(str::to_owned)).is_none());
        Ok(())
    }

    #[test]
    fn test_inline_payload_ignores_offset() -> Result<()> {
        // a lone entry with data_size 2, inline bytes 0xCAFE and a bogus offset field tail
        let mut buf = AbifBuilder::new().build();
        let mut entry = encode_entry(b"TEST", 1, 4, 2, 1, 2, 0, 0);
        entry[20..24].copy_from_slice(&[0xCA, 0xFE, 0x7F, 0xFF]);
        let table = buf.len() as u32;
        buf.extend_from_slice(&entry);
        buf[18..22].copy_from_slice(&1u32.to_be_bytes());
        buf[22..26].copy_from_slice(&28u32.to_be_bytes());
        buf[26..30].copy_from_slice(&table.to_be_bytes());

        let dir = directory(&buf)?;
        let resolver = TagResolver::new(&buf, &dir);
        let key = TagKey::new(b"TEST", 1);
        assert_eq!(resolver.raw_bytes(&key), Some(vec![0xCA, 0xFE]));
        assert_eq!(resolver.integers(&key), Some(vec![0xCAFE]));
        Ok(())
    }

    #[test]
    fn test_payload_clamped_to_buffer() -> Result<()> {
        let buf = AbifBuilder::new()
            .integers(b"DATA", 1, 2, &[1, 2, 3, 4, 5])
            .build();
        let dir = directory(&buf)?;
        let entry = *dir.get(&TagKey::new(b"DATA", 1)).unwrap();

        // grow the declared size past the end of the buffer
        let mut grown = buf.clone();
        let size_at = entry.offset + 16;
        grown[size_at..size_at + 4].copy_from_slice(&u32::MAX.to_be_bytes());
        let dir = directory(&grown)?;
        let resolver = TagResolver::new(&grown, &dir);
        let values = resolver.integers(&TagKey::new(b"DATA", 1)).unwrap();
        assert_eq!(&values[..5], &[1, 2, 3, 4, 5]);

        // point the payload past the end of the buffer
        let mut moved = buf.clone();
        let offset_at = entry.offset + 20;
        moved[offset_at..offset_at + 4].copy_from_slice(&(buf.len() as u32 + 10).to_be_bytes());
        let dir = directory(&moved)?;
        let resolver = TagResolver::new(&moved, &dir);
        assert_eq!(resolver.integers(&TagKey::new(b"DATA", 1)), Some(Vec::new()));
        Ok(())
    }

    #[test]
    fn test_first_present() -> Result<()> {
        let buf = AbifBuilder::new()
            .text(b"PBAS", 2, "")
            .text(b"PBAS", 1, "ACGT")
            .build();
        let dir = directory(&buf)?;
        let resolver = TagResolver::new(&buf, &dir);
        let keys = [TagKey::new(b"PBAS", 2), TagKey::new(b"PBAS", 1)];

        let present = resolver.first_present(&keys, TagResolver::text);
        assert_eq!(present.as_deref(), Some(""));

        let non_empty =
            resolver.first_present(&keys, |r, key| r.text(key).filter(|s| !s.is_empty()));
        assert_eq!(non_empty.as_deref(), Some("ACGT"));

        let missing = resolver.first_present(&[TagKey::new(b"PCON", 2)], TagResolver::integers);
        assert!(missing.is_none());
        Ok(())
    }
}
