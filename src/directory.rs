//! Directory table scanning
//!
//! The root entry's data offset points at a table of 28-byte directory entries.
//! The declared entry count is untrusted: it is clamped to what the root entry's
//! data size can hold, and scanning stops at the first entry that would run past
//! the end of the buffer.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::entry::{DirEntry, TagKey, SIZE_DIR_ENTRY};

/// Registry of directory entries keyed by (name, number)
#[derive(Debug, Clone, Default)]
pub struct Directory {
    entries: HashMap<TagKey, DirEntry>,
    scanned: usize,
}
impl Directory {
    /// Number of entries to scan for a given root entry
    ///
    /// The declared count is used only when it is positive and does not exceed
    /// `floor(data_size / 28)`; otherwise the bound derived from the data size wins.
    #[must_use]
    pub fn entry_count(root: &DirEntry) -> usize {
        let bound = root.data_size as usize / SIZE_DIR_ENTRY;
        match root.num_elements as usize {
            0 => bound,
            n if n > bound => bound,
            n => n,
        }
    }

    /// Scans the directory table referenced by `root`
    ///
    /// Never fails: a table that runs off the end of the buffer is read up to the
    /// last complete entry.
    #[must_use]
    pub fn scan(buffer: &[u8], root: &DirEntry) -> Self {
        let count = Self::entry_count(root);
        let table = root.data_offset as usize;
        let mut entries = HashMap::with_capacity(count.min(buffer.len() / SIZE_DIR_ENTRY));
        let mut scanned = 0;

        for idx in 0..count {
            let Some(offset) = idx
                .checked_mul(SIZE_DIR_ENTRY)
                .and_then(|rel| rel.checked_add(table))
            else {
                break;
            };
            let Ok(entry) = DirEntry::from_buffer(buffer, offset) else {
                warn!(
                    offset,
                    scanned = idx,
                    declared = count,
                    buffer_len = buffer.len(),
                    "directory table truncated"
                );
                break;
            };
            entries.insert(entry.key(), entry);
            scanned += 1;
        }

        debug!(
            table_offset = table,
            declared = root.num_elements,
            scanned,
            tags = entries.len(),
            "scanned directory"
        );
        Self { entries, scanned }
    }

    /// Returns the entry for `key`, if present
    #[must_use]
    pub fn get(&self, key: &TagKey) -> Option<&DirEntry> {
        self.entries.get(key)
    }

    #[must_use]
    pub fn contains(&self, key: &TagKey) -> bool {
        self.entries.contains_key(key)
    }

    /// Returns the first entry present among `keys`, in priority order
    #[must_use]
    pub fn first_match(&self, keys: &[TagKey]) -> Option<&DirEntry> {
        keys.iter().find_map(|key| self.get(key))
    }

    /// Number of table records read, duplicates included
    #[must_use]
    pub fn scanned(&self) -> usize {
        self.scanned
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries ordered by their location in the directory table
    #[must_use]
    pub fn entries(&self) -> Vec<&DirEntry> {
        let mut entries: Vec<_> = self.entries.values().collect();
        entries.sort_by_key(|entry| entry.offset);
        entries
    }
}

#[cfg(test)]
mod testing {
    use super::*;
    use crate::fixture::{encode_entry, AbifBuilder};
    use crate::header::AbifHeader;
    use anyhow::Result;

    fn root(num_elements: u32, data_size: u32, data_offset: u32) -> DirEntry {
        let buf = encode_entry(b"tdir", 1, 1023, 28, num_elements, data_size, data_offset, 0);
        DirEntry::from_buffer(&buf, 0).unwrap()
    }

    #[test]
    fn test_entry_count() {
        assert_eq!(Directory::entry_count(&root(3, 84, 0)), 3);
        assert_eq!(Directory::entry_count(&root(2, 84, 0)), 2);
        // declared count larger than the data size allows
        assert_eq!(Directory::entry_count(&root(1000, 84, 0)), 3);
        // zero declared count falls back to the bound
        assert_eq!(Directory::entry_count(&root(0, 90, 0)), 3);
        assert_eq!(Directory::entry_count(&root(5, 27, 0)), 0);
    }

    #[test]
    fn test_scan() -> Result<()> {
        let buf = AbifBuilder::new()
            .text(b"PBAS", 1, "ACGT")
            .integers(b"PLOC", 1, 2, &[10, 11, 12, 13])
            .build();
        let header = AbifHeader::from_buffer(&buf)?;
        let dir = Directory::scan(&buf, &header.root);

        assert_eq!(dir.len(), 2);
        assert_eq!(dir.scanned(), 2);
        assert!(dir.contains(&TagKey::new(b"PBAS", 1)));
        assert!(dir.contains(&TagKey::new(b"PLOC", 1)));
        assert!(!dir.contains(&TagKey::new(b"PLOC", 2)));

        let names: Vec<_> = dir.entries().iter().map(|e| e.key().to_string()).collect();
        assert_eq!(names, ["PBAS1", "PLOC1"]);
        Ok(())
    }

    #[test]
    fn test_scan_clamps_declared_count() -> Result<()> {
        let mut buf = AbifBuilder::new()
            .text(b"PBAS", 1, "ACGT")
            .integers(b"PLOC", 1, 2, &[10, 11, 12, 13])
            .build();
        // claim a huge entry count
        buf[18..22].copy_from_slice(&u32::MAX.to_be_bytes());
        let header = AbifHeader::from_buffer(&buf)?;
        assert_eq!(Directory::entry_count(&header.root), 2);
        assert_eq!(Directory::scan(&buf, &header.root).len(), 2);
        Ok(())
    }

    #[test]
    fn test_scan_stops_at_truncation() -> Result<()> {
        let buf = AbifBuilder::new()
            .text(b"PBAS", 1, "ACGT")
            .integers(b"PLOC", 1, 2, &[10, 11, 12, 13])
            .build();
        // directory table sits at the end: cut the second entry short
        let truncated = &buf[..buf.len() - 1];
        let header = AbifHeader::from_buffer(truncated)?;
        let dir = Directory::scan(truncated, &header.root);
        assert_eq!(dir.len(), 1);
        assert_eq!(dir.scanned(), 1);
        assert_eq!(Directory::entry_count(&header.root), 2);
        assert!(dir.contains(&TagKey::new(b"PBAS", 1)));
        Ok(())
    }

    #[test]
    fn test_scan_table_outside_buffer() {
        let buf = vec![0u8; 64];
        let dir = Directory::scan(&buf, &root(2, 56, u32::MAX));
        assert!(dir.is_empty());
        assert_eq!(dir.scanned(), 0);
    }

    #[test]
    fn test_duplicate_keys_overwrite() -> Result<()> {
        let buf = AbifBuilder::new()
            .integers(b"PLOC", 1, 2, &[1, 2])
            .integers(b"PLOC", 1, 2, &[3, 4, 5])
            .build();
        let header = AbifHeader::from_buffer(&buf)?;
        let dir = Directory::scan(&buf, &header.root);
        assert_eq!(dir.len(), 1);
        assert_eq!(dir.scanned(), 2);
        let entry = dir.get(&TagKey::new(b"PLOC", 1)).unwrap();
        assert_eq!(entry.num_elements, 3);
        Ok(())
    }

    #[test]
    fn test_first_match() -> Result<()> {
        let buf = AbifBuilder::new()
            .integers(b"DATA", 1, 2, &[1, 2])
            .integers(b"DATA", 9, 2, &[3, 4])
            .build();
        let header = AbifHeader::from_buffer(&buf)?;
        let dir = Directory::scan(&buf, &header.root);

        let keys = [TagKey::new(b"DATA", 9), TagKey::new(b"DATA", 1)];
        assert_eq!(dir.first_match(&keys).map(DirEntry::key), Some(keys[0]));
        let keys = [TagKey::new(b"DATA", 10), TagKey::new(b"DATA", 1)];
        assert_eq!(dir.first_match(&keys).map(DirEntry::key), Some(keys[1]));
        assert!(dir.first_match(&[TagKey::new(b"DATA", 12)]).is_none());
        assert!(dir.first_match(&[]).is_none());
        Ok(())
    }
}
