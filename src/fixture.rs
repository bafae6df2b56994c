//! Synthetic ABIF buffers for tests
//!
//! Layout produced by [`AbifBuilder::build`]:
//! header (34 bytes) | out-of-line payloads | directory table

use byteorder::{BigEndian, ByteOrder};

use crate::entry::{INLINE_DATA_LIMIT, SIZE_DIR_ENTRY};
use crate::header::{MAGIC, SIZE_HEADER};

#[allow(clippy::too_many_arguments)]
pub fn encode_entry(
    name: &[u8; 4],
    number: u32,
    element_type: u16,
    element_size: u16,
    num_elements: u32,
    data_size: u32,
    data_offset: u32,
    handle: u32,
) -> Vec<u8> {
    let mut buf = vec![0u8; SIZE_DIR_ENTRY];
    buf[0..4].copy_from_slice(name);
    BigEndian::write_u32(&mut buf[4..8], number);
    BigEndian::write_u16(&mut buf[8..10], element_type);
    BigEndian::write_u16(&mut buf[10..12], element_size);
    BigEndian::write_u32(&mut buf[12..16], num_elements);
    BigEndian::write_u32(&mut buf[16..20], data_size);
    BigEndian::write_u32(&mut buf[20..24], data_offset);
    BigEndian::write_u32(&mut buf[24..28], handle);
    buf
}

struct Tag {
    name: [u8; 4],
    number: u32,
    element_type: u16,
    element_size: u16,
    num_elements: u32,
    payload: Vec<u8>,
}

pub struct AbifBuilder {
    version: u16,
    tags: Vec<Tag>,
}
impl Default for AbifBuilder {
    fn default() -> Self {
        Self {
            version: 101,
            tags: Vec::new(),
        }
    }
}
impl AbifBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn version(mut self, version: u16) -> Self {
        self.version = version;
        self
    }

    /// Adds a `char` (type 2) tag holding the bytes of `text`
    pub fn text(self, name: &[u8; 4], number: u32, text: &str) -> Self {
        let payload = text.as_bytes().to_vec();
        let n = payload.len() as u32;
        self.raw(name, number, 2, 1, n, payload)
    }

    /// Adds an integer tag with big-endian elements of `element_size` bytes
    pub fn integers(self, name: &[u8; 4], number: u32, element_size: u16, values: &[i32]) -> Self {
        let mut payload = Vec::with_capacity(values.len() * element_size as usize);
        let element_type = match element_size {
            1 => {
                payload.extend(values.iter().map(|&v| v as u8));
                1
            }
            2 => {
                for &v in values {
                    payload.extend_from_slice(&(v as u16).to_be_bytes());
                }
                4
            }
            4 => {
                for &v in values {
                    payload.extend_from_slice(&v.to_be_bytes());
                }
                5
            }
            _ => panic!("unsupported element size: {element_size}"),
        };
        self.raw(
            name,
            number,
            element_type,
            element_size,
            values.len() as u32,
            payload,
        )
    }

    pub fn raw(
        mut self,
        name: &[u8; 4],
        number: u32,
        element_type: u16,
        element_size: u16,
        num_elements: u32,
        payload: Vec<u8>,
    ) -> Self {
        self.tags.push(Tag {
            name: *name,
            number,
            element_type,
            element_size,
            num_elements,
            payload,
        });
        self
    }

    pub fn build(self) -> Vec<u8> {
        let mut buf = vec![0u8; SIZE_HEADER];
        let mut table = Vec::with_capacity(self.tags.len() * SIZE_DIR_ENTRY);

        for tag in &self.tags {
            let data_size = tag.payload.len() as u32;
            let mut entry = encode_entry(
                &tag.name,
                tag.number,
                tag.element_type,
                tag.element_size,
                tag.num_elements,
                data_size,
                0,
                0,
            );
            if data_size <= INLINE_DATA_LIMIT {
                entry[20..20 + tag.payload.len()].copy_from_slice(&tag.payload);
            } else {
                BigEndian::write_u32(&mut entry[20..24], buf.len() as u32);
                buf.extend_from_slice(&tag.payload);
            }
            table.extend_from_slice(&entry);
        }

        let table_offset = buf.len() as u32;
        let count = self.tags.len() as u32;
        buf[0..4].copy_from_slice(MAGIC);
        BigEndian::write_u16(&mut buf[4..6], self.version);
        buf[6..SIZE_HEADER].copy_from_slice(&encode_entry(
            b"tdir",
            1,
            1023,
            SIZE_DIR_ENTRY as u16,
            count,
            count * SIZE_DIR_ENTRY as u32,
            table_offset,
            0,
        ));
        buf.extend_from_slice(&table);
        buf
    }
}
