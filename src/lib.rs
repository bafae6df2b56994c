//! # abif
//!
//! A bounds-checked decoder for ABIF files, the container format used for
//! Applied Biosystems Sanger sequencing traces (`.ab1`).
//!
//! An ABIF file is a flat directory of named, numbered tags. This crate reads the
//! directory, resolves the tags that describe a sequencing run and renders them
//! as three artifacts:
//!
//! 1. the four fluorescence channels (`G`, `A`, `T`, `C`), aligned to a common length
//! 2. the called bases with their trace positions and quality values, as a
//!    tab-separated table
//! 3. a one-row summary (file name, base count, trace length)
//!
//! ## Usage
//!
//! ```rust
//! use abif::parse_ab1;
//!
//! // magic, version and a root entry pointing at an empty directory table
//! let mut buf = b"ABIF\x00\x65".to_vec();
//! buf.extend_from_slice(b"tdir");
//! buf.extend_from_slice(&[0u8; 24]);
//!
//! let parsed = parse_ab1(&buf, "empty.ab1")?;
//! assert_eq!(parsed.summary.base_count, 0);
//! assert_eq!(parsed.base_data, "base_symbol\tbase_location\tbase_quality");
//!
//! // anything that does not start with `ABIF` is rejected
//! let err = parse_ab1(b"GIF89a", "image.gif").unwrap_err();
//! assert!(err.is_format_mismatch());
//! # Ok::<(), abif::Error>(())
//! ```
//!
//! ## Tags
//!
//! | Tag           | Content                         | Fallback      |
//! | ------------- | ------------------------------- | ------------- |
//! | `DATA` 9-12   | Analyzed G/A/T/C channel data   | `DATA` 1-4    |
//! | `PBAS` 2      | Edited base calls               | `PBAS` 1      |
//! | `PLOC` 2      | Edited peak locations           | `PLOC` 1      |
//! | `PCON` 2      | Edited quality values           | `PCON` 1      |
//!
//! ## Robustness
//!
//! Only a missing `ABIF` magic is an error. Every size and offset in the file is
//! treated as untrusted: directory tables are clamped to what the root entry
//! can describe and to the end of the buffer, payloads are clamped to the end of
//! the buffer, and missing tags decode as empty sequences. When fewer quality
//! values than calls are present, every call receives the default quality of 30.

mod calls;
mod directory;
mod entry;
mod error;
mod header;
mod output;
mod parallel;
mod reader;
mod tag;
mod trace;
mod utils;

#[cfg(test)]
mod fixture;

pub use calls::{normalize_bases, BaseCall, BaseCalls, DEFAULT_QUALITY};
pub use directory::Directory;
pub use entry::{DirEntry, TagKey, TagName, SIZE_DIR_ENTRY};
pub use error::{Error, HeaderError, ReadError, Result};
pub use header::{AbifHeader, MAGIC, SIZE_HEADER};
pub use output::{base_table, ParsedAb1, PeakData, Summary, BASE_TABLE_HEADER, SUMMARY_HEADER};
pub use parallel::{process_parallel, ParallelProcessor};
pub use reader::{
    parse_ab1, parse_with_config, read_ab1, AbifFile, MmapReader, ParseConfig, ParseConfigBuilder,
    DEFAULT_FILENAME,
};
pub use tag::{decode_integers, decode_text, TagResolver, TagValue, ValueKind};
pub use trace::{Channel, Trace};
