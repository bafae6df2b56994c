//! Trace file reader module
//!
//! This module provides the entry points for parsing ABIF buffers:
//! 1. [`parse_ab1`] for a buffer already in memory
//! 2. [`MmapReader`] for memory-mapped access to a file on disk
//! 3. [`read_ab1`] for any [`Read`] source, which is read fully into memory first
//!
//! Only a missing `ABIF` magic is reported as a parse error. Every other defect
//! (truncated directories, missing tags, payloads running off the end of the
//! buffer) degrades to empty or default values.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use memmap2::Mmap;
use tracing::{debug, warn};

use crate::calls::{BaseCalls, DEFAULT_QUALITY};
use crate::directory::Directory;
use crate::error::{Error, HeaderError, ReadError, Result};
use crate::header::{validate_magic, AbifHeader};
use crate::output::ParsedAb1;
use crate::tag::TagResolver;
use crate::trace::Trace;

/// Filename reported in the summary when none is given
pub const DEFAULT_FILENAME: &str = "uploaded.ab1";

/// Options controlling how a trace file is rendered
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseConfig {
    /// Filename reported in the summary record
    filename: String,
    /// Quality assigned to every call when the quality tag is missing or too short
    default_quality: i32,
}
impl Default for ParseConfig {
    fn default() -> Self {
        Self {
            filename: DEFAULT_FILENAME.to_string(),
            default_quality: DEFAULT_QUALITY,
        }
    }
}
impl ParseConfig {
    #[must_use]
    pub fn builder() -> ParseConfigBuilder {
        ParseConfigBuilder::default()
    }

    #[must_use]
    pub fn filename(&self) -> &str {
        &self.filename
    }

    #[must_use]
    pub fn default_quality(&self) -> i32 {
        self.default_quality
    }
}

#[derive(Debug, Clone, Default)]
pub struct ParseConfigBuilder {
    filename: Option<String>,
    default_quality: Option<i32>,
}
impl ParseConfigBuilder {
    #[must_use]
    pub fn filename<S: Into<String>>(mut self, filename: S) -> Self {
        self.filename = Some(filename.into());
        self
    }

    #[must_use]
    pub fn default_quality(mut self, quality: i32) -> Self {
        self.default_quality = Some(quality);
        self
    }

    #[must_use]
    pub fn build(self) -> ParseConfig {
        ParseConfig {
            filename: self
                .filename
                .unwrap_or_else(|| DEFAULT_FILENAME.to_string()),
            default_quality: self.default_quality.unwrap_or(DEFAULT_QUALITY),
        }
    }
}

/// A parsed view over an ABIF buffer
///
/// Holds the header (when the buffer is long enough to contain one) and the
/// directory registry. Tag payloads are decoded on demand from the borrowed
/// buffer.
#[derive(Debug, Clone)]
pub struct AbifFile<'a> {
    buffer: &'a [u8],
    header: Option<AbifHeader>,
    directory: Directory,
}
impl<'a> AbifFile<'a> {
    /// Validates the magic bytes and scans the directory
    ///
    /// # Errors
    ///
    /// Fails only when the buffer does not start with `ABIF`. A buffer too short
    /// to hold the root entry yields an empty directory.
    pub fn parse(buffer: &'a [u8]) -> Result<Self> {
        validate_magic(buffer)?;
        let (header, directory) = match AbifHeader::from_buffer(buffer) {
            Ok(header) => (Some(header), Directory::scan(buffer, &header.root)),
            Err(Error::HeaderError(HeaderError::InvalidSize(found, expected))) => {
                warn!(found, expected, "ABIF header truncated; no directory");
                (None, Directory::default())
            }
            Err(e) => return Err(e),
        };
        Ok(Self {
            buffer,
            header,
            directory,
        })
    }

    /// The header, absent when the buffer ends before the root entry
    #[must_use]
    pub fn header(&self) -> Option<&AbifHeader> {
        self.header.as_ref()
    }

    #[must_use]
    pub fn directory(&self) -> &Directory {
        &self.directory
    }

    #[must_use]
    pub fn resolver(&self) -> TagResolver<'_> {
        TagResolver::new(self.buffer, &self.directory)
    }

    #[must_use]
    pub fn trace(&self) -> Trace {
        Trace::assemble(&self.resolver())
    }

    #[must_use]
    pub fn base_calls(&self, default_quality: i32) -> BaseCalls {
        BaseCalls::assemble(&self.resolver(), default_quality)
    }

    /// Assembles the trace and base calls into the output record
    #[must_use]
    pub fn to_output(&self, config: &ParseConfig) -> ParsedAb1 {
        let calls = self.base_calls(config.default_quality());
        let trace = self.trace();
        debug!(
            filename = config.filename(),
            tags = self.directory.len(),
            bases = calls.len(),
            trace_length = trace.len(),
            "parsed trace file"
        );
        ParsedAb1::new(config.filename(), trace, &calls)
    }
}

/// Parses an in-memory ABIF buffer
///
/// # Errors
///
/// Fails only when the buffer does not start with `ABIF`.
pub fn parse_ab1(buffer: &[u8], filename: &str) -> Result<ParsedAb1> {
    let config = ParseConfig::builder().filename(filename).build();
    parse_with_config(buffer, &config)
}

/// Parses an in-memory ABIF buffer with explicit options
pub fn parse_with_config(buffer: &[u8], config: &ParseConfig) -> Result<ParsedAb1> {
    Ok(AbifFile::parse(buffer)?.to_output(config))
}

/// Reads `reader` to the end and parses the result
pub fn read_ab1<R: Read>(mut reader: R, filename: &str) -> Result<ParsedAb1> {
    let mut buffer = Vec::new();
    reader.read_to_end(&mut buffer)?;
    parse_ab1(&buffer, filename)
}

/// Memory-mapped reader for ABIF files on disk
pub struct MmapReader {
    /// Memory mapped file contents
    mmap: Mmap,

    /// Path the file was opened from
    path: PathBuf,
}
impl MmapReader {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        // Verify input file is a file before attempting to map
        let file = File::open(&path)?;
        if !file.metadata()?.is_file() {
            return Err(ReadError::IncompatibleFile.into());
        }

        // Safety: the file is open and won't be modified while mapped
        let mmap = unsafe { Mmap::map(&file)? };

        Ok(Self { mmap, path })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The file name component of the path, used for the summary record
    #[must_use]
    pub fn filename(&self) -> String {
        self.path.file_name().map_or_else(
            || DEFAULT_FILENAME.to_string(),
            |name| name.to_string_lossy().into_owned(),
        )
    }

    /// Raw file contents
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.mmap
    }

    /// Validates the file and scans its directory
    pub fn file(&self) -> Result<AbifFile<'_>> {
        AbifFile::parse(&self.mmap)
    }

    /// Parses the file, reporting its own file name in the summary
    pub fn parse(&self) -> Result<ParsedAb1> {
        let config = ParseConfig::builder().filename(self.filename()).build();
        self.parse_with_config(&config)
    }

    pub fn parse_with_config(&self, config: &ParseConfig) -> Result<ParsedAb1> {
        parse_with_config(&self.mmap, config)
    }
}
