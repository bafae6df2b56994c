/// Custom Result type for abif operations, wrapping the custom [`Error`] type
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for the abif library, encompassing all possible error cases
/// that can occur while reading and decoding trace files.
#[derive(thiserror::Error, Debug)]
#[error(transparent)]
pub enum Error {
    /// Errors related to ABIF header processing
    HeaderError(#[from] HeaderError),
    /// Errors that occur during read operations
    ReadError(#[from] ReadError),
    /// Standard I/O errors from the Rust standard library
    IoError(#[from] std::io::Error),
    /// Errors raised while rendering output as JSON
    JsonError(#[from] serde_json::Error),
    /// Generic errors that can occur in any part of the system
    AnyhowError(#[from] anyhow::Error),
}
impl Error {
    /// Returns true if this error reports a buffer that is not an ABIF file
    #[must_use]
    pub fn is_format_mismatch(&self) -> bool {
        matches!(self, Self::HeaderError(HeaderError::InvalidMagicNumber(_)))
    }
}

/// Errors specific to processing and validating ABIF headers
#[derive(thiserror::Error, Debug)]
pub enum HeaderError {
    /// The first four bytes of the buffer are not `ABIF`
    ///
    /// # Arguments
    /// * `[u8; 4]` - The bytes that were found (zero-padded for short buffers)
    #[error("Not an ABIF file: invalid magic bytes {0:?}")]
    InvalidMagicNumber([u8; 4]),

    /// The buffer is too small to hold the header and its root entry
    ///
    /// # Arguments
    /// * First `usize` - The actual number of bytes provided
    /// * Second `usize` - The minimum number of bytes required
    #[error("Invalid number of bytes provided: {0}. Expected at least: {1}")]
    InvalidSize(usize, usize),
}

/// Errors that can occur while reading trace data
#[derive(thiserror::Error, Debug)]
pub enum ReadError {
    /// A fixed-width read would run past the end of the buffer
    #[error("Read of {width} bytes at offset {offset} exceeds buffer length ({len})")]
    OutOfBounds {
        offset: usize,
        width: usize,
        len: usize,
    },

    /// The file being read is not a regular file (e.g., it might be a directory or special file)
    #[error("File is not regular")]
    IncompatibleFile,

    /// A worker thread panicked during batch processing
    ///
    /// # Arguments
    /// * `usize` - The thread id of the worker
    #[error("Worker thread {0} panicked")]
    WorkerPanicked(usize),
}
