use thiserror::Error;

pub type DecodeResult<T> = std::result::Result<T, DecodeError>;
pub type FormatResult<T> = std::result::Result<T, FormatError>;

/// Errors produced while decoding a checksum record.
///
/// A record marking a deleted file is *not* an error, see [`crate::Decoded::Deleted`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("malformed record: no delimiter terminating `{what}` (field starts at offset {offset})")]
    Malformed { what: &'static str, offset: usize },

    #[error("malformed message: no separator between checksum and file name")]
    MissingFileName,
}

/// Errors produced while rendering text into a bounded destination.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("formatted {what} needs {need} bytes, but capacity is {capacity}")]
    CapacityExceeded {
        what: &'static str,
        need: usize,
        capacity: usize,
    },
}
