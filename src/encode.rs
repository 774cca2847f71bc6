//! Encoding of summaries back into checksum records.
//!
//! The short form is used unless the summary carries extended-group data or a SHA-256 digest.
//! Permissions are written as plain decimal here, unlike the octal rendering of the event field
//! table.

use std::fmt;

use crate::err::FormatResult;
use crate::summary::Summary;
use crate::utils::{format_bounded, write_bounded};

impl Summary {
    /// Writes the record into `buf` and returns the number of bytes used.
    ///
    /// Fails with [`crate::FormatError::CapacityExceeded`] when the record does not fit, in which
    /// case `buf` is left untouched.
    pub fn encode_into(&self, buf: &mut [u8]) -> FormatResult<usize> {
        write_bounded("record", buf, format_args!("{self}"))
    }

    /// Renders the record as an owned string of at most `capacity` bytes.
    pub fn encode_with_capacity(&self, capacity: usize) -> FormatResult<String> {
        format_bounded("record", capacity, format_args!("{self}"))
    }

    /// Renders the record without a size limit.
    pub fn encode(&self) -> String {
        self.to_string()
    }

    fn uses_extended_form(&self) -> bool {
        self.is_extended() || self.hash_sha256.is_some()
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}:{}:{}:{}",
            self.size,
            self.permissions,
            self.owner_id,
            self.group_id,
            self.hash_md5,
            self.hash_sha1
        )?;

        if !self.uses_extended_form() {
            return Ok(());
        }

        // Missing members of the extended group are written as empty names and zero numbers.
        write!(
            f,
            ":{}:{}:{}:{}",
            self.owner_name.as_deref().unwrap_or_default(),
            self.group_name.as_deref().unwrap_or_default(),
            self.mtime.unwrap_or_default(),
            self.inode.unwrap_or_default()
        )?;

        if let Some(sha256) = &self.hash_sha256 {
            write!(f, ":{sha256}")?;
        }

        Ok(())
    }
}
