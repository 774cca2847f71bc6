//! Decoding of colon-delimited checksum records.
//!
//! Two generations of the format exist:
//!
//! ```text
//! SIZE:PERM:UID:GID:MD5:SHA1
//! SIZE:PERM:UID:GID:MD5:SHA1:UNAME:GNAME:MTIME:INODE[:SHA256]
//! ```
//!
//! Fields are positional and never escaped. Each field ends at the first unconsumed `:`; the last
//! field of a record runs to the end of the input.

use log::trace;

use crate::err::{DecodeError, DecodeResult};
use crate::summary::{DELETED_SENTINEL, Decoded, SumMessage, Summary};
use crate::utils::{parse_int_lenient, parse_long_lenient};

const FIELD_SEPARATOR: char = ':';

/// Splits a record into fields, left to right.
struct FieldCursor<'a> {
    record: &'a str,
    pos: usize,
}

impl<'a> FieldCursor<'a> {
    fn new(record: &'a str) -> Self {
        FieldCursor { record, pos: 0 }
    }

    /// The text up to the next separator, consuming the separator.
    fn next_field(&mut self) -> Option<&'a str> {
        let rest = &self.record[self.pos..];
        let end = rest.find(FIELD_SEPARATOR)?;
        self.pos += end + FIELD_SEPARATOR.len_utf8();
        Some(&rest[..end])
    }

    /// Like [`FieldCursor::next_field`], but the separator is mandatory.
    fn field(&mut self, what: &'static str) -> DecodeResult<&'a str> {
        let offset = self.pos;
        self.next_field()
            .ok_or(DecodeError::Malformed { what, offset })
    }

    /// Everything not consumed yet.
    fn rest(&self) -> &'a str {
        &self.record[self.pos..]
    }
}

/// Decodes a single checksum record.
///
/// Returns [`Decoded::Deleted`] for records starting with the `-1` sentinel. Every field in the
/// returned summary is an owned copy, independent of `record`.
pub fn decode(record: &str) -> DecodeResult<Decoded> {
    if record.starts_with(DELETED_SENTINEL) {
        trace!("record marks a deleted file");
        return Ok(Decoded::Deleted);
    }

    let mut cursor = FieldCursor::new(record);

    let size = cursor.field("size")?;
    // Non-numeric permissions decode as 0.
    let permissions = parse_int_lenient(cursor.field("permissions")?);
    let owner_id = cursor.field("owner id")?;
    let group_id = cursor.field("group id")?;
    let hash_md5 = cursor.field("md5")?;

    let mut sum = Summary::new(size, permissions, owner_id, group_id, hash_md5, "");

    let Some(hash_sha1) = cursor.next_field() else {
        sum.hash_sha1 = cursor.rest().to_owned();
        trace!("decoded short record");
        return Ok(Decoded::Summary(sum));
    };
    sum.hash_sha1 = hash_sha1.to_owned();

    // Past this point the whole extended group is required.
    let owner_name = cursor.field("owner name")?;
    let group_name = cursor.field("group name")?;
    let mtime = cursor.field("mtime")?;

    let inode = match cursor.next_field() {
        Some(inode) => {
            sum.hash_sha256 = Some(cursor.rest().to_owned());
            inode
        }
        None => cursor.rest(),
    };

    sum.owner_name = Some(owner_name.to_owned());
    sum.group_name = Some(group_name.to_owned());
    sum.mtime = Some(parse_long_lenient(mtime));
    sum.inode = Some(parse_long_lenient(inode));

    trace!(
        "decoded extended record (sha256: {})",
        sum.hash_sha256.is_some()
    );
    Ok(Decoded::Summary(sum))
}

/// Decodes a `"<record> <path>"` message. The path is everything after the first space.
pub fn decode_message(message: &str) -> DecodeResult<SumMessage> {
    let (record, path) = message
        .split_once(' ')
        .ok_or(DecodeError::MissingFileName)?;

    Ok(SumMessage {
        path: path.to_owned(),
        outcome: decode(record)?,
    })
}

impl std::str::FromStr for Decoded {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        decode(s)
    }
}
