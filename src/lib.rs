#![deny(unused_must_use)]
//! Codec for file integrity checksum records ("syscheck sums").
//!
//! A checksum record is a compact colon-delimited line describing a file:
//!
//! ```text
//! SIZE:PERM:UID:GID:MD5:SHA1[:UNAME:GNAME:MTIME:INODE[:SHA256]]
//! ```
//!
//! or the literal `-1` when the file was deleted.
//!
//! ```
//! use fim_sum::{decode, Decoded, EventProjector, FieldKind};
//!
//! let decoded = decode("1024:33188:0:0:md5:sha1:root:root:1520000000:42").unwrap();
//! let Decoded::Summary(sum) = decoded else { panic!("not deleted") };
//!
//! assert_eq!(sum.encode(), "1024:33188:0:0:md5:sha1:root:root:1520000000:42");
//!
//! let event = EventProjector::default().project("/etc/hosts", &sum).unwrap();
//! assert_eq!(event.fields.get(FieldKind::Permissions), Some("100644"));
//! ```

pub mod err;
pub mod identity;

mod decode;
mod encode;
mod event;
mod projector;
mod summary;
mod utils;

pub use crate::decode::{decode, decode_message};
pub use crate::err::{DecodeError, DecodeResult, FormatError, FormatResult};
pub use crate::event::{Attributes, Event, Field, FieldKind, FieldLabels, FieldTable};
pub use crate::identity::{IdentityResolver, get_group, get_user, resolve_names};
pub use crate::projector::{EventProjector, NUMERIC_CAPACITY, PERMISSIONS_WIDTH};
pub use crate::summary::{DELETED_SENTINEL, Decoded, SumMessage, Summary};
