use jiff::Timestamp;
use serde::{Deserialize, Serialize};

/// Wire value marking a file that no longer exists.
pub const DELETED_SENTINEL: &str = "-1";

/// The structured form of one integrity checksum record.
///
/// `size`, owner and group ids are kept as the exact text found on the wire.
/// `owner_name`, `group_name`, `mtime` and `inode` form the *extended* group: a record carrying
/// any of them is written in the extended format.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Summary {
    pub size: String,
    pub permissions: i32,
    pub owner_id: String,
    pub group_id: String,
    pub hash_md5: String,
    pub hash_sha1: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash_sha256: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mtime: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inode: Option<i64>,
}

impl Summary {
    /// A short-form summary with only the mandatory fields set.
    pub fn new(
        size: impl Into<String>,
        permissions: i32,
        owner_id: impl Into<String>,
        group_id: impl Into<String>,
        hash_md5: impl Into<String>,
        hash_sha1: impl Into<String>,
    ) -> Self {
        Summary {
            size: size.into(),
            permissions,
            owner_id: owner_id.into(),
            group_id: group_id.into(),
            hash_md5: hash_md5.into(),
            hash_sha1: hash_sha1.into(),
            ..Default::default()
        }
    }

    pub fn with_owner_name(mut self, name: impl Into<String>) -> Self {
        self.owner_name = Some(name.into());
        self
    }

    pub fn with_group_name(mut self, name: impl Into<String>) -> Self {
        self.group_name = Some(name.into());
        self
    }

    pub fn with_mtime(mut self, mtime: i64) -> Self {
        self.mtime = Some(mtime);
        self
    }

    pub fn with_inode(mut self, inode: i64) -> Self {
        self.inode = Some(inode);
        self
    }

    pub fn with_sha256(mut self, digest: impl Into<String>) -> Self {
        self.hash_sha256 = Some(digest.into());
        self
    }

    /// True when any member of the extended group is present.
    pub fn is_extended(&self) -> bool {
        self.owner_name.is_some()
            || self.group_name.is_some()
            || self.mtime.is_some()
            || self.inode.is_some()
    }

    /// Modification time as a timestamp. A zero `mtime` means "not provided".
    pub fn modified_at(&self) -> Option<Timestamp> {
        self.mtime
            .filter(|&secs| secs != 0)
            .and_then(|secs| Timestamp::from_second(secs).ok())
    }
}

/// Outcome of decoding a record that is not malformed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decoded {
    /// The record is the deleted-file sentinel; there is no summary to read.
    Deleted,
    Summary(Summary),
}

impl Decoded {
    pub fn is_deleted(&self) -> bool {
        matches!(self, Decoded::Deleted)
    }

    pub fn summary(&self) -> Option<&Summary> {
        match self {
            Decoded::Deleted => None,
            Decoded::Summary(sum) => Some(sum),
        }
    }

    pub fn into_summary(self) -> Option<Summary> {
        match self {
            Decoded::Deleted => None,
            Decoded::Summary(sum) => Some(sum),
        }
    }
}

/// A syscheck message: a checksum record followed by the path it describes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SumMessage {
    pub path: String,
    pub outcome: Decoded,
}
