//! The generic event representation consumed by the decoding pipeline.
//!
//! An [`Event`] carries top-level before/after attributes of a file and a [`FieldTable`] with one
//! slot per [`FieldKind`]. Slot keys come from a [`FieldLabels`] table.

use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Every attribute kind known to the field table, in slot order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FieldKind {
    #[serde(rename = "file")]
    File,
    #[serde(rename = "size")]
    Size,
    #[serde(rename = "perm")]
    Permissions,
    #[serde(rename = "uid")]
    OwnerId,
    #[serde(rename = "gid")]
    GroupId,
    #[serde(rename = "md5")]
    Md5,
    #[serde(rename = "sha1")]
    Sha1,
    #[serde(rename = "uname")]
    OwnerName,
    #[serde(rename = "gname")]
    GroupName,
    #[serde(rename = "mtime")]
    Mtime,
    #[serde(rename = "inode")]
    Inode,
    #[serde(rename = "sha256")]
    Sha256,
}

impl FieldKind {
    pub const COUNT: usize = 12;

    pub const ALL: [FieldKind; FieldKind::COUNT] = [
        FieldKind::File,
        FieldKind::Size,
        FieldKind::Permissions,
        FieldKind::OwnerId,
        FieldKind::GroupId,
        FieldKind::Md5,
        FieldKind::Sha1,
        FieldKind::OwnerName,
        FieldKind::GroupName,
        FieldKind::Mtime,
        FieldKind::Inode,
        FieldKind::Sha256,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// The default label, also used as the kind's name in configuration files.
    pub fn name(self) -> &'static str {
        match self {
            FieldKind::File => "file",
            FieldKind::Size => "size",
            FieldKind::Permissions => "perm",
            FieldKind::OwnerId => "uid",
            FieldKind::GroupId => "gid",
            FieldKind::Md5 => "md5",
            FieldKind::Sha1 => "sha1",
            FieldKind::OwnerName => "uname",
            FieldKind::GroupName => "gname",
            FieldKind::Mtime => "mtime",
            FieldKind::Inode => "inode",
            FieldKind::Sha256 => "sha256",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Immutable kind -> label table used to key field-table slots.
///
/// Deserializes from a JSON object keyed by kind name (`{"perm": "permissions"}`); kinds that are
/// not mentioned keep their default label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldLabels {
    labels: [String; FieldKind::COUNT],
}

impl Default for FieldLabels {
    fn default() -> Self {
        FieldLabels {
            labels: FieldKind::ALL.map(|kind| kind.name().to_owned()),
        }
    }
}

impl FieldLabels {
    /// The process-wide default table, built on first use.
    pub fn standard() -> &'static FieldLabels {
        static STANDARD: OnceLock<FieldLabels> = OnceLock::new();
        STANDARD.get_or_init(FieldLabels::default)
    }

    pub fn with_label(mut self, kind: FieldKind, label: impl Into<String>) -> Self {
        self.labels[kind.index()] = label.into();
        self
    }

    pub fn label(&self, kind: FieldKind) -> &str {
        &self.labels[kind.index()]
    }

    pub fn from_json_str(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

impl Serialize for FieldLabels {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(FieldKind::COUNT))?;
        for kind in FieldKind::ALL {
            map.serialize_entry(&kind, self.label(kind))?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for FieldLabels {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let overrides = HashMap::<FieldKind, String>::deserialize(deserializer)?;
        Ok(overrides
            .into_iter()
            .fold(FieldLabels::default(), |labels, (kind, label)| {
                labels.with_label(kind, label)
            }))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub key: String,
    pub value: Option<String>,
}

/// Fixed-size, ordered table of event fields. Every kind has a keyed slot; a slot without a value
/// is absent, which is distinct from an empty string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldTable {
    slots: Vec<Field>,
}

impl FieldTable {
    pub fn new(labels: &FieldLabels) -> Self {
        FieldTable {
            slots: FieldKind::ALL
                .iter()
                .map(|&kind| Field {
                    key: labels.label(kind).to_owned(),
                    value: None,
                })
                .collect(),
        }
    }

    /// Number of slots, always [`FieldKind::COUNT`].
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn set(&mut self, kind: FieldKind, value: impl Into<String>) {
        self.slots[kind.index()].value = Some(value.into());
    }

    pub fn get(&self, kind: FieldKind) -> Option<&str> {
        self.slots[kind.index()].value.as_deref()
    }

    pub fn key(&self, kind: FieldKind) -> &str {
        &self.slots[kind.index()].key
    }

    pub fn slots(&self) -> &[Field] {
        &self.slots
    }

    /// Present fields as `(key, value)`, in slot order.
    pub fn present(&self) -> impl Iterator<Item = (&str, &str)> {
        self.slots
            .iter()
            .filter_map(|field| Some((field.key.as_str(), field.value.as_deref()?)))
    }
}

impl Serialize for FieldTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        for (key, value) in self.present() {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// File attributes at one point in time.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Attributes {
    pub size: String,
    pub permissions: i32,
    pub owner_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_name: Option<String>,
    pub group_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_name: Option<String>,
    pub md5: String,
    pub sha1: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mtime: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inode: Option<i64>,
}

/// An event describing a change to a monitored file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Event {
    pub filename: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub before: Option<Attributes>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub after: Option<Attributes>,
    pub fields: FieldTable,
}

impl Event {
    /// An event with no attributes and an empty field table keyed by `labels`.
    pub fn new(labels: &FieldLabels) -> Self {
        Event {
            filename: String::new(),
            before: None,
            after: None,
            fields: FieldTable::new(labels),
        }
    }
}
