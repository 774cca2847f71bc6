use log::trace;

use crate::err::FormatResult;
use crate::event::{Attributes, Event, FieldKind, FieldLabels, FieldTable};
use crate::summary::Summary;
use crate::utils::format_bounded;

/// Width of the zero-padded octal permissions field.
pub const PERMISSIONS_WIDTH: usize = 6;

/// Capacity of decimal numeric fields (enough for any 64-bit value).
pub const NUMERIC_CAPACITY: usize = 20;

/// Maps decoded summaries into [`Event`]s keyed by a fixed label table.
#[derive(Debug, Clone, Copy)]
pub struct EventProjector<'l> {
    labels: &'l FieldLabels,
}

impl Default for EventProjector<'static> {
    fn default() -> Self {
        EventProjector::new(FieldLabels::standard())
    }
}

impl<'l> EventProjector<'l> {
    pub fn new(labels: &'l FieldLabels) -> Self {
        EventProjector { labels }
    }

    pub fn labels(&self) -> &'l FieldLabels {
        self.labels
    }

    /// Builds a fresh event for `path` with `sum` as its after-state.
    pub fn project(&self, path: &str, sum: &Summary) -> FormatResult<Event> {
        let mut event = Event::new(self.labels);
        self.fill_event(&mut event, path, sum)?;
        Ok(event)
    }

    /// Sets the filename, after-state and field table of `event`. The before-state is left as is.
    ///
    /// On error `event` is not modified.
    pub fn fill_event(&self, event: &mut Event, path: &str, sum: &Summary) -> FormatResult<()> {
        let fields = self.field_table(path, sum)?;

        event.filename = path.to_owned();
        event.after = Some(after_attributes(sum));
        event.fields = fields;
        Ok(())
    }

    pub fn field_table(&self, path: &str, sum: &Summary) -> FormatResult<FieldTable> {
        let mut table = FieldTable::new(self.labels);

        table.set(FieldKind::File, path);
        table.set(FieldKind::Size, sum.size.as_str());
        table.set(
            FieldKind::Permissions,
            format_bounded(
                FieldKind::Permissions.name(),
                PERMISSIONS_WIDTH,
                // Negative values render as their two's complement and overflow.
                format_args!("{:06o}", sum.permissions as u32),
            )?,
        );
        table.set(FieldKind::OwnerId, sum.owner_id.as_str());
        table.set(FieldKind::GroupId, sum.group_id.as_str());
        table.set(FieldKind::Md5, sum.hash_md5.as_str());
        table.set(FieldKind::Sha1, sum.hash_sha1.as_str());

        if let Some(name) = &sum.owner_name {
            table.set(FieldKind::OwnerName, name.as_str());
        }
        if let Some(name) = &sum.group_name {
            table.set(FieldKind::GroupName, name.as_str());
        }

        // Zero means "not provided" for both.
        if let Some(inode) = sum.inode.filter(|&v| v != 0) {
            table.set(FieldKind::Inode, numeric_field(FieldKind::Inode, inode)?);
        }
        if let Some(mtime) = sum.mtime.filter(|&v| v != 0) {
            table.set(FieldKind::Mtime, numeric_field(FieldKind::Mtime, mtime)?);
        }

        if let Some(sha256) = &sum.hash_sha256 {
            table.set(FieldKind::Sha256, sha256.as_str());
        }

        trace!(
            "projected {} of {} fields for `{}`",
            table.present().count(),
            table.len(),
            path
        );
        Ok(table)
    }
}

fn numeric_field(kind: FieldKind, value: i64) -> FormatResult<String> {
    format_bounded(kind.name(), NUMERIC_CAPACITY, format_args!("{value}"))
}

fn after_attributes(sum: &Summary) -> Attributes {
    Attributes {
        size: sum.size.clone(),
        permissions: sum.permissions,
        owner_id: sum.owner_id.clone(),
        owner_name: sum.owner_name.clone(),
        group_id: sum.group_id.clone(),
        group_name: sum.group_name.clone(),
        md5: sum.hash_md5.clone(),
        sha1: sum.hash_sha1.clone(),
        sha256: sum.hash_sha256.clone(),
        mtime: sum.mtime,
        inode: sum.inode,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::err::FormatError;
    use pretty_assertions::assert_eq;

    fn short() -> Summary {
        Summary::new("1024", 33188, "0", "0", "md5", "sha1")
    }

    #[test]
    fn test_short_summary_populates_mandatory_fields_only() {
        let event = EventProjector::default().project("/etc/hosts", &short()).unwrap();
        let fields = &event.fields;

        assert_eq!(event.filename, "/etc/hosts");
        assert_eq!(fields.len(), FieldKind::COUNT);
        assert_eq!(fields.get(FieldKind::File), Some("/etc/hosts"));
        assert_eq!(fields.get(FieldKind::Size), Some("1024"));
        assert_eq!(fields.get(FieldKind::Permissions), Some("100644"));
        assert_eq!(fields.get(FieldKind::OwnerId), Some("0"));
        assert_eq!(fields.get(FieldKind::GroupId), Some("0"));
        assert_eq!(fields.get(FieldKind::Md5), Some("md5"));
        assert_eq!(fields.get(FieldKind::Sha1), Some("sha1"));

        for kind in [
            FieldKind::OwnerName,
            FieldKind::GroupName,
            FieldKind::Mtime,
            FieldKind::Inode,
            FieldKind::Sha256,
        ] {
            assert_eq!(fields.get(kind), None, "{kind} should be absent");
        }

        let after = event.after.unwrap();
        assert_eq!(after.permissions, 33188);
        assert_eq!(after.owner_name, None);
        assert_eq!(event.before, None);
    }

    #[test]
    fn test_permissions_are_zero_padded_octal() {
        let mut sum = short();
        sum.permissions = 8;
        let table = EventProjector::default().field_table("f", &sum).unwrap();
        assert_eq!(table.get(FieldKind::Permissions), Some("000010"));
    }

    #[test]
    fn test_permissions_overflow_fails() {
        let mut sum = short();
        sum.permissions = 0o1_000_000;
        assert_eq!(
            EventProjector::default().project("f", &sum),
            Err(FormatError::CapacityExceeded {
                what: "perm",
                need: 7,
                capacity: PERMISSIONS_WIDTH
            })
        );

        sum.permissions = -1;
        assert!(EventProjector::default().project("f", &sum).is_err());
    }

    #[test]
    fn test_zero_mtime_and_inode_are_absent() {
        let sum = short()
            .with_owner_name("root")
            .with_group_name("root")
            .with_mtime(0)
            .with_inode(0);
        let table = EventProjector::default().field_table("f", &sum).unwrap();

        assert_eq!(table.get(FieldKind::Mtime), None);
        assert_eq!(table.get(FieldKind::Inode), None);
        assert_eq!(table.get(FieldKind::OwnerName), Some("root"));
    }

    #[test]
    fn test_extended_summary_populates_every_field() {
        let sum = short()
            .with_owner_name("")
            .with_group_name("wheel")
            .with_mtime(i64::MIN)
            .with_inode(i64::MAX)
            .with_sha256("sha256");
        let table = EventProjector::default().field_table("f", &sum).unwrap();

        assert_eq!(table.present().count(), FieldKind::COUNT);
        assert_eq!(table.get(FieldKind::OwnerName), Some(""));
        assert_eq!(table.get(FieldKind::Mtime), Some("-9223372036854775808"));
        assert_eq!(table.get(FieldKind::Inode), Some("9223372036854775807"));
        assert_eq!(table.get(FieldKind::Sha256), Some("sha256"));
    }

    #[test]
    fn test_custom_labels_key_the_table() {
        let labels = FieldLabels::default().with_label(FieldKind::Permissions, "mode");
        let table = EventProjector::new(&labels).field_table("f", &short()).unwrap();
        assert_eq!(table.key(FieldKind::Permissions), "mode");
        assert_eq!(table.key(FieldKind::Md5), "md5");
    }

    #[test]
    fn test_fill_event_keeps_before_state_and_is_atomic() {
        let projector = EventProjector::default();
        let mut event = projector.project("old", &short()).unwrap();
        event.before = Some(Attributes {
            size: "1".to_owned(),
            ..Default::default()
        });

        let mut bad = short();
        bad.permissions = -1;
        let snapshot = event.clone();
        assert!(projector.fill_event(&mut event, "new", &bad).is_err());
        assert_eq!(event, snapshot);

        projector
            .fill_event(&mut event, "new", &short().with_inode(9))
            .unwrap();
        assert_eq!(event.filename, "new");
        assert_eq!(event.before.as_ref().unwrap().size, "1");
        assert_eq!(event.fields.get(FieldKind::Inode), Some("9"));
    }
}
