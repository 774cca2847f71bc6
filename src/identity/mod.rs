//! Best-effort owner and group name lookups.
//!
//! Resolution never fails loudly: an unknown id, a denied lookup or a failing platform API all
//! yield `None` (or `""` through [`get_user`]/[`get_group`]) and are only logged.
//!
//! Platforms differ in what they can resolve:
//! - Unix resolves both owner and group names from numeric ids.
//! - Windows resolves the owner from the file's security descriptor (the id is ignored) and never
//!   resolves group names.

use std::path::Path;

use crate::summary::Summary;

#[cfg(unix)]
mod unix;
#[cfg(windows)]
mod windows;

#[cfg(unix)]
pub use self::unix::UnixResolver;
#[cfg(windows)]
pub use self::windows::WindowsResolver;

/// Resolver for the platform this crate was built for.
#[cfg(unix)]
pub type PlatformResolver = UnixResolver;
#[cfg(windows)]
pub type PlatformResolver = WindowsResolver;
#[cfg(not(any(unix, windows)))]
pub type PlatformResolver = NullResolver;

pub trait IdentityResolver {
    /// Display name of the owner of `path`. Platforms choose whether `path` or `uid` identifies
    /// the owner.
    fn resolve_owner(&self, path: &Path, uid: u32) -> Option<String>;

    /// Display name of group `gid`.
    fn resolve_group(&self, gid: u32) -> Option<String>;
}

/// Resolves nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullResolver;

impl IdentityResolver for NullResolver {
    fn resolve_owner(&self, _path: &Path, _uid: u32) -> Option<String> {
        None
    }

    fn resolve_group(&self, _gid: u32) -> Option<String> {
        None
    }
}

impl<R: IdentityResolver + ?Sized> IdentityResolver for &R {
    fn resolve_owner(&self, path: &Path, uid: u32) -> Option<String> {
        (**self).resolve_owner(path, uid)
    }

    fn resolve_group(&self, gid: u32) -> Option<String> {
        (**self).resolve_group(gid)
    }
}

/// Owner name of `path` on this platform, or `""`.
pub fn get_user(path: impl AsRef<Path>, uid: u32) -> String {
    PlatformResolver::default()
        .resolve_owner(path.as_ref(), uid)
        .unwrap_or_default()
}

/// Name of group `gid` on this platform, or `""`.
pub fn get_group(gid: u32) -> String {
    PlatformResolver::default()
        .resolve_group(gid)
        .unwrap_or_default()
}

/// Fills missing owner and group names of `sum` from its numeric ids.
///
/// Names that are already present are kept. A name that cannot be resolved is stored as `""`,
/// which puts the summary in the extended form either way. Non-numeric ids resolve as `u32::MAX`
/// does, i.e. usually to nothing.
pub fn resolve_names<R: IdentityResolver>(resolver: &R, path: &Path, sum: &mut Summary) {
    if sum.owner_name.is_none() {
        let uid = sum.owner_id.trim().parse().unwrap_or(u32::MAX);
        sum.owner_name = Some(resolver.resolve_owner(path, uid).unwrap_or_default());
    }

    if sum.group_name.is_none() {
        let gid = sum.group_id.trim().parse().unwrap_or(u32::MAX);
        sum.group_name = Some(resolver.resolve_group(gid).unwrap_or_default());
    }
}
