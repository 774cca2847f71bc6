use std::ffi::CStr;
use std::path::Path;
use std::{io, mem, ptr};

use log::{debug, warn};

use super::IdentityResolver;

/// Upper bound for the scratch buffer handed to `getpwuid_r`/`getgrgid_r`.
const MAX_BUFFER_LEN: usize = 1 << 20;
const FALLBACK_BUFFER_LEN: usize = 1024;

/// Resolves ids through the system user and group databases (`getpwuid_r`, `getgrgid_r`).
#[derive(Debug, Clone, Copy, Default)]
pub struct UnixResolver;

impl IdentityResolver for UnixResolver {
    fn resolve_owner(&self, _path: &Path, uid: u32) -> Option<String> {
        lookup("uid", uid, libc::_SC_GETPW_R_SIZE_MAX, |buf| {
            let mut entry: libc::passwd = unsafe { mem::zeroed() };
            let mut result: *mut libc::passwd = ptr::null_mut();
            // SAFETY: every pointer is valid for the duration of the call and `buf.len()` is the
            // real length of `buf`.
            let rc = unsafe {
                libc::getpwuid_r(
                    uid as libc::uid_t,
                    &mut entry,
                    buf.as_mut_ptr(),
                    buf.len(),
                    &mut result,
                )
            };
            if rc != 0 {
                return Err(rc);
            }
            if result.is_null() || entry.pw_name.is_null() {
                return Ok(None);
            }
            // SAFETY: `pw_name` points into `buf`, which outlives this borrow.
            let name = unsafe { CStr::from_ptr(entry.pw_name) };
            Ok(Some(name.to_string_lossy().into_owned()))
        })
    }

    fn resolve_group(&self, gid: u32) -> Option<String> {
        lookup("gid", gid, libc::_SC_GETGR_R_SIZE_MAX, |buf| {
            let mut entry: libc::group = unsafe { mem::zeroed() };
            let mut result: *mut libc::group = ptr::null_mut();
            // SAFETY: as above.
            let rc = unsafe {
                libc::getgrgid_r(
                    gid as libc::gid_t,
                    &mut entry,
                    buf.as_mut_ptr(),
                    buf.len(),
                    &mut result,
                )
            };
            if rc != 0 {
                return Err(rc);
            }
            if result.is_null() || entry.gr_name.is_null() {
                return Ok(None);
            }
            // SAFETY: `gr_name` points into `buf`, which outlives this borrow.
            let name = unsafe { CStr::from_ptr(entry.gr_name) };
            Ok(Some(name.to_string_lossy().into_owned()))
        })
    }
}

/// Runs a reentrant database lookup, growing the scratch buffer on `ERANGE`.
///
/// `call` returns `Ok(None)` when no entry exists and `Err(errno)` when the lookup failed.
fn lookup<F>(what: &'static str, id: u32, size_hint: libc::c_int, mut call: F) -> Option<String>
where
    F: FnMut(&mut [libc::c_char]) -> Result<Option<String>, libc::c_int>,
{
    // SAFETY: `sysconf` has no preconditions.
    let hint = unsafe { libc::sysconf(size_hint) };
    let mut len = usize::try_from(hint)
        .ok()
        .filter(|&len| len > 0)
        .unwrap_or(FALLBACK_BUFFER_LEN);

    loop {
        let mut buf = vec![0 as libc::c_char; len];
        match call(&mut buf) {
            Ok(Some(name)) => return Some(name),
            Ok(None) => {
                debug!("no entry for {what} {id}");
                return None;
            }
            Err(libc::ERANGE) if len < MAX_BUFFER_LEN => len *= 2,
            Err(errno) => {
                warn!(
                    "lookup of {what} {id} failed: {}",
                    io::Error::from_raw_os_error(errno)
                );
                return None;
            }
        }
    }
}
