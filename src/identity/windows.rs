use std::ffi::OsStr;
use std::os::windows::ffi::OsStrExt;
use std::path::Path;
use std::ptr;

use log::{debug, warn};
use windows_sys::Win32::Foundation::{
    CloseHandle, ERROR_NONE_MAPPED, ERROR_SHARING_VIOLATION, ERROR_SUCCESS, GENERIC_READ,
    GetLastError, INVALID_HANDLE_VALUE, LocalFree,
};
use windows_sys::Win32::Security::Authorization::{GetSecurityInfo, SE_FILE_OBJECT};
use windows_sys::Win32::Security::{
    LookupAccountSidW, OWNER_SECURITY_INFORMATION, PSECURITY_DESCRIPTOR, PSID, SID_NAME_USE,
    SidTypeUnknown,
};
use windows_sys::Win32::Storage::FileSystem::{
    CreateFileW, FILE_ATTRIBUTE_NORMAL, FILE_SHARE_READ, FILE_SHARE_WRITE, OPEN_EXISTING,
};

use super::IdentityResolver;

const NAME_BUFFER_LEN: usize = 256;

/// Resolves file owners from their security descriptor. Group names are not available.
#[derive(Debug, Clone, Copy, Default)]
pub struct WindowsResolver;

impl IdentityResolver for WindowsResolver {
    fn resolve_owner(&self, path: &Path, _uid: u32) -> Option<String> {
        owner_of(path)
    }

    fn resolve_group(&self, _gid: u32) -> Option<String> {
        None
    }
}

fn to_wide(path: &Path) -> Vec<u16> {
    OsStr::new(path).encode_wide().chain(Some(0)).collect()
}

fn owner_of(path: &Path) -> Option<String> {
    let wide = to_wide(path);

    // SAFETY: `wide` is NUL terminated and outlives the call.
    let handle = unsafe {
        CreateFileW(
            wide.as_ptr(),
            GENERIC_READ,
            FILE_SHARE_READ | FILE_SHARE_WRITE,
            ptr::null(),
            OPEN_EXISTING,
            FILE_ATTRIBUTE_NORMAL,
            ptr::null_mut(),
        )
    };

    if handle == INVALID_HANDLE_VALUE {
        let code = unsafe { GetLastError() };
        if code == ERROR_SHARING_VIOLATION {
            debug!("CreateFile ({}) error = {code}", path.display());
        } else {
            warn!("CreateFile ({}) error = {code}", path.display());
        }
        return None;
    }

    let mut owner: PSID = ptr::null_mut();
    let mut descriptor: PSECURITY_DESCRIPTOR = ptr::null_mut();

    // SAFETY: `handle` is a valid file handle; out pointers are valid locals.
    let rc = unsafe {
        GetSecurityInfo(
            handle,
            SE_FILE_OBJECT,
            OWNER_SECURITY_INFORMATION,
            &mut owner,
            ptr::null_mut(),
            ptr::null_mut(),
            ptr::null_mut(),
            &mut descriptor,
        )
    };

    unsafe { CloseHandle(handle) };

    if rc != ERROR_SUCCESS {
        warn!("GetSecurityInfo ({}) error = {rc}", path.display());
        return None;
    }

    let name = account_name(path, owner);

    // SAFETY: `descriptor` was allocated by `GetSecurityInfo`; `owner` points into it and is not
    // used past this point.
    unsafe { LocalFree(descriptor) };

    name
}

fn account_name(path: &Path, sid: PSID) -> Option<String> {
    let mut name = [0_u16; NAME_BUFFER_LEN];
    let mut domain = [0_u16; NAME_BUFFER_LEN];
    let mut name_len = NAME_BUFFER_LEN as u32;
    let mut domain_len = NAME_BUFFER_LEN as u32;
    let mut sid_use: SID_NAME_USE = SidTypeUnknown;

    // SAFETY: the buffers and their lengths match; `sid` is valid while its descriptor lives.
    let ok = unsafe {
        LookupAccountSidW(
            ptr::null(),
            sid,
            name.as_mut_ptr(),
            &mut name_len,
            domain.as_mut_ptr(),
            &mut domain_len,
            &mut sid_use,
        )
    };

    if ok == 0 {
        let code = unsafe { GetLastError() };
        if code == ERROR_NONE_MAPPED {
            debug!("account owner not found for file '{}'", path.display());
        } else {
            warn!("LookupAccountSid ({}) error = {code}", path.display());
        }
        return None;
    }

    let len = (name_len as usize).min(NAME_BUFFER_LEN);
    Some(String::from_utf16_lossy(&name[..len]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_groups_never_resolve() {
        assert_eq!(WindowsResolver.resolve_group(0), None);
        assert_eq!(WindowsResolver.resolve_group(544), None);
    }

    #[test]
    fn test_missing_file_has_no_owner() {
        assert_eq!(
            WindowsResolver.resolve_owner(Path::new(r"C:\does\not\exist\fim-sum"), 0),
            None
        );
    }
}
