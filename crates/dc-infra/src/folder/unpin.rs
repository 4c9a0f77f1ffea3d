//! Cloud-placeholder unpinning
//!
//! OneDrive-style substrates keep a local copy of every file touched by the
//! agent. Setting `FILE_ATTRIBUTE_UNPINNED` hands the local copy back to the
//! substrate while the remote entry stays visible to peers.

use std::path::Path;

use anyhow::Result;

#[cfg(windows)]
pub fn unpin_path(path: &Path) -> Result<()> {
    use std::iter::once;
    use std::os::windows::ffi::OsStrExt;
    use windows::core::PCWSTR;
    use windows::Win32::Storage::FileSystem::{
        GetFileAttributesW, SetFileAttributesW, FILE_ATTRIBUTE_PINNED, FILE_ATTRIBUTE_UNPINNED,
        FILE_FLAGS_AND_ATTRIBUTES, INVALID_FILE_ATTRIBUTES,
    };

    let wide: Vec<u16> = path.as_os_str().encode_wide().chain(once(0)).collect();
    let pcwstr = PCWSTR(wide.as_ptr());

    let attrs = unsafe { GetFileAttributesW(pcwstr) };
    if attrs == INVALID_FILE_ATTRIBUTES {
        return Err(std::io::Error::last_os_error().into());
    }

    let wanted = (attrs & !FILE_ATTRIBUTE_PINNED.0) | FILE_ATTRIBUTE_UNPINNED.0;
    if wanted != attrs {
        unsafe { SetFileAttributesW(pcwstr, FILE_FLAGS_AND_ATTRIBUTES(wanted)) }?;
    }
    Ok(())
}

#[cfg(not(windows))]
pub fn unpin_path(_path: &Path) -> Result<()> {
    Ok(())
}
