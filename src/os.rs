//! The raw dlfcn boundary.
//!
//! Everything that crosses into the native dynamic linker lives here: the
//! open/close/lookup/reverse-lookup primitives and the last-error protocol.
//! The loader reports failures through a thread-local message slot that is
//! cleared by reading it, so the open wrapper follows a fixed sequence:
//! clear the slot, call the primitive, read the slot back. A non-empty
//! message is authoritative even when the primitive returned a non-null
//! value.
//!
//! # Safety
//! The native loader mutates process-global state (the set of mapped
//! objects). These wrappers add no synchronization of their own and inherit
//! whatever reentrancy guarantees the platform loader provides.

use crate::{Result, error::load_error};
use std::ffi::{CStr, CString, c_int, c_void};
use std::ptr::NonNull;

/// Reads and clears the loader's last-error slot.
///
/// Returns `None` when no loader call failed since the slot was last read.
pub(crate) fn take_last_error() -> Option<String> {
    let msg = unsafe { libc::dlerror() };
    if msg.is_null() {
        return None;
    }
    Some(unsafe { CStr::from_ptr(msg) }.to_string_lossy().into_owned())
}

/// Opens a shared object, treating the error slot as authoritative.
///
/// Some failure modes of the native loader hand back a seemingly valid
/// handle alongside an error message, so the slot is consulted
/// unconditionally after the call. A null handle with an empty slot (the
/// `RTLD_NOLOAD` not-resident case) is reported with a crate diagnostic.
pub(crate) fn open(path: &CStr, mode: c_int) -> Result<NonNull<c_void>> {
    // Clear stale diagnostics left behind by earlier loader calls.
    let _ = take_last_error();
    let handle = unsafe { libc::dlopen(path.as_ptr(), mode) };
    if let Some(msg) = take_last_error() {
        #[cfg(feature = "log")]
        log::debug!("dlopen({:?}, {:#x}) failed: {}", path, mode, msg);
        return Err(load_error(msg));
    }
    NonNull::new(handle)
        .ok_or_else(|| load_error("dlopen returned a null handle without a diagnostic"))
}

/// Releases a handle previously returned by [`open`].
pub(crate) fn close(handle: NonNull<c_void>) {
    unsafe { libc::dlclose(handle.as_ptr()) };
}

/// Looks up a symbol in a handle's resolution scope.
///
/// A missing symbol is a normal outcome, so the error slot is deliberately
/// not consulted here; the null return alone decides.
pub(crate) fn lookup(handle: NonNull<c_void>, symbol: &CStr) -> Option<NonNull<c_void>> {
    NonNull::new(unsafe { libc::dlsym(handle.as_ptr(), symbol.as_ptr()) })
}

/// Reverse-maps an address to the shared object and nearest symbol
/// containing it. Returns `None` when the address lies outside every object
/// known to the dynamic linker.
pub(crate) fn resolve(addr: *const c_void) -> Option<libc::Dl_info> {
    let mut info = unsafe { std::mem::zeroed::<libc::Dl_info>() };
    if unsafe { libc::dladdr(addr, &mut info) } == 0 {
        return None;
    }
    Some(info)
}

/// Probes whether the object at `path` is already resident, without loading
/// it and without retaining a handle.
///
/// The probe handle returned by a successful `RTLD_NOLOAD` open carries a
/// reference of its own, so it is released immediately; otherwise the probe
/// would keep alive the very residency it reports on.
pub(crate) fn probe(path: &CStr) -> bool {
    let handle = unsafe { libc::dlopen(path.as_ptr(), libc::RTLD_LAZY | libc::RTLD_NOLOAD) };
    if handle.is_null() {
        return false;
    }
    unsafe { libc::dlclose(handle) };
    true
}

/// Re-opens an already resident object without loading, keeping the
/// reference it returns. Used by the current-module path, where the
/// reference is intentionally never released.
pub(crate) fn resident_handle(path: &CStr) -> Option<NonNull<c_void>> {
    NonNull::new(unsafe { libc::dlopen(path.as_ptr(), libc::RTLD_LAZY | libc::RTLD_NOLOAD) })
}

/// The handle the loader associates with the main program.
///
/// The main executable's entry in the loader's object list carries an empty
/// name on some platforms, so an `RTLD_NOLOAD` re-open by path cannot find
/// it; the null-path form of `dlopen` is the documented way to reach it.
pub(crate) fn program_handle() -> Option<NonNull<c_void>> {
    NonNull::new(unsafe { libc::dlopen(std::ptr::null(), libc::RTLD_LAZY | libc::RTLD_LOCAL) })
}

cfg_if::cfg_if! {
    if #[cfg(any(target_os = "linux", target_os = "freebsd"))] {
        const RTLD_DI_LINKMAP: c_int = 2;

        /// The head of the loader's per-object record. The first field is
        /// the load base on every supported ELF platform; the rest of the
        /// record is left opaque.
        #[repr(C)]
        struct LinkMap {
            l_addr: usize,
        }

        unsafe extern "C" {
            fn dlinfo(handle: *mut c_void, request: c_int, info: *mut c_void) -> c_int;
        }

        /// Queries the address an open handle's object is mapped at.
        pub(crate) fn module_base(handle: NonNull<c_void>) -> Option<*mut c_void> {
            let mut map: *mut LinkMap = std::ptr::null_mut();
            let ret = unsafe {
                dlinfo(
                    handle.as_ptr(),
                    RTLD_DI_LINKMAP,
                    (&raw mut map).cast::<c_void>(),
                )
            };
            if ret != 0 || map.is_null() {
                return None;
            }
            Some(unsafe { (*map).l_addr } as *mut c_void)
        }
    } else if #[cfg(any(target_os = "macos", target_os = "ios"))] {
        unsafe extern "C" {
            fn _dyld_image_count() -> u32;
            fn _dyld_get_image_name(image_index: u32) -> *const libc::c_char;
            fn _dyld_get_image_header(image_index: u32) -> *const c_void;
        }

        /// Queries the address an open handle's object is mapped at.
        ///
        /// dyld has no handle-to-record query, so the image list is walked
        /// and each image is re-opened with `RTLD_NOLOAD`: the loader hands
        /// back identical handles for the same image, which makes the
        /// comparison exact even when the recorded image name differs from
        /// the path the caller opened (search paths, shared cache).
        pub(crate) fn module_base(handle: NonNull<c_void>) -> Option<*mut c_void> {
            let count = unsafe { _dyld_image_count() };
            for index in 0..count {
                let name = unsafe { _dyld_get_image_name(index) };
                if name.is_null() {
                    continue;
                }
                let probe =
                    unsafe { libc::dlopen(name, libc::RTLD_LAZY | libc::RTLD_NOLOAD) };
                if probe.is_null() {
                    continue;
                }
                unsafe { libc::dlclose(probe) };
                if std::ptr::eq(probe, handle.as_ptr()) {
                    return Some(unsafe { _dyld_get_image_header(index) }.cast_mut());
                }
            }
            None
        }
    }
}

/// Converts a path-like byte string into the C string the loader expects.
/// An interior nul cannot name any filesystem object, so it is reported as
/// a load failure rather than trapped on.
pub(crate) fn to_cstring(bytes: &[u8]) -> Result<CString> {
    CString::new(bytes).map_err(|_| load_error("path contains an interior nul byte"))
}
