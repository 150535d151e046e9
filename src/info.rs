//! Address introspection.
//!
//! [`SymbolInfo`] is an immutable snapshot of what the dynamic linker knows
//! about an address: the shared object it falls into and the nearest
//! preceding exported symbol. It borrows nothing from the native lookup
//! result; every field is copied out at construction time.

use crate::os;
use std::ffi::{CStr, c_void};
use std::path::{Path, PathBuf};

/// Describes the shared object and symbol associated with an in-process
/// address, or the static descriptive data of a loaded object.
///
/// Two shapes occur: a library descriptor (path and base address only),
/// built by [`SharedObject::info`](crate::SharedObject::info), and an
/// address descriptor with all four fields populated from a reverse lookup.
///
/// Invariants: a symbol name is never present without its address (they are
/// resolved together or not at all), and the base address is always present
/// when the object path is.
#[derive(Debug, Clone)]
pub struct SymbolInfo {
    object_path: Option<PathBuf>,
    object_base_address: Option<*mut c_void>,
    symbol_address: Option<*mut c_void>,
    symbol_name: Option<String>,
}

impl SymbolInfo {
    /// Builds a library descriptor from data a loaded object already holds.
    pub(crate) fn descriptor(path: PathBuf, base: *mut c_void) -> Self {
        SymbolInfo {
            object_path: Some(path),
            object_base_address: Some(base),
            symbol_address: None,
            symbol_name: None,
        }
    }

    /// Gets the symbol information for the provided address.
    ///
    /// Returns `None` when the address lies outside every object known to
    /// the dynamic linker. On success each field is converted only when the
    /// native result actually carries it; an address in a gap between
    /// exported symbols yields an info with empty symbol fields.
    pub fn from_address(address: *const c_void) -> Option<SymbolInfo> {
        let info = os::resolve(address)?;
        let object_path = if info.dli_fname.is_null() {
            None
        } else {
            let name = unsafe { CStr::from_ptr(info.dli_fname) };
            Some(PathBuf::from(name.to_string_lossy().into_owned()))
        };
        let object_base_address = if info.dli_fbase.is_null() {
            None
        } else {
            Some(info.dli_fbase)
        };
        let symbol_address = if info.dli_saddr.is_null() {
            None
        } else {
            Some(info.dli_saddr)
        };
        // The name is only meaningful together with the address it was
        // resolved alongside.
        let symbol_name = match (symbol_address, info.dli_sname.is_null()) {
            (Some(_), false) => {
                let name = unsafe { CStr::from_ptr(info.dli_sname) };
                Some(name.to_string_lossy().into_owned())
            }
            _ => None,
        };
        Some(SymbolInfo {
            object_path,
            object_base_address,
            symbol_address,
            symbol_name,
        })
    }

    /// The path of the shared object the address resolves into, if the
    /// lookup could determine it.
    #[inline]
    pub fn object_path(&self) -> Option<&Path> {
        self.object_path.as_deref()
    }

    /// The address at which the shared object is mapped into the process.
    #[inline]
    pub fn object_base_address(&self) -> Option<*mut c_void> {
        self.object_base_address
    }

    /// The address of the nearest preceding exported symbol, if any.
    #[inline]
    pub fn symbol_address(&self) -> Option<*mut c_void> {
        self.symbol_address
    }

    /// The name of that symbol, present iff [`Self::symbol_address`] is.
    #[inline]
    pub fn symbol_name(&self) -> Option<&str> {
        self.symbol_name.as_deref()
    }
}
