//! # shared_object
//! A typed, ownership-safe layer over the process's dynamic-linking
//! facilities: load shared objects into the address space, resolve symbols
//! to typed pointers, and introspect which object an in-process address,
//! including the calling code itself, belongs to.
//!
//! The native APIs differ across platforms in constants and error-reporting
//! idiom; this crate translates a portable surface ([`LoadBehavior`],
//! [`LoadFlags`], [`Error`]) onto them and owns every handle it opens.
//! ## Example
//! ```no_run
//! use shared_object::SharedObject;
//!
//! let lib = SharedObject::open("libm.so.6").unwrap();
//! let sin = unsafe { *lib.get::<extern "C" fn(f64) -> f64>("sin").unwrap() };
//! assert_eq!(sin(0.0), 0.0);
//! ```

#[cfg(not(any(
    target_os = "linux",
    target_os = "macos",
    target_os = "ios",
    target_os = "freebsd",
)))]
compile_error!("unsupported target os");

mod error;
mod flags;
mod info;
mod macros;
mod os;

use std::ffi::c_void;
use std::fmt::Debug;
use std::marker::PhantomData;
use std::ops;
use std::os::unix::ffi::OsStrExt;
use std::path::{Path, PathBuf};
use std::ptr::NonNull;

pub use error::Error;
pub use flags::{LoadBehavior, LoadFlags};
pub use info::SymbolInfo;

pub type Result<T> = core::result::Result<T, Error>;

/// A shared object loaded into the process's address space.
///
/// Each instance either exclusively owns the native handle it holds, and
/// releases it when dropped, or holds a non-owning observation of a handle
/// it did not create (the current-module case and `NO_LOAD` probes). There
/// is no shared ownership and no deduplication: every successful
/// [`open`](SharedObject::open) is an independent load-and-own operation.
pub struct SharedObject {
    /// Location as supplied by the caller or discovered via introspection.
    path: PathBuf,
    /// The handle returned by the native open primitive.
    handle: NonNull<c_void>,
    /// The address the object is mapped at.
    base: *mut c_void,
    /// Whether the handle must be released on drop.
    owns_handle: bool,
}

// The loader's object list is process-global and its error slot is
// thread-local on every supported platform, so handles may move and be
// shared across threads.
unsafe impl Send for SharedObject {}
unsafe impl Sync for SharedObject {}

impl Debug for SharedObject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedObject")
            .field("path", &self.path)
            .field("owns_handle", &self.owns_handle)
            .finish()
    }
}

impl SharedObject {
    /// Loads the shared object at `path` with lazy binding and local
    /// symbol visibility.
    pub fn open(path: impl AsRef<Path>) -> Result<SharedObject> {
        Self::open_with(path, LoadBehavior::default(), LoadFlags::default())
    }

    /// Loads the shared object at `path` with an explicit binding policy
    /// and flag set.
    ///
    /// Loading may run the object's static initializers and, with
    /// [`LoadFlags::GLOBAL`], make its symbols visible to subsequently
    /// loaded objects. An open carrying [`LoadFlags::NO_LOAD`] probes or
    /// promotes an already resident object and does not take ownership of
    /// the handle it returns.
    ///
    /// # Errors
    /// Fails with [`Error::Load`] when the native loader reports a
    /// diagnostic. The loader's error channel is authoritative: it is
    /// consulted after every open, even one that returned a handle.
    pub fn open_with(
        path: impl AsRef<Path>,
        behavior: LoadBehavior,
        flags: LoadFlags,
    ) -> Result<SharedObject> {
        let path = path.as_ref().to_path_buf();
        let cpath = os::to_cstring(path.as_os_str().as_bytes())?;
        let mode = flags::raw_mode(behavior, flags);
        let owns_handle = !flags.contains(LoadFlags::NO_LOAD);
        let handle = os::open(&cpath, mode)?;
        let base = match os::module_base(handle) {
            Some(base) => base,
            None => {
                if owns_handle {
                    os::close(handle);
                }
                return Err(error::load_error(format!(
                    "could not determine the base address of {}",
                    path.display()
                )));
            }
        };
        #[cfg(feature = "log")]
        log::trace!(
            "opened {} (mode: {:#x}, handle: {:p}, base: {:p})",
            path.display(),
            mode,
            handle.as_ptr(),
            base
        );
        Ok(SharedObject {
            path,
            handle,
            base,
            owns_handle,
        })
    }

    /// Returns the shared object containing the code at `address`.
    ///
    /// This is the explicit-address form behind [`current_object!`], which
    /// passes the address of an item instantiated in the calling module.
    /// Passing any other address is unsupported and will not reliably
    /// identify the calling module.
    ///
    /// The returned instance never owns its handle: releasing the module
    /// that contains executing code is never safe, so the reference taken
    /// here is deliberately kept for the life of the process.
    ///
    /// # Panics
    /// Panics when the dynamic linker cannot attribute `address` to any
    /// mapped object. Running code always resides in one, so this indicates
    /// a broken introspection primitive rather than a recoverable error.
    pub fn for_address(address: *const c_void) -> SharedObject {
        let Some(info) = SymbolInfo::from_address(address) else {
            panic!("address {address:p} does not belong to any loaded object");
        };
        let Some(path) = info.object_path() else {
            panic!("the loader found address {address:p} but reported no object path");
        };
        let Some(base) = info.object_base_address() else {
            panic!("the loader found address {address:p} but reported no base address");
        };
        // Re-open the resident module by name; the main program's record
        // has no usable name, so fall back to the program handle.
        let handle = os::to_cstring(path.as_os_str().as_bytes())
            .ok()
            .and_then(|cpath| os::resident_handle(&cpath))
            .or_else(os::program_handle)
            .unwrap_or_else(|| {
                panic!("no handle for the resident module at {}", path.display())
            });
        SharedObject {
            path: path.to_path_buf(),
            handle,
            base,
            owns_handle: false,
        }
    }

    /// The library descriptor for this object: path and base address, with
    /// the symbol fields empty. Built from data this instance already
    /// holds; no native lookup is performed.
    #[inline]
    pub fn info(&self) -> SymbolInfo {
        SymbolInfo::descriptor(self.path.clone(), self.base)
    }

    /// The filesystem location of this object.
    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The address this object is mapped at.
    #[inline]
    pub fn base_address(&self) -> *mut c_void {
        self.base
    }

    /// Resolves a symbol to its address in this object and its dependency
    /// chain.
    ///
    /// A missing symbol is a normal outcome, reported as `None`; the
    /// loader's error channel is not involved. The symbol name is looked up
    /// as-is, no mangling is applied, so names like `x::y` are most likely
    /// invalid.
    pub fn address_of(&self, symbol: &str) -> Option<NonNull<c_void>> {
        let symbol = std::ffi::CString::new(symbol).ok()?;
        os::lookup(self.handle, &symbol)
    }

    /// Resolves a symbol and reinterprets its address as a value of type
    /// `T`, typically a function pointer.
    ///
    /// The cast is inherently unchecked, the loader has no notion of
    /// signatures; the only enforced shape check is that `T` is
    /// pointer-sized, which rejects outright casting a resolved address to
    /// a non-pointer type.
    ///
    /// # Safety
    /// The caller must name the exact type of the function or variable
    /// behind the symbol, including its calling convention. A mismatch is
    /// undefined behavior.
    ///
    /// # Panics
    /// Panics when `T` is not pointer-sized.
    ///
    /// # Examples
    /// ```no_run
    /// # let lib = shared_object::SharedObject::open("libfoo.so").unwrap();
    /// unsafe {
    ///     let ret_one = *lib.get::<extern "C" fn() -> i32>("ret_one").unwrap();
    ///     assert_eq!(ret_one(), 1);
    /// }
    /// ```
    /// A static variable may also be resolved and inspected:
    /// ```no_run
    /// # let lib = shared_object::SharedObject::open("libfoo.so").unwrap();
    /// unsafe {
    ///     let generation = *lib.get::<*const u64>("GENERATION").unwrap();
    ///     assert_eq!(*generation, 7);
    /// }
    /// ```
    pub unsafe fn get<'lib, T>(&'lib self, symbol: &str) -> Option<Symbol<'lib, T>> {
        assert!(
            size_of::<T>() == size_of::<*mut ()>(),
            "resolved addresses can only be cast to pointer-sized types"
        );
        self.address_of(symbol).map(|addr| Symbol {
            ptr: addr.as_ptr().cast(),
            pd: PhantomData,
        })
    }

    /// Returns whether the object at `path` is currently mapped into the
    /// process, regardless of who holds a handle to it.
    ///
    /// The probe does not load the object and retains nothing, so it never
    /// affects the ownership state of existing instances for the same path.
    pub fn is_resident(path: impl AsRef<Path>) -> bool {
        let Ok(cpath) = os::to_cstring(path.as_ref().as_os_str().as_bytes()) else {
            return false;
        };
        os::probe(&cpath)
    }
}

impl Drop for SharedObject {
    fn drop(&mut self) {
        if self.owns_handle {
            #[cfg(feature = "log")]
            log::trace!("closing {} (handle: {:p})", self.path.display(), self.handle.as_ptr());
            os::close(self.handle);
        }
    }
}

/// A typed symbol resolved from a loaded shared object.
///
/// Borrows the object it was resolved from, so the object cannot be
/// dropped, and its mapping cannot be released, while the symbol is alive.
#[derive(Debug, Clone)]
pub struct Symbol<'lib, T: 'lib> {
    ptr: *mut (),
    pd: PhantomData<&'lib T>,
}

impl<'lib, T> ops::Deref for Symbol<'lib, T> {
    type Target = T;
    fn deref(&self) -> &T {
        unsafe { &*(&self.ptr as *const *mut _ as *const T) }
    }
}

impl<'lib, T> Symbol<'lib, T> {
    /// Extracts the raw resolved address, discarding the lifetime tie to
    /// the object it came from.
    pub fn into_raw(self) -> *const () {
        self.ptr
    }
}
