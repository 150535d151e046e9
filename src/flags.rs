//! Portable load options and their translation to native `RTLD_*` bits.
//!
//! `dlopen` takes a single integer that mixes a binding policy with a set of
//! visibility/lifetime flags, and the numeric values differ between
//! platforms (glibc, musl and Darwin disagree on almost every constant).
//! This module keeps the portable surface: a [`LoadBehavior`] that always
//! contributes exactly one bit, and a [`LoadFlags`] set that is OR'd on top.

use bitflags::bitflags;
use std::ffi::c_int;

/// Symbol binding policy for a load request.
///
/// Exactly one policy applies to every load; [`LoadBehavior::Lazy`] is the
/// default.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LoadBehavior {
    /// Perform lazy binding. Symbols are resolved as the code that
    /// references them is executed; a symbol that is never referenced is
    /// never resolved. Lazy binding only applies to function references,
    /// references to variables are always bound when the object is loaded.
    #[default]
    Lazy,

    /// Resolve all undefined symbols in the object before the open call
    /// returns, and fail the load if that cannot be done. The native loader
    /// also forces this policy process-wide when the `LD_BIND_NOW`
    /// environment variable is set to a nonempty string, outside this
    /// crate's control.
    Now,
}

impl LoadBehavior {
    /// The native bit this policy contributes to the `dlopen` mode.
    #[inline]
    pub(crate) fn bits(self) -> c_int {
        match self {
            LoadBehavior::Lazy => libc::RTLD_LAZY,
            LoadBehavior::Now => libc::RTLD_NOW,
        }
    }
}

bitflags! {
    /// Visibility and lifetime flags for a load request.
    ///
    /// Flags combine additively on top of a [`LoadBehavior`] bit. The
    /// default set is [`LoadFlags::LOCAL`].
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct LoadFlags: c_int {
        /// The converse of `GLOBAL`, and the default if neither is
        /// specified. Symbols defined in this object are not made available
        /// to resolve references in subsequently loaded objects.
        const LOCAL = libc::RTLD_LOCAL;

        /// Symbols defined by this object are made available for symbol
        /// resolution of subsequently loaded objects.
        const GLOBAL = libc::RTLD_GLOBAL;

        /// Don't load the object. Used to probe whether it is already
        /// resident (the open fails if it is not), or to promote the flags
        /// of an already resident object: one previously loaded `LOCAL` can
        /// be reopened with `NO_LOAD | GLOBAL`. An open carrying this flag
        /// never takes ownership of the handle it returns. Not specified in
        /// POSIX.1-2001.
        const NO_LOAD = libc::RTLD_NOLOAD;

        /// Do not unload the object when its handle is closed, so its
        /// static variables are not reinitialized if it is opened again
        /// later. Not specified in POSIX.1-2001.
        const NO_DELETE = libc::RTLD_NODELETE;
    }
}

impl Default for LoadFlags {
    fn default() -> Self {
        LoadFlags::LOCAL
    }
}

/// Translates a portable load request into the native `dlopen` mode.
#[inline]
pub(crate) fn raw_mode(behavior: LoadBehavior, flags: LoadFlags) -> c_int {
    behavior.bits() | flags.bits()
}
