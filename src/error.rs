use std::borrow::Cow;
use std::fmt::{Debug, Display};

/// Error types used throughout the `shared_object` library.
///
/// The dynamic linker reports failures through a single channel, its
/// last-error message, so one variant covers the whole open path. Expected
/// negative outcomes (a missing symbol, an address outside every mapped
/// object, a non-resident probe) are expressed as `Option`/`bool` by the
/// respective operations and never reach this type.
#[derive(Debug)]
pub enum Error {
    /// The dynamic linker refused to open a shared object.
    ///
    /// Carries the loader's own human-readable diagnostic, e.g.:
    /// * File not found
    /// * Undefined symbols under immediate binding
    /// * Object class/architecture mismatch
    Load {
        /// The diagnostic reported by the dynamic linker.
        msg: Cow<'static, str>,
    },
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Load { msg } => write!(f, "load error: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

/// Creates a load error with the specified message.
///
/// This is a convenience function for creating `Error::Load` variants.
#[cold]
#[inline(never)]
pub(crate) fn load_error(msg: impl Into<Cow<'static, str>>) -> Error {
    Error::Load { msg: msg.into() }
}
