/// Returns the [`SharedObject`](crate::SharedObject) the calling code
/// resides in.
///
/// There is no implicit call-site capture in the language, so the macro
/// declares a function in the caller's module and resolves its address:
/// that address is guaranteed to live inside whatever object the caller was
/// compiled into. Use this macro rather than calling
/// [`SharedObject::for_address`](crate::SharedObject::for_address) with an
/// arbitrary address.
///
/// The returned instance never owns its handle; dropping it is harmless.
/// # Example
/// ```
/// let this = shared_object::current_object!();
/// assert!(this.info().object_path().is_some());
/// ```
#[macro_export]
macro_rules! current_object {
    () => {{
        fn __current_object_anchor() {}
        $crate::SharedObject::for_address(
            __current_object_anchor as fn() as *const ::core::ffi::c_void,
        )
    }};
}
