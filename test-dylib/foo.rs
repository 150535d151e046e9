#![crate_type = "cdylib"]

use std::os::raw::c_char;

#[no_mangle]
pub extern "C" fn ret_one() -> i32 {
    1
}

#[no_mangle]
pub extern "C" fn ret_hello() -> *const c_char {
    b"hello\0".as_ptr() as *const c_char
}

#[no_mangle]
pub static FOO_GENERATION: u64 = 7;
