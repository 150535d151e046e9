#![crate_type = "cdylib"]

#[no_mangle]
pub extern "C" fn nodelete_marker() -> i32 {
    43
}
