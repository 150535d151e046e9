#![crate_type = "cdylib"]

#[no_mangle]
pub extern "C" fn resident_marker() -> i32 {
    42
}
