mod common;

use common::fixture;
use rstest::rstest;
use shared_object::{Error, LoadBehavior, LoadFlags, SharedObject};
use std::ffi::CStr;
use std::os::raw::c_char;

#[rstest]
fn wrong_path_fails_with_a_diagnostic() {
    let err = SharedObject::open("target/this_location_is_definitely_non existent:^~")
        .err()
        .unwrap();
    let Error::Load { msg } = err;
    assert!(!msg.is_empty());
}

#[rstest]
fn typed_resolution_returns_literals() {
    let lib = SharedObject::open(fixture("foo")).unwrap();

    let ret_one = unsafe { *lib.get::<extern "C" fn() -> i32>("ret_one").unwrap() };
    assert_eq!(ret_one(), 1);

    let ret_hello = unsafe {
        *lib.get::<extern "C" fn() -> *const c_char>("ret_hello")
            .unwrap()
    };
    let hello = unsafe { CStr::from_ptr(ret_hello()) };
    assert_eq!(hello.to_str().unwrap(), "hello");
}

#[rstest]
fn data_symbol_reads_through_typed_pointer() {
    let lib = SharedObject::open(fixture("foo")).unwrap();
    let generation = unsafe { *lib.get::<*const u64>("FOO_GENERATION").unwrap() };
    assert_eq!(unsafe { *generation }, 7);
}

#[rstest]
fn missing_symbol_is_absence_not_failure() {
    let lib = SharedObject::open(fixture("foo")).unwrap();
    assert!(lib.address_of("definitely_not_a_symbol").is_none());
    assert!(
        unsafe { lib.get::<extern "C" fn()>("definitely_not_a_symbol") }.is_none()
    );
    // Interior nul bytes cannot name any symbol.
    assert!(lib.address_of("ret\0one").is_none());
}

#[rstest]
fn residency_follows_ownership() {
    let path = fixture("resident");
    assert!(!SharedObject::is_resident(&path));

    let lib = SharedObject::open(&path).unwrap();
    assert!(SharedObject::is_resident(&path));

    drop(lib);
    assert!(!SharedObject::is_resident(&path));
}

#[rstest]
fn no_delete_keeps_the_object_resident() {
    let path = fixture("nodelete");
    let lib = SharedObject::open_with(
        &path,
        LoadBehavior::Now,
        LoadFlags::LOCAL | LoadFlags::NO_DELETE,
    )
    .unwrap();
    drop(lib);
    assert!(SharedObject::is_resident(&path));
}

#[rstest]
fn probe_open_never_takes_ownership() {
    let path = fixture("foo");
    let owner = SharedObject::open(&path).unwrap();

    let probe = SharedObject::open_with(
        &path,
        LoadBehavior::Lazy,
        LoadFlags::LOCAL | LoadFlags::NO_LOAD,
    )
    .unwrap();
    drop(probe);

    // The owner's mapping must survive the probe's drop.
    assert!(SharedObject::is_resident(&path));
    let ret_one = unsafe { *owner.get::<extern "C" fn() -> i32>("ret_one").unwrap() };
    assert_eq!(ret_one(), 1);
}

#[rstest]
fn probing_an_absent_object_is_a_load_failure() {
    // Nothing in this process loads an object by this name.
    let absent = SharedObject::open_with(
        "libshared_object_absent_fixture.so",
        LoadBehavior::Lazy,
        LoadFlags::LOCAL | LoadFlags::NO_LOAD,
    );
    assert!(absent.is_err());
}

#[rstest]
fn immediate_binding_loads_the_fixture() {
    let lib =
        SharedObject::open_with(fixture("foo"), LoadBehavior::Now, LoadFlags::default()).unwrap();
    let ret_one = unsafe { *lib.get::<extern "C" fn() -> i32>("ret_one").unwrap() };
    assert_eq!(ret_one(), 1);
}
