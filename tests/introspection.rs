mod common;

use common::fixture;
use rstest::rstest;
use shared_object::{SharedObject, SymbolInfo, current_object};

#[rstest]
fn current_object_knows_its_module() {
    let this = current_object!();
    let info = this.info();

    let path = info.object_path().expect("current module must have a path");
    assert!(!path.as_os_str().is_empty());
    assert!(info.object_base_address().is_some());

    // A library descriptor carries no symbol fields.
    assert!(info.symbol_address().is_none());
    assert!(info.symbol_name().is_none());
}

#[rstest]
fn dropping_the_current_object_is_harmless() {
    let first = current_object!();
    let path = first.path().to_path_buf();
    drop(first);

    // The module must still be resolvable afterwards.
    let second = current_object!();
    assert_eq!(second.path(), path);
}

#[rstest]
fn base_address_round_trips_through_reverse_lookup() {
    let this = current_object!();
    let descriptor = this.info();

    let base = descriptor.object_base_address().unwrap();
    let looked_up = SymbolInfo::from_address(base).expect("base address must be mapped");
    assert_eq!(looked_up.object_path(), descriptor.object_path());
}

#[rstest]
fn reverse_lookup_finds_an_exported_symbol() {
    let lib = SharedObject::open(fixture("foo")).unwrap();
    let addr = lib.address_of("ret_one").unwrap();

    let info = SymbolInfo::from_address(addr.as_ptr()).unwrap();
    assert_eq!(info.symbol_name(), Some("ret_one"));
    assert_eq!(
        info.symbol_address().map(|p| p as usize),
        Some(addr.as_ptr() as usize)
    );
    let path = info.object_path().unwrap();
    assert_eq!(path.file_name(), fixture("foo").file_name());
}

#[rstest]
fn descriptor_base_matches_reverse_lookup() {
    let lib = SharedObject::open(fixture("foo")).unwrap();
    let addr = lib.address_of("ret_one").unwrap();

    let by_address = SymbolInfo::from_address(addr.as_ptr()).unwrap();
    let descriptor = lib.info();
    assert_eq!(
        descriptor.object_base_address().map(|p| p as usize),
        by_address.object_base_address().map(|p| p as usize)
    );
    assert_eq!(descriptor.object_path(), Some(lib.path()));
}

#[rstest]
fn unknown_address_yields_none() {
    // Heap allocations belong to no mapped object.
    let boxed = Box::new(0u8);
    let addr = (&*boxed as *const u8).cast();
    assert!(SymbolInfo::from_address(addr).is_none());
}

#[rstest]
fn symbol_name_never_appears_without_its_address() {
    let lib = SharedObject::open(fixture("foo")).unwrap();
    let addr = lib.address_of("ret_hello").unwrap();
    let info = SymbolInfo::from_address(addr.as_ptr()).unwrap();
    assert_eq!(info.symbol_name().is_some(), info.symbol_address().is_some());
}
