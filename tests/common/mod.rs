#![allow(dead_code)]

use std::env::consts::{DLL_PREFIX, DLL_SUFFIX};
use std::path::PathBuf;

pub fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("TEST_ARTIFACTS")).join(format!("{DLL_PREFIX}{name}{DLL_SUFFIX}"))
}
