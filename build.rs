use std::env;

const DYLIB_FILE_NAME: [&str; 3] = ["foo.rs", "resident.rs", "nodelete.rs"];
const DYLIB_DIR_PATH: &str = "test-dylib";

fn compile_dylib(out_dir: &str) {
    for name in DYLIB_FILE_NAME {
        let src = format!("{DYLIB_DIR_PATH}/{name}");
        println!("cargo:rerun-if-changed={src}");
        let mut cmd = ::std::process::Command::new("rustc");
        cmd.arg("-O").arg(src).arg("--out-dir").arg(out_dir);
        assert!(
            cmd.status()
                .expect("could not compile the test dylibs!")
                .success()
        );
    }
}

fn main() {
    let out_dir = env::var("OUT_DIR").unwrap();
    compile_dylib(&out_dir);
    println!("cargo:rustc-env=TEST_ARTIFACTS={out_dir}");
}
