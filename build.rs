use std::env;
use std::fs;
use std::path::PathBuf;

fn main() {
    // Only apply linker scripts for the RP2040 target (Cortex-M0+)
    let target = env::var("TARGET").unwrap();
    if target.starts_with("thumbv6m-none-eabi") {
        let out = PathBuf::from(env::var_os("OUT_DIR").unwrap());
        fs::write(out.join("memory.x"), include_bytes!("memory.x")).unwrap();
        println!("cargo:rustc-link-search={}", out.display());
        println!("cargo:rerun-if-changed=memory.x");
        println!("cargo:rerun-if-changed=build.rs");

        println!("cargo:rustc-link-arg-bins=--nmagic");
        println!("cargo:rustc-link-arg-bins=-Tlink.x");
        println!("cargo:rustc-link-arg-bins=-Tlink-rp.x");
        println!("cargo:rustc-link-arg-bins=-Tdefmt.x");
    }
}
