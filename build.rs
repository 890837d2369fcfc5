// build.rs
// Emits link directives for the precompiled MEX helper library when building
// with the native feature. The library itself is never compiled here.

use std::env;

fn main() {
    // Features reach build scripts through CARGO_FEATURE_* variables.
    if env::var("CARGO_FEATURE_NATIVE").is_ok() {
        println!("cargo:rerun-if-env-changed=SIMNET_KERNEL_DIR");

        match env::var("SIMNET_KERNEL_DIR") {
            Ok(dir) => {
                println!("cargo:rustc-link-search=native={}", dir);
            }
            Err(_) => {
                println!("cargo:warning=SIMNET_KERNEL_DIR not set.");
                println!(
                    "cargo:warning=Point it at the directory holding libmex_dims_helper.so to link the native helper."
                );
            }
        }

        println!("cargo:rustc-link-lib=dylib=mex_dims_helper");
    }
}
