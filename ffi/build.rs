use std::env;
use std::path::PathBuf;

fn main() {
    let crate_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR").unwrap_or_else(|_| ".".into()));
    let out_dir = crate_dir.join("include");

    println!("cargo:rerun-if-changed=src/lib.rs");
    println!("cargo:rerun-if-changed=src/types.rs");

    if let Err(e) = std::fs::create_dir_all(&out_dir) {
        println!("cargo:warning=could not create {}: {e}", out_dir.display());
        return;
    }

    let config = cbindgen::Config {
        language: cbindgen::Language::C,
        include_guard: Some("PETS_H".to_string()),
        cpp_compat: true,
        enumeration: cbindgen::EnumConfig {
            prefix_with_name: true,
            ..Default::default()
        },
        ..Default::default()
    };

    match cbindgen::Builder::new()
        .with_crate(&crate_dir)
        .with_config(config)
        .generate()
    {
        Ok(bindings) => {
            bindings.write_to_file(out_dir.join("pets.h"));
        }
        Err(e) => println!("cargo:warning=cbindgen failed: {e}"),
    }
}
