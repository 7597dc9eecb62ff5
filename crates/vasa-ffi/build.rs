//! Generates `include/vasa.h` from the `extern "C"` surface.
//!
//! Set `VASA_HEADER_DIR` to write the header somewhere other than the
//! crate's `include/` directory.

use std::env;
use std::error::Error;
use std::path::{Path, PathBuf};

fn header_dir(crate_dir: &Path) -> PathBuf {
    match env::var_os("VASA_HEADER_DIR") {
        Some(dir) => PathBuf::from(dir),
        None => crate_dir.join("include"),
    }
}

fn generate(crate_dir: &Path) -> Result<PathBuf, Box<dyn Error>> {
    let config = cbindgen::Config::from_file(crate_dir.join("cbindgen.toml"))?;
    let out_dir = header_dir(crate_dir);
    std::fs::create_dir_all(&out_dir)?;
    let header = out_dir.join("vasa.h");
    cbindgen::Builder::new()
        .with_crate(crate_dir)
        .with_config(config)
        .generate()?
        .write_to_file(&header);
    Ok(header)
}

fn main() {
    println!("cargo:rerun-if-changed=src");
    println!("cargo:rerun-if-changed=cbindgen.toml");
    println!("cargo:rerun-if-env-changed=VASA_HEADER_DIR");

    let crate_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR").expect("cargo sets CARGO_MANIFEST_DIR"));
    if let Err(e) = generate(&crate_dir) {
        panic!("failed to generate vasa.h: {e}");
    }
}
