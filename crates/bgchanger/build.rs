// Build scripts signal errors by panicking; there is no caller to
// return Result to.
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

//! Build script for the bgchanger web app.
//!
//! The browser has no process environment, so the compositing service
//! settings are baked in at compile time. Values come from the build
//! environment, falling back to a `.env` file at the workspace root, and
//! are forwarded to `main.rs` as `option_env!` variables.

use std::env;
use std::path::{Path, PathBuf};

/// Variables forwarded into the binary.
const FORWARDED: &[&str] = &["BGCHANGER_API_BASE_URL", "BGCHANGER_API_TIMEOUT_SECS"];

fn main() {
    let manifest_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR").unwrap());

    // Workspace root is two levels up from crates/bgchanger/.
    let workspace_root = manifest_dir
        .parent()
        .and_then(Path::parent)
        .expect("could not find workspace root");

    load_env_file(&workspace_root.join(".env"));

    for key in FORWARDED {
        println!("cargo:rerun-if-env-changed={key}");
        if let Ok(value) = env::var(key) {
            println!("cargo:rustc-env={key}={value}");
        }
    }
}

/// Load `path` into this process's environment if it exists.
///
/// Variables already set in the environment are not overridden.
fn load_env_file(path: &Path) {
    println!("cargo:rerun-if-changed={}", path.display());
    if !path.exists() {
        return;
    }
    dotenvy::from_path(path).unwrap_or_else(|e| panic!("failed to load {}: {e}", path.display()));
}
