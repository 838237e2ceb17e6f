//! Build script for the storefront crate.
//!
//! Hashes the stylesheet so templates can append a cache-busting version
//! (`/static/css/main.css?v=<hash>`), and asks Cargo to rebuild when the
//! migrations change so `sqlx::migrate!` embeds the current set.

use std::env;
use std::fs;
use std::path::Path;

use sha2::{Digest, Sha256};

fn main() {
    let manifest_dir = env::var("CARGO_MANIFEST_DIR").unwrap_or_else(|_| ".".to_owned());
    let manifest_dir = Path::new(&manifest_dir);

    println!(
        "cargo:rerun-if-changed={}",
        manifest_dir.join("migrations").display()
    );
    hash_css(manifest_dir);
}

/// Set `CSS_HASH` to the first 8 hex chars of the SHA-256 of `main.css`.
fn hash_css(manifest_dir: &Path) {
    let css_path = manifest_dir.join("static/css/main.css");
    println!("cargo:rerun-if-changed={}", css_path.display());

    let short_hash = fs::read(&css_path).map_or_else(
        |e| {
            println!("cargo:warning=Could not read main.css: {e}");
            String::from("dev")
        },
        |content| {
            let digest = Sha256::digest(&content);
            let hex: String = digest.iter().map(|b| format!("{b:02x}")).collect();
            hex.chars().take(8).collect()
        },
    );

    println!("cargo:rustc-env=CSS_HASH={short_hash}");
}
