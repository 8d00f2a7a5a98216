//! Build script embedding the version printed by `pollcache --version`.
//!
//! `POLLCACHE_VERSION_OVERRIDE` wins when set, for packaged builds outside a
//! git checkout. Otherwise `git describe` is used, marked `-dirty` when the
//! tree has local edits, with the crate version as the last resort.

use std::env;
use std::process::Command;

const OVERRIDE: &str = "POLLCACHE_VERSION_OVERRIDE";

fn main() {
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/refs/");
    println!("cargo:rerun-if-env-changed={OVERRIDE}");

    let version = env::var(OVERRIDE)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .or_else(describe)
        .unwrap_or_else(|| env!("CARGO_PKG_VERSION").to_string());

    println!("cargo:rustc-env=POLLCACHE_VERSION={version}");
}

fn describe() -> Option<String> {
    let output = Command::new("git")
        .args(["describe", "--tags", "--always", "--dirty"])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }

    let described = String::from_utf8(output.stdout).ok()?;
    let described = described.trim();
    (!described.is_empty()).then(|| described.trim_start_matches('v').to_string())
}
