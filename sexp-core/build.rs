//! Build script for sexp-core.
//!
//! Sets compile-time environment variables for version tracking:
//! - `SEXP_VERSION`: Package version (from Cargo.toml or env)
//! - `SEXP_COMMIT_SHA`: Git commit hash (from `git rev-parse HEAD` or env)
//! - `SEXP_VERSION_STRING`: Combined version string for display (e.g., "0.1.0 (abc12345)")

use std::process::Command;

fn main() {
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=../.git/HEAD");
    println!("cargo:rerun-if-env-changed=SEXP_VERSION");
    println!("cargo:rerun-if-env-changed=SEXP_COMMIT_SHA");

    let version = std::env::var("SEXP_VERSION")
        .unwrap_or_else(|_| env!("CARGO_PKG_VERSION").to_string());
    println!("cargo:rustc-env=SEXP_VERSION={}", version);

    let commit = std::env::var("SEXP_COMMIT_SHA").ok().or_else(get_git_commit);
    if let Some(ref sha) = commit {
        println!("cargo:rustc-env=SEXP_COMMIT_SHA={}", sha);
    }

    let version_string = match commit {
        Some(sha) => format!("{} ({})", version, sha),
        None => version,
    };
    println!("cargo:rustc-env=SEXP_VERSION_STRING={}", version_string);
}

/// Try to get the current git commit SHA.
fn get_git_commit() -> Option<String> {
    let output = Command::new("git")
        .args(["rev-parse", "--short=8", "HEAD"])
        .output()
        .ok()?;

    if !output.status.success() {
        return None;
    }

    let sha = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if sha.is_empty() {
        None
    } else {
        Some(sha)
    }
}
