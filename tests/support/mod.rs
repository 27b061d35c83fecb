//! Test support utilities for bunker integration tests.
//!
//! Provides reusable test environment setup and helper commands.

#![allow(dead_code)]

pub mod assertions;
pub mod commands;
pub mod fixtures;
pub mod skip;

#[allow(unused_imports)]
pub use assertions::*;
#[allow(unused_imports)]
pub use fixtures::*;

use std::path::PathBuf;

use tempfile::TempDir;

/// Test environment with isolated temp directories.
///
/// Each test gets its own data dir (config, stores) and home dir. Child
/// processes get both through env vars, so tests run in parallel.
pub struct Test {
    /// Config file and store directories
    pub dir: TempDir,
    /// Temporary home directory
    pub home: TempDir,
}

impl Test {
    /// Create a new empty test environment.
    pub fn new() -> Self {
        let dir = TempDir::new().expect("failed to create temp dir");
        let home = TempDir::new().expect("failed to create temp home");

        Self { dir, home }
    }

    /// Create a test environment with a plain root store.
    pub fn init() -> Self {
        let t = Self::new();
        let output = t.init_cmd();
        assert!(
            output.status.success(),
            "Failed to initialize: {}",
            String::from_utf8_lossy(&output.stderr)
        );
        t
    }

    /// Create a test environment with secrets inserted.
    pub fn with_secrets(secrets: &[(&str, &str)]) -> Self {
        let t = Self::init();
        for (path, content) in secrets {
            let output = t.insert(path, content);
            assert!(
                output.status.success(),
                "Failed to insert {}: {}",
                path,
                String::from_utf8_lossy(&output.stderr)
            );
        }
        t
    }

    pub fn config_path(&self) -> PathBuf {
        self.dir.path().join("config.toml")
    }

    /// Directory of a store named `name` inside the test dir.
    pub fn store_dir(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }
}
