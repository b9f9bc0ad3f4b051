#![allow(dead_code)]

use std::path::Path;

use assert_cmd::Command;
use serde_json::Value;
use tempfile::TempDir;

/// A scratch data directory for one test.
pub struct DataDir {
    dir: TempDir,
}

impl DataDir {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("failed to create tempdir"),
        }
    }

    /// A data dir that already went through `karma init`.
    pub fn seeded() -> Self {
        let data = Self::new();
        data.karma().arg("init").assert().success();
        data
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// `karma --data-dir <dir>` with workspace env overrides cleared.
    pub fn karma(&self) -> Command {
        let mut cmd = Command::cargo_bin("karma").expect("binary");
        cmd.env_remove("KARMA_WORKSPACE")
            .env_remove("KARMA_DATA_DIR")
            .env_remove("RUST_LOG")
            .arg("--data-dir")
            .arg(self.path());
        cmd
    }

    /// Run with `--json` and return the parsed envelope; asserts success.
    pub fn json(&self, args: &[&str]) -> Value {
        let output = self
            .karma()
            .arg("--json")
            .args(args)
            .output()
            .expect("run karma");
        assert!(
            output.status.success(),
            "karma {args:?} failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );
        serde_json::from_slice(&output.stdout).expect("json envelope")
    }
}
