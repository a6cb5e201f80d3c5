//!
//! # Test Common Utilities
//!
//! Shared setup for the `paritysplit` command line tests: an isolated
//! temporary directory with a source file, and a runner for the binary.
//!
//
// // # 测试通用工具
// //
// // 为 `paritysplit` 命令行测试提供共享的准备工作：
// // 一个包含源文件的独立临时目录，以及运行二进制文件的辅助方法。
// //
#![allow(dead_code)]

use assert_cmd::Command;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::{TempDir, tempdir};

/// Represents the context for a single test.
///
/// The temporary directory is removed when the `TestContext` goes out of scope.
pub struct TestContext {
    /// Held for its Drop behavior to ensure cleanup.
    pub _temp_dir: TempDir,
    /// The file that gets split.
    pub source: PathBuf,
    /// Where the parts are written.
    pub parts_dir: PathBuf,
}

impl TestContext {
    /// Creates a fresh directory holding `file_name` with `content`.
    pub fn new(file_name: &str, content: &[u8]) -> anyhow::Result<Self> {
        let temp_dir = tempdir()?;
        let source = temp_dir.path().join(file_name);
        fs::write(&source, content)?;
        let parts_dir = temp_dir.path().join("parts");
        Ok(TestContext {
            _temp_dir: temp_dir,
            source,
            parts_dir,
        })
    }

    /// A `paritysplit` command with logging silenced unless a test enables it.
    pub fn command(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_paritysplit"));
        cmd.env("RUST_LOG", "off");
        cmd
    }

    /// Runs `split` on the source file and asserts it succeeds.
    pub fn split(&self, parts: u32) -> anyhow::Result<()> {
        self.command()
            .arg("split")
            .arg(parts.to_string())
            .arg(&self.source)
            .arg(&self.parts_dir)
            .assert()
            .success();
        Ok(())
    }

    /// Path of the part file `number` (0 is the parity part).
    pub fn part(&self, number: u32) -> PathBuf {
        let name = self.source.file_name().and_then(|n| n.to_str()).unwrap();
        if number == 0 {
            self.parts_dir.join(format!("{}.crc", name))
        } else {
            self.parts_dir.join(format!("{}.{:03}", name, number))
        }
    }

    pub fn path(&self) -> &Path {
        self._temp_dir.path()
    }
}
