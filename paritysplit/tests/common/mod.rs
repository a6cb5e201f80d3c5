#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use paritysplit::{Header, SplitReport, split};

/// Helper: deterministic, non-repeating-looking content of `len` bytes.
pub fn sample_bytes(len: usize) -> Vec<u8> {
    let mut state: u32 = 0x1234_5678;
    (0..len)
        .map(|_| {
            // xorshift32
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            (state >> 24) as u8
        })
        .collect()
}

/// Helper: writes `content` to `name` inside the temp dir and returns its path.
pub fn create_source_file(dir: &TempDir, name: &str, content: &[u8]) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

/// Helper: splits `content` (stored as `name`) into `parts` inside `<tmp>/parts`.
///
/// Returns the parts directory and the split report.
pub fn split_sample(dir: &TempDir, name: &str, content: &[u8], parts: u32) -> (PathBuf, SplitReport) {
    let source = create_source_file(dir, name, content);
    let out_dir = dir.path().join("parts");
    let report = split(&source, &out_dir, parts).unwrap();
    (out_dir, report)
}

/// Helper: the payload bytes of a part file (everything after the header).
pub fn read_part_payload(path: &Path) -> (Header, Vec<u8>) {
    let bytes = fs::read(path).unwrap();
    let header = Header::from_bytes(&bytes).unwrap();
    let header_len = header.to_bytes().unwrap().len();
    (header, bytes[header_len..].to_vec())
}
