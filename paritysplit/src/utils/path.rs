use std::path::{Path, PathBuf};
use crate::common::constants::PARITY_EXTENSION;

/// The on-disk file name of part `part_number` of `base_name`.
///
/// For example:
/// - ("video.mp4", 1) -> "video.mp4.001"
/// - ("video.mp4", 42) -> "video.mp4.042"
/// - ("video.mp4", 0) -> "video.mp4.crc"
pub fn part_file_name(base_name: &str, part_number: u32) -> String {
    if part_number == 0 {
        format!("{}.{}", base_name, PARITY_EXTENSION)
    } else {
        format!("{}.{:03}", base_name, part_number)
    }
}

/// The full path of a part file inside `dir`.
pub fn part_path(dir: &Path, base_name: &str, part_number: u32) -> PathBuf {
    dir.join(part_file_name(base_name, part_number))
}

/// The directory a file lives in, with `.` for bare relative names.
pub fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    }
}

/// Returns `name` if it is a bare file name, i.e. it can't escape the
/// directory it is joined onto.
pub fn bare_file_name(name: &str) -> Option<&str> {
    let path = Path::new(name);
    match path.file_name() {
        Some(f) if f == path.as_os_str() && !name.contains(['/', '\\']) => Some(name),
        _ => None,
    }
}
