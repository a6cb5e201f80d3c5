use std::fs::{self, File};
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use super::PartSet;
use crate::common::id::PartSetId;
use crate::header::Header;
use crate::utils::path::parent_dir;

/// Result of probing one candidate file for a part header.
///
/// Anything that is not a readable part (foreign files, truncated files,
/// unreadable files) is `Unrecognized`; that is not an error.
//
// // 探测单个候选文件是否带有分片头部的结果。
// // 任何不是可读分片的文件 (无关文件、截断文件、不可读文件) 都是 `Unrecognized`，这不是错误。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanOutcome {
    RecognizedPart(Header),
    Unrecognized,
}

impl ScanOutcome {
    pub fn into_header(self) -> Option<Header> {
        match self {
            ScanOutcome::RecognizedPart(h) => Some(h),
            ScanOutcome::Unrecognized => None,
        }
    }
}

/// Defines errors that can occur while gathering the parts of one split.
//
// // 定义在收集同一次拆分的分片时可能发生的错误。
#[derive(Debug, thiserror::Error)]
pub enum CollectError {
    /// The input is neither an existing file nor an existing directory.
    //
    // // 输入既不是已存在的文件，也不是已存在的目录。
    #[error("Directory not found: {0}")]
    DirectoryNotFound(PathBuf),

    /// The directory holds no file with a valid header.
    //
    // // 目录中没有任何带有效头部的文件。
    #[error("No files found with a valid header in {0}")]
    NoPartsFound(PathBuf),

    /// Parts of more than one split share the directory; one part file must be named.
    //
    // // 目录中存在多次拆分的分片；必须指定其中一个分片文件。
    #[error("Multiple different part sets found ({}). Please specify one file as input", format_ids(.0))]
    Ambiguous(Vec<PartSetId>),

    /// The file given to pick a part set has no valid header itself.
    //
    // // 用于指定分片组的文件本身没有有效头部。
    #[error("The file contains no valid header: {0}")]
    NoHeader(PathBuf),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

fn format_ids(ids: &[PartSetId]) -> String {
    ids.iter().map(PartSetId::to_string).collect::<Vec<_>>().join(", ")
}

/// Tries to read a part header from the start of `source`.
pub fn probe_reader(source: impl Read) -> ScanOutcome {
    match Header::read_from(source) {
        Ok(header) => ScanOutcome::RecognizedPart(header),
        Err(_) => ScanOutcome::Unrecognized,
    }
}

/// Tries to read a part header from the file at `path`.
pub fn probe_file(path: &Path) -> ScanOutcome {
    match File::open(path) {
        Ok(file) => probe_reader(BufReader::new(file)),
        Err(e) => {
            debug!(path = %path.display(), error = %e, "Unable to open candidate");
            ScanOutcome::Unrecognized
        }
    }
}

/// Probes every candidate path and keeps the recognised parts.
/// With `only` set, parts of any other set are skipped.
pub fn collect_from_candidates<I, P>(candidates: I, only: Option<PartSetId>) -> PartSet
where
    I: IntoIterator<Item = P>,
    P: Into<PathBuf>,
{
    let mut set = PartSet::new();
    for candidate in candidates {
        let path = candidate.into();
        let ScanOutcome::RecognizedPart(header) = probe_file(&path) else {
            continue;
        };
        match only {
            Some(id) if header.id() != id => {
                debug!(path = %path.display(), id = %header.id(), "Ignoring part of another set");
            }
            _ => {
                debug!(path = %path.display(), part = header.part_number(), "Detected header");
                set.insert(path, header);
            }
        }
    }
    set
}

/// Gathers the parts of one split starting from `input`.
///
/// - `input` is a directory: every recognised file in it is collected, and the
///   directory must hold exactly one part set.
/// - `input` is a part file: its header selects the part set, and matching
///   siblings in the same directory are collected.
pub fn collect_parts(input: &Path) -> Result<PartSet, CollectError> {
    if input.is_file() {
        let header = probe_file(input)
            .into_header()
            .ok_or_else(|| CollectError::NoHeader(input.to_path_buf()))?;
        let dir = parent_dir(input);
        info!(id = %header.id(), dir = %dir.display(), "Collecting parts matching the given file");

        let set = collect_from_candidates(list_files(dir)?, Some(header.id()));
        if set.is_empty() {
            // the input vanished between the probe and the listing
            warn!(path = %input.display(), "Given part file is no longer readable");
            return Err(CollectError::NoHeader(input.to_path_buf()));
        }
        return Ok(set);
    }

    if !input.is_dir() {
        return Err(CollectError::DirectoryNotFound(input.to_path_buf()));
    }

    info!(dir = %input.display(), "Auto detecting files with headers");
    let set = collect_from_candidates(list_files(input)?, None);
    if set.is_empty() {
        return Err(CollectError::NoPartsFound(input.to_path_buf()));
    }
    let ids = set.ids();
    if ids.len() > 1 {
        return Err(CollectError::Ambiguous(ids.into_iter().collect()));
    }
    Ok(set)
}

/// Regular files directly inside `dir`, in name order.
fn list_files(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            files.push(entry.path());
        }
    }
    files.sort();
    Ok(files)
}
