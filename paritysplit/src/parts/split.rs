use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use serde::Serialize;
use tracing::{debug, info};
use crate::common::constants::{MAX_PART_LENGTH, PARITY_PART_NUMBER};
use crate::common::id::PartSetId;
use crate::header::{Header, HeaderError, PartCount};
use crate::utils::parity::ParityAccumulator;
use crate::utils::path::part_path;

/// Defines errors that can occur while splitting a file into parts.
//
// // 定义将文件拆分为分片时可能发生的错误。
#[derive(Debug, thiserror::Error)]
pub enum SplitError {
    #[error("File not found: {0}")]
    SourceNotFound(PathBuf),

    /// The output directory did not exist and could not be created.
    //
    // // 输出目录不存在且无法创建。
    #[error("Unable to create directory {path:?}: {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The part count is outside `2..=999`, or too large for the file.
    //
    // // 分片数量超出 `2..=999`，或相对于文件过大。
    #[error("{0}")]
    InvalidPartCount(String),

    #[error("Segment length {0} is too long. Create more parts.")]
    PartTooLarge(u64),

    #[error("Source file name is not valid UTF-8: {0:?}")]
    InvalidFileName(PathBuf),

    /// The source returned no data although the header promised more.
    /// Part counts that leave the last part empty are rejected up front, so
    /// this only happens when the source shrinks while it is being split.
    //
    // // 头部声明还有数据，但源文件已无数据可读。
    // // 会留下空分片的数量在拆分前已被拒绝，因此只有源文件在拆分过程中变小时才会出现。
    #[error("Expected data for part {0} but the source returned none")]
    UnexpectedEof(u32),

    #[error("Failed to write part header: {0}")]
    Header(#[from] HeaderError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Summary of a finished split.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SplitReport {
    pub id: PartSetId,
    pub file_name: String,
    pub file_size: u64,
    pub part_count: u32,
    pub part_length: u64,
    /// Data part files, in part number order.
    pub parts: Vec<PathBuf>,
    pub parity: PathBuf,
}

/// Splits `source` into `part_count` data parts plus one parity part inside `output_dir`.
///
/// Every data part holds `ceil(size / part_count)` bytes of the source except
/// the last, which holds the remainder. The parity part holds the XOR of all
/// data parts, each zero-padded to the full part length. Existing part files
/// with the same names are replaced.
pub fn split(source: &Path, output_dir: &Path, part_count: u32) -> Result<SplitReport, SplitError> {
    if !source.is_file() {
        return Err(SplitError::SourceNotFound(source.to_path_buf()));
    }
    let file_name = source
        .file_name()
        .and_then(|s| s.to_str())
        .ok_or_else(|| SplitError::InvalidFileName(source.to_path_buf()))?
        .to_string();

    if !output_dir.is_dir() {
        fs::create_dir_all(output_dir).map_err(|e| SplitError::CreateDirectory {
            path: output_dir.to_path_buf(),
            source: e,
        })?;
    }

    let part_count =
        PartCount::new(part_count).map_err(|e| SplitError::InvalidPartCount(e.to_string()))?;
    let count = u64::from(part_count.get());

    let file = File::open(source)?;
    let file_size = file.metadata()?.len();
    if file_size <= count {
        return Err(SplitError::InvalidPartCount(format!(
            "Part count too large for this file. Count must be less than size in bytes ({} <= {})",
            file_size, count
        )));
    }
    let part_length = file_size.div_ceil(count);
    if part_length > MAX_PART_LENGTH {
        return Err(SplitError::PartTooLarge(part_length));
    }
    // With the length rounded up, a high count can cover the file before the
    // last part is reached (10 bytes in 6 parts of 2).
    if (count - 1) * part_length >= file_size {
        return Err(SplitError::InvalidPartCount(format!(
            "{} parts of {} bytes would leave the last part empty; choose fewer parts",
            count, part_length
        )));
    }
    let width = part_length as usize;

    let template = Header::new(file_name.clone(), file_size, part_count);
    info!(
        file = %file_name,
        size = file_size,
        parts = part_count.get(),
        id = %template.id(),
        "Splitting file"
    );

    let mut reader = BufReader::new(file);
    let mut parity = ParityAccumulator::new(width);
    let mut parts = Vec::with_capacity(part_count.get() as usize);
    let mut chunk = Vec::with_capacity(width);

    for number in 1..=part_count.get() {
        chunk.clear();
        (&mut reader).take(part_length).read_to_end(&mut chunk)?;
        if chunk.is_empty() {
            return Err(SplitError::UnexpectedEof(number));
        }
        parity.fold(&chunk);

        let header = template.with_part_number(number);
        let path = part_path(output_dir, &file_name, number);
        write_part(&path, &header, &chunk)?;
        debug!(part = number, bytes = chunk.len(), path = %path.display(), "Wrote part");
        parts.push(path);
    }

    let parity_path = part_path(output_dir, &file_name, PARITY_PART_NUMBER);
    write_part(
        &parity_path,
        &template.with_part_number(PARITY_PART_NUMBER),
        parity.as_bytes(),
    )?;
    debug!(path = %parity_path.display(), "Wrote parity");

    Ok(SplitReport {
        id: template.id(),
        file_name,
        file_size,
        part_count: part_count.get(),
        part_length,
        parts,
        parity: parity_path,
    })
}

/// Writes one part file: header followed by the payload.
fn write_part(path: &Path, header: &Header, payload: &[u8]) -> Result<(), SplitError> {
    let mut writer = BufWriter::new(File::create(path)?);
    header.write_to(&mut writer)?;
    writer.write_all(payload)?;
    writer.flush()?;
    Ok(())
}
