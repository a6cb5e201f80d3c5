use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use serde::Serialize;
use tempfile::{Builder, NamedTempFile};
use tracing::{debug, info, warn};
use super::PartSet;
use crate::common::constants::{MAX_PART_LENGTH, PARITY_PART_NUMBER};
use crate::common::id::PartSetId;
use crate::header::{Header, HeaderError, HeaderSetViolation};
use crate::utils::parity::ParityAccumulator;
use crate::utils::path::{bare_file_name, parent_dir, part_path};

/// Defines errors that can occur while joining parts back into the original file.
//
// // 定义将分片合并回原始文件时可能发生的错误。
#[derive(Debug, thiserror::Error)]
pub enum JoinError {
    /// The collected headers are duplicated, corrupt, or belong to different splits.
    //
    // // 收集到的头部重复、损坏或属于不同的拆分。
    #[error("Detected duplicate/corrupt headers: {0}")]
    InvalidHeaderSet(#[from] HeaderSetViolation),

    /// More than one of the data and parity parts is missing.
    //
    // // 数据分片与校验分片中缺失了不止一个。
    #[error("Unable to recover missing parts {missing:?}: need all parts, or all but one plus parity")]
    CannotRecover { missing: Vec<u32> },

    /// A part carries more payload than the part length allows.
    //
    // // 某个分片的数据长度超过了分片长度上限。
    #[error("Part {path:?} holds more than {expected} payload bytes")]
    PayloadTooLong { path: PathBuf, expected: u64 },

    /// A part is shorter than its header says, so its bytes would land at the wrong offset.
    //
    // // 分片长度与头部声明的不一致，其数据会被写到错误的偏移处。
    #[error("Part {path:?} holds {actual} payload bytes, expected {expected}")]
    PayloadLengthMismatch {
        path: PathBuf,
        expected: u64,
        actual: u64,
    },

    /// A part file no longer holds the header it was collected with.
    //
    // // 分片文件已不再包含收集时读取到的头部。
    #[error("Part {0:?} changed since it was collected")]
    PartChanged(PathBuf),

    #[error("Segment length {0} is too long to join")]
    PartTooLarge(u64),

    #[error("Header error: {0}")]
    Header(#[from] HeaderError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Summary of a finished join.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinReport {
    pub id: PartSetId,
    pub file_name: String,
    pub file_size: u64,
    pub destination: PathBuf,
    /// The data part rebuilt from parity, if one was missing.
    pub recovered_part: Option<u32>,
    /// The part or parity file written next to the inputs to replace a missing one.
    pub regenerated: Option<PathBuf>,
    /// Non-fatal problems, such as a regenerated part that could not be written.
    pub warnings: Vec<String>,
}

/// The validated parts of one split, ordered by part number.
struct Layout<'a> {
    parts: BTreeMap<u32, (&'a Path, &'a Header)>,
    template: &'a Header,
    part_length: u64,
    inputs_dir: &'a Path,
}

impl<'a> Layout<'a> {
    fn new(set: &'a PartSet) -> Result<Self, JoinError> {
        set.validate()?;
        let parts = set.by_part_number();
        let (path, template) = parts
            .values()
            .next()
            .copied()
            .ok_or(HeaderSetViolation::Empty)?;
        let part_length = template.part_length();
        if part_length > MAX_PART_LENGTH {
            return Err(JoinError::PartTooLarge(part_length));
        }
        Ok(Self {
            parts,
            template,
            part_length,
            inputs_dir: parent_dir(path),
        })
    }

    fn width(&self) -> usize {
        self.part_length as usize
    }

    fn missing(&self) -> Vec<u32> {
        (PARITY_PART_NUMBER..=self.template.part_count())
            .filter(|n| !self.parts.contains_key(n))
            .collect()
    }

    fn read_payload(&self, number: u32) -> Result<Vec<u8>, JoinError> {
        let (path, header) = self.parts[&number];
        read_payload(path, header, self.part_length)
    }
}

/// Reassembles the original file described by `set` into `destination`.
///
/// - All data parts present: they are concatenated in part number order. A
///   missing parity part is recomputed and written next to the inputs.
/// - Exactly one data part missing and parity present: the missing bytes are
///   recovered by XOR-ing parity with every other part, and the part file is
///   written next to the inputs.
/// - Anything else fails with [`JoinError::CannotRecover`].
///
/// Regenerated files never replace existing ones, and failing to write them
/// only adds a warning to the report. The destination is assembled in a
/// temporary file and only appears once it is complete.
pub fn join(set: &PartSet, destination: &Path) -> Result<JoinReport, JoinError> {
    let layout = Layout::new(set)?;
    let template = layout.template;

    let mut report = JoinReport {
        id: template.id(),
        file_name: template.file_name().to_string(),
        file_size: template.file_size(),
        destination: destination.to_path_buf(),
        recovered_part: None,
        regenerated: None,
        warnings: Vec::new(),
    };

    let missing = layout.missing();
    let mut output = destination_tempfile(parent_dir(destination))?;

    let regenerated = match missing.as_slice() {
        [] => {
            info!(file = %template.file_name(), "File has all parts, joining normally");
            concatenate(&layout, output.as_file_mut(), false)?;
            None
        }
        [PARITY_PART_NUMBER] => {
            info!(file = %template.file_name(), "Parity part missing, will generate it again");
            let parity = concatenate(&layout, output.as_file_mut(), true)?;
            parity.map(|p| (PARITY_PART_NUMBER, p.into_bytes()))
        }
        [number] => {
            info!(file = %template.file_name(), part = number, "Recovering missing part");
            let recovered = recover(&layout, output.as_file_mut(), *number)?;
            report.recovered_part = Some(*number);
            Some((*number, recovered))
        }
        _ => {
            warn!(?missing, "Unable to recover, can only recover one part with parity");
            return Err(JoinError::CannotRecover {
                missing: missing.clone(),
            });
        }
    };

    output
        .persist(destination)
        .map_err(|e| JoinError::Io(e.error))?;
    info!(destination = %destination.display(), "Join complete");

    if let Some((number, payload)) = regenerated {
        let header = template.with_part_number(number);
        match regenerate(layout.inputs_dir, &header, &payload) {
            Ok(path) => {
                info!(path = %path.display(), part = number, "Recreated part");
                report.regenerated = Some(path);
            }
            Err(e) => {
                let msg = format!("Unable to recreate part {}: {}", number, e);
                warn!("{}", msg);
                report.warnings.push(msg);
            }
        }
    }

    Ok(report)
}

/// Writes data parts 1..=n in order, optionally folding them into a fresh parity.
fn concatenate(
    layout: &Layout<'_>,
    output: &mut File,
    with_parity: bool,
) -> Result<Option<ParityAccumulator>, JoinError> {
    let mut parity = with_parity.then(|| ParityAccumulator::new(layout.width()));
    let mut writer = BufWriter::new(&mut *output);
    let mut written = 0u64;

    for number in 1..=layout.template.part_count() {
        debug!(part = number, "Writing file segment");
        let payload = layout.read_payload(number)?;
        writer.write_all(&payload)?;
        written += payload.len() as u64;
        if let Some(acc) = parity.as_mut() {
            acc.fold(&payload);
        }
    }
    writer.flush()?;
    drop(writer);

    truncate_to(output, written, layout.template.file_size())?;
    Ok(parity)
}

/// Writes the file with a zeroed placeholder for part `missing`, then fills the
/// placeholder with the XOR of parity and every other part.
/// Returns the recovered payload at its true on-disk length.
fn recover(layout: &Layout<'_>, output: &mut File, missing: u32) -> Result<Vec<u8>, JoinError> {
    let mut recovered = ParityAccumulator::new(layout.width());
    recovered.fold(&layout.read_payload(PARITY_PART_NUMBER)?);

    let mut writer = BufWriter::new(&mut *output);
    let mut written = 0u64;
    let mut placeholder_at = 0u64;

    for number in 1..=layout.template.part_count() {
        if number == missing {
            debug!(part = number, "Writing placeholder segment");
            placeholder_at = written;
            writer.write_all(&vec![0u8; layout.width()])?;
            written += layout.part_length;
        } else {
            debug!(part = number, "Writing file segment");
            let payload = layout.read_payload(number)?;
            writer.write_all(&payload)?;
            written += payload.len() as u64;
            recovered.fold(&payload);
        }
    }

    debug!(part = missing, offset = placeholder_at, "Writing recovered segment");
    writer.seek(SeekFrom::Start(placeholder_at))?;
    writer.write_all(recovered.as_bytes())?;
    writer.flush()?;
    drop(writer);

    // A recovered last part is a full part length wide; trim the padding.
    truncate_to(output, written, layout.template.file_size())?;

    let mut payload = recovered.into_bytes();
    payload.truncate(layout.template.with_part_number(missing).payload_len() as usize);
    Ok(payload)
}

fn truncate_to(output: &mut File, written: u64, file_size: u64) -> io::Result<()> {
    if written > file_size {
        output.set_len(file_size)?;
    }
    output.seek(SeekFrom::Start(file_size.min(written)))?;
    Ok(())
}

/// A temporary file next to the destination.
/// On unix it gets the mode `File::create` would give (0666 minus umask);
/// `persist` keeps it.
fn destination_tempfile(dir: &Path) -> io::Result<NamedTempFile> {
    let mut builder = Builder::new();
    builder.prefix(".paritysplit");
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(fs::Permissions::from_mode(0o666));
    }
    builder.tempfile_in(dir)
}

/// Reads the payload of one collected part, checking the header is unchanged
/// and the payload is exactly as long as the splitter wrote it.
fn read_payload(path: &Path, expected: &Header, part_length: u64) -> Result<Vec<u8>, JoinError> {
    let mut reader = BufReader::new(File::open(path)?);
    let header = match Header::read_from(&mut reader) {
        Ok(h) => h,
        Err(HeaderError::Io(e)) => return Err(JoinError::Io(e)),
        Err(_) => return Err(JoinError::PartChanged(path.to_path_buf())),
    };
    if header != *expected {
        return Err(JoinError::PartChanged(path.to_path_buf()));
    }

    let mut payload = Vec::with_capacity(part_length as usize);
    reader.take(part_length + 1).read_to_end(&mut payload)?;
    let actual = payload.len() as u64;
    if actual > part_length {
        return Err(JoinError::PayloadTooLong {
            path: path.to_path_buf(),
            expected: part_length,
        });
    }
    if actual != expected.payload_len() {
        return Err(JoinError::PayloadLengthMismatch {
            path: path.to_path_buf(),
            expected: expected.payload_len(),
            actual,
        });
    }
    Ok(payload)
}

/// Creates the file for `header` inside `dir` without replacing anything.
fn regenerate(dir: &Path, header: &Header, payload: &[u8]) -> Result<PathBuf, JoinError> {
    let name = bare_file_name(header.file_name()).ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{:?} is not a plain file name", header.file_name()),
        )
    })?;
    let path = part_path(dir, name, header.part_number());

    let file = match OpenOptions::new().write(true).create_new(true).open(&path) {
        Ok(f) => f,
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("{} already exists", path.display()),
            )
            .into());
        }
        Err(e) => return Err(e.into()),
    };

    let written = write_new_part(file, header, payload);
    if written.is_err() {
        // only ever removes the file created just above
        let _ = fs::remove_file(&path);
    }
    written.map(|_| path)
}

fn write_new_part(file: File, header: &Header, payload: &[u8]) -> Result<(), JoinError> {
    let mut writer = BufWriter::new(file);
    header.write_to(&mut writer)?;
    writer.write_all(payload)?;
    writer.flush()?;
    Ok(())
}
