use std::fmt;
use serde::Serialize;
use crate::common::constants::{
    CURRENT_HEADER_VERSION, MAX_PART_COUNT, MIN_PART_COUNT, PARITY_PART_NUMBER,
};
use crate::common::id::PartSetId;

mod codec;
mod validate;

pub use validate::{HeaderSetViolation, check_headers, validate_headers};

/// Errors raised while encoding or decoding a part header.
//
// // 编码或解码分片头部时产生的错误。
#[derive(Debug, thiserror::Error)]
pub enum HeaderError {
    /// The header fields cannot be written (missing name, out of range numbers, nil id).
    //
    // // 头部字段无法被序列化 (缺少文件名、数值越界、空 id)。
    #[error("Invalid header configuration: {0}")]
    InvalidConfiguration(String),

    /// The bytes do not form a valid header (wrong magic, unsupported version, range checks).
    //
    // // 字节内容不是合法的头部 (魔数错误、版本不支持、范围检查失败)。
    #[error("Invalid header format: {0}")]
    InvalidFormat(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A validated number of data parts, always within `2..=999`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(into = "u32")]
pub struct PartCount(u32);

#[derive(Debug, thiserror::Error)]
#[error("Invalid number of parts, expecting 2-999 but got {0}")]
pub struct PartCountError(pub u32);

impl PartCount {
    pub fn new(count: u32) -> Result<Self, PartCountError> {
        if (MIN_PART_COUNT..=MAX_PART_COUNT).contains(&count) {
            Ok(Self(count))
        } else {
            Err(PartCountError(count))
        }
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl TryFrom<u32> for PartCount {
    type Error = PartCountError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PartCount> for u32 {
    fn from(value: PartCount) -> Self {
        value.0
    }
}

impl fmt::Display for PartCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Metadata stored at the start of every part file.
///
/// A header is an immutable value: deriving the header of a sibling part is
/// done with [`Header::with_part_number`], which returns a new value.
//
// // 存储在每个分片文件开头的元数据。
// // 头部是不可变的值类型；派生同组其他分片的头部使用 `with_part_number`，它返回一个新值。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Header {
    version: i32,
    id: PartSetId,
    file_name: String,
    file_size: u64,
    part_number: u32,
    part_count: u32,
    encrypted: bool,
}

impl Header {
    /// Creates the header for a fresh split with a new random id.
    /// The returned header describes the parity part; use
    /// [`Header::with_part_number`] for the data parts.
    pub fn new(file_name: impl Into<String>, file_size: u64, part_count: PartCount) -> Self {
        Self {
            version: CURRENT_HEADER_VERSION,
            id: PartSetId::random(),
            file_name: file_name.into(),
            file_size,
            part_number: PARITY_PART_NUMBER,
            part_count: part_count.get(),
            encrypted: false,
        }
    }

    /// Builds a header from raw field values without any checks.
    /// Encoding still rejects values that can't be written.
    pub fn from_raw(
        id: PartSetId,
        file_name: impl Into<String>,
        file_size: u64,
        part_number: u32,
        part_count: u32,
        encrypted: bool,
    ) -> Self {
        Self {
            version: CURRENT_HEADER_VERSION,
            id,
            file_name: file_name.into(),
            file_size,
            part_number,
            part_count,
            encrypted,
        }
    }

    /// Returns a copy of this header describing part `part_number` of the same set.
    pub fn with_part_number(&self, part_number: u32) -> Self {
        Self {
            part_number,
            ..self.clone()
        }
    }

    pub fn version(&self) -> i32 {
        self.version
    }

    pub fn id(&self) -> PartSetId {
        self.id
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn file_size(&self) -> u64 {
        self.file_size
    }

    pub fn part_number(&self) -> u32 {
        self.part_number
    }

    pub fn part_count(&self) -> u32 {
        self.part_count
    }

    pub fn encrypted(&self) -> bool {
        self.encrypted
    }

    pub fn is_parity(&self) -> bool {
        self.part_number == PARITY_PART_NUMBER
    }

    /// `ceil(file_size / part_count)`: the logical length of every part,
    /// and the exact on-disk length of the parity payload.
    pub fn part_length(&self) -> u64 {
        self.file_size.div_ceil(u64::from(self.part_count.max(1)))
    }

    /// The number of payload bytes the splitter writes for this part.
    /// Only the last data part can be shorter than [`Header::part_length`].
    pub fn payload_len(&self) -> u64 {
        let part_length = self.part_length();
        if self.is_parity() {
            return part_length;
        }
        let start = u64::from(self.part_number - 1) * part_length;
        part_length.min(self.file_size.saturating_sub(start))
    }
}
