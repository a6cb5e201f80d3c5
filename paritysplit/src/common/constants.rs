/// Literal written at the start of every part file.
pub const MAGIC: &str = "R5FILE";

/// Header format version written by this crate.
pub const CURRENT_HEADER_VERSION: i32 = 1;

/// Number of raw bytes in a part set identifier.
pub const ID_LEN: usize = 16;

/// Smallest number of data parts a file can be split into.
pub const MIN_PART_COUNT: u32 = 2;

/// Largest number of data parts a file can be split into.
/// Part file extensions are three digits wide, so this is also the naming limit.
pub const MAX_PART_COUNT: u32 = 999;

/// The part number reserved for the parity part.
pub const PARITY_PART_NUMBER: u32 = 0;

/// Extension of the parity part file (`<name>.crc`).
pub const PARITY_EXTENSION: &str = "crc";

// --- I/O ---
/// Largest payload a single part may carry, since each part is held in memory.
pub const MAX_PART_LENGTH: u64 = i32::MAX as u64;
