use std::io;
use thiserror::Error;
use paritysplit::{CollectError, JoinError, SplitError};

/// Exit code for usage errors and `--help`.
pub const EXIT_USAGE: u8 = 255;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Invalid number of parts, expecting 2-999 but got {0:?}")]
    InvalidPartsArgument(String),

    #[error("Failed to split file: {0}")]
    Split(#[from] SplitError),

    #[error("Failed to find parts: {0}")]
    Collect(#[from] CollectError),

    #[error("Failed to join parts: {0}")]
    Join(#[from] JoinError),

    #[error("Failed to write report: {0}")]
    Report(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl CliError {
    /// Process exit code for this failure.
    //
    // // 该错误对应的进程退出码。
    pub fn exit_code(&self) -> u8 {
        match self {
            CliError::InvalidPartsArgument(_) => 3,
            CliError::Split(e) => match e {
                SplitError::SourceNotFound(_) => 1,
                SplitError::CreateDirectory { .. } => 2,
                SplitError::InvalidPartCount(_) | SplitError::PartTooLarge(_) => 3,
                SplitError::InvalidFileName(_)
                | SplitError::UnexpectedEof(_)
                | SplitError::Header(_)
                | SplitError::Io(_) => 10,
            },
            CliError::Collect(e) => match e {
                CollectError::DirectoryNotFound(_) => 1,
                CollectError::Ambiguous(_) => 5,
                CollectError::NoHeader(_) => 6,
                CollectError::NoPartsFound(_) => 9,
                CollectError::Io(_) => 10,
            },
            CliError::Join(e) => match e {
                JoinError::InvalidHeaderSet(_)
                | JoinError::PayloadTooLong { .. }
                | JoinError::PayloadLengthMismatch { .. }
                | JoinError::PartChanged(_)
                | JoinError::PartTooLarge(_) => 7,
                JoinError::CannotRecover { .. } => 8,
                JoinError::Header(_) | JoinError::Io(_) => 10,
            },
            CliError::Report(_) | CliError::Io(_) => 10,
        }
    }
}
