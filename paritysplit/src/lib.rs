//! Split a file into equally sized parts plus one XOR parity part, and join
//! them back, recovering any single missing part.

pub mod common;
pub mod header;
pub mod parts;
pub mod utils;

pub use common::id::PartSetId;
pub use header::{Header, HeaderError, PartCount};
pub use parts::{
    CollectError, JoinError, JoinReport, PartSet, ScanOutcome, SplitError, SplitReport,
    collect_from_candidates, collect_parts, join, probe_file, split,
};
