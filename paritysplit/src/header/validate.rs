use std::collections::HashSet;
use super::Header;
use crate::common::id::PartSetId;

/// The first reason a collected set of headers does not form one coherent split.
//
// // 一组头部无法构成同一次拆分的第一个原因。
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HeaderSetViolation {
    #[error("the header set is empty")]
    Empty,
    #[error("encrypted part sets are not supported")]
    Encrypted,
    #[error("file size {0} is not positive")]
    InvalidFileSize(u64),
    #[error("part count {0} is too small")]
    InvalidPartCount(u32),
    #[error("part set id is all zero bytes")]
    NilId,
    #[error("headers belong to different part sets ({0} and {1})")]
    MixedIds(PartSetId, PartSetId),
    #[error("headers disagree on the {0}")]
    Mismatch(&'static str),
    #[error("part {0} appears more than once")]
    DuplicatePart(u32),
    #[error("part {0} is outside of 0..={1}")]
    PartOutOfRange(u32, u32),
}

/// Checks that `headers` are mutually consistent, returning the first violation found.
///
/// The first header is the representative every other header is compared against.
pub fn check_headers<'a, I>(headers: I) -> Result<(), HeaderSetViolation>
where
    I: IntoIterator<Item = &'a Header>,
{
    let mut iter = headers.into_iter();
    let first = iter.next().ok_or(HeaderSetViolation::Empty)?;

    if first.encrypted() {
        return Err(HeaderSetViolation::Encrypted);
    }
    if first.file_size() == 0 {
        return Err(HeaderSetViolation::InvalidFileSize(first.file_size()));
    }
    if first.part_count() <= 1 {
        return Err(HeaderSetViolation::InvalidPartCount(first.part_count()));
    }
    if first.id().is_nil() {
        return Err(HeaderSetViolation::NilId);
    }

    let mut seen = HashSet::new();
    for header in std::iter::once(first).chain(iter) {
        if header.id() != first.id() {
            return Err(HeaderSetViolation::MixedIds(first.id(), header.id()));
        }
        if header.file_name() != first.file_name() {
            return Err(HeaderSetViolation::Mismatch("file name"));
        }
        if header.file_size() != first.file_size() {
            return Err(HeaderSetViolation::Mismatch("file size"));
        }
        if header.part_count() != first.part_count() {
            return Err(HeaderSetViolation::Mismatch("part count"));
        }
        if header.encrypted() != first.encrypted() {
            return Err(HeaderSetViolation::Mismatch("encryption flag"));
        }
        if header.part_number() > header.part_count() {
            return Err(HeaderSetViolation::PartOutOfRange(
                header.part_number(),
                header.part_count(),
            ));
        }
        if !seen.insert(header.part_number()) {
            return Err(HeaderSetViolation::DuplicatePart(header.part_number()));
        }
    }
    Ok(())
}

/// Returns `true` if `headers` describe one coherent split.
///
/// This is the gate in front of every join: a set that fails it must not be
/// concatenated or used for recovery.
pub fn validate_headers<'a, I>(headers: I) -> bool
where
    I: IntoIterator<Item = &'a Header>,
{
    check_headers(headers).is_ok()
}
