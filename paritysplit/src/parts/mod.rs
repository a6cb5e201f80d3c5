use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use crate::common::id::PartSetId;
use crate::header::{Header, HeaderSetViolation, check_headers};

mod join;
mod scan;
mod split;

pub use join::{JoinError, JoinReport, join};
pub use scan::{
    CollectError, ScanOutcome, collect_from_candidates, collect_parts, probe_file, probe_reader,
};
pub use split::{SplitError, SplitReport, split};

/// Part files discovered on disk, keyed by their path.
///
/// A `PartSet` is only a collection; whether its headers form one coherent
/// split is decided by [`PartSet::validate`].
//
// // 在磁盘上发现的分片文件，以路径为键。
// // `PartSet` 只是一个集合；其头部是否构成同一次拆分由 `validate` 决定。
#[derive(Debug, Clone, Default)]
pub struct PartSet {
    entries: BTreeMap<PathBuf, Header>,
}

impl PartSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a part, returning the header previously recorded for `path`, if any.
    pub fn insert(&mut self, path: impl Into<PathBuf>, header: Header) -> Option<Header> {
        self.entries.insert(path.into(), header)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, path: &Path) -> Option<&Header> {
        self.entries.get(path)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Path, &Header)> {
        self.entries.iter().map(|(p, h)| (p.as_path(), h))
    }

    pub fn headers(&self) -> impl Iterator<Item = &Header> {
        self.entries.values()
    }

    /// Every distinct part set id present.
    pub fn ids(&self) -> BTreeSet<PartSetId> {
        self.entries.values().map(Header::id).collect()
    }

    /// Keeps only the parts belonging to `id`.
    pub fn retain_id(&mut self, id: PartSetId) {
        self.entries.retain(|_, h| h.id() == id);
    }

    pub fn validate(&self) -> Result<(), HeaderSetViolation> {
        check_headers(self.entries.values())
    }

    /// Parts ordered by ascending part number.
    /// Only meaningful on a validated set, where part numbers are unique.
    pub(crate) fn by_part_number(&self) -> BTreeMap<u32, (&Path, &Header)> {
        self.entries
            .iter()
            .map(|(p, h)| (h.part_number(), (p.as_path(), h)))
            .collect()
    }
}

impl FromIterator<(PathBuf, Header)> for PartSet {
    fn from_iter<T: IntoIterator<Item = (PathBuf, Header)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
