use crate::source::{SourceError, SourceTree};
use tracing::{debug, warn};

pub mod assets;
pub mod params;
pub mod patterns;
pub mod routes;
pub mod scope;
pub mod translations;
pub mod usage;
pub mod views;

/// Counters shared by every pass of one refresh.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ScanCounts {
    pub files: usize,
    pub errors: usize,
    /// Files whose previous results were kept because their content is unchanged.
    pub reused: usize,
}

impl ScanCounts {
    pub fn merge(&mut self, other: ScanCounts) {
        self.files += other.files;
        self.errors += other.errors;
        self.reused += other.reused;
    }
}

/// Reads one file for a scan pass. Failures are logged, counted and skipped.
pub(crate) fn read_or_skip(
    tree: &dyn SourceTree,
    rel: &str,
    counts: &mut ScanCounts,
) -> Option<String> {
    counts.files += 1;
    match tree.read(rel) {
        Ok(content) => Some(content),
        Err(err @ SourceError::TooLarge { .. }) => {
            debug!("skip {rel}: {err}");
            None
        }
        Err(err) => {
            warn!("read error {rel}: {err}");
            counts.errors += 1;
            None
        }
    }
}
