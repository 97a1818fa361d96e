//! Boundary to the project being indexed: file enumeration, content reads and
//! the parse helpers built on top of them.

pub mod fs;
pub mod lines;
pub mod memory;
pub mod php;
pub mod template;

use std::path::Path;
use thiserror::Error;

pub use fs::FsSourceTree;
pub use lines::LineIndex;
pub use memory::MemorySourceTree;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("{0}: no such file")]
    NotFound(String),
    #[error("{path}: read failed: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{path}: {size} bytes exceeds limit of {limit}")]
    TooLarge { path: String, size: u64, limit: u64 },
    #[error("{0}: not valid UTF-8")]
    NotUtf8(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub name: String,
    /// Project-relative path.
    pub path: String,
    pub is_dir: bool,
}

/// Read-only view of a project. Paths are project-relative with `/` separators.
pub trait SourceTree: Send + Sync {
    fn root(&self) -> &Path;

    fn read(&self, rel: &str) -> Result<String, SourceError>;

    fn is_file(&self, rel: &str) -> bool;

    fn is_dir(&self, rel: &str) -> bool;

    /// Direct children sorted by name; empty when `rel_dir` is missing.
    fn children(&self, rel_dir: &str) -> Vec<DirEntry>;

    /// Every file below `rel_dir`, sorted, ignore rules not applied.
    fn walk_files(&self, rel_dir: &str) -> Vec<String>;

    /// Every file of the project, honouring ignore files and excluded directories.
    fn project_files(&self) -> Vec<String>;

    fn child_dirs(&self, rel_dir: &str) -> Vec<DirEntry> {
        self.children(rel_dir)
            .into_iter()
            .filter(|entry| entry.is_dir)
            .collect()
    }

    fn child_files(&self, rel_dir: &str) -> Vec<DirEntry> {
        self.children(rel_dir)
            .into_iter()
            .filter(|entry| !entry.is_dir)
            .collect()
    }
}

/// How a file takes part in the usage scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileCategory {
    Php,
    Blade,
    Script,
}

const SCRIPT_EXTENSIONS: &[&str] = &["js", "jsx", "ts", "tsx", "mjs", "vue"];

impl FileCategory {
    pub fn of(rel: &str) -> Option<Self> {
        let name = crate::util::file_name(rel);
        if name.ends_with(".blade.php") {
            return Some(FileCategory::Blade);
        }
        let ext = crate::util::extension(rel)?;
        if ext == "php" {
            return Some(FileCategory::Php);
        }
        if SCRIPT_EXTENSIONS.contains(&ext.as_str()) {
            return Some(FileCategory::Script);
        }
        None
    }
}
