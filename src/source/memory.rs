use crate::source::{DirEntry, SourceError, SourceTree};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

/// In-memory project, used by unit tests and benchmarks.
#[derive(Debug, Clone, Default)]
pub struct MemorySourceTree {
    root: PathBuf,
    files: BTreeMap<String, String>,
    exclude_dirs: Vec<String>,
}

impl MemorySourceTree {
    pub fn new() -> Self {
        Self {
            root: PathBuf::from("/memory"),
            files: BTreeMap::new(),
            exclude_dirs: crate::config::DEFAULT_EXCLUDE_DIRS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }

    pub fn with_file(mut self, rel: &str, content: &str) -> Self {
        self.insert(rel, content);
        self
    }

    pub fn insert(&mut self, rel: &str, content: &str) {
        self.files
            .insert(rel.trim_start_matches('/').to_string(), content.to_string());
    }

    pub fn remove(&mut self, rel: &str) {
        self.files.remove(rel.trim_start_matches('/'));
    }

    fn dir_prefix(rel_dir: &str) -> String {
        let trimmed = rel_dir.trim_matches('/');
        if trimmed.is_empty() || trimmed == "." {
            String::new()
        } else {
            format!("{trimmed}/")
        }
    }
}

impl SourceTree for MemorySourceTree {
    fn root(&self) -> &Path {
        &self.root
    }

    fn read(&self, rel: &str) -> Result<String, SourceError> {
        self.files
            .get(rel.trim_start_matches('/'))
            .cloned()
            .ok_or_else(|| SourceError::NotFound(rel.to_string()))
    }

    fn is_file(&self, rel: &str) -> bool {
        self.files.contains_key(rel.trim_start_matches('/'))
    }

    fn is_dir(&self, rel: &str) -> bool {
        let prefix = Self::dir_prefix(rel);
        self.files.keys().any(|path| path.starts_with(&prefix))
    }

    fn children(&self, rel_dir: &str) -> Vec<DirEntry> {
        let prefix = Self::dir_prefix(rel_dir);
        let mut dirs = BTreeSet::new();
        let mut files = BTreeSet::new();
        for path in self.files.keys() {
            let Some(rest) = path.strip_prefix(&prefix) else {
                continue;
            };
            match rest.split_once('/') {
                Some((dir, _)) => {
                    dirs.insert(dir.to_string());
                }
                None => {
                    files.insert(rest.to_string());
                }
            }
        }
        let mut out: Vec<DirEntry> = dirs
            .into_iter()
            .map(|name| DirEntry {
                path: format!("{prefix}{name}"),
                name,
                is_dir: true,
            })
            .chain(files.into_iter().map(|name| DirEntry {
                path: format!("{prefix}{name}"),
                name,
                is_dir: false,
            }))
            .collect();
        out.sort_by(|a, b| a.name.cmp(&b.name));
        out
    }

    fn walk_files(&self, rel_dir: &str) -> Vec<String> {
        let prefix = Self::dir_prefix(rel_dir);
        self.files
            .keys()
            .filter(|path| path.starts_with(&prefix))
            .cloned()
            .collect()
    }

    fn project_files(&self) -> Vec<String> {
        self.files
            .keys()
            .filter(|path| {
                !path
                    .split('/')
                    .rev()
                    .skip(1)
                    .any(|segment| self.exclude_dirs.iter().any(|dir| dir == segment))
            })
            .cloned()
            .collect()
    }
}
