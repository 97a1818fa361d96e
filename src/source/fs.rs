use crate::config::IndexOptions;
use crate::source::{DirEntry, SourceError, SourceTree};
use crate::util;
use ignore::WalkBuilder;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Project on local disk.
#[derive(Debug, Clone)]
pub struct FsSourceTree {
    root: PathBuf,
    options: IndexOptions,
}

impl FsSourceTree {
    pub fn new(root: impl Into<PathBuf>, options: IndexOptions) -> Self {
        Self {
            root: root.into(),
            options,
        }
    }

    pub fn options(&self) -> &IndexOptions {
        &self.options
    }

    fn abs(&self, rel: &str) -> PathBuf {
        let rel = rel.trim_start_matches('/');
        if rel.is_empty() || rel == "." {
            self.root.clone()
        } else {
            self.root.join(rel)
        }
    }

    fn is_excluded_name(&self, name: &str) -> bool {
        self.options.exclude_dirs.iter().any(|dir| dir == name)
    }

    fn walk(&self, start: &Path, honour_ignore: bool) -> Vec<String> {
        let mut files = Vec::new();
        if !start.is_dir() {
            return files;
        }
        let mut builder = WalkBuilder::new(start);
        if honour_ignore {
            builder
                .ignore(true)
                .git_ignore(true)
                .git_global(true)
                .git_exclude(true)
                .parents(true)
                .require_git(false);
        } else {
            builder
                .ignore(false)
                .git_ignore(false)
                .git_global(false)
                .git_exclude(false)
                .parents(false);
        }
        let excluded: Vec<String> = if honour_ignore {
            self.options.exclude_dirs.clone()
        } else {
            vec![".git".to_string()]
        };
        let walker = builder
            .hidden(false)
            .filter_entry(move |entry| {
                let is_dir = entry.file_type().map(|ft| ft.is_dir()).unwrap_or(false);
                !(is_dir
                    && entry.depth() > 0
                    && excluded
                        .iter()
                        .any(|name| entry.file_name().to_str() == Some(name.as_str())))
            })
            .build();

        for entry in walker {
            let entry = match entry {
                Ok(value) => value,
                Err(err) => {
                    tracing::warn!("walk error: {err}");
                    continue;
                }
            };
            if !entry.file_type().map(|ft| ft.is_file()).unwrap_or(false) {
                continue;
            }
            match util::normalize_rel_path(&self.root, entry.path()) {
                Ok(rel) => files.push(rel),
                Err(err) => tracing::debug!("skip {}: {err}", entry.path().display()),
            }
        }
        files.sort();
        files
    }
}

impl SourceTree for FsSourceTree {
    fn root(&self) -> &Path {
        &self.root
    }

    fn read(&self, rel: &str) -> Result<String, SourceError> {
        let path = self.abs(rel);
        let metadata = fs::metadata(&path).map_err(|err| match err.kind() {
            ErrorKind::NotFound => SourceError::NotFound(rel.to_string()),
            _ => SourceError::Read {
                path: rel.to_string(),
                source: err,
            },
        })?;
        if !metadata.is_file() {
            return Err(SourceError::NotFound(rel.to_string()));
        }
        if metadata.len() > self.options.max_file_bytes {
            return Err(SourceError::TooLarge {
                path: rel.to_string(),
                size: metadata.len(),
                limit: self.options.max_file_bytes,
            });
        }
        let bytes = fs::read(&path).map_err(|err| SourceError::Read {
            path: rel.to_string(),
            source: err,
        })?;
        String::from_utf8(bytes).map_err(|_| SourceError::NotUtf8(rel.to_string()))
    }

    fn is_file(&self, rel: &str) -> bool {
        self.abs(rel).is_file()
    }

    fn is_dir(&self, rel: &str) -> bool {
        self.abs(rel).is_dir()
    }

    fn children(&self, rel_dir: &str) -> Vec<DirEntry> {
        let Ok(read_dir) = fs::read_dir(self.abs(rel_dir)) else {
            return Vec::new();
        };
        let mut out: Vec<DirEntry> = read_dir
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| {
                let name = entry.file_name().to_str()?.to_string();
                let is_dir = entry.file_type().ok()?.is_dir();
                Some(DirEntry {
                    path: util::join_rel(rel_dir, &name),
                    name,
                    is_dir,
                })
            })
            .collect();
        out.sort_by(|a, b| a.name.cmp(&b.name));
        out
    }

    fn walk_files(&self, rel_dir: &str) -> Vec<String> {
        self.walk(&self.abs(rel_dir), false)
    }

    fn project_files(&self) -> Vec<String> {
        let honour_ignore = !self.options.no_ignore;
        let mut files = self.walk(&self.root, honour_ignore);
        if !honour_ignore {
            files.retain(|rel| {
                !rel.split('/')
                    .rev()
                    .skip(1)
                    .any(|segment| self.is_excluded_name(segment))
            });
        }
        files
    }
}
