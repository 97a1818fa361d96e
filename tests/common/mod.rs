#![allow(dead_code)]

use laridx::LaravelIndex;
use laridx::config::IndexOptions;
use std::path::Path;
use tempfile::TempDir;

/// A throw-away Laravel project on disk.
pub struct Project {
    pub dir: TempDir,
}

impl Project {
    pub fn new() -> Self {
        let project = Self {
            dir: TempDir::new().unwrap(),
        };
        project.write("artisan", "#!/usr/bin/env php\n");
        project.write(
            "composer.json",
            r#"{"require": {"php": "^8.2", "laravel/framework": "^11.0"}}"#,
        );
        project
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn write(&self, rel: &str, content: &str) -> &Self {
        let path = self.dir.path().join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, content).unwrap();
        self
    }

    pub fn remove(&self, rel: &str) {
        std::fs::remove_file(self.dir.path().join(rel)).unwrap();
    }

    pub fn index(&self) -> LaravelIndex {
        self.index_with(IndexOptions::default())
    }

    pub fn index_with(&self, options: IndexOptions) -> LaravelIndex {
        let index = LaravelIndex::open(self.root(), options).unwrap();
        index.refresh().unwrap();
        index
    }
}

/// Byte offset just inside the first occurrence of `needle` in `content`.
pub fn offset_in(content: &str, needle: &str) -> usize {
    content
        .find(needle)
        .unwrap_or_else(|| panic!("{needle:?} not found"))
        + 1
}
