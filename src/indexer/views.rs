use crate::indexer::ScanCounts;
use crate::model::{SiteHandle, ViewInfo};
use crate::normalize::{self, BLADE_SUFFIX};
use crate::source::SourceTree;
use crate::util::extension;
use arc_swap::ArcSwap;
use std::collections::HashMap;
use std::sync::Arc;

/// A directory holding templates and the key prefix its views get.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewRoot {
    pub dir: String,
    pub prefix: String,
}

pub fn view_roots(tree: &dyn SourceTree) -> Vec<ViewRoot> {
    let mut roots: Vec<ViewRoot> = [
        ("resources/views", ""),
        ("app/views", ""),
        ("vendor/views", "vendor"),
    ]
    .iter()
    .filter(|(dir, _)| tree.is_dir(dir))
    .map(|(dir, prefix)| ViewRoot {
        dir: dir.to_string(),
        prefix: prefix.to_string(),
    })
    .collect();
    for module in tree.child_dirs("Modules") {
        let dir = format!("{}/Resources/views", module.path);
        if tree.is_dir(&dir) {
            roots.push(ViewRoot {
                dir,
                prefix: format!("modules.{}", module.name),
            });
        }
    }
    roots
}

/// One generation of the view cache. Every file is reachable under its dot
/// name, its slash name and its dot name with the extension appended.
#[derive(Debug, Default)]
pub struct ViewTable {
    by_key: HashMap<String, Arc<ViewInfo>>,
    views: Vec<Arc<ViewInfo>>,
}

impl ViewTable {
    fn insert(&mut self, info: ViewInfo) {
        let info = Arc::new(info);
        let name = info.canonical_name.clone();
        let slash = name.replace('.', "/");
        let with_ext = format!("{name}.{}", info.extension);
        self.by_key.insert(name, Arc::clone(&info));
        self.by_key.insert(slash, Arc::clone(&info));
        self.by_key.insert(with_ext, Arc::clone(&info));
        self.views.push(info);
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }

    pub fn len(&self) -> usize {
        self.views.len()
    }

    pub fn get(&self, key: &str) -> Option<&Arc<ViewInfo>> {
        self.by_key.get(key)
    }

    /// Canonical names only; aliases are the same logical view.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.views.iter().map(|v| v.canonical_name.clone()).collect();
        keys.sort();
        keys.dedup();
        keys
    }

    /// First cache hit across the name variants.
    pub fn resolve(&self, text: &str) -> Option<Arc<ViewInfo>> {
        normalize::view_name_variants(text)
            .iter()
            .find_map(|variant| self.by_key.get(variant))
            .cloned()
    }

    /// Every distinct view any variant of `text` resolves to.
    pub fn resolve_all(&self, text: &str) -> Vec<Arc<ViewInfo>> {
        let mut out: Vec<Arc<ViewInfo>> = Vec::new();
        for variant in normalize::view_name_variants(text) {
            if let Some(info) = self.by_key.get(&variant) {
                if !out.iter().any(|seen| seen.file == info.file) {
                    out.push(Arc::clone(info));
                }
            }
        }
        out
    }
}

pub struct ViewIndexer {
    table: ArcSwap<ViewTable>,
}

impl Default for ViewIndexer {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewIndexer {
    pub fn new() -> Self {
        Self {
            table: ArcSwap::from_pointee(ViewTable::default()),
        }
    }

    pub fn snapshot(&self) -> Arc<ViewTable> {
        self.table.load_full()
    }

    pub fn scan(&self, tree: &dyn SourceTree) -> ScanCounts {
        let mut counts = ScanCounts::default();
        let mut table = ViewTable::default();
        for root in view_roots(tree) {
            let base = format!("{}/", root.dir);
            for file in tree.walk_files(&root.dir) {
                if extension(&file).as_deref() != Some("php") {
                    continue;
                }
                counts.files += 1;
                let relative = file.strip_prefix(&base).unwrap_or(&file).to_string();
                let local = normalize::view_name_from_relative(&relative);
                let canonical_name = if root.prefix.is_empty() {
                    local
                } else {
                    format!("{}.{local}", root.prefix)
                };
                let ext = if relative.ends_with(BLADE_SUFFIX) {
                    "blade.php"
                } else {
                    "php"
                };
                table.insert(ViewInfo {
                    canonical_name,
                    relative_path: relative,
                    extension: ext.to_string(),
                    file,
                });
            }
        }
        self.table.store(Arc::new(table));
        counts
    }

    /// Cache hits for every name variant, then direct file probes under each root.
    pub fn find_declarations(&self, tree: &dyn SourceTree, name: &str) -> Vec<SiteHandle> {
        let hits = self.snapshot().resolve_all(name);
        if !hits.is_empty() {
            return hits.iter().map(|info| SiteHandle::file(&info.file)).collect();
        }
        let mut found: Vec<SiteHandle> = Vec::new();
        for root in view_roots(tree) {
            for variant in normalize::view_name_variants(name) {
                let slashed = variant.replace('.', "/");
                let candidates = [
                    format!("{slashed}{BLADE_SUFFIX}"),
                    format!("{slashed}.php"),
                    format!("{variant}{BLADE_SUFFIX}"),
                    format!("{variant}.php"),
                ];
                for candidate in candidates {
                    let rel = format!("{}/{candidate}", root.dir);
                    if tree.is_file(&rel) && !found.iter().any(|s| s.file == rel) {
                        found.push(SiteHandle::file(&rel));
                    }
                }
            }
        }
        found
    }
}
