use crate::indexer::ScanCounts;
use crate::model::{AssetInfo, AssetType, SiteHandle};
use crate::normalize;
use crate::source::SourceTree;
use crate::util::extension;
use arc_swap::ArcSwap;
use std::collections::HashMap;
use std::sync::Arc;

/// Front-end packages whose `dist/` folders are indexed.
const DIST_PACKAGES: &[&str] = &[
    "bootstrap",
    "jquery",
    "vue",
    "react",
    "alpinejs",
    "tailwindcss",
    "livewire",
];

const ASSET_EXTENSIONS: &[&str] = &[
    "css", "scss", "sass", "less", "js", "ts", "jsx", "tsx", "jpg", "jpeg", "png", "gif", "svg",
    "webp", "ico", "ttf", "woff", "woff2", "eot", "pdf", "json",
];

pub fn asset_type(ext: &str) -> AssetType {
    match ext.to_ascii_lowercase().as_str() {
        "css" | "scss" | "sass" | "less" => AssetType::Css,
        "js" | "ts" | "jsx" | "tsx" => AssetType::Js,
        "jpg" | "jpeg" | "png" | "gif" | "svg" | "webp" | "ico" => AssetType::Image,
        "ttf" | "woff" | "woff2" | "eot" => AssetType::Font,
        _ => AssetType::Other,
    }
}

/// How keys are derived for files below a root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Naming {
    /// Path relative to `public/`.
    Public,
    /// `js/…`, `css/…`.
    Prefixed,
    /// `assets/…`.
    Resource,
}

struct AssetRoot {
    dir: String,
    prefix: String,
    naming: Naming,
}

fn asset_roots(tree: &dyn SourceTree) -> Vec<AssetRoot> {
    let mut roots = vec![
        AssetRoot { dir: "public".into(), prefix: String::new(), naming: Naming::Public },
        AssetRoot { dir: "resources/assets".into(), prefix: String::new(), naming: Naming::Resource },
        AssetRoot { dir: "resources/js".into(), prefix: "js".into(), naming: Naming::Prefixed },
        AssetRoot { dir: "resources/css".into(), prefix: "css".into(), naming: Naming::Prefixed },
        AssetRoot { dir: "resources/sass".into(), prefix: "sass".into(), naming: Naming::Resource },
        AssetRoot { dir: "resources/scss".into(), prefix: "scss".into(), naming: Naming::Resource },
    ];
    for package in DIST_PACKAGES {
        roots.push(AssetRoot {
            dir: format!("node_modules/{package}/dist"),
            prefix: format!("node_modules/{package}/dist"),
            naming: Naming::Resource,
        });
    }
    roots.retain(|root| tree.is_dir(&root.dir));
    roots
}

#[derive(Debug, Default)]
pub struct AssetTable {
    by_key: HashMap<String, Arc<AssetInfo>>,
}

impl AssetTable {
    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }

    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    pub fn get(&self, key: &str) -> Option<&Arc<AssetInfo>> {
        self.by_key.get(key)
    }

    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.by_key.keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Tries the literal, then without a leading slash, `resources/` or `public/`.
    pub fn resolve(&self, text: &str) -> Option<Arc<AssetInfo>> {
        normalize::asset_name_variants(text)
            .iter()
            .find_map(|variant| self.by_key.get(variant))
            .cloned()
    }
}

pub struct AssetIndexer {
    table: ArcSwap<AssetTable>,
}

impl Default for AssetIndexer {
    fn default() -> Self {
        Self::new()
    }
}

impl AssetIndexer {
    pub fn new() -> Self {
        Self {
            table: ArcSwap::from_pointee(AssetTable::default()),
        }
    }

    pub fn snapshot(&self) -> Arc<AssetTable> {
        self.table.load_full()
    }

    pub fn scan(&self, tree: &dyn SourceTree) -> ScanCounts {
        let mut counts = ScanCounts::default();
        let mut table = AssetTable::default();
        for root in asset_roots(tree) {
            let base = format!("{}/", root.dir);
            for file in tree.walk_files(&root.dir) {
                let Some(ext) = extension(&file) else {
                    continue;
                };
                if !ASSET_EXTENSIONS.contains(&ext.as_str()) {
                    continue;
                }
                counts.files += 1;
                let inner = file.strip_prefix(&base).unwrap_or(&file);
                let relative = if root.prefix.is_empty() {
                    inner.to_string()
                } else {
                    format!("{}/{inner}", root.prefix)
                };
                let canonical_name = match root.naming {
                    Naming::Public | Naming::Prefixed => relative.clone(),
                    Naming::Resource => format!("assets/{relative}"),
                };
                table.by_key.insert(
                    canonical_name.clone(),
                    Arc::new(AssetInfo {
                        canonical_name,
                        relative_path: relative,
                        asset_type: asset_type(&ext),
                        extension: ext,
                        file,
                    }),
                );
            }
        }
        self.table.store(Arc::new(table));
        counts
    }

    pub fn declarations(&self, key: &str) -> Vec<SiteHandle> {
        self.snapshot()
            .resolve(key)
            .map(|info| vec![SiteHandle::file(&info.file)])
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MemorySourceTree;

    fn scanned() -> AssetIndexer {
        let tree = MemorySourceTree::new()
            .with_file("public/css/app.css", "")
            .with_file("public/favicon.ico", "")
            .with_file("public/index.php", "<?php")
            .with_file("resources/js/app.js", "")
            .with_file("resources/sass/app.scss", "")
            .with_file("resources/assets/fonts/a.woff2", "")
            .with_file("node_modules/jquery/dist/jquery.min.js", "");
        let indexer = AssetIndexer::new();
        indexer.scan(&tree);
        indexer
    }

    #[test]
    fn keys_follow_root_conventions() {
        let table = scanned().snapshot();
        assert_eq!(
            table.keys(),
            vec![
                "assets/fonts/a.woff2",
                "assets/node_modules/jquery/dist/jquery.min.js",
                "assets/sass/app.scss",
                "css/app.css",
                "favicon.ico",
                "js/app.js",
            ]
        );
        assert_eq!(table.get("favicon.ico").unwrap().asset_type, AssetType::Image);
        assert_eq!(table.get("assets/fonts/a.woff2").unwrap().asset_type, AssetType::Font);
        assert_eq!(table.get("js/app.js").unwrap().file, "resources/js/app.js");
    }

    #[test]
    fn references_resolve_through_variants() {
        let table = scanned().snapshot();
        assert!(table.resolve("/css/app.css?v=3").is_some());
        assert!(table.resolve("public/css/app.css").is_some());
        assert_eq!(table.resolve("resources/js/app.js").unwrap().canonical_name, "js/app.js");
        assert!(table.resolve("img/none.png").is_none());
    }
}
