use crate::indexer::{ScanCounts, read_or_skip};
use crate::model::{SiteHandle, TranslationInfo};
use crate::normalize::split_translation_key;
use crate::source::php::{self, PhpParser};
use crate::source::{LineIndex, SourceTree};
use crate::util::{extension, file_name};
use arc_swap::ArcSwap;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};
use tree_sitter::Node;

pub const DEFAULT_LOCALE: &str = "en";
pub const COMPLEX_VALUE: &str = "[complex value]";

/// One generation of the translation cache.
///
/// `by_key` collapses locales (last write wins); `all` keeps every locale's
/// declaration for reverse lookup.
#[derive(Debug, Default)]
pub struct TranslationTable {
    by_key: HashMap<String, Arc<TranslationInfo>>,
    all: HashMap<String, Vec<Arc<TranslationInfo>>>,
}

impl TranslationTable {
    fn insert(&mut self, info: TranslationInfo) {
        let info = Arc::new(info);
        self.by_key.insert(info.key.clone(), Arc::clone(&info));
        self.all.entry(info.key.clone()).or_default().push(info);
    }

    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }

    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.by_key.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&Arc<TranslationInfo>> {
        self.by_key.get(key)
    }

    pub fn all_locales(&self, key: &str) -> &[Arc<TranslationInfo>] {
        self.all.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.by_key.keys().cloned().collect();
        keys.sort();
        keys
    }
}

/// Existing language roots, in priority order. All of them are scanned.
pub fn language_roots(tree: &dyn SourceTree) -> Vec<String> {
    let mut roots: Vec<String> = ["resources/lang", "lang", "app/lang", "vendor/laravel/lang"]
        .iter()
        .filter(|dir| tree.is_dir(dir))
        .map(|dir| dir.to_string())
        .collect();
    for module in tree.child_dirs("Modules") {
        let dir = format!("{}/Resources/lang", module.path);
        if tree.is_dir(&dir) {
            roots.push(dir);
        }
    }
    for package in tree.child_dirs("lang/vendor") {
        roots.push(package.path);
    }
    roots
}

fn stem(rel: &str) -> &str {
    let name = file_name(rel);
    name.rsplit_once('.').map(|(stem, _)| stem).unwrap_or(name)
}

fn parent_name(rel: &str) -> &str {
    rel.rsplit_once('/')
        .map(|(dir, _)| file_name(dir))
        .unwrap_or("")
}

struct FileScan<'a> {
    rel: &'a str,
    source: &'a str,
    lines: LineIndex,
}

impl FileScan<'_> {
    fn site(&self, node: Node<'_>) -> SiteHandle {
        SiteHandle::new(
            self.rel,
            self.lines.line_of(node.start_byte()),
            node.start_byte(),
            node.end_byte(),
        )
    }

    fn site_at(&self, start: usize, end: usize) -> SiteHandle {
        SiteHandle::new(self.rel, self.lines.line_of(start), start, end)
    }
}

pub struct TranslationIndexer {
    table: ArcSwap<TranslationTable>,
    strict_json: bool,
}

impl TranslationIndexer {
    pub fn new(strict_json: bool) -> Self {
        Self {
            table: ArcSwap::from_pointee(TranslationTable::default()),
            strict_json,
        }
    }

    pub fn snapshot(&self) -> Arc<TranslationTable> {
        self.table.load_full()
    }

    pub fn scan(&self, tree: &dyn SourceTree, parser: &mut PhpParser) -> ScanCounts {
        let mut counts = ScanCounts::default();
        let mut table = TranslationTable::default();
        let roots = language_roots(tree);

        if roots.is_empty() {
            debug!("no language roots, searching project for lang files");
            for rel in tree.project_files() {
                let path = format!("/{rel}");
                match extension(&rel).as_deref() {
                    Some("php") if path.contains("/lang/") => {
                        let locale = parent_name(&rel).to_string();
                        self.scan_php(tree, parser, &rel, &locale, &mut table, &mut counts);
                    }
                    Some("json") if path.contains("/lang/") || path.contains("/translations/") => {
                        self.scan_json(tree, &rel, stem(&rel), &mut table, &mut counts);
                    }
                    _ => {}
                }
            }
        }

        for root in &roots {
            for locale in tree.child_dirs(root) {
                for file in tree.child_files(&locale.path) {
                    if extension(&file.path).as_deref() == Some("php") {
                        self.scan_php(tree, parser, &file.path, &locale.name, &mut table, &mut counts);
                    }
                }
            }
            for file in tree.child_files(root) {
                match extension(&file.path).as_deref() {
                    Some("json") => self.scan_json(tree, &file.path, stem(&file.path), &mut table, &mut counts),
                    Some("php") => {
                        self.scan_php(tree, parser, &file.path, DEFAULT_LOCALE, &mut table, &mut counts)
                    }
                    _ => {}
                }
            }
        }

        self.table.store(Arc::new(table));
        counts
    }

    fn scan_php(
        &self,
        tree: &dyn SourceTree,
        parser: &mut PhpParser,
        rel: &str,
        locale: &str,
        table: &mut TranslationTable,
        counts: &mut ScanCounts,
    ) {
        let Some(source) = read_or_skip(tree, rel, counts) else {
            return;
        };
        let Some(parsed) = parser.parse(&source) else {
            return;
        };
        let Some(array) = php::returned_array(parsed.root_node()) else {
            debug!("{rel}: no returned array");
            return;
        };
        let scan = FileScan {
            rel,
            source: &source,
            lines: LineIndex::new(&source),
        };
        collect_leaves(&scan, array, stem(rel), "", locale, table);
    }

    fn scan_json(
        &self,
        tree: &dyn SourceTree,
        rel: &str,
        locale: &str,
        table: &mut TranslationTable,
        counts: &mut ScanCounts,
    ) {
        let Some(source) = read_or_skip(tree, rel, counts) else {
            return;
        };
        let scan = FileScan {
            rel,
            source: &source,
            lines: LineIndex::new(&source),
        };
        if self.strict_json {
            let value: serde_json::Value = match serde_json::from_str(&source) {
                Ok(value) => value,
                Err(err) => {
                    warn!("invalid JSON in {rel}: {err}");
                    counts.errors += 1;
                    return;
                }
            };
            let Some(object) = value.as_object() else {
                return;
            };
            for (key, value) in object {
                let Some(value) = value.as_str() else {
                    continue;
                };
                let site = json_key_offset(&source, key)
                    .map(|(start, end)| scan.site_at(start, end))
                    .unwrap_or_else(|| SiteHandle::file(rel));
                table.insert(TranslationInfo {
                    key: key.clone(),
                    locale: locale.to_string(),
                    source_file: rel.to_string(),
                    value: value.to_string(),
                    declaration: site,
                });
            }
            return;
        }
        let re = crate::static_regex!(r#""([^"]+)"\s*:\s*"([^"]+)""#);
        for caps in re.captures_iter(scan.source) {
            let (Some(key), Some(value)) = (caps.get(1), caps.get(2)) else {
                continue;
            };
            table.insert(TranslationInfo {
                key: key.as_str().to_string(),
                locale: locale.to_string(),
                source_file: rel.to_string(),
                value: value.as_str().to_string(),
                declaration: scan.site_at(key.start() - 1, key.end() + 1),
            });
        }
    }

    /// Key sites for a dotted key across every language root, with the cached
    /// declarations as fallback.
    pub fn find_declarations(
        &self,
        tree: &dyn SourceTree,
        parser: &mut PhpParser,
        key: &str,
    ) -> Vec<SiteHandle> {
        let mut found = Vec::new();
        let (namespace, rest) = split_translation_key(key).unwrap_or(("", key));
        for root in language_roots(tree) {
            if !namespace.is_empty() {
                for locale in tree.child_dirs(&root) {
                    let rel = format!("{}/{namespace}.php", locale.path);
                    if !tree.is_file(&rel) {
                        continue;
                    }
                    let Ok(source) = tree.read(&rel) else {
                        continue;
                    };
                    let Some(parsed) = parser.parse(&source) else {
                        continue;
                    };
                    let Some(array) = php::returned_array(parsed.root_node()) else {
                        continue;
                    };
                    let scan = FileScan {
                        rel: &rel,
                        source: &source,
                        lines: LineIndex::new(&source),
                    };
                    find_key(&scan, array, rest, &mut found);
                }
            }
            for file in tree.child_files(&root) {
                if extension(&file.path).as_deref() != Some("json") {
                    continue;
                }
                let Ok(source) = tree.read(&file.path) else {
                    continue;
                };
                if let Some((start, end)) = json_key_offset(&source, key) {
                    let lines = LineIndex::new(&source);
                    found.push(SiteHandle::new(&file.path, lines.line_of(start), start, end));
                }
            }
        }
        if found.is_empty() {
            found = self
                .snapshot()
                .all_locales(key)
                .iter()
                .map(|info| info.declaration.clone())
                .collect();
        }
        found
    }

    pub fn value_of(&self, key: &str) -> String {
        self.snapshot()
            .get(key)
            .map(|info| info.value.clone())
            .unwrap_or_else(|| key.to_string())
    }

    pub fn locale_of(&self, key: &str) -> String {
        self.snapshot()
            .get(key)
            .map(|info| info.locale.clone())
            .unwrap_or_else(|| DEFAULT_LOCALE.to_string())
    }
}

fn collect_leaves(
    scan: &FileScan<'_>,
    array: Node<'_>,
    prefix: &str,
    path: &str,
    locale: &str,
    table: &mut TranslationTable,
) {
    for entry in php::array_entries(array) {
        let Some(key_node) = entry.key else {
            continue;
        };
        let Some(key) = php::string_literal(key_node, scan.source) else {
            continue;
        };
        let full_path = if path.is_empty() {
            key
        } else {
            format!("{path}.{key}")
        };
        if php::is_array(entry.value) {
            collect_leaves(scan, entry.value, prefix, &full_path, locale, table);
            continue;
        }
        let value = php::string_literal(entry.value, scan.source).unwrap_or_else(|| {
            let text = php::node_text(entry.value, scan.source).trim();
            if text.is_empty() {
                COMPLEX_VALUE.to_string()
            } else {
                text.to_string()
            }
        });
        let key = if prefix.is_empty() {
            full_path
        } else {
            format!("{prefix}.{full_path}")
        };
        table.insert(TranslationInfo {
            key,
            locale: locale.to_string(),
            source_file: scan.rel.to_string(),
            value,
            declaration: scan.site(key_node),
        });
    }
}

/// Array-key literals matching a dotted path; a key may itself contain dots.
fn find_key(scan: &FileScan<'_>, array: Node<'_>, remaining: &str, found: &mut Vec<SiteHandle>) {
    for entry in php::array_entries(array) {
        let Some(key_node) = entry.key else {
            continue;
        };
        let Some(key) = php::string_literal(key_node, scan.source) else {
            continue;
        };
        if key == remaining {
            found.push(scan.site(key_node));
        } else if let Some(rest) = remaining.strip_prefix(&format!("{key}.")) {
            if php::is_array(entry.value) {
                find_key(scan, entry.value, rest, found);
            }
        }
    }
}

/// Byte range of `"key"` followed by a colon in a JSON document.
fn json_key_offset(source: &str, key: &str) -> Option<(usize, usize)> {
    let pattern = format!(r#""{}"\s*:"#, regex::escape(key));
    let re = regex::Regex::new(&pattern).ok()?;
    let hit = re.find(source)?;
    Some((hit.start(), hit.start() + key.len() + 2))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MemorySourceTree;

    fn project() -> MemorySourceTree {
        MemorySourceTree::new()
            .with_file(
                "resources/lang/en/msgs.php",
                "<?php\nreturn [\n    'a' => ['b' => 'v'],\n    'count' => 3,\n    'welcome' => 'Hello',\n];\n",
            )
            .with_file("resources/lang/fr/msgs.php", "<?php return ['welcome' => 'Bonjour'];")
            .with_file("resources/lang/es.json", "{\n  \"Log in\": \"Entrar\",\n  \"nested\": {\"x\": \"y\"}\n}")
            .with_file("lang/vendor/courier/en/mail.php", "<?php return ['sent' => 'Sent'];")
    }

    fn scanned(strict: bool) -> (TranslationIndexer, MemorySourceTree) {
        let tree = project();
        let indexer = TranslationIndexer::new(strict);
        let mut parser = PhpParser::new().unwrap();
        indexer.scan(&tree, &mut parser);
        (indexer, tree)
    }

    #[test]
    fn nested_leaves_and_placeholders() {
        let (indexer, _) = scanned(false);
        let table = indexer.snapshot();
        let leaf = table.get("msgs.a.b").unwrap();
        assert_eq!(leaf.value, "v");
        assert_eq!(leaf.locale, "en");
        assert_eq!(leaf.declaration.line, 2);
        assert_eq!(table.get("msgs.count").unwrap().value, "3");
        assert!(table.contains("mail.sent"));
    }

    #[test]
    fn last_locale_wins_but_all_are_kept() {
        let (indexer, _) = scanned(false);
        assert_eq!(indexer.value_of("msgs.welcome"), "Bonjour");
        assert_eq!(indexer.locale_of("msgs.welcome"), "fr");
        assert_eq!(indexer.snapshot().all_locales("msgs.welcome").len(), 2);
        assert_eq!(indexer.value_of("missing.key"), "missing.key");
        assert_eq!(indexer.locale_of("missing.key"), DEFAULT_LOCALE);
    }

    #[test]
    fn lenient_and_strict_json() {
        let (lenient, _) = scanned(false);
        let table = lenient.snapshot();
        assert_eq!(table.get("Log in").unwrap().locale, "es");
        // the lenient scan also picks up nested pairs
        assert!(table.contains("x"));

        let (strict, _) = scanned(true);
        let table = strict.snapshot();
        assert_eq!(table.get("Log in").unwrap().value, "Entrar");
        assert_eq!(table.get("Log in").unwrap().declaration.line, 1);
        assert!(!table.contains("x"));
    }

    #[test]
    fn declarations_match_key_positions_only() {
        let (indexer, tree) = scanned(false);
        let mut parser = PhpParser::new().unwrap();
        let sites = indexer.find_declarations(&tree, &mut parser, "msgs.welcome");
        assert_eq!(sites.len(), 2);
        assert!(sites.iter().all(|s| s.file.ends_with("msgs.php")));

        let nested = indexer.find_declarations(&tree, &mut parser, "msgs.a.b");
        assert_eq!(nested.len(), 1);
        assert_eq!(nested[0].line, 2);

        // "Hello" is a value, never a key
        assert!(indexer.find_declarations(&tree, &mut parser, "msgs.Hello").is_empty());

        let json = indexer.find_declarations(&tree, &mut parser, "Log in");
        assert_eq!(json[0].file, "resources/lang/es.json");
    }

    #[test]
    fn falls_back_to_project_search() {
        let tree = MemorySourceTree::new()
            .with_file("packages/shop/lang/de/cart.php", "<?php return ['empty' => 'Leer'];")
            .with_file("packages/shop/translations/it.json", "{\"Cart\": \"Carrello\"}");
        let indexer = TranslationIndexer::new(false);
        let mut parser = PhpParser::new().unwrap();
        indexer.scan(&tree, &mut parser);
        let table = indexer.snapshot();
        assert_eq!(table.get("cart.empty").unwrap().locale, "de");
        assert_eq!(table.get("Cart").unwrap().locale, "it");
    }
}
