//! Read API over the indexes. Every query answers from the published
//! snapshots; unknown keys give empty results, never errors.

use crate::config::IndexOptions;
use crate::grammar::route::RouteRole;
use crate::grammar::translation::TranslationRole;
use crate::grammar::{self, Classified, LiteralSite};
use crate::indexer::assets::AssetIndexer;
use crate::indexer::patterns;
use crate::indexer::routes::{self, RouteIndexer};
use crate::indexer::translations::TranslationIndexer;
use crate::indexer::usage::{self, Caches, UsageScanner};
use crate::indexer::views::ViewIndexer;
use crate::indexer::ScanCounts;
use crate::model::{
    ArtifactKind, AssetInfo, Classification, CompletionItem, IndexStats, RouteDefinition, RouteInfo,
    SiteHandle, TranslationInfo, Usage, ViewInfo,
};
use crate::source::php::{self, PhpParser};
use crate::source::template::extract_fragments;
use crate::source::{FileCategory, FsSourceTree, LineIndex, SourceTree};
use anyhow::{Context, Result, anyhow};
use arc_swap::ArcSwap;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;
use tracing::{info, warn};

/// The per-domain query surface.
pub trait ArtifactQuery {
    fn kind(&self) -> ArtifactKind;

    /// Every key, sorted. Triggers the first scan when nothing is indexed yet.
    fn all(&self) -> Vec<String>;

    fn declarations(&self, key: &str) -> Vec<SiteHandle>;

    fn usages(&self, key: &str) -> Vec<Usage>;

    fn is_known(&self, text: &str) -> bool;
}

pub struct LaravelIndex {
    tree: Arc<dyn SourceTree>,
    options: IndexOptions,
    routes: RouteIndexer,
    translations: TranslationIndexer,
    views: ViewIndexer,
    assets: AssetIndexer,
    usages: UsageScanner,
    /// Interactive queries only; refreshes never touch it.
    parser: Mutex<PhpParser>,
    /// Parser owned by refreshes. Holding it serializes them, so a cold-start
    /// query never races the worker.
    refresh_parser: Mutex<PhpParser>,
    stats: ArcSwap<IndexStats>,
    indexed: AtomicBool,
}

impl LaravelIndex {
    pub fn new(tree: Arc<dyn SourceTree>, options: IndexOptions) -> Result<Self> {
        Ok(Self {
            translations: TranslationIndexer::new(options.strict_json),
            tree,
            options,
            routes: RouteIndexer::new(),
            views: ViewIndexer::new(),
            assets: AssetIndexer::new(),
            usages: UsageScanner::new(),
            parser: Mutex::new(PhpParser::new()?),
            refresh_parser: Mutex::new(PhpParser::new()?),
            stats: ArcSwap::from_pointee(IndexStats::default()),
            indexed: AtomicBool::new(false),
        })
    }

    /// Index of a project on disk.
    pub fn open(root: &Path, options: IndexOptions) -> Result<Self> {
        let root = std::fs::canonicalize(root)
            .with_context(|| format!("resolve project root {}", root.display()))?;
        let tree = FsSourceTree::new(root, options.clone());
        Self::new(Arc::new(tree), options)
    }

    pub fn tree(&self) -> &dyn SourceTree {
        self.tree.as_ref()
    }

    pub fn options(&self) -> &IndexOptions {
        &self.options
    }

    fn parser(&self) -> Result<MutexGuard<'_, PhpParser>> {
        self.parser.lock().map_err(|_| anyhow!("parser lock poisoned"))
    }

    /// Rebuilds every index: declarations first, then the usage scan against them.
    pub fn refresh(&self) -> Result<IndexStats> {
        let mut parser = self
            .refresh_parser
            .lock()
            .map_err(|_| anyhow!("refresh lock poisoned"))?;
        self.refresh_with(&mut parser)
    }

    fn refresh_with(&self, parser: &mut PhpParser) -> Result<IndexStats> {
        let start = Instant::now();
        let tree = self.tree.as_ref();

        let mut counts = ScanCounts::default();
        counts.merge(self.routes.scan(tree, parser));
        counts.merge(self.translations.scan(tree, parser));
        counts.merge(self.views.scan(tree));
        counts.merge(self.assets.scan(tree));

        let route_table = self.routes.snapshot();
        let translation_table = self.translations.snapshot();
        let view_table = self.views.snapshot();
        let asset_table = self.assets.snapshot();
        let caches = Caches {
            routes: &route_table,
            translations: &translation_table,
            views: &view_table,
            assets: &asset_table,
        };
        counts.merge(self.usages.scan(tree, parser, &caches));

        let stats = IndexStats {
            routes: route_table.routes.len(),
            route_names: route_table.by_name.len(),
            translations: translation_table.len(),
            views: view_table.len(),
            assets: asset_table.len(),
            usages: self.usages.snapshot().total(),
            files_scanned: counts.files,
            errors: counts.errors,
            duration_ms: start.elapsed().as_millis() as u64,
        };
        info!(
            "indexed {} routes, {} translations, {} views, {} assets, {} usages in {}ms",
            stats.routes, stats.translations, stats.views, stats.assets, stats.usages, stats.duration_ms
        );
        self.stats.store(Arc::new(stats.clone()));
        self.indexed.store(true, Ordering::Release);
        Ok(stats)
    }

    pub fn stats(&self) -> IndexStats {
        self.stats.load().as_ref().clone()
    }

    pub fn is_indexed(&self) -> bool {
        self.indexed.load(Ordering::Acquire)
    }

    /// Cold-start scan for callers that query before any refresh.
    pub fn ensure_indexed(&self) {
        if self.is_indexed() {
            return;
        }
        let Ok(mut parser) = self.refresh_parser.lock() else {
            warn!("refresh lock poisoned");
            return;
        };
        // another caller may have finished the first scan while we waited
        if self.is_indexed() {
            return;
        }
        if let Err(err) = self.refresh_with(&mut parser) {
            warn!("initial index failed: {err:#}");
        }
    }

    pub fn routes(&self) -> RouteQuery<'_> {
        RouteQuery { index: self }
    }

    pub fn translations(&self) -> TranslationQuery<'_> {
        TranslationQuery { index: self }
    }

    pub fn views(&self) -> ViewQuery<'_> {
        ViewQuery { index: self }
    }

    pub fn assets(&self) -> AssetQuery<'_> {
        AssetQuery { index: self }
    }

    pub fn query(&self, kind: ArtifactKind) -> Box<dyn ArtifactQuery + '_> {
        match kind {
            ArtifactKind::Route => Box::new(self.routes()),
            ArtifactKind::Translation => Box::new(self.translations()),
            ArtifactKind::View => Box::new(self.views()),
            ArtifactKind::Asset => Box::new(self.assets()),
        }
    }

    /// Classifies the string literal covering `offset` in `file`.
    pub fn classify(&self, file: &str, offset: usize) -> Result<Option<Classification>> {
        self.ensure_indexed();
        let Some(literal) = self.literal_at(file, offset)? else {
            return Ok(None);
        };
        let Some(classified) = literal.classified else {
            return Ok(None);
        };
        let kind = classified.kind();
        let key = self.key_for(&classified, &literal.value);
        let declarations = match (&key, kind) {
            (Some(key), _) => self.query(kind).declarations(key),
            (None, ArtifactKind::View) => self.views.find_declarations(self.tree(), &literal.value),
            (None, _) => Vec::new(),
        };
        let usage_count = key
            .as_deref()
            .map(|key| self.query(kind).usages(key).len())
            .unwrap_or(0);
        Ok(Some(Classification {
            kind,
            literal: literal.value,
            key,
            declarations,
            usage_count,
            site: literal.site,
        }))
    }

    fn key_for(&self, classified: &Classified, value: &str) -> Option<String> {
        let route_table = self.routes.snapshot();
        if let Classified::Route(RouteRole::Definition) = classified {
            return route_table.resolve(value).map(|hit| hit.key);
        }
        let translation_table = self.translations.snapshot();
        let view_table = self.views.snapshot();
        let asset_table = self.assets.snapshot();
        let caches = Caches {
            routes: &route_table,
            translations: &translation_table,
            views: &view_table,
            assets: &asset_table,
        };
        usage::resolve(classified, value, &caches).map(|resolved| resolved.key)
    }

    /// Completion candidates for the literal at `offset`, filtered by the text
    /// typed before the cursor.
    pub fn complete(&self, file: &str, offset: usize) -> Result<Vec<CompletionItem>> {
        self.ensure_indexed();
        let Some(literal) = self.literal_at(file, offset)? else {
            return Ok(Vec::new());
        };
        let kind = match &literal.classified {
            Some(Classified::Route(RouteRole::Definition)) => return Ok(Vec::new()),
            Some(Classified::Translation(TranslationRole::LanguageFileKey)) => return Ok(Vec::new()),
            Some(classified) => classified.kind(),
            None => return Ok(Vec::new()),
        };
        let prefix = literal.prefix.as_str();
        let items = match kind {
            ArtifactKind::Route => {
                let table = self.routes.snapshot();
                let mut names: Vec<&String> = table.by_name.keys().collect();
                names.sort();
                names
                    .into_iter()
                    .filter(|name| name.starts_with(prefix))
                    .filter_map(|name| {
                        table.by_name.get(name).map(|route| CompletionItem {
                            label: name.clone(),
                            kind,
                            detail: format!("{} {}", route.method, route.path),
                        })
                    })
                    .collect()
            }
            ArtifactKind::Translation => {
                let table = self.translations.snapshot();
                table
                    .keys()
                    .into_iter()
                    .filter(|key| key.starts_with(prefix))
                    .map(|key| CompletionItem {
                        detail: table.get(&key).map(|t| t.value.clone()).unwrap_or_default(),
                        label: key,
                        kind,
                    })
                    .collect()
            }
            ArtifactKind::View => {
                let table = self.views.snapshot();
                table
                    .keys()
                    .into_iter()
                    .filter(|key| key.starts_with(prefix))
                    .map(|key| CompletionItem {
                        detail: table.get(&key).map(|v| v.file.clone()).unwrap_or_default(),
                        label: key,
                        kind,
                    })
                    .collect()
            }
            ArtifactKind::Asset => {
                let table = self.assets.snapshot();
                table
                    .keys()
                    .into_iter()
                    .filter(|key| key.starts_with(prefix))
                    .map(|key| CompletionItem {
                        detail: table
                            .get(&key)
                            .map(|a| format!("{:?}", a.asset_type).to_ascii_uppercase())
                            .unwrap_or_default(),
                        label: key,
                        kind,
                    })
                    .collect()
            }
        };
        Ok(items)
    }

    fn literal_at(&self, file: &str, offset: usize) -> Result<Option<LocatedLiteral>> {
        let Some(category) = FileCategory::of(file) else {
            return Ok(None);
        };
        let content = self
            .tree
            .read(file)
            .with_context(|| format!("read {file}"))?;
        let lines = LineIndex::new(&content);
        let translations = self.translations.snapshot();
        let is_known = |key: &str| translations.contains(key);
        let mut parser = self.parser()?;

        let located = match category {
            FileCategory::Php => {
                let Some(parsed) = parser.parse(&content) else {
                    return Ok(None);
                };
                php::string_at(parsed.root_node(), offset).and_then(|node| {
                    let site = LiteralSite::new(node, &content, file)?;
                    Some(LocatedLiteral {
                        classified: grammar::classify(&site, is_known),
                        prefix: typed_prefix(&content, node.start_byte(), offset),
                        site: SiteHandle::new(
                            file,
                            lines.line_of(node.start_byte()),
                            node.start_byte(),
                            node.end_byte(),
                        ),
                        value: site.value,
                    })
                })
            }
            FileCategory::Blade => {
                let mut found = None;
                for fragment in extract_fragments(&content) {
                    let Some(code_offset) = fragment.to_code(offset) else {
                        continue;
                    };
                    let Some(parsed) = parser.parse(&fragment.code) else {
                        continue;
                    };
                    let Some(node) = php::string_at(parsed.root_node(), code_offset) else {
                        continue;
                    };
                    let Some(site) = LiteralSite::new(node, &fragment.code, file) else {
                        continue;
                    };
                    let site =
                        site.in_fragment(fragment.directive.as_deref(), fragment.attribute.as_deref());
                    let start = fragment.to_template(node.start_byte()).unwrap_or(offset);
                    let end = fragment.to_template(node.end_byte()).unwrap_or(offset);
                    found = Some(LocatedLiteral {
                        classified: grammar::classify(&site, is_known),
                        prefix: typed_prefix(&fragment.code, node.start_byte(), code_offset),
                        site: SiteHandle::new(file, lines.line_of(start), start, end),
                        value: site.value,
                    });
                    break;
                }
                found
            }
            FileCategory::Script => patterns::find_all(patterns::script_patterns_for(file), &content)
                .into_iter()
                .find(|m| m.start <= offset && offset <= m.end)
                .map(|m| LocatedLiteral {
                    classified: Some(Classified::Route(RouteRole::Reference(m.helper))),
                    prefix: content.get(m.start..offset).unwrap_or("").to_string(),
                    site: SiteHandle::new(file, lines.line_of(m.start), m.start, m.end),
                    value: m.text.to_string(),
                }),
        };
        Ok(located)
    }

    pub fn route(&self, key: &str) -> Option<Arc<RouteInfo>> {
        self.ensure_indexed();
        self.routes.snapshot().get(key)
    }

    pub fn route_definition(&self, key: &str) -> Option<RouteDefinition> {
        self.route(key).map(|route| routes::definition(&route))
    }

    pub fn translation(&self, key: &str) -> Option<TranslationInfo> {
        self.ensure_indexed();
        self.translations.snapshot().get(key).map(|info| info.as_ref().clone())
    }

    pub fn view(&self, key: &str) -> Option<ViewInfo> {
        self.ensure_indexed();
        self.views.snapshot().resolve(key).map(|info| info.as_ref().clone())
    }

    pub fn asset(&self, key: &str) -> Option<AssetInfo> {
        self.ensure_indexed();
        self.assets.snapshot().resolve(key).map(|info| info.as_ref().clone())
    }
}

struct LocatedLiteral {
    value: String,
    classified: Option<Classified>,
    /// Literal text between the opening quote and the cursor.
    prefix: String,
    site: SiteHandle,
}

fn typed_prefix(source: &str, literal_start: usize, cursor: usize) -> String {
    let body_start = source
        .get(literal_start..)
        .and_then(|rest| rest.find(['\'', '"']))
        .map(|quote| literal_start + quote + 1)
        .unwrap_or(literal_start);
    if cursor <= body_start {
        return String::new();
    }
    source.get(body_start..cursor).unwrap_or("").to_string()
}

pub struct RouteQuery<'a> {
    index: &'a LaravelIndex,
}

impl RouteQuery<'_> {
    pub fn get(&self, key: &str) -> Option<Arc<RouteInfo>> {
        self.index.route(key)
    }

    pub fn path_of(&self, key: &str) -> Option<String> {
        self.get(key).map(|route| route.path.clone())
    }
}

impl ArtifactQuery for RouteQuery<'_> {
    fn kind(&self) -> ArtifactKind {
        ArtifactKind::Route
    }

    fn all(&self) -> Vec<String> {
        self.index.ensure_indexed();
        self.index.routes.snapshot().keys()
    }

    fn declarations(&self, key: &str) -> Vec<SiteHandle> {
        self.index.ensure_indexed();
        self.index.routes.declarations(key)
    }

    /// Usages recorded under the key, the route's name and its path.
    fn usages(&self, key: &str) -> Vec<Usage> {
        self.index.ensure_indexed();
        let usages = self.index.usages.snapshot();
        let mut keys = vec![key.to_string()];
        if let Some(route) = self.index.routes.snapshot().get(key) {
            keys.extend(route.name.clone());
            keys.push(route.path.clone());
        }
        let mut out: Vec<Usage> = Vec::new();
        for key in keys {
            for usage in usages.get(ArtifactKind::Route, &key) {
                if !out.contains(usage) {
                    out.push(usage.clone());
                }
            }
        }
        out.sort();
        out
    }

    fn is_known(&self, text: &str) -> bool {
        self.index.ensure_indexed();
        self.index.routes.snapshot().resolve(text).is_some()
    }
}

pub struct TranslationQuery<'a> {
    index: &'a LaravelIndex,
}

impl TranslationQuery<'_> {
    pub fn value_of(&self, key: &str) -> String {
        self.index.ensure_indexed();
        self.index.translations.value_of(key)
    }

    pub fn locale_of(&self, key: &str) -> String {
        self.index.ensure_indexed();
        self.index.translations.locale_of(key)
    }

    /// Every locale's record for the key.
    pub fn declarations_of(&self, key: &str) -> Vec<TranslationInfo> {
        self.index.ensure_indexed();
        self.index
            .translations
            .snapshot()
            .all_locales(key)
            .iter()
            .map(|info| info.as_ref().clone())
            .collect()
    }
}

impl ArtifactQuery for TranslationQuery<'_> {
    fn kind(&self) -> ArtifactKind {
        ArtifactKind::Translation
    }

    fn all(&self) -> Vec<String> {
        self.index.ensure_indexed();
        self.index.translations.snapshot().keys()
    }

    fn declarations(&self, key: &str) -> Vec<SiteHandle> {
        self.index.ensure_indexed();
        match self.index.parser() {
            Ok(mut parser) => {
                self.index
                    .translations
                    .find_declarations(self.index.tree(), &mut parser, key)
            }
            Err(err) => {
                warn!("{err}");
                Vec::new()
            }
        }
    }

    fn usages(&self, key: &str) -> Vec<Usage> {
        self.index.ensure_indexed();
        self.index
            .usages
            .snapshot()
            .get(ArtifactKind::Translation, key)
            .to_vec()
    }

    fn is_known(&self, text: &str) -> bool {
        self.index.ensure_indexed();
        self.index.translations.snapshot().contains(text)
    }
}

pub struct ViewQuery<'a> {
    index: &'a LaravelIndex,
}

impl ViewQuery<'_> {
    pub fn path_of(&self, key: &str) -> Option<String> {
        self.index.view(key).map(|view| view.file)
    }
}

impl ArtifactQuery for ViewQuery<'_> {
    fn kind(&self) -> ArtifactKind {
        ArtifactKind::View
    }

    fn all(&self) -> Vec<String> {
        self.index.ensure_indexed();
        self.index.views.snapshot().keys()
    }

    fn declarations(&self, key: &str) -> Vec<SiteHandle> {
        self.index.ensure_indexed();
        self.index.views.find_declarations(self.index.tree(), key)
    }

    fn usages(&self, key: &str) -> Vec<Usage> {
        self.index.ensure_indexed();
        let key = self
            .index
            .views
            .snapshot()
            .resolve(key)
            .map(|view| view.canonical_name.clone())
            .unwrap_or_else(|| key.to_string());
        self.index.usages.snapshot().get(ArtifactKind::View, &key).to_vec()
    }

    fn is_known(&self, text: &str) -> bool {
        self.index.ensure_indexed();
        self.index.views.snapshot().resolve(text).is_some()
    }
}

pub struct AssetQuery<'a> {
    index: &'a LaravelIndex,
}

impl AssetQuery<'_> {
    pub fn type_of(&self, key: &str) -> Option<crate::model::AssetType> {
        self.index.asset(key).map(|asset| asset.asset_type)
    }
}

impl ArtifactQuery for AssetQuery<'_> {
    fn kind(&self) -> ArtifactKind {
        ArtifactKind::Asset
    }

    fn all(&self) -> Vec<String> {
        self.index.ensure_indexed();
        self.index.assets.snapshot().keys()
    }

    fn declarations(&self, key: &str) -> Vec<SiteHandle> {
        self.index.ensure_indexed();
        self.index.assets.declarations(key)
    }

    fn usages(&self, key: &str) -> Vec<Usage> {
        self.index.ensure_indexed();
        let key = self
            .index
            .assets
            .snapshot()
            .resolve(key)
            .map(|asset| asset.canonical_name.clone())
            .unwrap_or_else(|| key.to_string());
        self.index.usages.snapshot().get(ArtifactKind::Asset, &key).to_vec()
    }

    fn is_known(&self, text: &str) -> bool {
        self.index.ensure_indexed();
        self.index.assets.snapshot().resolve(text).is_some()
    }
}

/// `composer.json` requiring the framework, or an `artisan` script next to
/// the usual top-level directories.
pub fn is_laravel_project(tree: &dyn SourceTree) -> bool {
    if let Ok(composer) = tree.read("composer.json") {
        if composer.contains("laravel/framework") {
            return true;
        }
    }
    tree.is_file("artisan") && ["app", "config", "routes"].iter().any(|dir| tree.is_dir(dir))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MemorySourceTree;

    fn index(tree: MemorySourceTree) -> LaravelIndex {
        LaravelIndex::new(Arc::new(tree), IndexOptions::default()).unwrap()
    }

    fn sample() -> MemorySourceTree {
        MemorySourceTree::new()
            .with_file(
                "routes/web.php",
                "<?php\nRoute::get('/dashboard', 'DashController@show')->name('dashboard');\nRoute::get('/docs', 'DocsController@index')->name('docs.index');\n",
            )
            .with_file("resources/lang/en/auth.php", "<?php return ['failed' => 'Nope'];")
            .with_file("resources/views/app.blade.php", "<a href=\"{{ route('dashboard') }}\">d</a>\n{{ __('auth.failed') }}\n")
            .with_file(
                "app/Http/Controllers/DashController.php",
                "<?php\nreturn redirect('/dashboard');\nreturn to_route('dashboard');\nreturn route('da');\n",
            )
    }

    #[test]
    fn first_query_triggers_a_scan() {
        let index = index(sample());
        assert!(!index.is_indexed());
        assert_eq!(index.routes().all(), vec!["dashboard", "docs.index", "/dashboard", "/docs"]);
        assert!(index.is_indexed());
        assert_eq!(index.stats().routes, 2);
    }

    #[test]
    fn route_usages_aggregate_name_and_path() {
        let index = index(sample());
        index.refresh().unwrap();
        let usages = index.routes().usages("dashboard");
        // blade link, to_route() and nothing from redirect('/dashboard'), which is no route helper
        assert_eq!(usages.len(), 2);
        assert_eq!(index.routes().usages("/dashboard").len(), 2);
    }

    #[test]
    fn classify_reports_declarations_and_usage_counts() {
        let tree = sample();
        let content = tree.read("app/Http/Controllers/DashController.php").unwrap();
        let offset = content.find("'dashboard'").unwrap() + 2;
        let index = index(tree);
        index.refresh().unwrap();
        let classification = index
            .classify("app/Http/Controllers/DashController.php", offset)
            .unwrap()
            .unwrap();
        assert_eq!(classification.kind, ArtifactKind::Route);
        assert_eq!(classification.key.as_deref(), Some("dashboard"));
        assert_eq!(classification.declarations[0].file, "routes/web.php");
        assert_eq!(classification.declarations[0].line, 1);
        assert_eq!(classification.usage_count, 2);
    }

    #[test]
    fn classify_inside_templates() {
        let tree = sample();
        let content = tree.read("resources/views/app.blade.php").unwrap();
        let offset = content.find("auth.failed").unwrap() + 1;
        let index = index(tree);
        index.refresh().unwrap();
        let classification = index.classify("resources/views/app.blade.php", offset).unwrap().unwrap();
        assert_eq!(classification.kind, ArtifactKind::Translation);
        assert_eq!(classification.site.line, 1);
        assert_eq!(classification.declarations[0].file, "resources/lang/en/auth.php");
    }

    #[test]
    fn completion_filters_by_typed_prefix() {
        let tree = sample();
        let content = tree.read("app/Http/Controllers/DashController.php").unwrap();
        let offset = content.find("'da'").unwrap() + 3;
        let index = index(tree);
        index.refresh().unwrap();
        let items = index.complete("app/Http/Controllers/DashController.php", offset).unwrap();
        let labels: Vec<&str> = items.iter().map(|i| i.label.as_str()).collect();
        assert_eq!(labels, vec!["dashboard"]);
        assert_eq!(items[0].detail, "GET /dashboard");
    }

    #[test]
    fn queries_do_not_wait_for_a_running_refresh() {
        let tree = sample();
        let content = tree.read("app/Http/Controllers/DashController.php").unwrap();
        let offset = content.find("'da'").unwrap() + 3;
        let index = index(tree);
        index.refresh().unwrap();

        // stands in for a refresh in flight on the worker
        let _refreshing = index.refresh_parser.lock().unwrap();
        let items = index.complete("app/Http/Controllers/DashController.php", offset).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(index.translations().declarations("auth.failed").len(), 1);
        assert!(index.routes().is_known("dashboard"));
    }

    #[test]
    fn detects_laravel_projects() {
        let composer = MemorySourceTree::new()
            .with_file("composer.json", r#"{"require":{"laravel/framework":"^11.0"}}"#);
        assert!(is_laravel_project(&composer));
        let artisan = MemorySourceTree::new()
            .with_file("artisan", "#!/usr/bin/env php")
            .with_file("routes/web.php", "<?php");
        assert!(is_laravel_project(&artisan));
        assert!(!is_laravel_project(&MemorySourceTree::new().with_file("index.php", "<?php")));
    }
}
