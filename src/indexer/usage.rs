//! Reference scan over every PHP, Blade and client-script file. Runs after
//! the declaration caches are published; a literal only becomes a usage when
//! it resolves against one of them.

use crate::grammar::route::{RouteHelper, RouteRole};
use crate::grammar::translation::TranslationRole;
use crate::grammar::{self, Classified, LiteralSite};
use crate::indexer::assets::AssetTable;
use crate::indexer::patterns::{self, TextMatch};
use crate::indexer::routes::{RouteMatch, RouteTable};
use crate::indexer::translations::TranslationTable;
use crate::indexer::views::ViewTable;
use crate::indexer::{ScanCounts, read_or_skip};
use crate::model::{ArtifactKind, SiteHandle, Usage, UsageKind};
use crate::source::php::{self, PhpParser};
use crate::source::template::extract_fragments;
use crate::source::{FileCategory, LineIndex, SourceTree};
use arc_swap::ArcSwap;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::debug;

/// Read-only views of the declaration caches for one scan pass.
#[derive(Clone, Copy)]
pub struct Caches<'a> {
    pub routes: &'a RouteTable,
    pub translations: &'a TranslationTable,
    pub views: &'a ViewTable,
    pub assets: &'a AssetTable,
}

/// A literal resolved to a declared artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub kind: ArtifactKind,
    pub key: String,
    pub usage_kind: UsageKind,
}

fn from_route(hit: RouteMatch, helper: RouteHelper) -> Resolved {
    let usage_kind = match helper {
        RouteHelper::Name if hit.by_name => UsageKind::NameReference,
        RouteHelper::Name => UsageKind::PathReference,
        RouteHelper::Url => UsageKind::UrlReference,
        RouteHelper::Action => UsageKind::ActionReference,
    };
    Resolved {
        kind: ArtifactKind::Route,
        key: hit.key,
        usage_kind,
    }
}

pub fn resolve_route(text: &str, helper: RouteHelper, routes: &RouteTable) -> Option<Resolved> {
    let hit = match helper {
        RouteHelper::Name => routes.resolve(text),
        RouteHelper::Url => routes.resolve_path(text),
        RouteHelper::Action => routes.resolve_action(text),
    }?;
    Some(from_route(hit, helper))
}

/// Canonical key for a classified literal. Declarations resolve to nothing.
pub fn resolve(classified: &Classified, value: &str, caches: &Caches<'_>) -> Option<Resolved> {
    match classified {
        Classified::Route(RouteRole::Definition) => None,
        Classified::Route(RouteRole::Reference(helper)) => resolve_route(value, *helper, caches.routes),
        Classified::Translation(TranslationRole::LanguageFileKey) => None,
        Classified::Translation(_) => caches.translations.contains(value).then(|| Resolved {
            kind: ArtifactKind::Translation,
            key: value.to_string(),
            usage_kind: UsageKind::NameReference,
        }),
        Classified::View => caches.views.resolve(value).map(|info| Resolved {
            kind: ArtifactKind::View,
            key: info.canonical_name.clone(),
            usage_kind: UsageKind::NameReference,
        }),
        Classified::Asset => caches.assets.resolve(value).map(|info| Resolved {
            kind: ArtifactKind::Asset,
            key: info.canonical_name.clone(),
            usage_kind: UsageKind::PathReference,
        }),
    }
}

/// One generation of recorded usages, per artifact kind and key.
#[derive(Debug, Default)]
pub struct UsageTable {
    by_kind: HashMap<ArtifactKind, HashMap<String, Vec<Usage>>>,
    total: usize,
}

impl UsageTable {
    fn record(&mut self, kind: ArtifactKind, key: String, usage: Usage) {
        self.by_kind
            .entry(kind)
            .or_default()
            .entry(key)
            .or_default()
            .push(usage);
        self.total += 1;
    }

    fn finish(&mut self) {
        for keys in self.by_kind.values_mut() {
            for usages in keys.values_mut() {
                usages.sort();
            }
        }
    }

    pub fn get(&self, kind: ArtifactKind, key: &str) -> &[Usage] {
        self.by_kind
            .get(&kind)
            .and_then(|keys| keys.get(key))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn total(&self) -> usize {
        self.total
    }
}

/// Collects usages of one file; optionally drops repeats of (line, key, kind).
struct FileRecorder<'t> {
    rel: String,
    lines: LineIndex,
    dedup: Option<HashSet<(usize, ArtifactKind, String, UsageKind)>>,
    table: &'t mut UsageTable,
}

impl FileRecorder<'_> {
    fn push(&mut self, resolved: Resolved, start: usize, end: usize) {
        let line = self.lines.line_of(start);
        if let Some(seen) = &mut self.dedup {
            let entry = (line, resolved.kind, resolved.key.clone(), resolved.usage_kind);
            if !seen.insert(entry) {
                return;
            }
        }
        let usage = Usage {
            file: self.rel.clone(),
            line_number: line,
            site: SiteHandle::new(&self.rel, line, start, end),
            usage_kind: resolved.usage_kind,
        };
        self.table.record(resolved.kind, resolved.key, usage);
    }
}

pub struct UsageScanner {
    table: ArcSwap<UsageTable>,
}

impl Default for UsageScanner {
    fn default() -> Self {
        Self::new()
    }
}

impl UsageScanner {
    pub fn new() -> Self {
        Self {
            table: ArcSwap::from_pointee(UsageTable::default()),
        }
    }

    pub fn snapshot(&self) -> Arc<UsageTable> {
        self.table.load_full()
    }

    pub fn scan(
        &self,
        tree: &dyn SourceTree,
        parser: &mut PhpParser,
        caches: &Caches<'_>,
    ) -> ScanCounts {
        let mut counts = ScanCounts::default();
        let mut table = UsageTable::default();
        for rel in tree.project_files() {
            let Some(category) = FileCategory::of(&rel) else {
                continue;
            };
            let Some(content) = read_or_skip(tree, &rel, &mut counts) else {
                continue;
            };
            let before = table.total();
            let mut recorder = FileRecorder {
                rel: rel.clone(),
                lines: LineIndex::new(&content),
                dedup: match category {
                    FileCategory::Php => None,
                    FileCategory::Blade | FileCategory::Script => Some(HashSet::new()),
                },
                table: &mut table,
            };
            match category {
                FileCategory::Php => scan_php(&mut recorder, parser, &content, caches),
                FileCategory::Blade => {
                    scan_blade(&mut recorder, parser, &content, caches);
                    scan_text(&mut recorder, patterns::blade_patterns(), &content, caches);
                }
                FileCategory::Script => {
                    scan_text(&mut recorder, patterns::script_patterns_for(&rel), &content, caches);
                }
            }
            let found = table.total() - before;
            if found > 0 {
                debug!("{rel}: {found} usages");
            }
        }
        table.finish();
        self.table.store(Arc::new(table));
        counts
    }
}

fn scan_php(recorder: &mut FileRecorder<'_>, parser: &mut PhpParser, content: &str, caches: &Caches<'_>) {
    let Some(parsed) = parser.parse(content) else {
        return;
    };
    let rel = recorder.rel.clone();
    for node in php::string_nodes(parsed.root_node()) {
        let Some(site) = LiteralSite::new(node, content, &rel) else {
            continue;
        };
        let Some(classified) = grammar::classify(&site, |key| caches.translations.contains(key)) else {
            continue;
        };
        if let Some(resolved) = resolve(&classified, &site.value, caches) {
            recorder.push(resolved, node.start_byte(), node.end_byte());
        }
    }
}

fn scan_blade(recorder: &mut FileRecorder<'_>, parser: &mut PhpParser, content: &str, caches: &Caches<'_>) {
    let rel = recorder.rel.clone();
    for fragment in extract_fragments(content) {
        let Some(parsed) = parser.parse(&fragment.code) else {
            continue;
        };
        for node in php::string_nodes(parsed.root_node()) {
            let Some(site) = LiteralSite::new(node, &fragment.code, &rel) else {
                continue;
            };
            let site = site.in_fragment(fragment.directive.as_deref(), fragment.attribute.as_deref());
            let Some(classified) = grammar::classify(&site, |key| caches.translations.contains(key))
            else {
                continue;
            };
            let Some(resolved) = resolve(&classified, &site.value, caches) else {
                continue;
            };
            let (Some(start), Some(end)) = (
                fragment.to_template(node.start_byte()),
                fragment.to_template(node.end_byte()),
            ) else {
                continue;
            };
            recorder.push(resolved, start, end);
        }
    }
}

fn scan_text(
    recorder: &mut FileRecorder<'_>,
    table: &[patterns::TextPattern],
    content: &str,
    caches: &Caches<'_>,
) {
    for TextMatch { text, start, end, helper } in patterns::find_all(table, content) {
        if let Some(resolved) = resolve_route(text, helper, caches.routes) {
            // report the quoted literal, as the structural pass does
            recorder.push(resolved, start.saturating_sub(1), end + 1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indexer::assets::AssetIndexer;
    use crate::indexer::routes::RouteIndexer;
    use crate::indexer::translations::TranslationIndexer;
    use crate::indexer::views::ViewIndexer;
    use crate::source::MemorySourceTree;

    struct Fixture {
        routes: RouteIndexer,
        translations: TranslationIndexer,
        views: ViewIndexer,
        assets: AssetIndexer,
        usages: UsageScanner,
    }

    fn scan(tree: &MemorySourceTree) -> Fixture {
        let mut parser = PhpParser::new().unwrap();
        let fixture = Fixture {
            routes: RouteIndexer::new(),
            translations: TranslationIndexer::new(false),
            views: ViewIndexer::new(),
            assets: AssetIndexer::new(),
            usages: UsageScanner::new(),
        };
        fixture.routes.scan(tree, &mut parser);
        fixture.translations.scan(tree, &mut parser);
        fixture.views.scan(tree);
        fixture.assets.scan(tree);
        let routes = fixture.routes.snapshot();
        let translations = fixture.translations.snapshot();
        let views = fixture.views.snapshot();
        let assets = fixture.assets.snapshot();
        let caches = Caches {
            routes: &routes,
            translations: &translations,
            views: &views,
            assets: &assets,
        };
        fixture.usages.scan(tree, &mut parser, &caches);
        fixture
    }

    fn project() -> MemorySourceTree {
        MemorySourceTree::new()
            .with_file(
                "routes/web.php",
                "<?php\nRoute::get('/', fn () => view('home'))->name('home');\nRoute::get('/users', [UserController::class, 'index'])->name('users.index');\nRoute::get('/about', 'PageController@about');\n",
            )
            .with_file("resources/lang/en/home.php", "<?php return ['title' => 'Welcome'];")
            .with_file("resources/lang/en.json", "{\"home\": \"Start\"}")
            .with_file("resources/views/home.blade.php", "<h1>{{ __('home.title') }}</h1>\n<a href=\"{{ route('users.index') }}\">u</a>\n<img src=\"{{ asset('img/logo.png') }}\">\n@include('home')\n")
            .with_file("public/img/logo.png", "")
            .with_file(
                "app/Http/Controllers/HomeController.php",
                "<?php\nclass HomeController {\n  public function go() {\n    $t = __('home');\n    return redirect()->route('home');\n  }\n  public function about() { return redirect(url('/about')); }\n  public function act() { return action('PageController@about'); }\n}\n",
            )
            .with_file("resources/js/nav.js", "\n\nInertia.visit('/users')\n")
    }

    #[test]
    fn routes_are_keyed_by_resolved_name_or_path() {
        let usages = scan(&project()).usages.snapshot();
        let home = usages.get(ArtifactKind::Route, "home");
        assert_eq!(home.len(), 1);
        assert_eq!(home[0].line_number, 4);
        assert_eq!(home[0].usage_kind, UsageKind::NameReference);

        let about = usages.get(ArtifactKind::Route, "/about");
        let kinds: Vec<UsageKind> = about.iter().map(|u| u.usage_kind).collect();
        assert_eq!(kinds, vec![UsageKind::UrlReference, UsageKind::ActionReference]);

        // Inertia.visit('/users') resolves through the path cache
        let users = usages.get(ArtifactKind::Route, "/users");
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].usage_kind, UsageKind::PathReference);
        assert_eq!(users[0].line_number, 2);
    }

    #[test]
    fn template_references_are_recorded_once() {
        let usages = scan(&project()).usages.snapshot();
        let named = usages.get(ArtifactKind::Route, "users.index");
        assert_eq!(named.len(), 1);
        assert_eq!(named[0].file, "resources/views/home.blade.php");
        assert_eq!(named[0].line_number, 1);
    }

    #[test]
    fn other_domains() {
        let usages = scan(&project()).usages.snapshot();
        assert_eq!(usages.get(ArtifactKind::Translation, "home.title").len(), 1);
        // `__('home')` is a translation, the route declaration literal is not a usage
        assert_eq!(usages.get(ArtifactKind::Translation, "home").len(), 1);
        assert_eq!(usages.get(ArtifactKind::View, "home").len(), 2);
        let logo = usages.get(ArtifactKind::Asset, "img/logo.png");
        assert_eq!(logo[0].line_number, 2);
    }

    #[test]
    fn controller_method_literal_is_never_a_route_usage() {
        let usages = scan(&project()).usages.snapshot();
        assert!(usages.get(ArtifactKind::Route, "index").is_empty());
        assert!(usages.get(ArtifactKind::Translation, "index").is_empty());
    }
}
