use crate::indexer::{ScanCounts, read_or_skip, scope};
use crate::model::{ActionDefinition, CLOSURE_ACTION, RouteDefinition, RouteInfo, SiteHandle};
use crate::normalize;
use crate::source::php::PhpParser;
use crate::source::{LineIndex, SourceTree};
use crate::util::{extension, file_name, hash_content};
use arc_swap::ArcSwap;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::debug;

/// Route files scanned before any other file under `routes/`.
pub const PRIMARY_ROUTE_FILES: &[&str] = &[
    "routes/web.php",
    "routes/api.php",
    "routes/channels.php",
    "routes/console.php",
    "routes/artisan.php",
];

/// One generation of the route caches.
#[derive(Debug, Default)]
pub struct RouteTable {
    /// Every declaration, in scan order.
    pub routes: Vec<Arc<RouteInfo>>,
    pub by_name: HashMap<String, Arc<RouteInfo>>,
    pub by_path: HashMap<String, Arc<RouteInfo>>,
    by_action: HashMap<String, Vec<Arc<RouteInfo>>>,
}

/// How a reference text matched the route caches.
#[derive(Debug, Clone)]
pub struct RouteMatch {
    /// Canonical key: the route name when matched by name, else the path.
    pub key: String,
    pub by_name: bool,
    pub route: Arc<RouteInfo>,
}

impl RouteTable {
    fn insert(&mut self, info: RouteInfo) {
        let info = Arc::new(info);
        if let Some(name) = &info.name {
            self.by_name.insert(name.clone(), Arc::clone(&info));
        }
        if !info.path.is_empty() {
            self.by_path.insert(info.path.clone(), Arc::clone(&info));
        }
        if let Some(controller) = &info.controller {
            if controller != CLOSURE_ACTION {
                self.by_action
                    .entry(controller.clone())
                    .or_default()
                    .push(Arc::clone(&info));
            }
        }
        self.routes.push(info);
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Route names followed by paths, each sorted.
    pub fn keys(&self) -> Vec<String> {
        let mut names: Vec<String> = self.by_name.keys().cloned().collect();
        names.sort();
        let mut paths: Vec<String> = self.by_path.keys().cloned().collect();
        paths.sort();
        names.extend(paths);
        names
    }

    /// Name cache first, then the path cache.
    pub fn resolve(&self, text: &str) -> Option<RouteMatch> {
        if let Some(route) = self.by_name.get(text) {
            return Some(RouteMatch {
                key: text.to_string(),
                by_name: true,
                route: Arc::clone(route),
            });
        }
        self.resolve_path(text)
    }

    pub fn resolve_path(&self, text: &str) -> Option<RouteMatch> {
        let trimmed = text.trim();
        if trimmed.is_empty() || trimmed.contains("://") {
            return None;
        }
        let path = normalize::normalize_route_path(without_query(trimmed));
        self.by_path.get(&path).map(|route| RouteMatch {
            key: path,
            by_name: false,
            route: Arc::clone(route),
        })
    }

    /// `action('UserController@index')` also matches a namespaced controller.
    pub fn resolve_action(&self, text: &str) -> Option<RouteMatch> {
        let text = text.trim().trim_start_matches('\\');
        if text.is_empty() {
            return None;
        }
        let route = self.by_action.get(text).and_then(|r| r.first()).or_else(|| {
            let suffix = format!("\\{text}");
            self.routes
                .iter()
                .find(|route| route.controller.as_deref().is_some_and(|c| c.ends_with(&suffix)))
        })?;
        Some(RouteMatch {
            key: canonical_key(route),
            by_name: route.name.is_some(),
            route: Arc::clone(route),
        })
    }

    pub fn get(&self, key: &str) -> Option<Arc<RouteInfo>> {
        self.resolve(key).map(|m| m.route)
    }
}

pub fn canonical_key(route: &RouteInfo) -> String {
    route.name.clone().unwrap_or_else(|| route.path.clone())
}

/// Route files in scan order.
pub fn route_files(tree: &dyn SourceTree) -> Vec<String> {
    let mut files: Vec<String> = PRIMARY_ROUTE_FILES
        .iter()
        .filter(|rel| tree.is_file(rel))
        .map(|rel| rel.to_string())
        .collect();
    let push_dir = |dir: &str, files: &mut Vec<String>| {
        for entry in tree.child_files(dir) {
            if extension(&entry.path).as_deref() == Some("php") && !files.contains(&entry.path) {
                files.push(entry.path);
            }
        }
    };
    push_dir("routes", &mut files);
    for module in tree.child_dirs("Modules") {
        for sub in ["routes", "Routes"] {
            push_dir(&format!("{}/{sub}", module.path), &mut files);
        }
    }
    files
}

/// Routes resolved from one file, keyed by the content hash they came from.
struct ParsedFile {
    hash: String,
    routes: Vec<RouteInfo>,
}

pub struct RouteIndexer {
    table: ArcSwap<RouteTable>,
    files: Mutex<HashMap<String, ParsedFile>>,
}

impl Default for RouteIndexer {
    fn default() -> Self {
        Self::new()
    }
}

impl RouteIndexer {
    pub fn new() -> Self {
        Self {
            table: ArcSwap::from_pointee(RouteTable::default()),
            files: Mutex::new(HashMap::new()),
        }
    }

    pub fn snapshot(&self) -> Arc<RouteTable> {
        self.table.load_full()
    }

    /// Builds a fresh table from every route file and publishes it in one store.
    /// Files whose content is unchanged since the last scan are not re-parsed.
    pub fn scan(&self, tree: &dyn SourceTree, parser: &mut PhpParser) -> ScanCounts {
        let mut counts = ScanCounts::default();
        let mut table = RouteTable::default();
        let mut previous = self
            .files
            .lock()
            .map(|mut files| std::mem::take(&mut *files))
            .unwrap_or_default();
        let mut current: HashMap<String, ParsedFile> = HashMap::new();

        for rel in route_files(tree) {
            let Some(source) = read_or_skip(tree, &rel, &mut counts) else {
                continue;
            };
            let hash = hash_content(source.as_bytes());
            let routes = match previous.remove(&rel) {
                Some(file) if file.hash == hash => {
                    counts.reused += 1;
                    file.routes
                }
                _ => {
                    let Some(parsed) = parser.parse(&source) else {
                        debug!("no parse tree for {rel}");
                        continue;
                    };
                    let lines = LineIndex::new(&source);
                    scope::resolve_routes(parsed.root_node(), &source, &rel, &lines)
                }
            };
            debug!("{}: {} routes", file_name(&rel), routes.len());
            for route in &routes {
                table.insert(route.clone());
            }
            current.insert(rel, ParsedFile { hash, routes });
        }

        self.table.store(Arc::new(table));
        if let Ok(mut files) = self.files.lock() {
            *files = current;
        }
        counts
    }

    pub fn declarations(&self, key: &str) -> Vec<SiteHandle> {
        self.snapshot()
            .get(key)
            .map(|route| vec![route.declaration.clone()])
            .unwrap_or_default()
    }
}

/// Splits a route's action into its parts.
pub fn definition(route: &RouteInfo) -> RouteDefinition {
    let action = match route.controller.as_deref() {
        Some(CLOSURE_ACTION) => ActionDefinition {
            controller: None,
            method: None,
            namespace: route.namespace.clone(),
            is_closure: true,
        },
        Some(controller) => {
            let (class, method) = match controller.split_once('@') {
                Some((class, method)) => (class, Some(method.to_string())),
                None => (controller, Some("__invoke".to_string())),
            };
            let namespace = class
                .trim_start_matches('\\')
                .rsplit_once('\\')
                .map(|(ns, _)| ns.to_string())
                .or_else(|| route.namespace.clone());
            ActionDefinition {
                controller: Some(class.to_string()),
                method,
                namespace,
                is_closure: false,
            }
        }
        None => ActionDefinition {
            controller: None,
            method: None,
            namespace: route.namespace.clone(),
            is_closure: false,
        },
    };
    RouteDefinition {
        name: route.name.clone(),
        method: route.method.clone(),
        uri: route.path.clone(),
        action,
        middleware: route.middleware_sources.clone(),
        parameters: route.parameters.clone(),
        domain: route.domain.clone(),
        domain_parameters: route.domain_parameters.clone(),
        prefix: route.group_prefix.clone(),
        where_constraints: route.where_constraints.clone(),
        declaration: route.declaration.clone(),
    }
}

/// Drops a `?query` or `#fragment`; `?` inside `{user?}` marks an optional parameter.
fn without_query(url: &str) -> &str {
    let mut depth = 0usize;
    for (idx, ch) in url.char_indices() {
        match ch {
            '{' => depth += 1,
            '}' => depth = depth.saturating_sub(1),
            '?' | '#' if depth == 0 => return &url[..idx],
            _ => {}
        }
    }
    url
}
