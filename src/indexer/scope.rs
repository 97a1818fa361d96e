//! Route declarations are resolved in one top-down walk. Every group call
//! derives a new [`RouteScope`] from its parent and hands it to the callback
//! body; nothing is ever written back to the parent scope.

use crate::grammar::route::{ROUTE_VERBS, chain_root, is_router_root};
use crate::indexer::params;
use crate::model::{CLOSURE_ACTION, MiddlewareRef, MiddlewareSource, RouteInfo, SiteHandle};
use crate::normalize;
use crate::source::LineIndex;
use crate::source::php::{self, CallSite};
use std::collections::BTreeMap;
use tree_sitter::Node;

/// Inherited route attributes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteScope {
    pub prefix: String,
    pub name_prefix: String,
    pub middleware: Vec<String>,
    pub domain: Option<String>,
    pub namespace: Option<String>,
    pub controller: Option<String>,
}

/// Attributes collected from one grouping construct.
#[derive(Debug, Default)]
struct GroupAttributes {
    prefix: Option<String>,
    name: Option<String>,
    middleware: Vec<String>,
    domain: Option<String>,
    namespace: Option<String>,
    controller: Option<String>,
}

impl GroupAttributes {
    fn is_empty(&self) -> bool {
        self.prefix.is_none()
            && self.name.is_none()
            && self.middleware.is_empty()
            && self.domain.is_none()
            && self.namespace.is_none()
            && self.controller.is_none()
    }
}

impl RouteScope {
    fn descend(&self, attrs: &GroupAttributes) -> RouteScope {
        let mut next = self.clone();
        if let Some(prefix) = &attrs.prefix {
            next.prefix = normalize::join_prefix(&self.prefix, prefix);
        }
        if let Some(name) = &attrs.name {
            next.name_prefix = normalize::join_name(&self.name_prefix, name);
        }
        for middleware in &attrs.middleware {
            if !next.middleware.contains(middleware) {
                next.middleware.push(middleware.clone());
            }
        }
        if let Some(domain) = &attrs.domain {
            next.domain = Some(normalize::normalize_domain(domain));
        }
        if let Some(namespace) = &attrs.namespace {
            let namespace = namespace.trim_matches('\\');
            next.namespace = Some(match (&self.namespace, namespace.is_empty()) {
                (Some(outer), false) => format!("{outer}\\{namespace}"),
                (Some(outer), true) => outer.clone(),
                (None, _) => namespace.to_string(),
            });
        }
        if let Some(controller) = &attrs.controller {
            next.controller = Some(controller.clone());
        }
        next
    }
}

/// One call in a fluent chain, root first.
#[derive(Debug, Clone)]
struct Link<'a> {
    name: String,
    node: Node<'a>,
    name_node: Option<Node<'a>>,
    args: Vec<Node<'a>>,
}

struct Resolver<'a> {
    source: &'a str,
    file: &'a str,
    lines: &'a LineIndex,
    out: Vec<RouteInfo>,
}

/// Every route declared in one parsed route file, in source order.
pub fn resolve_routes(root: Node<'_>, source: &str, file: &str, lines: &LineIndex) -> Vec<RouteInfo> {
    let mut resolver = Resolver {
        source,
        file,
        lines,
        out: Vec::new(),
    };
    resolver.walk(root, &RouteScope::default());
    resolver.out
}

fn decompose<'a>(outer: Node<'a>, source: &'a str) -> Vec<Link<'a>> {
    let mut links = Vec::new();
    let mut current = Some(outer);
    while let Some(node) = current {
        if !php::is_call(node) {
            break;
        }
        let Some(site) = php::call_site(node, source) else {
            break;
        };
        links.push(Link {
            name: site.name().to_string(),
            node,
            name_node: node.child_by_field_name("name"),
            args: php::call_arguments(node),
        });
        current = match site {
            CallSite::Member { object, .. } => Some(object),
            _ => None,
        };
    }
    links.reverse();
    links
}

fn is_verb(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    ROUTE_VERBS.contains(&lower.as_str()) || matches!(name, "view" | "redirect" | "permanentRedirect")
}

/// Chain links that may precede a declaration or a `group` call.
fn is_scope_link(name: &str) -> bool {
    matches!(
        name,
        "prefix" | "name" | "as" | "middleware" | "withoutMiddleware" | "domain" | "namespace" | "controller"
    )
}

fn is_resource(name: &str) -> bool {
    matches!(name, "resource" | "apiResource" | "singleton" | "apiSingleton")
}

impl<'a> Resolver<'a> {
    fn walk(&mut self, node: Node<'a>, scope: &RouteScope) {
        if php::is_call(node) && is_router_root(chain_root(node), self.source) {
            self.handle_chain(node, scope);
            return;
        }
        let mut cursor = node.walk();
        let children: Vec<Node<'a>> = node.named_children(&mut cursor).collect();
        for child in children {
            self.walk(child, scope);
        }
    }

    fn handle_chain(&mut self, outer: Node<'a>, scope: &RouteScope) {
        let links = decompose(outer, self.source);
        let group_at = links.iter().position(|link| link.name == "group");
        let decl_at = links
            .iter()
            .position(|link| is_verb(&link.name) || is_resource(&link.name));
        let scoped_up_to = |end: usize| links[..end].iter().all(|link| is_scope_link(&link.name));
        let group_at = group_at.filter(|idx| scoped_up_to(*idx));
        let decl_at = decl_at.filter(|idx| scoped_up_to(*idx));

        match (group_at, decl_at) {
            (Some(group), decl) if decl.map(|d| group < d).unwrap_or(true) => {
                self.handle_group(&links, group, scope);
            }
            (_, Some(decl)) => {
                let mut attrs = GroupAttributes::default();
                for link in &links[..decl] {
                    self.collect_link_attribute(link, &mut attrs);
                }
                let scope = if attrs.is_empty() {
                    scope.clone()
                } else {
                    scope.descend(&attrs)
                };
                if is_resource(&links[decl].name) {
                    self.handle_resource(&links[decl], &links[decl + 1..], &scope);
                } else {
                    self.handle_declaration(&links[decl], &links[decl + 1..], &scope);
                }
            }
            _ => {
                // not a declaration; callbacks may still hold routes
                for link in &links {
                    for arg in &link.args {
                        if php::is_closure(*arg) {
                            self.walk(*arg, scope);
                        }
                    }
                }
            }
        }
    }

    fn handle_group(&mut self, links: &[Link<'a>], group: usize, scope: &RouteScope) {
        let mut attrs = GroupAttributes::default();
        for link in &links[..group] {
            self.collect_link_attribute(link, &mut attrs);
        }
        let group_link = &links[group];
        for arg in &group_link.args {
            if php::is_array(*arg) {
                self.collect_array_attributes(*arg, &mut attrs);
            }
        }
        let inner = scope.descend(&attrs);
        for arg in &group_link.args {
            if php::is_closure(*arg) {
                self.walk(*arg, &inner);
            }
        }
    }

    fn collect_link_attribute(&self, link: &Link<'a>, attrs: &mut GroupAttributes) {
        let first = link.args.first().copied();
        let text = first.and_then(|arg| php::string_literal(arg, self.source));
        match link.name.as_str() {
            "prefix" => attrs.prefix = text.or(attrs.prefix.take()),
            "name" | "as" => {
                if let Some(name) = text {
                    attrs.name = Some(match attrs.name.take() {
                        Some(outer) => normalize::join_name(&outer, &name),
                        None => name,
                    });
                }
            }
            "middleware" => {
                if let Some(arg) = first {
                    attrs.middleware.extend(php::string_list(arg, self.source));
                }
            }
            "domain" => attrs.domain = text.or(attrs.domain.take()),
            "namespace" => attrs.namespace = text.or(attrs.namespace.take()),
            "controller" => {
                attrs.controller = first
                    .and_then(|arg| class_or_string(arg, self.source))
                    .or(attrs.controller.take());
            }
            _ => {}
        }
    }

    fn collect_array_attributes(&self, array: Node<'a>, attrs: &mut GroupAttributes) {
        let source = self.source;
        if let Some(prefix) = php::array_get_string(array, "prefix", source) {
            attrs.prefix = Some(match attrs.prefix.take() {
                Some(outer) => normalize::join_prefix(&outer, &prefix),
                None => prefix,
            });
        }
        if let Some(name) = php::array_get_string(array, "as", source) {
            attrs.name = Some(match attrs.name.take() {
                Some(outer) => normalize::join_name(&outer, &name),
                None => name,
            });
        }
        if let Some(value) = php::array_get(array, "middleware", source) {
            attrs.middleware.extend(php::string_list(value, source));
        }
        if let Some(domain) = php::array_get_string(array, "domain", source) {
            attrs.domain = Some(domain);
        }
        if let Some(namespace) = php::array_get_string(array, "namespace", source) {
            attrs.namespace = Some(namespace);
        }
        if let Some(controller) =
            php::array_get(array, "controller", source).and_then(|v| class_or_string(v, source))
        {
            attrs.controller = Some(controller);
        }
    }

    fn site_for(&self, link: &Link<'a>) -> SiteHandle {
        let anchor = link.name_node.unwrap_or(link.node);
        SiteHandle::new(
            self.file,
            self.lines.line_of(anchor.start_byte()),
            link.node.start_byte(),
            link.node.end_byte(),
        )
    }

    fn handle_declaration(&mut self, verb: &Link<'a>, tail: &[Link<'a>], scope: &RouteScope) {
        let source = self.source;
        let lower = verb.name.to_ascii_lowercase();
        let is_match = lower == "match";
        let method = match lower.as_str() {
            "match" => match_methods(verb.args.first().copied(), source),
            "any" => "ANY".to_string(),
            "view" | "redirect" | "permanentredirect" => "GET".to_string(),
            other => other.to_ascii_uppercase(),
        };
        let path_arg = verb.args.get(if is_match { 1 } else { 0 }).copied();
        let action_arg = verb.args.get(if is_match { 2 } else { 1 }).copied();

        let raw_path = path_arg
            .and_then(|arg| {
                php::string_literal(arg, source).or_else(|| {
                    php::array_get_string(arg, "uri", source)
                        .or_else(|| php::array_get_string(arg, "path", source))
                })
            })
            .unwrap_or_default();

        let own = self.own_attributes(tail);
        let own_name = own.name.clone().or_else(|| {
            action_arg
                .filter(|arg| php::is_array(*arg))
                .and_then(|arg| php::array_get_string(arg, "as", source))
        });
        let controller = if matches!(lower.as_str(), "view" | "redirect" | "permanentredirect") {
            None
        } else {
            action_arg.and_then(|arg| action_string(arg, scope, source))
        };

        let info = self.build_info(
            method,
            &raw_path,
            own_name.as_deref(),
            controller,
            &own,
            scope,
            self.site_for(verb),
        );
        self.out.push(info);
    }

    fn own_attributes(&self, tail: &[Link<'a>]) -> OwnAttributes {
        let source = self.source;
        let mut own = OwnAttributes::default();
        for link in tail {
            let first = link.args.first().copied();
            match link.name.as_str() {
                "name" => {
                    if let Some(name) = first.and_then(|a| php::string_literal(a, source)) {
                        own.name = Some(name);
                    }
                }
                "middleware" => {
                    if let Some(arg) = first {
                        own.middleware.extend(php::string_list(arg, source));
                    }
                }
                "withoutMiddleware" => {
                    if let Some(arg) = first {
                        own.without_middleware.extend(php::string_list(arg, source));
                    }
                }
                "domain" => {
                    if let Some(domain) = first.and_then(|a| php::string_literal(a, source)) {
                        own.domain = Some(normalize::normalize_domain(&domain));
                    }
                }
                "where" => match first {
                    Some(arg) if php::is_array(arg) => {
                        for entry in php::array_entries(arg) {
                            let key = entry.key.and_then(|k| php::string_literal(k, source));
                            let value = php::string_literal(entry.value, source);
                            if let (Some(key), Some(value)) = (key, value) {
                                own.where_constraints.insert(key, value);
                            }
                        }
                    }
                    Some(arg) => {
                        let key = php::string_literal(arg, source);
                        let value = link
                            .args
                            .get(1)
                            .and_then(|a| php::string_literal(*a, source));
                        if let (Some(key), Some(value)) = (key, value) {
                            own.where_constraints.insert(key, value);
                        }
                    }
                    None => {}
                },
                "only" => own.only = first.map(|a| php::string_list(a, source)),
                "except" => {
                    if let Some(arg) = first {
                        own.except.extend(php::string_list(arg, source));
                    }
                }
                "names" => match first {
                    Some(arg) if php::is_array(arg) => {
                        for entry in php::array_entries(arg) {
                            let key = entry.key.and_then(|k| php::string_literal(k, source));
                            let value = php::string_literal(entry.value, source);
                            if let (Some(key), Some(value)) = (key, value) {
                                own.names.insert(key, value);
                            }
                        }
                    }
                    Some(arg) => own.names_prefix = php::string_literal(arg, source),
                    None => {}
                },
                other => {
                    if let Some(pattern) = params::helper_pattern(other) {
                        for name in first.map(|a| php::string_list(a, source)).unwrap_or_default() {
                            own.where_constraints.insert(name, pattern.to_string());
                        }
                    }
                }
            }
        }
        own
    }

    #[allow(clippy::too_many_arguments)]
    fn build_info(
        &self,
        method: String,
        raw_path: &str,
        own_name: Option<&str>,
        controller: Option<String>,
        own: &OwnAttributes,
        scope: &RouteScope,
        declaration: SiteHandle,
    ) -> RouteInfo {
        let path = normalize::build_full_path(raw_path, &scope.prefix);
        let name = normalize::build_full_name(own_name, &scope.name_prefix);

        let mut middleware: Vec<String> = Vec::new();
        let mut middleware_sources: Vec<MiddlewareRef> = Vec::new();
        let inherited = scope
            .middleware
            .iter()
            .map(|m| (m, MiddlewareSource::Group));
        let direct = own.middleware.iter().map(|m| (m, MiddlewareSource::Route));
        for (entry, source) in inherited.chain(direct) {
            if own.without_middleware.contains(entry) || middleware.contains(entry) {
                continue;
            }
            middleware.push(entry.clone());
            let (name, parameters) = params::split_middleware(entry);
            middleware_sources.push(MiddlewareRef {
                name,
                parameters,
                source,
            });
        }

        let domain = own.domain.clone().or_else(|| scope.domain.clone());
        let domain_parameters = domain
            .as_deref()
            .map(params::domain_parameters)
            .unwrap_or_default();
        let parameters = params::route_parameters(&path, &own.where_constraints);

        RouteInfo {
            name,
            method,
            path,
            controller,
            middleware,
            middleware_sources,
            domain,
            domain_parameters,
            parameters,
            where_constraints: own.where_constraints.clone(),
            group_prefix: scope.prefix.clone(),
            namespace: scope.namespace.clone(),
            declaration,
        }
    }

    fn handle_resource(&mut self, link: &Link<'a>, tail: &[Link<'a>], scope: &RouteScope) {
        let source = self.source;
        let Some(resource) = link
            .args
            .first()
            .and_then(|arg| php::string_literal(*arg, source))
        else {
            return;
        };
        let controller = link
            .args
            .get(1)
            .and_then(|arg| class_or_string(*arg, source))
            .map(|c| qualify(&c, scope, false));
        let own = self.own_attributes(tail);
        let actions = resource_actions(&link.name);
        let (base_path, default_name) = resource_path(&resource, link.name.contains("ingleton"));

        for action in actions {
            if let Some(only) = &own.only {
                if !only.iter().any(|o| o == action.name) {
                    continue;
                }
            }
            if own.except.iter().any(|e| e == action.name) {
                continue;
            }
            let path = format!("{}{}", base_path.path, action.suffix.replace("{}", &base_path.param));
            let own_name = own.names.get(action.name).cloned().unwrap_or_else(|| {
                let prefix = own.names_prefix.as_deref().unwrap_or(&default_name);
                format!("{prefix}.{}", action.name)
            });
            let action_controller = controller.as_ref().map(|c| format!("{c}@{}", action.name));
            let info = self.build_info(
                action.method.to_string(),
                &path,
                Some(&own_name),
                action_controller,
                &own,
                scope,
                self.site_for(link).expanded(action.name),
            );
            self.out.push(info);
        }
    }
}

#[derive(Debug, Default)]
struct OwnAttributes {
    name: Option<String>,
    middleware: Vec<String>,
    without_middleware: Vec<String>,
    domain: Option<String>,
    where_constraints: BTreeMap<String, String>,
    only: Option<Vec<String>>,
    except: Vec<String>,
    names: BTreeMap<String, String>,
    names_prefix: Option<String>,
}

fn match_methods(arg: Option<Node<'_>>, source: &str) -> String {
    let methods: Vec<String> = arg
        .map(|a| php::string_list(a, source))
        .unwrap_or_default()
        .into_iter()
        .map(|m| m.to_ascii_uppercase())
        .collect();
    if methods.is_empty() {
        "GET".to_string()
    } else {
        methods.join("|")
    }
}

fn class_or_string(node: Node<'_>, source: &str) -> Option<String> {
    php::class_constant(node, source).or_else(|| php::string_literal(node, source))
}

/// Group namespaces apply to string controllers unless fully qualified.
fn qualify(controller: &str, scope: &RouteScope, is_string: bool) -> String {
    match &scope.namespace {
        Some(namespace) if is_string && !controller.starts_with('\\') && !namespace.is_empty() => {
            format!("{namespace}\\{controller}")
        }
        _ => controller.to_string(),
    }
}

fn action_string(arg: Node<'_>, scope: &RouteScope, source: &str) -> Option<String> {
    if php::is_closure(arg) {
        return Some(CLOSURE_ACTION.to_string());
    }
    if let Some(class) = php::class_constant(arg, source) {
        return Some(class);
    }
    if let Some(text) = php::string_literal(arg, source) {
        return Some(match &scope.controller {
            Some(controller) if !text.contains('@') => format!("{controller}@{text}"),
            _ => qualify(&text, scope, true),
        });
    }
    if php::is_array(arg) {
        if let Some(uses) = php::array_get(arg, "uses", source) {
            return action_string(uses, scope, source);
        }
        let entries = php::array_entries(arg);
        let positional: Vec<Node<'_>> = entries
            .iter()
            .filter(|e| e.key.is_none())
            .map(|e| e.value)
            .collect();
        if let [class_node, method_node, ..] = positional.as_slice() {
            let method = php::string_literal(*method_node, source)?;
            let class = match php::class_constant(*class_node, source) {
                Some(class) => class,
                None => qualify(&php::string_literal(*class_node, source)?, scope, true),
            };
            return Some(format!("{class}@{method}"));
        }
        if positional.iter().any(|n| php::is_closure(*n)) {
            return Some(CLOSURE_ACTION.to_string());
        }
    }
    None
}

struct ResourceAction {
    name: &'static str,
    method: &'static str,
    /// Appended to the resource path; `{}` is the member parameter.
    suffix: &'static str,
}

const RESOURCE_ACTIONS: &[ResourceAction] = &[
    ResourceAction { name: "index", method: "GET", suffix: "" },
    ResourceAction { name: "create", method: "GET", suffix: "/create" },
    ResourceAction { name: "store", method: "POST", suffix: "" },
    ResourceAction { name: "show", method: "GET", suffix: "/{}" },
    ResourceAction { name: "edit", method: "GET", suffix: "/{}/edit" },
    ResourceAction { name: "update", method: "PUT|PATCH", suffix: "/{}" },
    ResourceAction { name: "destroy", method: "DELETE", suffix: "/{}" },
];

const SINGLETON_ACTIONS: &[ResourceAction] = &[
    ResourceAction { name: "show", method: "GET", suffix: "" },
    ResourceAction { name: "edit", method: "GET", suffix: "/edit" },
    ResourceAction { name: "update", method: "PUT|PATCH", suffix: "" },
];

fn resource_actions(kind: &str) -> Vec<&'static ResourceAction> {
    match kind {
        "apiResource" => RESOURCE_ACTIONS
            .iter()
            .filter(|a| !matches!(a.name, "create" | "edit"))
            .collect(),
        "singleton" => SINGLETON_ACTIONS.iter().collect(),
        "apiSingleton" => SINGLETON_ACTIONS.iter().filter(|a| a.name != "edit").collect(),
        _ => RESOURCE_ACTIONS.iter().collect(),
    }
}

struct ResourcePath {
    path: String,
    /// `{photo}` for `photos`.
    param: String,
}

/// `photos.comments` as `/photos/{photo}/comments` with member `{comment}`.
fn resource_path(resource: &str, singleton: bool) -> (ResourcePath, String) {
    let segments: Vec<&str> = resource.split('.').filter(|s| !s.is_empty()).collect();
    let mut path = String::new();
    for (idx, segment) in segments.iter().enumerate() {
        path.push('/');
        path.push_str(segment);
        if idx + 1 < segments.len() {
            path.push_str(&format!("/{{{}}}", singular(segment)));
        }
    }
    let last = segments.last().copied().unwrap_or(resource);
    let param = if singleton {
        String::new()
    } else {
        format!("{{{}}}", singular(last))
    };
    (ResourcePath { path, param }, segments.join("."))
}

fn singular(segment: &str) -> String {
    let word = segment.replace('-', "_");
    if let Some(stem) = word.strip_suffix("ies") {
        format!("{stem}y")
    } else if word.ends_with("sses") || word.ends_with("xes") || word.ends_with("ches") {
        word[..word.len() - 2].to_string()
    } else if let Some(stem) = word.strip_suffix('s') {
        if stem.ends_with('s') { word.clone() } else { stem.to_string() }
    } else {
        word
    }
}
