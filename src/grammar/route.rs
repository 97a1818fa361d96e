use super::LiteralSite;
use crate::source::php::{self, CallSite};
use crate::source::template::DIRECTIVE_CALL;
use tree_sitter::Node;

/// Which helper a route reference goes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteHelper {
    /// `route()`, `to_route()`, `->route()`, `@route`.
    Name,
    /// `url()`, `@url`.
    Url,
    /// `action()`.
    Action,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteRole {
    Reference(RouteHelper),
    /// Part of a route declaration (path, name, action, group attribute).
    Definition,
}

pub const ROUTE_VERBS: &[&str] = &[
    "get", "post", "put", "patch", "delete", "options", "any", "match",
];

const ROUTER_VARIABLES: &[&str] = &["$router"];

pub fn is_route_facade(scope: &str) -> bool {
    let scope = scope.trim_start_matches('\\');
    scope == "Route" || scope.ends_with("\\Route")
}

/// Innermost call of a fluent chain (`Route::prefix(..)` in `Route::prefix(..)->group(..)`).
pub fn chain_root(call: Node<'_>) -> Node<'_> {
    let mut current = call;
    while matches!(
        current.kind(),
        "member_call_expression" | "nullsafe_member_call_expression"
    ) {
        match current.child_by_field_name("object") {
            Some(object) if php::is_call(object) => current = object,
            _ => break,
        }
    }
    current
}

/// True when `root` is a call on the routing facade or a router variable.
pub fn is_router_root(root: Node<'_>, source: &str) -> bool {
    match php::call_site(root, source) {
        Some(CallSite::Static { scope, .. }) => is_route_facade(scope),
        Some(CallSite::Member { object, .. }) => {
            object.kind() == "variable_name"
                && ROUTER_VARIABLES.contains(&php::node_text(object, source).trim())
        }
        _ => false,
    }
}

pub fn is_route_chain(call: Node<'_>, source: &str) -> bool {
    is_router_root(chain_root(call), source)
}

/// `'index'` in `[UserController::class, 'index']`.
pub fn is_controller_action_literal(site: &LiteralSite<'_>) -> bool {
    let Some((array, is_key)) = php::enclosing_array(site.node) else {
        return false;
    };
    if is_key {
        return false;
    }
    let entries = php::array_entries(array);
    if entries.len() != 2 || entries.iter().any(|entry| entry.key.is_some()) {
        return false;
    }
    let has_literal = entries.iter().any(|entry| entry.value.id() == site.node.id());
    let has_class = entries
        .iter()
        .any(|entry| php::class_constant(entry.value, site.source).is_some());
    has_literal && has_class
}

pub fn classify(site: &LiteralSite<'_>) -> Option<RouteRole> {
    if site.is_blank() {
        return None;
    }
    let owner = site.owner()?;
    let controller_literal = is_controller_action_literal(site);

    match owner.site {
        CallSite::Function { name } if name == DIRECTIVE_CALL => {
            return match (site.directive, owner.is_direct_first()) {
                (Some("route"), true) => Some(RouteRole::Reference(RouteHelper::Name)),
                (Some("url"), true) => Some(RouteRole::Reference(RouteHelper::Url)),
                (Some("action"), _) if owner.index == 0 => {
                    Some(RouteRole::Reference(RouteHelper::Action))
                }
                _ => None,
            };
        }
        CallSite::Function { name } => {
            return match name {
                "route" | "to_route" if owner.is_direct_first() => {
                    Some(RouteRole::Reference(RouteHelper::Name))
                }
                "url" if owner.is_direct_first() => Some(RouteRole::Reference(RouteHelper::Url)),
                "action" if owner.index == 0 => Some(RouteRole::Reference(RouteHelper::Action)),
                _ => None,
            };
        }
        _ => {}
    }

    // the template slot of `Route::view` belongs to the view grammar
    if super::view::is_route_view_target(&owner, site.source) {
        return None;
    }
    if is_route_chain(owner.call, site.source) {
        return Some(RouteRole::Definition);
    }
    if controller_literal {
        return None;
    }
    if owner.site.name() == "route" && owner.is_direct_first() {
        return Some(RouteRole::Reference(RouteHelper::Name));
    }
    None
}
