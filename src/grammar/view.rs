use super::{ArgumentOwner, LiteralSite, route};
use crate::source::php::CallSite;
use crate::source::template::DIRECTIVE_CALL;

pub const VIEW_FUNCTIONS: &[&str] = &["view", "markdown", "render", "renderView"];

pub const VIEW_DIRECTIVES: &[&str] = &[
    "include",
    "extends",
    "component",
    "livewire",
    "each",
    "includeIf",
    "includeWhen",
    "includeUnless",
    "includeFirst",
    "yield",
];

fn facade_is(scope: &str, class: &str) -> bool {
    scope == class || scope.ends_with(&format!("\\{class}"))
}

/// Second argument of `Route::view('/welcome', 'welcome')` or `$router->view(..)`.
pub fn is_route_view_target(owner: &ArgumentOwner<'_>, source: &str) -> bool {
    owner.index == 1
        && !owner.nested
        && owner.site.name() == "view"
        && route::is_router_root(owner.call, source)
}

pub fn classify(site: &LiteralSite<'_>) -> bool {
    if site.is_blank() {
        return false;
    }
    let Some(owner) = site.owner() else {
        return false;
    };
    match owner.site {
        // directives take view names in several positions
        CallSite::Function { name } if name == DIRECTIVE_CALL => site
            .directive
            .map(|d| VIEW_DIRECTIVES.contains(&d))
            .unwrap_or(false),
        CallSite::Function { name } => owner.index == 0 && VIEW_FUNCTIONS.contains(&name),
        CallSite::Static { scope, name } => {
            let first = owner.index == 0;
            (first
                && facade_is(scope, "View")
                && matches!(name, "make" | "first" | "renderWhen" | "renderUnless" | "composer"))
                || (first
                    && facade_is(scope, "Blade")
                    && matches!(name, "render" | "renderComponent" | "compile"))
                || (first && facade_is(scope, "Response") && name == "view")
                || is_route_view_target(&owner, site.source)
        }
        CallSite::Member { .. } => is_route_view_target(&owner, site.source),
    }
}
