//! Text patterns for route references the structural pass cannot see:
//! Blade markup and client-side scripts.

use crate::grammar::route::RouteHelper;
use crate::util::file_name;
use regex::Regex;
use std::sync::OnceLock;

pub struct TextPattern {
    pub regex: Regex,
    pub helper: RouteHelper,
}

/// A capture that may name a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextMatch<'a> {
    pub text: &'a str,
    pub start: usize,
    pub end: usize,
    pub helper: RouteHelper,
}

const BLADE: &[(&str, RouteHelper)] = &[
    (r#"\{\{\s*route\(['"]([^'"]+)['"]\s*(?:\}|,|\))"#, RouteHelper::Name),
    (r#"@route\(['"]([^'"]+)['"]\s*(?:\)|,)"#, RouteHelper::Name),
    (r#"\{\{\s*url\(['"]([^'"]+)['"]\s*(?:\}|,|\))"#, RouteHelper::Url),
    (r#"\{\{\s*action\(['"]([^'"]+)['"]\s*(?:\}|,|\))"#, RouteHelper::Action),
    (r#"href\s*=\s*["']\{\{\s*route\(['"]([^'"]+)['"]\s*(?:\}|,|\))"#, RouteHelper::Name),
    (r#"action\s*=\s*["']\{\{\s*route\(['"]([^'"]+)['"]\s*(?:\}|,|\))"#, RouteHelper::Name),
    (r#"wire:navigate\.href\s*=\s*["']\{\{\s*route\(['"]([^'"]+)['"]\s*(?:\}|,|\))"#, RouteHelper::Name),
];

const SCRIPT: &[(&str, RouteHelper)] = &[
    (r#"route\(['"]([^'"]+)['"]\s*[),]"#, RouteHelper::Name),
    (r#"this\.\$router\.push\(\s*\{\s*name:\s*['"]([^'"]+)['"]\s*\}"#, RouteHelper::Name),
    (r#"(?s)const\s+router\s*=\s*useRouter\(\).*?router\.push\(\s*\{\s*name:\s*['"]([^'"]+)['"]\s*\}"#, RouteHelper::Name),
    (r#"useRouter\(\)\.push\(\s*\{\s*name:\s*['"]([^'"]+)['"]\s*\}"#, RouteHelper::Name),
    (r#"this\.\$inertia\.visit\(\s*['"]([^'"]+)['"]\s*[),]"#, RouteHelper::Name),
    (r#"Inertia\.visit\(\s*['"]([^'"]+)['"]\s*[),]"#, RouteHelper::Name),
    (r#"router\.visit\(\s*['"]([^'"]+)['"]\s*[),]"#, RouteHelper::Name),
    (r#"(?s)const\s*\{\s*visit\s*\}\s*=\s*router.*?visit\(\s*['"]([^'"]+)['"]\s*[),]"#, RouteHelper::Name),
];

const VUE: &[(&str, RouteHelper)] = &[
    (r#":to="\{\s*name:\s*['"]([^'"]+)['"]\s*\}"#, RouteHelper::Name),
    (r#"\bto="\{\s*name:\s*['"]([^'"]+)['"]\s*\}"#, RouteHelper::Name),
    (r#"(?s)const\s+router\s*=\s*useRouter\(\).*?router\.push\(\s*\{\s*name:\s*['"]([^'"]+)['"]\s*\}"#, RouteHelper::Name),
    (r#"this\.\$router\.push\(\s*\{\s*name:\s*['"]([^'"]+)['"]\s*\}"#, RouteHelper::Name),
    (r#"route\(['"]([^'"]+)['"]\s*[),]"#, RouteHelper::Name),
    (r#"<Link\s+:href="route\(['"]([^'"]+)['"]\s*[),]"#, RouteHelper::Name),
    (r#"<Link\s+href="([^'"]+)""#, RouteHelper::Url),
    (r#"(?s)const\s*\{\s*visit\s*\}\s*=\s*useForm\(.*?visit\(\s*['"]([^'"]+)['"]\s*[),]"#, RouteHelper::Name),
    (r#"this\.\$inertia\.visit\(\s*['"]([^'"]+)['"]\s*[),]"#, RouteHelper::Name),
    (r#"(?s)methods:\s*\{[^}]*?['"]([^'"]+)['"]\s*[),]"#, RouteHelper::Name),
    (r#"(?s)computed:\s*\{[^}]*?['"]([^'"]+)['"]\s*[),]"#, RouteHelper::Name),
    (r#"(?s)const\s+router\s*=\s*useRouter\(\).*?name:\s*['"]([^'"]+)['"]\s*\}"#, RouteHelper::Name),
];

fn compile(specs: &[(&str, RouteHelper)]) -> Vec<TextPattern> {
    specs
        .iter()
        .map(|(pattern, helper)| TextPattern {
            regex: Regex::new(pattern).expect("static regex must compile"),
            helper: *helper,
        })
        .collect()
}

pub fn blade_patterns() -> &'static [TextPattern] {
    static PATTERNS: OnceLock<Vec<TextPattern>> = OnceLock::new();
    PATTERNS.get_or_init(|| compile(BLADE))
}

pub fn script_patterns() -> &'static [TextPattern] {
    static PATTERNS: OnceLock<Vec<TextPattern>> = OnceLock::new();
    PATTERNS.get_or_init(|| compile(SCRIPT))
}

pub fn vue_patterns() -> &'static [TextPattern] {
    static PATTERNS: OnceLock<Vec<TextPattern>> = OnceLock::new();
    PATTERNS.get_or_init(|| compile(VUE))
}

/// Pattern table for a client-side file.
pub fn script_patterns_for(rel: &str) -> &'static [TextPattern] {
    if file_name(rel).ends_with(".vue") {
        vue_patterns()
    } else {
        script_patterns()
    }
}

/// Every capture of every pattern, in table order.
pub fn find_all<'a>(patterns: &[TextPattern], content: &'a str) -> Vec<TextMatch<'a>> {
    let mut out = Vec::new();
    for pattern in patterns {
        for caps in pattern.regex.captures_iter(content) {
            if let Some(capture) = caps.get(1) {
                out.push(TextMatch {
                    text: capture.as_str(),
                    start: capture.start(),
                    end: capture.end(),
                    helper: pattern.helper,
                });
            }
        }
    }
    out
}
