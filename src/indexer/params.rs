use crate::model::{DomainParameter, ParamType, RouteParameter};
use std::collections::BTreeMap;

/// One `{name}`, `{name?}` or `{name:pattern}` segment.
#[derive(Debug, Clone, PartialEq, Eq)]
struct BraceParam {
    name: String,
    optional: bool,
    pattern: Option<String>,
    default: Option<String>,
}

fn brace_params(text: &str) -> Vec<BraceParam> {
    let re = crate::static_regex!(r"\{([^{}]+?)(\?)?\}");
    re.captures_iter(text)
        .filter_map(|caps| {
            let body = caps.get(1)?.as_str();
            let mut parts = body.split(':');
            let name = parts.next()?.trim().to_string();
            if name.is_empty() {
                return None;
            }
            Some(BraceParam {
                name,
                optional: caps.get(2).is_some(),
                pattern: parts.next().map(|s| s.to_string()),
                default: parts.next().map(|s| s.to_string()),
            })
        })
        .collect()
}

pub fn infer_type(pattern: Option<&str>, name: &str) -> ParamType {
    if let Some(pattern) = pattern {
        if pattern.contains(r"\d+") || pattern.contains("[0-9]+") {
            return ParamType::Integer;
        }
        if pattern.contains(r"\w+") {
            return ParamType::String;
        }
        if pattern.contains("[0-9a-fA-F]") {
            return ParamType::Hex;
        }
        if pattern.contains("^[A-Z]{2}$") {
            return ParamType::Alpha;
        }
        if pattern.contains("uuid") {
            return ParamType::Uuid;
        }
    }
    if name.ends_with("_id") || name.ends_with("Id") || name == "id" {
        return ParamType::Integer;
    }
    match name {
        "uuid" => ParamType::Uuid,
        "slug" => ParamType::Slug,
        _ if name.contains("date") => ParamType::Date,
        _ if name.contains("time") => ParamType::Datetime,
        _ if name.contains("email") => ParamType::Email,
        _ if name.contains("phone") => ParamType::Phone,
        _ if name.contains("url") => ParamType::Url,
        _ => ParamType::String,
    }
}

/// Parameters of a resolved route path. `where` constraints fill in patterns
/// for segments that carry none inline.
pub fn route_parameters(path: &str, constraints: &BTreeMap<String, String>) -> Vec<RouteParameter> {
    brace_params(path)
        .into_iter()
        .map(|param| {
            let pattern = param
                .pattern
                .or_else(|| constraints.get(&param.name).cloned());
            RouteParameter {
                inferred_type: infer_type(pattern.as_deref(), &param.name),
                name: param.name,
                optional: param.optional,
                constraint_pattern: pattern,
            }
        })
        .collect()
}

pub fn domain_parameters(domain: &str) -> Vec<DomainParameter> {
    brace_params(domain)
        .into_iter()
        .map(|param| DomainParameter {
            name: param.name,
            optional: param.optional,
            pattern: param.pattern,
            default: param.default,
        })
        .collect()
}

pub const NUMBER_PATTERN: &str = "[0-9]+";
pub const ALPHA_PATTERN: &str = "[a-zA-Z]+";
pub const ALPHA_NUMERIC_PATTERN: &str = "[a-zA-Z0-9]+";
pub const UUID_PATTERN: &str =
    "[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}";

/// Pattern implied by a `whereNumber`-style helper.
pub fn helper_pattern(method: &str) -> Option<&'static str> {
    match method {
        "whereNumber" => Some(NUMBER_PATTERN),
        "whereAlpha" => Some(ALPHA_PATTERN),
        "whereAlphaNumeric" => Some(ALPHA_NUMERIC_PATTERN),
        "whereUuid" => Some(UUID_PATTERN),
        _ => None,
    }
}

/// `throttle:60,1` as (`throttle`, [`60`, `1`]).
pub fn split_middleware(raw: &str) -> (String, Vec<String>) {
    match raw.split_once(':') {
        Some((name, params)) => (
            name.to_string(),
            params
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
        ),
        None => (raw.to_string(), Vec::new()),
    }
}
