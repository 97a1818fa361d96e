//! Canonical key forms for each artifact domain.

/// Route path with exactly one leading slash, no repeated or trailing slashes.
pub fn normalize_route_path(raw: &str) -> String {
    let segments: Vec<&str> = raw.split('/').filter(|s| !s.is_empty()).collect();
    if segments.is_empty() {
        "/".to_string()
    } else {
        format!("/{}", segments.join("/"))
    }
}

/// Prepends an inherited prefix to a route's own path.
pub fn build_full_path(own: &str, prefix: &str) -> String {
    let own = own.trim_matches('/');
    let prefix = prefix.trim_matches('/');
    let joined = match (prefix.is_empty(), own.is_empty()) {
        (false, false) => format!("/{prefix}/{own}"),
        (true, _) => format!("/{own}"),
        (false, true) => format!("/{prefix}"),
    };
    normalize_route_path(&joined)
}

/// Composes a group prefix string (without normalising to a route path).
pub fn join_prefix(outer: &str, inner: &str) -> String {
    let outer = outer.trim_matches('/');
    let inner = inner.trim_matches('/');
    match (outer.is_empty(), inner.is_empty()) {
        (true, _) => inner.to_string(),
        (false, true) => outer.to_string(),
        (false, false) => format!("{outer}/{inner}"),
    }
}

/// Prepends an inherited name prefix; a route without its own name stays unnamed.
pub fn build_full_name(own: Option<&str>, prefix: &str) -> Option<String> {
    let own = own?;
    let joined = join_name(prefix, own);
    if joined.is_empty() { None } else { Some(joined) }
}

/// Dot-joins two name parts, suppressing empty segments.
pub fn join_name(outer: &str, inner: &str) -> String {
    outer
        .split('.')
        .chain(inner.split('.'))
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(".")
}

pub fn normalize_domain(raw: &str) -> String {
    let trimmed = raw.trim();
    let without_scheme = trimmed
        .strip_prefix("https://")
        .or_else(|| trimmed.strip_prefix("http://"))
        .unwrap_or(trimmed);
    without_scheme.trim_end_matches('/').to_string()
}

pub const BLADE_SUFFIX: &str = ".blade.php";

/// Converts a template path relative to its views root to a dot name.
pub fn view_name_from_relative(relative: &str) -> String {
    let stripped = relative
        .strip_suffix(BLADE_SUFFIX)
        .or_else(|| relative.strip_suffix(".php"))
        .unwrap_or(relative);
    stripped
        .split('/')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(".")
}

/// Lookup variants for a view reference, original first, without duplicates.
pub fn view_name_variants(name: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    let candidates = [
        name.to_string(),
        name.replace('/', "."),
        name.replace('.', "/"),
        name.strip_suffix(BLADE_SUFFIX).unwrap_or(name).to_string(),
        name.strip_suffix(".php").unwrap_or(name).to_string(),
    ];
    for candidate in candidates {
        if !candidate.is_empty() && !out.contains(&candidate) {
            out.push(candidate);
        }
    }
    out
}

/// Lookup variants for an asset reference.
pub fn asset_name_variants(name: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    let trimmed = name.trim().split(['?', '#']).next().unwrap_or("").to_string();
    let no_slash = trimmed.trim_start_matches('/').to_string();
    let candidates = [
        trimmed.clone(),
        no_slash.clone(),
        no_slash
            .strip_prefix("resources/")
            .unwrap_or(&no_slash)
            .to_string(),
        no_slash.strip_prefix("public/").unwrap_or(&no_slash).to_string(),
    ];
    for candidate in candidates {
        if !candidate.is_empty() && !out.contains(&candidate) {
            out.push(candidate);
        }
    }
    out
}

/// `messages.dashboard.title` as (`messages`, `dashboard.title`).
pub fn split_translation_key(key: &str) -> Option<(&str, &str)> {
    let (namespace, rest) = key.split_once('.')?;
    if namespace.is_empty() || rest.is_empty() {
        return None;
    }
    Some((namespace, rest))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn route_paths_have_one_leading_slash() {
        for (raw, expected) in [
            ("", "/"),
            ("/", "/"),
            ("///", "/"),
            ("users", "/users"),
            ("//users//list/", "/users/list"),
            ("/a/{id}/", "/a/{id}"),
        ] {
            assert_eq!(normalize_route_path(raw), expected, "input {raw:?}");
        }
    }

    #[test]
    fn full_path_composes_prefix() {
        assert_eq!(build_full_path("/list", "admin/users"), "/admin/users/list");
        assert_eq!(build_full_path("", "admin"), "/admin");
        assert_eq!(build_full_path("/", ""), "/");
        assert_eq!(build_full_path("x", "/"), "/x");
        assert_eq!(join_prefix("admin", "/users/"), "admin/users");
    }

    #[test]
    fn full_name_suppresses_empty_segments() {
        assert_eq!(
            build_full_name(Some("index"), "admin.users."),
            Some("admin.users.index".to_string())
        );
        assert_eq!(build_full_name(Some(".home"), ""), Some("home".to_string()));
        assert_eq!(build_full_name(None, "admin."), None);
        assert_eq!(build_full_name(Some(""), ""), None);
    }

    #[test]
    fn domains_lose_scheme_and_trailing_slash() {
        assert_eq!(normalize_domain("https://{tenant}.example.com/"), "{tenant}.example.com");
        assert_eq!(normalize_domain("api.example.com"), "api.example.com");
    }

    #[test]
    fn view_variants_cover_slash_and_suffix_forms() {
        assert_eq!(view_name_from_relative("users/index.blade.php"), "users.index");
        assert_eq!(view_name_from_relative("legacy.php"), "legacy");
        let variants = view_name_variants("users/index.blade.php");
        assert!(variants.contains(&"users/index".to_string()));
        assert!(variants.contains(&"users.index.blade.php".to_string()));
    }

    #[test]
    fn asset_variants_strip_roots_and_query() {
        let variants = asset_name_variants("/public/css/app.css?v=2");
        assert_eq!(
            variants,
            vec!["/public/css/app.css", "public/css/app.css", "css/app.css"]
        );
    }
}
