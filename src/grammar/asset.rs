use super::LiteralSite;
use crate::source::php::CallSite;
use crate::source::template::DIRECTIVE_CALL;

pub const ASSET_FUNCTIONS: &[&str] = &[
    "asset",
    "mix",
    "vite",
    "elixir",
    "secure_asset",
    "viteReactRefresh",
    "viteRender",
    "vite_asset",
];

const URL_METHODS: &[&str] = &["asset", "secure", "assetFrom", "secureAssetFrom"];
const URL_RECEIVERS: &[&str] = &["URL", "url", "Illuminate\\Support\\Facades\\URL"];
const ASSET_DIRECTIVES: &[&str] = &["asset", "mix", "vite", "viteReactRefresh"];

/// HTML attributes that carry asset paths.
pub const ASSET_ATTRIBUTES: &[&str] = &[
    "src",
    "href",
    "data-src",
    "data-background",
    "content",
    "data-vite",
];

pub fn classify(site: &LiteralSite<'_>) -> bool {
    if site.is_blank() {
        return false;
    }
    if let Some(owner) = site.owner() {
        let hit = match owner.site {
            CallSite::Function { name } if name == DIRECTIVE_CALL => {
                owner.index == 0
                    && site
                        .directive
                        .map(|d| ASSET_DIRECTIVES.contains(&d))
                        .unwrap_or(false)
            }
            // vite() takes a list of entry points
            CallSite::Function { name } => {
                owner.index == 0
                    && ASSET_FUNCTIONS.contains(&name)
                    && (!owner.nested || name == "vite")
            }
            CallSite::Static { scope, name } => {
                owner.is_direct_first()
                    && URL_METHODS.contains(&name)
                    && URL_RECEIVERS.contains(&scope)
            }
            CallSite::Member { .. } => false,
        };
        if hit {
            return true;
        }
    }
    site.attribute
        .map(|attr| ASSET_ATTRIBUTES.contains(&attr))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::test_support::{parse, site_for};

    #[test]
    fn helpers_and_url_facade() {
        for (src, needle) in [
            ("<?php asset('css/app.css');", "css/app.css"),
            ("<?php mix('js/app.js');", "js/app.js"),
            ("<?php URL::asset('img/logo.png');", "img/logo.png"),
            ("<?php vite(['resources/js/app.js']);", "resources/js/app.js"),
        ] {
            let tree = parse(src);
            let site = site_for(&tree, src, "app/x.php", needle);
            assert!(classify(&site), "{src}");
        }
        let src = "<?php asset($base, 'x.css');";
        let tree = parse(src);
        assert!(!classify(&site_for(&tree, src, "app/x.php", "x.css")));
    }

    #[test]
    fn attribute_context_counts() {
        let src = "<?php $flag ? 'img/a.png' : 'img/b.png';";
        let tree = parse(src);
        let site = site_for(&tree, src, "resources/views/a.blade.php", "img/a.png")
            .in_fragment(None, Some("src"));
        assert!(classify(&site));
        let site = site_for(&tree, src, "resources/views/a.blade.php", "img/a.png")
            .in_fragment(None, Some("class"));
        assert!(!classify(&site));
    }
}
