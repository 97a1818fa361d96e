//! Literal-context classifiers: given a string literal and its syntactic
//! neighbourhood, decide which artifact domain (if any) it belongs to.

pub mod asset;
pub mod route;
pub mod translation;
pub mod view;

use crate::model::ArtifactKind;
use crate::source::php::{self, CallSite};
use crate::source::template::DIRECTIVE_CALL;
use tree_sitter::Node;

/// A string literal plus the context the grammars look at.
#[derive(Debug, Clone)]
pub struct LiteralSite<'a> {
    pub node: Node<'a>,
    pub source: &'a str,
    pub value: String,
    pub file: &'a str,
    pub is_template: bool,
    /// Directive of the template fragment the literal was parsed from.
    pub directive: Option<&'a str>,
    /// HTML attribute the template fragment sits in.
    pub attribute: Option<&'a str>,
}

impl<'a> LiteralSite<'a> {
    pub fn new(node: Node<'a>, source: &'a str, file: &'a str) -> Option<Self> {
        let value = php::string_literal(node, source)?;
        Some(Self {
            node,
            source,
            value,
            file,
            is_template: file.ends_with(".blade.php"),
            directive: None,
            attribute: None,
        })
    }

    pub fn in_fragment(mut self, directive: Option<&'a str>, attribute: Option<&'a str>) -> Self {
        self.directive = directive;
        self.attribute = attribute;
        self
    }

    pub fn is_blank(&self) -> bool {
        self.value.trim().is_empty()
    }

    /// The call this literal is an argument of, looking through array literals.
    pub fn owner(&self) -> Option<ArgumentOwner<'a>> {
        argument_owner(self.node, self.source)
    }

    /// Name of the Blade directive when the literal is one of its arguments.
    pub fn directive_argument(&self) -> Option<&'a str> {
        let owner = self.owner()?;
        match owner.site {
            CallSite::Function { name } if name == DIRECTIVE_CALL => self.directive,
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ArgumentOwner<'a> {
    pub call: Node<'a>,
    pub site: CallSite<'a>,
    /// Position of the argument holding the literal.
    pub index: usize,
    /// The literal sits inside an array literal passed as the argument.
    pub nested: bool,
}

impl ArgumentOwner<'_> {
    pub fn is_direct_first(&self) -> bool {
        self.index == 0 && !self.nested
    }
}

pub fn argument_owner<'a>(literal: Node<'a>, source: &'a str) -> Option<ArgumentOwner<'a>> {
    let mut node = literal;
    let mut nested = false;
    while let Some((array, _)) = php::enclosing_array(node) {
        nested = true;
        node = array;
    }
    let (call, index) = php::enclosing_call(node)?;
    let site = php::call_site(call, source)?;
    Some(ArgumentOwner {
        call,
        site,
        index,
        nested,
    })
}

/// Result of running every grammar in priority order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classified {
    Route(route::RouteRole),
    Translation(translation::TranslationRole),
    View,
    Asset,
}

impl Classified {
    pub fn kind(&self) -> ArtifactKind {
        match self {
            Classified::Route(_) => ArtifactKind::Route,
            Classified::Translation(_) => ArtifactKind::Translation,
            Classified::View => ArtifactKind::View,
            Classified::Asset => ArtifactKind::Asset,
        }
    }
}

/// Route first, then translation, view, asset; the first positive signal wins.
/// Translation-cache membership is consulted only after every structural check.
pub fn classify(site: &LiteralSite<'_>, is_known_translation: impl Fn(&str) -> bool) -> Option<Classified> {
    if site.is_blank() {
        return None;
    }
    if let Some(role) = route::classify(site) {
        return Some(Classified::Route(role));
    }
    if let Some(role) = translation::classify(site) {
        return Some(Classified::Translation(role));
    }
    if view::classify(site) {
        return Some(Classified::View);
    }
    if asset::classify(site) {
        return Some(Classified::Asset);
    }
    if translation::is_candidate(&site.value) && is_known_translation(&site.value) {
        return Some(Classified::Translation(translation::TranslationRole::Known));
    }
    None
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::LiteralSite;
    use crate::source::php::{self, PhpParser};
    use tree_sitter::Tree;

    pub fn parse(src: &str) -> Tree {
        PhpParser::new().unwrap().parse(src).unwrap()
    }

    /// Site for the literal whose content is `needle` (first occurrence).
    pub fn site_for<'a>(tree: &'a Tree, src: &'a str, file: &'a str, needle: &str) -> LiteralSite<'a> {
        php::string_nodes(tree.root_node())
            .into_iter()
            .filter_map(|node| LiteralSite::new(node, src, file))
            .find(|site| site.value == needle)
            .unwrap_or_else(|| panic!("no literal {needle:?}"))
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::{parse, site_for};
    use super::*;

    #[test]
    fn route_wins_over_known_translation() {
        let src = "<?php echo route('home');";
        let tree = parse(src);
        let site = site_for(&tree, src, "app/Http/x.php", "home");
        let classified = classify(&site, |key| key == "home").unwrap();
        assert_eq!(classified.kind(), ArtifactKind::Route);
    }

    #[test]
    fn known_translation_is_last_resort() {
        let src = "<?php $x = ['title' => 'home'];";
        let tree = parse(src);
        let site = site_for(&tree, src, "app/x.php", "home");
        assert_eq!(
            classify(&site, |key| key == "home"),
            Some(Classified::Translation(translation::TranslationRole::Known))
        );
        assert_eq!(classify(&site, |_| false), None);
    }

    #[test]
    fn owner_looks_through_arrays() {
        let src = "<?php View::first(['a.b', 'c']);";
        let tree = parse(src);
        let site = site_for(&tree, src, "x.php", "c");
        let owner = site.owner().unwrap();
        assert!(owner.nested);
        assert_eq!(owner.index, 0);
        assert_eq!(owner.site.name(), "first");
    }
}
