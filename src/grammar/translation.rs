use super::LiteralSite;
use crate::source::php::{self, CallSite};
use crate::source::template::DIRECTIVE_CALL;

pub const TRANSLATION_FUNCTIONS: &[&str] = &[
    "trans",
    "__",
    "trans_choice",
    "lang",
    "__t",
    "_",
    "localize",
    "translate",
];

pub const TRANSLATION_METHODS: &[&str] = &["get", "choice", "trans", "__", "transChoice"];

pub const TRANSLATION_RECEIVERS: &[&str] = &[
    "Lang",
    "Trans",
    "Translator",
    "app",
    "translator",
    "I18n",
    "TranslatorContract",
    "Localization",
];

const TRANSLATION_DIRECTIVES: &[&str] = &["lang", "__", "trans", "translate", "choice"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranslationRole {
    /// First argument of a translation helper or method.
    Call,
    /// Array key inside a language file.
    LanguageFileKey,
    /// Nothing structural, but the text is a declared key.
    Known,
}

/// Blank and numeric-only literals are never translation keys.
pub fn is_candidate(value: &str) -> bool {
    let trimmed = value.trim();
    !trimmed.is_empty() && !trimmed.chars().all(|c| c.is_ascii_digit())
}

pub fn is_translation_receiver(receiver: &str) -> bool {
    let receiver = receiver.trim().trim_start_matches('\\');
    TRANSLATION_RECEIVERS.contains(&receiver) || receiver.ends_with("\\Translator")
}

pub fn is_language_file(file: &str) -> bool {
    let path = format!("/{}", file.trim_start_matches('/'));
    path.contains("/lang/")
}

/// Structural checks only; cache membership is left to the caller.
pub fn classify(site: &LiteralSite<'_>) -> Option<TranslationRole> {
    if !is_candidate(&site.value) {
        return None;
    }
    if let Some(owner) = site.owner() {
        if owner.is_direct_first() {
            let hit = match owner.site {
                CallSite::Function { name } if name == DIRECTIVE_CALL => site
                    .directive
                    .map(|d| TRANSLATION_DIRECTIVES.contains(&d))
                    .unwrap_or(false),
                CallSite::Function { name } => TRANSLATION_FUNCTIONS.contains(&name),
                CallSite::Static { scope, name } => {
                    TRANSLATION_METHODS.contains(&name) && is_translation_receiver(scope)
                }
                CallSite::Member { object, name } => {
                    TRANSLATION_METHODS.contains(&name)
                        && receiver_name(object, site.source)
                            .map(|r| is_translation_receiver(&r))
                            .unwrap_or(false)
                }
            };
            if hit {
                return Some(TranslationRole::Call);
            }
        }
    }
    if is_language_file(site.file) {
        if let Some((_, true)) = php::enclosing_array(site.node) {
            return Some(TranslationRole::LanguageFileKey);
        }
    }
    None
}

/// `app('translator')` as `app`, `$translator` as `translator`.
fn receiver_name(object: tree_sitter::Node<'_>, source: &str) -> Option<String> {
    match object.kind() {
        "variable_name" => Some(
            php::node_text(object, source)
                .trim()
                .trim_start_matches('$')
                .to_string(),
        ),
        "name" | "qualified_name" => Some(php::node_text(object, source).trim().to_string()),
        _ if php::is_call(object) => php::call_site(object, source).map(|site| match site {
            CallSite::Function { name } => name.to_string(),
            CallSite::Static { scope, .. } => scope.to_string(),
            CallSite::Member { name, .. } => name.to_string(),
        }),
        _ => None,
    }
}
