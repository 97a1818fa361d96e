use serde::Serialize;
use std::collections::BTreeMap;

/// Location of a declaration or reference inside the project.
///
/// `line` is 0-based; byte offsets index into the file as read from disk.
#[derive(Debug, Serialize, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SiteHandle {
    pub file: String,
    pub line: usize,
    pub start_byte: usize,
    pub end_byte: usize,
    /// Set when one call declares several routes (`Route::resource`); names the
    /// action so each expanded route owns a distinct site.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expansion: Option<String>,
}

impl SiteHandle {
    pub fn new(file: &str, line: usize, start_byte: usize, end_byte: usize) -> Self {
        Self {
            file: file.to_string(),
            line,
            start_byte,
            end_byte,
            expansion: None,
        }
    }

    /// The same call site, narrowed to one of the routes it expands into.
    pub fn expanded(mut self, action: &str) -> Self {
        self.expansion = Some(action.to_string());
        self
    }

    /// Handle pointing at a whole file (views, assets, JSON translation files).
    pub fn file(file: &str) -> Self {
        Self::new(file, 0, 0, 0)
    }
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    Route,
    Translation,
    View,
    Asset,
}

impl ArtifactKind {
    pub const ALL: [ArtifactKind; 4] = [
        ArtifactKind::Route,
        ArtifactKind::Translation,
        ArtifactKind::View,
        ArtifactKind::Asset,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ArtifactKind::Route => "route",
            ArtifactKind::Translation => "translation",
            ArtifactKind::View => "view",
            ArtifactKind::Asset => "asset",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "route" | "routes" => Some(ArtifactKind::Route),
            "translation" | "translations" | "lang" | "trans" => Some(ArtifactKind::Translation),
            "view" | "views" | "template" => Some(ArtifactKind::View),
            "asset" | "assets" => Some(ArtifactKind::Asset),
            _ => None,
        }
    }
}

impl std::str::FromStr for ArtifactKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ArtifactKind::parse(s).ok_or_else(|| format!("unknown artifact kind: {s}"))
    }
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    Integer,
    Uuid,
    Hex,
    Alpha,
    Slug,
    Date,
    Datetime,
    Email,
    Phone,
    Url,
    String,
}

#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct RouteParameter {
    pub name: String,
    pub inferred_type: ParamType,
    pub optional: bool,
    pub constraint_pattern: Option<String>,
}

#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct DomainParameter {
    pub name: String,
    pub optional: bool,
    pub pattern: Option<String>,
    pub default: Option<String>,
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MiddlewareSource {
    Route,
    Group,
}

#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct MiddlewareRef {
    pub name: String,
    pub parameters: Vec<String>,
    pub source: MiddlewareSource,
}

/// One resolved route declaration.
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct RouteInfo {
    pub name: Option<String>,
    pub method: String,
    pub path: String,
    pub controller: Option<String>,
    /// De-duplicated, first-seen order: group-inherited entries before own ones.
    pub middleware: Vec<String>,
    pub middleware_sources: Vec<MiddlewareRef>,
    pub domain: Option<String>,
    pub domain_parameters: Vec<DomainParameter>,
    pub parameters: Vec<RouteParameter>,
    pub where_constraints: BTreeMap<String, String>,
    pub group_prefix: String,
    pub namespace: Option<String>,
    pub declaration: SiteHandle,
}

pub const CLOSURE_ACTION: &str = "Closure";

#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct ActionDefinition {
    pub controller: Option<String>,
    pub method: Option<String>,
    pub namespace: Option<String>,
    pub is_closure: bool,
}

/// Expanded, presentation-friendly view of a single route.
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct RouteDefinition {
    pub name: Option<String>,
    pub method: String,
    pub uri: String,
    pub action: ActionDefinition,
    pub middleware: Vec<MiddlewareRef>,
    pub parameters: Vec<RouteParameter>,
    pub domain: Option<String>,
    pub domain_parameters: Vec<DomainParameter>,
    pub prefix: String,
    pub where_constraints: BTreeMap<String, String>,
    pub declaration: SiteHandle,
}

#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct TranslationInfo {
    pub key: String,
    pub locale: String,
    pub source_file: String,
    pub value: String,
    pub declaration: SiteHandle,
}

#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct ViewInfo {
    pub canonical_name: String,
    /// Path relative to the views root the file was found in.
    pub relative_path: String,
    pub extension: String,
    /// Project-relative path of the template file.
    pub file: String,
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum AssetType {
    Css,
    Js,
    Image,
    Font,
    Other,
}

#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct AssetInfo {
    pub canonical_name: String,
    pub relative_path: String,
    pub extension: String,
    pub asset_type: AssetType,
    pub file: String,
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UsageKind {
    NameReference,
    PathReference,
    ActionReference,
    UrlReference,
}

#[derive(Debug, Serialize, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Usage {
    pub file: String,
    pub line_number: usize,
    pub site: SiteHandle,
    pub usage_kind: UsageKind,
}

#[derive(Debug, Serialize, Clone, Default, PartialEq, Eq)]
pub struct IndexStats {
    pub routes: usize,
    pub route_names: usize,
    pub translations: usize,
    pub views: usize,
    pub assets: usize,
    pub usages: usize,
    pub files_scanned: usize,
    pub errors: usize,
    pub duration_ms: u64,
}

/// Result of classifying the string literal under a cursor position.
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct Classification {
    pub kind: ArtifactKind,
    pub literal: String,
    pub key: Option<String>,
    pub declarations: Vec<SiteHandle>,
    pub usage_count: usize,
    pub site: SiteHandle,
}

#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct CompletionItem {
    pub label: String,
    pub kind: ArtifactKind,
    pub detail: String,
}
