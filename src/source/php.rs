use anyhow::Result;
use tree_sitter::{Node, Parser, Tree};

pub struct PhpParser {
    parser: Parser,
}

impl PhpParser {
    pub fn new() -> Result<Self> {
        let mut parser = Parser::new();
        let language = tree_sitter_php::LANGUAGE_PHP;
        parser.set_language(&language.into())?;
        Ok(Self { parser })
    }

    /// Parses a PHP program. Broken input still yields a tree with ERROR nodes.
    pub fn parse(&mut self, source: &str) -> Option<Tree> {
        self.parser.parse(source, None)
    }
}

/// A call expression seen from the outside: what is called and on what.
#[derive(Debug, Clone, Copy)]
pub enum CallSite<'a> {
    Function {
        name: &'a str,
    },
    Static {
        scope: &'a str,
        name: &'a str,
    },
    Member {
        object: Node<'a>,
        name: &'a str,
    },
}

impl<'a> CallSite<'a> {
    pub fn name(&self) -> &'a str {
        match self {
            CallSite::Function { name } => name,
            CallSite::Static { name, .. } => name,
            CallSite::Member { name, .. } => name,
        }
    }
}

pub const CALL_KINDS: &[&str] = &[
    "function_call_expression",
    "scoped_call_expression",
    "member_call_expression",
    "nullsafe_member_call_expression",
];

pub fn is_call(node: Node<'_>) -> bool {
    CALL_KINDS.contains(&node.kind())
}

pub fn node_text<'a>(node: Node<'_>, source: &'a str) -> &'a str {
    source.get(node.start_byte()..node.end_byte()).unwrap_or("")
}

/// Last `\`-separated segment of a (possibly qualified) name.
pub fn short_name(raw: &str) -> &str {
    raw.trim().rsplit('\\').next().unwrap_or(raw)
}

pub fn call_site<'a>(node: Node<'a>, source: &'a str) -> Option<CallSite<'a>> {
    match node.kind() {
        "function_call_expression" => {
            let function = node.child_by_field_name("function")?;
            if !matches!(function.kind(), "name" | "qualified_name") {
                return None;
            }
            Some(CallSite::Function {
                name: short_name(node_text(function, source)),
            })
        }
        "scoped_call_expression" => {
            let scope = node.child_by_field_name("scope")?;
            let name = node.child_by_field_name("name")?;
            Some(CallSite::Static {
                scope: node_text(scope, source).trim().trim_start_matches('\\'),
                name: node_text(name, source),
            })
        }
        "member_call_expression" | "nullsafe_member_call_expression" => {
            let object = node.child_by_field_name("object")?;
            let name = node.child_by_field_name("name")?;
            Some(CallSite::Member {
                object,
                name: node_text(name, source),
            })
        }
        _ => None,
    }
}

/// Argument value expressions, in order. Named arguments keep their position.
pub fn call_arguments(node: Node<'_>) -> Vec<Node<'_>> {
    let mut out = Vec::new();
    let Some(args) = node.child_by_field_name("arguments") else {
        return out;
    };
    let mut cursor = args.walk();
    for child in args.named_children(&mut cursor) {
        if child.kind() == "argument" {
            if let Some(value) = argument_value(child) {
                out.push(value);
            }
        }
    }
    out
}

pub fn argument_value(argument: Node<'_>) -> Option<Node<'_>> {
    let count = argument.named_child_count();
    if count == 0 {
        return None;
    }
    argument.named_child(count - 1)
}

pub fn is_string_node(node: Node<'_>) -> bool {
    matches!(node.kind(), "string" | "encapsed_string")
}

/// Content of a literal string. Interpolated strings are dynamic and yield `None`.
pub fn string_literal(node: Node<'_>, source: &str) -> Option<String> {
    if !is_string_node(node) {
        return None;
    }
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        if !matches!(
            child.kind(),
            "string_content" | "string_value" | "escape_sequence"
        ) {
            return None;
        }
    }
    unquote(node_text(node, source))
}

fn unquote(raw: &str) -> Option<String> {
    let raw = raw.trim();
    let raw = raw
        .strip_prefix('b')
        .or_else(|| raw.strip_prefix('B'))
        .filter(|rest| rest.starts_with('\'') || rest.starts_with('"'))
        .unwrap_or(raw);
    let quote = raw.chars().next()?;
    if quote != '\'' && quote != '"' {
        return None;
    }
    if raw.len() < 2 || !raw.ends_with(quote) {
        return None;
    }
    let inner = &raw[1..raw.len() - 1];
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match (quote, chars.peek().copied()) {
            ('\'', Some(next @ ('\'' | '\\'))) => {
                out.push(next);
                chars.next();
            }
            ('"', Some(next @ ('"' | '\\' | '$'))) => {
                out.push(next);
                chars.next();
            }
            ('"', Some('n')) => {
                out.push('\n');
                chars.next();
            }
            ('"', Some('t')) => {
                out.push('\t');
                chars.next();
            }
            _ => out.push(ch),
        }
    }
    Some(out)
}

pub fn is_closure(node: Node<'_>) -> bool {
    matches!(
        node.kind(),
        "anonymous_function" | "anonymous_function_creation_expression" | "arrow_function"
    )
}

/// `Foo\Bar::class` as `Foo\Bar`.
pub fn class_constant(node: Node<'_>, source: &str) -> Option<String> {
    if node.kind() != "class_constant_access_expression" {
        return None;
    }
    let text = node_text(node, source).trim();
    let class = text.strip_suffix("::class")?.trim();
    if class.is_empty() {
        return None;
    }
    Some(class.trim_start_matches('\\').to_string())
}

#[derive(Debug, Clone, Copy)]
pub struct ArrayEntry<'a> {
    pub key: Option<Node<'a>>,
    pub value: Node<'a>,
}

pub fn is_array(node: Node<'_>) -> bool {
    node.kind() == "array_creation_expression"
}

pub fn array_entries(node: Node<'_>) -> Vec<ArrayEntry<'_>> {
    let mut out = Vec::new();
    if !is_array(node) {
        return out;
    }
    let mut cursor = node.walk();
    for element in node.named_children(&mut cursor) {
        if element.kind() != "array_element_initializer" {
            continue;
        }
        let mut inner = element.walk();
        let parts: Vec<Node<'_>> = element.named_children(&mut inner).collect();
        match parts.as_slice() {
            [value] => out.push(ArrayEntry { key: None, value: *value }),
            [key, value, ..] => out.push(ArrayEntry {
                key: Some(*key),
                value: *value,
            }),
            _ => {}
        }
    }
    out
}

/// Value node stored under a literal string key.
pub fn array_get<'a>(node: Node<'a>, key: &str, source: &str) -> Option<Node<'a>> {
    array_entries(node).into_iter().find_map(|entry| {
        let found = entry.key.and_then(|k| string_literal(k, source))?;
        (found == key).then_some(entry.value)
    })
}

pub fn array_get_string(node: Node<'_>, key: &str, source: &str) -> Option<String> {
    array_get(node, key, source).and_then(|value| string_literal(value, source))
}

/// A literal or a list of literals, flattened.
pub fn string_list(node: Node<'_>, source: &str) -> Vec<String> {
    if let Some(value) = string_literal(node, source) {
        return vec![value];
    }
    array_entries(node)
        .into_iter()
        .filter_map(|entry| string_literal(entry.value, source))
        .collect()
}

/// When `literal` is an argument of a call: the call and the argument position.
pub fn enclosing_call(literal: Node<'_>) -> Option<(Node<'_>, usize)> {
    let argument = literal.parent()?;
    if argument.kind() != "argument" {
        return None;
    }
    let arguments = argument.parent()?;
    if arguments.kind() != "arguments" {
        return None;
    }
    let call = arguments.parent()?;
    if !is_call(call) {
        return None;
    }
    let mut cursor = arguments.walk();
    let index = arguments
        .named_children(&mut cursor)
        .filter(|child| child.kind() == "argument")
        .position(|child| child.id() == argument.id())?;
    Some((call, index))
}

/// When `literal` sits in an array literal: the entry role and the array node.
pub fn enclosing_array(literal: Node<'_>) -> Option<(Node<'_>, bool)> {
    let element = literal.parent()?;
    if element.kind() != "array_element_initializer" {
        return None;
    }
    let array = element.parent()?;
    if !is_array(array) {
        return None;
    }
    let is_key = element.named_child_count() >= 2
        && element
            .named_child(0)
            .map(|first| first.id() == literal.id())
            .unwrap_or(false);
    Some((array, is_key))
}

pub fn string_nodes(root: Node<'_>) -> Vec<Node<'_>> {
    let mut out = Vec::new();
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if is_string_node(node) {
            out.push(node);
            continue;
        }
        let mut cursor = node.walk();
        let children: Vec<Node<'_>> = node.named_children(&mut cursor).collect();
        stack.extend(children.into_iter().rev());
    }
    out
}

/// Innermost string literal covering `offset`.
pub fn string_at(root: Node<'_>, offset: usize) -> Option<Node<'_>> {
    let mut node = root.descendant_for_byte_range(offset, offset)?;
    loop {
        if is_string_node(node) {
            return Some(node);
        }
        node = node.parent()?;
    }
}

/// The `return [...]` array of a file, if any.
pub fn returned_array(root: Node<'_>) -> Option<Node<'_>> {
    let mut cursor = root.walk();
    for child in root.named_children(&mut cursor) {
        if child.kind() != "return_statement" {
            continue;
        }
        let mut inner = child.walk();
        let found = child.named_children(&mut inner).find(|n| is_array(*n));
        if found.is_some() {
            return found;
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(src: &str) -> Tree {
        PhpParser::new().unwrap().parse(src).unwrap()
    }

    #[test]
    fn reads_static_call_arguments() {
        let src = "<?php Route::get('/users', [UserController::class, 'index']);";
        let tree = parse(src);
        let strings = string_nodes(tree.root_node());
        assert_eq!(strings.len(), 2);
        let (call, index) = enclosing_call(strings[0]).unwrap();
        assert_eq!(index, 0);
        match call_site(call, src).unwrap() {
            CallSite::Static { scope, name } => {
                assert_eq!(scope, "Route");
                assert_eq!(name, "get");
            }
            other => panic!("unexpected {other:?}"),
        }
        let args = call_arguments(call);
        assert_eq!(args.len(), 2);
        let entries = array_entries(args[1]);
        assert_eq!(entries.len(), 2);
        assert_eq!(class_constant(entries[0].value, src).unwrap(), "UserController");
    }

    #[test]
    fn interpolated_strings_are_dynamic() {
        let src = "<?php $a = \"users.$id\"; $b = \"plain\"; $c = 'it\\'s';";
        let tree = parse(src);
        let values: Vec<Option<String>> = string_nodes(tree.root_node())
            .into_iter()
            .map(|n| string_literal(n, src))
            .collect();
        assert_eq!(
            values,
            vec![None, Some("plain".to_string()), Some("it's".to_string())]
        );
    }

    #[test]
    fn finds_keyed_entries() {
        let src = "<?php return ['a' => ['b' => 'v'], 'c'];";
        let tree = parse(src);
        let array = returned_array(tree.root_node()).unwrap();
        let nested = array_get(array, "a", src).unwrap();
        assert_eq!(array_get_string(nested, "b", src).as_deref(), Some("v"));
        let entries = array_entries(array);
        assert!(entries[0].key.is_some());
        assert!(entries[1].key.is_none());
    }

    #[test]
    fn string_at_offset() {
        let src = "<?php echo route('home');";
        let tree = parse(src);
        let offset = src.find("home").unwrap();
        let node = string_at(tree.root_node(), offset).unwrap();
        assert_eq!(string_literal(node, src).as_deref(), Some("home"));
        assert!(string_at(tree.root_node(), 2).is_none());
    }
}
