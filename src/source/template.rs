//! Blade templates are scanned for embedded PHP regions. Each region becomes a
//! small standalone PHP program; offsets inside that program map back to the
//! template through [`Fragment::to_template`].

use regex::Regex;

/// Synthetic function a directive's argument list is wrapped in.
pub const DIRECTIVE_CALL: &str = "__blade_directive";

const PHP_OPEN: &str = "<?php ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FragmentKind {
    Echo,
    RawEcho,
    Directive,
    PhpBlock,
}

#[derive(Debug, Clone)]
pub struct Fragment {
    pub kind: FragmentKind,
    /// Parseable PHP program.
    pub code: String,
    /// Bytes of `code` that precede the template text.
    pub prefix_len: usize,
    /// Template offset of the first copied byte.
    pub template_start: usize,
    /// Length of the copied template text.
    pub len: usize,
    pub directive: Option<String>,
    /// HTML attribute the fragment sits in, lower-cased.
    pub attribute: Option<String>,
}

impl Fragment {
    fn new(
        kind: FragmentKind,
        prefix: &str,
        body: &str,
        suffix: &str,
        template_start: usize,
        directive: Option<String>,
        attribute: Option<String>,
    ) -> Self {
        let mut code = String::with_capacity(prefix.len() + body.len() + suffix.len());
        code.push_str(prefix);
        code.push_str(body);
        code.push_str(suffix);
        Self {
            kind,
            code,
            prefix_len: prefix.len(),
            template_start,
            len: body.len(),
            directive,
            attribute,
        }
    }

    /// Maps an offset in `code` to the template; wrapper bytes map to `None`.
    pub fn to_template(&self, code_offset: usize) -> Option<usize> {
        if code_offset < self.prefix_len || code_offset > self.prefix_len + self.len {
            return None;
        }
        Some(self.template_start + code_offset - self.prefix_len)
    }

    /// Inverse of [`Fragment::to_template`].
    pub fn to_code(&self, template_offset: usize) -> Option<usize> {
        if template_offset < self.template_start || template_offset > self.template_start + self.len
        {
            return None;
        }
        Some(self.prefix_len + template_offset - self.template_start)
    }
}

pub fn extract_fragments(text: &str) -> Vec<Fragment> {
    let bytes = text.as_bytes();
    let mut out = Vec::new();
    let mut pos = 0;
    while pos < bytes.len() {
        let rest = &text[pos..];
        if rest.starts_with("{{--") {
            pos = skip_past(text, pos + 4, "--}}");
            continue;
        }
        if rest.starts_with("@{{") {
            pos = skip_past(text, pos + 3, "}}");
            continue;
        }
        if rest.starts_with("@@") {
            pos += 2;
            continue;
        }
        if rest.starts_with("{!!") {
            let start = pos + 3;
            let end = find_from(text, start, "!!}").unwrap_or(text.len());
            out.push(Fragment::new(
                FragmentKind::RawEcho,
                PHP_OPEN,
                &text[start..end],
                ";",
                start,
                None,
                attribute_at(text, pos),
            ));
            pos = (end + 3).min(text.len());
            continue;
        }
        if rest.starts_with("{{") {
            let start = pos + 2;
            let end = find_from(text, start, "}}").unwrap_or(text.len());
            out.push(Fragment::new(
                FragmentKind::Echo,
                PHP_OPEN,
                &text[start..end],
                ";",
                start,
                None,
                attribute_at(text, pos),
            ));
            pos = (end + 2).min(text.len());
            continue;
        }
        if rest.starts_with("<?php") || rest.starts_with("<?=") {
            let start = pos + if rest.starts_with("<?php") { 5 } else { 3 };
            let end = find_from(text, start, "?>").unwrap_or(text.len());
            let prefix = if rest.starts_with("<?=") { "<?php echo " } else { PHP_OPEN };
            out.push(Fragment::new(
                FragmentKind::PhpBlock,
                prefix,
                &text[start..end],
                "\n;",
                start,
                None,
                None,
            ));
            pos = (end + 2).min(text.len());
            continue;
        }
        if bytes[pos] == b'@' && !preceded_by_word(bytes, pos) {
            if let Some((fragment, next)) = directive_at(text, pos) {
                if let Some(fragment) = fragment {
                    out.push(fragment);
                }
                pos = next;
                continue;
            }
        }
        pos += rest.chars().next().map(|c| c.len_utf8()).unwrap_or(1);
    }
    out
}

fn directive_at(text: &str, at: usize) -> Option<(Option<Fragment>, usize)> {
    let bytes = text.as_bytes();
    let name_start = at + 1;
    let mut name_end = name_start;
    while name_end < bytes.len() && (bytes[name_end].is_ascii_alphanumeric() || bytes[name_end] == b'_')
    {
        name_end += 1;
    }
    if name_end == name_start || bytes[name_start].is_ascii_digit() {
        return None;
    }
    let name = &text[name_start..name_end];
    let mut cursor = name_end;
    while cursor < bytes.len() && matches!(bytes[cursor], b' ' | b'\t') {
        cursor += 1;
    }
    let has_args = cursor < bytes.len() && bytes[cursor] == b'(';

    if name == "php" && !has_args {
        let start = name_end;
        let end = find_from(text, start, "@endphp").unwrap_or(text.len());
        let fragment = Fragment::new(
            FragmentKind::PhpBlock,
            PHP_OPEN,
            &text[start..end],
            "\n;",
            start,
            Some(name.to_string()),
            None,
        );
        return Some((Some(fragment), (end + "@endphp".len()).min(text.len())));
    }
    if !has_args {
        return Some((None, name_end));
    }
    let open = cursor;
    let close = matching_paren(bytes, open)?;
    let prefix = format!("{PHP_OPEN}{DIRECTIVE_CALL}(");
    let fragment = Fragment::new(
        FragmentKind::Directive,
        &prefix,
        &text[open + 1..close],
        ");",
        open + 1,
        Some(name.to_string()),
        attribute_at(text, at),
    );
    Some((Some(fragment), close + 1))
}

/// Index of the `)` closing the `(` at `open`, skipping quoted strings.
fn matching_paren(bytes: &[u8], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut quote: Option<u8> = None;
    let mut idx = open;
    while idx < bytes.len() {
        let b = bytes[idx];
        if let Some(q) = quote {
            if b == b'\\' {
                idx += 2;
                continue;
            }
            if b == q {
                quote = None;
            }
            idx += 1;
            continue;
        }
        match b {
            b'\'' | b'"' => quote = Some(b),
            b'(' => depth += 1,
            b')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(idx);
                }
            }
            _ => {}
        }
        idx += 1;
    }
    None
}

fn preceded_by_word(bytes: &[u8], pos: usize) -> bool {
    pos > 0 && (bytes[pos - 1].is_ascii_alphanumeric() || bytes[pos - 1] == b'_')
}

fn find_from(text: &str, from: usize, needle: &str) -> Option<usize> {
    text.get(from..)?.find(needle).map(|idx| from + idx)
}

fn skip_past(text: &str, from: usize, needle: &str) -> usize {
    find_from(text, from, needle)
        .map(|idx| idx + needle.len())
        .unwrap_or(text.len())
}

fn open_attribute_regex() -> &'static Regex {
    crate::static_regex!(r#"([A-Za-z_:@][-A-Za-z0-9_:.]*)\s*=\s*["'][^"']*$"#)
}

/// Name of the HTML attribute whose quoted value contains `pos`.
pub fn attribute_at(text: &str, pos: usize) -> Option<String> {
    let before = text.get(..pos)?;
    let tag_open = before.rfind('<')?;
    if before.rfind('>').map(|close| close > tag_open).unwrap_or(false) {
        return None;
    }
    let tag = &before[tag_open..];
    open_attribute_regex()
        .captures(tag)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_echo_and_directives() {
        let text = "<a href=\"{{ route('home') }}\">x</a>\n@include('partials.nav', ['a' => 1])\n";
        let fragments = extract_fragments(text);
        assert_eq!(fragments.len(), 2);

        let echo = &fragments[0];
        assert_eq!(echo.kind, FragmentKind::Echo);
        assert_eq!(echo.attribute.as_deref(), Some("href"));
        let code_offset = echo.code.find("home").unwrap();
        let template_offset = echo.to_template(code_offset).unwrap();
        assert_eq!(&text[template_offset..template_offset + 4], "home");

        let directive = &fragments[1];
        assert_eq!(directive.kind, FragmentKind::Directive);
        assert_eq!(directive.directive.as_deref(), Some("include"));
        assert!(directive.code.starts_with("<?php __blade_directive('partials.nav'"));
        assert_eq!(directive.attribute, None);
    }

    #[test]
    fn skips_comments_escapes_and_emails() {
        let text = "{{-- {{ route('x') }} --}} @{{ route('y') }} mail me@example.com @@if(1)";
        assert!(extract_fragments(text).is_empty());
    }

    #[test]
    fn php_blocks_are_fragments() {
        let text = "@php\n$t = __('messages.hi');\n@endphp\n<?php echo asset('a.css'); ?>";
        let fragments = extract_fragments(text);
        assert_eq!(fragments.len(), 2);
        assert!(fragments.iter().all(|f| f.kind == FragmentKind::PhpBlock));
        let second = &fragments[1];
        let offset = second.code.find("a.css").unwrap();
        let mapped = second.to_template(offset).unwrap();
        assert_eq!(second.to_code(mapped), Some(offset));
        assert_eq!(&text[mapped..mapped + 5], "a.css");
    }

    #[test]
    fn directive_without_arguments_is_skipped() {
        let fragments = extract_fragments("@csrf\n@yield('content')");
        assert_eq!(fragments.len(), 1);
        assert_eq!(fragments[0].directive.as_deref(), Some("yield"));
    }
}
