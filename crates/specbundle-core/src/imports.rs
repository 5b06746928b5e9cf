//! Import specifier scanner.
//!
//! Finds import/require specifiers in compiled JavaScript without full
//! parsing, recording where each specifier sits in the source so it can be
//! rewritten in place.

use std::ops::Range;

/// How a specifier was referenced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportKind {
    /// `import x from "..."` or `import "..."`.
    Static,
    /// `export ... from "..."`.
    ReExport,
    /// `import("...")`.
    Dynamic,
    /// `require("...")`.
    Require,
}

/// A specifier occurrence in source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportRef {
    /// Specifier exactly as written.
    pub specifier: String,
    pub kind: ImportKind,
    /// Byte range of the specifier, quotes excluded.
    pub span: Range<usize>,
}

/// Scan source code for import/require specifiers.
///
/// Every occurrence is returned in source order; repeated specifiers are not
/// collapsed.
#[must_use]
pub fn scan_imports(source: &str) -> Vec<ImportRef> {
    let bytes = source.as_bytes();
    let len = bytes.len();
    let mut results = Vec::new();
    let mut i = 0;
    // Brace depth, and the depth at which each open `${` was entered.
    let mut depth = 0usize;
    let mut templates: Vec<usize> = Vec::new();

    while i < len {
        // Line comment
        if bytes[i] == b'/' && i + 1 < len && bytes[i + 1] == b'/' {
            while i < len && bytes[i] != b'\n' {
                i += 1;
            }
            continue;
        }

        // Block comment
        if bytes[i] == b'/' && i + 1 < len && bytes[i + 1] == b'*' {
            i += 2;
            while i + 1 < len && !(bytes[i] == b'*' && bytes[i + 1] == b'/') {
                i += 1;
            }
            i += 2;
            continue;
        }

        // Plain string literals cannot contain imports
        if bytes[i] == b'"' || bytes[i] == b'\'' {
            i = read_string(bytes, i).map_or(i + 1, |span| span.end + 1);
            continue;
        }

        // Template literal text is skipped; `${...}` bodies are scanned as code
        if bytes[i] == b'`' {
            i = match skip_template_text(bytes, i + 1) {
                TemplateStop::Interpolation(next) => {
                    templates.push(depth);
                    next
                }
                TemplateStop::End(next) => next,
            };
            continue;
        }

        if bytes[i] == b'{' {
            depth += 1;
            i += 1;
            continue;
        }

        if bytes[i] == b'}' {
            if templates.last() == Some(&depth) {
                templates.pop();
                i = match skip_template_text(bytes, i + 1) {
                    TemplateStop::Interpolation(next) => {
                        templates.push(depth);
                        next
                    }
                    TemplateStop::End(next) => next,
                };
            } else {
                depth = depth.saturating_sub(1);
                i += 1;
            }
            continue;
        }

        if matches_keyword(bytes, i, b"import") {
            if let Some((kind, span)) = scan_import(bytes, i + 6) {
                i = span.end + 1;
                results.push(make_ref(source, kind, span));
                continue;
            }
            i += 6;
            continue;
        }

        if matches_keyword(bytes, i, b"export") {
            if let Some(span) = scan_from_clause(bytes, i + 6) {
                i = span.end + 1;
                results.push(make_ref(source, ImportKind::ReExport, span));
                continue;
            }
            i += 6;
            continue;
        }

        if matches_keyword(bytes, i, b"require") {
            if let Some(span) = scan_call_argument(bytes, i + 7) {
                i = span.end + 1;
                results.push(make_ref(source, ImportKind::Require, span));
                continue;
            }
            i += 7;
            continue;
        }

        i += 1;
    }

    results
}

/// Replace specifiers for which `replace` returns a new value.
#[must_use]
pub fn rewrite_imports<F>(source: &str, imports: &[ImportRef], mut replace: F) -> String
where
    F: FnMut(&ImportRef) -> Option<String>,
{
    let mut out = String::with_capacity(source.len());
    let mut cursor = 0;

    for import in imports {
        if let Some(replacement) = replace(import) {
            out.push_str(&source[cursor..import.span.start]);
            out.push_str(&replacement);
            cursor = import.span.end;
        }
    }

    out.push_str(&source[cursor..]);
    out
}

fn make_ref(source: &str, kind: ImportKind, span: Range<usize>) -> ImportRef {
    ImportRef {
        specifier: source[span.clone()].to_string(),
        kind,
        span,
    }
}

fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'$'
}

/// Check if bytes at position match a keyword (with word boundary).
///
/// Member accesses such as `foo.import` are not keywords.
fn matches_keyword(bytes: &[u8], pos: usize, keyword: &[u8]) -> bool {
    let end = pos + keyword.len();
    if end > bytes.len() || &bytes[pos..end] != keyword {
        return false;
    }
    if pos > 0 && (is_ident_byte(bytes[pos - 1]) || bytes[pos - 1] == b'.') {
        return false;
    }
    !(end < bytes.len() && is_ident_byte(bytes[end]))
}

fn skip_ws(bytes: &[u8], mut i: usize) -> usize {
    while i < bytes.len() && bytes[i].is_ascii_whitespace() {
        i += 1;
    }
    i
}

/// Read a single-line quoted string starting at `start`.
/// Returns the span of its contents.
fn read_string(bytes: &[u8], start: usize) -> Option<Range<usize>> {
    let quote = *bytes.get(start)?;
    if quote != b'"' && quote != b'\'' {
        return None;
    }
    let mut i = start + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'\n' => return None,
            b if b == quote => return Some(start + 1..i),
            _ => i += 1,
        }
    }
    None
}

enum TemplateStop {
    /// Stopped after `${`; index of the first expression byte.
    Interpolation(usize),
    /// Stopped after the closing backtick (or at end of input).
    End(usize),
}

/// Skip template literal text starting at `i`, just past a backtick or a
/// closing `}` of an interpolation.
fn skip_template_text(bytes: &[u8], mut i: usize) -> TemplateStop {
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'`' => return TemplateStop::End(i + 1),
            b'$' if bytes.get(i + 1) == Some(&b'{') => return TemplateStop::Interpolation(i + 2),
            _ => i += 1,
        }
    }
    TemplateStop::End(bytes.len())
}

/// Everything after the `import` keyword.
fn scan_import(bytes: &[u8], start: usize) -> Option<(ImportKind, Range<usize>)> {
    let i = skip_ws(bytes, start);
    match bytes.get(i)? {
        b'(' => scan_call_argument(bytes, start).map(|span| (ImportKind::Dynamic, span)),
        b'"' | b'\'' => read_string(bytes, i).map(|span| (ImportKind::Static, span)),
        _ => scan_from_clause(bytes, start).map(|span| (ImportKind::Static, span)),
    }
}

/// Walk a binding list (`{ a as b }`, `* as ns`, `def, { x }`) up to `from "..."`.
fn scan_from_clause(bytes: &[u8], start: usize) -> Option<Range<usize>> {
    let len = bytes.len();
    let mut i = skip_ws(bytes, start);

    while i < len {
        match bytes[i] {
            b'{' => {
                while i < len && bytes[i] != b'}' {
                    i += 1;
                }
                i += 1;
            }
            b'*' | b',' => i += 1,
            b if b.is_ascii_whitespace() => i += 1,
            b if is_ident_byte(b) => {
                let word_start = i;
                while i < len && is_ident_byte(bytes[i]) {
                    i += 1;
                }
                if &bytes[word_start..i] == b"from" {
                    let quote = skip_ws(bytes, i);
                    return read_string(bytes, quote);
                }
            }
            _ => return None,
        }
    }

    None
}

/// `( "..." )` following `require` or `import`.
fn scan_call_argument(bytes: &[u8], start: usize) -> Option<Range<usize>> {
    let i = skip_ws(bytes, start);
    if bytes.get(i) != Some(&b'(') {
        return None;
    }
    let quote = skip_ws(bytes, i + 1);
    let span = read_string(bytes, quote)?;
    let close = skip_ws(bytes, span.end + 1);
    (bytes.get(close) == Some(&b')')).then_some(span)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn specifiers(source: &str) -> Vec<(String, ImportKind)> {
        scan_imports(source)
            .into_iter()
            .map(|i| (i.specifier, i.kind))
            .collect()
    }

    #[test]
    fn test_static_forms() {
        let source = r#"
import { a, b as c } from "./named";
import def from '@angular/core';
import * as ns from './ns';
import def2, { x } from "./mixed";
import './side-effect';
"#;
        assert_eq!(
            specifiers(source),
            vec![
                ("./named".to_string(), ImportKind::Static),
                ("@angular/core".to_string(), ImportKind::Static),
                ("./ns".to_string(), ImportKind::Static),
                ("./mixed".to_string(), ImportKind::Static),
                ("./side-effect".to_string(), ImportKind::Static),
            ]
        );
    }

    #[test]
    fn test_reexports() {
        let source = "export * from './a';\nexport { b } from \"./b\";\nexport * as c from './c';\nexport const d = 1;";
        assert_eq!(
            specifiers(source),
            vec![
                ("./a".to_string(), ImportKind::ReExport),
                ("./b".to_string(), ImportKind::ReExport),
                ("./c".to_string(), ImportKind::ReExport),
            ]
        );
    }

    #[test]
    fn test_dynamic_and_require() {
        let source = "const m = import('./lazy');\nconst d = require(\"domino\");";
        assert_eq!(
            specifiers(source),
            vec![
                ("./lazy".to_string(), ImportKind::Dynamic),
                ("domino".to_string(), ImportKind::Require),
            ]
        );
    }

    #[test]
    fn test_ignores_comments_strings_and_members() {
        let source = r#"
// import x from './commented';
/* require('./blocked') */
const s = "import y from './in-string'";
const url = import.meta.url;
obj.require('./member');
"#;
        assert!(scan_imports(source).is_empty());
    }

    #[test]
    fn test_ignores_template_literals() {
        let source = "const fixture = `\nimport {Component} from '@angular/core';\n`;\n";
        assert!(scan_imports(source).is_empty());

        let escaped = "const s = `a \\` require('./not-code') \\${x}`;";
        assert!(scan_imports(escaped).is_empty());
    }

    #[test]
    fn test_scans_template_interpolations() {
        let source = "const a = `x ${require('./inner')} import './text'`;\n\
                      const b = `${ { k: `${import('./nested')}` }.k } export * from './no'`;\n\
                      import { c } from './after';";
        assert_eq!(
            specifiers(source),
            vec![
                ("./inner".to_string(), ImportKind::Require),
                ("./nested".to_string(), ImportKind::Dynamic),
                ("./after".to_string(), ImportKind::Static),
            ]
        );
    }

    #[test]
    fn test_template_does_not_hide_following_imports() {
        let source = "function f() { return `${1}`; }\nimport './after';";
        assert_eq!(
            specifiers(source),
            vec![("./after".to_string(), ImportKind::Static)]
        );
    }

    #[test]
    fn test_spans_point_at_specifier() {
        let source = "import { a } from './dep';";
        let imports = scan_imports(source);
        assert_eq!(&source[imports[0].span.clone()], "./dep");
    }

    #[test]
    fn test_repeated_specifiers_are_kept() {
        let source = "import './a';\nimport './a';";
        assert_eq!(scan_imports(source).len(), 2);
    }

    #[test]
    fn test_rewrite_only_selected() {
        let source = "import { a } from '@angular/core';\nimport { b } from './local';\n";
        let imports = scan_imports(source);
        let rewritten = rewrite_imports(source, &imports, |i| {
            (i.specifier == "@angular/core").then(|| "/out/core/index.js".to_string())
        });
        assert_eq!(
            rewritten,
            "import { a } from '/out/core/index.js';\nimport { b } from './local';\n"
        );
    }
}
