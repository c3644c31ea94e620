//! Dependency closure extraction
//!
//! A pre-evaluation dependency-analysis pass over the import graph, driven
//! through the resolver itself: resolved text is scanned for import
//! statements, each target is resolved against the importing file's
//! found-at location, and `import` targets are walked recursively.
//! `importstr` / `importbin` targets join the closure but are not parsed.
//!
//! An embedding evaluator with full language knowledge can substitute its
//! own walk; the packager only consumes the resulting location list.

use std::collections::{BTreeSet, HashSet, VecDeque};

use url::Url;

use crate::cache::strip_binary_suffix;
use crate::error::{CoreError, Result};
use crate::resolver::UniversalImporter;

/// The three import statement forms of the configuration language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportKind {
    /// `import "x"`: parsed source, walked recursively.
    Code,
    /// `importstr "x"`: opaque text.
    Str,
    /// `importbin "x"`: opaque bytes.
    Bin,
}

/// One import statement found in a source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportStatement {
    pub kind: ImportKind,
    pub path: String,
}

/// Every location transitively imported from `roots`, lexicographically
/// sorted. The roots themselves are excluded unless something re-imports
/// them.
pub async fn find_dependencies(
    importer: &mut UniversalImporter,
    roots: &[Url],
) -> Result<Vec<Url>> {
    let mut deps: BTreeSet<String> = BTreeSet::new();
    let mut visited: HashSet<String> = HashSet::new();
    let mut queue: VecDeque<(String, ImportStatement)> = VecDeque::new();

    for root in roots {
        let resolved = importer.resolve(".", root.as_str(), false).await?;
        if visited.insert(resolved.found_at.clone()) {
            if let Some(text) = resolved.contents.as_text() {
                for statement in scan_imports(text) {
                    queue.push_back((resolved.found_at.clone(), statement));
                }
            }
        }
    }

    while let Some((from, statement)) = queue.pop_front() {
        let binary = statement.kind == ImportKind::Bin;
        let resolved = importer.resolve(&from, &statement.path, binary).await?;
        let found_at = strip_binary_suffix(&resolved.found_at).to_string();

        // A data literal has no external file of its own; only the imports
        // nested inside it materialize as dependencies.
        if !statement.path.starts_with("data:,") {
            deps.insert(found_at.clone());
        }

        if statement.kind == ImportKind::Code && visited.insert(found_at) {
            if let Some(text) = resolved.contents.as_text() {
                for nested in scan_imports(text) {
                    queue.push_back((resolved.found_at.clone(), nested));
                }
            }
        }
    }

    deps.into_iter()
        .map(|s| {
            Url::parse(&s).map_err(|e| CoreError::InvalidUrl {
                url: s.clone(),
                reason: e.to_string(),
            })
        })
        .collect()
}

/// Scan source text for import statements.
///
/// Lexical only: tracks comments (`//`, `#`, `/* */`) and string literals
/// (including `@'...'` verbatim strings) well enough to find the statement
/// keyword followed by its path literal. No evaluation happens here, so
/// computed import paths are invisible to this pass.
pub fn scan_imports(source: &str) -> Vec<ImportStatement> {
    let bytes = source.as_bytes();
    let mut out = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'/' if bytes.get(i + 1) == Some(&b'/') => skip_line(bytes, &mut i),
            b'#' => skip_line(bytes, &mut i),
            b'/' if bytes.get(i + 1) == Some(&b'*') => skip_block_comment(bytes, &mut i),
            b'\'' | b'"' => {
                read_quoted(bytes, &mut i);
            }
            b'@' if matches!(bytes.get(i + 1), Some(b'\'') | Some(b'"')) => {
                i += 1;
                read_verbatim(bytes, &mut i);
            }
            c if c.is_ascii_alphabetic() || c == b'_' => {
                let start = i;
                while i < bytes.len()
                    && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'_')
                {
                    i += 1;
                }
                let kind = match &source[start..i] {
                    "import" => ImportKind::Code,
                    "importstr" => ImportKind::Str,
                    "importbin" => ImportKind::Bin,
                    _ => continue,
                };
                if let Some(path) = read_path_literal(bytes, &mut i) {
                    out.push(ImportStatement { kind, path });
                }
            }
            _ => i += 1,
        }
    }
    out
}

fn skip_line(bytes: &[u8], i: &mut usize) {
    while *i < bytes.len() && bytes[*i] != b'\n' {
        *i += 1;
    }
}

fn skip_block_comment(bytes: &[u8], i: &mut usize) {
    *i += 2;
    while *i < bytes.len() {
        if bytes[*i] == b'*' && bytes.get(*i + 1) == Some(&b'/') {
            *i += 2;
            return;
        }
        *i += 1;
    }
}

/// Read a quoted string starting at the opening quote; returns the cooked
/// bytes and leaves `i` past the closing quote.
fn read_quoted(bytes: &[u8], i: &mut usize) -> Vec<u8> {
    let quote = bytes[*i];
    *i += 1;
    let mut value = Vec::new();
    while *i < bytes.len() {
        match bytes[*i] {
            b'\\' if *i + 1 < bytes.len() => {
                value.push(bytes[*i + 1]);
                *i += 2;
            }
            c if c == quote => {
                *i += 1;
                break;
            }
            c => {
                value.push(c);
                *i += 1;
            }
        }
    }
    value
}

/// Read an `@'...'` verbatim string (quote doubling escapes the quote).
fn read_verbatim(bytes: &[u8], i: &mut usize) -> Vec<u8> {
    let quote = bytes[*i];
    *i += 1;
    let mut value = Vec::new();
    while *i < bytes.len() {
        if bytes[*i] == quote {
            if bytes.get(*i + 1) == Some(&quote) {
                value.push(quote);
                *i += 2;
            } else {
                *i += 1;
                break;
            }
        } else {
            value.push(bytes[*i]);
            *i += 1;
        }
    }
    value
}

/// After an import keyword: skip whitespace and comments, then read the
/// path string literal if one follows.
fn read_path_literal(bytes: &[u8], i: &mut usize) -> Option<String> {
    loop {
        while *i < bytes.len() && bytes[*i].is_ascii_whitespace() {
            *i += 1;
        }
        match bytes.get(*i) {
            Some(b'/') if bytes.get(*i + 1) == Some(&b'/') => skip_line(bytes, i),
            Some(b'#') => skip_line(bytes, i),
            Some(b'/') if bytes.get(*i + 1) == Some(&b'*') => skip_block_comment(bytes, i),
            _ => break,
        }
    }
    let value = match bytes.get(*i) {
        Some(b'\'') | Some(b'"') => read_quoted(bytes, i),
        Some(b'@') if matches!(bytes.get(*i + 1), Some(b'\'') | Some(b'"')) => {
            *i += 1;
            read_verbatim(bytes, i)
        }
        _ => return None,
    };
    Some(String::from_utf8_lossy(&value).into_owned())
}
