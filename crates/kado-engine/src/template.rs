//! Template rendering against the flattened data file.
//!
//! A template's first line names its output, relative to the landing zone,
//! in angle brackets: `<inventory.ini>`. The rest is copied with `{{ ... }}`
//! actions substituted:
//!
//! | action                        | result                                   |
//! |-------------------------------|------------------------------------------|
//! | `{{ Get "a.b" }}`, `{{ a.b }}`| value of `a.b`, or `<no value>`          |
//! | `{{ Env "HOME" }}`            | environment variable, empty when unset   |
//! | `{{ join "hosts" ", " }}`     | `hosts[0]`, `hosts[1]`, ... joined       |
//! | `{{ GetKeysAsArray "a" }}`    | direct child keys of `a` as `["x", "y"]` |
//!
//! Any other action is left in the output untouched.

use std::path::{Component, Path, PathBuf};
use thiserror::Error;

use kado_core::flatten::FlatMap;

/// Printed for lookups of keys the data file does not have.
pub const NO_VALUE: &str = "<no value>";

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("invalid file name format in template: {0}")]
    Header(String),

    #[error("template output {0} must stay inside the landing zone")]
    Escapes(String),

    #[error("unterminated action starting at line {0}")]
    Unterminated(usize),

    #[error("failed to read template")]
    Read(#[source] std::io::Error),

    #[error("failed to write {}", .0.display())]
    Write(PathBuf, #[source] std::io::Error),
}

/// A rendered template: where it goes and what it contains.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub output: PathBuf,
    pub content: String,
}

/// Splits off the `<output>` header and renders the body.
pub fn render_template(text: &str, data: &FlatMap) -> Result<Rendered, TemplateError> {
    let (header, body) = text.split_once('\n').unwrap_or((text, ""));
    let header = header.trim_end_matches('\r');
    let name = header
        .strip_prefix('<')
        .and_then(|h| h.strip_suffix('>'))
        .filter(|name| !name.trim().is_empty())
        .ok_or_else(|| TemplateError::Header(header.to_string()))?;
    let output = PathBuf::from(name.trim());
    if output
        .components()
        .any(|c| matches!(c, Component::RootDir | Component::Prefix(_) | Component::ParentDir))
    {
        return Err(TemplateError::Escapes(name.trim().to_string()));
    }

    Ok(Rendered {
        output,
        content: render(body, data)?,
    })
}

/// Renders the template at `path` and writes it under `landing_zone`.
/// Returns the written path.
pub fn render_file(
    path: &Path,
    data: &FlatMap,
    landing_zone: &Path,
) -> Result<PathBuf, TemplateError> {
    let text = std::fs::read_to_string(path).map_err(TemplateError::Read)?;
    let rendered = render_template(&text, data)?;
    let dest = landing_zone.join(&rendered.output);
    if let Some(parent) = dest.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| TemplateError::Write(dest.clone(), e))?;
    }
    std::fs::write(&dest, rendered.content)
        .map_err(|e| TemplateError::Write(dest.clone(), e))?;
    Ok(dest)
}

/// Substitutes every `{{ ... }}` action in `text`.
pub fn render(text: &str, data: &FlatMap) -> Result<String, TemplateError> {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(open) = rest.find("{{") {
        out.push_str(&rest[..open]);
        let after = &rest[open + 2..];
        let Some(close) = after.find("}}") else {
            let consumed = text.len() - rest.len() + open;
            let line = text[..consumed].matches('\n').count() + 1;
            return Err(TemplateError::Unterminated(line));
        };
        let action = &after[..close];
        match evaluate(action, data) {
            Some(value) => out.push_str(&value),
            None => {
                out.push_str("{{");
                out.push_str(action);
                out.push_str("}}");
            }
        }
        rest = &after[close + 2..];
    }
    out.push_str(rest);
    Ok(out)
}

#[derive(Debug, PartialEq, Eq)]
enum Token<'a> {
    Ident(&'a str),
    Str(String),
}

fn evaluate(action: &str, data: &FlatMap) -> Option<String> {
    let tokens = tokenize(action.trim())?;
    match tokens.as_slice() {
        [Token::Ident("Get"), Token::Str(key)] => Some(lookup(data, key)),
        [Token::Ident("Env"), Token::Str(var)] => Some(std::env::var(var).unwrap_or_default()),
        [Token::Ident("join"), Token::Str(key), Token::Str(sep)] => Some(join(data, key, sep)),
        [Token::Ident("GetKeysAsArray"), Token::Str(key)] => Some(keys_as_array(data, key)),
        [Token::Ident(path)] if is_key_path(path) => {
            Some(lookup(data, path.trim_start_matches('.')))
        }
        _ => None,
    }
}

fn tokenize(action: &str) -> Option<Vec<Token<'_>>> {
    let mut tokens = Vec::new();
    let mut rest = action.trim_start();
    while !rest.is_empty() {
        if let Some(quoted) = rest.strip_prefix('"') {
            let mut value = String::new();
            let mut chars = quoted.char_indices();
            let end = loop {
                match chars.next()? {
                    (i, '"') => break i,
                    (_, '\\') => value.push(match chars.next()?.1 {
                        'n' => '\n',
                        't' => '\t',
                        c => c,
                    }),
                    (_, c) => value.push(c),
                }
            };
            tokens.push(Token::Str(value));
            rest = quoted[end + 1..].trim_start();
        } else {
            let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
            tokens.push(Token::Ident(&rest[..end]));
            rest = rest[end..].trim_start();
        }
    }
    Some(tokens)
}

/// Bare actions are lookups only when they look like a path (`.name`,
/// `a.b`, `list[0]`); a lone word such as `end` is not.
fn is_key_path(word: &str) -> bool {
    let looks_like_path = word.starts_with('.') || word.contains(['.', '[']);
    let word = word.trim_start_matches('.');
    looks_like_path
        && !word.is_empty()
        && word
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.' | '[' | ']'))
}

fn lookup(data: &FlatMap, key: &str) -> String {
    data.get(key).cloned().unwrap_or_else(|| NO_VALUE.to_string())
}

fn join(data: &FlatMap, key: &str, sep: &str) -> String {
    (0..)
        .map_while(|i| data.get(&format!("{key}[{i}]")))
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(sep)
}

fn keys_as_array(data: &FlatMap, key: &str) -> String {
    let prefix = format!("{key}.");
    let mut names: Vec<&str> = Vec::new();
    for full in data.keys() {
        let Some(child) = full.strip_prefix(&prefix) else {
            continue;
        };
        if child.contains('.') {
            continue;
        }
        let name = child.split('[').next().unwrap_or(child);
        if !names.contains(&name) {
            names.push(name);
        }
    }
    let quoted: Vec<String> = names.iter().map(|n| format!("\"{n}\"")).collect();
    format!("[{}]", quoted.join(", "))
}
