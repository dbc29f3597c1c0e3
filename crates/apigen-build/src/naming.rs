//! Identifier derivation shared by every generator.

use heck::{ToKebabCase, ToSnakeCase, ToUpperCamelCase};

/// Strict and reserved Rust keywords.
const RUST_KEYWORDS: &[&str] = &[
    "abstract", "as", "async", "await", "become", "box", "break", "const", "continue", "crate",
    "do", "dyn", "else", "enum", "extern", "false", "final", "fn", "for", "gen", "if", "impl",
    "in", "let", "loop", "macro", "match", "mod", "move", "mut", "override", "priv", "pub", "ref",
    "return", "self", "Self", "static", "struct", "super", "trait", "true", "try", "type",
    "typeof", "unsafe", "unsized", "use", "virtual", "where", "while", "yield",
];

/// Whether `name` is a Rust keyword.
#[must_use]
pub fn is_keyword(name: &str) -> bool {
    RUST_KEYWORDS.contains(&name)
}

/// Local Rust binding for a wire name: snake case, `_`-prefixed when it
/// would start with a digit or collide with a keyword.
#[must_use]
pub fn field_name(wire: &str) -> String {
    let snake = wire.to_snake_case();
    if snake.is_empty() {
        return "_value".to_string();
    }
    if snake.starts_with(|c: char| c.is_ascii_digit()) || is_keyword(&snake) {
        format!("_{snake}")
    } else {
        snake
    }
}

/// Type name for a hint (`flavor_ref` → `FlavorRef`).
#[must_use]
pub fn type_name(hint: &str) -> String {
    let name = hint.to_upper_camel_case();
    if name.is_empty() {
        "Value".to_string()
    } else if name.starts_with(|c: char| c.is_ascii_digit()) {
        format!("V{name}")
    } else {
        name
    }
}

/// Module (file) name for a segment (`os-interfaces` → `os_interfaces`).
#[must_use]
pub fn module_name(segment: &str) -> String {
    segment.to_snake_case()
}

/// Module name as it appears in a `pub mod` line.
#[must_use]
pub fn module_ident(name: &str) -> String {
    if is_keyword(name) {
        format!("r#{name}")
    } else {
        name.to_string()
    }
}

/// Kebab-case form (`os_start` → `os-start`).
#[must_use]
pub fn kebab(name: &str) -> String {
    name.to_kebab_case()
}

/// English plural: `y` → `ies`, otherwise append `s`.
#[must_use]
pub fn pluralize(word: &str) -> String {
    match word.strip_suffix('y') {
        Some(stem) => format!("{stem}ies"),
        None => format!("{word}s"),
    }
}

/// Best-effort English singular of a collection name.
#[must_use]
pub fn singularize(word: &str) -> String {
    if let Some(stem) = word.strip_suffix("ies") {
        return format!("{stem}y");
    }
    for suffix in ["sses", "xes", "ches", "shes", "uses"] {
        if word.ends_with(suffix) {
            return word[..word.len() - 2].to_string();
        }
    }
    if word.ends_with("ss") {
        return word.to_string();
    }
    word.strip_suffix('s').unwrap_or(word).to_string()
}

/// `2.1` → `21`, used as a file name suffix for microversion variants.
#[must_use]
pub fn microversion_suffix(version: &str) -> String {
    version.chars().filter(char::is_ascii_alphanumeric).collect()
}

/// Quote a string as a Rust string literal.
#[must_use]
pub fn rust_str(value: &str) -> String {
    format!("{value:?}")
}
