//! GDScript lexical details: keywords, literals and operator precedence

use std::borrow::Cow;

/// Words GDScript reserves that are ordinary identifiers in source.
const KEYWORDS: &[&str] = &[
    "and", "as", "assert", "breakpoint", "class", "class_name", "const", "elif", "enum",
    "export", "extends", "func", "in", "is", "master", "match", "not", "onready", "or",
    "pass", "preload", "puppet", "remote", "remotesync", "self", "setget", "signal",
    "static", "sync", "tool", "var", "yield", "PI", "TAU", "INF", "NAN",
];

/// Spelling of a source identifier that is safe in GDScript.
pub(crate) fn ident(name: &str) -> Cow<'_, str> {
    if KEYWORDS.contains(&name) {
        Cow::Owned(format!("{}_", name))
    } else {
        Cow::Borrowed(name)
    }
}

/// Double-quoted GDScript string literal. Control characters never reach the
/// output raw.
pub(crate) fn string_literal(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for ch in value.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{7}' => out.push_str("\\a"),
            '\u{8}' => out.push_str("\\b"),
            '\u{b}' => out.push_str("\\v"),
            '\u{c}' => out.push_str("\\f"),
            c if c.is_control() => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Spelling of a numeric literal. Octal has no GDScript form and numeric
/// separators are dropped.
pub(crate) fn number_literal(value: f64, raw: &str) -> String {
    if raw.starts_with("0o") || raw.starts_with("0O") {
        return format!("{}", value as i64);
    }
    raw.replace('_', "")
}

/// `raw` as a float literal, for an integral literal in float position.
pub(crate) fn float_literal(value: f64, raw: &str) -> String {
    let decimal = raw.chars().all(|c| c.is_ascii_digit() || c == '_');
    if decimal {
        format!("{}.0", raw.replace('_', ""))
    } else {
        format!("{:.1}", value)
    }
}

pub(crate) fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

// Binding strength of emitted operators, loosest first.
pub(crate) const PREC_ASSIGN: u8 = 1;
pub(crate) const PREC_OR: u8 = 6;
pub(crate) const PREC_AND: u8 = 7;
pub(crate) const PREC_NOT: u8 = 8;
pub(crate) const PREC_IN: u8 = 9;
pub(crate) const PREC_COMPARE: u8 = 10;
pub(crate) const PREC_BIT_OR: u8 = 11;
pub(crate) const PREC_BIT_XOR: u8 = 12;
pub(crate) const PREC_BIT_AND: u8 = 13;
pub(crate) const PREC_SHIFT: u8 = 14;
pub(crate) const PREC_ADD: u8 = 15;
pub(crate) const PREC_MUL: u8 = 16;
pub(crate) const PREC_NEG: u8 = 17;
pub(crate) const PREC_BIT_NOT: u8 = 18;
pub(crate) const PREC_IS: u8 = 19;
pub(crate) const PREC_ATOM: u8 = 20;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_identifiers() {
        assert_eq!(ident("speed"), "speed");
        assert_eq!(ident("signal"), "signal_");
        assert_eq!(ident("match"), "match_");
    }

    #[test]
    fn test_string_escapes() {
        assert_eq!(string_literal("a\"b\\c\n"), "\"a\\\"b\\\\c\\n\"");
        assert_eq!(string_literal("\u{8}\u{c}\u{b}\0\u{1b}"), r#""\b\f\v\u0000\u001b""#);
        assert_eq!(string_literal("\u{1F600}é"), "\"\u{1F600}é\"");
    }

    #[test]
    fn test_numbers() {
        assert_eq!(number_literal(15.0, "0o17"), "15");
        assert_eq!(number_literal(1000.0, "1_000"), "1000");
        assert_eq!(number_literal(255.0, "0xff"), "0xff");
        assert_eq!(float_literal(3.0, "3"), "3.0");
        assert_eq!(float_literal(255.0, "0xff"), "255.0");
    }

    #[test]
    fn test_is_identifier() {
        assert!(is_identifier("Red"));
        assert!(is_identifier("_x1"));
        assert!(!is_identifier("1x"));
        assert!(!is_identifier("a-b"));
    }
}
