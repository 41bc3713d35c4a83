//! Array literal writer.

use std::fmt::{
    self,
    Write,
};

use serde_json::{
    Number,
    Value,
};

use crate::Translations;

const INDENT: &str = "    ";

/// Key of an exported array entry.
enum EntryKey<'a> {
    Name(&'a str),
    Index(usize),
}

/// Writes `translations` as an array literal.
///
/// Maps iterate in key order, so equal input always produces equal output.
/// Entries are indented by four spaces per level and the last entry of an
/// array carries no trailing comma.
pub fn export(translations: &Translations) -> Result<String, fmt::Error> {
    let mut out = String::new();
    write_entries(&mut out, translations.iter().map(|(k, v)| (EntryKey::Name(k), v)), 0)?;
    Ok(out)
}

/// Writes a complete group file returning `translations`.
pub fn render_file(translations: &Translations) -> Result<String, fmt::Error> {
    Ok(format!("<?php\n\nreturn {};\n", export(translations)?))
}

fn write_entries<'a>(
    out: &mut String,
    entries: impl ExactSizeIterator<Item = (EntryKey<'a>, &'a Value)>,
    depth: usize,
) -> fmt::Result {
    if entries.len() == 0 {
        return out.write_str("[]");
    }

    out.write_str("[\n")?;
    let mut entries = entries.peekable();
    while let Some((key, value)) = entries.next() {
        out.write_str(&INDENT.repeat(depth + 1))?;
        match key {
            EntryKey::Name(name) if is_integer_key(name) => out.write_str(name)?,
            EntryKey::Name(name) => write_string(out, name)?,
            EntryKey::Index(index) => write!(out, "{index}")?,
        }
        out.write_str(" => ")?;
        write_value(out, value, depth + 1)?;
        if entries.peek().is_some() {
            out.write_char(',')?;
        }
        out.write_char('\n')?;
    }
    out.write_str(&INDENT.repeat(depth))?;
    out.write_char(']')
}

fn write_value(out: &mut String, value: &Value, depth: usize) -> fmt::Result {
    match value {
        Value::Object(map) => {
            write_entries(out, map.iter().map(|(k, v)| (EntryKey::Name(k), v)), depth)
        }
        Value::Array(items) => write_entries(
            out,
            items.iter().enumerate().map(|(i, v)| (EntryKey::Index(i), v)),
            depth,
        ),
        Value::String(s) => write_string(out, s),
        Value::Number(n) => write_number(out, n),
        Value::Bool(b) => write!(out, "{b}"),
        Value::Null => out.write_str("null"),
    }
}

/// Single-quoted string; only `\` and `'` need escaping.
fn write_string(out: &mut String, s: &str) -> fmt::Result {
    out.write_char('\'')?;
    for c in s.chars() {
        if c == '\\' || c == '\'' {
            out.write_char('\\')?;
        }
        out.write_char(c)?;
    }
    out.write_char('\'')
}

fn write_number(out: &mut String, n: &Number) -> fmt::Result {
    let text = n.to_string();
    if n.is_f64() && !text.contains(['.', 'e', 'E']) {
        write!(out, "{text}.0")
    } else {
        out.write_str(&text)
    }
}

/// Canonical integer keys are written bare.
fn is_integer_key(key: &str) -> bool {
    key.parse::<i64>().is_ok_and(|int| int.to_string() == key)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::json;

    use super::*;
    use crate::literal::parse;
    use crate::test_utils::translations;

    #[rstest]
    fn test_render_file_nested_layout() {
        let input = translations(json!({
            "welcome": "Welcome",
            "auth": {
                "failed": "Wrong password",
                "throttle": "Too many attempts"
            }
        }));

        let result = render_file(&input).unwrap();

        assert_eq!(
            result,
            "<?php\n\nreturn [\n    'auth' => [\n        'failed' => 'Wrong password',\n        'throttle' => 'Too many attempts'\n    ],\n    'welcome' => 'Welcome'\n];\n"
        );
    }

    #[rstest]
    fn test_export_empty_map() {
        assert_eq!(export(&translations(json!({}))).unwrap(), "[]");
        assert_eq!(
            export(&translations(json!({"empty": {}}))).unwrap(),
            "[\n    'empty' => []\n]"
        );
    }

    #[rstest]
    #[case(json!("It's a \\ test"), r"'It\'s a \\ test'")]
    #[case(json!(42), "42")]
    #[case(json!(-1.5), "-1.5")]
    #[case(json!(true), "true")]
    #[case(json!(null), "null")]
    #[case(json!(["a", "b"]), "[\n        0 => 'a',\n        1 => 'b'\n    ]")]
    fn test_export_scalar_values(#[case] value: Value, #[case] expected: &str) {
        let result = export(&translations(json!({ "key": value }))).unwrap();

        assert_eq!(result, format!("[\n    'key' => {expected}\n]"));
    }

    #[rstest]
    fn test_export_integer_keys_are_bare() {
        let result = export(&translations(json!({"0": "zero", "07": "padded", "-3": "neg"}))).unwrap();

        assert_eq!(result, "[\n    -3 => 'neg',\n    0 => 'zero',\n    '07' => 'padded'\n]");
    }

    #[rstest]
    fn test_rendered_file_parses_back() {
        let input = translations(json!({
            "validation": {
                "custom": {"email.required": "We need your e-mail. Please."},
                "quote": "Don't \\ stop"
            },
            "count": 3
        }));

        let rendered = render_file(&input).unwrap();

        assert_eq!(parse(&rendered).unwrap(), input);
    }
}
