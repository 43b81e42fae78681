//! Literal-quoting policy.
//!
//! Decides whether a field value is emitted as a bare SQL literal or
//! wrapped in single quotes. The decision is type-driven first: an
//! explicit column type wins, then a type name extracted from the help
//! tip, and only when no type information exists at all does the shape of
//! the value itself get a vote.

use std::sync::LazyLock;

use regex::Regex;

use crate::fields::DynamicFieldValue;

/// SQL type names whose values are written without string quotes.
const UNQUOTED_TYPES: &[&str] = &[
    "INTEGER", "INT", "SMALLINT", "BIGINT", "TINYINT", "SERIAL", "DECIMAL", "NUMERIC", "NUMBER",
    "FLOAT", "REAL", "DOUBLE", "BOOLEAN", "BOOL", "BIT", "DATE", "TIME", "TIMESTAMP", "DATETIME",
];

/// Extracts a declared type from a help tip, e.g. "Column type: INTEGER".
static HELP_TIP_TYPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Column type:\s*([A-Za-z0-9_]+)").expect("help tip pattern"));

/// Integer or decimal literal shape.
static NUMERIC_SHAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-?[0-9]+(\.[0-9]+)?$").expect("numeric shape pattern"));

/// Returns whether the given type name is exempt from string quoting.
///
/// A size suffix such as `DECIMAL(10,2)` is ignored; matching is
/// case-insensitive on the base name.
fn type_is_exempt(column_type: &str) -> bool {
    let base = column_type
        .split('(')
        .next()
        .unwrap_or(column_type)
        .trim()
        .to_ascii_uppercase();
    UNQUOTED_TYPES.contains(&base.as_str())
}

/// Returns whether a field's value must be wrapped in string quotes.
///
/// Decided in order: explicit `column_type` against the allow-list, then a
/// type name extracted from the help tip, then (only when neither source
/// yields a type) a best-effort guess from the literal shape. The shape
/// fallback is a known mis-quoting hazard for numeric-looking string keys
/// and is preserved deliberately; ambiguous values default to quoted.
#[must_use]
pub fn needs_quotes(field: &DynamicFieldValue) -> bool {
    if let Some(column_type) = field.column_type.as_deref().filter(|t| !t.is_empty()) {
        return !type_is_exempt(column_type);
    }

    if let Some(tip_type) = field
        .help_tip
        .as_deref()
        .and_then(|tip| HELP_TIP_TYPE.captures(tip))
        .map(|c| c[1].to_string())
    {
        return !type_is_exempt(&tip_type);
    }

    let Some(value) = field.value.as_deref() else {
        return true;
    };
    !(NUMERIC_SHAPE.is_match(value)
        || value.eq_ignore_ascii_case("true")
        || value.eq_ignore_ascii_case("false"))
}

/// Wraps a value in single quotes, doubling internal single quotes.
#[must_use]
pub fn quote_string_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Removes single-quote wrapping from a literal, restoring doubled quotes.
///
/// Returns `None` when the input is not a quoted string.
#[must_use]
pub fn unquote_string_literal(value: &str) -> Option<String> {
    let value = value.trim();
    if value.len() >= 2 {
        if let Some(inner) = value.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')) {
            return Some(inner.replace("''", "'"));
        }
    }
    None
}
