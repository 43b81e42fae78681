//! Templated-expression detection.
//!
//! A field value may hold a placeholder for a runtime-computed value
//! instead of a constant. Two textual syntaxes are recognized:
//! `${name}` variable substitution and `%%name%%` marker substitution.

use std::sync::LazyLock;

use regex::Regex;

static VARIABLE_SYNTAX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{[^}]+\}").expect("variable syntax pattern"));

static MARKER_SYNTAX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"%%[^%]+%%").expect("marker syntax pattern"));

/// Returns whether a literal string is a templated expression.
#[must_use]
pub fn is_expression(value: &str) -> bool {
    VARIABLE_SYNTAX.is_match(value) || MARKER_SYNTAX.is_match(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variable_syntax() {
        assert!(is_expression("${CUSTOMER_ID}"));
        assert!(is_expression("prefix-${id}-suffix"));
    }

    #[test]
    fn marker_syntax() {
        assert!(is_expression("%%now%%"));
    }

    #[test]
    fn plain_literals() {
        assert!(!is_expression("Ann"));
        assert!(!is_expression("5"));
        assert!(!is_expression("$100"));
        assert!(!is_expression("${unterminated"));
        assert!(!is_expression("100%"));
        assert!(!is_expression(""));
    }
}
