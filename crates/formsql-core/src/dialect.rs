//! SQL dialect support.
//!
//! Different databases have slightly different SQL syntax. This module
//! covers the two dialect-sensitive parts of the engine: identifier
//! quoting and the stored-procedure CALL template.

use serde::{Deserialize, Serialize};

/// A named SQL-variant profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SqlDialect {
    /// MySQL / MariaDB.
    MySql,
    /// PostgreSQL.
    Postgres,
    /// Oracle.
    Oracle,
    /// IBM DB2.
    Db2,
    /// Microsoft SQL Server.
    SqlServer,
    /// Fallback for unrecognized dialect tags.
    #[default]
    Generic,
}

impl SqlDialect {
    /// Resolves a dialect tag as found in a connection descriptor.
    ///
    /// Matching is case-insensitive and accepts both long and short forms
    /// ("Microsoft SQL Server", "mssql" and "sqlserver" are the same
    /// dialect). Unknown tags resolve to `Generic`.
    #[must_use]
    pub fn from_tag(tag: &str) -> Self {
        let tag = tag.to_ascii_lowercase();
        if tag.contains("mysql") || tag.contains("maria") {
            Self::MySql
        } else if tag.contains("postgres") {
            Self::Postgres
        } else if tag.contains("oracle") {
            Self::Oracle
        } else if tag.contains("db2") {
            Self::Db2
        } else if tag.contains("microsoft") || tag.contains("mssql") || tag.contains("sqlserver") {
            Self::SqlServer
        } else {
            Self::Generic
        }
    }

    /// Returns the name of the dialect.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::MySql => "MySQL",
            Self::Postgres => "PostgreSQL",
            Self::Oracle => "Oracle",
            Self::Db2 => "IBM DB2",
            Self::SqlServer => "Microsoft SQL Server",
            Self::Generic => "Generic",
        }
    }

    /// Quotes an identifier, escaping the dialect's own quote character by
    /// doubling it.
    #[must_use]
    pub fn quote_identifier(&self, name: &str) -> String {
        match self {
            Self::MySql => format!("`{}`", name.replace('`', "``")),
            Self::SqlServer => format!("[{}]", name.replace(']', "]]")),
            _ => format!("\"{}\"", name.replace('"', "\"\"")),
        }
    }

    /// Renders a stored-procedure call statement.
    ///
    /// Oracle uses an anonymous block, SQL Server uses EXEC, everything
    /// else uses the portable CALL form.
    #[must_use]
    pub fn call_statement(&self, procedure: &str, arguments: &[String]) -> String {
        let args = arguments.join(", ");
        match self {
            Self::Oracle => format!("BEGIN {procedure}({args}); END;"),
            Self::SqlServer => {
                if arguments.is_empty() {
                    format!("EXEC {procedure}")
                } else {
                    format!("EXEC {procedure} {args}")
                }
            }
            _ => format!("CALL {procedure}({args})"),
        }
    }
}

/// Removes identifier quoting from a name, regardless of dialect.
///
/// A name wrapped in backticks, double quotes or square brackets is
/// unwrapped and its doubled internal quote characters are restored; an
/// unquoted name is returned as-is.
#[must_use]
pub fn unquote_identifier(name: &str) -> String {
    let name = name.trim();
    if name.len() >= 2 {
        if let Some(inner) = name.strip_prefix('`').and_then(|n| n.strip_suffix('`')) {
            return inner.replace("``", "`");
        }
        if let Some(inner) = name.strip_prefix('"').and_then(|n| n.strip_suffix('"')) {
            return inner.replace("\"\"", "\"");
        }
        if let Some(inner) = name.strip_prefix('[').and_then(|n| n.strip_suffix(']')) {
            return inner.replace("]]", "]");
        }
    }
    name.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_resolution() {
        assert_eq!(SqlDialect::from_tag("MySQL"), SqlDialect::MySql);
        assert_eq!(SqlDialect::from_tag("mariadb"), SqlDialect::MySql);
        assert_eq!(SqlDialect::from_tag("PostgreSQL"), SqlDialect::Postgres);
        assert_eq!(SqlDialect::from_tag("ORACLE"), SqlDialect::Oracle);
        assert_eq!(SqlDialect::from_tag("IBM DB2"), SqlDialect::Db2);
        assert_eq!(
            SqlDialect::from_tag("Microsoft SQL Server"),
            SqlDialect::SqlServer
        );
        assert_eq!(SqlDialect::from_tag("mssql"), SqlDialect::SqlServer);
        assert_eq!(SqlDialect::from_tag("h2"), SqlDialect::Generic);
    }

    #[test]
    fn quoting_per_dialect() {
        assert_eq!(SqlDialect::MySql.quote_identifier("id"), "`id`");
        assert_eq!(SqlDialect::Postgres.quote_identifier("id"), "\"id\"");
        assert_eq!(SqlDialect::Oracle.quote_identifier("id"), "\"id\"");
        assert_eq!(SqlDialect::Db2.quote_identifier("id"), "\"id\"");
        assert_eq!(SqlDialect::SqlServer.quote_identifier("id"), "[id]");
        assert_eq!(SqlDialect::Generic.quote_identifier("id"), "\"id\"");
    }

    #[test]
    fn own_quote_character_is_doubled() {
        assert_eq!(SqlDialect::MySql.quote_identifier("a`b"), "`a``b`");
        assert_eq!(SqlDialect::Postgres.quote_identifier("a\"b"), "\"a\"\"b\"");
        assert_eq!(SqlDialect::SqlServer.quote_identifier("a]b"), "[a]]b]");
    }

    #[test]
    fn unquote_restores_doubled_characters() {
        assert_eq!(unquote_identifier("`a``b`"), "a`b");
        assert_eq!(unquote_identifier("\"a\"\"b\""), "a\"b");
        assert_eq!(unquote_identifier("[a]]b]"), "a]b");
        assert_eq!(unquote_identifier("plain"), "plain");
        assert_eq!(unquote_identifier(" padded "), "padded");
    }

    #[test]
    fn call_templates() {
        let args = vec!["1".to_string(), "NULL".to_string()];
        assert_eq!(
            SqlDialect::Oracle.call_statement("p", &args),
            "BEGIN p(1, NULL); END;"
        );
        assert_eq!(SqlDialect::SqlServer.call_statement("p", &args), "EXEC p 1, NULL");
        assert_eq!(SqlDialect::SqlServer.call_statement("p", &[]), "EXEC p");
        assert_eq!(SqlDialect::MySql.call_statement("p", &args), "CALL p(1, NULL)");
        assert_eq!(SqlDialect::Generic.call_statement("p", &[]), "CALL p()");
    }
}
