//! Statement shapes shared by the builder and the parser.

use serde::{Deserialize, Serialize};

/// The four statement kinds the engine synchronizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatementKind {
    /// `SELECT ... FROM ...`
    Select,
    /// `INSERT INTO ... VALUES ...`
    Insert,
    /// `DELETE FROM ...`
    Delete,
    /// Stored-procedure call.
    Call,
}

impl StatementKind {
    /// Returns the SQL keyword for this kind.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Select => "SELECT",
            Self::Insert => "INSERT",
            Self::Delete => "DELETE",
            Self::Call => "CALL",
        }
    }
}

impl std::fmt::Display for StatementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One `column operator value` conjunct of a WHERE clause.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WhereClause {
    /// Column name, unquoted.
    pub column: String,
    /// Comparison operator as written.
    pub operator: String,
    /// Right-hand side, with string quoting already removed.
    pub value: String,
}

/// A recognized statement, one shape per kind.
///
/// Produced by the parser and consumed immediately; never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParsedStatement {
    /// A single-table SELECT.
    Select {
        /// Table name, unquoted.
        table: String,
        /// Selected column names; empty means `*`.
        columns: Vec<String>,
        /// WHERE conjuncts, joined by AND.
        where_clauses: Vec<WhereClause>,
        /// ORDER BY column, unquoted.
        order_by: Option<String>,
        /// LIMIT value as written.
        limit: Option<String>,
        /// OFFSET value as written.
        offset: Option<String>,
    },
    /// A single-table INSERT.
    Insert {
        /// Table name, unquoted.
        table: String,
        /// Column names, unquoted.
        columns: Vec<String>,
        /// Values, positionally matching `columns`, unquoted.
        values: Vec<String>,
    },
    /// A single-table DELETE.
    Delete {
        /// Table name, unquoted.
        table: String,
        /// WHERE conjuncts, joined by AND.
        where_clauses: Vec<WhereClause>,
    },
    /// A stored-procedure call.
    Call {
        /// Procedure name, unquoted.
        procedure: String,
        /// Ordinal arguments, unquoted.
        arguments: Vec<String>,
    },
}

impl ParsedStatement {
    /// Returns the kind of this statement.
    #[must_use]
    pub const fn kind(&self) -> StatementKind {
        match self {
            Self::Select { .. } => StatementKind::Select,
            Self::Insert { .. } => StatementKind::Insert,
            Self::Delete { .. } => StatementKind::Delete,
            Self::Call { .. } => StatementKind::Call,
        }
    }

    /// Returns the table or procedure name.
    #[must_use]
    pub fn table_name(&self) -> &str {
        match self {
            Self::Select { table, .. }
            | Self::Insert { table, .. }
            | Self::Delete { table, .. } => table,
            Self::Call { procedure, .. } => procedure,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_and_table_accessors() {
        let stmt = ParsedStatement::Delete {
            table: "users".to_string(),
            where_clauses: vec![],
        };
        assert_eq!(stmt.kind(), StatementKind::Delete);
        assert_eq!(stmt.table_name(), "users");

        let stmt = ParsedStatement::Call {
            procedure: "audit".to_string(),
            arguments: vec![],
        };
        assert_eq!(stmt.kind(), StatementKind::Call);
        assert_eq!(stmt.table_name(), "audit");
    }

    #[test]
    fn kind_display() {
        assert_eq!(StatementKind::Select.to_string(), "SELECT");
        assert_eq!(StatementKind::Call.to_string(), "CALL");
    }
}
