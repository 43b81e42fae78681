//! Parser error types.

/// Errors produced while recognizing a hand-edited statement.
///
/// Each of these clears the builder-derived fields when surfaced, so a
/// rejected statement is never shown next to stale derived state.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// The statement does not fit the single supported shape for its kind
    /// (joins, subqueries, unions and nested parentheses are rejected).
    #[error("complex query shape is not supported here; use a raw-query operation instead")]
    UnsupportedQueryShape,

    /// The referenced table is absent from the introspected table list.
    #[error("table '{0}' was not found in the connected schema")]
    TableNotFound(String),

    /// A referenced column is absent from the table's columns.
    #[error("field '{column}' was not found in table '{table}'")]
    FieldNotFound {
        /// The table that was checked.
        table: String,
        /// The missing column.
        column: String,
    },

    /// A WHERE conjunct did not match `column operator value`.
    #[error("could not parse WHERE condition near '{0}'")]
    WhereParseError(String),

    /// The INSERT column and value lists have different lengths.
    #[error("INSERT lists {columns} columns but {values} values")]
    InsertArityMismatch {
        /// Number of columns listed.
        columns: usize,
        /// Number of values listed.
        values: usize,
    },

    /// A CALL supplies a different number of arguments than the procedure
    /// declares.
    #[error("procedure '{procedure}' declares {expected} parameters but {actual} were supplied")]
    CallArityMismatch {
        /// The procedure name.
        procedure: String,
        /// Declared parameter count.
        expected: usize,
        /// Supplied argument count.
        actual: usize,
    },
}

/// Result type for parser operations.
pub type Result<T> = std::result::Result<T, ParseError>;
