//! Read-only schema view for parse-time validation.

use serde::{Deserialize, Serialize};

/// A column or procedure-parameter descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDef {
    /// Column/parameter name.
    pub name: String,
    /// Declared SQL type.
    pub column_type: String,
}

impl ColumnDef {
    /// Creates a new descriptor.
    #[must_use]
    pub fn new(name: impl Into<String>, column_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            column_type: column_type.into(),
        }
    }
}

/// An introspected schema: tables with their columns and stored
/// procedures with their ordinal parameters.
///
/// Produced by the connection layer's cache, consumed read-only by the
/// parser. Name lookups are case-insensitive, matching how databases
/// resolve unquoted identifiers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaSnapshot {
    tables: Vec<(String, Vec<ColumnDef>)>,
    procedures: Vec<(String, Vec<ColumnDef>)>,
}

impl SchemaSnapshot {
    /// Creates an empty snapshot.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            tables: Vec::new(),
            procedures: Vec::new(),
        }
    }

    /// Adds (or replaces) a table and its columns.
    pub fn add_table(&mut self, name: impl Into<String>, columns: Vec<ColumnDef>) {
        let name = name.into();
        if let Some(slot) = self
            .tables
            .iter_mut()
            .find(|(t, _)| t.eq_ignore_ascii_case(&name))
        {
            slot.1 = columns;
        } else {
            self.tables.push((name, columns));
        }
    }

    /// Adds (or replaces) a procedure and its ordinal parameters.
    pub fn add_procedure(&mut self, name: impl Into<String>, parameters: Vec<ColumnDef>) {
        let name = name.into();
        if let Some(slot) = self
            .procedures
            .iter_mut()
            .find(|(p, _)| p.eq_ignore_ascii_case(&name))
        {
            slot.1 = parameters;
        } else {
            self.procedures.push((name, parameters));
        }
    }

    /// Returns whether the named table exists.
    #[must_use]
    pub fn has_table(&self, name: &str) -> bool {
        self.tables.iter().any(|(t, _)| t.eq_ignore_ascii_case(name))
    }

    /// Returns whether the named procedure exists.
    #[must_use]
    pub fn has_procedure(&self, name: &str) -> bool {
        self.procedures
            .iter()
            .any(|(p, _)| p.eq_ignore_ascii_case(name))
    }

    /// Iterates over table names in introspection order.
    pub fn table_names(&self) -> impl Iterator<Item = &str> {
        self.tables.iter().map(|(t, _)| t.as_str())
    }

    /// Returns the columns of the named table.
    #[must_use]
    pub fn columns(&self, table: &str) -> Option<&[ColumnDef]> {
        self.tables
            .iter()
            .find(|(t, _)| t.eq_ignore_ascii_case(table))
            .map(|(_, cols)| cols.as_slice())
    }

    /// Returns the declared type of a column, if the table and column exist.
    #[must_use]
    pub fn column_type(&self, table: &str, column: &str) -> Option<&str> {
        self.columns(table)?
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(column))
            .map(|c| c.column_type.as_str())
    }

    /// Returns the ordinal parameters of the named procedure.
    #[must_use]
    pub fn parameters(&self, procedure: &str) -> Option<&[ColumnDef]> {
        self.procedures
            .iter()
            .find(|(p, _)| p.eq_ignore_ascii_case(procedure))
            .map(|(_, params)| params.as_slice())
    }

    /// Returns whether the snapshot holds no tables and no procedures.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty() && self.procedures.is_empty()
    }
}
