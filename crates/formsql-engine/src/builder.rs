//! Statement building from current field values.
//!
//! One build produces both the display SQL (literals inlined, quoted per
//! the type-driven policy) and the prepared form (`?` placeholders), plus
//! the comma-joined name/type strings of the fields that supplied those
//! placeholders. The surrounding system restores state from the two
//! strings later, so their ordering follows field-iteration order and is
//! deterministic.

use serde::{Deserialize, Serialize};
use tracing::debug;

use formsql_core::{
    is_expression, needs_quotes, quote_string_literal, DynamicFieldValue, FieldValueMap,
    SqlDialect, StatementKind,
};

/// The result of one build: display SQL, prepared SQL and the field
/// name/type strings other parts of the system rely on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuiltQuery {
    /// The display statement with literals inlined.
    pub sql: String,
    /// The parameterized statement with `?` placeholders.
    pub prepared: String,
    /// Comma-joined display names of the fields used, in iteration order.
    pub column_names: String,
    /// Comma-joined declared types of the fields used, in iteration order.
    pub column_types: String,
}

/// Trailing-clause values for SELECT statements.
///
/// Each clause is appended only when its value is non-empty, always in
/// ORDER BY, LIMIT, OFFSET order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectClauses {
    /// ORDER BY column.
    pub order_by: Option<String>,
    /// LIMIT value.
    pub limit: Option<String>,
    /// OFFSET value.
    pub offset: Option<String>,
}

impl SelectClauses {
    /// Creates an empty clause set.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            order_by: None,
            limit: None,
            offset: None,
        }
    }
}

/// Builds SQL statements from field values for one dialect.
#[derive(Debug, Clone, Copy)]
pub struct QueryBuilder {
    dialect: SqlDialect,
}

impl QueryBuilder {
    /// Creates a builder for the given dialect.
    #[must_use]
    pub const fn new(dialect: SqlDialect) -> Self {
        Self { dialect }
    }

    /// Returns the builder's dialect.
    #[must_use]
    pub const fn dialect(&self) -> SqlDialect {
        self.dialect
    }

    /// Builds the statement of the given kind from the current fields.
    #[must_use]
    pub fn build(
        &self,
        kind: StatementKind,
        table: &str,
        fields: &FieldValueMap,
        clauses: &SelectClauses,
    ) -> BuiltQuery {
        let built = match kind {
            StatementKind::Select => self.build_select(table, fields, clauses),
            StatementKind::Insert => self.build_insert(table, fields),
            StatementKind::Delete => self.build_delete(table, fields),
            StatementKind::Call => self.build_call(table, fields),
        };
        debug!(kind = %kind, table, sql = %built.sql, "built statement");
        built
    }

    fn build_select(
        &self,
        table: &str,
        fields: &FieldValueMap,
        clauses: &SelectClauses,
    ) -> BuiltQuery {
        let included: Vec<String> = fields
            .columns()
            .filter(|f| fields.is_included(f))
            .map(|f| self.dialect.quote_identifier(&f.display_name))
            .collect();
        let column_list = if included.is_empty() {
            "*".to_string()
        } else {
            included.join(", ")
        };

        let mut sql = format!(
            "SELECT {column_list} FROM {}",
            self.dialect.quote_identifier(table)
        );
        let mut prepared = sql.clone();

        let active: Vec<&DynamicFieldValue> =
            fields.columns().filter(|f| f.is_active()).collect();
        self.append_where(&mut sql, &mut prepared, &active);

        if let Some(order_by) = non_empty(clauses.order_by.as_deref()) {
            let quoted = self.dialect.quote_identifier(order_by);
            sql.push_str(&format!(" ORDER BY {quoted}"));
            prepared.push_str(&format!(" ORDER BY {quoted}"));
        }
        if let Some(limit) = non_empty(clauses.limit.as_deref()) {
            sql.push_str(&format!(" LIMIT {limit}"));
            prepared.push_str(" LIMIT ?");
        }
        if let Some(offset) = non_empty(clauses.offset.as_deref()) {
            sql.push_str(&format!(" OFFSET {offset}"));
            prepared.push_str(" OFFSET ?");
        }

        BuiltQuery {
            sql,
            prepared,
            column_names: joined_names(&active),
            column_types: joined_types(&active),
        }
    }

    fn build_insert(&self, table: &str, fields: &FieldValueMap) -> BuiltQuery {
        let active: Vec<&DynamicFieldValue> =
            fields.columns().filter(|f| f.is_active()).collect();

        let columns: Vec<String> = active
            .iter()
            .map(|f| self.dialect.quote_identifier(&f.display_name))
            .collect();
        let values: Vec<String> = active.iter().map(|f| self.display_literal(f)).collect();
        let placeholders: Vec<&str> = active.iter().map(|_| "?").collect();

        let table = self.dialect.quote_identifier(table);
        BuiltQuery {
            sql: format!(
                "INSERT INTO {table} ({}) VALUES ({})",
                columns.join(", "),
                values.join(", ")
            ),
            prepared: format!(
                "INSERT INTO {table} ({}) VALUES ({})",
                columns.join(", "),
                placeholders.join(", ")
            ),
            column_names: joined_names(&active),
            column_types: joined_types(&active),
        }
    }

    fn build_delete(&self, table: &str, fields: &FieldValueMap) -> BuiltQuery {
        let mut sql = format!("DELETE FROM {}", self.dialect.quote_identifier(table));
        let mut prepared = sql.clone();

        let active: Vec<&DynamicFieldValue> =
            fields.columns().filter(|f| f.is_active()).collect();
        self.append_where(&mut sql, &mut prepared, &active);

        BuiltQuery {
            sql,
            prepared,
            column_names: joined_names(&active),
            column_types: joined_types(&active),
        }
    }

    fn build_call(&self, procedure: &str, fields: &FieldValueMap) -> BuiltQuery {
        let mut display_args = Vec::new();
        let mut prepared_args = Vec::new();
        let mut used: Vec<&DynamicFieldValue> = Vec::new();

        // Procedure parameters are ordinal; an empty one is passed as the
        // literal NULL in both forms rather than an empty string.
        for field in fields.columns() {
            if field.is_active() {
                display_args.push(self.display_literal(field));
                prepared_args.push("?".to_string());
                used.push(field);
            } else {
                display_args.push("NULL".to_string());
                prepared_args.push("NULL".to_string());
            }
        }

        BuiltQuery {
            sql: self.dialect.call_statement(procedure, &display_args),
            prepared: self.dialect.call_statement(procedure, &prepared_args),
            column_names: joined_names(&used),
            column_types: joined_types(&used),
        }
    }

    /// Appends `WHERE a = x AND b = y` for the active fields; conjunction
    /// only, no grouping. No active fields leaves both statements bare.
    fn append_where(
        &self,
        sql: &mut String,
        prepared: &mut String,
        active: &[&DynamicFieldValue],
    ) {
        for (i, field) in active.iter().enumerate() {
            let connector = if i == 0 { " WHERE " } else { " AND " };
            let column = self.dialect.quote_identifier(&field.display_name);
            sql.push_str(&format!(
                "{connector}{column} = {}",
                self.display_literal(field)
            ));
            prepared.push_str(&format!("{connector}{column} = ?"));
        }
    }

    /// Renders a field's value for the display statement: expressions go
    /// in unquoted, everything else follows the type-driven quoting policy.
    fn display_literal(&self, field: &DynamicFieldValue) -> String {
        let value = field.value.as_deref().unwrap_or_default();
        if field.is_expression || is_expression(value) {
            value.to_string()
        } else if needs_quotes(field) {
            quote_string_literal(value)
        } else {
            value.to_string()
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

fn joined_names(fields: &[&DynamicFieldValue]) -> String {
    fields
        .iter()
        .map(|f| f.display_name.as_str())
        .collect::<Vec<_>>()
        .join(",")
}

fn joined_types(fields: &[&DynamicFieldValue]) -> String {
    fields
        .iter()
        .map(|f| f.column_type.as_deref().unwrap_or_default())
        .collect::<Vec<_>>()
        .join(",")
}
