//! Statement parsing back into field values.
//!
//! Parsing runs in two phases. The grammar phase matches the raw text
//! against the fixed shape for the statement kind and produces a
//! `ParsedStatement`. The resolve phase checks referenced names against a
//! schema snapshot when one is available (online) or fabricates synthetic
//! VARCHAR fields when none is (offline), and produces the same
//! name/type contract strings the builder emits.

mod error;
mod grammar;

pub use error::{ParseError, Result};

use tracing::debug;

use formsql_core::{is_expression, DynamicFieldValue, FieldValueMap, ParsedStatement, StatementKind};

use crate::snapshot::SchemaSnapshot;

/// The result of a successful parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOutcome {
    /// The recognized statement shape.
    pub statement: ParsedStatement,
    /// The parameter fields referenced by the statement, with values,
    /// expression flags and resolved (or fabricated) types.
    pub fields: FieldValueMap,
    /// Comma-joined display names of the active fields, builder-compatible.
    pub column_names: String,
    /// Comma-joined types of the active fields, builder-compatible.
    pub column_types: String,
}

/// Parses hand-edited SQL statements.
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryParser;

impl QueryParser {
    /// Matches a statement against the fixed grammar for its kind without
    /// touching any schema. Used to learn the table name before the
    /// column cache is refreshed.
    pub fn extract(sql: &str, kind: StatementKind) -> Result<ParsedStatement> {
        grammar::extract(sql, kind)
    }

    /// Parses a statement and resolves it against the given schema view.
    ///
    /// With a snapshot the referenced table and columns must exist; with
    /// none, parsing never fails for lack of schema.
    pub fn parse(
        sql: &str,
        kind: StatementKind,
        schema: Option<&SchemaSnapshot>,
    ) -> Result<ParseOutcome> {
        let statement = grammar::extract(sql, kind)?;
        Self::resolve(statement, schema)
    }

    /// Resolves an already-extracted statement against the schema view.
    pub fn resolve(
        statement: ParsedStatement,
        schema: Option<&SchemaSnapshot>,
    ) -> Result<ParseOutcome> {
        let fields = match &statement {
            ParsedStatement::Select {
                table,
                columns,
                where_clauses,
                order_by,
                ..
            } => {
                if let Some(schema) = schema {
                    check_table(schema, table)?;
                    for column in columns {
                        check_column(schema, table, column)?;
                    }
                    if let Some(order_by) = order_by {
                        check_column(schema, table, order_by)?;
                    }
                }
                where_fields(table, where_clauses, schema)?
            }
            ParsedStatement::Delete {
                table,
                where_clauses,
            } => {
                if let Some(schema) = schema {
                    check_table(schema, table)?;
                }
                where_fields(table, where_clauses, schema)?
            }
            ParsedStatement::Insert {
                table,
                columns,
                values,
            } => {
                if let Some(schema) = schema {
                    check_table(schema, table)?;
                }
                let mut fields = FieldValueMap::new();
                for (column, value) in columns.iter().zip(values) {
                    if let Some(schema) = schema {
                        check_column(schema, table, column)?;
                    }
                    let declared =
                        schema.and_then(|s| s.column_type(table, column));
                    fields.insert(synthesize(column, Some(value), declared));
                }
                fields
            }
            ParsedStatement::Call {
                procedure,
                arguments,
            } => call_fields(procedure, arguments, schema)?,
        };

        let active: Vec<&DynamicFieldValue> = fields.iter().filter(|f| f.is_active()).collect();
        let column_names = active
            .iter()
            .map(|f| f.display_name.as_str())
            .collect::<Vec<_>>()
            .join(",");
        let column_types = active
            .iter()
            .map(|f| f.column_type.as_deref().unwrap_or_default())
            .collect::<Vec<_>>()
            .join(",");

        debug!(
            kind = %statement.kind(),
            table = statement.table_name(),
            fields = fields.len(),
            "parsed statement"
        );

        Ok(ParseOutcome {
            statement,
            fields,
            column_names,
            column_types,
        })
    }
}

fn check_table(schema: &SchemaSnapshot, table: &str) -> Result<()> {
    if schema.has_table(table) {
        Ok(())
    } else {
        Err(ParseError::TableNotFound(table.to_string()))
    }
}

fn check_column(schema: &SchemaSnapshot, table: &str, column: &str) -> Result<()> {
    if schema.column_type(table, column).is_some() {
        Ok(())
    } else {
        Err(ParseError::FieldNotFound {
            table: table.to_string(),
            column: column.to_string(),
        })
    }
}

fn where_fields(
    table: &str,
    where_clauses: &[formsql_core::WhereClause],
    schema: Option<&SchemaSnapshot>,
) -> Result<FieldValueMap> {
    let mut fields = FieldValueMap::new();
    for clause in where_clauses {
        if let Some(schema) = schema {
            check_column(schema, table, &clause.column)?;
        }
        let declared = schema.and_then(|s| s.column_type(table, &clause.column));
        fields.insert(synthesize(&clause.column, Some(&clause.value), declared));
    }
    Ok(fields)
}

fn call_fields(
    procedure: &str,
    arguments: &[String],
    schema: Option<&SchemaSnapshot>,
) -> Result<FieldValueMap> {
    let mut fields = FieldValueMap::new();

    if let Some(schema) = schema {
        let Some(parameters) = schema.parameters(procedure) else {
            return Err(ParseError::TableNotFound(procedure.to_string()));
        };
        if parameters.len() != arguments.len() {
            return Err(ParseError::CallArityMismatch {
                procedure: procedure.to_string(),
                expected: parameters.len(),
                actual: arguments.len(),
            });
        }
        for (parameter, argument) in parameters.iter().zip(arguments) {
            fields.insert(synthesize(
                &parameter.name,
                argument_value(argument),
                Some(&parameter.column_type),
            ));
        }
    } else {
        for (i, argument) in arguments.iter().enumerate() {
            let name = format!("param{}", i + 1);
            fields.insert(synthesize(&name, argument_value(argument), None));
        }
    }

    Ok(fields)
}

/// A written `NULL` argument maps back to an empty (inactive) field.
fn argument_value(argument: &str) -> Option<&str> {
    if argument.eq_ignore_ascii_case("NULL") {
        None
    } else {
        Some(argument)
    }
}

/// Builds the field for one referenced name. Offline, the declared type
/// is fabricated as VARCHAR so parsing never fails for lack of schema.
fn synthesize(name: &str, value: Option<&str>, declared: Option<&str>) -> DynamicFieldValue {
    let mut field = DynamicFieldValue::new(name, name)
        .column_type(declared.unwrap_or("VARCHAR"));
    if let Some(value) = value {
        field.is_expression = is_expression(value);
        field.value = Some(value.to_string());
    }
    field
}
