//! # formsql-core
//!
//! Pure building blocks for the bidirectional form-field ⇄ SQL engine.
//!
//! This crate provides:
//! - `DynamicFieldValue` and `FieldValueMap`, the field model bound to
//!   database columns and procedure parameters
//! - `SqlDialect`, identifier quoting and CALL templates per dialect
//! - The literal-quoting policy (which values need string quotes)
//! - The templated-expression classifier
//! - `ParsedStatement`, the transient statement shapes shared by the
//!   builder and the parser
//!
//! Everything here is infallible and side-effect free; the engine crates
//! layer orchestration and I/O on top.

pub mod dialect;
pub mod expr;
pub mod fields;
pub mod quoting;
pub mod statement;

pub use dialect::{unquote_identifier, SqlDialect};
pub use expr::is_expression;
pub use fields::{DynamicFieldValue, FieldValueMap, INCLUDE_SUFFIX};
pub use quoting::{needs_quotes, quote_string_literal, unquote_string_literal};
pub use statement::{ParsedStatement, StatementKind, WhereClause};
