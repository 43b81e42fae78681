//! # formsql-engine
//!
//! The two halves of the bidirectional form ⇄ SQL transform.
//!
//! This crate provides:
//! - `QueryBuilder`, which turns current field values into a SQL statement
//!   and its parameterized prepared form
//! - `QueryParser`, which turns a hand-edited SQL statement back into
//!   field values, validating against a schema snapshot when one is
//!   available
//! - `FieldStore`, the reactive key→value seam to the hosting form, with
//!   an in-memory implementation
//! - `SchemaSnapshot`, the read-only schema view the parser checks
//!   statements against
//!
//! The two directions are fixed points of each other: parsing a built
//! statement yields the fields it was built from, and rebuilding from a
//! parse result reproduces the statement shape.

pub mod builder;
pub mod parser;
pub mod snapshot;
pub mod store;

pub use builder::{BuiltQuery, QueryBuilder, SelectClauses};
pub use parser::{ParseError, ParseOutcome, QueryParser};
pub use snapshot::{ColumnDef, SchemaSnapshot};
pub use store::{FieldStore, MemoryStore};
