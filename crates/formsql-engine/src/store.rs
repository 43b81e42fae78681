//! The form-state seam.
//!
//! The hosting form owns all field values in a generic reactive key→value
//! store; the engine reads and writes through this trait and never keeps
//! a second copy of any field.

use std::collections::HashMap;

use crate::builder::BuiltQuery;

/// Well-known field names the engine reads from and writes into the store.
pub mod keys {
    /// The selected connection name.
    pub const CONNECTION: &str = "connection";
    /// The selected table or procedure name.
    pub const TABLE: &str = "table";
    /// The editable raw SQL statement.
    pub const SQL: &str = "sql";
    /// The derived parameterized statement.
    pub const PREPARED_SQL: &str = "prepared_sql";
    /// Comma-joined names of the fields used by the last build.
    pub const COLUMN_NAMES: &str = "column_names";
    /// Comma-joined types of the fields used by the last build.
    pub const COLUMN_TYPES: &str = "column_types";
    /// ORDER BY column for SELECT statements.
    pub const ORDER_BY: &str = "order_by";
    /// LIMIT value for SELECT statements.
    pub const LIMIT: &str = "limit";
    /// OFFSET value for SELECT statements.
    pub const OFFSET: &str = "offset";
}

/// A generic reactive key→value store over the surrounding form.
///
/// Each field also carries an error slot for the single human-readable
/// message surfaced next to it.
pub trait FieldStore {
    /// Returns the current value of a field.
    fn get(&self, name: &str) -> Option<String>;

    /// Sets the value of a field.
    fn set(&mut self, name: &str, value: &str);

    /// Attaches an error message to a field.
    fn set_error(&mut self, name: &str, message: &str);

    /// Clears the error message of a field.
    fn clear_error(&mut self, name: &str);

    /// Returns the error message attached to a field.
    fn error(&self, name: &str) -> Option<String>;
}

/// HashMap-backed store used in tests and headless hosts.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
    errors: HashMap<String, String>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl FieldStore for MemoryStore {
    fn get(&self, name: &str) -> Option<String> {
        self.values.get(name).cloned()
    }

    fn set(&mut self, name: &str, value: &str) {
        self.values.insert(name.to_string(), value.to_string());
    }

    fn set_error(&mut self, name: &str, message: &str) {
        self.errors.insert(name.to_string(), message.to_string());
    }

    fn clear_error(&mut self, name: &str) {
        self.errors.remove(name);
    }

    fn error(&self, name: &str) -> Option<String> {
        self.errors.get(name).cloned()
    }
}

/// Writes a build result into the derived fields of the store.
pub fn write_built(store: &mut dyn FieldStore, built: &BuiltQuery) {
    store.set(keys::SQL, &built.sql);
    store.set(keys::PREPARED_SQL, &built.prepared);
    store.set(keys::COLUMN_NAMES, &built.column_names);
    store.set(keys::COLUMN_TYPES, &built.column_types);
}

/// Clears the builder-derived fields.
///
/// Called when a hand-edited statement is rejected, so stale derived
/// state is never presented alongside it. The raw SQL field itself is
/// left untouched; it still shows what the user typed.
pub fn clear_derived(store: &mut dyn FieldStore) {
    store.set(keys::PREPARED_SQL, "");
    store.set(keys::COLUMN_NAMES, "");
    store.set(keys::COLUMN_TYPES, "");
}
