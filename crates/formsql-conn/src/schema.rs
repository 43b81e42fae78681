//! Schema cache and field synthesis.
//!
//! Converts introspected columns and procedure parameters into dynamic
//! form fields, cached per parent field id. Caches for different parents
//! are independent slots; an operation only ever writes its own slot.

use std::collections::HashMap;

use tracing::debug;

use formsql_core::{DynamicFieldValue, FieldValueMap, StatementKind};
use formsql_engine::snapshot::{ColumnDef, SchemaSnapshot};
use formsql_engine::store::FieldStore;

use crate::error::Result;
use crate::info::ConnectionInfo;
use crate::traits::SchemaIntrospector;

/// Dynamic-field cache keyed by parent field id, plus the schema view
/// built up from everything fetched so far.
#[derive(Debug, Clone, Default)]
pub struct SchemaCache {
    slots: HashMap<String, FieldValueMap>,
    tables: Vec<String>,
    snapshot: SchemaSnapshot,
}

impl SchemaCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the known table names.
    #[must_use]
    pub fn tables(&self) -> &[String] {
        &self.tables
    }

    /// Replaces the table list, seeding the schema view with the names.
    pub fn set_tables(&mut self, tables: Vec<String>) {
        for table in &tables {
            if self.snapshot.columns(table).is_none() {
                self.snapshot.add_table(table.clone(), Vec::new());
            }
        }
        self.tables = tables;
    }

    /// Returns the cached fields for a parent.
    #[must_use]
    pub fn fields(&self, parent_id: &str) -> Option<&FieldValueMap> {
        self.slots.get(parent_id)
    }

    /// Returns the cached fields for a parent, mutably.
    pub fn fields_mut(&mut self, parent_id: &str) -> Option<&mut FieldValueMap> {
        self.slots.get_mut(parent_id)
    }

    /// Replaces one parent's slot outright.
    pub fn set_fields(&mut self, parent_id: &str, fields: FieldValueMap) {
        self.slots.insert(parent_id.to_string(), fields);
    }

    /// Clears one parent's slot.
    pub fn clear(&mut self, parent_id: &str) {
        self.slots.remove(parent_id);
    }

    /// Clears every slot, the table list and the schema view.
    pub fn clear_all(&mut self) {
        self.slots.clear();
        self.tables.clear();
        self.snapshot = SchemaSnapshot::new();
    }

    /// Returns the schema view accumulated so far.
    #[must_use]
    pub const fn snapshot(&self) -> &SchemaSnapshot {
        &self.snapshot
    }

    /// Fetches metadata for a table or procedure and synthesizes the
    /// dynamic fields for the given parent.
    ///
    /// An empty name clears the parent's slot and returns an empty set;
    /// that is not an error. A failed fetch preserves no partial state:
    /// the slot is fully cleared and one descriptive message is attached
    /// to the parent field's error slot.
    pub async fn synthesize<I: SchemaIntrospector>(
        &mut self,
        introspector: &I,
        connection: &ConnectionInfo,
        kind: StatementKind,
        name: &str,
        parent_id: &str,
        store: &mut dyn FieldStore,
    ) -> Result<FieldValueMap> {
        if name.is_empty() {
            self.slots.remove(parent_id);
            store.clear_error(parent_id);
            return Ok(FieldValueMap::new());
        }

        match Self::fetch_descriptors(introspector, connection, kind, name).await {
            Ok(descriptors) => Ok(self.install(kind, name, parent_id, descriptors, store)),
            Err(error) => {
                self.slots.remove(parent_id);
                store.set_error(parent_id, &error.to_string());
                Err(error)
            }
        }
    }

    /// Fetches the `(name, type)` descriptors for a table or procedure
    /// without touching any cache state.
    pub async fn fetch_descriptors<I: SchemaIntrospector>(
        introspector: &I,
        connection: &ConnectionInfo,
        kind: StatementKind,
        name: &str,
    ) -> Result<Vec<(String, String)>> {
        if kind == StatementKind::Call {
            introspector.fetch_parameters(connection, name).await
        } else {
            introspector.fetch_columns(connection, name).await
        }
    }

    /// Installs fetched descriptors: updates the schema view, synthesizes
    /// the dynamic fields and replaces the parent's slot.
    pub fn install(
        &mut self,
        kind: StatementKind,
        name: &str,
        parent_id: &str,
        descriptors: Vec<(String, String)>,
        store: &mut dyn FieldStore,
    ) -> FieldValueMap {
        let defs: Vec<ColumnDef> = descriptors
            .iter()
            .map(|(n, t)| ColumnDef::new(n.clone(), t.clone()))
            .collect();
        if kind == StatementKind::Call {
            self.snapshot.add_procedure(name, defs);
        } else {
            self.snapshot.add_table(name, defs);
        }

        let mut fields = FieldValueMap::new();
        for (column, column_type) in descriptors {
            let field = DynamicFieldValue::new(column.clone(), column.clone())
                .column_type(column_type.clone())
                .help_tip(format!("Column type: {column_type}"));
            // SELECT columns are paired with an include companion,
            // default unchecked; procedure parameters stay unpaired.
            if kind == StatementKind::Select {
                let companion = field.include_name();
                fields.insert(field);
                fields.insert(DynamicFieldValue::new(companion.clone(), companion));
            } else {
                fields.insert(field);
            }
        }

        debug!(parent = parent_id, name, fields = fields.len(), "synthesized fields");
        store.clear_error(parent_id);
        self.slots.insert(parent_id.to_string(), fields.clone());
        fields
    }
}
