//! The Online/Offline mode state machine.
//!
//! Online means a validated connection and a populated schema cache;
//! form fields are schema-backed and hand-edited SQL is checked against
//! the schema view. Offline means free-form entry with no schema checks.
//! The controller owns the transitions between the two and keeps the
//! surrounding form's fields consistent across them.

use tracing::{debug, info};

use formsql_core::{
    DynamicFieldValue, FieldValueMap, ParsedStatement, SqlDialect, StatementKind, INCLUDE_SUFFIX,
};
use formsql_engine::builder::{BuiltQuery, QueryBuilder, SelectClauses};
use formsql_engine::parser::{ParseOutcome, QueryParser};
use formsql_engine::store::{self, keys, FieldStore};

use crate::error::Result;
use crate::info::ConnectionInfo;
use crate::schema::SchemaCache;
use crate::sequence::RequestSequencer;
use crate::traits::{ConnectionProvider, DriverResolver, SchemaIntrospector};
use crate::validator::ConnectionValidator;

/// Whether the engine currently has a usable connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// A validated connection and a populated schema cache.
    Online,
    /// Free-form entry; no schema checks. The initial state.
    #[default]
    Offline,
}

/// Which of the two mutually exclusive field groups is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Visibility {
    /// The schema-backed dynamic field group.
    pub schema_fields: bool,
    /// The free-form parameter group.
    pub free_form: bool,
}

/// Coordinates mode transitions, rebuilds and re-parses for one form.
#[derive(Debug, Clone, Default)]
pub struct ModeController {
    mode: Mode,
    cache: SchemaCache,
    sequencer: RequestSequencer,
    dialect: SqlDialect,
    connection: Option<ConnectionInfo>,
    assistance_needed: bool,
}

impl ModeController {
    /// Creates a controller in Offline mode with an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current mode.
    #[must_use]
    pub const fn mode(&self) -> Mode {
        self.mode
    }

    /// Returns the dialect of the validated connection, or the generic
    /// dialect when Offline.
    #[must_use]
    pub const fn dialect(&self) -> SqlDialect {
        self.dialect
    }

    /// Returns the validated connection, when Online.
    #[must_use]
    pub const fn connection(&self) -> Option<&ConnectionInfo> {
        self.connection.as_ref()
    }

    /// Returns the schema cache.
    #[must_use]
    pub const fn cache(&self) -> &SchemaCache {
        &self.cache
    }

    /// Returns the schema cache, mutably.
    pub fn cache_mut(&mut self) -> &mut SchemaCache {
        &mut self.cache
    }

    /// Returns whether the user should be offered connection assistance
    /// instead of an error banner.
    #[must_use]
    pub const fn assistance_needed(&self) -> bool {
        self.assistance_needed
    }

    /// Returns which field group is visible. Exactly one is, always.
    #[must_use]
    pub const fn visibility(&self) -> Visibility {
        match self.mode {
            Mode::Online => Visibility {
                schema_fields: true,
                free_form: false,
            },
            Mode::Offline => Visibility {
                schema_fields: false,
                free_form: true,
            },
        }
    }

    /// Re-validates the selected connection and transitions accordingly.
    ///
    /// A successful validation enters Online: the table list is fetched,
    /// the previous table selection is kept when it still exists, and the
    /// first table is selected otherwise. Any failure enters Offline; the
    /// consent failure does so silently, everything else attaches its
    /// message to the connection field. A completion that lost the race
    /// to a newer request leaves all state untouched.
    pub async fn revalidate<P, R, I>(
        &mut self,
        validator: &ConnectionValidator<P, R, I>,
        selected: &str,
        store: &mut dyn FieldStore,
    ) -> Result<Mode>
    where
        P: ConnectionProvider,
        R: DriverResolver,
        I: SchemaIntrospector,
    {
        let ticket = self.sequencer.begin();

        let validated = validator.validate(selected).await;
        let connection = match validated {
            Ok(connection) => connection,
            Err(error) => {
                if !ticket.is_current() {
                    debug!("discarding stale validation failure");
                    return Ok(self.mode);
                }
                self.assistance_needed = error.is_silent();
                self.enter_offline(store);
                if error.is_silent() {
                    return Ok(Mode::Offline);
                }
                store.set_error(keys::CONNECTION, &error.to_string());
                return Err(error);
            }
        };

        let tables = match validator.introspector().fetch_tables(&connection).await {
            Ok(tables) => tables,
            Err(error) => {
                if !ticket.is_current() {
                    debug!("discarding stale table fetch failure");
                    return Ok(self.mode);
                }
                self.assistance_needed = false;
                self.enter_offline(store);
                store.set_error(keys::CONNECTION, &error.to_string());
                return Err(error);
            }
        };

        if !ticket.is_current() {
            debug!(connection = connection.name(), "discarding stale validation");
            return Ok(self.mode);
        }

        self.enter_online(connection, tables, store);
        Ok(Mode::Online)
    }

    /// Forces Offline mode, clearing all schema-derived state.
    pub fn go_offline(&mut self, store: &mut dyn FieldStore) {
        self.assistance_needed = false;
        self.enter_offline(store);
    }

    fn enter_online(
        &mut self,
        connection: ConnectionInfo,
        tables: Vec<String>,
        store: &mut dyn FieldStore,
    ) {
        self.dialect = connection.dialect();
        self.cache.clear_all();
        self.cache.set_tables(tables);
        self.assistance_needed = false;

        // Keep the previous table selection when it survived the refresh;
        // fall back to the first table, then to no selection.
        let previous = store.get(keys::TABLE).unwrap_or_default();
        let selection = if !previous.is_empty()
            && self
                .cache
                .tables()
                .iter()
                .any(|t| t.eq_ignore_ascii_case(&previous))
        {
            previous
        } else {
            self.cache.tables().first().cloned().unwrap_or_default()
        };
        store.set(keys::TABLE, &selection);
        store.clear_error(keys::CONNECTION);

        info!(
            connection = connection.name(),
            dialect = self.dialect.name(),
            tables = self.cache.tables().len(),
            "entering online mode"
        );
        self.connection = Some(connection);
        self.mode = Mode::Online;
    }

    fn enter_offline(&mut self, store: &mut dyn FieldStore) {
        if self.mode == Mode::Online {
            info!("entering offline mode");
        }
        self.mode = Mode::Offline;
        self.dialect = SqlDialect::Generic;
        self.connection = None;
        self.cache.clear_all();
        store.set(keys::TABLE, "");
    }

    /// Rebuilds the statement from the current form state and writes the
    /// derived fields back into the store.
    pub fn rebuild(
        &self,
        kind: StatementKind,
        parent_id: &str,
        store: &mut dyn FieldStore,
    ) -> BuiltQuery {
        let table = store.get(keys::TABLE).unwrap_or_default();
        let fields = self.cache.fields(parent_id).cloned().unwrap_or_default();
        let clauses = SelectClauses {
            order_by: store.get(keys::ORDER_BY),
            limit: store.get(keys::LIMIT),
            offset: store.get(keys::OFFSET),
        };

        let built = QueryBuilder::new(self.dialect).build(kind, &table, &fields, &clauses);
        store::write_built(store, &built);
        store.clear_error(keys::SQL);
        built
    }

    /// Applies a hand-edited statement: parses it, resolves it against the
    /// schema when Online, and pushes the recognized state back into the
    /// cache and the store.
    ///
    /// The raw SQL field is never overwritten; it keeps what the user
    /// typed. A rejected edit clears the derived fields and attaches the
    /// rejection message to the SQL field. `Ok(None)` means the completion
    /// lost the race to a newer request and was discarded.
    pub async fn apply_sql_edit<I: SchemaIntrospector>(
        &mut self,
        introspector: &I,
        sql: &str,
        kind: StatementKind,
        parent_id: &str,
        store: &mut dyn FieldStore,
    ) -> Result<Option<ParseOutcome>> {
        let ticket = self.sequencer.begin();

        let statement = match QueryParser::extract(sql, kind) {
            Ok(statement) => statement,
            Err(error) => {
                store::clear_derived(store);
                store.set_error(keys::SQL, &error.to_string());
                return Err(error.into());
            }
        };

        // A hand-typed table switch refreshes the field cache for the new
        // table before the statement is resolved against it. The fetch
        // completes before anything is written; a completion superseded by
        // a newer request is discarded without touching cache or store.
        if self.mode == Mode::Online {
            let current = store.get(keys::TABLE).unwrap_or_default();
            let target = statement.table_name().to_string();
            if !target.eq_ignore_ascii_case(&current) {
                if let Some(connection) = self.connection.clone() {
                    let fetched =
                        SchemaCache::fetch_descriptors(introspector, &connection, kind, &target)
                            .await;
                    if !ticket.is_current() {
                        debug!("discarding stale parse completion");
                        return Ok(None);
                    }
                    match fetched {
                        Ok(descriptors) => {
                            self.cache.install(kind, &target, parent_id, descriptors, store);
                        }
                        Err(error) => {
                            self.cache.clear(parent_id);
                            store.set_error(parent_id, &error.to_string());
                            store::clear_derived(store);
                            return Err(error);
                        }
                    }
                }
                store.set(keys::TABLE, &target);
            }
        }

        let resolved = {
            let snapshot = (self.mode == Mode::Online).then(|| self.cache.snapshot());
            QueryParser::resolve(statement, snapshot)
        };
        let outcome = match resolved {
            Ok(outcome) => outcome,
            Err(error) => {
                store::clear_derived(store);
                store.set_error(keys::SQL, &error.to_string());
                return Err(error.into());
            }
        };

        self.absorb(&outcome, parent_id);

        if let ParsedStatement::Select {
            order_by,
            limit,
            offset,
            ..
        } = &outcome.statement
        {
            store.set(keys::ORDER_BY, order_by.as_deref().unwrap_or_default());
            store.set(keys::LIMIT, limit.as_deref().unwrap_or_default());
            store.set(keys::OFFSET, offset.as_deref().unwrap_or_default());
        }

        let built = QueryBuilder::new(self.dialect).build(
            kind,
            outcome.statement.table_name(),
            &build_fields(&outcome),
            &select_clauses(&outcome.statement),
        );
        store.set(keys::PREPARED_SQL, &built.prepared);
        store.set(keys::COLUMN_NAMES, &outcome.column_names);
        store.set(keys::COLUMN_TYPES, &outcome.column_types);
        store.clear_error(keys::SQL);

        Ok(Some(outcome))
    }

    /// Pushes a recognized statement's field state into the cache slot:
    /// referenced fields take their parsed values, everything else is
    /// blanked, and SELECT inclusion companions mirror the column list.
    fn absorb(&mut self, outcome: &ParseOutcome, parent_id: &str) {
        let Some(slot) = self.cache.fields_mut(parent_id) else {
            let mut slot = FieldValueMap::new();
            for field in outcome.fields.iter() {
                slot.insert(field.clone());
            }
            if let ParsedStatement::Select { columns, .. } = &outcome.statement {
                for column in columns {
                    if slot.get(column).is_none() {
                        slot.insert(DynamicFieldValue::new(column.clone(), column.clone()));
                    }
                    slot.insert(checked_companion(column));
                }
            }
            self.cache.set_fields(parent_id, slot);
            return;
        };

        let names: Vec<String> = slot.iter().map(|f| f.name.clone()).collect();
        for name in &names {
            if let Some(field) = slot.get_mut(name) {
                field.value = None;
                field.is_expression = false;
            }
        }
        for parsed in outcome.fields.iter() {
            if let Some(field) = slot.get_mut(&parsed.name) {
                field.value = parsed.value.clone();
                field.is_expression = parsed.is_expression;
            } else {
                slot.insert(parsed.clone());
            }
        }
        if let ParsedStatement::Select { columns, .. } = &outcome.statement {
            for column in columns {
                if slot.get(column).is_none() {
                    slot.insert(DynamicFieldValue::new(column.clone(), column.clone()));
                }
                let companion = checked_companion(column);
                if let Some(field) = slot.get_mut(&companion.name) {
                    field.value = Some("true".to_string());
                } else {
                    slot.insert(companion);
                }
            }
        }
    }
}

/// Builds a checked inclusion companion for a SELECT column.
fn checked_companion(column: &str) -> DynamicFieldValue {
    let name = format!("{column}{INCLUDE_SUFFIX}");
    DynamicFieldValue::new(name.clone(), name).value("true")
}

/// Derives the builder's field map from a parse outcome: the parsed
/// parameter fields plus checked companions for the listed columns, so
/// the prepared statement mirrors the recognized shape.
fn build_fields(outcome: &ParseOutcome) -> FieldValueMap {
    let mut fields = outcome.fields.clone();
    if let ParsedStatement::Select { columns, .. } = &outcome.statement {
        for column in columns {
            if fields.get(column).is_none() {
                fields.insert(DynamicFieldValue::new(column.clone(), column.clone()));
            }
            fields.insert(checked_companion(column));
        }
    }
    fields
}

fn select_clauses(statement: &ParsedStatement) -> SelectClauses {
    if let ParsedStatement::Select {
        order_by,
        limit,
        offset,
        ..
    } = statement
    {
        SelectClauses {
            order_by: order_by.clone(),
            limit: limit.clone(),
            offset: offset.clone(),
        }
    } else {
        SelectClauses::new()
    }
}
