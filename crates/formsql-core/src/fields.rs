//! Dynamic form fields bound to database columns and procedure parameters.

use serde::{Deserialize, Serialize};

/// Suffix of the synthetic companion field that marks a column as included
/// in a SELECT result list.
pub const INCLUDE_SUFFIX: &str = "_include";

/// One form field bound to a database column or procedure parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DynamicFieldValue {
    /// Stable internal identifier, unique within a parent field group.
    pub name: String,
    /// The real column/parameter name as known to the database.
    pub display_name: String,
    /// Current literal or expression text.
    #[serde(default)]
    pub value: Option<String>,
    /// Whether `value` is a templated expression rather than a literal.
    #[serde(default)]
    pub is_expression: bool,
    /// Declared SQL type, used to decide literal quoting.
    #[serde(default)]
    pub column_type: Option<String>,
    /// Free-text hint; fallback source for type inference.
    #[serde(default)]
    pub help_tip: Option<String>,
}

impl DynamicFieldValue {
    /// Creates a new field with the given internal and display names.
    #[must_use]
    pub fn new(name: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            display_name: display_name.into(),
            value: None,
            is_expression: false,
            column_type: None,
            help_tip: None,
        }
    }

    /// Sets the current value.
    #[must_use]
    pub fn value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Marks the value as a templated expression.
    #[must_use]
    pub const fn expression(mut self) -> Self {
        self.is_expression = true;
        self
    }

    /// Sets the declared column type.
    #[must_use]
    pub fn column_type(mut self, column_type: impl Into<String>) -> Self {
        self.column_type = Some(column_type.into());
        self
    }

    /// Sets the help tip.
    #[must_use]
    pub fn help_tip(mut self, help_tip: impl Into<String>) -> Self {
        self.help_tip = Some(help_tip.into());
        self
    }

    /// Returns whether the field carries a non-empty value and therefore
    /// participates in a built statement.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.value.as_deref().is_some_and(|v| !v.is_empty())
    }

    /// Returns the name of this field's SELECT-inclusion companion.
    #[must_use]
    pub fn include_name(&self) -> String {
        format!("{}{INCLUDE_SUFFIX}", self.name)
    }

    /// Returns whether this field is itself an inclusion companion.
    #[must_use]
    pub fn is_companion(&self) -> bool {
        self.name.ends_with(INCLUDE_SUFFIX)
    }
}

/// An ordered collection of fields keyed by internal name.
///
/// Iteration order is insertion order; the builder's `columnNames` /
/// `columnTypes` output strings depend on it being deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldValueMap {
    entries: Vec<DynamicFieldValue>,
}

impl FieldValueMap {
    /// Creates an empty map.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Inserts a field, replacing any existing field with the same name
    /// while keeping its position.
    pub fn insert(&mut self, field: DynamicFieldValue) {
        if let Some(existing) = self.entries.iter_mut().find(|f| f.name == field.name) {
            *existing = field;
        } else {
            self.entries.push(field);
        }
    }

    /// Returns the field with the given internal name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&DynamicFieldValue> {
        self.entries.iter().find(|f| f.name == name)
    }

    /// Returns a mutable reference to the field with the given name.
    pub fn get_mut(&mut self, name: &str) -> Option<&mut DynamicFieldValue> {
        self.entries.iter_mut().find(|f| f.name == name)
    }

    /// Iterates over fields in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &DynamicFieldValue> {
        self.entries.iter()
    }

    /// Iterates over non-companion fields in insertion order.
    pub fn columns(&self) -> impl Iterator<Item = &DynamicFieldValue> {
        self.entries.iter().filter(|f| !f.is_companion())
    }

    /// Returns the number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns whether the map is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Removes all fields.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Returns whether the named field's inclusion companion is checked.
    #[must_use]
    pub fn is_included(&self, field: &DynamicFieldValue) -> bool {
        self.get(&field.include_name())
            .and_then(|c| c.value.as_deref())
            .is_some_and(is_checked)
    }
}

impl FromIterator<DynamicFieldValue> for FieldValueMap {
    fn from_iter<I: IntoIterator<Item = DynamicFieldValue>>(iter: I) -> Self {
        let mut map = Self::new();
        for field in iter {
            map.insert(field);
        }
        map
    }
}

/// Interprets a stored checkbox value as checked/unchecked.
#[must_use]
pub fn is_checked(value: &str) -> bool {
    value.eq_ignore_ascii_case("true") || value.eq_ignore_ascii_case("y") || value == "1"
}
