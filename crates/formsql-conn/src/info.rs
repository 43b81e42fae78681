//! Resolved connection descriptors.

use serde::{Deserialize, Serialize};

use formsql_core::SqlDialect;

/// Well-known connection parameter keys.
pub mod params {
    /// JDBC-style driver class name.
    pub const DRIVER_CLASS: &str = "driver_class";
    /// Database user.
    pub const USER: &str = "user";
    /// Database password.
    pub const PASSWORD: &str = "password";
    /// Connection URL.
    pub const URL: &str = "url";
    /// Dialect tag, resolved through `SqlDialect::from_tag`.
    pub const DIALECT: &str = "dialect";
    /// Resolved local driver artifact path; filled in lazily.
    pub const DRIVER_PATH: &str = "driver_path";
    /// User-consent flag; must be "true" before the connection is used.
    pub const CONSENT: &str = "consent";
}

/// The parameters that must all be present and non-empty before a
/// connection can be validated.
pub const MANDATORY_PARAMETERS: [&str; 5] = [
    params::DRIVER_CLASS,
    params::USER,
    params::PASSWORD,
    params::URL,
    params::DIALECT,
];

/// A resolved, named connection: an ordered list of key/value parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionInfo {
    name: String,
    parameters: Vec<(String, String)>,
}

impl ConnectionInfo {
    /// Creates a connection with no parameters.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parameters: Vec::new(),
        }
    }

    /// Adds or replaces a parameter, builder style.
    #[must_use]
    pub fn with_parameter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_parameter(&key.into(), &value.into());
        self
    }

    /// Returns the connection name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns a parameter value.
    #[must_use]
    pub fn parameter(&self, key: &str) -> Option<&str> {
        self.parameters
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Sets a parameter, replacing an existing one in place.
    pub fn set_parameter(&mut self, key: &str, value: &str) {
        if let Some(slot) = self.parameters.iter_mut().find(|(k, _)| k == key) {
            slot.1 = value.to_string();
        } else {
            self.parameters.push((key.to_string(), value.to_string()));
        }
    }

    /// Returns whether the user has authorized this connection.
    #[must_use]
    pub fn has_consent(&self) -> bool {
        self.parameter(params::CONSENT)
            .is_some_and(|v| v.eq_ignore_ascii_case("true"))
    }

    /// Returns the first mandatory parameter that is missing or empty.
    #[must_use]
    pub fn missing_parameter(&self) -> Option<&'static str> {
        MANDATORY_PARAMETERS
            .into_iter()
            .find(|key| self.parameter(key).is_none_or(str::is_empty))
    }

    /// Returns the dialect resolved from the dialect tag parameter.
    #[must_use]
    pub fn dialect(&self) -> SqlDialect {
        self.parameter(params::DIALECT)
            .map_or(SqlDialect::Generic, SqlDialect::from_tag)
    }

    /// Returns the resolved driver path, if already present.
    #[must_use]
    pub fn driver_path(&self) -> Option<&str> {
        self.parameter(params::DRIVER_PATH).filter(|p| !p.is_empty())
    }
}

/// Builds a fully populated, consented connection (handy for tests and
/// embedding hosts).
#[must_use]
pub fn complete_connection(name: &str, dialect_tag: &str) -> ConnectionInfo {
    ConnectionInfo::new(name)
        .with_parameter(params::DRIVER_CLASS, "org.example.Driver")
        .with_parameter(params::USER, "sa")
        .with_parameter(params::PASSWORD, "secret")
        .with_parameter(params::URL, "jdbc:example://localhost/db")
        .with_parameter(params::DIALECT, dialect_tag)
        .with_parameter(params::CONSENT, "true")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_parameter_reports_first_gap() {
        let connection = ConnectionInfo::new("c")
            .with_parameter(params::DRIVER_CLASS, "x")
            .with_parameter(params::USER, "u")
            .with_parameter(params::PASSWORD, "")
            .with_parameter(params::URL, "jdbc:x")
            .with_parameter(params::DIALECT, "mysql");
        assert_eq!(connection.missing_parameter(), Some(params::PASSWORD));

        let complete = complete_connection("c", "mysql");
        assert_eq!(complete.missing_parameter(), None);
    }

    #[test]
    fn consent_defaults_to_false() {
        assert!(!ConnectionInfo::new("c").has_consent());
        assert!(complete_connection("c", "mysql").has_consent());
    }

    #[test]
    fn set_parameter_replaces_in_order() {
        let mut connection = ConnectionInfo::new("c")
            .with_parameter(params::USER, "a")
            .with_parameter(params::URL, "jdbc:x");
        connection.set_parameter(params::USER, "b");
        assert_eq!(connection.parameter(params::USER), Some("b"));
        assert_eq!(connection.parameters.len(), 2);
    }

    #[test]
    fn dialect_from_tag_parameter() {
        let connection = complete_connection("c", "Microsoft SQL Server");
        assert_eq!(connection.dialect(), SqlDialect::SqlServer);
        assert_eq!(ConnectionInfo::new("c").dialect(), SqlDialect::Generic);
    }
}
