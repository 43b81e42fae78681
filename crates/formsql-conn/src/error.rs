//! Error types for connection validation and introspection.

use formsql_engine::ParseError;

/// Errors surfaced by the connection layer.
///
/// None of these are fatal to the hosting form; every one degrades to
/// Offline free-form entry. Each is surfaced as a single human-readable
/// message on the most relevant field.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConnectError {
    /// The connection exists but the user has not authorized its use.
    /// Non-fatal and silent; the UI shows the assistance affordance
    /// instead of an error banner.
    #[error("connection has not been authorized for use")]
    NoConsent,

    /// A mandatory connection parameter is missing or empty.
    #[error("connection configuration is incomplete: missing '{missing}'")]
    ConfigIncomplete {
        /// The missing parameter key.
        missing: String,
    },

    /// The driver artifact could not be downloaded within the retry bound.
    #[error("database driver unavailable after {attempts} download attempts")]
    DriverUnavailable {
        /// How many attempts were made.
        attempts: u32,
    },

    /// The live connectivity test failed. Forces Offline mode.
    #[error("connection test failed: {0}")]
    ConnectionFailed(String),

    /// Schema introspection failed; dependent caches are cleared.
    #[error("failed to fetch schema: {0}")]
    SchemaFetchFailed(String),

    /// A hand-edited statement was rejected.
    #[error(transparent)]
    Parse(#[from] ParseError),
}

impl ConnectError {
    /// Returns whether this failure is surfaced silently (no error
    /// message attached to any field).
    #[must_use]
    pub const fn is_silent(&self) -> bool {
        matches!(self, Self::NoConsent)
    }
}

/// Result type for connection-layer operations.
pub type Result<T> = std::result::Result<T, ConnectError>;
