//! Seams to the hosting system's connection and driver machinery.
//!
//! The engine is a pure logic layer over these contracts; it owns no
//! network, file or CLI surface of its own.

use async_trait::async_trait;

use formsql_core::SqlDialect;

use crate::error::Result;
use crate::info::ConnectionInfo;

/// Maven-style driver artifact coordinates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverCoordinates {
    /// Group id.
    pub group_id: String,
    /// Artifact id.
    pub artifact_id: String,
    /// Version.
    pub version: String,
}

/// Result of a live connectivity test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestReport {
    /// Whether the test succeeded.
    pub success: bool,
    /// Failure detail passed through to the user.
    pub message: Option<String>,
}

impl TestReport {
    /// A successful report.
    #[must_use]
    pub const fn ok() -> Self {
        Self {
            success: true,
            message: None,
        }
    }

    /// A failed report with a message.
    #[must_use]
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
        }
    }
}

/// Supplies named connection descriptors.
#[async_trait]
pub trait ConnectionProvider: Send + Sync {
    /// Returns the connection with the given name.
    async fn find(&self, name: &str) -> Option<ConnectionInfo>;

    /// Returns the first available connection.
    async fn first(&self) -> Option<ConnectionInfo>;

    /// Persists the given name as the selected connection.
    async fn persist_selection(&self, name: &str);
}

/// Resolves and downloads database driver artifacts.
#[async_trait]
pub trait DriverResolver: Send + Sync {
    /// Resolves artifact coordinates for a connection's driver.
    async fn resolve_coordinates(
        &self,
        driver_path_hint: Option<&str>,
        dialect: SqlDialect,
        connector_id: &str,
    ) -> DriverCoordinates;

    /// Downloads the driver artifact, returning its local path, or `None`
    /// when the attempt failed.
    async fn download_driver(&self, coordinates: &DriverCoordinates) -> Option<String>;
}

/// Tests connectivity and introspects schema metadata.
#[async_trait]
pub trait SchemaIntrospector: Send + Sync {
    /// Performs a live connectivity test.
    async fn test_connection(&self, connection: &ConnectionInfo) -> TestReport;

    /// Returns the available table names.
    async fn fetch_tables(&self, connection: &ConnectionInfo) -> Result<Vec<String>>;

    /// Returns `(name, type)` pairs for the columns of a table.
    async fn fetch_columns(
        &self,
        connection: &ConnectionInfo,
        table: &str,
    ) -> Result<Vec<(String, String)>>;

    /// Returns `(name, type)` pairs for the ordinal parameters of a
    /// stored procedure.
    async fn fetch_parameters(
        &self,
        connection: &ConnectionInfo,
        procedure: &str,
    ) -> Result<Vec<(String, String)>>;
}
