//! Connection validation.
//!
//! Turns a selected connection name into a validated `ConnectionInfo` or
//! a typed failure, owning the bounded retry loop for driver acquisition.

use tracing::{debug, info, warn};

use crate::error::{ConnectError, Result};
use crate::info::{params, ConnectionInfo};
use crate::traits::{ConnectionProvider, DriverResolver, SchemaIntrospector};

/// How many times a driver download is attempted before giving up.
pub const DRIVER_DOWNLOAD_ATTEMPTS: u32 = 5;

/// The five-step validation pipeline over the injected collaborators.
#[derive(Debug)]
pub struct ConnectionValidator<P, R, I> {
    provider: P,
    resolver: R,
    introspector: I,
}

impl<P, R, I> ConnectionValidator<P, R, I>
where
    P: ConnectionProvider,
    R: DriverResolver,
    I: SchemaIntrospector,
{
    /// Creates a validator over the given collaborators.
    pub const fn new(provider: P, resolver: R, introspector: I) -> Self {
        Self {
            provider,
            resolver,
            introspector,
        }
    }

    /// Returns the schema introspector, shared with the schema cache.
    pub const fn introspector(&self) -> &I {
        &self.introspector
    }

    /// Validates the named connection.
    ///
    /// When the name resolves to nothing, the first available connection
    /// is used instead and that choice is persisted. The returned
    /// connection is enriched with a resolved driver path.
    pub async fn validate(&self, selected: &str) -> Result<ConnectionInfo> {
        let mut connection = match self.provider.find(selected).await {
            Some(connection) => connection,
            None => {
                let Some(first) = self.provider.first().await else {
                    return Err(ConnectError::ConfigIncomplete {
                        missing: "connection".to_string(),
                    });
                };
                info!(fallback = first.name(), "selected connection not found, falling back");
                self.provider.persist_selection(first.name()).await;
                first
            }
        };

        if !connection.has_consent() {
            debug!(connection = connection.name(), "consent not granted");
            return Err(ConnectError::NoConsent);
        }

        if let Some(missing) = connection.missing_parameter() {
            return Err(ConnectError::ConfigIncomplete {
                missing: missing.to_string(),
            });
        }

        if connection.driver_path().is_none() {
            let path = self.acquire_driver(&connection).await?;
            connection.set_parameter(params::DRIVER_PATH, &path);
        }

        let report = self.introspector.test_connection(&connection).await;
        if !report.success {
            let message = report.message.unwrap_or_default();
            warn!(connection = connection.name(), message = %message, "connection test failed");
            return Err(ConnectError::ConnectionFailed(message));
        }

        info!(connection = connection.name(), "connection validated");
        Ok(connection)
    }

    async fn acquire_driver(&self, connection: &ConnectionInfo) -> Result<String> {
        let connector_id = connection.parameter(params::DRIVER_CLASS).unwrap_or_default();
        let coordinates = self
            .resolver
            .resolve_coordinates(connection.driver_path(), connection.dialect(), connector_id)
            .await;

        for attempt in 1..=DRIVER_DOWNLOAD_ATTEMPTS {
            debug!(attempt, artifact = %coordinates.artifact_id, "downloading driver");
            if let Some(path) = self.resolver.download_driver(&coordinates).await {
                return Ok(path);
            }
            warn!(attempt, artifact = %coordinates.artifact_id, "driver download failed");
        }

        Err(ConnectError::DriverUnavailable {
            attempts: DRIVER_DOWNLOAD_ATTEMPTS,
        })
    }
}
