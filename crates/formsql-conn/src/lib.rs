//! # formsql-conn
//!
//! The connection-facing half of the engine: everything that needs a live
//! database to be useful, and the mode machinery that degrades gracefully
//! when there is none.
//!
//! This crate provides:
//! - `ConnectionInfo` and the `ConnectionProvider` / `DriverResolver` /
//!   `SchemaIntrospector` seams to the hosting system
//! - `ConnectionValidator`, the five-step validation pipeline with a
//!   bounded driver-download retry loop
//! - `SchemaCache`, which turns introspected columns and procedure
//!   parameters into dynamic form fields
//! - `ModeController`, the Online/Offline state machine coordinating
//!   field-group visibility, rebuilds and re-parses
//!
//! All async completions are guarded by request tickets: a completion
//! that lost the race to a newer request is discarded instead of
//! overwriting newer state.

pub mod error;
pub mod info;
pub mod mode;
pub mod schema;
pub mod sequence;
pub mod traits;
pub mod validator;

pub use error::{ConnectError, Result};
pub use info::ConnectionInfo;
pub use mode::{Mode, ModeController, Visibility};
pub use schema::SchemaCache;
pub use sequence::{RequestSequencer, RequestTicket};
pub use traits::{
    ConnectionProvider, DriverCoordinates, DriverResolver, SchemaIntrospector, TestReport,
};
pub use validator::{ConnectionValidator, DRIVER_DOWNLOAD_ATTEMPTS};
