//! Typed client for the SAP Cloud Connector configuration API.
//!
//! # Overview
//! Three facades cover the administration endpoints: backup/restore
//! (`BackupService`), common properties (`CommonService`) and high
//! availability (`HaService`). Each borrows an `HttpClient`, builds one
//! request per call, executes it and decodes the response.
//!
//! # Design
//! - Facades hold no state besides the client reference.
//! - `HttpClient` is the only network seam. `UreqClient` is the native
//!   implementation; tests substitute a recording stub.
//! - Shadow-only endpoints are routed with `Target::Shadow`.
//! - Operations that expect `204 No Content` fail on any other status and
//!   keep the response in the error for diagnostics.
//!
//! ```no_run
//! use scc_core::{Connector, ConnectorConfig};
//!
//! let connector = Connector::from_config(
//!     ConnectorConfig::new("https://scc.example.com:8443").with_credentials("Administrator", "manage"),
//! )?;
//! let version = connector.common().get_version()?;
//! println!("{}", version.version);
//! # Ok::<(), scc_core::ApiError>(())
//! ```

pub mod backup;
pub mod client;
pub mod common;
pub mod config;
pub mod error;
pub mod ha;
pub mod http;
pub mod transport;
pub mod types;

pub use backup::BackupService;
pub use client::{Connector, HttpClient};
pub use common::CommonService;
pub use config::ConnectorConfig;
pub use error::{ApiError, Result};
pub use ha::HaService;
pub use http::{HttpMethod, HttpRequest, HttpResponse, RequestBody, Sink, Target};
pub use transport::UreqClient;
pub use types::{
    CommonProperties, HaProperties, HaRole, Link, MasterConfiguration, MasterOperation,
    MasterState, ShadowConfiguration, ShadowLinks, ShadowOperation, ShadowState, Version,
};
