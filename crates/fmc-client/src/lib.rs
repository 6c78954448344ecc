//! Authenticated client for the Cisco FMC REST API.
//!
//! Provides token management, the HTTP dispatcher (rate-limit retries,
//! re-authentication, paging) and the generic CRUD contract implemented by
//! every FMC resource type.

#![deny(missing_docs)]

pub mod auth;
pub mod client;
pub mod resource;

pub use auth::{Authenticator, DomainInfo, HttpAuthenticator, TokenManager, TokenSet};
pub use client::{FmcClient, FmcClientBuilder, ServerInfo};
pub use fmc_core::{ApiDomain, DomainUuid, Error, ObjectId, ObjectRef, ServerVersion};
pub use resource::{missing_fields, nested_path, Operation, Operations, Resource};

/// Convenient result alias that reuses the shared FMC error type.
pub type Result<T> = fmc_core::Result<T>;
