//! # fmc-core
//!
//! Core types and utilities for working with the Cisco Firewall Management
//! Center (FMC) REST API.
//!
//! This crate provides foundational types, error handling, configuration and
//! HTTP client settings shared by the FMC client and resource crates.
//!
//! ## Modules
//!
//! - [`error`] - Error types and FMC error document decoding
//! - [`ids`] - Identifier wrappers for FMC objects and domains
//! - [`types`] - Shared wire shapes (references, paging, server version)
//! - [`config`] - Connection configuration for FMC clients
//! - [`client`] - HTTP client settings, rate-limit retry policy, defaults
//! - [`query`] - Query parameter builder
//! - [`validation`] - Name sanitization and IP address validation

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod client;
pub mod config;
pub mod error;
pub mod ids;
pub mod query;
pub mod types;
pub mod validation;

// Re-export commonly used types
pub use error::{Error, Result};
pub use ids::{DomainUuid, ObjectId};
pub use types::{ApiDomain, ObjectRef, ServerVersion};
