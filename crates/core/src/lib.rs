//! Anar Shop Core - Shared domain library.
//!
//! This crate provides the types used across all Anar Shop components:
//! - `api` - The REST API server
//! - `cli` - Command-line tools for seeding and maintenance
//!
//! # Architecture
//!
//! The core crate contains only types and validation - no I/O, no database
//! access, no HTTP. Entities serialize to the camelCase JSON the storefront
//! frontend consumes.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, `Email`, and status enums
//! - [`models`] - Entities and request payloads
//! - [`validation`] - Request validation helpers

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod models;
pub mod types;
pub mod validation;

pub use types::*;
pub use validation::ValidationError;
