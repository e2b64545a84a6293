//! # keel-schema
//!
//! JSON Schema generation, validation, and registry for Keel.
//!
//! This crate provides:
//! - `SchemaRegistry`: central store of the JSON Schemas for entities, import
//!   payloads, and command responses
//! - Validation of raw JSON before it is deserialized, so bulk imports can
//!   report every structural problem on a line
//! - Schema export for external tooling (`keel schema` command)
//!
//! Entity types are defined in `keel-core` with `#[derive(JsonSchema)]`.
//! This crate imports those types and provides the registry and validation layer.

mod error;
mod registry;

pub use error::SchemaError;
pub use registry::SchemaRegistry;
