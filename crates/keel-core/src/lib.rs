//! # keel-core
//!
//! Core types, ID generation, validation, and analytics for Keel.
//!
//! This crate provides the foundational types shared across all Keel crates:
//! - Entity structs for all dashboard records (projects, leads, allocations, surveys, ...)
//! - `New*` input payloads with client-side validation
//! - Status enums with state machine transitions
//! - ID prefix constants and the `Month` period type
//! - Markdown rendering and plain-text excerpts for knowledge-base documents
//! - Pure analytics over in-memory rows (ESAT, CSAT, pipeline, financials, utilization)
//! - Cross-cutting error types

pub mod analytics;
pub mod audit_detail;
pub mod entities;
pub mod enums;
pub mod errors;
pub mod ids;
pub mod identity;
pub mod markdown;
pub mod month;
pub mod responses;
pub mod validation;
