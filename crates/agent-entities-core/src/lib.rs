// crates/agent-entities-core/src/lib.rs
// ============================================================================
// Module: Agent Entities Core Library
// Description: Public API surface for entity type management.
// Purpose: Expose core types, the API interface, and management runtime.
// Dependencies: crate::{core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! Agent entities core manages entity types and entities of a hosted
//! conversational agent through the [`EntityTypesApi`] interface. It is
//! backend-agnostic: the HTTP transport lives in `agent-entities-client`,
//! and an in-memory backend is provided here for tests and local runs.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use core::*;

pub use interfaces::ApiError;
pub use interfaces::EntityTypesApi;
pub use runtime::EntityManagement;
pub use runtime::EntityTypeManagement;
pub use runtime::InMemoryEntityTypes;
pub use runtime::ManagementError;
