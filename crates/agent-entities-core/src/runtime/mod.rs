// crates/agent-entities-core/src/runtime/mod.rs
// ============================================================================
// Module: Agent Entities Runtime
// Description: Management collaborators and the in-memory backend.
// Purpose: Drive entity type workflows against any EntityTypesApi.
// Dependencies: crate::{core, interfaces}
// ============================================================================

//! ## Overview
//! The runtime hosts the two management collaborators that print results to
//! a caller-supplied writer, plus a deterministic in-memory implementation
//! of [`crate::EntityTypesApi`].

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod management;
pub mod store;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use management::EntityManagement;
pub use management::EntityTypeManagement;
pub use management::ManagementError;
pub use store::InMemoryEntityTypes;
