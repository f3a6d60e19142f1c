// crates/agent-entities-core/src/core/mod.rs
// ============================================================================
// Module: Agent Entities Core Types
// Description: Canonical entity type model, identifiers, and rendering.
// Purpose: Provide stable, serializable types shared by every backend.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! Core types describe entity types and entities as the remote API exchanges
//! them. They are the single source of truth for the HTTP client, the
//! in-memory backend, and CLI output.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod entity;
pub mod identifiers;
pub mod render;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use entity::AutoExpansionMode;
pub use entity::Entity;
pub use entity::EntityError;
pub use entity::EntityKind;
pub use entity::EntityType;
pub use entity::MAX_ENTITY_VALUE_BYTES;
pub use entity::UnknownKindError;
pub use identifiers::AgentName;
pub use identifiers::DisplayName;
pub use identifiers::EntityTypeId;
pub use identifiers::EntityTypeName;
pub use identifiers::IdentifierError;
pub use identifiers::ProjectId;
