// crates/agent-entities-config/src/lib.rs
// ============================================================================
// Module: Agent Entities Config Library
// Description: Canonical config model, loading, and validation.
// Purpose: Single source of truth for agent-entities.toml semantics.
// Dependencies: agent-entities-core, serde, toml
// ============================================================================

//! ## Overview
//! `agent-entities-config` defines the configuration model for the entity
//! management client: API endpoint and limits, pass-through bearer token
//! lookup, audit sink selection, and project resolution. Validation is
//! strict and fails closed.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
