// system-tests/src/lib.rs
// ============================================================================
// Module: Agent Entities System Tests Library
// Description: Shared configuration for system test scenarios.
// Purpose: Provide common settings for the agent-entities system-test binaries.
// Dependencies: std
// ============================================================================

//! ## Overview
//! This crate hosts shared configuration used by the system-test binaries in
//! `system-tests/tests`. Suites run against a local stub of the REST API by
//! default; live runs against the hosted service are opt-in.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;
