// system-tests/tests/helpers/mod.rs
// ============================================================================
// Module: System Test Helpers
// Description: Shared helpers for agent-entities system-tests.
// Purpose: Provide the REST API stub, CLI resolution, and artifact utilities.
// Dependencies: system-tests, agent-entities-core, tiny_http
// ============================================================================

//! ## Overview
//! Shared helpers for agent-entities system-tests.
//! Invariants:
//! - Suites default to the local API stub; the hosted service is opt-in.
//! - Every test writes a summary, including on panic.

#![allow(dead_code, reason = "Shared helpers are reused across multiple test suites.")]

pub mod api_stub;
pub mod artifacts;
pub mod cli;
