// crates/agent-entities-client/src/lib.rs
// ============================================================================
// Module: Agent Entities Client Library
// Description: REST transport for the entity type API.
// Purpose: Implement `EntityTypesApi` over blocking HTTPS with strict limits.
// Dependencies: agent-entities-core, reqwest, serde, serde_json
// ============================================================================

//! ## Overview
//! `agent-entities-client` implements [`agent_entities_core::EntityTypesApi`]
//! against the hosted REST surface. Requests are bounded by timeouts and
//! response size limits, redirects are never followed, and every request is
//! reported to an [`ApiAuditSink`].

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod audit;
pub mod http;
pub mod wire;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use audit::ApiAuditEvent;
pub use audit::ApiAuditEventParams;
pub use audit::ApiAuditSink;
pub use audit::ApiFileAuditSink;
pub use audit::ApiNoopAuditSink;
pub use audit::ApiOutcome;
pub use audit::ApiStderrAuditSink;
pub use audit::RequestMethod;
pub use http::HttpEntityTypesClient;
pub use http::RestClientConfig;
