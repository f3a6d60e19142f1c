// crates/agent-entities-client/src/wire.rs
// ============================================================================
// Module: REST Wire Envelopes
// Description: Request and response bodies that wrap the core model.
// Purpose: Share JSON envelope shapes between the client and test stubs.
// Dependencies: agent-entities-core, serde
// ============================================================================

//! ## Overview
//! Envelope types for listing, batch entity calls, long-running operations,
//! and the service error body. Field names follow the REST JSON encoding.

// ============================================================================
// SECTION: Imports
// ============================================================================

use agent_entities_core::Entity;
use agent_entities_core::EntityType;
use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Listing
// ============================================================================

/// One page of entity types.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListEntityTypesResponse {
    /// Entity types on this page.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub entity_types: Vec<EntityType>,
    /// Token for the next page; absent or empty on the last page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_page_token: Option<String>,
}

// ============================================================================
// SECTION: Batch Requests
// ============================================================================

/// Body of `entities:batchCreate`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchCreateEntitiesRequest {
    /// Entities to create or update.
    pub entities: Vec<Entity>,
    /// Language of the entity values.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language_code: Option<String>,
}

/// Body of `entities:batchDelete`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchDeleteEntitiesRequest {
    /// Canonical values to delete.
    pub entity_values: Vec<String>,
    /// Language of the entity values.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language_code: Option<String>,
}

// ============================================================================
// SECTION: Operations
// ============================================================================

/// Long-running operation handle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    /// Operation resource name, polled until `done`.
    #[serde(default)]
    pub name: String,
    /// Whether the operation has finished.
    #[serde(default)]
    pub done: bool,
    /// Failure status when the operation finished unsuccessfully.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<OperationStatus>,
}

/// Status payload carried by a failed operation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationStatus {
    /// Canonical status code.
    #[serde(default)]
    pub code: i32,
    /// Developer-facing message.
    #[serde(default)]
    pub message: String,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Error envelope returned with non-success statuses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    /// Error body.
    pub error: ErrorBody,
}

/// Error body fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// HTTP status code.
    #[serde(default)]
    pub code: u16,
    /// Developer-facing message.
    #[serde(default)]
    pub message: String,
    /// Canonical status label such as `NOT_FOUND`.
    #[serde(default)]
    pub status: String,
}

impl ErrorEnvelope {
    /// Builds an envelope from its parts.
    #[must_use]
    pub fn new(code: u16, status: &str, message: impl Into<String>) -> Self {
        Self {
            error: ErrorBody {
                code,
                message: message.into(),
                status: status.to_string(),
            },
        }
    }
}
