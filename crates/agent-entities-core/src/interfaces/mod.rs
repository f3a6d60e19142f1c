// crates/agent-entities-core/src/interfaces/mod.rs
// ============================================================================
// Module: Agent Entities Interfaces
// Description: Backend-agnostic interface to the remote entity type API.
// Purpose: Define the contract surface used by the management runtime.
// Dependencies: crate::core, thiserror
// ============================================================================

//! ## Overview
//! [`EntityTypesApi`] is the seam between the management runtime and a
//! concrete backend (HTTP or in-memory). Implementations report remote
//! failures as [`ApiError`] and never retry on their own.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

use crate::core::AgentName;
use crate::core::Entity;
use crate::core::EntityType;
use crate::core::EntityTypeName;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Remote API failures.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
/// - Messages never contain credentials.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// Requested resource does not exist.
    #[error("not found: {0}")]
    NotFound(String),
    /// Caller lacks permission for the resource.
    #[error("permission denied: {0}")]
    PermissionDenied(String),
    /// Caller is not authenticated.
    #[error("unauthenticated: {0}")]
    Unauthenticated(String),
    /// Request was rejected as malformed.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// Resource already exists.
    #[error("already exists: {0}")]
    AlreadyExists(String),
    /// Any other non-success status reported by the service.
    #[error("api status {code} ({status}): {message}")]
    Status {
        /// HTTP status code.
        code: u16,
        /// Canonical status label.
        status: String,
        /// Service-provided message.
        message: String,
    },
    /// Request could not be delivered or the response could not be read.
    #[error("transport error: {0}")]
    Transport(String),
    /// Response did not match the expected shape or limits.
    #[error("protocol error: {0}")]
    Protocol(String),
    /// Long-running operation finished with an error.
    #[error("operation failed: {0}")]
    OperationFailed(String),
    /// Long-running operation did not finish within the poll budget.
    #[error("operation timed out: {0}")]
    OperationTimeout(String),
}

impl ApiError {
    /// Returns a stable label for the error kind (used in audit events).
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not_found",
            Self::PermissionDenied(_) => "permission_denied",
            Self::Unauthenticated(_) => "unauthenticated",
            Self::InvalidArgument(_) => "invalid_argument",
            Self::AlreadyExists(_) => "already_exists",
            Self::Status {
                ..
            } => "status",
            Self::Transport(_) => "transport",
            Self::Protocol(_) => "protocol",
            Self::OperationFailed(_) => "operation_failed",
            Self::OperationTimeout(_) => "operation_timeout",
        }
    }
}

// ============================================================================
// SECTION: Entity Types API
// ============================================================================

/// Remote entity type management surface.
///
/// Calls are blocking and complete before returning; batch entity calls
/// return only after the backend has applied them.
pub trait EntityTypesApi {
    /// Lists every entity type under the agent, following pagination.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] when the listing fails.
    fn list_entity_types(&self, agent: &AgentName) -> Result<Vec<EntityType>, ApiError>;

    /// Fetches one entity type, including its entities.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] when the type does not exist.
    fn get_entity_type(&self, name: &EntityTypeName) -> Result<EntityType, ApiError>;

    /// Creates an entity type and returns it with its assigned name.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] when the service rejects the type.
    fn create_entity_type(
        &self,
        agent: &AgentName,
        entity_type: &EntityType,
    ) -> Result<EntityType, ApiError>;

    /// Deletes an entity type.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] when the type does not exist.
    fn delete_entity_type(&self, name: &EntityTypeName) -> Result<(), ApiError>;

    /// Creates or updates entities under an entity type.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] when the batch is rejected or does not complete.
    fn batch_create_entities(
        &self,
        name: &EntityTypeName,
        entities: &[Entity],
    ) -> Result<(), ApiError>;

    /// Deletes entities by exact value.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] when the batch is rejected or does not complete.
    fn batch_delete_entities(
        &self,
        name: &EntityTypeName,
        values: &[String],
    ) -> Result<(), ApiError>;
}

impl<T: EntityTypesApi + ?Sized> EntityTypesApi for &T {
    fn list_entity_types(&self, agent: &AgentName) -> Result<Vec<EntityType>, ApiError> {
        (**self).list_entity_types(agent)
    }

    fn get_entity_type(&self, name: &EntityTypeName) -> Result<EntityType, ApiError> {
        (**self).get_entity_type(name)
    }

    fn create_entity_type(
        &self,
        agent: &AgentName,
        entity_type: &EntityType,
    ) -> Result<EntityType, ApiError> {
        (**self).create_entity_type(agent, entity_type)
    }

    fn delete_entity_type(&self, name: &EntityTypeName) -> Result<(), ApiError> {
        (**self).delete_entity_type(name)
    }

    fn batch_create_entities(
        &self,
        name: &EntityTypeName,
        entities: &[Entity],
    ) -> Result<(), ApiError> {
        (**self).batch_create_entities(name, entities)
    }

    fn batch_delete_entities(
        &self,
        name: &EntityTypeName,
        values: &[String],
    ) -> Result<(), ApiError> {
        (**self).batch_delete_entities(name, values)
    }
}
