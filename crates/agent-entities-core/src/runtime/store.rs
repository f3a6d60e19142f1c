// crates/agent-entities-core/src/runtime/store.rs
// ============================================================================
// Module: In-Memory Entity Types
// Description: Deterministic in-memory EntityTypesApi backend.
// Purpose: Exercise management workflows without a remote service.
// Dependencies: crate::core, crate::interfaces
// ============================================================================

//! ## Overview
//! This module provides an in-memory implementation of [`EntityTypesApi`]
//! that follows the remote request/response contract: ids are assigned on
//! creation, duplicate display names are rejected, and batch calls apply
//! immediately. It is intended for tests and local demos, not production.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;

use crate::core::AgentName;
use crate::core::DisplayName;
use crate::core::Entity;
use crate::core::EntityKind;
use crate::core::EntityType;
use crate::core::EntityTypeId;
use crate::core::EntityTypeName;
use crate::interfaces::ApiError;
use crate::interfaces::EntityTypesApi;

// ============================================================================
// SECTION: In-Memory Backend
// ============================================================================

/// Mutable backend state.
#[derive(Debug, Default)]
struct StoreState {
    /// Entity types keyed by project, in creation order.
    projects: BTreeMap<String, Vec<EntityType>>,
    /// Sequence used to mint entity type ids.
    next_id: u64,
}

/// In-memory entity type backend for tests and examples.
///
/// # Invariants
/// - Display names are unique within a project.
/// - Every stored entity has a non-blank value and at least one synonym.
#[derive(Debug, Default, Clone)]
pub struct InMemoryEntityTypes {
    /// Shared state protected by a mutex.
    state: Arc<Mutex<StoreState>>,
}

impl InMemoryEntityTypes {
    /// Creates an empty backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Locks the backend state.
    fn lock(&self) -> Result<MutexGuard<'_, StoreState>, ApiError> {
        self.state
            .lock()
            .map_err(|_| ApiError::Transport("in-memory entity store mutex poisoned".to_string()))
    }
}

impl EntityTypesApi for InMemoryEntityTypes {
    fn list_entity_types(&self, agent: &AgentName) -> Result<Vec<EntityType>, ApiError> {
        let guard = self.lock()?;
        Ok(guard.projects.get(agent.project().as_str()).cloned().unwrap_or_default())
    }

    fn get_entity_type(&self, name: &EntityTypeName) -> Result<EntityType, ApiError> {
        let guard = self.lock()?;
        find(&guard, name).cloned()
    }

    fn create_entity_type(
        &self,
        agent: &AgentName,
        entity_type: &EntityType,
    ) -> Result<EntityType, ApiError> {
        DisplayName::new(entity_type.display_name.as_str())
            .map_err(|err| ApiError::InvalidArgument(err.to_string()))?;
        if entity_type.kind == EntityKind::Unspecified {
            return Err(ApiError::InvalidArgument("entity type kind must be set".to_string()));
        }
        for entity in &entity_type.entities {
            validate_entity(entity)?;
        }
        let mut guard = self.lock()?;
        let duplicate = guard.projects.get(agent.project().as_str()).is_some_and(|types| {
            types.iter().any(|existing| existing.display_name == entity_type.display_name)
        });
        if duplicate {
            return Err(ApiError::AlreadyExists(format!(
                "entity type with display name '{}' already exists",
                entity_type.display_name
            )));
        }
        guard.next_id = guard.next_id.saturating_add(1);
        let id = EntityTypeId::new(format!("et-{:06}", guard.next_id))
            .map_err(|err| ApiError::Protocol(err.to_string()))?;
        let mut created = entity_type.clone();
        created.name = Some(agent.entity_type(id).to_string());
        guard.projects.entry(agent.project().as_str().to_string()).or_default().push(created.clone());
        Ok(created)
    }

    fn delete_entity_type(&self, name: &EntityTypeName) -> Result<(), ApiError> {
        let mut guard = self.lock()?;
        let types = guard
            .projects
            .get_mut(name.project().as_str())
            .ok_or_else(|| not_found(name))?;
        let position = types
            .iter()
            .position(|entity_type| matches_name(entity_type, name))
            .ok_or_else(|| not_found(name))?;
        types.remove(position);
        Ok(())
    }

    fn batch_create_entities(
        &self,
        name: &EntityTypeName,
        entities: &[Entity],
    ) -> Result<(), ApiError> {
        if entities.is_empty() {
            return Err(ApiError::InvalidArgument("entities must be non-empty".to_string()));
        }
        for entity in entities {
            validate_entity(entity)?;
        }
        let mut guard = self.lock()?;
        let entity_type = find_mut(&mut guard, name)?;
        for entity in entities {
            match entity_type.entities.iter_mut().find(|existing| existing.value == entity.value) {
                Some(existing) => existing.synonyms.clone_from(&entity.synonyms),
                None => entity_type.entities.push(entity.clone()),
            }
        }
        Ok(())
    }

    fn batch_delete_entities(
        &self,
        name: &EntityTypeName,
        values: &[String],
    ) -> Result<(), ApiError> {
        if values.is_empty() {
            return Err(ApiError::InvalidArgument("entity values must be non-empty".to_string()));
        }
        let mut guard = self.lock()?;
        let entity_type = find_mut(&mut guard, name)?;
        entity_type.entities.retain(|entity| !values.contains(&entity.value));
        Ok(())
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Finds an entity type by resource name.
fn find<'a>(state: &'a StoreState, name: &EntityTypeName) -> Result<&'a EntityType, ApiError> {
    state
        .projects
        .get(name.project().as_str())
        .and_then(|types| types.iter().find(|entity_type| matches_name(entity_type, name)))
        .ok_or_else(|| not_found(name))
}

/// Finds an entity type by resource name for mutation.
fn find_mut<'a>(
    state: &'a mut StoreState,
    name: &EntityTypeName,
) -> Result<&'a mut EntityType, ApiError> {
    state
        .projects
        .get_mut(name.project().as_str())
        .and_then(|types| types.iter_mut().find(|entity_type| matches_name(entity_type, name)))
        .ok_or_else(|| not_found(name))
}

/// Returns true when the stored type carries the given resource name.
fn matches_name(entity_type: &EntityType, name: &EntityTypeName) -> bool {
    entity_type.name.as_deref() == Some(name.to_string().as_str())
}

/// Builds the not-found error for a resource name.
fn not_found(name: &EntityTypeName) -> ApiError {
    ApiError::NotFound(format!("entity type {name} not found"))
}

/// Rejects entities the service would refuse.
fn validate_entity(entity: &Entity) -> Result<(), ApiError> {
    if entity.value.trim().is_empty() {
        return Err(ApiError::InvalidArgument("entity value must be non-empty".to_string()));
    }
    if entity.synonyms.is_empty() || entity.synonyms.iter().any(|synonym| synonym.trim().is_empty())
    {
        return Err(ApiError::InvalidArgument(format!(
            "entity '{}' requires non-blank synonyms",
            entity.value
        )));
    }
    Ok(())
}
