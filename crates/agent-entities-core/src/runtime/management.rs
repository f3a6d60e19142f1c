// crates/agent-entities-core/src/runtime/management.rs
// ============================================================================
// Module: Entity Management
// Description: Entity type and entity workflows with printed results.
// Purpose: Call the entity API and report results to an output stream.
// Dependencies: crate::core, crate::interfaces
// ============================================================================

//! ## Overview
//! [`EntityTypeManagement`] and [`EntityManagement`] forward plain
//! identifying inputs to an [`EntityTypesApi`] and print a textual form of
//! the outcome to a caller-supplied writer. Remote failures propagate
//! unchanged inside [`ManagementError::Api`]; nothing is retried.
//!
//! Output contract:
//! - create entity type: `Entity type created:` then the text rendering.
//! - list entities: `Entity value: <v>` and `Synonyms: [..]` per entity,
//!   nothing at all when the type has no entities.
//! - deletes and id lookups print nothing.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;

use thiserror::Error;

use crate::core::AgentName;
use crate::core::DisplayName;
use crate::core::Entity;
use crate::core::EntityError;
use crate::core::EntityKind;
use crate::core::EntityType;
use crate::core::EntityTypeId;
use crate::core::EntityTypeName;
use crate::core::IdentifierError;
use crate::core::ProjectId;
use crate::core::render::entity_type_text;
use crate::core::render::synonym_list;
use crate::interfaces::ApiError;
use crate::interfaces::EntityTypesApi;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Management workflow failures.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ManagementError {
    /// Remote API call failed.
    #[error(transparent)]
    Api(#[from] ApiError),
    /// An identifier returned by the service was malformed.
    #[error("invalid identifier: {0}")]
    Identifier(#[from] IdentifierError),
    /// Entity input was rejected before sending.
    #[error("invalid entity: {0}")]
    Entity(#[from] EntityError),
    /// Writing to the output stream failed.
    #[error("output write failed: {0}")]
    Output(String),
}

/// Result alias for management operations.
pub type ManagementResult<T> = Result<T, ManagementError>;

// ============================================================================
// SECTION: Entity Type Management
// ============================================================================

/// Entity type workflows.
#[derive(Debug, Clone)]
pub struct EntityTypeManagement<A> {
    /// Backend used for remote calls.
    api: A,
}

impl<A: EntityTypesApi> EntityTypeManagement<A> {
    /// Creates a workflow wrapper around an API backend.
    #[must_use]
    pub const fn new(api: A) -> Self {
        Self {
            api,
        }
    }

    /// Creates an entity type with the given display name and kind.
    ///
    /// # Errors
    ///
    /// Returns [`ManagementError`] when the remote call or output fails.
    pub fn create_entity_type<W: Write + ?Sized>(
        &self,
        out: &mut W,
        display_name: &DisplayName,
        project_id: &ProjectId,
        kind: EntityKind,
    ) -> ManagementResult<EntityType> {
        self.create_entity_type_from(out, project_id, &EntityType::new(display_name, kind))
    }

    /// Creates an entity type from a full definition (expansion mode, fuzzy
    /// extraction, seed entities).
    ///
    /// # Errors
    ///
    /// Returns [`ManagementError`] when the remote call or output fails.
    pub fn create_entity_type_from<W: Write + ?Sized>(
        &self,
        out: &mut W,
        project_id: &ProjectId,
        entity_type: &EntityType,
    ) -> ManagementResult<EntityType> {
        let agent = AgentName::new(project_id.clone());
        let created = self.api.create_entity_type(&agent, entity_type)?;
        emit(out, format_args!("Entity type created:\n{}", entity_type_text(&created)))?;
        Ok(created)
    }

    /// Returns ids of every entity type whose display name matches exactly.
    ///
    /// # Errors
    ///
    /// Returns [`ManagementError`] when listing fails or a returned name is malformed.
    pub fn entity_type_ids(
        &self,
        display_name: &DisplayName,
        project_id: &ProjectId,
    ) -> ManagementResult<Vec<EntityTypeId>> {
        let agent = AgentName::new(project_id.clone());
        let mut ids = Vec::new();
        for entity_type in self.api.list_entity_types(&agent)? {
            if entity_type.display_name == display_name.as_str() {
                ids.push(entity_type.id()?);
            }
        }
        Ok(ids)
    }

    /// Deletes an entity type by id.
    ///
    /// # Errors
    ///
    /// Returns [`ManagementError`] when the remote call fails.
    pub fn delete_entity_type(
        &self,
        entity_type_id: &EntityTypeId,
        project_id: &ProjectId,
    ) -> ManagementResult<()> {
        let name = EntityTypeName::new(project_id.clone(), entity_type_id.clone());
        self.api.delete_entity_type(&name)?;
        Ok(())
    }

    /// Prints a summary of every entity type in the project.
    ///
    /// # Errors
    ///
    /// Returns [`ManagementError`] when the remote call or output fails.
    pub fn list_entity_types<W: Write + ?Sized>(
        &self,
        out: &mut W,
        project_id: &ProjectId,
    ) -> ManagementResult<Vec<EntityType>> {
        let agent = AgentName::new(project_id.clone());
        let entity_types = self.api.list_entity_types(&agent)?;
        for entity_type in &entity_types {
            let name = entity_type.name.as_deref().unwrap_or_default();
            emit(out, format_args!("Entity type name: {name}\n"))?;
            emit(out, format_args!("Entity type display name: {}\n", entity_type.display_name))?;
            emit(out, format_args!("Number of entities: {}\n", entity_type.entities.len()))?;
        }
        Ok(entity_types)
    }

    /// Prints the text rendering of one entity type.
    ///
    /// # Errors
    ///
    /// Returns [`ManagementError`] when the remote call or output fails.
    pub fn get_entity_type<W: Write + ?Sized>(
        &self,
        out: &mut W,
        entity_type_id: &EntityTypeId,
        project_id: &ProjectId,
    ) -> ManagementResult<EntityType> {
        let name = EntityTypeName::new(project_id.clone(), entity_type_id.clone());
        let entity_type = self.api.get_entity_type(&name)?;
        emit(out, format_args!("{}", entity_type_text(&entity_type)))?;
        Ok(entity_type)
    }
}

// ============================================================================
// SECTION: Entity Management
// ============================================================================

/// Entity workflows under an existing entity type.
#[derive(Debug, Clone)]
pub struct EntityManagement<A> {
    /// Backend used for remote calls.
    api: A,
}

impl<A: EntityTypesApi> EntityManagement<A> {
    /// Creates a workflow wrapper around an API backend.
    #[must_use]
    pub const fn new(api: A) -> Self {
        Self {
            api,
        }
    }

    /// Creates one entity value with optional synonyms.
    ///
    /// Synonyms are normalized for the entity type's kind before sending.
    ///
    /// # Errors
    ///
    /// Returns [`ManagementError`] when input is invalid or the remote call fails.
    pub fn create_entity<W: Write + ?Sized, S: AsRef<str>>(
        &self,
        out: &mut W,
        project_id: &ProjectId,
        entity_type_id: &EntityTypeId,
        value: &str,
        synonyms: &[S],
    ) -> ManagementResult<Entity> {
        let name = EntityTypeName::new(project_id.clone(), entity_type_id.clone());
        let entity_type = self.api.get_entity_type(&name)?;
        let entity = Entity::normalized(entity_type.kind, value, synonyms)?;
        self.api.batch_create_entities(&name, std::slice::from_ref(&entity))?;
        emit(out, format_args!("Entity created: {}\n", entity.value))?;
        Ok(entity)
    }

    /// Prints every entity value and its synonyms.
    ///
    /// # Errors
    ///
    /// Returns [`ManagementError`] when the remote call or output fails.
    pub fn list_entities<W: Write + ?Sized>(
        &self,
        out: &mut W,
        project_id: &ProjectId,
        entity_type_id: &EntityTypeId,
    ) -> ManagementResult<Vec<Entity>> {
        let name = EntityTypeName::new(project_id.clone(), entity_type_id.clone());
        let entity_type = self.api.get_entity_type(&name)?;
        for entity in &entity_type.entities {
            emit(out, format_args!("Entity value: {}\n", entity.value))?;
            emit(out, format_args!("Synonyms: {}\n", synonym_list(&entity.synonyms)))?;
        }
        Ok(entity_type.entities)
    }

    /// Deletes one entity value.
    ///
    /// The value is trimmed the same way [`Self::create_entity`] trims it.
    ///
    /// # Errors
    ///
    /// Returns [`ManagementError`] when the value is blank or the remote call fails.
    pub fn delete_entity(
        &self,
        project_id: &ProjectId,
        entity_type_id: &EntityTypeId,
        value: &str,
    ) -> ManagementResult<()> {
        let value = value.trim();
        if value.is_empty() {
            return Err(EntityError::EmptyValue.into());
        }
        let name = EntityTypeName::new(project_id.clone(), entity_type_id.clone());
        self.api.batch_delete_entities(&name, &[value.to_string()])?;
        Ok(())
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Writes formatted output and maps I/O failures.
fn emit<W: Write + ?Sized>(out: &mut W, args: std::fmt::Arguments<'_>) -> ManagementResult<()> {
    out.write_fmt(args).map_err(|err| ManagementError::Output(err.to_string()))
}
