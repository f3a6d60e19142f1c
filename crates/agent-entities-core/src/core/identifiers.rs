// crates/agent-entities-core/src/core/identifiers.rs
// ============================================================================
// Module: Agent Entities Identifiers
// Description: Validated identifiers and resource names for entity types.
// Purpose: Keep request paths well-formed before anything reaches the wire.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! Identifiers are validated on construction so that resource paths built
//! from them can never smuggle extra path segments, query strings, or
//! fragments into a request URL. Resource names follow the
//! `projects/{project}/agent/entityTypes/{id}` layout used by the service.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Maximum byte length of a project or entity type identifier.
pub const MAX_IDENTIFIER_BYTES: usize = 128;
/// Maximum byte length of an entity type display name.
pub const MAX_DISPLAY_NAME_BYTES: usize = 128;

/// Literal segments of an entity type resource name.
const PROJECTS_SEGMENT: &str = "projects";
/// Agent segment under a project.
const AGENT_SEGMENT: &str = "agent";
/// Collection segment for entity types.
const ENTITY_TYPES_SEGMENT: &str = "entityTypes";

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Identifier validation failures.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentifierError {
    /// Identifier was empty after trimming.
    #[error("{kind} must be non-empty")]
    Empty {
        /// Identifier kind label.
        kind: &'static str,
    },
    /// Identifier exceeded its byte limit.
    #[error("{kind} exceeds {max} bytes")]
    TooLong {
        /// Identifier kind label.
        kind: &'static str,
        /// Maximum allowed bytes.
        max: usize,
    },
    /// Identifier contained a forbidden character.
    #[error("{kind} contains invalid character {found:?}")]
    InvalidCharacter {
        /// Identifier kind label.
        kind: &'static str,
        /// Offending character.
        found: char,
    },
    /// Identifier was a relative path segment (`.` or `..`).
    #[error("{kind} must not be a dot segment")]
    DotSegment {
        /// Identifier kind label.
        kind: &'static str,
    },
    /// Display name did not start with an ASCII letter.
    #[error("display name must start with an ASCII letter")]
    InvalidStart,
    /// Resource name did not match the expected layout.
    #[error("malformed resource name: {0}")]
    MalformedName(String),
}

// ============================================================================
// SECTION: Project Identifier
// ============================================================================

/// Cloud project identifier.
///
/// # Invariants
/// - Non-empty, at most [`MAX_IDENTIFIER_BYTES`] bytes.
/// - Contains no whitespace, control characters, or URL delimiters.
/// - Is not a `.` or `..` path segment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ProjectId(String);

impl ProjectId {
    /// Creates a validated project identifier.
    ///
    /// # Errors
    ///
    /// Returns [`IdentifierError`] when the value violates identifier rules.
    pub fn new(value: impl Into<String>) -> Result<Self, IdentifierError> {
        let value = value.into();
        validate_path_safe("project id", &value)?;
        Ok(Self(value))
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for ProjectId {
    type Err = IdentifierError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::new(value)
    }
}

impl TryFrom<String> for ProjectId {
    type Error = IdentifierError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ProjectId> for String {
    fn from(value: ProjectId) -> Self {
        value.0
    }
}

// ============================================================================
// SECTION: Entity Type Identifier
// ============================================================================

/// Service-assigned entity type identifier (last resource name segment).
///
/// # Invariants
/// - Same character rules as [`ProjectId`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EntityTypeId(String);

impl EntityTypeId {
    /// Creates a validated entity type identifier.
    ///
    /// # Errors
    ///
    /// Returns [`IdentifierError`] when the value violates identifier rules.
    pub fn new(value: impl Into<String>) -> Result<Self, IdentifierError> {
        let value = value.into();
        validate_path_safe("entity type id", &value)?;
        Ok(Self(value))
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for EntityTypeId {
    type Err = IdentifierError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::new(value)
    }
}

impl TryFrom<String> for EntityTypeId {
    type Error = IdentifierError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<EntityTypeId> for String {
    fn from(value: EntityTypeId) -> Self {
        value.0
    }
}

// ============================================================================
// SECTION: Display Name
// ============================================================================

/// Human-facing entity type name.
///
/// # Invariants
/// - Starts with an ASCII letter.
/// - Remaining characters are ASCII letters, digits, `_`, or `-`.
/// - At most [`MAX_DISPLAY_NAME_BYTES`] bytes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DisplayName(String);

impl DisplayName {
    /// Creates a validated display name.
    ///
    /// # Errors
    ///
    /// Returns [`IdentifierError`] when the value violates display name rules.
    pub fn new(value: impl Into<String>) -> Result<Self, IdentifierError> {
        let value = value.into();
        if value.is_empty() {
            return Err(IdentifierError::Empty {
                kind: "display name",
            });
        }
        if value.len() > MAX_DISPLAY_NAME_BYTES {
            return Err(IdentifierError::TooLong {
                kind: "display name",
                max: MAX_DISPLAY_NAME_BYTES,
            });
        }
        let mut chars = value.chars();
        if !chars.next().is_some_and(|first| first.is_ascii_alphabetic()) {
            return Err(IdentifierError::InvalidStart);
        }
        if let Some(found) =
            chars.find(|ch| !(ch.is_ascii_alphanumeric() || *ch == '_' || *ch == '-'))
        {
            return Err(IdentifierError::InvalidCharacter {
                kind: "display name",
                found,
            });
        }
        Ok(Self(value))
    }

    /// Returns the display name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DisplayName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for DisplayName {
    type Err = IdentifierError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::new(value)
    }
}

impl TryFrom<String> for DisplayName {
    type Error = IdentifierError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<DisplayName> for String {
    fn from(value: DisplayName) -> Self {
        value.0
    }
}

// ============================================================================
// SECTION: Resource Names
// ============================================================================

/// Parent resource of all entity types in a project: `projects/{project}/agent`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AgentName {
    /// Owning project.
    project: ProjectId,
}

impl AgentName {
    /// Creates the agent resource name for a project.
    #[must_use]
    pub const fn new(project: ProjectId) -> Self {
        Self {
            project,
        }
    }

    /// Returns the owning project.
    #[must_use]
    pub const fn project(&self) -> &ProjectId {
        &self.project
    }

    /// Returns the entity type name for an id under this agent.
    #[must_use]
    pub fn entity_type(&self, id: EntityTypeId) -> EntityTypeName {
        EntityTypeName::new(self.project.clone(), id)
    }
}

impl fmt::Display for AgentName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{PROJECTS_SEGMENT}/{}/{AGENT_SEGMENT}", self.project)
    }
}

/// Full entity type resource name: `projects/{project}/agent/entityTypes/{id}`.
///
/// # Invariants
/// - Both components are validated identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityTypeName {
    /// Owning project.
    project: ProjectId,
    /// Entity type identifier.
    id: EntityTypeId,
}

impl EntityTypeName {
    /// Creates an entity type resource name.
    #[must_use]
    pub const fn new(project: ProjectId, id: EntityTypeId) -> Self {
        Self {
            project,
            id,
        }
    }

    /// Parses a resource name of the form `projects/{p}/agent/entityTypes/{id}`.
    ///
    /// # Errors
    ///
    /// Returns [`IdentifierError`] when the layout or either component is invalid.
    pub fn parse(value: &str) -> Result<Self, IdentifierError> {
        let segments: Vec<&str> = value.split('/').collect();
        let [projects, project, agent, entity_types, id] = segments.as_slice() else {
            return Err(IdentifierError::MalformedName(value.to_string()));
        };
        if *projects != PROJECTS_SEGMENT
            || *agent != AGENT_SEGMENT
            || *entity_types != ENTITY_TYPES_SEGMENT
        {
            return Err(IdentifierError::MalformedName(value.to_string()));
        }
        Ok(Self {
            project: ProjectId::new(*project)?,
            id: EntityTypeId::new(*id)?,
        })
    }

    /// Returns the owning project.
    #[must_use]
    pub const fn project(&self) -> &ProjectId {
        &self.project
    }

    /// Returns the entity type identifier.
    #[must_use]
    pub const fn id(&self) -> &EntityTypeId {
        &self.id
    }

    /// Returns the parent agent name.
    #[must_use]
    pub fn agent(&self) -> AgentName {
        AgentName::new(self.project.clone())
    }
}

impl fmt::Display for EntityTypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{PROJECTS_SEGMENT}/{}/{AGENT_SEGMENT}/{ENTITY_TYPES_SEGMENT}/{}",
            self.project, self.id
        )
    }
}

impl FromStr for EntityTypeName {
    type Err = IdentifierError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value)
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Validates an identifier that is interpolated into URL paths.
fn validate_path_safe(kind: &'static str, value: &str) -> Result<(), IdentifierError> {
    if value.is_empty() {
        return Err(IdentifierError::Empty {
            kind,
        });
    }
    if value.len() > MAX_IDENTIFIER_BYTES {
        return Err(IdentifierError::TooLong {
            kind,
            max: MAX_IDENTIFIER_BYTES,
        });
    }
    if matches!(value, "." | "..") {
        return Err(IdentifierError::DotSegment {
            kind,
        });
    }
    if let Some(found) = value.chars().find(|ch| {
        ch.is_whitespace() || ch.is_control() || matches!(ch, '/' | '?' | '#' | '%' | '\\')
    }) {
        return Err(IdentifierError::InvalidCharacter {
            kind,
            found,
        });
    }
    Ok(())
}
