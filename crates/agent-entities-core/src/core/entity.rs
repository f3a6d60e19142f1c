// crates/agent-entities-core/src/core/entity.rs
// ============================================================================
// Module: Entity Model
// Description: Entity types, entities, kinds, and synonym normalization.
// Purpose: Provide the serializable shapes exchanged with the entity API.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! Types in this module serialize directly to the REST JSON form of the
//! entity API (camelCase keys, upper-snake enum strings). Entities are
//! normalized before they are sent so that blank or duplicate synonyms never
//! reach the service.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::core::identifiers::DisplayName;
use crate::core::identifiers::EntityTypeId;
use crate::core::identifiers::EntityTypeName;
use crate::core::identifiers::IdentifierError;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Maximum byte length of a single entity value or synonym.
pub const MAX_ENTITY_VALUE_BYTES: usize = 512;

// ============================================================================
// SECTION: Kinds
// ============================================================================

/// How entities of a type relate to their synonyms.
///
/// # Invariants
/// - Unknown wire labels deserialize as [`EntityKind::Unspecified`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EntityKind {
    /// Kind not specified.
    #[default]
    Unspecified,
    /// Each entity value maps to a list of synonyms.
    Map,
    /// Entities are a plain list; synonyms mirror the value.
    List,
    /// Entity values are regular expressions.
    Regexp,
}

impl EntityKind {
    /// Returns the wire label for the kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unspecified => "KIND_UNSPECIFIED",
            Self::Map => "KIND_MAP",
            Self::List => "KIND_LIST",
            Self::Regexp => "KIND_REGEXP",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a kind label is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown entity kind: {0}")]
pub struct UnknownKindError(pub String);

impl From<String> for EntityKind {
    fn from(value: String) -> Self {
        value.parse().unwrap_or_default()
    }
}

impl From<EntityKind> for String {
    fn from(value: EntityKind) -> Self {
        value.as_str().to_string()
    }
}

impl FromStr for EntityKind {
    type Err = UnknownKindError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_uppercase();
        let short = normalized.strip_prefix("KIND_").unwrap_or(&normalized);
        match short {
            "UNSPECIFIED" => Ok(Self::Unspecified),
            "MAP" => Ok(Self::Map),
            "LIST" => Ok(Self::List),
            "REGEXP" => Ok(Self::Regexp),
            _ => Err(UnknownKindError(value.to_string())),
        }
    }
}

/// Whether the service may extend the entity list automatically.
///
/// # Invariants
/// - Unknown wire labels deserialize as [`AutoExpansionMode::Unspecified`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AutoExpansionMode {
    /// Auto expansion disabled.
    #[default]
    Unspecified,
    /// Unknown values may be collected into the entity type.
    Default,
}

impl AutoExpansionMode {
    /// Returns the wire label for the mode.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unspecified => "AUTO_EXPANSION_MODE_UNSPECIFIED",
            Self::Default => "AUTO_EXPANSION_MODE_DEFAULT",
        }
    }
}

impl From<String> for AutoExpansionMode {
    fn from(value: String) -> Self {
        if value == Self::Default.as_str() { Self::Default } else { Self::Unspecified }
    }
}

impl From<AutoExpansionMode> for String {
    fn from(value: AutoExpansionMode) -> Self {
        value.as_str().to_string()
    }
}

// ============================================================================
// SECTION: Entities
// ============================================================================

/// A single entity value with its synonyms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    /// Canonical value.
    pub value: String,
    /// Alternate strings recognized as the value.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub synonyms: Vec<String>,
}

impl Entity {
    /// Builds a normalized entity for the given kind.
    ///
    /// Synonyms are trimmed, blank entries dropped, and duplicates removed
    /// preserving first occurrence. When none remain, or the kind is
    /// [`EntityKind::List`], the synonyms become `[value]`.
    ///
    /// # Errors
    ///
    /// Returns [`EntityError`] when the value is blank or any string is too long.
    pub fn normalized<S: AsRef<str>>(
        kind: EntityKind,
        value: &str,
        synonyms: &[S],
    ) -> Result<Self, EntityError> {
        let value = value.trim();
        if value.is_empty() {
            return Err(EntityError::EmptyValue);
        }
        check_length(value)?;
        let mut normalized: Vec<String> = Vec::with_capacity(synonyms.len());
        if kind != EntityKind::List {
            for synonym in synonyms {
                let synonym = synonym.as_ref().trim();
                if synonym.is_empty() || normalized.iter().any(|existing| existing == synonym) {
                    continue;
                }
                check_length(synonym)?;
                normalized.push(synonym.to_string());
            }
        }
        if normalized.is_empty() {
            normalized.push(value.to_string());
        }
        Ok(Self {
            value: value.to_string(),
            synonyms: normalized,
        })
    }
}

/// Entity construction failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EntityError {
    /// Entity value was blank.
    #[error("entity value must be non-empty")]
    EmptyValue,
    /// Value or synonym exceeded the byte limit.
    #[error("entity string exceeds {MAX_ENTITY_VALUE_BYTES} bytes")]
    TooLong,
}

/// Enforces the per-string byte limit.
const fn check_length(value: &str) -> Result<(), EntityError> {
    if value.len() > MAX_ENTITY_VALUE_BYTES {
        return Err(EntityError::TooLong);
    }
    Ok(())
}

// ============================================================================
// SECTION: Entity Types
// ============================================================================

/// A named category of entities owned by the remote agent.
///
/// # Invariants
/// - `name` is `None` until the service assigns one on creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityType {
    /// Service-assigned resource name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Human-facing name.
    pub display_name: String,
    /// Entity kind.
    #[serde(default)]
    pub kind: EntityKind,
    /// Auto expansion mode.
    #[serde(default, skip_serializing_if = "is_default_expansion")]
    pub auto_expansion_mode: AutoExpansionMode,
    /// Member entities.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub entities: Vec<Entity>,
    /// Whether fuzzy extraction is enabled.
    #[serde(default, skip_serializing_if = "is_false")]
    pub enable_fuzzy_extraction: bool,
}

impl EntityType {
    /// Creates an unsaved entity type with no entities.
    #[must_use]
    pub fn new(display_name: &DisplayName, kind: EntityKind) -> Self {
        Self {
            name: None,
            display_name: display_name.as_str().to_string(),
            kind,
            auto_expansion_mode: AutoExpansionMode::Unspecified,
            entities: Vec::new(),
            enable_fuzzy_extraction: false,
        }
    }

    /// Parses the service-assigned resource name.
    ///
    /// # Errors
    ///
    /// Returns [`IdentifierError`] when the name is absent or malformed.
    pub fn resource_name(&self) -> Result<EntityTypeName, IdentifierError> {
        let name = self
            .name
            .as_deref()
            .ok_or_else(|| IdentifierError::MalformedName("entity type has no name".to_string()))?;
        EntityTypeName::parse(name)
    }

    /// Returns the identifier segment of the resource name.
    ///
    /// # Errors
    ///
    /// Returns [`IdentifierError`] when the name is absent or malformed.
    pub fn id(&self) -> Result<EntityTypeId, IdentifierError> {
        self.resource_name().map(|name| name.id().clone())
    }
}

/// Serde helper for skipping the default expansion mode.
fn is_default_expansion(mode: &AutoExpansionMode) -> bool {
    *mode == AutoExpansionMode::Unspecified
}

/// Serde helper for skipping false flags.
#[allow(clippy::trivially_copy_pass_by_ref, reason = "Serde skip predicates take references.")]
const fn is_false(value: &bool) -> bool {
    !*value
}
