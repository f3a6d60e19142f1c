// crates/agent-entities-core/src/core/render.rs
// ============================================================================
// Module: Text Rendering
// Description: Protobuf text-format rendering of entity types.
// Purpose: Produce the human-readable output printed by management calls.
// Dependencies: crate::core
// ============================================================================

//! ## Overview
//! Entity types are rendered in protobuf text format with snake_case field
//! names, omitting fields that hold their default value. String values are
//! quoted and escaped; enum values are bare labels.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt::Write;

use crate::core::entity::AutoExpansionMode;
use crate::core::entity::Entity;
use crate::core::entity::EntityKind;
use crate::core::entity::EntityType;

// ============================================================================
// SECTION: Rendering
// ============================================================================

/// Renders an entity type in protobuf text format.
///
/// Every line, including the last, ends with a newline.
#[must_use]
pub fn entity_type_text(entity_type: &EntityType) -> String {
    let mut out = String::new();
    if let Some(name) = &entity_type.name {
        push_string_field(&mut out, 0, "name", name);
    }
    if !entity_type.display_name.is_empty() {
        push_string_field(&mut out, 0, "display_name", &entity_type.display_name);
    }
    if entity_type.kind != EntityKind::Unspecified {
        push_enum_field(&mut out, 0, "kind", entity_type.kind.as_str());
    }
    if entity_type.auto_expansion_mode != AutoExpansionMode::Unspecified {
        push_enum_field(&mut out, 0, "auto_expansion_mode", entity_type.auto_expansion_mode.as_str());
    }
    for entity in &entity_type.entities {
        push_entity(&mut out, entity);
    }
    if entity_type.enable_fuzzy_extraction {
        push_enum_field(&mut out, 0, "enable_fuzzy_extraction", "true");
    }
    out
}

/// Formats synonyms as a bracketed, comma-separated list (`[a, b]`).
#[must_use]
pub fn synonym_list(synonyms: &[String]) -> String {
    format!("[{}]", synonyms.join(", "))
}

/// Quotes and escapes a string for text-format output.
#[must_use]
pub fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for ch in value.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            other => out.push(other),
        }
    }
    out.push('"');
    out
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Appends a nested `entities { ... }` block.
fn push_entity(out: &mut String, entity: &Entity) {
    out.push_str("entities {\n");
    push_string_field(out, 1, "value", &entity.value);
    for synonym in &entity.synonyms {
        push_string_field(out, 1, "synonyms", synonym);
    }
    out.push_str("}\n");
}

/// Appends a quoted string field.
fn push_string_field(out: &mut String, depth: usize, field: &str, value: &str) {
    let _ = writeln!(out, "{}{field}: {}", indent(depth), quote(value));
}

/// Appends a bare (enum or bool) field.
fn push_enum_field(out: &mut String, depth: usize, field: &str, label: &str) {
    let _ = writeln!(out, "{}{field}: {label}", indent(depth));
}

/// Returns the indentation prefix for a nesting depth.
fn indent(depth: usize) -> String {
    "  ".repeat(depth)
}
