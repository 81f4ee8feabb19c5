//! Substring matching over entities.

use crate::types::Entity;

/// Case-insensitive substring match against an entity's name, type, and
/// observations. Comparison lowercases both sides, so multi-byte text
/// matches by codepoint rather than byte slice.
pub fn entity_matches(entity: &Entity, query: &str) -> bool {
    let needle = query.to_lowercase();
    if needle.is_empty() {
        return true;
    }
    entity.name.to_lowercase().contains(&needle)
        || entity.entity_type.to_lowercase().contains(&needle)
        || entity
            .observations
            .iter()
            .any(|o| o.to_lowercase().contains(&needle))
}
