//! In-memory knowledge-graph store.

use chrono::Utc;

use crate::search::entity_matches;
use crate::types::{
    Entity, EntityDraft, KnowledgeGraph, MemoryError, MemoryResult, Relation, RelationDraft,
};

/// In-memory container for the knowledge graph.
///
/// Entities are keyed by name; relations by the (from, to, relationType)
/// triple. Creation is idempotent: existing keys are skipped, not replaced.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    graph: KnowledgeGraph,
    pub created_at: i64,
    pub updated_at: i64,
}

impl MemoryStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        let now = Utc::now().timestamp();
        Self {
            graph: KnowledgeGraph::default(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Build a store around an already-loaded graph.
    pub fn from_graph(graph: KnowledgeGraph) -> Self {
        let now = Utc::now().timestamp();
        let created_at = graph
            .entities
            .iter()
            .map(|e| e.created_at)
            .filter(|t| *t > 0)
            .min()
            .unwrap_or(now);
        Self {
            graph,
            created_at,
            updated_at: now,
        }
    }

    /// The full graph, read-only.
    pub fn read(&self) -> &KnowledgeGraph {
        &self.graph
    }

    /// Get an entity by exact name.
    pub fn get(&self, name: &str) -> Option<&Entity> {
        self.graph.entities.iter().find(|e| e.name == name)
    }

    /// Number of entities.
    pub fn entity_count(&self) -> usize {
        self.graph.entities.len()
    }

    /// Number of relations.
    pub fn relation_count(&self) -> usize {
        self.graph.relations.len()
    }

    /// Total observations across all entities.
    pub fn observation_count(&self) -> usize {
        self.graph.entities.iter().map(|e| e.observations.len()).sum()
    }

    /// Add entities, skipping names that already exist. Returns the entities
    /// actually created.
    pub fn create_entities(&mut self, drafts: Vec<EntityDraft>) -> Vec<Entity> {
        let now = Utc::now().timestamp();
        let mut created = Vec::new();
        for draft in drafts {
            if self.get(&draft.name).is_some() {
                tracing::debug!("Entity already exists, skipping: {}", draft.name);
                continue;
            }
            let entity = Entity {
                name: draft.name,
                entity_type: draft.entity_type,
                observations: draft.observations,
                created_at: now,
                updated_at: now,
            };
            self.graph.entities.push(entity.clone());
            created.push(entity);
        }
        if !created.is_empty() {
            self.updated_at = now;
        }
        created
    }

    /// Add relations, skipping triples that already exist. Both endpoints may
    /// name entities that have not been created yet.
    pub fn create_relations(&mut self, drafts: Vec<RelationDraft>) -> Vec<Relation> {
        let now = Utc::now().timestamp();
        let mut created = Vec::new();
        for draft in drafts {
            let exists = self.graph.relations.iter().any(|r| {
                r.from == draft.from && r.to == draft.to && r.relation_type == draft.relation_type
            });
            if exists {
                continue;
            }
            let relation = Relation {
                from: draft.from,
                to: draft.to,
                relation_type: draft.relation_type,
                created_at: now,
            };
            self.graph.relations.push(relation.clone());
            created.push(relation);
        }
        if !created.is_empty() {
            self.updated_at = now;
        }
        created
    }

    /// Append observations to an existing entity, skipping duplicates.
    /// Returns how many were actually added.
    pub fn add_observations(&mut self, name: &str, contents: Vec<String>) -> MemoryResult<usize> {
        let now = Utc::now().timestamp();
        let entity = self
            .graph
            .entities
            .iter_mut()
            .find(|e| e.name == name)
            .ok_or_else(|| MemoryError::EntityNotFound(name.to_string()))?;

        let mut added = 0;
        for content in contents {
            if !entity.observations.contains(&content) {
                entity.observations.push(content);
                added += 1;
            }
        }
        if added > 0 {
            entity.updated_at = now;
            self.updated_at = now;
        }
        Ok(added)
    }

    /// Delete entities by name, cascading to relations that touch them.
    /// Returns how many entities were removed.
    pub fn delete_entities(&mut self, names: &[String]) -> usize {
        let before = self.graph.entities.len();
        self.graph.entities.retain(|e| !names.contains(&e.name));
        let removed = before - self.graph.entities.len();
        if removed > 0 {
            self.graph
                .relations
                .retain(|r| !names.contains(&r.from) && !names.contains(&r.to));
            self.updated_at = Utc::now().timestamp();
        }
        removed
    }

    /// Remove specific observations from an entity. Unknown entities are a
    /// no-op, matching the forgiving delete semantics of the other deletes.
    pub fn delete_observations(&mut self, name: &str, observations: &[String]) -> usize {
        let Some(entity) = self.graph.entities.iter_mut().find(|e| e.name == name) else {
            return 0;
        };
        let before = entity.observations.len();
        entity.observations.retain(|o| !observations.contains(o));
        let removed = before - entity.observations.len();
        if removed > 0 {
            let now = Utc::now().timestamp();
            entity.updated_at = now;
            self.updated_at = now;
        }
        removed
    }

    /// Delete relations matching the given triples exactly.
    pub fn delete_relations(&mut self, drafts: &[RelationDraft]) -> usize {
        let before = self.graph.relations.len();
        self.graph.relations.retain(|r| {
            !drafts.iter().any(|d| {
                d.from == r.from && d.to == r.to && d.relation_type == r.relation_type
            })
        });
        let removed = before - self.graph.relations.len();
        if removed > 0 {
            self.updated_at = Utc::now().timestamp();
        }
        removed
    }

    /// Case-insensitive substring search over entity names, types, and
    /// observations. The result contains the matching entities and the
    /// relations whose endpoints both matched.
    pub fn search(&self, query: &str) -> KnowledgeGraph {
        let entities: Vec<Entity> = self
            .graph
            .entities
            .iter()
            .filter(|e| entity_matches(e, query))
            .cloned()
            .collect();
        self.subgraph(entities)
    }

    /// Look up entities by exact name, plus the relations among them.
    pub fn open(&self, names: &[String]) -> KnowledgeGraph {
        let entities: Vec<Entity> = self
            .graph
            .entities
            .iter()
            .filter(|e| names.contains(&e.name))
            .cloned()
            .collect();
        self.subgraph(entities)
    }

    fn subgraph(&self, entities: Vec<Entity>) -> KnowledgeGraph {
        let relations = self
            .graph
            .relations
            .iter()
            .filter(|r| {
                entities.iter().any(|e| e.name == r.from)
                    && entities.iter().any(|e| e.name == r.to)
            })
            .cloned()
            .collect();
        KnowledgeGraph { entities, relations }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(name: &str, entity_type: &str) -> EntityDraft {
        EntityDraft {
            name: name.to_string(),
            entity_type: entity_type.to_string(),
            observations: Vec::new(),
        }
    }

    fn rel(from: &str, to: &str, rt: &str) -> RelationDraft {
        RelationDraft {
            from: from.to_string(),
            to: to.to_string(),
            relation_type: rt.to_string(),
        }
    }

    #[test]
    fn create_entities_skips_duplicates() {
        let mut store = MemoryStore::new();
        let created = store.create_entities(vec![draft("a", "person"), draft("a", "person")]);
        assert_eq!(created.len(), 1);
        assert_eq!(store.entity_count(), 1);

        let again = store.create_entities(vec![draft("a", "person"), draft("b", "place")]);
        assert_eq!(again.len(), 1);
        assert_eq!(again[0].name, "b");
    }

    #[test]
    fn delete_entities_cascades_relations() {
        let mut store = MemoryStore::new();
        store.create_entities(vec![draft("a", "t"), draft("b", "t"), draft("c", "t")]);
        store.create_relations(vec![rel("a", "b", "knows"), rel("b", "c", "knows")]);

        let removed = store.delete_entities(&["b".to_string()]);
        assert_eq!(removed, 1);
        assert_eq!(store.relation_count(), 0);
        assert_eq!(store.entity_count(), 2);
    }

    #[test]
    fn add_observations_dedupes_and_errors_on_unknown() {
        let mut store = MemoryStore::new();
        store.create_entities(vec![draft("a", "t")]);

        let added = store
            .add_observations("a", vec!["x".to_string(), "x".to_string(), "y".to_string()])
            .unwrap();
        assert_eq!(added, 2);

        let err = store.add_observations("missing", vec!["z".to_string()]);
        assert!(matches!(err, Err(MemoryError::EntityNotFound(_))));
    }

    #[test]
    fn search_matches_observations_case_insensitively() {
        let mut store = MemoryStore::new();
        store.create_entities(vec![
            EntityDraft {
                name: "Ada".to_string(),
                entity_type: "person".to_string(),
                observations: vec!["wrote the first Program".to_string()],
            },
            draft("Babbage", "person"),
        ]);
        store.create_relations(vec![rel("Ada", "Babbage", "collaborated_with")]);

        let hit = store.search("program");
        assert_eq!(hit.entities.len(), 1);
        assert_eq!(hit.entities[0].name, "Ada");
        // Only one endpoint matched, so the relation is excluded.
        assert!(hit.relations.is_empty());

        let both = store.search("person");
        assert_eq!(both.entities.len(), 2);
        assert_eq!(both.relations.len(), 1);
    }

    #[test]
    fn open_returns_named_subgraph() {
        let mut store = MemoryStore::new();
        store.create_entities(vec![draft("a", "t"), draft("b", "t"), draft("c", "t")]);
        store.create_relations(vec![rel("a", "b", "knows"), rel("a", "c", "knows")]);

        let sub = store.open(&["a".to_string(), "b".to_string()]);
        assert_eq!(sub.entities.len(), 2);
        assert_eq!(sub.relations.len(), 1);
        assert_eq!(sub.relations[0].to, "b");
    }
}
