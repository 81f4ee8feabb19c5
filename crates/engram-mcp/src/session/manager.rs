//! Memory store lifecycle and file I/O.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use engram::{
    Entity, EntityDraft, JsonlReader, JsonlWriter, KnowledgeGraph, MemoryStore, Relation,
    RelationDraft,
};

use crate::types::{McpError, McpResult};

const DEFAULT_AUTO_SAVE_SECS: u64 = 30;

/// Owns the knowledge-graph store, its backing file, and save bookkeeping.
pub struct MemorySessionManager {
    store: MemoryStore,
    file_path: PathBuf,
    dirty: bool,
    last_save: Instant,
    auto_save_interval: Duration,
}

impl MemorySessionManager {
    /// Open or create a memory file at the given path.
    pub fn open(path: &str) -> McpResult<Self> {
        let file_path = PathBuf::from(path);

        let store = if file_path.exists() {
            tracing::info!("Opening existing memory file: {}", file_path.display());
            let graph = JsonlReader::read_from_file(&file_path)
                .map_err(|e| McpError::Memory(format!("Failed to read memory file: {e}")))?;
            MemoryStore::from_graph(graph)
        } else {
            tracing::info!("Creating new memory file: {}", file_path.display());
            if let Some(parent) = file_path.parent() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    McpError::Io(std::io::Error::other(format!(
                        "Failed to create directory {}: {e}",
                        parent.display()
                    )))
                })?;
            }
            MemoryStore::new()
        };

        tracing::info!(
            "Memory opened: {} entities, {} relations",
            store.entity_count(),
            store.relation_count()
        );

        Ok(Self {
            store,
            file_path,
            dirty: false,
            last_save: Instant::now(),
            auto_save_interval: Duration::from_secs(DEFAULT_AUTO_SAVE_SECS),
        })
    }

    /// Get the memory store.
    pub fn store(&self) -> &MemoryStore {
        &self.store
    }

    pub fn file_path(&self) -> &PathBuf {
        &self.file_path
    }

    /// Add entities, skipping names that already exist.
    pub fn create_entities(&mut self, drafts: Vec<EntityDraft>) -> McpResult<Vec<Entity>> {
        let created = self.store.create_entities(drafts);
        if !created.is_empty() {
            self.mark_dirty()?;
        }
        Ok(created)
    }

    /// Add relations, skipping triples that already exist.
    pub fn create_relations(&mut self, drafts: Vec<RelationDraft>) -> McpResult<Vec<Relation>> {
        let created = self.store.create_relations(drafts);
        if !created.is_empty() {
            self.mark_dirty()?;
        }
        Ok(created)
    }

    /// Append observations to an existing entity.
    pub fn add_observations(&mut self, name: &str, contents: Vec<String>) -> McpResult<usize> {
        let added = self.store.add_observations(name, contents)?;
        if added > 0 {
            self.mark_dirty()?;
        }
        Ok(added)
    }

    /// Delete entities by name, cascading to their relations.
    pub fn delete_entities(&mut self, names: &[String]) -> McpResult<usize> {
        let removed = self.store.delete_entities(names);
        if removed > 0 {
            self.mark_dirty()?;
        }
        Ok(removed)
    }

    /// Remove specific observations from an entity.
    pub fn delete_observations(&mut self, name: &str, observations: &[String]) -> McpResult<usize> {
        let removed = self.store.delete_observations(name, observations);
        if removed > 0 {
            self.mark_dirty()?;
        }
        Ok(removed)
    }

    /// Delete relations matching the given triples.
    pub fn delete_relations(&mut self, drafts: &[RelationDraft]) -> McpResult<usize> {
        let removed = self.store.delete_relations(drafts);
        if removed > 0 {
            self.mark_dirty()?;
        }
        Ok(removed)
    }

    /// Case-insensitive substring search.
    pub fn search(&self, query: &str) -> KnowledgeGraph {
        self.store.search(query)
    }

    /// Exact-name lookup with relations among the named entities.
    pub fn open_nodes(&self, names: &[String]) -> KnowledgeGraph {
        self.store.open(names)
    }

    /// Save to file when dirty.
    pub fn save(&mut self) -> McpResult<()> {
        if !self.dirty {
            return Ok(());
        }

        JsonlWriter::write_to_file(self.store.read(), &self.file_path)
            .map_err(|e| McpError::Memory(format!("Failed to write memory file: {e}")))?;

        self.dirty = false;
        self.last_save = Instant::now();
        tracing::debug!("Saved memory file: {}", self.file_path.display());
        Ok(())
    }

    fn mark_dirty(&mut self) -> McpResult<()> {
        self.dirty = true;
        if self.last_save.elapsed() >= self.auto_save_interval {
            self.save()?;
        }
        Ok(())
    }
}

impl Drop for MemorySessionManager {
    fn drop(&mut self) {
        if self.dirty {
            if let Err(e) = self.save() {
                tracing::error!("Failed to save on drop: {e}");
            }
        }
    }
}
