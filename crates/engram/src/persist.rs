//! JSONL file format reader/writer for knowledge-graph memory.
//!
//! One record per line, tagged by `type`:
//! `{"type":"entity","name":...}` or `{"type":"relation","from":...}`.

use std::io::{BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::types::{Entity, KnowledgeGraph, MemoryError, MemoryResult, Relation};

#[derive(Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum Record {
    Entity(Entity),
    Relation(Relation),
}

/// Writer for JSONL memory files.
pub struct JsonlWriter;

/// Reader for JSONL memory files.
pub struct JsonlReader;

impl JsonlWriter {
    /// Write a graph to a file, creating parent directories as needed.
    pub fn write_to_file(graph: &KnowledgeGraph, path: &Path) -> MemoryResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = std::fs::File::create(path)?;
        let mut writer = BufWriter::new(file);
        Self::write_to(graph, &mut writer)?;
        writer.flush()?;
        Ok(())
    }

    /// Write a graph to any writer, one record per line.
    pub fn write_to<W: Write>(graph: &KnowledgeGraph, writer: &mut W) -> MemoryResult<()> {
        for entity in &graph.entities {
            let line = serde_json::to_string(&Record::Entity(entity.clone()))
                .map_err(|e| MemoryError::Storage(format!("Serialization failed: {e}")))?;
            writeln!(writer, "{line}")?;
        }
        for relation in &graph.relations {
            let line = serde_json::to_string(&Record::Relation(relation.clone()))
                .map_err(|e| MemoryError::Storage(format!("Serialization failed: {e}")))?;
            writeln!(writer, "{line}")?;
        }
        Ok(())
    }
}

impl JsonlReader {
    /// Read a graph from a file.
    pub fn read_from_file(path: &Path) -> MemoryResult<KnowledgeGraph> {
        let file = std::fs::File::open(path)?;
        Self::read_from(file)
    }

    /// Read a graph from any reader. Blank lines are tolerated; a malformed
    /// record aborts the load with its line number.
    pub fn read_from<R: Read>(reader: R) -> MemoryResult<KnowledgeGraph> {
        let mut graph = KnowledgeGraph::default();
        for (lineno, line) in BufReader::new(reader).lines().enumerate() {
            let line = line?;
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            let record: Record = serde_json::from_str(trimmed).map_err(|e| {
                MemoryError::Storage(format!("Malformed record on line {}: {e}", lineno + 1))
            })?;
            match record {
                Record::Entity(entity) => graph.entities.push(entity),
                Record::Relation(relation) => graph.relations.push(relation),
            }
        }
        Ok(graph)
    }
}
