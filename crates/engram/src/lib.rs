//! Engram — core knowledge-graph memory library: entities, relations, search, and persistence.

pub mod persist;
pub mod search;
pub mod store;
pub mod types;

pub use persist::{JsonlReader, JsonlWriter};
pub use store::MemoryStore;
pub use types::*;
