//! Configuration loading and resolution.

use std::path::PathBuf;

/// Resolve the memory file path.
pub fn resolve_memory_path(explicit: Option<&str>) -> String {
    if let Some(path) = explicit {
        return path.to_string();
    }

    if let Ok(env_path) = std::env::var("ENGRAM_FILE") {
        return env_path;
    }

    let cwd_memory = PathBuf::from(".engram/memory.jsonl");
    if cwd_memory.exists() {
        return cwd_memory.display().to_string();
    }

    resolve_default_memory_path()
}

fn resolve_default_memory_path() -> String {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .unwrap_or_else(|_| ".".to_string());

    format!("{home}/.engram/memory.jsonl")
}
