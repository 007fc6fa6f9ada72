//! Parsed generator-module cache with explicit invalidation.
//!
//! Discovery passes re-read generator sources so a file-watch-triggered
//! rebuild always observes current content. The registry owns one
//! [`ModuleCache`] and drives it with an invalidate-then-load pair per
//! discovered path; the cache is an explicit value, never a process-wide
//! singleton, so tests and concurrent registries cannot interfere with
//! each other.
//!
//! ## Content hashes
//!
//! Every load hashes the source bytes (SHA-256). [`invalidate`] drops the
//! parsed module but keeps the previous hash, so the next load can report
//! whether the source actually changed since the last pass. That feeds the
//! per-pass stats line (`4 modules loaded (1 changed, 3 unchanged)`) —
//! diagnostics only, never a reason to skip a reload.
//!
//! [`invalidate`]: ModuleCache::invalidate

use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("failed to read generator module {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse generator module {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: Box<toml::de::Error>,
    },
    #[error("generator module {path} names unknown producer {name:?}")]
    UnknownProducer { path: PathBuf, name: String },
}

/// Parsed content of one generator module file: the producer it names and
/// the parameter table handed to it on every invocation.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct ModuleSource {
    pub producer: String,
    #[serde(default)]
    pub params: toml::Table,
}

#[derive(Debug, Clone)]
struct CacheSlot {
    source_hash: String,
    /// `None` after invalidation — the hash stays behind for the
    /// changed/unchanged accounting of the next load.
    module: Option<ModuleSource>,
}

/// Per-registry module cache.
#[derive(Debug, Default)]
pub struct ModuleCache {
    slots: HashMap<PathBuf, CacheSlot>,
    stats: CacheStats,
}

/// Reload accounting for one pass.
#[derive(Debug, Default, Clone, Copy)]
pub struct CacheStats {
    pub loaded: usize,
    /// First sightings and reloads whose content hash differs.
    pub changed: usize,
    /// Reloads whose content hash matches the previous pass, plus
    /// still-cached within-pass hits.
    pub unchanged: usize,
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} modules loaded ({} changed, {} unchanged)",
            self.loaded, self.changed, self.unchanged
        )
    }
}

impl ModuleCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop the parsed module for `path` so the next [`load`] re-reads and
    /// re-parses the source file. A path never loaded is a no-op.
    ///
    /// [`load`]: ModuleCache::load
    pub fn invalidate(&mut self, path: &Path) {
        if let Some(slot) = self.slots.get_mut(path) {
            slot.module = None;
        }
    }

    /// Load the module at `path`, re-reading the source unless a parsed
    /// instance survived (i.e. [`invalidate`] was not called since the
    /// last load).
    ///
    /// [`invalidate`]: ModuleCache::invalidate
    pub fn load(&mut self, path: &Path) -> Result<&ModuleSource, LoadError> {
        let cached = self
            .slots
            .get(path)
            .is_some_and(|slot| slot.module.is_some());
        if cached {
            self.stats.loaded += 1;
            self.stats.unchanged += 1;
            return Ok(self.slots[path].module.as_ref().unwrap());
        }

        let content = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let source_hash = format!("{:x}", Sha256::digest(content.as_bytes()));
        let module: ModuleSource = toml::from_str(&content).map_err(|source| LoadError::Parse {
            path: path.to_path_buf(),
            source: Box::new(source),
        })?;

        self.stats.loaded += 1;
        match self.slots.get(path) {
            Some(slot) if slot.source_hash == source_hash => self.stats.unchanged += 1,
            _ => self.stats.changed += 1,
        }

        self.slots.insert(
            path.to_path_buf(),
            CacheSlot {
                source_hash,
                module: Some(module),
            },
        );
        Ok(self.slots[path].module.as_ref().unwrap())
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    /// Reset the per-pass counters. Cached hashes survive so the next
    /// pass still knows what changed.
    pub fn reset_stats(&mut self) {
        self.stats = CacheStats::default();
    }
}
