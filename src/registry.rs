//! Generator discovery and record construction.
//!
//! The registry walks a generators directory, loads each discovered module
//! through its [`ModuleCache`], invokes the named producer, and serializes
//! the resulting tree twice into a [`GeneratorRecord`]. Records come out
//! complete or not at all: a failing module or generator aborts the pass
//! with the failing path or identity attached, never with a half-filled
//! record.
//!
//! ## Directory structure
//!
//! ```text
//! generators/                      # --source root
//! ├── animations/                  # linked + paginated collection
//! │   ├── 05/                      # category (numeric bucket)
//! │   │   └── c.toml               # module → identity "05-c"
//! │   ├── 18/k.toml
//! │   └── 23/b.toml
//! └── misc/                        # name-keyed collection
//!     └── logo.toml                # module → slug "logo"
//! ```
//!
//! ## Ordering and reload
//!
//! Filesystem enumeration order is not a contract; [`discover`] sorts
//! paths before anything observes them. Every pass invalidates each
//! module before loading it, so a watch-triggered rebuild sees current
//! source content rather than a previously parsed instance.
//!
//! [`discover`]: Registry::discover

use crate::cache::{LoadError, ModuleCache, ModuleSource};
use crate::naming::{self, GeneratorLocation, LocationError, MODULE_EXTENSION};
use crate::producers::{self, ProducerError};
use crate::svg::RenderMode;
use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;
use walkdir::WalkDir;

/// Collection holding the linked, paginated animation index.
pub const ANIMATIONS: &str = "animations";
/// Collection holding the name-keyed misc generators.
pub const MISC: &str = "misc";

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error(transparent)]
    Location(#[from] LocationError),
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error("generator {identity} failed: {source}")]
    Generation {
        identity: String,
        #[source]
        source: ProducerError,
    },
    #[error("duplicate generator identity {0:?}")]
    DuplicateIdentity(String),
    #[error("failed to walk generators directory: {0}")]
    Walk(#[from] walkdir::Error),
}

/// One discovered generator, fully rendered.
///
/// `previous`/`next`/`group` are non-owning lookup keys (identities and a
/// category-group name) installed by the index builder after sorting;
/// they resolve through the index, keeping the record graph acyclic and
/// directly serializable.
#[derive(Debug, Clone, Serialize)]
pub struct GeneratorRecord {
    pub identity: String,
    pub category: String,
    pub slug: String,
    pub home_url: String,
    pub permalink_url: String,
    pub raw_markup: String,
    pub min_markup: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
}

/// Discovers and renders generator modules under one generators directory.
#[derive(Debug)]
pub struct Registry {
    generators_dir: PathBuf,
    cache: ModuleCache,
}

impl Registry {
    pub fn new(generators_dir: impl Into<PathBuf>) -> Self {
        Self {
            generators_dir: generators_dir.into(),
            cache: ModuleCache::new(),
        }
    }

    /// Enumerate generator locations under a collection, sorted by path.
    ///
    /// Only files with the module extension are considered (anything else
    /// is not a module); a module file that does not decompose into
    /// category/slug is a configuration error, not a silent skip. A
    /// missing collection directory yields an empty set.
    pub fn discover(&self, collection: &str) -> Result<Vec<GeneratorLocation>, RegistryError> {
        let root = self.generators_dir.join(collection);
        if !root.exists() {
            return Ok(Vec::new());
        }

        let mut locations = Vec::new();
        for entry in WalkDir::new(&root) {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }
            let is_module = entry
                .path()
                .extension()
                .is_some_and(|ext| ext == MODULE_EXTENSION);
            if !is_module {
                continue;
            }
            locations.push(GeneratorLocation::from_path(entry.path())?);
        }

        locations.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(locations)
    }

    /// Load, invoke, and render one generator into a complete record.
    ///
    /// The module is invalidated before loading so repeated passes observe
    /// source edits. The tree renders under the namespace derived from the
    /// identity (`svg-{identity}`), once raw and once minified.
    pub fn build_record(
        &mut self,
        location: &GeneratorLocation,
    ) -> Result<GeneratorRecord, RegistryError> {
        self.cache.invalidate(&location.path);
        let module: ModuleSource = self.cache.load(&location.path)?.clone();

        let producer =
            producers::resolve(&module.producer).ok_or_else(|| LoadError::UnknownProducer {
                path: location.path.clone(),
                name: module.producer.clone(),
            })?;

        let identity = location.identity();
        let tree =
            producer(&identity, &module.params).map_err(|source| RegistryError::Generation {
                identity: identity.clone(),
                source,
            })?;
        debug_assert_eq!(tree.namespace(), naming::namespace_for(&identity));

        Ok(GeneratorRecord {
            home_url: naming::home_url(&location.category),
            permalink_url: location.permalink_url(),
            raw_markup: tree.render(RenderMode::Raw),
            min_markup: tree.render(RenderMode::Minified),
            category: location.category.clone(),
            slug: location.slug.clone(),
            identity,
            previous: None,
            next: None,
            group: None,
        })
    }

    /// Discover a collection and build every record, rejecting duplicate
    /// identities before the result reaches index assembly.
    pub fn collect(&mut self, collection: &str) -> Result<Vec<GeneratorRecord>, RegistryError> {
        let locations = self.discover(collection)?;
        let mut records = Vec::with_capacity(locations.len());
        for location in &locations {
            records.push(self.build_record(location)?);
        }

        let mut identities: Vec<&str> = records.iter().map(|r| r.identity.as_str()).collect();
        identities.sort_unstable();
        for pair in identities.windows(2) {
            if pair[0] == pair[1] {
                return Err(RegistryError::DuplicateIdentity(pair[0].to_string()));
            }
        }

        Ok(records)
    }

    /// Reset per-pass cache accounting. Called once at the start of a pass.
    pub fn begin_pass(&mut self) {
        self.cache.reset_stats();
    }

    pub fn cache_stats(&self) -> crate::cache::CacheStats {
        self.cache.stats()
    }
}
