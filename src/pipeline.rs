//! Pass orchestration: one discovery-load-render-index cycle, published
//! atomically.
//!
//! A pass is all-or-nothing. The pipeline builds a complete fresh
//! [`SvgIndex`] — every record, every link, both collections — and only
//! then swaps it in as the published index. A failure anywhere (malformed
//! location, unloadable module, throwing generator, duplicate slug)
//! discards the in-progress structure and leaves whatever was published
//! before untouched, so a consumer can never observe a half-built index or
//! dangling neighbor links from a superseded pass.
//!
//! Errors propagate synchronously to the invoker; there are no internal
//! retries. Re-running the whole pass (as the watch loop does) is the
//! caller's recovery strategy.

use crate::cache::CacheStats;
use crate::index::{self, IndexError, SvgIndex};
use crate::registry::{ANIMATIONS, MISC, Registry, RegistryError};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PassError {
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error(transparent)]
    Index(#[from] IndexError),
}

/// Owns the registry and the currently published index.
#[derive(Debug)]
pub struct Pipeline {
    registry: Registry,
    published: Option<SvgIndex>,
}

impl Pipeline {
    pub fn new(generators_dir: impl Into<PathBuf>) -> Self {
        Self {
            registry: Registry::new(generators_dir),
            published: None,
        }
    }

    /// Run one full pass and publish the result.
    ///
    /// Work is bounded by the files discovered at pass start; nothing
    /// inside a pass suspends or yields.
    pub fn run_pass(&mut self) -> Result<(), PassError> {
        self.registry.begin_pass();

        let animations = self.registry.collect(ANIMATIONS)?;
        let misc = self.registry.collect(MISC)?;

        let next = SvgIndex {
            animations: index::build_animation_index(animations),
            misc: index::build_misc_index(misc)?,
        };

        // Publish by swap — the previous index stays intact until the new
        // one is complete.
        self.published = Some(next);
        Ok(())
    }

    /// The most recently published index, if any pass has succeeded.
    pub fn published(&self) -> Option<&SvgIndex> {
        self.published.as_ref()
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.registry.cache_stats()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{sample_generators, write_module};
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn pass_publishes_both_collections() {
        let tmp = TempDir::new().unwrap();
        sample_generators(tmp.path());

        let mut pipeline = Pipeline::new(tmp.path());
        pipeline.run_pass().unwrap();

        let index = pipeline.published().unwrap();
        assert_eq!(index.animations.list.len(), 3);
        assert_eq!(index.animations.dirs.len(), 3);
        assert_eq!(index.misc.len(), 1);
        assert!(index.misc.contains_key("logo"));
    }

    #[test]
    fn nothing_is_published_before_a_successful_pass() {
        let tmp = TempDir::new().unwrap();
        write_module(tmp.path(), "animations/05/c.toml", "producer = \"nope\"\n");

        let mut pipeline = Pipeline::new(tmp.path());
        assert!(pipeline.run_pass().is_err());
        assert!(pipeline.published().is_none());
    }

    #[test]
    fn failed_pass_keeps_previously_published_index() {
        let tmp = TempDir::new().unwrap();
        sample_generators(tmp.path());

        let mut pipeline = Pipeline::new(tmp.path());
        pipeline.run_pass().unwrap();

        // break the third of four generators, then rerun
        write_module(
            tmp.path(),
            "animations/23/b.toml",
            "producer = \"stripe-spinner\"\n[params]\nduration = 0.0\n",
        );
        assert!(pipeline.run_pass().is_err());

        // the earlier index is still published, fully linked
        let index = pipeline.published().unwrap();
        assert_eq!(index.animations.list.len(), 3);
        assert_eq!(index.animations.list[2].identity, "23-b");
        assert_eq!(index.animations.list[1].next.as_deref(), Some("23-b"));
    }

    #[test]
    fn rebuild_produces_fresh_consistent_links() {
        let tmp = TempDir::new().unwrap();
        sample_generators(tmp.path());

        let mut pipeline = Pipeline::new(tmp.path());
        pipeline.run_pass().unwrap();

        // removing the middle generator must relink its neighbors
        fs::remove_file(tmp.path().join("animations/18/k.toml")).unwrap();
        pipeline.run_pass().unwrap();

        let index = pipeline.published().unwrap();
        assert_eq!(index.animations.list.len(), 2);
        assert_eq!(index.animations.list[0].next.as_deref(), Some("23-b"));
        assert_eq!(index.animations.list[1].previous.as_deref(), Some("05-c"));
        assert_eq!(index.animations.dirs.len(), 2);
        assert_eq!(index.animations.dirs[0].next.as_deref(), Some("23"));
    }

    #[test]
    fn duplicate_misc_slug_fails_the_pass() {
        let tmp = TempDir::new().unwrap();
        write_module(tmp.path(), "misc/logo.toml", "producer = \"stripe-spinner\"\n");
        write_module(
            tmp.path(),
            "misc/nested/logo.toml",
            "producer = \"stripe-spinner\"\n",
        );

        let mut pipeline = Pipeline::new(tmp.path());
        let err = pipeline.run_pass().unwrap_err();
        assert!(matches!(
            err,
            PassError::Index(IndexError::DuplicateSlug(slug)) if slug == "logo"
        ));
        assert!(pipeline.published().is_none());
    }

    #[test]
    fn cache_stats_reset_per_pass() {
        let tmp = TempDir::new().unwrap();
        sample_generators(tmp.path());

        let mut pipeline = Pipeline::new(tmp.path());
        pipeline.run_pass().unwrap();
        assert_eq!(pipeline.cache_stats().loaded, 4);
        assert_eq!(pipeline.cache_stats().changed, 4);

        pipeline.run_pass().unwrap();
        assert_eq!(pipeline.cache_stats().loaded, 4);
        assert_eq!(pipeline.cache_stats().unchanged, 4);
    }
}
