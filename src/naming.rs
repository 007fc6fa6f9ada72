//! Centralized location parsing and URL derivation for generator modules.
//!
//! Every generator module is addressed by the final two components of its
//! path: the parent directory is the *category* (a logical bucket, usually
//! numeric like `05`) and the file stem is the *slug*. The two concatenate
//! into the globally unique identity `category-slug`, which is also the key
//! all cross-links in the published index are expressed in.
//!
//! ## Strictness
//!
//! Decomposition is a hard pattern match, not a best-effort regex: a path
//! whose category or slug segment is empty or contains anything outside
//! `[A-Za-z0-9_]` is a [`LocationError`], never a silent skip. A module
//! that cannot be addressed cannot be linked to, so it has no place in the
//! index.
//!
//! ## Pagination
//!
//! The listing renderer shows [`GROUPS_PER_PAGE`] category groups per page.
//! [`home_url`] encodes that agreement: a numeric category lands on
//! `ceil(category / 10)`, page 1 being the root listing. The constant is
//! shared with the (external) renderer and must not drift.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Module file extension. Files with any other extension are not
/// generator modules and are ignored by discovery.
pub const MODULE_EXTENSION: &str = "toml";

/// Category groups shown per listing page by the external renderer.
pub const GROUPS_PER_PAGE: u32 = 10;

#[derive(Error, Debug)]
pub enum LocationError {
    #[error("generator path does not decompose into category/slug: {0}")]
    BadShape(PathBuf),
    #[error("invalid {what} segment {segment:?} in generator path {path}")]
    BadSegment {
        what: &'static str,
        segment: String,
        path: PathBuf,
    },
}

/// Where a generator module lives: category directory plus file slug.
///
/// The identity is derived, never stored — two locations with the same
/// `(category, slug)` pair are the same generator as far as the index is
/// concerned, which is why duplicate identities are rejected upstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorLocation {
    pub category: String,
    pub slug: String,
    /// Source path the module loads from. Not part of the identity.
    pub path: PathBuf,
}

impl GeneratorLocation {
    /// Decompose a discovered module path into a typed location.
    ///
    /// The final two path components must be a category directory and a
    /// `slug.toml` file, each a single segment of `[A-Za-z0-9_]+`:
    /// - `generators/animations/05/c.toml` → category `05`, slug `c`
    /// - `generators/misc/logo.toml` → category `misc`, slug `logo`
    pub fn from_path(path: &Path) -> Result<Self, LocationError> {
        let slug = path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| LocationError::BadShape(path.to_path_buf()))?;
        let category = path
            .parent()
            .and_then(|p| p.file_name())
            .and_then(|s| s.to_str())
            .ok_or_else(|| LocationError::BadShape(path.to_path_buf()))?;

        validate_segment("category", category, path)?;
        validate_segment("slug", slug, path)?;

        Ok(Self {
            category: category.to_string(),
            slug: slug.to_string(),
            path: path.to_path_buf(),
        })
    }

    /// Globally unique identity: `category-slug`.
    ///
    /// Injective by construction: segments cannot contain `-`, so the
    /// joined string decomposes unambiguously.
    pub fn identity(&self) -> String {
        format!("{}-{}", self.category, self.slug)
    }

    /// Permanent URL of the generator's own page: `/category/slug/`.
    pub fn permalink_url(&self) -> String {
        format!("/{}/{}/", self.category, self.slug)
    }
}

fn validate_segment(
    what: &'static str,
    segment: &str,
    path: &Path,
) -> Result<(), LocationError> {
    let valid = !segment.is_empty()
        && segment
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid {
        Ok(())
    } else {
        Err(LocationError::BadSegment {
            what,
            segment: segment.to_string(),
            path: path.to_path_buf(),
        })
    }
}

/// Namespace for one generator's markup: `svg-` + identity.
///
/// Every identifier inside the generator's tree is rewritten under this
/// prefix so multiple graphics can share a page without collisions.
pub fn namespace_for(identity: &str) -> String {
    format!("svg-{identity}")
}

/// Anchor into the paginated listing for a category.
///
/// Numeric categories land on page `ceil(category / 10)`; page 1 is the
/// root listing (`/#05`), later pages get a page path (`/page-3/#23`).
/// Non-numeric categories (e.g. `misc`) anchor the root listing directly.
pub fn home_url(category: &str) -> String {
    match category.parse::<u32>() {
        Ok(number) => {
            let page = number.div_ceil(GROUPS_PER_PAGE);
            if page == 1 {
                format!("/#{category}")
            } else {
                format!("/page-{page}/#{category}")
            }
        }
        Err(_) => format!("/#{category}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn animation_module_decomposes() {
        let loc =
            GeneratorLocation::from_path(Path::new("generators/animations/05/c.toml")).unwrap();
        assert_eq!(loc.category, "05");
        assert_eq!(loc.slug, "c");
        assert_eq!(loc.identity(), "05-c");
        assert_eq!(loc.permalink_url(), "/05/c/");
    }

    #[test]
    fn misc_module_takes_collection_dir_as_category() {
        let loc = GeneratorLocation::from_path(Path::new("generators/misc/logo.toml")).unwrap();
        assert_eq!(loc.category, "misc");
        assert_eq!(loc.slug, "logo");
        assert_eq!(loc.identity(), "misc-logo");
    }

    #[test]
    fn distinct_pairs_yield_distinct_identities() {
        let a = GeneratorLocation::from_path(Path::new("g/animations/05/c.toml")).unwrap();
        let b = GeneratorLocation::from_path(Path::new("g/animations/05/d.toml")).unwrap();
        let c = GeneratorLocation::from_path(Path::new("g/animations/06/c.toml")).unwrap();
        assert_ne!(a.identity(), b.identity());
        assert_ne!(a.identity(), c.identity());
        assert_ne!(b.identity(), c.identity());
    }

    #[test]
    fn dotted_stem_is_rejected() {
        let err = GeneratorLocation::from_path(Path::new("g/animations/05/c.extra.toml"))
            .unwrap_err();
        assert!(matches!(err, LocationError::BadSegment { what: "slug", .. }));
    }

    #[test]
    fn spaced_category_is_rejected() {
        let err =
            GeneratorLocation::from_path(Path::new("g/animations/my dir/c.toml")).unwrap_err();
        assert!(matches!(
            err,
            LocationError::BadSegment { what: "category", .. }
        ));
    }

    #[test]
    fn bare_filename_has_no_category() {
        let err = GeneratorLocation::from_path(Path::new("c.toml")).unwrap_err();
        assert!(matches!(err, LocationError::BadShape(_)));
    }

    #[test]
    fn home_url_page_one_anchors_root_listing() {
        assert_eq!(home_url("05"), "/#05");
        assert_eq!(home_url("10"), "/#10");
    }

    #[test]
    fn home_url_later_pages_get_page_path() {
        assert_eq!(home_url("23"), "/page-3/#23");
        assert_eq!(home_url("11"), "/page-2/#11");
        assert_eq!(home_url("18"), "/page-2/#18");
    }

    #[test]
    fn home_url_preserves_zero_padded_anchor() {
        // The anchor is the category string as written, not the parsed number.
        assert_eq!(home_url("05"), "/#05");
        assert_ne!(home_url("05"), "/#5");
    }

    #[test]
    fn home_url_non_numeric_anchors_root() {
        assert_eq!(home_url("misc"), "/#misc");
    }

    #[test]
    fn namespace_is_prefixed_identity() {
        assert_eq!(namespace_for("05-c"), "svg-05-c");
    }
}
