//! Shared fixtures for unit and integration tests.

use crate::registry::GeneratorRecord;
use std::fs;
use std::path::{Path, PathBuf};

/// Write a generator module file under `root`, creating parent dirs.
pub fn write_module(root: &Path, relative: &str, contents: &str) -> PathBuf {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, contents).unwrap();
    path
}

/// The standard fixture set: three animations mirroring the built-in
/// producers plus one misc generator.
pub fn sample_generators(root: &Path) {
    write_module(
        root,
        "animations/05/c.toml",
        "producer = \"pulse-grid\"\n[params]\ncells = 4\n",
    );
    write_module(
        root,
        "animations/18/k.toml",
        "producer = \"dash-trace\"\n[params]\niterations = 3\n",
    );
    write_module(root, "animations/23/b.toml", "producer = \"stripe-spinner\"\n");
    write_module(
        root,
        "misc/logo.toml",
        "producer = \"stripe-spinner\"\n[params]\nduration = 8.0\n",
    );
}

/// A bare record for index tests: markup content is irrelevant there.
pub fn record(category: &str, slug: &str) -> GeneratorRecord {
    GeneratorRecord {
        identity: format!("{category}-{slug}"),
        category: category.to_string(),
        slug: slug.to_string(),
        home_url: crate::naming::home_url(category),
        permalink_url: format!("/{category}/{slug}/"),
        raw_markup: String::new(),
        min_markup: String::new(),
        previous: None,
        next: None,
        group: None,
    }
}
