//! End-to-end pass over a real generators directory: discovery through
//! published index, exercising the same structure `loopgal build` writes
//! to `index.json`.

use loopgal::pipeline::Pipeline;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write_module(root: &Path, relative: &str, contents: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, contents).unwrap();
}

fn seed_generators(root: &Path) {
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
    write_module(root, "misc/logo.toml", "producer = \"stripe-spinner\"\n");
}

#[test]
fn full_pass_publishes_linked_paginated_index() {
    let tmp = TempDir::new().unwrap();
    seed_generators(tmp.path());

    let mut pipeline = Pipeline::new(tmp.path());
    pipeline.run_pass().unwrap();
    let index = pipeline.published().unwrap();

    // ordering and links
    let identities: Vec<&str> = index
        .animations
        .list
        .iter()
        .map(|r| r.identity.as_str())
        .collect();
    assert_eq!(identities, ["05-c", "18-k", "23-b"]);
    assert_eq!(index.animations.list[0].previous, None);
    assert_eq!(index.animations.list[1].previous.as_deref(), Some("05-c"));
    assert_eq!(index.animations.list[2].next, None);

    // pagination urls: ceil(5/10)=1 → root anchor; ceil(23/10)=3 → page 3
    assert_eq!(index.animations.list[0].home_url, "/#05");
    assert_eq!(index.animations.list[2].home_url, "/page-3/#23");
    assert_eq!(index.animations.list[1].permalink_url, "/18/k/");

    // groups mirror the categories, fully linked
    let names: Vec<&str> = index.animations.dirs.iter().map(|g| g.name.as_str()).collect();
    assert_eq!(names, ["05", "18", "23"]);
    for record in &index.animations.list {
        let group = index.animations.group(record.group.as_deref().unwrap()).unwrap();
        assert_eq!(group.name, record.category);
    }

    // misc keyed by slug
    assert_eq!(index.misc["logo"].identity, "misc-logo");
}

#[test]
fn published_markup_is_embeddable_without_collisions() {
    let tmp = TempDir::new().unwrap();
    seed_generators(tmp.path());

    let mut pipeline = Pipeline::new(tmp.path());
    pipeline.run_pass().unwrap();
    let index = pipeline.published().unwrap();

    // a page concatenates every minified fragment; ids must not cross
    let page: String = index
        .animations
        .list
        .iter()
        .map(|r| r.min_markup.as_str())
        .collect();
    for record in &index.animations.list {
        let ns = format!("svg-{}", record.identity);
        assert!(record.min_markup.contains(&format!("id=\"{ns}\"")));
        // each namespace appears only in its own fragment
        let outside: String = index
            .animations
            .list
            .iter()
            .filter(|other| other.identity != record.identity)
            .map(|other| other.min_markup.as_str())
            .collect();
        assert!(!outside.contains(&ns));
    }
    assert!(page.contains("svg-23-b-stripes"));
}

#[test]
fn index_serializes_to_renderer_shape() {
    let tmp = TempDir::new().unwrap();
    seed_generators(tmp.path());

    let mut pipeline = Pipeline::new(tmp.path());
    pipeline.run_pass().unwrap();

    let json = serde_json::to_value(pipeline.published().unwrap()).unwrap();
    assert!(json["animations"]["list"].is_array());
    assert!(json["animations"]["dirs"].is_array());
    assert!(json["misc"]["logo"]["min_markup"].is_string());
    assert_eq!(json["animations"]["list"][1]["previous"], "05-c");
    assert_eq!(json["animations"]["dirs"][0]["order_index"], 0);
    // absent links are omitted, not null
    assert!(json["animations"]["list"][0].get("previous").is_none());
}

#[test]
fn editing_a_module_is_visible_on_the_next_pass() {
    let tmp = TempDir::new().unwrap();
    seed_generators(tmp.path());

    let mut pipeline = Pipeline::new(tmp.path());
    pipeline.run_pass().unwrap();
    let before = pipeline.published().unwrap().animations.list[0]
        .raw_markup
        .clone();

    write_module(
        tmp.path(),
        "animations/05/c.toml",
        "producer = \"pulse-grid\"\n[params]\ncells = 6\n",
    );
    pipeline.run_pass().unwrap();
    let after = &pipeline.published().unwrap().animations.list[0].raw_markup;
    assert_ne!(&before, after);
}
