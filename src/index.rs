//! Index assembly: ordering, adjacency links, grouping, misc collection.
//!
//! Takes the registry's unordered records and produces the structure the
//! site renderer consumes: a flat sequential list with previous/next
//! neighbors, category groups with their own adjacency and ordering, and
//! a name-keyed misc map.
//!
//! ## Ordering policy
//!
//! Records sort by **lexicographic comparison of their identity strings**.
//! Because the identity is `category-slug`, this orders within a category
//! by slug and orders categories as strings, not numbers: `18` sorts after
//! `05`, but a category `9` would sort after `23`. That is deliberate,
//! documented behavior shared with the listing renderer — do not "fix" it
//! to numeric comparison.
//!
//! ## Link representation
//!
//! `previous`/`next`/`group` are identity and group-name keys, resolved on
//! demand through [`AnimationIndex::record`] and [`AnimationIndex::group`].
//! No cycles, nothing to garbage-collect, and the whole index serializes
//! straight to JSON.

use crate::naming;
use crate::registry::GeneratorRecord;
use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum IndexError {
    #[error("duplicate misc generator slug {0:?}")]
    DuplicateSlug(String),
}

/// One category of the animation collection: its items in list order and
/// its neighbors among the sorted groups.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryGroup {
    pub name: String,
    pub home_url: String,
    pub permalink_url: String,
    /// 0-based position in the sorted group sequence.
    pub order_index: usize,
    /// Identities of member records, same relative order as the list.
    pub items: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
}

/// The linked, paginated animation collection.
#[derive(Debug, Clone, Serialize)]
pub struct AnimationIndex {
    pub list: Vec<GeneratorRecord>,
    pub dirs: Vec<CategoryGroup>,
}

impl AnimationIndex {
    /// Resolve a record by identity key.
    pub fn record(&self, identity: &str) -> Option<&GeneratorRecord> {
        self.list.iter().find(|r| r.identity == identity)
    }

    /// Resolve a category group by name key.
    pub fn group(&self, name: &str) -> Option<&CategoryGroup> {
        self.dirs.iter().find(|g| g.name == name)
    }
}

/// Everything one discovery pass publishes.
#[derive(Debug, Clone, Serialize)]
pub struct SvgIndex {
    pub animations: AnimationIndex,
    pub misc: BTreeMap<String, GeneratorRecord>,
}

/// Assemble the animation collection from one pass's records.
///
/// Sorts by identity, installs previous/next neighbors, builds one group
/// per distinct category (lexicographic name order) with order indices and
/// group adjacency, and back-fills each record's owning-group key.
pub fn build_animation_index(mut records: Vec<GeneratorRecord>) -> AnimationIndex {
    records.sort_by(|a, b| a.identity.cmp(&b.identity));

    let identities: Vec<String> = records.iter().map(|r| r.identity.clone()).collect();
    for (i, record) in records.iter_mut().enumerate() {
        record.previous = (i > 0).then(|| identities[i - 1].clone());
        record.next = identities.get(i + 1).cloned();
        record.group = Some(record.category.clone());
    }

    let mut dirs: Vec<CategoryGroup> = Vec::new();
    for record in &records {
        match dirs.iter_mut().find(|g| g.name == record.category) {
            Some(group) => group.items.push(record.identity.clone()),
            None => dirs.push(CategoryGroup {
                name: record.category.clone(),
                home_url: naming::home_url(&record.category),
                permalink_url: format!("/{}/", record.category),
                order_index: 0,
                items: vec![record.identity.clone()],
                previous: None,
                next: None,
            }),
        }
    }

    dirs.sort_by(|a, b| a.name.cmp(&b.name));
    let names: Vec<String> = dirs.iter().map(|g| g.name.clone()).collect();
    for (i, group) in dirs.iter_mut().enumerate() {
        group.order_index = i;
        group.previous = (i > 0).then(|| names[i - 1].clone());
        group.next = names.get(i + 1).cloned();
    }

    AnimationIndex { list: records, dirs }
}

/// Collect the misc records into a slug-keyed map.
///
/// Two records sharing a slug within one pass is a configuration error;
/// last-write-wins would silently drop a generator, so duplicates fail
/// the pass instead.
pub fn build_misc_index(
    records: Vec<GeneratorRecord>,
) -> Result<BTreeMap<String, GeneratorRecord>, IndexError> {
    let mut misc = BTreeMap::new();
    for record in records {
        if misc.contains_key(&record.slug) {
            return Err(IndexError::DuplicateSlug(record.slug));
        }
        misc.insert(record.slug.clone(), record);
    }
    Ok(misc)
}
