//! CLI output formatting for discovery passes.
//!
//! Output is information-centric, not file-centric: the primary display
//! for every generator is its identity and the URLs it publishes under,
//! with the module's source location as an indented `Source:` context
//! line. The pass summary reads as a content inventory of the index that
//! was just published.
//!
//! ```text
//! Animations
//! 001 05-c → /05/c/
//!     Source: animations/05/c.toml
//!     Markup: 1482 raw / 1130 min bytes
//! ...
//!
//! Directories
//! 001 05 (1 animation) → /05/
//!
//! Misc
//! 001 logo → /misc/logo/
//!     Source: misc/logo.toml
//!
//! Indexed 3 animations in 3 directories, 1 misc
//! Modules: 4 modules loaded (4 changed, 0 unchanged)
//! ```
//!
//! Each section has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure — no I/O, no side effects.

use crate::cache::CacheStats;
use crate::index::SvgIndex;
use crate::naming::MODULE_EXTENSION;
use crate::registry::{ANIMATIONS, GeneratorRecord};

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{pos:0>3}")
}

/// Canonical module source path for display, relative to the generators
/// directory. Animations live under the collection dir; for misc the
/// category *is* the collection dir.
fn source_line(record: &GeneratorRecord, collection: Option<&str>) -> String {
    match collection {
        Some(collection) => format!(
            "    Source: {collection}/{}/{}.{MODULE_EXTENSION}",
            record.category, record.slug
        ),
        None => format!(
            "    Source: {}/{}.{MODULE_EXTENSION}",
            record.category, record.slug
        ),
    }
}

fn record_lines(pos: usize, record: &GeneratorRecord, collection: Option<&str>) -> Vec<String> {
    vec![
        format!(
            "{} {} → {}",
            format_index(pos),
            record.identity,
            record.permalink_url
        ),
        source_line(record, collection),
        format!(
            "    Markup: {} raw / {} min bytes",
            record.raw_markup.len(),
            record.min_markup.len()
        ),
    ]
}

/// Format the full pass summary for a published index.
pub fn format_pass_output(index: &SvgIndex, stats: CacheStats) -> Vec<String> {
    let mut lines = Vec::new();

    lines.push("Animations".to_string());
    for (i, record) in index.animations.list.iter().enumerate() {
        lines.extend(record_lines(i + 1, record, Some(ANIMATIONS)));
    }

    lines.push(String::new());
    lines.push("Directories".to_string());
    for group in &index.animations.dirs {
        let noun = if group.items.len() == 1 {
            "animation"
        } else {
            "animations"
        };
        lines.push(format!(
            "{} {} ({} {noun}) → {}",
            format_index(group.order_index + 1),
            group.name,
            group.items.len(),
            group.permalink_url
        ));
    }

    if !index.misc.is_empty() {
        lines.push(String::new());
        lines.push("Misc".to_string());
        for (i, record) in index.misc.values().enumerate() {
            lines.extend(record_lines(i + 1, record, None));
        }
    }

    lines.push(String::new());
    lines.push(format!(
        "Indexed {} animations in {} directories, {} misc",
        index.animations.list.len(),
        index.animations.dirs.len(),
        index.misc.len()
    ));
    lines.push(format!("Modules: {stats}"));
    lines
}

/// Print the pass summary to stdout.
pub fn print_pass_output(index: &SvgIndex, stats: CacheStats) {
    for line in format_pass_output(index, stats) {
        println!("{line}");
    }
}
