//! Heading discovery and identifier assignment.
//!
//! Walks a parsed document in document order, finds every heading inside the
//! indexable window (`h2`/`h3`/`h4`; the `h1` is the page title, `h5` and
//! deeper are below navigation granularity), and assigns each a unique
//! URL-safe identifier. Identifiers are written straight onto the live
//! elements' `id` attributes, and an ordered record list is returned for the
//! hierarchy builder to consume.
//!
//! ## Identifier namespace
//!
//! Uniqueness is scoped to a single document pass. The first heading with a
//! given slug keeps it bare; later headings with the same slug get `-1`,
//! `-2`, … suffixes in document order. The namespace is discarded with the
//! pass, so identical headings in different documents slug identically.

use std::collections::HashSet;

use kuchikiki::NodeRef;

use crate::slug::slugify;

/// Selector covering the indexable heading window.
pub const HEADING_WINDOW: &str = "h2, h3, h4";

/// Shallowest heading depth in the window. The hierarchy builder anchors its
/// outer list here.
pub const WINDOW_FLOOR: u8 = 2;

/// One heading discovered during an indexing pass.
///
/// Owned by the indexer while scanning; the hierarchy builder and document
/// mutator only borrow these. Rebuilt fresh on every pass, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heading {
    /// Nesting depth: 2, 3, or 4.
    pub depth: u8,
    /// Rendered text content, markup stripped, outer whitespace trimmed.
    pub text: String,
    /// Unique identifier assigned to the element.
    pub id: String,
}

/// Count of indexed headings per level, for per-file reporting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HeadingTally {
    pub h2: usize,
    pub h3: usize,
    pub h4: usize,
}

impl HeadingTally {
    pub fn count(headings: &[Heading]) -> Self {
        let mut tally = Self::default();
        for heading in headings {
            match heading.depth {
                2 => tally.h2 += 1,
                3 => tally.h3 += 1,
                _ => tally.h4 += 1,
            }
        }
        tally
    }
}

/// Assign unique identifiers to every in-window heading.
///
/// Mutates the document in place (each heading element gains an `id`
/// attribute) and returns the records in document order. Every identifier in
/// the returned list is unique within this pass.
pub fn index_headings(document: &NodeRef) -> Vec<Heading> {
    // Collect first, then mutate. Attribute edits are cell-local, but
    // keeping traversal and mutation separate avoids surprises if the
    // selection logic ever grows structural edits.
    let matches: Vec<_> = document
        .select(HEADING_WINDOW)
        .map(|sel| sel.collect())
        .unwrap_or_default();

    let mut used = HashSet::with_capacity(matches.len());
    let mut records = Vec::with_capacity(matches.len());

    for heading in matches {
        let depth = match heading.name.local.as_ref() {
            "h2" => 2,
            "h3" => 3,
            _ => 4,
        };
        let text = heading.as_node().text_contents().trim().to_string();
        let id = disambiguate(slugify(&text), &used);
        used.insert(id.clone());
        heading.attributes.borrow_mut().insert("id", id.clone());
        records.push(Heading { depth, text, id });
    }

    records
}

/// Append `-1`, `-2`, … until the identifier is unused in this pass.
fn disambiguate(base: String, used: &HashSet<String>) -> String {
    if !used.contains(&base) {
        return base;
    }
    let mut counter = 1usize;
    loop {
        let candidate = format!("{base}-{counter}");
        if !used.contains(&candidate) {
            return candidate;
        }
        counter += 1;
    }
}
