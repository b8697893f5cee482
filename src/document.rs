//! In-place document mutation: navigation injection and stripping.
//!
//! One discipline per pass: parse the file into an owned DOM, mutate that
//! tree, serialize once. Content files are body fragments, so serialization
//! returns the inner HTML of `<body>` and round-trips fragments without
//! gaining `<html>`/`<body>` wrappers.
//!
//! ## Placement
//!
//! The navigation block goes immediately after the page title (`h1`). Pages
//! without a title get it before the first element of the body instead. A
//! body with no elements at all has no viable insertion point; that is the
//! one failure this module reports.
//!
//! ## Idempotence
//!
//! [`inject`] removes any existing navigation block before inserting, so
//! injecting twice never yields two blocks. [`strip`] on a document with
//! nothing to remove reports zero removals; the caller turns that into a
//! skip, not an error.

use kuchikiki::NodeRef;
use kuchikiki::parse_html;
use tendril::TendrilSink;

use crate::headings::HEADING_WINDOW;

/// Selector matching a previously injected navigation container. Matching is
/// by container role (element + class marker), never by inner text.
const NAV_SELECTOR: &str = "nav.table-of-contents";

/// Parse an HTML document or fragment into an owned DOM.
///
/// html5ever is error-recovering, so this cannot fail; unreadable bytes are
/// the caller's read-time concern.
pub fn parse_document(html: &str) -> NodeRef {
    parse_html().one(html)
}

/// What [`strip`] removed, for reporting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StripOutcome {
    /// A navigation block was present and removed.
    pub removed_navigation: bool,
    /// Number of `id` attributes removed from in-window headings.
    pub removed_ids: usize,
}

impl StripOutcome {
    /// True when the document was already clean and nothing changed.
    pub fn is_noop(&self) -> bool {
        !self.removed_navigation && self.removed_ids == 0
    }
}

/// Insert the navigation block at the document's anchor point.
///
/// Any existing block is removed first. Returns false only when there is no
/// viable insertion point (no `h1` and an element-less body) or when
/// `nav_html` is empty.
pub fn inject(document: &NodeRef, nav_html: &str) -> bool {
    if nav_html.is_empty() {
        return false;
    }
    remove_navigation(document);

    let Some(nav_node) = parse_navigation_block(nav_html) else {
        return false;
    };

    if let Ok(title) = document.select_first("h1") {
        title.as_node().insert_after(nav_node);
        return true;
    }
    if let Some(first) = first_body_element(document) {
        first.insert_before(nav_node);
        return true;
    }
    false
}

/// Remove the navigation block and all in-window heading identifiers.
pub fn strip(document: &NodeRef) -> StripOutcome {
    StripOutcome {
        removed_navigation: remove_navigation(document),
        removed_ids: remove_heading_ids(document),
    }
}

/// Detach every existing navigation block. Returns whether any was present.
pub fn remove_navigation(document: &NodeRef) -> bool {
    let existing: Vec<NodeRef> = document
        .select(NAV_SELECTOR)
        .map(|sel| sel.map(|m| m.as_node().clone()).collect())
        .unwrap_or_default();
    let found = !existing.is_empty();
    for node in existing {
        node.detach();
    }
    found
}

/// True when the document carries a navigation block.
pub fn has_navigation(document: &NodeRef) -> bool {
    document.select_first(NAV_SELECTOR).is_ok()
}

/// Number of in-window headings currently carrying an `id` attribute.
pub fn count_heading_ids(document: &NodeRef) -> usize {
    document
        .select(HEADING_WINDOW)
        .map(|sel| {
            sel.filter(|heading| heading.attributes.borrow().get("id").is_some())
                .count()
        })
        .unwrap_or(0)
}

/// Serialize the mutated document back to a body fragment.
pub fn serialize_fragment(document: &NodeRef) -> String {
    let mut out = Vec::new();
    if let Ok(body) = document.select_first("body") {
        for child in body.as_node().children() {
            child.serialize(&mut out).ok();
        }
    } else {
        document.serialize(&mut out).ok();
    }
    String::from_utf8(out).unwrap_or_default()
}

/// Re-parse the rendered block and pull out the container element.
fn parse_navigation_block(nav_html: &str) -> Option<NodeRef> {
    let fragment = parse_html().one(nav_html);
    fragment
        .select_first(NAV_SELECTOR)
        .ok()
        .map(|m| m.as_node().clone())
}

/// First element child of the body, skipping text and comment nodes.
fn first_body_element(document: &NodeRef) -> Option<NodeRef> {
    let body = document.select_first("body").ok()?;
    body.as_node()
        .children()
        .find(|child| child.as_element().is_some())
}

fn remove_heading_ids(document: &NodeRef) -> usize {
    let mut removed = 0;
    if let Ok(headings) = document.select(HEADING_WINDOW) {
        for heading in headings {
            if heading.attributes.borrow_mut().remove("id").is_some() {
                removed += 1;
            }
        }
    }
    removed
}
