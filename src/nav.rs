//! Hierarchical navigation markup from a flat heading list.
//!
//! The indexer hands over headings as a flat, document-ordered sequence whose
//! depths move up and down arbitrarily (`2,3,3,2,4,3`, …). This module folds
//! that sequence into nested `<ul>` markup in a single forward pass, tracking
//! the currently open list levels on an indexable stack rather than building
//! a tree. Depth jumps of more than one level open (or close) one list per
//! unit, so the emitted open and close tokens always balance, for lists and
//! items both.
//!
//! The nested list is wrapped in fixed chrome: a `nav.table-of-contents`
//! container with a "Contents" section header and toggle affordances. The
//! chrome is rendered with [maud](https://maud.lambda.xyz/); entry labels go
//! through maud interpolation, so they are HTML-escaped for free. Only the
//! nesting structure is a correctness contract, the chrome is decoration the
//! site stylesheet and script hang behavior off.

use maud::{Markup, PreEscaped, html};

use crate::headings::{Heading, WINDOW_FLOOR};

/// Build the full navigation block for the given headings.
///
/// Returns an empty string when `headings` is empty; callers treat that as
/// the valid "no navigation" outcome, distinct from an injection failure.
pub fn build_navigation(headings: &[Heading]) -> String {
    if headings.is_empty() {
        return String::new();
    }

    let entries = PreEscaped(nested_list(headings));
    let markup: Markup = html! {
        nav.table-of-contents {
            div.toc-header {
                div.toc-header-left {
                    ul {
                        li.toc-section {
                            div.toc-section-header {
                                button.toc-section-toggle data-section="headings" { "\u{25BC}" }
                                span.toc-section-title { "Contents" }
                            }
                            ul.toc-section-content data-section="headings" {
                                (entries)
                            }
                        }
                    }
                }
                div.toc-header-right {
                    button.toc-toggle aria-label="Toggle table of contents" { "\u{25BC}" }
                }
            }
        }
    };
    markup.into_string()
}

/// Fold the flat heading sequence into nested list items.
///
/// The stack holds one marker per open list level; the marker records
/// whether an `<li>` is currently open at that level. Level 0 is the
/// `toc-section-content` list owned by the chrome, so its `<ul>` tokens are
/// never emitted here. The outer list is anchored at the window floor:
/// a first heading deeper than the floor opens intermediate lists, and a
/// later shallower heading can never close more levels than were opened.
fn nested_list(headings: &[Heading]) -> String {
    let mut parts: Vec<String> = Vec::new();
    let mut open_levels: Vec<bool> = vec![false];
    let mut current_depth = WINDOW_FLOOR;

    for heading in headings {
        if heading.depth > current_depth {
            for _ in current_depth..heading.depth {
                parts.push("<ul>".to_string());
                open_levels.push(false);
            }
        } else if heading.depth < current_depth {
            for _ in heading.depth..current_depth {
                if let Some(item_open) = open_levels.pop() {
                    if item_open {
                        parts.push("</li>".to_string());
                    }
                    parts.push("</ul>".to_string());
                }
            }
        }

        // Same level now; close the previous sibling item before opening
        // the next.
        if let Some(item_open) = open_levels.last_mut() {
            if *item_open {
                parts.push("</li>".to_string());
            }
            *item_open = true;
        }
        parts.push(format!("<li>{}", entry_link(heading)));
        current_depth = heading.depth;
    }

    while let Some(item_open) = open_levels.pop() {
        if item_open {
            parts.push("</li>".to_string());
        }
        if !open_levels.is_empty() {
            parts.push("</ul>".to_string());
        }
    }

    parts.concat()
}

/// Render one entry's link with an escaped label.
fn entry_link(heading: &Heading) -> String {
    let href = format!("#{}", heading.id);
    let markup: Markup = html! { a href=(href) { (heading.text) } };
    markup.into_string()
}
