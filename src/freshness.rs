//! Change detection: decide whether a document needs (re)processing.
//!
//! Advisory only; force mode bypasses every rule here. The strip direction
//! has no freshness check at all, because stripping is explicit and its
//! "nothing to remove" case is already handled by the mutator.
//!
//! ## Rules, in order
//!
//! 1. Missing target document: needs processing (nothing to compare).
//! 2. Generating source newer than the document: needs processing, even if
//!    the document already carries navigation markup.
//! 3. Document already processed (navigation block present and at least one
//!    in-window heading carries an identifier): skip.
//! 4. Otherwise: process.
//!
//! ## Locating the generating source
//!
//! Rendered documents carry a provenance note, an `<em>` reading
//! "… automatically generated from `FILE` …" with the filename in a nested
//! `<code>`. The note names only the file, not its location; location is
//! structured configuration (each environment lists `source_roots`), and the
//! resolver searches those roots for a unique filename match. No match, or
//! an ambiguous one, simply disables the timestamp comparison.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use kuchikiki::NodeRef;
use log::{debug, warn};
use walkdir::WalkDir;

use crate::document::{self, parse_document};

/// Marker phrase of the provenance note.
const GENERATED_FROM: &str = "automatically generated from";

/// Decide whether the generate direction has work to do.
///
/// Reads and parses the document to inspect its processing markers. Callers
/// that already hold a parsed document should use the granular predicates
/// instead and skip the second parse.
pub fn needs_processing(document_path: &Path, source_path: Option<&Path>) -> bool {
    if !document_path.exists() {
        return true;
    }
    if let Some(source) = source_path {
        if source_is_newer(source, document_path) {
            debug!(
                "{}: source {} is newer, reprocessing",
                document_path.display(),
                source.display()
            );
            return true;
        }
    }
    let Ok(html) = fs::read_to_string(document_path) else {
        return true;
    };
    !already_processed(&parse_document(&html))
}

/// True when the document carries both processing markers: a navigation
/// block and at least one identified in-window heading.
pub fn already_processed(document: &NodeRef) -> bool {
    document::has_navigation(document) && document::count_heading_ids(document) > 0
}

/// Extract the source filename from the document's provenance note, if any.
pub fn find_source_reference(document: &NodeRef) -> Option<String> {
    for note in document.select("em").ok()? {
        if !note.as_node().text_contents().contains(GENERATED_FROM) {
            continue;
        }
        if let Ok(code) = note.as_node().select_first("code") {
            let filename = code.as_node().text_contents().trim().to_string();
            if !filename.is_empty() {
                return Some(filename);
            }
        }
    }
    None
}

/// Resolve a referenced source filename against the configured roots.
///
/// Returns the path only when exactly one file under the roots matches;
/// zero or multiple matches disable the timestamp check rather than guess.
pub fn resolve_source(filename: &str, source_roots: &[PathBuf]) -> Option<PathBuf> {
    let mut matches: Vec<PathBuf> = Vec::new();
    for root in source_roots {
        for entry in WalkDir::new(root).into_iter().filter_map(Result::ok) {
            if entry.file_type().is_file() && entry.file_name().to_str() == Some(filename) {
                matches.push(entry.into_path());
            }
        }
    }
    match matches.len() {
        1 => matches.pop(),
        0 => None,
        n => {
            warn!("source reference {filename} is ambiguous ({n} matches), skipping timestamp check");
            None
        }
    }
}

/// Compare modification times. Missing metadata on either side counts as
/// not-newer, leaving the decision to the marker rules.
pub fn source_is_newer(source: &Path, document: &Path) -> bool {
    match (modified(source), modified(document)) {
        (Some(source_mtime), Some(document_mtime)) => source_mtime > document_mtime,
        _ => false,
    }
}

fn modified(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).and_then(|meta| meta.modified()).ok()
}
