//! # sitetoc
//!
//! Table-of-contents generator for rendered HTML content files. Part of a
//! static-site build pipeline: upstream stages render markdown into HTML
//! fragments under `publish/<env>/`; this tool gives every content page
//! linkable headings and an injected, nested "Contents" navigation block,
//! and can undo exactly that.
//!
//! # Architecture: One Pass Per Document
//!
//! Each document runs through a short, uninterrupted pipeline:
//!
//! ```text
//! 1. Freshness   skip when already processed and the source is unchanged
//! 2. Index       assign unique URL-safe ids to h2/h3/h4 headings
//! 3. Build       fold the flat heading list into nested navigation markup
//! 4. Inject      place the block after the page title, idempotently
//! 5. Write       serialize the body fragment back (skipped in dry-run)
//! ```
//!
//! The strip direction runs the inverse: remove the navigation block and
//! heading ids, or report a skip when there is nothing to remove. Both
//! directions are idempotent, so a crashed batch is safely re-runnable.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`slug`] | Heading text → URL-safe identifier stems |
//! | [`headings`] | Heading discovery and unique id assignment |
//! | [`nav`] | Stack-based nested navigation markup from flat heading lists |
//! | [`document`] | DOM mutation: inject/strip, and fragment serialization |
//! | [`freshness`] | Timestamp- and marker-based skip decisions |
//! | [`process`] | Batch driver: discovery, per-file statuses, run report |
//! | [`config`] | `sitetoc.toml` environment configuration |
//! | [`output`] | CLI output formatting: per-file lines and summaries |
//!
//! # Design Decisions
//!
//! ## Stack, Not Tree
//!
//! Heading hierarchy is never materialized as a node graph. The builder
//! walks the flat heading list once, tracking open list levels on a plain
//! `Vec`. Depth arithmetic stays linear, ownership stays trivial, and the
//! balanced open/close property is enforced structurally instead of by
//! tree traversal.
//!
//! ## Owned DOM, Single Serialization
//!
//! Each pass parses the file into an owned [kuchikiki](https://docs.rs/kuchikiki)
//! DOM, mutates that tree in place, and serializes once at the end. No
//! mixing of functional rebuilding and in-place edits within a pass.
//!
//! ## Maud for the Chrome
//!
//! The navigation container is rendered with [Maud](https://maud.lambda.xyz/),
//! so the fixed chrome is compile-time checked and entry labels are escaped
//! by construction. Only the nested list inside it is assembled by the
//! stack fold.
//!
//! ## Reporting as a Capability
//!
//! The batch driver takes an optional channel and streams one status per
//! file; leveled diagnostics go through the `log` facade. The core never
//! touches global output state, so it is fully testable with nothing wired
//! up.

pub mod config;
pub mod document;
pub mod freshness;
pub mod headings;
pub mod nav;
pub mod output;
pub mod process;
pub mod slug;
