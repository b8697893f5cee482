//! Batch processing of rendered HTML content files.
//!
//! The driver discovers eligible documents under a content root and runs one
//! of two per-file pipelines:
//!
//! ```text
//! generate:  freshness check → index headings → build navigation → inject → write
//! strip:     remove navigation + identifiers → write
//! ```
//!
//! Every per-file problem is caught and folded into that file's status; one
//! bad document never aborts the batch. Writes are not transactional: a
//! crash mid-batch leaves earlier files processed and later files untouched,
//! which is safe because both pipelines are idempotent and re-runnable.
//!
//! ## Ordering and parallelism
//!
//! Documents are independent (the identifier namespace is per file), so the
//! per-file loop fans out across the rayon pool. Progress events arrive in
//! completion order; the returned [`RunReport`] is re-sorted by path so
//! aggregate output is deterministic regardless of scheduling.
//!
//! Dry-run mode performs every step except the final write.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;

use log::{debug, info};
use rayon::prelude::*;
use thiserror::Error;
use walkdir::WalkDir;

use crate::document::{self, parse_document};
use crate::freshness;
use crate::headings::{self, HeadingTally};
use crate::nav;

/// Unrecoverable per-file failures. Carried inside statuses that cross the
/// progress channel, so payloads are rendered messages rather than source
/// errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FileError {
    #[error("read failed: {0}")]
    Read(String),
    #[error("not parseable as text: {0}")]
    Parse(String),
    #[error("no valid insertion point for the navigation block")]
    Inject,
    #[error("write failed: {0}")]
    Write(String),
}

impl FileError {
    /// Split read-time IO errors into the parse/read taxonomy: undecodable
    /// bytes are a parse failure, everything else a read failure.
    fn from_read(err: io::Error) -> Self {
        if err.kind() == io::ErrorKind::InvalidData {
            FileError::Parse(err.to_string())
        } else {
            FileError::Read(err.to_string())
        }
    }
}

/// Why a file was skipped. Skips are statuses, never failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Document carries processing markers and its source is not newer.
    UpToDate,
    /// Document carries processing markers; no source file was identified.
    AlreadyProcessed,
    /// No headings inside the indexable window.
    NoHeadings,
    /// Strip found neither a navigation block nor heading identifiers.
    NothingToStrip,
}

/// Result of one file's pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    Generated { tally: HeadingTally },
    Stripped { removed_navigation: bool, removed_ids: usize },
    Skipped(SkipReason),
    Failed(FileError),
}

/// One file's status, streamed as a progress event and collected into the
/// report. The path is relative to the content root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileStatus {
    pub path: PathBuf,
    pub outcome: FileOutcome,
}

/// Aggregate outcome of a batch run, sorted by path.
#[derive(Debug, Default)]
pub struct RunReport {
    pub statuses: Vec<FileStatus>,
}

impl RunReport {
    pub fn processed(&self) -> usize {
        self.statuses
            .iter()
            .filter(|s| {
                matches!(s.outcome, FileOutcome::Generated { .. } | FileOutcome::Stripped { .. })
            })
            .count()
    }

    pub fn skipped(&self) -> usize {
        self.statuses
            .iter()
            .filter(|s| matches!(s.outcome, FileOutcome::Skipped(_)))
            .count()
    }

    pub fn failed(&self) -> usize {
        self.statuses
            .iter()
            .filter(|s| matches!(s.outcome, FileOutcome::Failed(_)))
            .count()
    }

    /// Drives the process exit status: failures fail the build, skips never.
    pub fn has_failures(&self) -> bool {
        self.failed() > 0
    }
}

/// Which per-file pipeline to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Generate,
    Strip,
}

/// Batch flags shared by both pipelines.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Bypass the change detector and reprocess everything.
    pub force: bool,
    /// Perform every step except the final write.
    pub dry_run: bool,
}

/// Run one batch over the content root.
///
/// `source_roots` feed the generated-from resolution of the freshness check;
/// pass an empty slice to disable timestamp comparison. Each file's status
/// is sent over `events` as it completes, then the full report is returned.
pub fn run(
    root: &Path,
    source_roots: &[PathBuf],
    mode: Mode,
    options: RunOptions,
    events: Option<Sender<FileStatus>>,
) -> RunReport {
    let files = discover_documents(root);
    info!("found {} content files under {}", files.len(), root.display());

    let mut statuses: Vec<FileStatus> = files
        .par_iter()
        .map_with(events, |events, path| {
            let outcome = match mode {
                Mode::Generate => generate_file(path, source_roots, options),
                Mode::Strip => strip_file(path, options),
            };
            let status = FileStatus {
                path: path.strip_prefix(root).unwrap_or(path).to_path_buf(),
                outcome,
            };
            if let Some(events) = events {
                events.send(status.clone()).ok();
            }
            status
        })
        .collect();

    statuses.sort_by(|a, b| a.path.cmp(&b.path));
    RunReport { statuses }
}

/// Find every content document under the root, in lexicographic order.
///
/// Content documents are `*.html` files at any depth. `index.html` is the
/// application shell, not content, and is excluded.
pub fn discover_documents(root: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(root)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .map(walkdir::DirEntry::into_path)
        .filter(|path| {
            path.extension()
                .map(|ext| ext.eq_ignore_ascii_case("html"))
                .unwrap_or(false)
        })
        .filter(|path| {
            path.file_name()
                .map(|name| name != "index.html")
                .unwrap_or(true)
        })
        .collect();
    files.sort();
    files
}

/// Generate pipeline for one file.
fn generate_file(path: &Path, source_roots: &[PathBuf], options: RunOptions) -> FileOutcome {
    let html = match fs::read_to_string(path) {
        Ok(html) => html,
        Err(err) => return FileOutcome::Failed(FileError::from_read(err)),
    };
    let document = parse_document(&html);

    if !options.force {
        let source = freshness::find_source_reference(&document)
            .and_then(|filename| freshness::resolve_source(&filename, source_roots));
        let source_newer = source
            .as_deref()
            .is_some_and(|source| freshness::source_is_newer(source, path));
        if !source_newer && freshness::already_processed(&document) {
            let reason = if source.is_some() {
                SkipReason::UpToDate
            } else {
                SkipReason::AlreadyProcessed
            };
            debug!("{}: skipping ({reason:?})", path.display());
            return FileOutcome::Skipped(reason);
        }
    }

    // Regenerating, so any stale block goes first; inject would remove it
    // anyway, but indexing must not see the old navigation's markup.
    document::remove_navigation(&document);

    let records = headings::index_headings(&document);
    if records.is_empty() {
        return FileOutcome::Skipped(SkipReason::NoHeadings);
    }
    let tally = HeadingTally::count(&records);

    let navigation = nav::build_navigation(&records);
    if !document::inject(&document, &navigation) {
        return FileOutcome::Failed(FileError::Inject);
    }

    if !options.dry_run {
        if let Err(err) = fs::write(path, document::serialize_fragment(&document)) {
            return FileOutcome::Failed(FileError::Write(err.to_string()));
        }
    }
    FileOutcome::Generated { tally }
}

/// Strip pipeline for one file. No freshness check: stripping is explicit
/// and only skips when the document has nothing to remove.
fn strip_file(path: &Path, options: RunOptions) -> FileOutcome {
    let html = match fs::read_to_string(path) {
        Ok(html) => html,
        Err(err) => return FileOutcome::Failed(FileError::from_read(err)),
    };
    let document = parse_document(&html);

    let outcome = document::strip(&document);
    if outcome.is_noop() {
        return FileOutcome::Skipped(SkipReason::NothingToStrip);
    }

    if !options.dry_run {
        if let Err(err) = fs::write(path, document::serialize_fragment(&document)) {
            return FileOutcome::Failed(FileError::Write(err.to_string()));
        }
    }
    FileOutcome::Stripped {
        removed_navigation: outcome.removed_navigation,
        removed_ids: outcome.removed_ids,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const PAGE: &str = "<h1>Guide</h1>\
        <h2>Setup</h2><h3>Install</h3><h3>Configure</h3><h2>Usage</h2>";

    fn write_tree(dir: &TempDir) -> PathBuf {
        let root = dir.path().join("publish");
        fs::create_dir_all(root.join("deep")).unwrap();
        fs::write(root.join("guide.html"), PAGE).unwrap();
        fs::write(root.join("deep/notes.html"), "<h1>N</h1><h2>Only</h2>").unwrap();
        fs::write(root.join("index.html"), "<h1>Shell</h1><h2>Nope</h2>").unwrap();
        fs::write(root.join("plain.txt"), "not html").unwrap();
        root
    }

    #[test]
    fn discovery_is_sorted_and_excludes_the_shell() {
        let dir = TempDir::new().unwrap();
        let root = write_tree(&dir);
        let files = discover_documents(&root);
        assert_eq!(
            files,
            vec![root.join("deep/notes.html"), root.join("guide.html")]
        );
    }

    #[test]
    fn generate_processes_and_writes() {
        let dir = TempDir::new().unwrap();
        let root = write_tree(&dir);
        let report = run(&root, &[], Mode::Generate, RunOptions::default(), None);

        assert_eq!(report.processed(), 2);
        assert_eq!(report.failed(), 0);
        assert!(!report.has_failures());

        let guide = fs::read_to_string(root.join("guide.html")).unwrap();
        assert!(guide.contains("table-of-contents"));
        assert!(guide.contains("id=\"setup\""));
        assert!(guide.contains("href=\"#usage\""));

        // The shell file is untouched.
        let shell = fs::read_to_string(root.join("index.html")).unwrap();
        assert!(!shell.contains("table-of-contents"));
    }

    #[test]
    fn second_run_skips_processed_documents() {
        let dir = TempDir::new().unwrap();
        let root = write_tree(&dir);
        run(&root, &[], Mode::Generate, RunOptions::default(), None);
        let second = run(&root, &[], Mode::Generate, RunOptions::default(), None);

        assert_eq!(second.processed(), 0);
        assert_eq!(second.skipped(), 2);
        for status in &second.statuses {
            assert_eq!(
                status.outcome,
                FileOutcome::Skipped(SkipReason::AlreadyProcessed)
            );
        }
    }

    #[test]
    fn force_reprocesses_and_stays_idempotent() {
        let dir = TempDir::new().unwrap();
        let root = write_tree(&dir);
        run(&root, &[], Mode::Generate, RunOptions::default(), None);
        let forced = run(
            &root,
            &[],
            Mode::Generate,
            RunOptions { force: true, dry_run: false },
            None,
        );
        assert_eq!(forced.processed(), 2);

        let guide = fs::read_to_string(root.join("guide.html")).unwrap();
        assert_eq!(guide.matches("table-of-contents").count(), 1);
    }

    #[test]
    fn strip_round_trips_to_the_original_fragment() {
        let dir = TempDir::new().unwrap();
        let root = write_tree(&dir);
        let baseline = document::serialize_fragment(&parse_document(PAGE));

        run(&root, &[], Mode::Generate, RunOptions::default(), None);
        let report = run(&root, &[], Mode::Strip, RunOptions::default(), None);
        assert_eq!(report.processed(), 2);

        let stripped = fs::read_to_string(root.join("guide.html")).unwrap();
        assert_eq!(stripped, baseline);
    }

    #[test]
    fn strip_on_clean_tree_skips_everything() {
        let dir = TempDir::new().unwrap();
        let root = write_tree(&dir);
        let report = run(&root, &[], Mode::Strip, RunOptions::default(), None);
        assert_eq!(report.processed(), 0);
        assert_eq!(report.skipped(), 2);
        for status in &report.statuses {
            assert_eq!(
                status.outcome,
                FileOutcome::Skipped(SkipReason::NothingToStrip)
            );
        }
    }

    #[test]
    fn dry_run_leaves_files_untouched() {
        let dir = TempDir::new().unwrap();
        let root = write_tree(&dir);
        let before = fs::read_to_string(root.join("guide.html")).unwrap();
        let report = run(
            &root,
            &[],
            Mode::Generate,
            RunOptions { force: false, dry_run: true },
            None,
        );
        assert_eq!(report.processed(), 2);
        assert_eq!(fs::read_to_string(root.join("guide.html")).unwrap(), before);
    }

    #[test]
    fn headingless_documents_are_skipped_not_failed() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("publish");
        fs::create_dir_all(&root).unwrap();
        fs::write(root.join("bare.html"), "<h1>Title</h1><p>No sections.</p>").unwrap();

        let report = run(&root, &[], Mode::Generate, RunOptions::default(), None);
        assert_eq!(report.skipped(), 1);
        assert_eq!(
            report.statuses[0].outcome,
            FileOutcome::Skipped(SkipReason::NoHeadings)
        );
        // Untouched on disk: no ids, no block.
        let bare = fs::read_to_string(root.join("bare.html")).unwrap();
        assert!(!bare.contains("id="));
    }

    #[test]
    fn undecodable_documents_fail_without_aborting_the_batch() {
        let dir = TempDir::new().unwrap();
        let root = write_tree(&dir);
        fs::write(root.join("broken.html"), [0xff, 0xfe, 0x00, 0x01]).unwrap();

        let report = run(&root, &[], Mode::Generate, RunOptions::default(), None);
        assert_eq!(report.failed(), 1);
        assert_eq!(report.processed(), 2);
        assert!(report.has_failures());

        let broken = report
            .statuses
            .iter()
            .find(|s| s.path == Path::new("broken.html"))
            .unwrap();
        assert!(matches!(
            broken.outcome,
            FileOutcome::Failed(FileError::Parse(_))
        ));
    }

    #[test]
    fn newer_source_forces_regeneration() {
        use std::time::{Duration, SystemTime};

        let dir = TempDir::new().unwrap();
        let root = dir.path().join("publish");
        let docs = dir.path().join("docs");
        fs::create_dir_all(&root).unwrap();
        fs::create_dir_all(&docs).unwrap();
        fs::write(
            root.join("setup.html"),
            "<h1>T</h1><p><em>This content was automatically generated from \
             <code>SETUP.md</code>.</em></p><h2>Setup</h2>",
        )
        .unwrap();
        fs::write(docs.join("SETUP.md"), "# T").unwrap();
        let source_roots = vec![docs.clone()];

        let first = run(&root, &source_roots, Mode::Generate, RunOptions::default(), None);
        assert_eq!(first.processed(), 1);

        // Freshly processed and source older: skipped as up-to-date.
        let source = std::fs::File::options()
            .write(true)
            .open(docs.join("SETUP.md"))
            .unwrap();
        source
            .set_modified(SystemTime::now() - Duration::from_secs(3600))
            .unwrap();
        let second = run(&root, &source_roots, Mode::Generate, RunOptions::default(), None);
        assert_eq!(
            second.statuses[0].outcome,
            FileOutcome::Skipped(SkipReason::UpToDate)
        );

        // Source touched after the document: reprocessed despite markers.
        let doc = std::fs::File::options()
            .write(true)
            .open(root.join("setup.html"))
            .unwrap();
        doc.set_modified(SystemTime::now() - Duration::from_secs(7200))
            .unwrap();
        let third = run(&root, &source_roots, Mode::Generate, RunOptions::default(), None);
        assert_eq!(third.processed(), 1);
    }

    #[test]
    fn events_stream_one_status_per_file() {
        let dir = TempDir::new().unwrap();
        let root = write_tree(&dir);
        let (tx, rx) = std::sync::mpsc::channel();
        let report = run(&root, &[], Mode::Generate, RunOptions::default(), Some(tx));

        let mut streamed: Vec<FileStatus> = rx.iter().collect();
        streamed.sort_by(|a, b| a.path.cmp(&b.path));
        assert_eq!(streamed, report.statuses);
    }
}
