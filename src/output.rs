//! CLI output formatting for batch runs.
//!
//! Each concern has a `format_*` function returning `Vec<String>` (or a
//! single line) for testability, and a `print_*` wrapper that writes to
//! stdout. Format functions are pure, no I/O and no side effects.
//!
//! # Output Format
//!
//! ```text
//! ==> Generating table of contents: publish/dev
//!     Found 3 content files
//!   + guide.html: TOC added (2 h2, 2 h3)
//!   - setup/notes.html: skipped (up-to-date)
//!   ! broken.html: error: not parseable as text: ...
//!
//! 1 processed, 1 skipped, 1 failed
//! ```
//!
//! Line markers: `+` changed, `-` skipped, `!` failed. Skips always carry
//! their reason so "nothing to do" reads differently from "something went
//! wrong".

use std::path::Path;

use crate::headings::HeadingTally;
use crate::process::{FileOutcome, FileStatus, Mode, RunOptions, RunReport, SkipReason};

/// Format the run banner printed before per-file statuses.
pub fn format_run_banner(
    mode: Mode,
    root: &Path,
    options: RunOptions,
    file_count: usize,
) -> Vec<String> {
    let verb = match mode {
        Mode::Generate => "Generating table of contents",
        Mode::Strip => "Stripping table of contents",
    };
    let mut lines = vec![format!("==> {}: {}", verb, root.display())];
    if options.dry_run {
        lines.push("    Dry run: no files will be modified".to_string());
    }
    if options.force {
        lines.push("    Force: reprocessing all files".to_string());
    }
    lines.push(match file_count {
        0 => "    No content files found".to_string(),
        1 => "    Found 1 content file".to_string(),
        n => format!("    Found {n} content files"),
    });
    lines
}

/// Format one per-file status line.
pub fn format_file_status(status: &FileStatus) -> String {
    let path = status.path.display();
    match &status.outcome {
        FileOutcome::Generated { tally } => {
            format!("  + {}: TOC added ({})", path, format_tally(*tally))
        }
        FileOutcome::Stripped { removed_navigation, removed_ids } => {
            let mut changes = Vec::new();
            if *removed_navigation {
                changes.push("TOC removed".to_string());
            }
            if *removed_ids > 0 {
                changes.push(format!("{removed_ids} IDs removed"));
            }
            format!("  + {}: {}", path, changes.join(", "))
        }
        FileOutcome::Skipped(reason) => {
            format!("  - {}: skipped ({})", path, skip_reason(*reason))
        }
        FileOutcome::Failed(error) => format!("  ! {}: error: {}", path, error),
    }
}

/// Format the end-of-run summary.
pub fn format_summary(report: &RunReport) -> Vec<String> {
    vec![
        String::new(),
        format!(
            "{} processed, {} skipped, {} failed",
            report.processed(),
            report.skipped(),
            report.failed()
        ),
    ]
}

/// Per-level heading counts with zero levels omitted: `"2 h2, 1 h4"`.
fn format_tally(tally: HeadingTally) -> String {
    let mut parts = Vec::new();
    if tally.h2 > 0 {
        parts.push(format!("{} h2", tally.h2));
    }
    if tally.h3 > 0 {
        parts.push(format!("{} h3", tally.h3));
    }
    if tally.h4 > 0 {
        parts.push(format!("{} h4", tally.h4));
    }
    parts.join(", ")
}

fn skip_reason(reason: SkipReason) -> &'static str {
    match reason {
        SkipReason::UpToDate => "up-to-date",
        SkipReason::AlreadyProcessed => "already processed, use --force to regenerate",
        SkipReason::NoHeadings => "no h2/h3/h4 headings",
        SkipReason::NothingToStrip => "no TOC or IDs found",
    }
}

/// Print the run banner to stdout.
pub fn print_run_banner(mode: Mode, root: &Path, options: RunOptions, file_count: usize) {
    for line in format_run_banner(mode, root, options, file_count) {
        println!("{}", line);
    }
}

/// Print one per-file status line to stdout.
pub fn print_file_status(status: &FileStatus) {
    println!("{}", format_file_status(status));
}

/// Print the end-of-run summary to stdout.
pub fn print_summary(report: &RunReport) {
    for line in format_summary(report) {
        println!("{}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::FileError;
    use std::path::PathBuf;

    fn status(outcome: FileOutcome) -> FileStatus {
        FileStatus { path: PathBuf::from("guide.html"), outcome }
    }

    #[test]
    fn generated_line_shows_the_tally() {
        let line = format_file_status(&status(FileOutcome::Generated {
            tally: HeadingTally { h2: 2, h3: 1, h4: 0 },
        }));
        assert_eq!(line, "  + guide.html: TOC added (2 h2, 1 h3)");
    }

    #[test]
    fn stripped_line_lists_changes() {
        let line = format_file_status(&status(FileOutcome::Stripped {
            removed_navigation: true,
            removed_ids: 4,
        }));
        assert_eq!(line, "  + guide.html: TOC removed, 4 IDs removed");

        let ids_only = format_file_status(&status(FileOutcome::Stripped {
            removed_navigation: false,
            removed_ids: 2,
        }));
        assert_eq!(ids_only, "  + guide.html: 2 IDs removed");
    }

    #[test]
    fn skip_lines_carry_their_reason() {
        let line = format_file_status(&status(FileOutcome::Skipped(SkipReason::UpToDate)));
        assert_eq!(line, "  - guide.html: skipped (up-to-date)");

        let line =
            format_file_status(&status(FileOutcome::Skipped(SkipReason::NothingToStrip)));
        assert_eq!(line, "  - guide.html: skipped (no TOC or IDs found)");
    }

    #[test]
    fn failed_line_shows_the_error() {
        let line = format_file_status(&status(FileOutcome::Failed(FileError::Inject)));
        assert_eq!(
            line,
            "  ! guide.html: error: no valid insertion point for the navigation block"
        );
    }

    #[test]
    fn banner_reflects_mode_and_flags() {
        let lines = format_run_banner(
            Mode::Strip,
            Path::new("publish/dev"),
            RunOptions { force: true, dry_run: true },
            3,
        );
        assert_eq!(lines[0], "==> Stripping table of contents: publish/dev");
        assert!(lines.iter().any(|l| l.contains("Dry run")));
        assert!(lines.iter().any(|l| l.contains("Force")));
        assert_eq!(lines.last().unwrap(), "    Found 3 content files");
    }

    #[test]
    fn summary_counts_by_kind() {
        let report = RunReport {
            statuses: vec![
                status(FileOutcome::Generated { tally: HeadingTally::default() }),
                status(FileOutcome::Skipped(SkipReason::NoHeadings)),
                status(FileOutcome::Failed(FileError::Inject)),
            ],
        };
        let lines = format_summary(&report);
        assert_eq!(lines[1], "1 processed, 1 skipped, 1 failed");
    }
}
