use clap::{Parser, Subcommand};
use sitetoc::process::{Mode, RunOptions};
use sitetoc::{config, output, process};
use std::path::PathBuf;
use std::process::ExitCode;

/// Shared flags for commands that rewrite content files.
#[derive(clap::Args, Clone, Copy)]
struct RunArgs {
    /// Reprocess every file, ignoring timestamps and existing markup
    #[arg(long)]
    force: bool,

    /// Preview changes without writing to files
    #[arg(long)]
    dry_run: bool,
}

impl From<RunArgs> for RunOptions {
    fn from(args: RunArgs) -> Self {
        RunOptions { force: args.force, dry_run: args.dry_run }
    }
}

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup — trivial, called exactly once
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "sitetoc")]
#[command(about = "Table of contents generator for rendered HTML content files")]
#[command(long_about = "\
Table of contents generator for rendered HTML content files

Scans an environment's build output for *.html content files (index.html
application shells are skipped), assigns unique URL-safe ids to h2/h3/h4
headings, and injects a nested \"Contents\" navigation block right after
each page title. The strip command is the exact inverse: it removes the
block and the heading ids, restoring the pre-processed document.

Already-processed files are skipped unless their generating source (named
in the document's \"automatically generated from\" note and located via the
environment's source_roots) has a newer modification time, or --force is
given. Skips are never failures; the exit status is non-zero only when a
file fails with a read, parse, or write error.

Environments are configured in sitetoc.toml; run 'sitetoc gen-config' for
a documented starting point.")]
#[command(version = version_string())]
struct Cli {
    /// Environment to process, from sitetoc.toml
    #[arg(short, long, default_value = "dev", global = true)]
    environment: String,

    /// Content root to process directly, bypassing sitetoc.toml
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    /// Project root containing sitetoc.toml
    #[arg(long, default_value = ".", global = true)]
    project_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Add heading ids and inject the navigation block
    Generate(RunArgs),
    /// Remove the navigation block and heading ids (inverse operation)
    Strip(RunArgs),
    /// Print a stock sitetoc.toml with all options documented
    GenConfig,
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let (mode, args) = match cli.command {
        Command::Generate(args) => (Mode::Generate, args),
        Command::Strip(args) => (Mode::Strip, args),
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
            return ExitCode::SUCCESS;
        }
    };

    let (root, source_roots) = match resolve_environment(&cli) {
        Ok(resolved) => resolved,
        Err(message) => {
            eprintln!("error: {message}");
            return ExitCode::FAILURE;
        }
    };
    if !root.is_dir() {
        eprintln!(
            "error: content root not found: {} (build the environment first)",
            root.display()
        );
        return ExitCode::FAILURE;
    }

    let options = RunOptions::from(args);
    let file_count = process::discover_documents(&root).len();
    output::print_run_banner(mode, &root, options, file_count);

    // Statuses stream to a printer thread as files complete; the returned
    // report is the deterministic, path-sorted record.
    let (tx, rx) = std::sync::mpsc::channel();
    let printer = std::thread::spawn(move || {
        for status in rx {
            output::print_file_status(&status);
        }
    });
    let report = process::run(&root, &source_roots, mode, options, Some(tx));
    printer.join().unwrap();

    output::print_summary(&report);
    if report.has_failures() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

/// Resolve the content root and source roots for this run.
///
/// `--root` wins outright (no config involved, no timestamp sources);
/// otherwise the named environment from sitetoc.toml supplies both, with
/// its paths taken relative to the project root.
fn resolve_environment(cli: &Cli) -> Result<(PathBuf, Vec<PathBuf>), String> {
    if let Some(root) = &cli.root {
        return Ok((root.clone(), Vec::new()));
    }
    let config = config::load_config(&cli.project_dir).map_err(|e| e.to_string())?;
    let environment = config.environment(&cli.environment).map_err(|e| e.to_string())?;
    let root = cli.project_dir.join(&environment.dir);
    let source_roots = environment
        .source_roots
        .iter()
        .map(|path| cli.project_dir.join(path))
        .collect();
    Ok((root, source_roots))
}
