use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use patchwright::config::{load_from_path, matches_requirement, ChangeSetConfig};
use patchwright::{FsTextStore, Outcome, OutcomeKind, PatchSession, ProjectGuard, SessionError};
use similar::{ChangeTag, TextDiff};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Parser)]
#[command(name = "patchwright")]
#[command(about = "Idempotent text patching for generated application source", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply change sets to a project
    Apply {
        /// Path to project root (auto-detected if not specified)
        #[arg(short, long)]
        project: Option<PathBuf>,

        /// Specific change-set file to apply (otherwise applies all in changesets/)
        #[arg(short, long)]
        changeset: Option<PathBuf>,

        /// Dry run - evaluate and report without persisting anything
        #[arg(short = 'n', long)]
        dry_run: bool,

        /// Show unified diff of changes
        #[arg(short, long)]
        diff: bool,
    },

    /// Report which changes are applied, pending, or drifted, without writing
    Status {
        /// Path to project root (auto-detected if not specified)
        #[arg(short, long)]
        project: Option<PathBuf>,
    },

    /// List discovered change sets and their metadata
    List {
        /// Path to project root (auto-detected if not specified)
        #[arg(short, long)]
        project: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Apply {
            project,
            changeset,
            dry_run,
            diff,
        } => cmd_apply(project, changeset, dry_run, diff),

        Commands::Status { project } => cmd_status(project),

        Commands::List { project } => cmd_list(project),
    }
}

/// Helper: Discover all .toml change-set files in a changesets/ directory.
///
/// Discovery order:
/// 1. `<project>/changesets` (keeps change sets alongside the target app).
/// 2. `./changesets` relative to the current working directory (typical when
///    running from the patchwright repo).
fn discover_change_sets(project: &Path) -> Result<Vec<PathBuf>> {
    let cwd_dir = env::current_dir().ok().map(|cwd| cwd.join("changesets"));
    let project_dir = project.join("changesets");

    let candidate_dirs: Vec<PathBuf> = std::iter::once(project_dir)
        .chain(cwd_dir.into_iter())
        .collect();

    for dir in candidate_dirs {
        if !dir.exists() {
            continue;
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(&dir).max_depth(1) {
            let entry = entry?;
            if entry.file_type().is_file()
                && entry.path().extension().and_then(|s| s.to_str()) == Some("toml")
            {
                files.push(entry.path().to_path_buf());
            }
        }

        files.sort();

        if !files.is_empty() {
            return Ok(files);
        }
    }

    anyhow::bail!(
        "No .toml change-set files found in either ./changesets or {}/changesets",
        project.display()
    )
}

/// Resolve the project root.
///
/// Priority order:
/// 1. Explicit --project flag
/// 2. PATCHWRIGHT_PROJECT environment variable
/// 3. Walk up from the current directory to the nearest package.json
fn resolve_project(cli_project: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(path) = cli_project {
        return Ok(path.canonicalize()?);
    }

    if let Ok(env_path) = env::var("PATCHWRIGHT_PROJECT") {
        let path = PathBuf::from(&env_path);
        if path.exists() {
            return Ok(path.canonicalize()?);
        }
        eprintln!(
            "{}",
            format!(
                "Warning: PATCHWRIGHT_PROJECT is set but path doesn't exist: {}",
                env_path
            )
            .yellow()
        );
    }

    if let Some(path) = auto_detect_project() {
        println!(
            "{}",
            format!("Auto-detected project: {}", path.display()).dimmed()
        );
        return Ok(path);
    }

    anyhow::bail!(
        "{}\n{}\n  {}\n  {}\n  {}",
        "Could not find a target project.".red(),
        "Try one of:".bold(),
        "1. cd into the app directory: cd /path/to/app && patchwright apply",
        "2. Specify explicitly: patchwright apply --project /path/to/app",
        "3. Set environment variable: export PATCHWRIGHT_PROJECT=/path/to/app"
    )
}

/// Walk up from the current directory looking for a package.json.
fn auto_detect_project() -> Option<PathBuf> {
    let current = env::current_dir().ok()?;

    for ancestor in current.ancestors() {
        if ancestor.join("package.json").exists() {
            return Some(ancestor.to_path_buf());
        }
    }

    None
}

/// Helper: Read the app version from package.json.
fn read_app_version(project: &Path) -> Result<String> {
    let manifest_path = project.join("package.json");
    let manifest = fs::read_to_string(&manifest_path)?;

    let parsed: serde_json::Value = serde_json::from_str(&manifest)
        .map_err(|e| anyhow::anyhow!("failed to parse {}: {e}", manifest_path.display()))?;

    if let Some(version) = parsed.get("version").and_then(|v| v.as_str()) {
        return Ok(version.to_string());
    }

    anyhow::bail!("Could not read version from {}", manifest_path.display())
}

fn app_version_or_default(project: &Path) -> String {
    read_app_version(project).unwrap_or_else(|_| {
        eprintln!(
            "{}",
            "Warning: Could not read app version from package.json, using 0.0.0".yellow()
        );
        "0.0.0".to_string()
    })
}

/// Helper: Show unified diff between original and modified content.
fn display_diff(file: &Path, original: &str, modified: &str) {
    println!(
        "\n{}",
        format!("--- {} (original)", file.display()).dimmed()
    );
    println!("{}", format!("+++ {} (patched)", file.display()).dimmed());

    let diff = TextDiff::from_lines(original, modified);

    for change in diff.iter_all_changes() {
        let sign = match change.tag() {
            ChangeTag::Delete => format!("-{}", change).red(),
            ChangeTag::Insert => format!("+{}", change).green(),
            ChangeTag::Equal => format!(" {}", change).normal(),
        };
        print!("{}", sign);
    }
}

/// One OK/INFO/WARN line per outcome, plus drift diagnostics on misses.
fn report_outcome(outcome: &Outcome) {
    match &outcome.kind {
        OutcomeKind::Applied { replaced } => {
            if *replaced > 1 {
                println!(
                    "{} {} ({} occurrences)",
                    "OK".green().bold(),
                    outcome.summary,
                    replaced
                );
            } else {
                println!("{} {}", "OK".green().bold(), outcome.summary);
            }
        }
        OutcomeKind::AlreadyPresent => {
            println!(
                "{} {} (already present)",
                "INFO".yellow().bold(),
                outcome.summary
            );
        }
        OutcomeKind::AnchorNotFound { hint } => {
            println!(
                "{} {}: anchor not found",
                "WARN".red().bold(),
                outcome.summary
            );
            eprintln!("  Possible causes:");
            eprintln!("    - The target was reformatted or manually edited");
            eprintln!("    - An earlier change this one relies on did not apply");
            if let Some(hint) = hint {
                eprintln!("  Closest line in the document: {}", hint.dimmed());
            }
        }
    }
}

fn cmd_apply(
    project: Option<PathBuf>,
    changeset: Option<PathBuf>,
    dry_run: bool,
    show_diff: bool,
) -> Result<()> {
    let project = resolve_project(project)?;

    let set_files = if let Some(path) = changeset {
        vec![path]
    } else {
        discover_change_sets(&project)?
    };

    let app_version = app_version_or_default(&project);

    println!("Project: {}", project.display());
    println!("Version: {}", app_version);
    println!();

    let guard = ProjectGuard::new(&project)?;
    let session = PatchSession::new(FsTextStore);

    let mut total_applied = 0;
    let mut total_already_present = 0;
    let mut total_missing = 0;
    let mut total_skipped = 0;
    let mut total_fatal = 0;

    for set_file in set_files {
        println!("Loading change set from {}...", set_file.display());

        let config = load_from_path(&set_file)?;
        let label = set_label(&config, &set_file);

        if !matches_requirement(&app_version, config.meta.version_range.as_deref())? {
            let range = config.meta.version_range.as_deref().unwrap_or("");
            println!(
                "{} {}: Skipped (app version {} does not satisfy {})",
                "SKIP".cyan().bold(),
                label,
                app_version,
                range
            );
            total_skipped += config.changes.len();
            println!();
            continue;
        }

        let target = match guard.validate_target(config.target_path(&project)) {
            Ok(path) => path,
            Err(e) => {
                eprintln!("{} {}: {}", "ERROR".red().bold(), label, e);
                total_fatal += 1;
                println!();
                continue;
            }
        };

        let specs = config.to_specs();

        if dry_run {
            println!("{}", "  [DRY RUN - nothing will be written]".cyan());
            match session.preview(&target, &specs) {
                Ok(output) => {
                    for outcome in output.report.outcomes() {
                        report_outcome(outcome);
                    }
                    if show_diff {
                        if let Ok(before) = fs::read_to_string(&target) {
                            if before != output.final_text {
                                display_diff(&target, &before, &output.final_text);
                            }
                        }
                    }
                    total_applied += output.report.applied();
                    total_already_present += output.report.already_present();
                    total_missing += output.report.missing();
                    println!(
                        "\nDone! {} changes would be applied to {}",
                        output.report.applied(),
                        target.display()
                    );
                }
                Err(e) => {
                    eprintln!("{} {}: {}", "ERROR".red().bold(), label, e);
                    total_fatal += 1;
                }
            }
            println!();
            continue;
        }

        let before = if show_diff {
            fs::read_to_string(&target).ok()
        } else {
            None
        };

        match session.run(&target, &specs) {
            Ok(report) => {
                for outcome in report.outcomes() {
                    report_outcome(outcome);
                }
                if let Some(before) = before {
                    if let Ok(after) = fs::read_to_string(&target) {
                        if before != after {
                            display_diff(&target, &before, &after);
                        }
                    }
                }
                total_applied += report.applied();
                total_already_present += report.already_present();
                total_missing += report.missing();
                println!(
                    "\nDone! {} changes applied to {}",
                    report.applied(),
                    target.display()
                );
            }
            Err(SessionError::Persistence {
                target,
                rendered,
                report,
                source,
            }) => {
                eprintln!(
                    "{} {}: cannot persist {}: {}",
                    "ERROR".red().bold(),
                    label,
                    target.display(),
                    source
                );
                eprintln!(
                    "  {} changes had been applied in memory ({} bytes); the target was left unmodified",
                    report.applied(),
                    rendered.len()
                );
                total_fatal += 1;
            }
            Err(e @ SessionError::Source { .. }) => {
                eprintln!("{} {}: {}", "ERROR".red().bold(), label, e);
                total_fatal += 1;
            }
        }

        println!();
    }

    println!("{}", "Summary:".bold());
    println!("  {} applied", format!("{}", total_applied).green());
    println!(
        "  {} already present",
        format!("{}", total_already_present).yellow()
    );
    println!("  {} anchors not found", format!("{}", total_missing).red());
    println!("  {} skipped", format!("{}", total_skipped).cyan());

    // Partial success is a valid terminal state: anchor misses are WARN
    // lines, never a failed exit.
    if total_fatal > 0 {
        std::process::exit(1);
    }

    Ok(())
}

fn cmd_status(project: Option<PathBuf>) -> Result<()> {
    let project = resolve_project(project)?;
    let set_files = discover_change_sets(&project)?;
    let app_version = app_version_or_default(&project);

    println!("{}", "Change Set Status Report".bold());
    println!("Project: {}", project.display());
    println!("Version: {}", app_version);
    println!();

    let guard = ProjectGuard::new(&project)?;
    let session = PatchSession::new(FsTextStore);

    let mut pending = Vec::new();
    let mut applied = Vec::new();
    let mut drifted = Vec::new();
    let mut skipped = Vec::new();

    for set_file in set_files {
        let config = load_from_path(&set_file)?;
        let label = set_label(&config, &set_file);

        if !matches_requirement(&app_version, config.meta.version_range.as_deref())? {
            for change in &config.changes {
                skipped.push(format!("{label}/{}", change.id));
            }
            continue;
        }

        let target = guard.validate_target(config.target_path(&project))?;
        let output = session.preview(&target, &config.to_specs())?;

        for outcome in output.report.outcomes() {
            let entry = format!("{label}/{}", outcome.id);
            match outcome.kind {
                OutcomeKind::Applied { .. } => pending.push(entry),
                OutcomeKind::AlreadyPresent => applied.push(entry),
                OutcomeKind::AnchorNotFound { .. } => drifted.push(entry),
            }
        }
    }

    let groups: [(&str, &Vec<String>, fn(&str) -> colored::ColoredString); 4] = [
        ("APPLIED", &applied, |s| s.green()),
        ("PENDING", &pending, |s| s.yellow()),
        ("DRIFTED", &drifted, |s| s.red()),
        ("SKIPPED", &skipped, |s| s.cyan()),
    ];

    for (title, entries, paint) in groups {
        if entries.is_empty() {
            continue;
        }
        println!("{} ({} changes)", paint(title).bold(), entries.len());
        for entry in entries {
            println!("  - {}", entry);
        }
        println!();
    }

    Ok(())
}

fn cmd_list(project: Option<PathBuf>) -> Result<()> {
    let project = resolve_project(project)?;
    let set_files = discover_change_sets(&project)?;

    println!("{}", "Available change sets:".bold());

    for set_file in set_files {
        match load_from_path(&set_file) {
            Ok(config) => {
                let label = set_label(&config, &set_file);
                println!(
                    "  {} — {} changes, target {}{}",
                    label.bold(),
                    config.changes.len(),
                    config.meta.file,
                    config
                        .meta
                        .version_range
                        .as_deref()
                        .map(|r| format!(" (versions {r})"))
                        .unwrap_or_default()
                );
                if let Some(description) = &config.meta.description {
                    println!("    {}", description.dimmed());
                }
            }
            Err(e) => {
                eprintln!("  {} — {}", set_file.display(), e.to_string().red());
            }
        }
    }

    Ok(())
}

fn set_label(config: &ChangeSetConfig, set_file: &Path) -> String {
    if config.meta.name.is_empty() {
        set_file
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("change-set")
            .to_string()
    } else {
        config.meta.name.clone()
    }
}
