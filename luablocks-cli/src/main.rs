//! luablocks CLI - function block inventory for Lua source

// Global invariants enforced:
// - Deterministic output ordering
// - Identical input yields byte-for-byte identical output
// - Successful reports are emitted even when some files fail

mod logging;
mod output;

use anyhow::Context;
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use luablocks_core::config::{self, ResolvedConfig};
use luablocks_core::{
    extract_path_with_progress, read_source, redact, render_json, render_jsonl, render_text,
    ExtractOptions, Extraction,
};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "luablocks")]
#[command(about = "Inventory Lua function blocks with their line spans and doc comments")]
#[command(version = env!("LUABLOCKS_VERSION"))]
struct Cli {
    /// Enable debug logging on stderr (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract function blocks from a Lua file or directory
    Extract {
        /// Path to a Lua file or a directory to walk
        path: PathBuf,

        /// Output format
        #[arg(long, default_value = "text")]
        format: OutputFormat,

        /// Write the report to this file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,

        /// Write a copy of the source with every block blanked (single file only)
        #[arg(long)]
        redacted: Option<PathBuf>,

        /// Do not widen blocks over leading comments (overrides config file)
        #[arg(long)]
        no_comments: bool,

        /// Lines of source shown with an unclosed-block error (overrides config file)
        #[arg(long, value_parser = clap::value_parser!(u16).range(1..=50))]
        excerpt_lines: Option<u16>,

        /// Path to config file (default: auto-discover)
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Validate or show configuration
    #[command(name = "config")]
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Validate a config file without extracting anything
    Validate {
        /// Path to config file (default: auto-discover from current directory)
        #[arg(long)]
        path: Option<PathBuf>,
    },
    /// Show the resolved configuration (merged defaults + config file)
    Show {
        /// Path to config file (default: auto-discover from current directory)
        #[arg(long)]
        path: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    Text,
    Json,
    Jsonl,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match cli.command {
        Commands::Extract {
            path,
            format,
            output,
            redacted,
            no_comments,
            excerpt_lines,
            config: config_path,
        } => {
            // Normalize path to absolute
            let normalized_path = if path.is_relative() {
                std::env::current_dir()?.join(&path)
            } else {
                path
            };

            if !normalized_path.exists() {
                anyhow::bail!("Path does not exist: {}", normalized_path.display());
            }

            if redacted.is_some() && !normalized_path.is_file() {
                anyhow::bail!("--redacted requires a single file path");
            }

            let project_root = std::env::current_dir()?;
            let resolved_config = config::load_and_resolve(&project_root, config_path.as_deref())
                .context("failed to load configuration")?;

            if let Some(config_path) = &resolved_config.config_path {
                eprintln!("Using config: {}", config_path.display());
            }

            // CLI flags override config file values
            let mut options = resolved_config.extract_options();
            if no_comments {
                options.attach_comments = false;
            }
            if let Some(lines) = excerpt_lines {
                options.excerpt_lines = usize::from(lines);
            }

            let extraction = run_extraction(&normalized_path, &options, &resolved_config)?;

            let rendered = match format {
                OutputFormat::Text => render_text(&extraction.reports),
                OutputFormat::Json => render_json(&extraction.reports),
                OutputFormat::Jsonl => render_jsonl(&extraction.reports),
            };
            output::emit(output.as_deref(), &rendered)?;

            if let (Some(redacted_path), Some(report)) = (&redacted, extraction.reports.first()) {
                let source = read_source(&normalized_path).with_context(|| {
                    format!("failed to read file: {}", normalized_path.display())
                })?;
                output::atomic_write(redacted_path, &redact(&source, &report.blocks))?;
            }

            for failure in &extraction.failures {
                eprint!("{}", output::format_failure(failure));
            }

            if !extraction.is_clean() {
                anyhow::bail!(
                    "{} of {} files failed",
                    extraction.failures.len(),
                    extraction.failures.len() + extraction.reports.len()
                );
            }
        }
        Commands::Config { action } => match action {
            ConfigAction::Validate { path } => {
                let project_root = std::env::current_dir()?;
                let resolved = config::load_and_resolve(&project_root, path.as_deref());

                match resolved {
                    Ok(config) => {
                        if let Some(ref p) = config.config_path {
                            println!("Config valid: {}", p.display());
                        } else {
                            println!("No config file found. Using defaults.");
                        }
                    }
                    Err(e) => {
                        eprintln!("Config validation failed: {:#}", e);
                        std::process::exit(1);
                    }
                }
            }
            ConfigAction::Show { path } => {
                let project_root = std::env::current_dir()?;
                let resolved = config::load_and_resolve(&project_root, path.as_deref())
                    .context("failed to load configuration")?;
                print!("{}", describe_config(&resolved));
            }
        },
    }

    Ok(())
}

/// Extract with a spinner on stderr when walking a directory
fn run_extraction(
    path: &Path,
    options: &ExtractOptions,
    resolved_config: &ResolvedConfig,
) -> anyhow::Result<Extraction> {
    if !path.is_dir() {
        return extract_path_with_progress(path, options, Some(resolved_config), |_| {});
    }

    let progress = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} extracting: {pos} files") {
        progress.set_style(style);
    }

    let extraction =
        extract_path_with_progress(path, options, Some(resolved_config), |_| progress.inc(1));
    progress.finish_and_clear();
    extraction
}

fn describe_config(resolved: &ResolvedConfig) -> String {
    let mut out = String::from("Configuration:\n");
    match &resolved.config_path {
        Some(p) => out.push_str(&format!("  Source: {}\n", p.display())),
        None => out.push_str("  Source: defaults (no config file found)\n"),
    }
    out.push('\n');
    out.push_str("Extraction:\n");
    out.push_str(&format!("  attach_comments: {}\n", resolved.attach_comments));
    out.push_str(&format!("  excerpt_lines: {}\n", resolved.excerpt_lines));
    out.push('\n');
    out.push_str("Filters:\n");
    if resolved.include_patterns.is_empty() {
        out.push_str("  include: (all .lua files)\n");
    } else {
        out.push_str(&format!("  include: {}\n", resolved.include_patterns.join(", ")));
    }
    out.push_str(&format!("  exclude: {}\n", resolved.exclude_patterns.join(", ")));
    out
}
