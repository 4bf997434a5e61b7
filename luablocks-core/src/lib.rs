//! luablocks core library - function block inventory for Lua source

// Global invariants enforced in this crate:
// - Extraction is strictly per-file; files never influence each other
// - No global mutable state
// - Deterministic output order: files by path, blocks by closing line
// - Comments and string literals never affect block structure
// - Identical input yields byte-for-byte identical output

pub mod block;
pub mod comments;
pub mod config;
pub mod error;
pub mod lexer;
pub mod redact;
pub mod report;
pub mod resolve;
pub mod sanitize;

pub use block::{BlockKind, BlockRecord, Terminator, ANONYMOUS};
pub use config::ResolvedConfig;
pub use error::{FileError, StructuralError};
pub use redact::redact;
pub use report::{render_json, render_jsonl, render_text, FileReport};

use anyhow::{Context, Result};
use rayon::prelude::*;
use std::path::{Path, PathBuf};

/// Knobs for a single extraction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractOptions {
    /// Widen blocks over the comment lines directly above them
    pub attach_comments: bool,
    /// Source lines shown with an unclosed-block error
    pub excerpt_lines: usize,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        ExtractOptions {
            attach_comments: true,
            excerpt_lines: resolve::DEFAULT_EXCERPT_LINES,
        }
    }
}

/// Extract every function block from Lua source with default options
pub fn extract(source: &str) -> Result<Vec<BlockRecord>, StructuralError> {
    extract_with_options(source, &ExtractOptions::default())
}

/// Extract every function block from Lua source
///
/// Runs sanitize -> resolve -> attach comments. Record source text is taken
/// from the original lines, so comments stay visible in `source_text`.
pub fn extract_with_options(
    source: &str,
    options: &ExtractOptions,
) -> Result<Vec<BlockRecord>, StructuralError> {
    let sanitized = sanitize::sanitize(source);
    let resolved = resolve::resolve_with_excerpt(&sanitized, options.excerpt_lines)?;

    let original: Vec<&str> = source.lines().collect();
    let records: Vec<BlockRecord> = resolved
        .into_iter()
        .map(|block| BlockRecord::from_resolved(block, &original))
        .collect();

    if !options.attach_comments {
        return Ok(records);
    }

    let sanitized_lines: Vec<&str> = sanitized.lines().collect();
    let mut records = comments::attach_comments(&sanitized_lines, records);
    for record in &mut records {
        record.refresh_source_text(&original);
    }
    Ok(records)
}

/// Read a file and extract its blocks
///
/// `\r\n` line endings are normalized before extraction.
pub fn extract_file(path: &Path, options: &ExtractOptions) -> Result<Vec<BlockRecord>, FileError> {
    let source = read_source(path)?;
    Ok(extract_with_options(&source, options)?)
}

/// Read a source file with line endings normalized to `\n`
pub fn read_source(path: &Path) -> std::io::Result<String> {
    let raw = std::fs::read_to_string(path)?;
    Ok(if raw.contains('\r') {
        raw.replace("\r\n", "\n")
    } else {
        raw
    })
}

/// A file whose extraction failed
#[derive(Debug)]
pub struct FileFailure {
    pub file: String,
    pub error: FileError,
}

/// Result of extracting a file or directory
#[derive(Debug, Default)]
pub struct Extraction {
    /// Successful files, sorted by path
    pub reports: Vec<FileReport>,
    /// Failed files, sorted by path
    pub failures: Vec<FileFailure>,
}

impl Extraction {
    pub fn block_count(&self) -> usize {
        self.reports.iter().map(|r| r.blocks.len()).sum()
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Extract blocks from a file or every Lua file under a directory
pub fn extract_path(
    path: &Path,
    options: &ExtractOptions,
    resolved_config: Option<&ResolvedConfig>,
) -> Result<Extraction> {
    extract_path_with_progress(path, options, resolved_config, |_| {})
}

/// Like [`extract_path`], calling `on_file` after each file is processed
///
/// Files are extracted in parallel; `on_file` may be called from any thread
/// and in any order, but the returned [`Extraction`] is always sorted.
pub fn extract_path_with_progress<F>(
    path: &Path,
    options: &ExtractOptions,
    resolved_config: Option<&ResolvedConfig>,
    on_file: F,
) -> Result<Extraction>
where
    F: Fn(&Path) + Sync,
{
    // Include/exclude globs match paths relative to the walked directory;
    // an explicitly named file is never filtered
    let walking_dir = path.is_dir();
    let source_files: Vec<PathBuf> = collect_source_files(path)?
        .into_iter()
        .filter(|file| match resolved_config {
            Some(config) if walking_dir => {
                config.should_include(file.strip_prefix(path).unwrap_or(file))
            }
            _ => true,
        })
        .collect();

    tracing::debug!(files = source_files.len(), path = %path.display(), "extracting");

    // par_iter preserves input order on collect
    let results: Vec<(String, Result<Vec<BlockRecord>, FileError>)> = source_files
        .par_iter()
        .map(|file| {
            let result = extract_file(file, options);
            on_file(file.as_path());
            (file.to_string_lossy().to_string(), result)
        })
        .collect();

    let mut extraction = Extraction::default();
    for (file, result) in results {
        match result {
            Ok(blocks) => {
                tracing::debug!(file = %file, blocks = blocks.len(), "extracted");
                extraction.reports.push(FileReport { file, blocks });
            }
            Err(error) => {
                tracing::warn!(file = %file, error = %error, "extraction failed");
                extraction.failures.push(FileFailure { file, error });
            }
        }
    }

    Ok(extraction)
}

/// Check if a file is a Lua source file
fn is_supported_source_file(filename: &str) -> bool {
    Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("lua"))
}

/// Collect Lua files from a path (file or directory)
///
/// An explicitly named file is always taken, whatever its extension.
/// Directories are walked recursively for `.lua` files.
pub fn collect_source_files(path: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    if path.is_file() {
        files.push(path.to_path_buf());
    } else if path.is_dir() {
        collect_source_files_recursive(path, &mut files)?;
    } else {
        anyhow::bail!("Path does not exist: {}", path.display());
    }

    // Sort files for deterministic order
    files.sort();

    Ok(files)
}

/// Returns true for directory names that should not be traversed
fn is_skipped_dir(name: &str) -> bool {
    name.starts_with('.') || name == "lua_modules" || name == "node_modules" || name == "target"
}

/// Process one directory entry, pushing source files or recursing into dirs
fn process_dir_entry(
    path: PathBuf,
    metadata: std::fs::Metadata,
    files: &mut Vec<PathBuf>,
) -> Result<()> {
    use std::ffi::OsStr;

    if metadata.is_symlink() {
        return Ok(());
    }

    if metadata.is_dir() {
        if let Some(name) = path.file_name().and_then(|n: &OsStr| n.to_str()) {
            if is_skipped_dir(name) {
                return Ok(());
            }
        }
        collect_source_files_recursive(&path, files)?;
    } else if metadata.is_file() {
        if let Some(filename) = path.file_name().and_then(|n: &OsStr| n.to_str()) {
            if is_supported_source_file(filename) {
                files.push(path);
            }
        }
    }

    Ok(())
}

/// Recursively collect Lua files from a directory
fn collect_source_files_recursive(dir: &Path, files: &mut Vec<PathBuf>) -> Result<()> {
    for entry_result in std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read directory: {}", dir.display()))?
    {
        let entry = entry_result?;
        let path = entry.path();
        let metadata = std::fs::symlink_metadata(&path)
            .with_context(|| format!("Failed to read metadata: {}", path.display()))?;
        process_dir_entry(path, metadata, files)?;
    }

    Ok(())
}
