//! Report destinations and failure diagnostics

use anyhow::{Context, Result};
use luablocks_core::{FileError, FileFailure};
use std::path::{Path, PathBuf};

/// Write contents to a file atomically (temp file + rename)
pub fn atomic_write(path: &Path, contents: &str) -> Result<()> {
    use std::fs;
    use std::io::Write;

    // Ensure parent directory exists
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory: {}", parent.display()))?;
    }

    let temp_path = temp_path_for(path);

    let mut file = fs::File::create(&temp_path)
        .with_context(|| format!("failed to create temp file: {}", temp_path.display()))?;
    file.write_all(contents.as_bytes())
        .with_context(|| format!("failed to write to temp file: {}", temp_path.display()))?;
    file.sync_all()
        .with_context(|| format!("failed to sync temp file: {}", temp_path.display()))?;
    drop(file);

    fs::rename(&temp_path, path)
        .with_context(|| format!("failed to rename temp file to: {}", path.display()))?;

    Ok(())
}

/// `report.json` -> `report.json.tmp`, next to the target
fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Write a rendered report to `--output` or stdout
pub fn emit(output: Option<&Path>, contents: &str) -> Result<()> {
    match output {
        Some(path) => atomic_write(path, contents),
        None => {
            print!("{}", contents);
            Ok(())
        }
    }
}

/// Human-readable diagnostic for one failed file
///
/// ```text
/// error: src/broken.lua:3: unclosed `function` starting at line 3
///     3 | function broken()
///     4 |   if x then
/// ```
pub fn format_failure(failure: &FileFailure) -> String {
    match &failure.error {
        FileError::Read(err) => format!("error: {}: failed to read file: {}\n", failure.file, err),
        FileError::Structural(err) => {
            let mut out = format!("error: {}:{}: {}\n", failure.file, err.line(), err);
            for excerpt in err.excerpt() {
                out.push_str(&format!("{:>5} | {}\n", excerpt.line, excerpt.text));
            }
            out
        }
    }
}
