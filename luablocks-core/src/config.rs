//! Configuration file support for luablocks
//!
//! Loads project-specific configuration from JSON files.
//!
//! Search order:
//! 1. Explicit path (--config CLI flag)
//! 2. `.luablocksrc.json` in project root
//! 3. `luablocks.config.json` in project root
//! 4. `"luablocks"` key in `.luarc.json`
//!
//! All fields are optional. CLI flags take precedence over config file values.

use crate::resolve::DEFAULT_EXCERPT_LINES;
use crate::ExtractOptions;
use anyhow::{Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default exclude patterns applied when no config is specified
const DEFAULT_EXCLUDES: &[&str] = &["**/.luarocks/**", "**/lua_modules/**", "**/.git/**"];

/// Upper bound for `excerpt_lines`
const MAX_EXCERPT_LINES: usize = 50;

/// luablocks configuration loaded from a JSON config file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LuaBlocksConfig {
    /// Glob patterns for files to include (default: all `.lua` files)
    #[serde(default)]
    pub include: Vec<String>,

    /// Glob patterns for files to exclude (default: vendored rocks and modules)
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Widen blocks over leading comments (default: true)
    #[serde(default)]
    pub attach_comments: Option<bool>,

    /// Lines of source shown with an unclosed-block error (default: 4)
    #[serde(default)]
    pub excerpt_lines: Option<usize>,
}

/// Resolved configuration with compiled glob patterns
#[derive(Debug)]
pub struct ResolvedConfig {
    /// Compiled include patterns (None means include all)
    pub include: Option<GlobSet>,
    /// Compiled exclude patterns
    pub exclude: GlobSet,
    /// Include patterns as written (empty means include all)
    pub include_patterns: Vec<String>,
    /// Effective exclude patterns (the defaults when none were given)
    pub exclude_patterns: Vec<String>,
    pub attach_comments: bool,
    pub excerpt_lines: usize,
    /// Path the config was loaded from (None if defaults)
    pub config_path: Option<PathBuf>,
}

impl LuaBlocksConfig {
    /// Validate the configuration for logical errors
    pub fn validate(&self) -> Result<()> {
        if let Some(lines) = self.excerpt_lines {
            if lines == 0 {
                anyhow::bail!("excerpt_lines must be at least 1 (got {})", lines);
            }
            if lines > MAX_EXCERPT_LINES {
                anyhow::bail!(
                    "excerpt_lines must be at most {} (got {})",
                    MAX_EXCERPT_LINES,
                    lines
                );
            }
        }

        // Validate glob patterns compile
        for pattern in &self.include {
            Glob::new(pattern).with_context(|| format!("invalid include pattern: {}", pattern))?;
        }
        for pattern in &self.exclude {
            Glob::new(pattern).with_context(|| format!("invalid exclude pattern: {}", pattern))?;
        }

        Ok(())
    }

    /// Resolve config into compiled form ready for use
    pub fn resolve(&self) -> Result<ResolvedConfig> {
        self.validate()?;

        let include = if self.include.is_empty() {
            None
        } else {
            let mut builder = GlobSetBuilder::new();
            for pattern in &self.include {
                builder.add(Glob::new(pattern)?);
            }
            Some(builder.build()?)
        };

        // User excludes replace the defaults rather than extending them
        let exclude_patterns: Vec<String> = if self.exclude.is_empty() {
            DEFAULT_EXCLUDES.iter().map(|p| p.to_string()).collect()
        } else {
            self.exclude.clone()
        };
        let exclude = {
            let mut builder = GlobSetBuilder::new();
            for pattern in &exclude_patterns {
                builder.add(Glob::new(pattern)?);
            }
            builder.build()?
        };

        Ok(ResolvedConfig {
            include,
            exclude,
            include_patterns: self.include.clone(),
            exclude_patterns,
            attach_comments: self.attach_comments.unwrap_or(true),
            excerpt_lines: self.excerpt_lines.unwrap_or(DEFAULT_EXCERPT_LINES),
            config_path: None,
        })
    }
}

impl ResolvedConfig {
    /// Check if a file path should be included based on include/exclude patterns
    pub fn should_include(&self, path: &Path) -> bool {
        let path_str = path.to_string_lossy();

        // Check exclude first
        if self.exclude.is_match(path_str.as_ref()) {
            return false;
        }

        // If include patterns exist, file must match at least one
        if let Some(ref include) = self.include {
            return include.is_match(path_str.as_ref());
        }

        true
    }

    /// Extraction options carried by this config
    pub fn extract_options(&self) -> ExtractOptions {
        ExtractOptions {
            attach_comments: self.attach_comments,
            excerpt_lines: self.excerpt_lines,
        }
    }

    /// Build a ResolvedConfig with all defaults (no config file)
    pub fn defaults() -> Result<Self> {
        LuaBlocksConfig::default().resolve()
    }
}

/// Discover and load a config file from the project root
///
/// Search order:
/// 1. `.luablocksrc.json`
/// 2. `luablocks.config.json`
/// 3. `"luablocks"` key in `.luarc.json`
///
/// Returns `None` if no config file is found (use defaults).
pub fn discover_config(project_root: &Path) -> Result<Option<(LuaBlocksConfig, PathBuf)>> {
    // 1. .luablocksrc.json
    let rc_path = project_root.join(".luablocksrc.json");
    if rc_path.exists() {
        let config = load_config_file(&rc_path)?;
        return Ok(Some((config, rc_path)));
    }

    // 2. luablocks.config.json
    let config_path = project_root.join("luablocks.config.json");
    if config_path.exists() {
        let config = load_config_file(&config_path)?;
        return Ok(Some((config, config_path)));
    }

    // 3. .luarc.json "luablocks" key
    let luarc_path = project_root.join(".luarc.json");
    if luarc_path.exists() {
        if let Some(config) = load_from_luarc(&luarc_path)? {
            return Ok(Some((config, luarc_path)));
        }
    }

    Ok(None)
}

/// Load config from an explicit file path
pub fn load_config_file(path: &Path) -> Result<LuaBlocksConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file: {}", path.display()))?;

    let config: LuaBlocksConfig = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse config file: {}", path.display()))?;

    config
        .validate()
        .with_context(|| format!("invalid config in: {}", path.display()))?;

    Ok(config)
}

/// Load luablocks config from the "luablocks" key in .luarc.json
fn load_from_luarc(path: &Path) -> Result<Option<LuaBlocksConfig>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;

    let luarc: serde_json::Value = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse {}", path.display()))?;

    match luarc.get("luablocks") {
        Some(value) => {
            let config: LuaBlocksConfig = serde_json::from_value(value.clone())
                .with_context(|| format!("invalid luablocks config in {}", path.display()))?;
            config
                .validate()
                .with_context(|| format!("invalid luablocks config in {}", path.display()))?;
            Ok(Some(config))
        }
        None => Ok(None),
    }
}

/// Load and resolve config for a project
///
/// If `config_path` is provided, loads from that file.
/// Otherwise, discovers config from the project root.
/// Returns default config if nothing is found.
pub fn load_and_resolve(project_root: &Path, config_path: Option<&Path>) -> Result<ResolvedConfig> {
    let (config, source_path) = if let Some(path) = config_path {
        let config = load_config_file(path)?;
        (config, Some(path.to_path_buf()))
    } else {
        match discover_config(project_root)? {
            Some((config, path)) => (config, Some(path)),
            None => (LuaBlocksConfig::default(), None),
        }
    };

    let mut resolved = config.resolve()?;
    resolved.config_path = source_path;
    Ok(resolved)
}
