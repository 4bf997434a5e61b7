//! Leading comment attachment
//!
//! Widens each function block upward over the contiguous run of blank and
//! comment lines directly above it, so doc comments travel with the block.
//!
//! Global invariants enforced:
//! - Only `start_line` moves, and only upward
//! - `start_line` never drops below 1
//! - A line that is neither blank nor a comment is never crossed
//! - Applying the attacher twice gives the same result as applying it once

use crate::block::BlockRecord;
use regex::Regex;
use std::sync::OnceLock;

/// `--`, `---`, `-- @param x` and friends
fn comment_line_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^\s*--+\s*@*.*$").expect("comment line pattern is valid")
    })
}

/// Check whether a line is a comment line
pub fn is_comment_line(line: &str) -> bool {
    comment_line_pattern().is_match(line)
}

fn is_attachable(line: &str) -> bool {
    line.trim().is_empty() || is_comment_line(line)
}

/// First line of the attachable run ending right above `start_line`
pub fn widened_start(lines: &[&str], start_line: usize) -> usize {
    let mut start = start_line.min(lines.len() + 1).max(1);
    while start > 1 && is_attachable(lines[start - 2]) {
        start -= 1;
    }
    start
}

/// Widen every block's `start_line` over the comments above it
///
/// `end_line` and everything else on the record is left untouched.
pub fn attach_comments(lines: &[&str], blocks: Vec<BlockRecord>) -> Vec<BlockRecord> {
    blocks
        .into_iter()
        .map(|mut block| {
            block.start_line = widened_start(lines, block.start_line).min(block.start_line);
            block
        })
        .collect()
}
