//! Redacted copies of source
//!
//! Blanks every line covered by an extracted block so what remains is the
//! file's top-level code, still at its original line numbers.

use crate::block::BlockRecord;

/// Replace each line inside any block's `start_line..=end_line` with an
/// empty line; the line count is preserved
pub fn redact(source: &str, blocks: &[BlockRecord]) -> String {
    let mut lines: Vec<&str> = source.lines().collect();

    for block in blocks {
        let from = block.start_line.saturating_sub(1).min(lines.len());
        let to = block.end_line.min(lines.len()).max(from);
        for line in &mut lines[from..to] {
            *line = "";
        }
    }

    let mut output = lines.join("\n");
    if source.ends_with('\n') {
        output.push('\n');
    }
    output
}
