//! Reporting and output generation
//!
//! Global invariants enforced:
//! - Deterministic output ordering
//! - Byte-for-byte identical output across runs

use crate::block::BlockRecord;
use serde::{Deserialize, Serialize};

/// Blocks extracted from one file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileReport {
    pub file: String,
    pub blocks: Vec<BlockRecord>,
}

/// One line of JSONL output: a block with its file inlined
#[derive(Debug, Serialize)]
struct BlockLine<'a> {
    file: &'a str,
    #[serde(flatten)]
    block: &'a BlockRecord,
}

/// Summary line for one block:
/// `function <name>, <declaration line>, <end line>, <suggested name>`
pub fn summary_line(block: &BlockRecord) -> String {
    format!(
        "{} {}, {}, {}, {}",
        block.kind,
        block.function_name,
        block.declaration_line,
        block.end_line,
        block.suggested_name.as_deref().unwrap_or("-")
    )
}

/// Render reports as text output
pub fn render_text(reports: &[FileReport]) -> String {
    let mut output = String::new();

    for report in reports {
        output.push_str(&format!("== {}\n", report.file));
        for block in &report.blocks {
            output.push_str(&summary_line(block));
            output.push('\n');
        }
    }

    output
}

/// Render reports as JSON output
pub fn render_json(reports: &[FileReport]) -> String {
    serde_json::to_string_pretty(reports).unwrap_or_else(|_| "[]".to_string())
}

/// Render reports as JSON Lines, one block per line
pub fn render_jsonl(reports: &[FileReport]) -> String {
    let mut output = String::new();
    for report in reports {
        for block in &report.blocks {
            let line = BlockLine {
                file: &report.file,
                block,
            };
            if let Ok(json) = serde_json::to_string(&line) {
                output.push_str(&json);
                output.push('\n');
            }
        }
    }
    output
}
