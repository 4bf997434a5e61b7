//! Block model shared by the resolver, the comment attacher and the renderers
//!
//! Global invariants enforced:
//! - Only `Function` blocks ever leave the resolver as records
//! - `start_line <= declaration_line <= end_line` for every record
//! - Line numbers are 1-indexed

use serde::{Deserialize, Serialize};
use std::fmt;

/// Name used when a function block has no declared name
pub const ANONYMOUS: &str = "anonymous";

/// Keyword-delimited block constructs tracked on the context stack
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockKind {
    Function,
    If,
    For,
    While,
    Repeat,
    Do,
}

/// Keywords that close a block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Terminator {
    End,
    Until,
}

impl BlockKind {
    /// The opening keyword as written in source
    pub fn as_str(&self) -> &'static str {
        match self {
            BlockKind::Function => "function",
            BlockKind::If => "if",
            BlockKind::For => "for",
            BlockKind::While => "while",
            BlockKind::Repeat => "repeat",
            BlockKind::Do => "do",
        }
    }

    /// The only terminator allowed to close this kind of block
    pub fn expected_terminator(&self) -> Terminator {
        match self {
            BlockKind::Repeat => Terminator::Until,
            BlockKind::Function
            | BlockKind::If
            | BlockKind::For
            | BlockKind::While
            | BlockKind::Do => Terminator::End,
        }
    }
}

impl Terminator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Terminator::End => "end",
            Terminator::Until => "until",
        }
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Terminator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What kind of block an open context is, with the names that only
/// function blocks carry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContextKind {
    Function {
        /// Set for `function name(...)` declarations
        declared_name: Option<String>,
        /// Set for declarations and for `name = function` assignments
        suggested_name: Option<String>,
    },
    If,
    For,
    While,
    Repeat,
    Do,
}

impl ContextKind {
    /// An unnamed context of the given kind
    pub fn bare(kind: BlockKind) -> Self {
        match kind {
            BlockKind::Function => ContextKind::Function {
                declared_name: None,
                suggested_name: None,
            },
            BlockKind::If => ContextKind::If,
            BlockKind::For => ContextKind::For,
            BlockKind::While => ContextKind::While,
            BlockKind::Repeat => ContextKind::Repeat,
            BlockKind::Do => ContextKind::Do,
        }
    }

    pub fn block_kind(&self) -> BlockKind {
        match self {
            ContextKind::Function { .. } => BlockKind::Function,
            ContextKind::If => BlockKind::If,
            ContextKind::For => BlockKind::For,
            ContextKind::While => BlockKind::While,
            ContextKind::Repeat => BlockKind::Repeat,
            ContextKind::Do => BlockKind::Do,
        }
    }
}

/// A block whose terminator has not been seen yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenContext {
    pub kind: ContextKind,
    pub start_line: usize,
}

/// A function block as matched by the resolver, before comment widening
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedBlock {
    pub start_line: usize,
    pub end_line: usize,
    pub declared_name: Option<String>,
    pub suggested_name: Option<String>,
}

/// Finalized function block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockRecord {
    #[serde(rename = "block_name")]
    pub kind: BlockKind,
    pub function_name: String,
    /// First line of the block, widened over leading comments
    pub start_line: usize,
    pub end_line: usize,
    /// Line of the `function` keyword
    pub declaration_line: usize,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub suggested_name: Option<String>,
    #[serde(rename = "function_code")]
    pub source_text: String,
}

impl BlockRecord {
    /// Build a record from a resolved block, taking the source text from
    /// `lines` (the original, unsanitized source)
    pub fn from_resolved(block: ResolvedBlock, lines: &[&str]) -> Self {
        let mut record = BlockRecord {
            kind: BlockKind::Function,
            function_name: block
                .declared_name
                .unwrap_or_else(|| ANONYMOUS.to_string()),
            start_line: block.start_line,
            end_line: block.end_line,
            declaration_line: block.start_line,
            suggested_name: block.suggested_name,
            source_text: String::new(),
        };
        record.refresh_source_text(lines);
        record
    }

    /// Re-slice `source_text` from `lines` after the span changed
    pub fn refresh_source_text(&mut self, lines: &[&str]) {
        self.source_text = slice_lines(lines, self.start_line, self.end_line);
    }

    /// Number of lines in the widened span
    pub fn line_count(&self) -> usize {
        self.end_line + 1 - self.start_line
    }
}

/// Join the 1-indexed inclusive line range `start..=end`, clamped to `lines`
pub(crate) fn slice_lines(lines: &[&str], start: usize, end: usize) -> String {
    let from = start.saturating_sub(1).min(lines.len());
    let to = end.min(lines.len()).max(from);
    lines[from..to].join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expected_terminators() {
        assert_eq!(BlockKind::Repeat.expected_terminator(), Terminator::Until);
        for kind in [
            BlockKind::Function,
            BlockKind::If,
            BlockKind::For,
            BlockKind::While,
            BlockKind::Do,
        ] {
            assert_eq!(kind.expected_terminator(), Terminator::End, "{}", kind);
        }
    }

    #[test]
    fn test_bare_context_round_trips_kind() {
        for kind in [
            BlockKind::Function,
            BlockKind::If,
            BlockKind::For,
            BlockKind::While,
            BlockKind::Repeat,
            BlockKind::Do,
        ] {
            assert_eq!(ContextKind::bare(kind).block_kind(), kind);
        }
    }

    #[test]
    fn test_record_defaults_to_anonymous() {
        let lines = vec!["local x = function() end"];
        let record = BlockRecord::from_resolved(
            ResolvedBlock {
                start_line: 1,
                end_line: 1,
                declared_name: None,
                suggested_name: Some("x".to_string()),
            },
            &lines,
        );
        assert_eq!(record.function_name, "anonymous");
        assert_eq!(record.suggested_name.as_deref(), Some("x"));
        assert_eq!(record.source_text, "local x = function() end");
        assert_eq!(record.line_count(), 1);
    }

    #[test]
    fn test_slice_lines_clamps_out_of_range() {
        let lines = vec!["a", "b", "c"];
        assert_eq!(slice_lines(&lines, 2, 3), "b\nc");
        assert_eq!(slice_lines(&lines, 3, 10), "c");
        assert_eq!(slice_lines(&lines, 5, 6), "");
    }

    #[test]
    fn test_serialized_field_names() {
        let lines = vec!["function foo()", "end"];
        let record = BlockRecord::from_resolved(
            ResolvedBlock {
                start_line: 1,
                end_line: 2,
                declared_name: Some("foo".to_string()),
                suggested_name: Some("foo".to_string()),
            },
            &lines,
        );
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["block_name"], "function");
        assert_eq!(value["function_name"], "foo");
        assert_eq!(value["function_code"], "function foo()\nend");
        assert_eq!(value["declaration_line"], 1);
    }
}
