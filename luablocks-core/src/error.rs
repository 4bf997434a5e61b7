//! Error types for block extraction
//!
//! Structural errors are fatal to the parse of one file: no partial list of
//! blocks is ever returned alongside them.

use crate::block::{BlockKind, Terminator};
use thiserror::Error;

/// One numbered source line shown with a diagnostic
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExcerptLine {
    pub line: usize,
    pub text: String,
}

/// Block-balance violations detected by the resolver
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StructuralError {
    #[error("unmatched `{token}` at line {line}")]
    UnmatchedTerminator { token: Terminator, line: usize },

    #[error("`{opener_kind}` starting at line {opener_line} closed by `{found_terminator}` at line {line}")]
    MismatchedBlock {
        opener_kind: BlockKind,
        opener_line: usize,
        found_terminator: Terminator,
        line: usize,
    },

    #[error("unclosed `{opener_kind}` starting at line {opener_line}")]
    UnclosedBlock {
        opener_kind: BlockKind,
        opener_line: usize,
        excerpt: Vec<ExcerptLine>,
    },
}

impl StructuralError {
    /// Line the diagnostic should point at
    pub fn line(&self) -> usize {
        match self {
            StructuralError::UnmatchedTerminator { line, .. } => *line,
            StructuralError::MismatchedBlock { opener_line, .. } => *opener_line,
            StructuralError::UnclosedBlock { opener_line, .. } => *opener_line,
        }
    }

    /// Stable identifier of the error kind, for machine-readable output
    pub fn kind(&self) -> &'static str {
        match self {
            StructuralError::UnmatchedTerminator { .. } => "unmatched_terminator",
            StructuralError::MismatchedBlock { .. } => "mismatched_block",
            StructuralError::UnclosedBlock { .. } => "unclosed_block",
        }
    }

    /// Surrounding source lines, if the error carries any
    pub fn excerpt(&self) -> &[ExcerptLine] {
        match self {
            StructuralError::UnclosedBlock { excerpt, .. } => excerpt,
            _ => &[],
        }
    }
}

/// Why a single file produced no blocks
#[derive(Debug, Error)]
pub enum FileError {
    #[error("failed to read file: {0}")]
    Read(#[from] std::io::Error),

    #[error(transparent)]
    Structural(#[from] StructuralError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = StructuralError::UnmatchedTerminator {
            token: Terminator::End,
            line: 7,
        };
        assert_eq!(err.to_string(), "unmatched `end` at line 7");

        let err = StructuralError::MismatchedBlock {
            opener_kind: BlockKind::Repeat,
            opener_line: 2,
            found_terminator: Terminator::End,
            line: 4,
        };
        assert_eq!(
            err.to_string(),
            "`repeat` starting at line 2 closed by `end` at line 4"
        );
        assert_eq!(err.line(), 2);
        assert_eq!(err.kind(), "mismatched_block");

        let err = StructuralError::UnclosedBlock {
            opener_kind: BlockKind::Function,
            opener_line: 3,
            excerpt: vec![ExcerptLine {
                line: 3,
                text: "function f()".to_string(),
            }],
        };
        assert_eq!(err.to_string(), "unclosed `function` starting at line 3");
        assert_eq!(err.excerpt().len(), 1);
    }

    #[test]
    fn test_file_error_is_transparent_for_structural() {
        let err: FileError = StructuralError::UnmatchedTerminator {
            token: Terminator::Until,
            line: 1,
        }
        .into();
        assert_eq!(err.to_string(), "unmatched `until` at line 1");
    }
}
