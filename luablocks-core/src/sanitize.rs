//! Comment removal that keeps line numbers stable
//!
//! Global invariants enforced:
//! - Output has exactly as many lines as input
//! - Comment text is blanked (replaced by spaces), newlines inside block
//!   comments are kept, so every surviving character keeps its line and column
//! - String literals are copied through untouched; `--` inside a string is
//!   not a comment
//! - Never fails: unterminated block comments run to end of input

use crate::lexer::lex;

/// Blank `--` line comments and `--[[ ... ]]` block comments
///
/// Leveled long brackets (`--[==[`) are not recognized as block comments;
/// they degrade to line comments.
pub fn sanitize(source: &str) -> String {
    let mut out = String::with_capacity(source.len());

    for token in lex(source) {
        if token.kind.is_comment() {
            out.extend(
                token
                    .text
                    .chars()
                    .map(|c| if c == '\n' { '\n' } else { ' ' }),
            );
        } else {
            out.push_str(token.text);
        }
    }

    out
}
