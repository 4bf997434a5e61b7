//! Stack-based block matching over sanitized Lua source
//!
//! Global invariants enforced:
//! - Single pass, one line at a time, no lookahead across lines
//! - String literal contents never open or close blocks
//! - The context stack is empty when resolution succeeds
//! - Function blocks are emitted in the order their `end` is reached

use crate::block::{BlockKind, ContextKind, OpenContext, ResolvedBlock, Terminator};
use crate::error::{ExcerptLine, StructuralError};
use crate::lexer::{tokenize, Keyword, Token};

/// Lines of context attached to an unclosed-block error by default
pub const DEFAULT_EXCERPT_LINES: usize = 4;

/// Words that can never be a function's name
const RESERVED: &[&str] = &[
    "and", "break", "do", "else", "elseif", "end", "false", "for", "function", "goto", "if", "in",
    "local", "nil", "not", "or", "repeat", "return", "then", "true", "until", "while",
];

/// Resolve function blocks in sanitized source
pub fn resolve(sanitized: &str) -> Result<Vec<ResolvedBlock>, StructuralError> {
    resolve_with_excerpt(sanitized, DEFAULT_EXCERPT_LINES)
}

/// Resolve function blocks, attaching `excerpt_lines` lines of source to an
/// unclosed-block error
pub fn resolve_with_excerpt(
    sanitized: &str,
    excerpt_lines: usize,
) -> Result<Vec<ResolvedBlock>, StructuralError> {
    let lines: Vec<&str> = sanitized.lines().collect();
    let mut state = ScanState::new();
    for (index, line) in lines.iter().enumerate() {
        state.scan_line(index + 1, line)?;
    }
    state.finish(&lines, excerpt_lines)
}

/// State of one resolution pass
#[derive(Debug, Default)]
pub struct ScanState {
    stack: Vec<OpenContext>,
    /// Most recent opener or terminator keyword, across lines
    last_keyword: Option<Keyword>,
    blocks: Vec<ResolvedBlock>,
}

impl ScanState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of currently open blocks
    #[cfg(test)]
    fn depth(&self) -> usize {
        self.stack.len()
    }

    #[cfg(test)]
    fn last_keyword(&self) -> Option<Keyword> {
        self.last_keyword
    }

    /// Function blocks completed so far
    #[cfg(test)]
    fn blocks(&self) -> &[ResolvedBlock] {
        &self.blocks
    }

    /// Feed one sanitized line (1-indexed `line_no`)
    pub fn scan_line(&mut self, line_no: usize, line: &str) -> Result<(), StructuralError> {
        let tokens = tokenize(line);
        let mut named = capture_function_name(&tokens);

        for (index, token) in tokens.iter().enumerate() {
            let Some(keyword) = token.keyword() else {
                continue;
            };
            let previous = self.last_keyword.replace(keyword);

            match keyword {
                // `for ... do` and `while ... do` continue the loop header
                Keyword::Do if matches!(previous, Some(Keyword::For | Keyword::While)) => {}
                Keyword::End => self.close(Terminator::End, line_no)?,
                Keyword::Until => self.close(Terminator::Until, line_no)?,
                Keyword::Function => {
                    let kind = match named.take() {
                        Some(capture) if capture.keyword_index == index => capture.kind,
                        other => {
                            named = other;
                            ContextKind::bare(BlockKind::Function)
                        }
                    };
                    self.open(kind, line_no);
                }
                Keyword::If => self.open(ContextKind::If, line_no),
                Keyword::For => self.open(ContextKind::For, line_no),
                Keyword::While => self.open(ContextKind::While, line_no),
                Keyword::Repeat => self.open(ContextKind::Repeat, line_no),
                Keyword::Do => self.open(ContextKind::Do, line_no),
            }
        }

        Ok(())
    }

    /// Finish the pass; fails if any block is still open
    pub fn finish(
        self,
        lines: &[&str],
        excerpt_lines: usize,
    ) -> Result<Vec<ResolvedBlock>, StructuralError> {
        if let Some(innermost) = self.stack.last() {
            return Err(StructuralError::UnclosedBlock {
                opener_kind: innermost.kind.block_kind(),
                opener_line: innermost.start_line,
                excerpt: excerpt(lines, innermost.start_line, excerpt_lines),
            });
        }
        Ok(self.blocks)
    }

    fn open(&mut self, kind: ContextKind, line_no: usize) {
        self.stack.push(OpenContext {
            kind,
            start_line: line_no,
        });
    }

    fn close(&mut self, found: Terminator, line_no: usize) -> Result<(), StructuralError> {
        let context = self
            .stack
            .pop()
            .ok_or(StructuralError::UnmatchedTerminator {
                token: found,
                line: line_no,
            })?;

        let opener_kind = context.kind.block_kind();
        if opener_kind.expected_terminator() != found {
            return Err(StructuralError::MismatchedBlock {
                opener_kind,
                opener_line: context.start_line,
                found_terminator: found,
                line: line_no,
            });
        }

        if let ContextKind::Function {
            declared_name,
            suggested_name,
        } = context.kind
        {
            tracing::trace!(
                start = context.start_line,
                end = line_no,
                name = declared_name.as_deref().unwrap_or(crate::block::ANONYMOUS),
                "function block closed"
            );
            self.blocks.push(ResolvedBlock {
                start_line: context.start_line,
                end_line: line_no,
                declared_name,
                suggested_name,
            });
        }
        Ok(())
    }
}

/// A function definition recognized by shape at the start of a line
#[derive(Debug, Clone, PartialEq, Eq)]
struct NamedFunction {
    kind: ContextKind,
    /// Index of the `function` keyword token the shape consumed
    keyword_index: usize,
}

/// Assignment shape first, then declaration shape; first match wins
fn capture_function_name(tokens: &[Token<'_>]) -> Option<NamedFunction> {
    capture_assignment(tokens).or_else(|| capture_declaration(tokens))
}

/// `[local] name = function`
fn capture_assignment(tokens: &[Token<'_>]) -> Option<NamedFunction> {
    let start = skip_local(tokens);
    let (name, next) = qualified_name(tokens, start)?;
    if !tokens.get(next)?.is_punct('=') {
        return None;
    }
    let keyword_index = next + 1;
    if tokens.get(keyword_index)?.keyword() != Some(Keyword::Function) {
        return None;
    }
    Some(NamedFunction {
        kind: ContextKind::Function {
            declared_name: None,
            suggested_name: Some(name),
        },
        keyword_index,
    })
}

/// `[local] function name`, where name may be qualified with `.` or `:`
fn capture_declaration(tokens: &[Token<'_>]) -> Option<NamedFunction> {
    let keyword_index = skip_local(tokens);
    if tokens.get(keyword_index)?.keyword() != Some(Keyword::Function) {
        return None;
    }
    let (name, _) = qualified_name(tokens, keyword_index + 1)?;
    Some(NamedFunction {
        kind: ContextKind::Function {
            declared_name: Some(name.clone()),
            suggested_name: Some(name),
        },
        keyword_index,
    })
}

fn skip_local(tokens: &[Token<'_>]) -> usize {
    match tokens.first() {
        Some(token) if token.is_word() && token.text == "local" => 1,
        _ => 0,
    }
}

fn is_identifier(token: &Token<'_>) -> bool {
    token.is_word()
        && !RESERVED.contains(&token.text)
        && !token.text.starts_with(|c: char| c.is_ascii_digit())
}

/// Read `ident ([.:] ident)*` starting at `start`; returns the name and the
/// index of the first token after it
fn qualified_name(tokens: &[Token<'_>], start: usize) -> Option<(String, usize)> {
    let first = tokens.get(start).filter(|t| is_identifier(t))?;
    let mut name = first.text.to_string();
    let mut next = start + 1;

    while let (Some(sep), Some(part)) = (tokens.get(next), tokens.get(next + 1)) {
        if !(sep.is_punct('.') || sep.is_punct(':')) || !is_identifier(part) {
            break;
        }
        name.push_str(sep.text);
        name.push_str(part.text);
        next += 2;
    }

    Some((name, next))
}

fn excerpt(lines: &[&str], start_line: usize, count: usize) -> Vec<ExcerptLine> {
    lines
        .iter()
        .enumerate()
        .skip(start_line.saturating_sub(1))
        .take(count)
        .map(|(index, text)| ExcerptLine {
            line: index + 1,
            text: text.trim_end().to_string(),
        })
        .collect()
}

#[cfg(test)]
#[path = "resolve/tests.rs"]
mod tests;
