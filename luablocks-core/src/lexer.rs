//! Lua tokenizer built on [Logos]
//!
//! [Logos]: https://docs.rs/logos
//!
//! One token enum serves both passes over a file: [`sanitize`] lexes the
//! whole source and blanks the comment tokens, then the resolver runs
//! [`tokenize`] over each sanitized line for words, strings and punctuation.
//!
//! Every byte of the input lands in exactly one token. String literals are
//! escape-aware and never span lines; an unterminated one runs to the end of
//! its line. `--[[` opens a block comment that runs to the next `]]` or to
//! the end of input. Numbers come out as words; they never collide with
//! keywords.
//!
//! [`sanitize`]: crate::sanitize::sanitize

use logos::{Lexer, Logos};

/// Token kinds produced by the Logos lexer
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Horizontal whitespace
    #[regex(r"[^\S\n]+")]
    Whitespace,

    #[token("\n")]
    Newline,

    /// Alphanumeric/underscore run
    #[regex(r"\w+")]
    Word,

    /// Quoted string literal, possibly unterminated at end of line
    #[regex(r#""([^"\\\n]|\\.)*""#)]
    #[regex(r#""([^"\\\n]|\\.)+"#)]
    #[regex(r#"'([^'\\\n]|\\.)*'"#)]
    #[regex(r#"'([^'\\\n]|\\.)+"#)]
    Str,

    /// `--` up to (not including) the end of the line
    #[token("--", line_comment)]
    LineComment,

    /// `--[[ ... ]]`, possibly spanning lines
    #[token("--[[", block_comment)]
    BlockComment,

    /// Any other single character
    #[regex(r"[^\w\s]")]
    Punct,
}

fn line_comment(lex: &mut Lexer<'_, TokenKind>) -> bool {
    let rest = lex.remainder();
    lex.bump(rest.find('\n').unwrap_or(rest.len()));
    true
}

fn block_comment(lex: &mut Lexer<'_, TokenKind>) -> bool {
    let rest = lex.remainder();
    lex.bump(rest.find("]]").map_or(rest.len(), |i| i + 2));
    true
}

impl TokenKind {
    pub fn is_comment(self) -> bool {
        matches!(self, TokenKind::LineComment | TokenKind::BlockComment)
    }

    /// Whitespace, newlines and comments carry no structure
    pub fn is_trivia(self) -> bool {
        matches!(self, TokenKind::Whitespace | TokenKind::Newline) || self.is_comment()
    }
}

/// A lexed token with its kind and text slice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
}

impl<'a> Token<'a> {
    /// Keyword this token spells, if it is a word
    pub fn keyword(&self) -> Option<Keyword> {
        match self.kind {
            TokenKind::Word => Keyword::from_word(self.text),
            _ => None,
        }
    }

    pub fn is_word(&self) -> bool {
        self.kind == TokenKind::Word
    }

    pub fn is_punct(&self, c: char) -> bool {
        self.kind == TokenKind::Punct && self.text.starts_with(c)
    }
}

/// Reserved words that open or close blocks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    Function,
    If,
    For,
    While,
    Repeat,
    Do,
    End,
    Until,
}

impl Keyword {
    pub fn from_word(word: &str) -> Option<Self> {
        match word {
            "function" => Some(Keyword::Function),
            "if" => Some(Keyword::If),
            "for" => Some(Keyword::For),
            "while" => Some(Keyword::While),
            "repeat" => Some(Keyword::Repeat),
            "do" => Some(Keyword::Do),
            "end" => Some(Keyword::End),
            "until" => Some(Keyword::Until),
            _ => None,
        }
    }
}

/// Lex the input into a sequence of tokens, trivia included
///
/// Concatenating the token texts gives back the input.
pub fn lex(input: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut lexer = TokenKind::lexer(input);

    while let Some(result) = lexer.next() {
        // Every character matches some rule; treat anything else as punctuation
        let kind = result.unwrap_or(TokenKind::Punct);
        tokens.push(Token {
            kind,
            text: lexer.slice(),
        });
    }

    tokens
}

/// Split one sanitized line into its structural tokens
///
/// Whitespace and any comment left on the line are dropped.
pub fn tokenize(line: &str) -> Vec<Token<'_>> {
    lex(line)
        .into_iter()
        .filter(|token| !token.kind.is_trivia())
        .collect()
}
