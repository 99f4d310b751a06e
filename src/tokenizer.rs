//! The lexical layer: splits a WebIDL source slice into a lossless [Token] stream and
//! wraps that stream with the peek/consume/mark/restore cursor the production layer
//! drives.
use crate::token::{Token, TokenKind};
use once_cell::sync::Lazy;
use regex::Regex;

static IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[_-]?[A-Za-z][0-9A-Za-z_-]*").unwrap());
static FLOAT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(-?(Infinity))|(^NaN)|^(-?(\d+\.\d*|\.\d+)([Ee][+-]?\d+)?|\d+[Ee][+-]?\d+)")
        .unwrap()
});
static INTEGER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^-?(0[Xx][0-9A-Fa-f]+|0[0-7]*|[1-9][0-9]*)").unwrap());
static STRING: Lazy<Regex> = Lazy::new(|| Regex::new("^\"[^\"]*\"").unwrap());
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[ \t\r\n]+").unwrap());
static LINE_COMMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^//[^\n]*").unwrap());

/// Punctuators recognized by the tokenizer, longest first so greedy matching picks the
/// longest member of the set (e.g. `...` before `.`, which WebIDL doesn't otherwise use,
/// kept anyway for forward compatibility with the ellipsis-adjacent grammar).
const SYMBOLS: &[&str] = &[
    "...", "=>", "(", ")", "[", "]", "{", "}", ",", ";", ":", "?", "=", "<", ">",
];

/// Tokenize `text`, returning offsets relative to the start of `text` itself (the caller
/// — [`Parser::parse`](crate::Parser::parse) — shifts them into the shared source buffer).
/// Deterministic, single-pass and lossless: every byte of `text` lands in exactly one
/// token, with `unknown` as the catch-all for bytes matching no rule.
pub fn tokenize(text: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut pos = 0usize;
    let len = text.len();

    while pos < len {
        let rest = &text[pos..];

        if let Some(m) = WHITESPACE.find(rest) {
            tokens.push(Token::new(TokenKind::Whitespace, pos, pos + m.end()));
            pos += m.end();
            continue;
        }
        if rest.starts_with("/*") {
            let end = rest[2..].find("*/").map(|i| i + 4).unwrap_or(rest.len());
            tokens.push(Token::new(TokenKind::Comment, pos, pos + end));
            pos += end;
            continue;
        }
        if let Some(m) = LINE_COMMENT.find(rest) {
            tokens.push(Token::new(TokenKind::Comment, pos, pos + m.end()));
            pos += m.end();
            continue;
        }
        if let Some(m) = FLOAT.find(rest) {
            tokens.push(Token::new(TokenKind::Float, pos, pos + m.end()));
            pos += m.end();
            continue;
        }
        if let Some(m) = INTEGER.find(rest) {
            tokens.push(Token::new(TokenKind::Integer, pos, pos + m.end()));
            pos += m.end();
            continue;
        }
        if let Some(m) = IDENTIFIER.find(rest) {
            tokens.push(Token::new(TokenKind::Identifier, pos, pos + m.end()));
            pos += m.end();
            continue;
        }
        if let Some(m) = STRING.find(rest) {
            tokens.push(Token::new(TokenKind::String, pos, pos + m.end()));
            pos += m.end();
            continue;
        }
        if let Some(sym) = SYMBOLS.iter().find(|s| rest.starts_with(*s)) {
            tokens.push(Token::new(TokenKind::Symbol, pos, pos + sym.len()));
            pos += sym.len();
            continue;
        }

        let ch_len = rest.chars().next().map(|c| c.len_utf8()).unwrap_or(1);
        tokens.push(Token::new(TokenKind::Unknown, pos, pos + ch_len));
        pos += ch_len;
    }

    tokens.push(Token::new(TokenKind::EndOfInput, len, len));
    tokens
}

/// An opaque cursor produced by [`TokenStream::mark`] and consumed by
/// [`TokenStream::restore`]. Restoring never copies tokens — it just rewinds an index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mark(usize);

/// A peekable, rewindable view over a slice of [Token]s. `peek`/`consume` skip trivia
/// (whitespace and comments); trivia is never dropped, only stepped over, so every
/// production's span can still recover its own leading trivia when it needs to.
pub struct TokenStream<'t> {
    tokens: &'t [Token],
    cursor: usize,
}

impl<'t> TokenStream<'t> {
    pub fn new(tokens: &'t [Token]) -> Self {
        Self { tokens, cursor: 0 }
    }

    fn next_real_index_from(&self, mut i: usize) -> usize {
        while i < self.tokens.len() && self.tokens[i].kind.is_trivia() {
            i += 1;
        }
        i
    }

    /// The `k`-th upcoming non-trivia token (1-based) without advancing the cursor.
    pub fn peek(&self, k: usize) -> Token {
        let mut i = self.next_real_index_from(self.cursor);
        for _ in 1..k {
            i = self.next_real_index_from(i + 1);
        }
        self.tokens
            .get(i)
            .copied()
            .unwrap_or_else(|| self.eof_token())
    }

    fn eof_token(&self) -> Token {
        self.tokens
            .last()
            .copied()
            .unwrap_or(Token::new(TokenKind::EndOfInput, 0, 0))
    }

    /// Advance past the next real token, returning it. Any trivia immediately preceding
    /// it is stepped over (not returned) — callers that need the leading-trivia start
    /// offset use [`TokenStream::leading_trivia_start`] before calling `consume`.
    pub fn consume(&mut self) -> Token {
        self.cursor = self.next_real_index_from(self.cursor);
        let tok = self.tokens.get(self.cursor).copied().unwrap_or_else(|| self.eof_token());
        if self.cursor < self.tokens.len() {
            self.cursor += 1;
        }
        tok
    }

    /// The offset at which any trivia immediately preceding the next real token begins
    /// (or that token's own start, if there is no preceding trivia). Used by
    /// constructs/productions to fold their own leading whitespace/comments into their
    /// span so sibling spans stay contiguous.
    pub fn leading_trivia_start(&self) -> usize {
        let mut i = self.cursor;
        let start_of_trivia_run = i;
        while i < self.tokens.len() && self.tokens[i].kind.is_trivia() {
            i += 1;
        }
        self.tokens
            .get(start_of_trivia_run)
            .map(|t| t.start)
            .unwrap_or_else(|| self.peek(1).start)
    }

    pub fn is_eof(&self) -> bool {
        self.peek(1).kind == TokenKind::EndOfInput
    }

    pub fn mark(&self) -> Mark {
        Mark(self.cursor)
    }

    pub fn restore(&mut self, mark: Mark) {
        self.cursor = mark.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenizes_interface_losslessly() {
        let text = "interface Foo { attribute long bar; };";
        let tokens = tokenize(text);
        let rebuilt: String = tokens
            .iter()
            .filter(|t| t.kind != TokenKind::EndOfInput)
            .map(|t| t.text(text))
            .collect();
        assert_eq!(rebuilt, text);
    }

    #[test]
    fn recognizes_infinity_and_nan_as_float() {
        let tokens = tokenize("Infinity NaN -Infinity");
        let kinds: Vec<_> = tokens
            .iter()
            .filter(|t| t.kind != TokenKind::Whitespace && t.kind != TokenKind::EndOfInput)
            .map(|t| t.kind)
            .collect();
        assert_eq!(kinds, vec![TokenKind::Float, TokenKind::Float, TokenKind::Float]);
    }

    #[test]
    fn peek_skips_trivia_without_consuming() {
        let text = "  // comment\n  long";
        let tokens = tokenize(text);
        let stream = TokenStream::new(&tokens);
        let next = stream.peek(1);
        assert_eq!(next.text(text), "long");
    }

    #[test]
    fn mark_restore_rewinds_cursor() {
        let tokens = tokenize("a b c");
        let mut stream = TokenStream::new(&tokens);
        let mark = stream.mark();
        assert_eq!(stream.consume().kind, TokenKind::Identifier);
        assert_eq!(stream.consume().kind, TokenKind::Identifier);
        stream.restore(mark);
        assert_eq!(stream.peek(1).text("a b c"), "a");
    }

    #[test]
    fn unknown_byte_is_absorbed_without_aborting() {
        let tokens = tokenize("long \u{0}bar");
        assert!(tokens.iter().any(|t| t.kind == TokenKind::Unknown));
    }
}
