use quill_common::span::{SourceLocation, SourceRange};
use quill_common::token::{Token, TokenKind};

/// A saved stream position for speculative parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checkpoint {
    position: usize,
}

/// Sequential token container with random access, a mutable cursor, and
/// checkpoint/restore for speculative parsing.
///
/// The stream always holds at least one token (`Eof`); navigation clamps
/// to it so `current()` is always valid.
#[derive(Debug)]
pub struct TokenStream {
    tokens: Vec<Token>,
    pos: usize,
}

impl TokenStream {
    /// Build a stream from lexer output. Appends a synthetic `Eof` if the
    /// token vector does not already end with one.
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if tokens.last().map(|t| t.kind) != Some(TokenKind::Eof) {
            let loc = tokens
                .last()
                .map(|t| t.range.end())
                .unwrap_or_else(SourceLocation::start_of_file);
            tokens.push(Token::new(TokenKind::Eof, SourceRange::empty_at(loc)));
        }
        Self { tokens, pos: 0 }
    }

    // ── Navigation ─────────────────────────────────────────────────────

    pub fn current(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    /// Look `offset` tokens ahead; clamps to the trailing `Eof`.
    pub fn peek(&self, offset: usize) -> &Token {
        let idx = (self.pos + offset).min(self.tokens.len() - 1);
        &self.tokens[idx]
    }

    /// The most recently consumed token (or the first token at the start).
    pub fn previous(&self) -> &Token {
        &self.tokens[self.pos.saturating_sub(1)]
    }

    pub fn advance(&mut self) {
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
    }

    pub fn at_end(&self) -> bool {
        self.current().kind == TokenKind::Eof
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        // The synthetic Eof means a stream is never literally empty.
        self.tokens.len() <= 1
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    // ── Conditional consumption ────────────────────────────────────────

    pub fn check(&self, kind: TokenKind) -> bool {
        self.current().kind == kind
    }

    pub fn check_any(&self, kinds: &[TokenKind]) -> bool {
        kinds.contains(&self.current().kind)
    }

    /// Whether the next tokens match `sequence` exactly, in order.
    pub fn check_sequence(&self, sequence: &[TokenKind]) -> bool {
        sequence
            .iter()
            .enumerate()
            .all(|(i, kind)| self.peek(i).kind == *kind)
    }

    /// Consume the current token if it matches `kind`.
    pub fn consume(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Consume the current token if it matches any of `kinds`, returning
    /// the matched kind.
    pub fn consume_any_get(&mut self, kinds: &[TokenKind]) -> Option<TokenKind> {
        let kind = self.current().kind;
        if kinds.contains(&kind) {
            self.advance();
            Some(kind)
        } else {
            None
        }
    }

    // ── Speculative parsing ────────────────────────────────────────────

    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint { position: self.pos }
    }

    pub fn restore(&mut self, cp: Checkpoint) {
        self.pos = cp.position;
    }

    // ── Recovery ───────────────────────────────────────────────────────

    /// Advance until the current token is `kind` or end of input.
    pub fn skip_to(&mut self, kind: TokenKind) {
        while !self.at_end() && !self.check(kind) {
            self.advance();
        }
    }

    /// Advance until the current token is one of `kinds` or end of input.
    pub fn skip_to_any(&mut self, kinds: &[TokenKind]) {
        while !self.at_end() && !self.check_any(kinds) {
            self.advance();
        }
    }

    /// Advance past the next occurrence of `kind` (if any).
    pub fn skip_past(&mut self, kind: TokenKind) {
        self.skip_to(kind);
        self.consume(kind);
    }

    // ── Generic argument support ───────────────────────────────────────

    /// Split a `>>` at the cursor into two `>` tokens in place, so nested
    /// generic argument lists (`List<List<i32>>`) can close one level at a
    /// time. Leading trivia stays with the first `>`, trailing with the
    /// second.
    pub fn split_right_shift(&mut self) {
        if self.current().kind != TokenKind::Shr {
            return;
        }
        let original = self.tokens[self.pos].clone();
        let first_start = original.range.start;
        let second_start = SourceLocation::new(
            first_start.offset + 1,
            first_start.line,
            first_start.column + 1,
        );

        let mut first = Token::new(TokenKind::Gt, SourceRange::new(first_start, 1));
        first.leading = original.leading;
        let mut second = Token::new(TokenKind::Gt, SourceRange::new(second_start, 1));
        second.trailing = original.trailing;

        self.tokens[self.pos] = first;
        self.tokens.insert(self.pos + 1, second);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quill_common::span::SourceLocation;

    fn tok(kind: TokenKind, offset: u32, width: u32) -> Token {
        Token::new(
            kind,
            SourceRange::new(SourceLocation::new(offset, 1, offset + 1), width),
        )
    }

    fn stream(kinds: &[TokenKind]) -> TokenStream {
        let tokens = kinds
            .iter()
            .enumerate()
            .map(|(i, k)| tok(*k, i as u32 * 2, 1))
            .collect();
        TokenStream::new(tokens)
    }

    #[test]
    fn new_appends_eof() {
        let s = stream(&[TokenKind::Var, TokenKind::Ident]);
        assert_eq!(s.len(), 3);
        assert_eq!(s.tokens().last().unwrap().kind, TokenKind::Eof);
    }

    #[test]
    fn navigation_clamps_at_eof() {
        let mut s = stream(&[TokenKind::Var]);
        assert_eq!(s.current().kind, TokenKind::Var);
        s.advance();
        assert!(s.at_end());
        s.advance(); // no-op past the end
        assert!(s.at_end());
        assert_eq!(s.peek(10).kind, TokenKind::Eof);
    }

    #[test]
    fn check_and_consume() {
        let mut s = stream(&[TokenKind::Var, TokenKind::Ident]);
        assert!(s.check(TokenKind::Var));
        assert!(s.check_sequence(&[TokenKind::Var, TokenKind::Ident, TokenKind::Eof]));
        assert!(!s.consume(TokenKind::Ident));
        assert!(s.consume(TokenKind::Var));
        assert_eq!(s.previous().kind, TokenKind::Var);
        assert_eq!(
            s.consume_any_get(&[TokenKind::Fn, TokenKind::Ident]),
            Some(TokenKind::Ident)
        );
    }

    #[test]
    fn checkpoint_restore_rewinds() {
        let mut s = stream(&[TokenKind::Var, TokenKind::Ident, TokenKind::Eq]);
        let cp = s.checkpoint();
        s.advance();
        s.advance();
        assert_eq!(s.current().kind, TokenKind::Eq);
        s.restore(cp);
        assert_eq!(s.current().kind, TokenKind::Var);
    }

    #[test]
    fn skip_to_stops_at_kind() {
        let mut s = stream(&[TokenKind::Var, TokenKind::Ident, TokenKind::Semicolon, TokenKind::Fn]);
        s.skip_to(TokenKind::Semicolon);
        assert_eq!(s.current().kind, TokenKind::Semicolon);
        s.skip_past(TokenKind::Semicolon);
        assert_eq!(s.current().kind, TokenKind::Fn);
    }

    #[test]
    fn split_right_shift_produces_two_gt() {
        let mut s = TokenStream::new(vec![tok(TokenKind::Shr, 5, 2), tok(TokenKind::Semicolon, 7, 1)]);
        s.split_right_shift();
        assert_eq!(s.current().kind, TokenKind::Gt);
        assert_eq!(s.current().range.start.offset, 5);
        assert_eq!(s.current().range.width, 1);
        assert_eq!(s.peek(1).kind, TokenKind::Gt);
        assert_eq!(s.peek(1).range.start.offset, 6);
        assert_eq!(s.peek(2).kind, TokenKind::Semicolon);
    }

    #[test]
    fn split_right_shift_ignores_other_kinds() {
        let mut s = stream(&[TokenKind::Gt]);
        let before = s.len();
        s.split_right_shift();
        assert_eq!(s.len(), before);
    }
}
