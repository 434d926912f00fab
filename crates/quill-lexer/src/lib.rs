// Quill lexer -- tokenizer for the Quill programming language.
//
// Single pass over the source with one code point of lookahead (two for a
// few operators). Whitespace, newlines, and comments become trivia
// attached to tokens: leading trivia is everything between the previous
// token's end and this token's start, trailing trivia runs to the first
// newline (inclusive). The concatenation of leading + text + trailing over
// all tokens reproduces the source byte-for-byte.

mod cursor;
mod stream;

pub use stream::{Checkpoint, TokenStream};

use cursor::Cursor;
use quill_common::error::{LexError, LexErrorKind};
use quill_common::span::{SourceLocation, SourceRange};
use quill_common::token::{keyword_from_str, Token, TokenKind, Trivia, TriviaKind};

/// Options controlling lexer behavior.
#[derive(Debug, Clone, Copy)]
pub struct LexerOptions {
    /// Whether to record trivia on tokens. Comments-as-trivia are required
    /// for a faithful code printer; turning this off still consumes the
    /// trivia but discards it.
    pub preserve_trivia: bool,
}

impl Default for LexerOptions {
    fn default() -> Self {
        Self { preserve_trivia: true }
    }
}

/// Tokenize a source buffer into a [`TokenStream`] plus any lexer errors.
///
/// The stream always ends with a synthetic `Eof` token carrying any final
/// trivia. Errors are non-fatal: the lexer reports and continues.
pub fn tokenize(source: &str, options: LexerOptions) -> (TokenStream, Vec<LexError>) {
    let lexer = Lexer::new(source, options);
    let (tokens, errors) = lexer.run();
    (TokenStream::new(tokens), errors)
}

struct Lexer<'src> {
    cursor: Cursor<'src>,
    options: LexerOptions,
    errors: Vec<LexError>,
}

impl<'src> Lexer<'src> {
    fn new(source: &'src str, options: LexerOptions) -> Self {
        Self {
            cursor: Cursor::new(source),
            options,
            errors: Vec::new(),
        }
    }

    fn run(mut self) -> (Vec<Token>, Vec<LexError>) {
        let mut tokens = Vec::new();
        loop {
            let leading = self.collect_leading_trivia();
            let start = self.cursor.location();

            if self.cursor.is_eof() {
                let mut eof = Token::new(TokenKind::Eof, SourceRange::empty_at(start));
                eof.leading = leading;
                tokens.push(eof);
                break;
            }

            let mut token = self.scan_token(start);
            token.leading = leading;
            token.trailing = self.collect_trailing_trivia();
            tokens.push(token);
        }
        (tokens, self.errors)
    }

    fn error(&mut self, kind: LexErrorKind, start: SourceLocation) {
        let width = self.cursor.pos() - start.offset;
        self.errors.push(LexError::new(kind, SourceRange::new(start, width)));
    }

    fn token_from(&self, kind: TokenKind, start: SourceLocation) -> Token {
        Token::new(kind, SourceRange::new(start, self.cursor.pos() - start.offset))
    }

    // ── Trivia ─────────────────────────────────────────────────────────

    /// Consume a maximal run of whitespace, newlines, and comments.
    fn collect_leading_trivia(&mut self) -> Vec<Trivia> {
        let mut trivia = Vec::new();
        loop {
            let Some(piece) = self.next_trivia_piece(true) else {
                break;
            };
            if self.options.preserve_trivia {
                trivia.push(piece);
            }
        }
        trivia
    }

    /// Consume whitespace after a token, up to and including the first
    /// newline. Comments after a token are left for the next token's
    /// leading run.
    fn collect_trailing_trivia(&mut self) -> Vec<Trivia> {
        let mut trivia = Vec::new();
        loop {
            match self.cursor.peek() {
                Some(' ' | '\t') => {
                    let start = self.cursor.pos();
                    self.cursor.eat_while(|c| c == ' ' || c == '\t');
                    if self.options.preserve_trivia {
                        trivia.push(Trivia::new(TriviaKind::Whitespace, self.cursor.pos() - start));
                    }
                }
                Some('\n' | '\r') => {
                    let piece = self.consume_newline();
                    if self.options.preserve_trivia {
                        trivia.push(piece);
                    }
                    break;
                }
                _ => break,
            }
        }
        trivia
    }

    /// Consume one trivia piece, or `None` if the current character starts
    /// a token. `allow_newlines` is false only in trailing position where
    /// the caller handles newlines itself.
    fn next_trivia_piece(&mut self, allow_newlines: bool) -> Option<Trivia> {
        match self.cursor.peek()? {
            ' ' | '\t' => {
                let start = self.cursor.pos();
                self.cursor.eat_while(|c| c == ' ' || c == '\t');
                Some(Trivia::new(TriviaKind::Whitespace, self.cursor.pos() - start))
            }
            '\n' | '\r' if allow_newlines => Some(self.consume_newline()),
            '/' if self.cursor.peek_next() == Some('/') => Some(self.consume_line_comment()),
            '/' if self.cursor.peek_next() == Some('*') => Some(self.consume_block_comment()),
            _ => None,
        }
    }

    fn consume_newline(&mut self) -> Trivia {
        let start = self.cursor.pos();
        let c = self.cursor.advance();
        if c == Some('\r') && self.cursor.peek() == Some('\n') {
            self.cursor.advance();
        }
        Trivia::new(TriviaKind::Newline, self.cursor.pos() - start)
    }

    /// `// ...` or `/// ...` up to (not including) the newline.
    fn consume_line_comment(&mut self) -> Trivia {
        let start = self.cursor.pos();
        self.cursor.advance(); // first '/'
        self.cursor.advance(); // second '/'
        let doc = self.cursor.peek() == Some('/');
        self.cursor.eat_while(|c| c != '\n' && c != '\r');
        let kind = if doc { TriviaKind::DocComment } else { TriviaKind::LineComment };
        Trivia::new(kind, self.cursor.pos() - start)
    }

    /// `/* ... */` or `/** ... */`. Reports an error when unterminated.
    fn consume_block_comment(&mut self) -> Trivia {
        let start = self.cursor.location();
        self.cursor.advance(); // '/'
        self.cursor.advance(); // '*'
        let doc = self.cursor.peek() == Some('*') && self.cursor.peek_next() != Some('/');

        let mut closed = false;
        while let Some(c) = self.cursor.advance() {
            if c == '*' && self.cursor.peek() == Some('/') {
                self.cursor.advance();
                closed = true;
                break;
            }
        }
        if !closed {
            self.error(LexErrorKind::UnterminatedBlockComment, start);
        }

        let kind = if doc { TriviaKind::DocComment } else { TriviaKind::BlockComment };
        Trivia::new(kind, self.cursor.pos() - start.offset)
    }

    // ── Token dispatch ─────────────────────────────────────────────────

    fn scan_token(&mut self, start: SourceLocation) -> Token {
        let c = self.cursor.peek().expect("scan_token called at eof");

        match c {
            c if is_ident_start(c) => self.lex_ident(start),
            '0'..='9' => self.lex_number(start),
            '"' => self.lex_string(start),
            '\'' => self.lex_char(start),

            '(' => self.single(TokenKind::LParen, start),
            ')' => self.single(TokenKind::RParen, start),
            '{' => self.single(TokenKind::LBrace, start),
            '}' => self.single(TokenKind::RBrace, start),
            '[' => self.single(TokenKind::LBracket, start),
            ']' => self.single(TokenKind::RBracket, start),
            ';' => self.single(TokenKind::Semicolon, start),
            ',' => self.single(TokenKind::Comma, start),
            '@' => self.single(TokenKind::At, start),
            '#' => self.single(TokenKind::Hash, start),
            '$' => self.single(TokenKind::Dollar, start),
            '~' => self.single(TokenKind::Tilde, start),

            '+' => self.lex_plus(start),
            '-' => self.lex_minus(start),
            '*' => self.with_eq(TokenKind::Star, TokenKind::StarEq, start),
            '/' => self.with_eq(TokenKind::Slash, TokenKind::SlashEq, start),
            '%' => self.with_eq(TokenKind::Percent, TokenKind::PercentEq, start),
            '^' => self.with_eq(TokenKind::Caret, TokenKind::CaretEq, start),
            '=' => self.lex_eq(start),
            '!' => self.with_eq(TokenKind::Bang, TokenKind::NotEq, start),
            '<' => self.lex_lt(start),
            '>' => self.lex_gt(start),
            '&' => self.lex_amp(start),
            '|' => self.lex_pipe(start),
            '?' => self.lex_question(start),
            ':' => self.lex_colon(start),
            '.' => self.lex_dot(start),

            _ => {
                self.cursor.advance();
                self.error(LexErrorKind::InvalidCharacter(c), start);
                self.token_from(TokenKind::Invalid, start)
            }
        }
    }

    fn single(&mut self, kind: TokenKind, start: SourceLocation) -> Token {
        self.cursor.advance();
        self.token_from(kind, start)
    }

    /// `X` or `X=` (e.g. `*` vs `*=`).
    fn with_eq(&mut self, plain: TokenKind, with_eq: TokenKind, start: SourceLocation) -> Token {
        self.cursor.advance();
        if self.cursor.peek() == Some('=') {
            self.cursor.advance();
            self.token_from(with_eq, start)
        } else {
            self.token_from(plain, start)
        }
    }

    /// `+` -> `++` `+=` `+`
    fn lex_plus(&mut self, start: SourceLocation) -> Token {
        self.cursor.advance();
        match self.cursor.peek() {
            Some('+') => {
                self.cursor.advance();
                self.token_from(TokenKind::PlusPlus, start)
            }
            Some('=') => {
                self.cursor.advance();
                self.token_from(TokenKind::PlusEq, start)
            }
            _ => self.token_from(TokenKind::Plus, start),
        }
    }

    /// `-` -> `--` `-=` `->` `-`
    fn lex_minus(&mut self, start: SourceLocation) -> Token {
        self.cursor.advance();
        match self.cursor.peek() {
            Some('-') => {
                self.cursor.advance();
                self.token_from(TokenKind::MinusMinus, start)
            }
            Some('=') => {
                self.cursor.advance();
                self.token_from(TokenKind::MinusEq, start)
            }
            Some('>') => {
                self.cursor.advance();
                self.token_from(TokenKind::Arrow, start)
            }
            _ => self.token_from(TokenKind::Minus, start),
        }
    }

    /// `=` -> `==` `=>` `=`
    fn lex_eq(&mut self, start: SourceLocation) -> Token {
        self.cursor.advance();
        match self.cursor.peek() {
            Some('=') => {
                self.cursor.advance();
                self.token_from(TokenKind::EqEq, start)
            }
            Some('>') => {
                self.cursor.advance();
                self.token_from(TokenKind::FatArrow, start)
            }
            _ => self.token_from(TokenKind::Eq, start),
        }
    }

    /// `<` -> `<<=` `<<` `<=` `<`
    fn lex_lt(&mut self, start: SourceLocation) -> Token {
        self.cursor.advance();
        match self.cursor.peek() {
            Some('<') => {
                self.cursor.advance();
                if self.cursor.peek() == Some('=') {
                    self.cursor.advance();
                    self.token_from(TokenKind::ShlEq, start)
                } else {
                    self.token_from(TokenKind::Shl, start)
                }
            }
            Some('=') => {
                self.cursor.advance();
                self.token_from(TokenKind::LtEq, start)
            }
            _ => self.token_from(TokenKind::Lt, start),
        }
    }

    /// `>` -> `>>=` `>>` `>=` `>`
    fn lex_gt(&mut self, start: SourceLocation) -> Token {
        self.cursor.advance();
        match self.cursor.peek() {
            Some('>') => {
                self.cursor.advance();
                if self.cursor.peek() == Some('=') {
                    self.cursor.advance();
                    self.token_from(TokenKind::ShrEq, start)
                } else {
                    self.token_from(TokenKind::Shr, start)
                }
            }
            Some('=') => {
                self.cursor.advance();
                self.token_from(TokenKind::GtEq, start)
            }
            _ => self.token_from(TokenKind::Gt, start),
        }
    }

    /// `&` -> `&&` `&=` `&`
    fn lex_amp(&mut self, start: SourceLocation) -> Token {
        self.cursor.advance();
        match self.cursor.peek() {
            Some('&') => {
                self.cursor.advance();
                self.token_from(TokenKind::AmpAmp, start)
            }
            Some('=') => {
                self.cursor.advance();
                self.token_from(TokenKind::AmpEq, start)
            }
            _ => self.token_from(TokenKind::Amp, start),
        }
    }

    /// `|` -> `||` `|=` `|`
    fn lex_pipe(&mut self, start: SourceLocation) -> Token {
        self.cursor.advance();
        match self.cursor.peek() {
            Some('|') => {
                self.cursor.advance();
                self.token_from(TokenKind::PipePipe, start)
            }
            Some('=') => {
                self.cursor.advance();
                self.token_from(TokenKind::PipeEq, start)
            }
            _ => self.token_from(TokenKind::Pipe, start),
        }
    }

    /// `?` -> `??=` `??` `?`
    fn lex_question(&mut self, start: SourceLocation) -> Token {
        self.cursor.advance();
        if self.cursor.peek() == Some('?') {
            self.cursor.advance();
            if self.cursor.peek() == Some('=') {
                self.cursor.advance();
                self.token_from(TokenKind::CoalesceEq, start)
            } else {
                self.token_from(TokenKind::Coalesce, start)
            }
        } else {
            self.token_from(TokenKind::Question, start)
        }
    }

    /// `:` -> `::` `:`
    fn lex_colon(&mut self, start: SourceLocation) -> Token {
        self.cursor.advance();
        if self.cursor.peek() == Some(':') {
            self.cursor.advance();
            self.token_from(TokenKind::ColonColon, start)
        } else {
            self.token_from(TokenKind::Colon, start)
        }
    }

    /// `.` -> `..=` `..` `.`
    fn lex_dot(&mut self, start: SourceLocation) -> Token {
        self.cursor.advance();
        if self.cursor.peek() == Some('.') {
            self.cursor.advance();
            if self.cursor.peek() == Some('=') {
                self.cursor.advance();
                self.token_from(TokenKind::DotDotEq, start)
            } else {
                self.token_from(TokenKind::DotDot, start)
            }
        } else {
            self.token_from(TokenKind::Dot, start)
        }
    }

    // ── Identifiers and keywords ───────────────────────────────────────

    fn lex_ident(&mut self, start: SourceLocation) -> Token {
        self.cursor.advance();
        self.cursor.eat_while(is_ident_continue);
        let text = self.cursor.slice(start.offset, self.cursor.pos());

        let kind = if text == "_" {
            TokenKind::Underscore
        } else {
            keyword_from_str(text).unwrap_or(TokenKind::Ident)
        };
        self.token_from(kind, start)
    }

    // ── Number literals ────────────────────────────────────────────────

    /// Decimal, hex (`0x`), binary (`0b`), octal (`0o`) integers with an
    /// optional `L` suffix; fractional part, exponent, or `F`/`D` suffix
    /// produce float/double literals.
    fn lex_number(&mut self, start: SourceLocation) -> Token {
        let first = self.cursor.advance().expect("lex_number called at eof");

        if first == '0' {
            match self.cursor.peek() {
                Some('x' | 'X') => return self.lex_radix(start, 16),
                Some('b' | 'B') => return self.lex_radix(start, 2),
                Some('o' | 'O') => return self.lex_radix(start, 8),
                _ => {}
            }
        }

        self.cursor.eat_while(|c| c.is_ascii_digit());

        let mut is_float = false;

        // A fractional part needs a digit after the dot so that ranges
        // like `0..10` keep their `..` token.
        if self.cursor.peek() == Some('.')
            && self.cursor.peek_next().is_some_and(|c| c.is_ascii_digit())
        {
            is_float = true;
            self.cursor.advance(); // '.'
            self.cursor.eat_while(|c| c.is_ascii_digit());
        }

        if matches!(self.cursor.peek(), Some('e' | 'E')) {
            is_float = true;
            self.lex_exponent(start);
        }

        match self.cursor.peek() {
            Some('L' | 'l') if !is_float => {
                self.cursor.advance();
                self.token_from(TokenKind::LongLiteral, start)
            }
            Some('F' | 'f') => {
                self.cursor.advance();
                self.token_from(TokenKind::FloatLiteral, start)
            }
            Some('D' | 'd') => {
                self.cursor.advance();
                self.token_from(TokenKind::DoubleLiteral, start)
            }
            _ if is_float => self.token_from(TokenKind::DoubleLiteral, start),
            _ => self.token_from(TokenKind::IntLiteral, start),
        }
    }

    fn lex_radix(&mut self, start: SourceLocation, radix: u32) -> Token {
        self.cursor.advance(); // 'x' / 'b' / 'o'
        let digits_start = self.cursor.pos();
        self.cursor.eat_while(|c| c.is_digit(radix));
        if self.cursor.pos() == digits_start {
            let text = self.cursor.slice(start.offset, self.cursor.pos()).to_string();
            self.error(LexErrorKind::MalformedNumber(text), start);
        }
        if matches!(self.cursor.peek(), Some('L' | 'l')) {
            self.cursor.advance();
            return self.token_from(TokenKind::LongLiteral, start);
        }
        self.token_from(TokenKind::IntLiteral, start)
    }

    fn lex_exponent(&mut self, start: SourceLocation) {
        self.cursor.advance(); // 'e' / 'E'
        if matches!(self.cursor.peek(), Some('+' | '-')) {
            self.cursor.advance();
        }
        let digits_start = self.cursor.pos();
        self.cursor.eat_while(|c| c.is_ascii_digit());
        if self.cursor.pos() == digits_start {
            let text = self.cursor.slice(start.offset, self.cursor.pos()).to_string();
            self.error(LexErrorKind::MalformedNumber(text), start);
        }
    }

    // ── String and character literals ──────────────────────────────────

    /// `"..."` with escapes. An unterminated string reports an error and
    /// synthesizes a token ending at the next newline.
    fn lex_string(&mut self, start: SourceLocation) -> Token {
        self.cursor.advance(); // opening '"'
        loop {
            match self.cursor.peek() {
                None | Some('\n' | '\r') => {
                    self.error(LexErrorKind::UnterminatedString, start);
                    return self.token_from(TokenKind::StringLiteral, start);
                }
                Some('"') => {
                    self.cursor.advance();
                    return self.token_from(TokenKind::StringLiteral, start);
                }
                Some('\\') => self.lex_escape(),
                Some(_) => {
                    self.cursor.advance();
                }
            }
        }
    }

    /// `'c'` with the same escape rules as strings.
    fn lex_char(&mut self, start: SourceLocation) -> Token {
        self.cursor.advance(); // opening '\''
        match self.cursor.peek() {
            None | Some('\n' | '\r') => {
                self.error(LexErrorKind::UnterminatedChar, start);
                return self.token_from(TokenKind::CharLiteral, start);
            }
            Some('\\') => self.lex_escape(),
            Some(_) => {
                self.cursor.advance();
            }
        }
        if self.cursor.peek() == Some('\'') {
            self.cursor.advance();
        } else {
            self.error(LexErrorKind::UnterminatedChar, start);
        }
        self.token_from(TokenKind::CharLiteral, start)
    }

    /// Consume a `\X` escape, validating the sequence:
    /// `\n \t \r \" \' \\ \0 \xHH \uHHHH`.
    fn lex_escape(&mut self) {
        let escape_start = self.cursor.location();
        self.cursor.advance(); // '\\'
        match self.cursor.peek() {
            Some('n' | 't' | 'r' | '"' | '\'' | '\\' | '0') => {
                self.cursor.advance();
            }
            Some('x') => {
                self.cursor.advance();
                self.expect_hex_digits(2, escape_start);
            }
            Some('u') => {
                self.cursor.advance();
                self.expect_hex_digits(4, escape_start);
            }
            Some(c) => {
                self.cursor.advance();
                self.error(LexErrorKind::InvalidEscape(c), escape_start);
            }
            None => {}
        }
    }

    fn expect_hex_digits(&mut self, count: u32, escape_start: SourceLocation) {
        for _ in 0..count {
            match self.cursor.peek() {
                Some(c) if c.is_ascii_hexdigit() => {
                    self.cursor.advance();
                }
                Some(c) => {
                    self.error(LexErrorKind::InvalidEscape(c), escape_start);
                    return;
                }
                None => return,
            }
        }
    }
}

/// Whether a character can start an identifier.
fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

/// Whether a character can continue an identifier.
fn is_ident_continue(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        let (stream, errors) = tokenize(source, LexerOptions::default());
        assert!(errors.is_empty(), "unexpected lex errors: {errors:?}");
        stream.tokens().iter().map(|t| t.kind).collect()
    }

    #[test]
    fn lex_simple_declaration() {
        assert_eq!(
            kinds("var x = 42;"),
            vec![
                TokenKind::Var,
                TokenKind::Ident,
                TokenKind::Eq,
                TokenKind::IntLiteral,
                TokenKind::Semicolon,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn lex_compound_operators_longest_match() {
        assert_eq!(
            kinds("<<= >>= ..= .. ??= ?? && || -> => ::"),
            vec![
                TokenKind::ShlEq,
                TokenKind::ShrEq,
                TokenKind::DotDotEq,
                TokenKind::DotDot,
                TokenKind::CoalesceEq,
                TokenKind::Coalesce,
                TokenKind::AmpAmp,
                TokenKind::PipePipe,
                TokenKind::Arrow,
                TokenKind::FatArrow,
                TokenKind::ColonColon,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn lex_number_kinds() {
        assert_eq!(kinds("1")[0], TokenKind::IntLiteral);
        assert_eq!(kinds("1L")[0], TokenKind::LongLiteral);
        assert_eq!(kinds("1.5")[0], TokenKind::DoubleLiteral);
        assert_eq!(kinds("1.5F")[0], TokenKind::FloatLiteral);
        assert_eq!(kinds("2D")[0], TokenKind::DoubleLiteral);
        assert_eq!(kinds("1e10")[0], TokenKind::DoubleLiteral);
        assert_eq!(kinds("0xFF")[0], TokenKind::IntLiteral);
        assert_eq!(kinds("0b1010")[0], TokenKind::IntLiteral);
        assert_eq!(kinds("0o77")[0], TokenKind::IntLiteral);
    }

    #[test]
    fn range_after_int_keeps_dotdot() {
        assert_eq!(
            kinds("0..10"),
            vec![
                TokenKind::IntLiteral,
                TokenKind::DotDot,
                TokenKind::IntLiteral,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn keywords_and_identifiers() {
        assert_eq!(
            kinds("fn add this value"),
            vec![
                TokenKind::Fn,
                TokenKind::Ident,
                TokenKind::This,
                TokenKind::Value,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn standalone_underscore() {
        assert_eq!(kinds("_ _x x_")[..3], [TokenKind::Underscore, TokenKind::Ident, TokenKind::Ident]);
    }

    #[test]
    fn unterminated_string_recovers_at_newline() {
        let (stream, errors) = tokenize("\"abc\nvar", LexerOptions::default());
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, LexErrorKind::UnterminatedString);
        // Lexing continues on the next line.
        let kinds: Vec<_> = stream.tokens().iter().map(|t| t.kind).collect();
        assert_eq!(kinds, vec![TokenKind::StringLiteral, TokenKind::Var, TokenKind::Eof]);
    }

    #[test]
    fn invalid_character_is_reported_and_skipped() {
        let (stream, errors) = tokenize("a ` b", LexerOptions::default());
        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0].kind, LexErrorKind::InvalidCharacter('`')));
        let kinds: Vec<_> = stream.tokens().iter().map(|t| t.kind).collect();
        assert_eq!(kinds, vec![TokenKind::Ident, TokenKind::Invalid, TokenKind::Ident, TokenKind::Eof]);
    }

    #[test]
    fn comments_attach_as_leading_trivia() {
        let (stream, errors) = tokenize("// note\nvar x", LexerOptions::default());
        assert!(errors.is_empty());
        let var = &stream.tokens()[0];
        assert_eq!(var.kind, TokenKind::Var);
        let trivia_kinds: Vec<_> = var.leading.iter().map(|t| t.kind).collect();
        assert_eq!(trivia_kinds, vec![TriviaKind::LineComment, TriviaKind::Newline]);
    }

    #[test]
    fn trailing_trivia_stops_after_newline() {
        let (stream, _) = tokenize("a  \nb", LexerOptions::default());
        let a = &stream.tokens()[0];
        let widths: Vec<_> = a.trailing.iter().map(|t| (t.kind, t.width)).collect();
        assert_eq!(widths, vec![(TriviaKind::Whitespace, 2), (TriviaKind::Newline, 1)]);
        // b has no leading trivia; it all went to a's trailing run.
        assert!(stream.tokens()[1].leading.is_empty());
    }

    #[test]
    fn preserve_trivia_off_discards_trivia() {
        let (stream, _) = tokenize("  a // c\n b", LexerOptions { preserve_trivia: false });
        for tok in stream.tokens() {
            assert!(tok.leading.is_empty());
            assert!(tok.trailing.is_empty());
        }
    }
}
