//! Integration tests for the Quill lexer, covering the whole-stream
//! properties: trivia round-trip, position monotonicity, and recovery.

use quill_common::error::LexErrorKind;
use quill_common::token::{Token, TokenKind};
use quill_lexer::{tokenize, LexerOptions};

/// Rebuild the source from tokens: leading trivia ++ text ++ trailing
/// trivia, in order, must reproduce the input byte-for-byte.
fn reconstruct(source: &str) -> String {
    let (stream, _) = tokenize(source, LexerOptions::default());
    let mut out = String::new();
    for tok in stream.tokens() {
        out.push_str(trivia_and_text(tok, source).as_str());
    }
    out
}

fn trivia_and_text(tok: &Token, source: &str) -> String {
    let leading_start = tok.range.start.offset - tok.leading_width();
    let trailing_end = tok.range.end_offset() + tok.trailing_width();
    source[leading_start as usize..trailing_end as usize].to_string()
}

#[test]
fn trivia_round_trip_simple() {
    let source = "fn add(a: i32, b: i32): i32 { return a + b; }";
    assert_eq!(reconstruct(source), source);
}

#[test]
fn trivia_round_trip_with_comments() {
    let source = "// header comment\nvar x = 1; // trailing note\n/* block\n spans lines */\nvar y = 2;\n";
    assert_eq!(reconstruct(source), source);
}

#[test]
fn trivia_round_trip_doc_comments() {
    let source = "/// Adds numbers.\n/** detailed */\nfn add() {}\n";
    assert_eq!(reconstruct(source), source);
}

#[test]
fn trivia_round_trip_windows_line_endings() {
    let source = "var a = 1;\r\nvar b = 2;\r\n";
    assert_eq!(reconstruct(source), source);
}

#[test]
fn trivia_round_trip_trailing_whitespace_and_tabs() {
    let source = "\tvar x = 1;   \n\n  \t var y = 2;";
    assert_eq!(reconstruct(source), source);
}

#[test]
fn trivia_round_trip_empty_and_trivia_only() {
    assert_eq!(reconstruct(""), "");
    assert_eq!(reconstruct("   \n// only trivia\n"), "   \n// only trivia\n");
}

#[test]
fn positions_are_strictly_monotonic() {
    let source = "type Point { var x: i32; var y: i32; fn len(): f64 { return 0.0; } }";
    let (stream, errors) = tokenize(source, LexerOptions::default());
    assert!(errors.is_empty());
    let tokens = stream.tokens();
    for pair in tokens.windows(2) {
        let (a, b) = (&pair[0], &pair[1]);
        if b.kind == TokenKind::Eof {
            assert!(a.range.start.offset <= b.range.start.offset);
        } else {
            assert!(
                a.range.start.offset < b.range.start.offset,
                "token at {} should start before token at {}",
                a.range.start.offset,
                b.range.start.offset
            );
        }
    }
}

#[test]
fn line_and_column_are_monotonic() {
    let source = "var a = 1;\nvar bb = 22;\n  var c = 3;";
    let (stream, _) = tokenize(source, LexerOptions::default());
    let mut last = (0u32, 0u32);
    for tok in stream.tokens() {
        let pos = (tok.range.start.line, tok.range.start.column);
        assert!(pos >= last || pos.0 > last.0, "line/col went backwards: {last:?} -> {pos:?}");
        last = pos;
    }
    // Spot-check a known position: `c` is on line 3.
    let c_tok = stream
        .tokens()
        .iter()
        .find(|t| t.kind == TokenKind::Ident && t.text(source) == "c")
        .unwrap();
    assert_eq!(c_tok.range.start.line, 3);
    assert_eq!(c_tok.range.start.column, 7);
}

#[test]
fn token_text_slices_source() {
    let source = "fn main() { greet(\"world\"); }";
    let (stream, _) = tokenize(source, LexerOptions::default());
    let texts: Vec<_> = stream
        .tokens()
        .iter()
        .filter(|t| t.kind == TokenKind::Ident || t.kind == TokenKind::StringLiteral)
        .map(|t| t.text(source))
        .collect();
    assert_eq!(texts, vec!["main", "greet", "\"world\""]);
}

#[test]
fn escapes_are_accepted() {
    let source = r#"var s = "a\n\t\r\"\\\0\x41A"; var c = '\n';"#;
    let (_, errors) = tokenize(source, LexerOptions::default());
    assert!(errors.is_empty(), "escape sequences should lex cleanly: {errors:?}");
}

#[test]
fn invalid_escape_reports_but_continues() {
    let source = r#"var s = "bad\q escape";"#;
    let (stream, errors) = tokenize(source, LexerOptions::default());
    assert_eq!(errors.len(), 1);
    assert!(matches!(errors[0].kind, LexErrorKind::InvalidEscape('q')));
    // The string token still terminates at the closing quote.
    let kinds: Vec<_> = stream.tokens().iter().map(|t| t.kind).collect();
    assert_eq!(
        kinds,
        vec![
            TokenKind::Var,
            TokenKind::Ident,
            TokenKind::Eq,
            TokenKind::StringLiteral,
            TokenKind::Semicolon,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn unterminated_block_comment_reports() {
    let (_, errors) = tokenize("var x = 1; /* never closed", LexerOptions::default());
    assert_eq!(errors.len(), 1);
    assert!(matches!(errors[0].kind, LexErrorKind::UnterminatedBlockComment));
}

#[test]
fn malformed_radix_number_reports() {
    let (_, errors) = tokenize("var x = 0x;", LexerOptions::default());
    assert_eq!(errors.len(), 1);
    assert!(matches!(errors[0].kind, LexErrorKind::MalformedNumber(_)));
}

#[test]
fn full_operator_vocabulary() {
    let source = "+ - * / % = += -= *= /= %= &= |= ^= <<= >>= ??= == != < <= > >= && || ! & | ^ ~ << >> ++ -- ? : :: -> => . .. ..= ?? ( ) { } [ ] ; , _ @ # $";
    let (stream, errors) = tokenize(source, LexerOptions::default());
    assert!(errors.is_empty());
    use TokenKind::*;
    let expected = vec![
        Plus, Minus, Star, Slash, Percent, Eq, PlusEq, MinusEq, StarEq, SlashEq, PercentEq,
        AmpEq, PipeEq, CaretEq, ShlEq, ShrEq, CoalesceEq, EqEq, NotEq, Lt, LtEq, Gt, GtEq,
        AmpAmp, PipePipe, Bang, Amp, Pipe, Caret, Tilde, Shl, Shr, PlusPlus, MinusMinus,
        Question, Colon, ColonColon, Arrow, FatArrow, Dot, DotDot, DotDotEq, Coalesce, LParen,
        RParen, LBrace, RBrace, LBracket, RBracket, Semicolon, Comma, Underscore, At, Hash,
        Dollar, Eof,
    ];
    let kinds: Vec<_> = stream.tokens().iter().map(|t| t.kind).collect();
    assert_eq!(kinds, expected);
}
