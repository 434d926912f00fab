// Quill parser -- tokens to a typed syntax tree with error recovery.
//
// A recursive-descent driver handles declarations, statements, and
// synchronization; a Pratt precedence climber handles expressions. All
// nodes are allocated from a per-unit arena and referenced by integer
// handles. The parser never fails outright: on bad input it records
// diagnostics, plants `Missing` placeholder nodes, and resynchronizes at
// the next safe harbor.

pub mod arena;
pub mod ast;
pub mod code_printer;
pub mod compare;
pub mod error;
mod parser;
pub mod printer;
pub mod visit;

pub use arena::{Ast, CompilationUnit, ExprId, StmtId};
pub use error::ParseError;

use quill_lexer::TokenStream;

/// The outcome of parsing one file: the arena, the unit root, and any
/// errors. The token stream is handed back for printers that want to
/// recover trivia.
#[derive(Debug)]
pub struct ParseResult {
    pub ast: Ast,
    pub unit: CompilationUnit,
    pub errors: Vec<ParseError>,
    pub tokens: TokenStream,
}

impl ParseResult {
    pub fn has_errors(&self) -> bool {
        self.errors
            .iter()
            .any(|e| e.severity >= quill_common::diagnostics::Severity::Error)
    }
}

/// Parse a token stream into a compilation unit.
///
/// On severe input the returned unit is still well-formed, possibly
/// containing `Missing` nodes; the error vector is populated alongside.
pub fn parse(tokens: TokenStream, source: &str) -> ParseResult {
    parser::Parser::new(tokens, source).run()
}

/// Convenience: lex and parse in one step. Lexer errors are folded into
/// the parse error vector.
pub fn parse_source(source: &str) -> ParseResult {
    let (tokens, lex_errors) = quill_lexer::tokenize(source, quill_lexer::LexerOptions::default());
    let mut result = parse(tokens, source);
    let lexed: Vec<ParseError> = lex_errors
        .into_iter()
        .map(|e| ParseError::error(e.kind.to_string(), e.range))
        .collect();
    // Lexer errors come first: they were found first.
    let mut errors = lexed;
    errors.append(&mut result.errors);
    result.errors = errors;
    result
}
