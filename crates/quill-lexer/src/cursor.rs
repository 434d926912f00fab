use quill_common::span::SourceLocation;

/// Byte-level source iterator for the Quill lexer.
///
/// Wraps a source string and provides character-by-character iteration
/// with byte-offset, line, and column tracking. All offsets are byte
/// offsets into the original UTF-8 source text; line and column are
/// 1-based.
pub struct Cursor<'src> {
    source: &'src str,
    pos: u32,
    line: u32,
    column: u32,
    chars: std::str::Chars<'src>,
}

impl<'src> Cursor<'src> {
    /// Create a new cursor at the start of the source text.
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            pos: 0,
            line: 1,
            column: 1,
            chars: source.chars(),
        }
    }

    /// Look at the current character without consuming it.
    pub fn peek(&self) -> Option<char> {
        self.chars.clone().next()
    }

    /// Look at the character after the current one without consuming anything.
    pub fn peek_next(&self) -> Option<char> {
        let mut iter = self.chars.clone();
        iter.next();
        iter.next()
    }

    /// Consume the current character and advance the position.
    ///
    /// Newlines (`\n`, or a `\r` not followed by `\n`) reset the column
    /// and increment the line.
    pub fn advance(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        self.pos += c.len_utf8() as u32;
        let is_newline = c == '\n' || (c == '\r' && self.peek() != Some('\n'));
        if is_newline {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    /// Current byte position in the source text.
    pub fn pos(&self) -> u32 {
        self.pos
    }

    /// Current position as a full source location.
    pub fn location(&self) -> SourceLocation {
        SourceLocation::new(self.pos, self.line, self.column)
    }

    /// Whether there are no more characters to consume.
    pub fn is_eof(&self) -> bool {
        self.peek().is_none()
    }

    /// Advance while the predicate holds for the current character.
    pub fn eat_while(&mut self, predicate: impl Fn(char) -> bool) {
        while let Some(c) = self.peek() {
            if predicate(c) {
                self.advance();
            } else {
                break;
            }
        }
    }

    /// Extract a slice of the source text by byte offsets.
    ///
    /// # Panics
    ///
    /// Panics if start or end are out of bounds or not on UTF-8 boundaries.
    pub fn slice(&self, start: u32, end: u32) -> &'src str {
        &self.source[start as usize..end as usize]
    }
}
