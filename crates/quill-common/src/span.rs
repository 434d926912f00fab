use serde::Serialize;

/// A position in source text: byte offset plus 1-based line and column.
///
/// All offsets in the Quill compiler are byte offsets into the original
/// UTF-8 source string. Line and column are tracked by the lexer as it
/// scans, so they are available without a separate line index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SourceLocation {
    pub offset: u32,
    pub line: u32,
    pub column: u32,
}

impl SourceLocation {
    /// Create a location from raw parts.
    pub fn new(offset: u32, line: u32, column: u32) -> Self {
        Self { offset, line, column }
    }

    /// The location of the first byte of a file.
    pub fn start_of_file() -> Self {
        Self { offset: 0, line: 1, column: 1 }
    }
}

impl Default for SourceLocation {
    fn default() -> Self {
        Self::start_of_file()
    }
}

/// A half-open range of source text: a start location plus a byte width.
///
/// Ranges are immutable after construction. The end location's line and
/// column are computed by offset arithmetic and are approximate for
/// multi-line ranges; they are only used for diagnostic widths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SourceRange {
    pub start: SourceLocation,
    pub width: u32,
}

impl SourceRange {
    pub fn new(start: SourceLocation, width: u32) -> Self {
        Self { start, width }
    }

    /// A zero-width range at the given location.
    pub fn empty_at(start: SourceLocation) -> Self {
        Self { start, width: 0 }
    }

    /// Byte offset one past the last byte of the range.
    pub fn end_offset(&self) -> u32 {
        self.start.offset + self.width
    }

    /// Whether the range covers the given location (half-open).
    pub fn contains(&self, loc: SourceLocation) -> bool {
        loc.offset >= self.start.offset && loc.offset < self.end_offset()
    }

    /// End location computed by offset arithmetic. Line is carried over
    /// from the start, so it is approximate for ranges spanning newlines.
    pub fn end(&self) -> SourceLocation {
        SourceLocation {
            offset: self.end_offset(),
            line: self.start.line,
            column: self.start.column + self.width,
        }
    }

    /// Smallest range covering both `self` and `other`.
    pub fn merge(self, other: SourceRange) -> SourceRange {
        let (first, last) = if self.start.offset <= other.start.offset {
            (self, other)
        } else {
            (other, self)
        };
        SourceRange {
            start: first.start,
            width: last.end_offset().max(first.end_offset()) - first.start.offset,
        }
    }

    /// Slice the underlying source text for this range.
    ///
    /// # Panics
    ///
    /// Panics if the range is out of bounds or not on UTF-8 boundaries.
    pub fn text<'src>(&self, source: &'src str) -> &'src str {
        &source[self.start.offset as usize..self.end_offset() as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loc(offset: u32) -> SourceLocation {
        SourceLocation::new(offset, 1, offset + 1)
    }

    #[test]
    fn range_contains_is_half_open() {
        let range = SourceRange::new(loc(5), 5);
        assert!(!range.contains(loc(4)));
        assert!(range.contains(loc(5)));
        assert!(range.contains(loc(9)));
        assert!(!range.contains(loc(10)));
    }

    #[test]
    fn empty_range_contains_nothing() {
        let range = SourceRange::empty_at(loc(3));
        assert!(!range.contains(loc(3)));
    }

    #[test]
    fn end_uses_offset_arithmetic() {
        let range = SourceRange::new(SourceLocation::new(10, 2, 3), 4);
        let end = range.end();
        assert_eq!(end.offset, 14);
        assert_eq!(end.line, 2);
        assert_eq!(end.column, 7);
    }

    #[test]
    fn merge_covers_both() {
        let a = SourceRange::new(loc(5), 5);
        let b = SourceRange::new(loc(8), 7);
        let merged = a.merge(b);
        assert_eq!(merged.start.offset, 5);
        assert_eq!(merged.end_offset(), 15);
        // Order does not matter.
        assert_eq!(b.merge(a), merged);
    }

    #[test]
    fn text_slices_source() {
        let source = "let x = 42";
        let range = SourceRange::new(loc(4), 1);
        assert_eq!(range.text(source), "x");
    }
}
