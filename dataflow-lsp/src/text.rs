//! Line/column addressing over an open document.
//!
//! Lines are zero-based and columns count characters. A trailing newline
//! yields a final empty line, so `"a\n"` has two lines.

use std::fmt;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    pub line: usize,
    pub character: usize,
}

impl Position {
    #[must_use]
    pub const fn new(line: usize, character: usize) -> Self {
        Self { line, character }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.character)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

impl Range {
    #[must_use]
    pub const fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// Columns `start..end` of a single line.
    #[must_use]
    pub const fn on_line(line: usize, start: usize, end: usize) -> Self {
        Self::new(Position::new(line, start), Position::new(line, end))
    }

    /// Inclusive on both ends.
    #[must_use]
    pub fn contains(&self, position: Position) -> bool {
        self.start <= position && position <= self.end
    }

    #[must_use]
    pub const fn with_end(self, end: Position) -> Self {
        Self::new(self.start, end)
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// Read access to an editor buffer snapshot.
pub trait Document {
    fn uri(&self) -> &str;

    fn version(&self) -> i32;

    fn line_count(&self) -> usize;

    /// Range of the line's content, excluding its terminator.
    fn line_range(&self, line: usize) -> Option<Range>;

    /// Text covered by `range`; lines are joined with `\n`.
    fn content(&self, range: Range) -> String;

    fn line(&self, line: usize) -> Option<String> {
        self.line_range(line).map(|range| self.content(range))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextDocument {
    uri: String,
    version: i32,
    text: String,
    lines: Vec<String>,
}

impl TextDocument {
    #[must_use]
    pub fn new(uri: impl Into<String>, version: i32, text: impl Into<String>) -> Self {
        let text = text.into();
        let lines = text
            .split('\n')
            .map(|line| line.strip_suffix('\r').unwrap_or(line).to_string())
            .collect();
        Self {
            uri: uri.into(),
            version,
            text,
            lines,
        }
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Borrowed line content, without the terminator.
    #[must_use]
    pub fn line_text(&self, line: usize) -> Option<&str> {
        self.lines.get(line).map(String::as_str)
    }
}

impl Document for TextDocument {
    fn uri(&self) -> &str {
        &self.uri
    }

    fn version(&self) -> i32 {
        self.version
    }

    fn line_count(&self) -> usize {
        self.lines.len()
    }

    fn line_range(&self, line: usize) -> Option<Range> {
        self.lines
            .get(line)
            .map(|text| Range::on_line(line, 0, text.chars().count()))
    }

    fn content(&self, range: Range) -> String {
        let mut out = String::new();
        if range.end < range.start {
            return out;
        }
        for line in range.start.line..=range.end.line {
            let Some(text) = self.lines.get(line) else {
                break;
            };
            let from = if line == range.start.line {
                range.start.character
            } else {
                0
            };
            let to = if line == range.end.line {
                range.end.character
            } else {
                usize::MAX
            };
            out.push_str(&char_slice(text, from, to));
            if line != range.end.line {
                out.push('\n');
            }
        }
        out
    }
}

/// Characters `from..to` of `text`, clamped to its length.
#[must_use]
pub fn char_slice(text: &str, from: usize, to: usize) -> String {
    text.chars()
        .skip(from)
        .take(to.saturating_sub(from))
        .collect()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn trailing_newline_adds_empty_line() {
        let doc = TextDocument::new("file:///a.scdfs", 1, "-- @name name\r\nticktock=time|log\n");
        assert_eq!(doc.line_count(), 3);
        assert_eq!(doc.line_range(0), Some(Range::on_line(0, 0, 13)));
        assert_eq!(doc.line_range(2), Some(Range::on_line(2, 0, 0)));
        assert_eq!(doc.line_range(3), None);
        assert_eq!(doc.line(1).as_deref(), Some("ticktock=time|log"));
    }

    #[test]
    fn content_spans_lines() {
        let doc = TextDocument::new("file:///a.scdfs", 1, "abc\ndéf\nghi");
        let range = Range::new(Position::new(0, 1), Position::new(2, 2));
        assert_eq!(doc.content(range), "bc\ndéf\ngh");
        assert_eq!(doc.content(Range::on_line(1, 1, 2)), "é");
        assert_eq!(doc.content(Range::on_line(1, 2, 1)), "");
    }

    #[test]
    fn contains_is_inclusive() {
        let range = Range::new(Position::new(0, 0), Position::new(3, 0));
        assert!(range.contains(Position::new(3, 0)));
        assert!(range.contains(Position::new(1, 40)));
        assert!(!range.contains(Position::new(3, 1)));
    }
}
