//! Line classification for the segmentation scanner.

use super::dialect::{Annotation, Dialect};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineKind {
    /// First non-whitespace character is a letter or digit.
    Definition,
    Metadata(Annotation),
    /// A `#`/`-` prefixed line that is not metadata.
    Comment,
    /// Empty, too short to be a comment, or anything else. Separates blocks.
    Blank,
}

/// Classify one line of a stream or task document.
///
/// Short marker lines such as `#` or `--` are [`LineKind::Blank`]; a
/// comment needs at least three characters once trimmed.
#[must_use]
pub fn classify(line: &str, dialect: &Dialect) -> LineKind {
    let trimmed = line.trim();
    let Some(first) = trimmed.chars().next() else {
        return LineKind::Blank;
    };
    if first.is_alphanumeric() {
        return LineKind::Definition;
    }
    if !matches!(first, '#' | '-') || trimmed.chars().count() < 3 {
        return LineKind::Blank;
    }
    content_start(line)
        .and_then(|start| annotation_at(line, start))
        .filter(|annotation| dialect.allows(*annotation))
        .map_or(LineKind::Comment, LineKind::Metadata)
}

/// Column of the first `@` or alphanumeric character after leading
/// whitespace and `-`/`#` markers.
#[must_use]
pub fn content_start(line: &str) -> Option<usize> {
    for (i, c) in line.chars().enumerate() {
        if c == '@' || c.is_alphanumeric() {
            return Some(i);
        }
        if !(c.is_whitespace() || c == '-' || c == '#') {
            return None;
        }
    }
    None
}

/// The annotation token at column `start`, which must end at a word boundary.
fn annotation_at(line: &str, start: usize) -> Option<Annotation> {
    let rest: String = line.chars().skip(start).collect();
    Annotation::ALL.into_iter().find(|annotation| {
        rest.strip_prefix(annotation.token())
            .is_some_and(|after| !after.starts_with(char::is_alphanumeric))
    })
}
