//! Folding ranges: one region per definition item plus its comment runs

use tower_lsp::lsp_types::{FoldingRange, FoldingRangeKind};

use crate::convert::to_lsp_u32;
use crate::language::items::DefinitionItem;
use crate::text::{Position, Range};

/// For each item, its region followed by its comment folds.
#[must_use]
pub fn compute_folding_ranges(items: &[DefinitionItem]) -> Vec<FoldingRange> {
    let mut ranges = Vec::new();
    for item in items {
        ranges.extend(item_region(item));
        ranges.extend(item.comment_ranges.iter().filter_map(|comment| {
            make_folding_range(comment.start, comment.end, FoldingRangeKind::Comment)
        }));
    }
    ranges
}

/// A comment opening the item is folded on its own, so the region starts
/// after it.
fn item_region(item: &DefinitionItem) -> Option<FoldingRange> {
    let start = item.range.start;
    let leading = item
        .comment_ranges
        .iter()
        .find(|comment| comment.start.line == start.line);
    let start = leading.map_or(start, |comment: &Range| {
        Position::new(comment.end.line + 1, start.character)
    });
    make_folding_range(start, item.range.end, FoldingRangeKind::Region)
}

fn make_folding_range(start: Position, end: Position, kind: FoldingRangeKind) -> Option<FoldingRange> {
    (start.line <= end.line).then(|| FoldingRange {
        start_line: to_lsp_u32(start.line),
        start_character: Some(to_lsp_u32(start.character)),
        end_line: to_lsp_u32(end.line),
        end_character: Some(to_lsp_u32(end.character)),
        kind: Some(kind),
        collapsed_text: None,
    })
}
