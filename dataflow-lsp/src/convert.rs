//! Conversions between core positions and LSP types.

use tower_lsp::lsp_types;

use crate::text::{Position, Range};

/// Convert usize to u32 for LSP types, saturating at `u32::MAX`.
pub(crate) fn to_lsp_u32(val: usize) -> u32 {
    val.try_into().unwrap_or(u32::MAX)
}

#[must_use]
pub fn to_lsp_position(position: Position) -> lsp_types::Position {
    lsp_types::Position {
        line: to_lsp_u32(position.line),
        character: to_lsp_u32(position.character),
    }
}

#[must_use]
pub fn to_lsp_range(range: Range) -> lsp_types::Range {
    lsp_types::Range {
        start: to_lsp_position(range.start),
        end: to_lsp_position(range.end),
    }
}

#[must_use]
pub fn from_lsp_position(position: lsp_types::Position) -> Position {
    Position::new(position.line as usize, position.character as usize)
}
