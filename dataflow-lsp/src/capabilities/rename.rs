//! Rename: edit every symbol sharing the name under the cursor

use std::collections::HashMap;

use tower_lsp::lsp_types::{PrepareRenameResponse, TextEdit, Url, WorkspaceEdit};

use crate::convert::to_lsp_range;
use crate::language::symbols::{SymbolRole, SymbolTable};
use crate::text::Position;

/// The symbol under the cursor and its current name.
#[must_use]
pub fn prepare_rename(table: &SymbolTable, position: Position) -> Option<PrepareRenameResponse> {
    let symbol = table.symbol_at(position)?;
    Some(PrepareRenameResponse::RangeWithPlaceholder {
        range: to_lsp_range(symbol.range),
        placeholder: symbol.name.clone(),
    })
}

/// One edit per non-definition symbol named like the one at `position`.
///
/// Returns `None` when nothing renameable sits under the cursor.
#[must_use]
pub fn compute_rename(
    table: &SymbolTable,
    uri: &Url,
    position: Position,
    new_name: &str,
) -> Option<WorkspaceEdit> {
    let target = table.symbol_at(position)?;
    let edits: Vec<TextEdit> = table
        .all()
        .into_iter()
        .filter(|symbol| symbol.role != SymbolRole::Definition && symbol.name == target.name)
        .map(|symbol| TextEdit {
            range: to_lsp_range(symbol.range),
            new_text: new_name.to_string(),
        })
        .collect();
    if edits.is_empty() {
        return None;
    }

    let mut changes = HashMap::new();
    changes.insert(uri.clone(), edits);
    Some(WorkspaceEdit {
        changes: Some(changes),
        document_changes: None,
        change_annotations: None,
    })
}
