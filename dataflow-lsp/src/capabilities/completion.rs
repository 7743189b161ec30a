//! Completion: proposals from the dataflow server for the typed prefix

use tower_lsp::lsp_types::{
    CompletionItem, CompletionTextEdit, Documentation, MarkupContent, MarkupKind, TextEdit,
};

use crate::convert::to_lsp_range;
use crate::environment::Environment;
use crate::error::Error;
use crate::language::dialect::{DefinitionKind, Dialect};
use crate::operations::{DataflowOperations, Proposal};
use crate::text::{Position, Range, char_slice};

const DETAIL_LEVEL: u32 = 1;

/// The part of `proposal` not already typed.
///
/// Only the typed text up to its last whitespace counts, so the word being
/// typed stays in the label.
#[must_use]
pub fn result_label(prefix: &str, proposal: &str) -> String {
    let typed: Vec<char> = prefix.chars().collect();
    let start = (1..typed.len())
        .rev()
        .find(|&i| typed.get(i).is_some_and(|c| c.is_whitespace()))
        .map_or(0, |i| i + 1);
    let common = typed
        .iter()
        .take(start)
        .zip(proposal.chars())
        .take_while(|(typed, proposed)| **typed == *proposed)
        .count();
    proposal.chars().skip(common).collect()
}

fn completion_item(edit_range: Range, sent: &str, lead: &str, proposal: Proposal) -> CompletionItem {
    let new_text = format!("{lead}{}", proposal.text);
    CompletionItem {
        label: result_label(sent, &proposal.text),
        documentation: Some(Documentation::MarkupContent(MarkupContent {
            kind: MarkupKind::PlainText,
            value: proposal.explanation,
        })),
        filter_text: Some(new_text.clone()),
        text_edit: Some(CompletionTextEdit::Edit(TextEdit {
            range: to_lsp_range(edit_range),
            new_text,
        })),
        ..CompletionItem::default()
    }
}

/// Complete `line` at `position` against `environment`.
///
/// Task lines send only the text after an inline `name =`; the name part is
/// put back in front of every inserted proposal.
///
/// # Errors
///
/// Propagates failures of the operations client.
pub async fn complete(
    operations: &dyn DataflowOperations,
    environment: &Environment,
    dialect: &Dialect,
    line: &str,
    position: Position,
) -> Result<Vec<CompletionItem>, Error> {
    let prefix = char_slice(line, 0, position.character);
    let edit_range = Range::on_line(position.line, 0, position.character);

    let (lead, sent, proposals) = match dialect.kind() {
        DefinitionKind::Stream => {
            let proposals = operations
                .stream_completions(environment, &prefix, DETAIL_LEVEL)
                .await?;
            (String::new(), prefix, proposals)
        }
        DefinitionKind::Task => {
            let body_start = dialect.inline_name(&prefix).map_or(0, |inline| {
                inline.body_start
                    + prefix
                        .chars()
                        .skip(inline.body_start)
                        .take_while(|c| c.is_whitespace())
                        .count()
            });
            let lead = char_slice(&prefix, 0, body_start);
            let sent = char_slice(&prefix, body_start, usize::MAX);
            let proposals = operations
                .task_completions(environment, &sent, DETAIL_LEVEL)
                .await?;
            (lead, sent, proposals)
        }
    };
    tracing::debug!(count = proposals.len(), "completion proposals");

    Ok(proposals
        .into_iter()
        .map(|proposal| completion_item(edit_range, &sent, &lead, proposal))
        .collect())
}
