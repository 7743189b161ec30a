//! `flow (&& flow)*` where a flow is an app or a split `<seq || seq ...>`.

use tracing::instrument;

use crate::app::{Grammar, parse_app};
use crate::cursor::Cursor;
use crate::error::Error;
use crate::model::{AppNode, Span, TaskNode};

/// Parse a task body starting at character offset `start` of `text`.
///
/// Offsets in the returned node, and in errors, are relative to the start of
/// `text`, so a caller can hand over a whole line and skip a `name=` prefix.
///
/// # Errors
///
/// Returns the first syntax error found.
#[instrument(level = "trace")]
pub fn parse_task(name: &str, text: &str, start: usize) -> Result<TaskNode, Error> {
    let mut cursor = Cursor::new(text, start);
    cursor.skip_whitespace();
    let body_start = cursor.pos();
    if cursor.is_eof() {
        return Err(Error::ExpectedAppName(body_start));
    }

    let mut apps = Vec::new();
    let end = parse_sequence(&mut cursor, &mut apps)?;

    cursor.skip_whitespace();
    if cursor.at("||") {
        return Err(Error::DoublePipeOutsideSplit(cursor.pos()));
    }
    if let Some(found) = cursor.peek() {
        return Err(Error::UnexpectedCharacter(cursor.pos(), found));
    }

    Ok(TaskNode {
        name: name.to_string(),
        apps,
        span: Span::new(body_start, end),
        definition: cursor.slice(body_start, end),
    })
}

/// Returns the offset just past the last flow.
fn parse_sequence(cursor: &mut Cursor, apps: &mut Vec<AppNode>) -> Result<usize, Error> {
    loop {
        let end = parse_flow(cursor, apps)?;
        let before = cursor.pos();
        cursor.skip_whitespace();
        if cursor.eat_str("&&") {
            cursor.skip_whitespace();
            continue;
        }
        cursor.reset(before);
        return Ok(end);
    }
}

fn parse_flow(cursor: &mut Cursor, apps: &mut Vec<AppNode>) -> Result<usize, Error> {
    if !cursor.eat('<') {
        let app = parse_app(cursor, Grammar::Task)?;
        let end = app.span.end;
        apps.push(app);
        return Ok(end);
    }

    cursor.skip_whitespace();
    loop {
        parse_sequence(cursor, apps)?;
        cursor.skip_whitespace();
        if cursor.eat_str("||") {
            cursor.skip_whitespace();
            continue;
        }
        if cursor.eat('>') {
            return Ok(cursor.pos());
        }
        return Err(Error::ExpectedCharacter(cursor.pos(), '>'));
    }
}
