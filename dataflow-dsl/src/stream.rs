//! `[name =] [:source >] app (| app)* [> :sink]`

use tracing::instrument;

use crate::app::{Grammar, is_name_char, parse_app};
use crate::cursor::Cursor;
use crate::error::Error;
use crate::model::{DestinationNode, NameNode, Span, StreamNode};

/// Parse one stream definition line.
///
/// # Errors
///
/// Returns the first syntax error found, positioned at a character offset of
/// `text`.
#[instrument(level = "trace")]
pub fn parse_stream(text: &str) -> Result<StreamNode, Error> {
    let mut cursor = Cursor::new(text, 0);
    cursor.skip_whitespace();
    let name = parse_name(&mut cursor);
    cursor.skip_whitespace();

    let start = cursor.pos();
    if cursor.is_eof() {
        return Err(Error::ExpectedAppName(start));
    }

    let mut source = None;
    let mut sink = None;
    let mut apps = Vec::new();

    if cursor.peek() == Some(':') {
        source = Some(parse_destination(&mut cursor)?);
        cursor.skip_whitespace();
        if !cursor.eat('>') {
            return Err(Error::ExpectedCharacter(cursor.pos(), '>'));
        }
        cursor.skip_whitespace();
    }

    if source.is_some() && cursor.peek() == Some(':') {
        // bridge, `:in > :out`
        sink = Some(parse_destination(&mut cursor)?);
    } else {
        loop {
            apps.push(parse_app(&mut cursor, Grammar::Stream)?);
            cursor.skip_whitespace();
            if cursor.at("||") {
                return Err(Error::DoublePipeInStream(cursor.pos()));
            }
            if !cursor.eat('|') {
                break;
            }
            cursor.skip_whitespace();
        }
        if cursor.eat('>') {
            cursor.skip_whitespace();
            sink = Some(parse_destination(&mut cursor)?);
        }
    }

    cursor.skip_whitespace();
    if let Some(found) = cursor.peek() {
        return Err(Error::UnexpectedCharacter(cursor.pos(), found));
    }

    let end = sink
        .as_ref()
        .map(|dest| dest.span.end)
        .or_else(|| apps.last().map(|app| app.span.end))
        .unwrap_or(start);
    let definition = cursor.slice(start, end);
    Ok(StreamNode {
        name,
        source,
        sink,
        apps,
        span: Span::new(start, end),
        definition,
    })
}

/// Consumes `name =` when present, otherwise leaves the cursor untouched.
fn parse_name(cursor: &mut Cursor) -> Option<NameNode> {
    let start = cursor.pos();
    let text = cursor.take_while(is_name_char);
    let end = cursor.pos();
    cursor.skip_whitespace();
    if !text.is_empty() && cursor.eat('=') {
        Some(NameNode {
            text,
            span: Span::new(start, end),
        })
    } else {
        cursor.reset(start);
        None
    }
}

fn parse_destination(cursor: &mut Cursor) -> Result<DestinationNode, Error> {
    if !cursor.eat(':') {
        return Err(Error::ExpectedCharacter(cursor.pos(), ':'));
    }
    let start = cursor.pos();
    let name = cursor.take_while(|c| is_name_char(c) || c == '.');
    if name.is_empty() {
        return Err(Error::ExpectedDestinationName(start));
    }
    Ok(DestinationNode {
        name,
        span: Span::new(start, cursor.pos()),
    })
}
