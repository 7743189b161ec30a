//! Apps and their `--name=value` arguments, shared by both grammars.

use crate::cursor::Cursor;
use crate::error::Error;
use crate::model::{AppNode, ArgumentNode, Span};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Grammar {
    Stream,
    Task,
}

impl Grammar {
    /// Characters that end an unquoted option value.
    fn ends_value(self, c: char) -> bool {
        c.is_whitespace()
            || match self {
                Self::Stream => c == '|',
                Self::Task => matches!(c, '|' | '&' | '>'),
            }
    }
}

pub(crate) fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '-' | '_')
}

fn is_option_char(c: char) -> bool {
    is_name_char(c) || c == '.'
}

/// `[label:] name (--option=value)*`
pub(crate) fn parse_app(cursor: &mut Cursor, grammar: Grammar) -> Result<AppNode, Error> {
    let start = cursor.pos();
    let first = cursor.take_while(is_name_char);
    if first.is_empty() {
        return Err(Error::ExpectedAppName(start));
    }

    let (label, name, name_span) = if cursor.peek() == Some(':') {
        cursor.bump();
        let name_start = cursor.pos();
        let name = cursor.take_while(is_name_char);
        if name.is_empty() {
            return Err(Error::ExpectedAppName(name_start));
        }
        (Some(first), name, Span::new(name_start, cursor.pos()))
    } else {
        (None, first, Span::new(start, cursor.pos()))
    };

    let mut arguments = Vec::new();
    loop {
        let before = cursor.pos();
        cursor.skip_whitespace();
        if cursor.at("--") {
            arguments.push(parse_argument(cursor, grammar)?);
        } else {
            cursor.reset(before);
            break;
        }
    }

    let end = arguments.last().map_or(name_span.end, |arg| arg.span.end);
    Ok(AppNode {
        label,
        name,
        name_span,
        arguments,
        span: Span::new(start, end),
    })
}

fn parse_argument(cursor: &mut Cursor, grammar: Grammar) -> Result<ArgumentNode, Error> {
    let start = cursor.pos();
    cursor.eat_str("--");
    let name = cursor.take_while(is_option_char);
    if name.is_empty() {
        return Err(Error::ExpectedOptionName(cursor.pos()));
    }
    if !cursor.eat('=') {
        return Err(Error::ExpectedCharacter(cursor.pos(), '='));
    }
    let value = parse_value(cursor, grammar, &name)?;
    Ok(ArgumentNode {
        name,
        value,
        span: Span::new(start, cursor.pos()),
    })
}

/// A quoted value keeps everything between the quotes; a doubled quote
/// stands for one literal quote.
fn parse_value(cursor: &mut Cursor, grammar: Grammar, option: &str) -> Result<String, Error> {
    match cursor.peek() {
        Some(quote @ ('"' | '\'')) => {
            let open = cursor.pos();
            cursor.bump();
            let mut value = String::new();
            loop {
                match cursor.bump() {
                    Some(c) if c == quote => {
                        if cursor.eat(quote) {
                            value.push(quote);
                        } else {
                            return Ok(value);
                        }
                    }
                    Some(c) => value.push(c),
                    None => return Err(Error::UnterminatedQuote(open)),
                }
            }
        }
        _ => {
            let position = cursor.pos();
            let value = cursor.take_while(|c| !grammar.ends_value(c));
            if value.is_empty() {
                Err(Error::MissingOptionValue(position, option.to_string()))
            } else {
                Ok(value)
            }
        }
    }
}
