//! Hands definition lines to the grammar and maps the outcome onto the line.

use dataflow_dsl::{Span, StreamNode, TaskNode};

use super::dialect::{DefinitionKind, Dialect};
use super::items::{Body, DefinitionNode, MetadataItem, ParsedBody, Problem};
use crate::text::Range;

pub const MISSING_TASK_NAME: &str = "Task Definition must have a name";

/// The grammar used for definition bodies.
///
/// Offsets in returned nodes and errors are character columns of `text`.
pub trait DefinitionParser: Send + Sync {
    /// # Errors
    ///
    /// Returns the positioned syntax error.
    fn parse_stream(&self, text: &str) -> Result<StreamNode, dataflow_dsl::Error>;

    /// Parse the task body of `text` starting at column `start`.
    ///
    /// # Errors
    ///
    /// Returns the positioned syntax error.
    fn parse_task(
        &self,
        name: &str,
        text: &str,
        start: usize,
    ) -> Result<TaskNode, dataflow_dsl::Error>;
}

/// [`DefinitionParser`] backed by `dataflow-dsl`.
#[derive(Clone, Copy, Debug, Default)]
pub struct DslParser;

impl DefinitionParser for DslParser {
    fn parse_stream(&self, text: &str) -> Result<StreamNode, dataflow_dsl::Error> {
        dataflow_dsl::parse_stream(text)
    }

    fn parse_task(
        &self,
        name: &str,
        text: &str,
        start: usize,
    ) -> Result<TaskNode, dataflow_dsl::Error> {
        dataflow_dsl::parse_task(name, text, start)
    }
}

fn span_on_line(line: usize, span: Span) -> Range {
    Range::on_line(line, span.start, span.end)
}

fn grammar_problem(line: usize, error: &dataflow_dsl::Error) -> Body {
    Body::Invalid(Problem::at(line, error.position(), error.to_string()))
}

/// Parse the definition on `line`, whose text is `text`.
pub fn delegate(
    dialect: &Dialect,
    line: usize,
    text: &str,
    name_item: Option<&MetadataItem>,
    parser: &dyn DefinitionParser,
) -> Body {
    let metadata_name = || name_item.and_then(MetadataItem::value);
    match dialect.kind() {
        DefinitionKind::Stream => match parser.parse_stream(text) {
            Ok(node) => {
                let name_range = node.name.as_ref().map(|name| span_on_line(line, name.span));
                let name = node.name().map(str::to_string).or_else(metadata_name);
                Body::Parsed(ParsedBody {
                    range: span_on_line(line, node.span),
                    name,
                    name_range,
                    node: DefinitionNode::Stream(node),
                })
            }
            Err(error) => grammar_problem(line, &error),
        },
        DefinitionKind::Task => {
            let (name, name_range, body_start) = match dialect.inline_name(text) {
                Some(inline) => (
                    Some(inline.name),
                    Some(Range::on_line(line, inline.start, inline.end)),
                    inline.body_start,
                ),
                None => (metadata_name(), None, 0),
            };
            let Some(name) = name else {
                return Body::Invalid(Problem::at(line, 0, MISSING_TASK_NAME));
            };
            match parser.parse_task(&name, text, body_start) {
                Ok(node) => Body::Parsed(ParsedBody {
                    range: span_on_line(line, node.span),
                    name: Some(name),
                    name_range,
                    node: DefinitionNode::Task(node),
                }),
                Err(error) => grammar_problem(line, &error),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::language::dialect::Annotation;

    /// Counts calls so tests can assert the grammar was skipped.
    #[derive(Default)]
    struct CountingParser(AtomicUsize);

    impl DefinitionParser for CountingParser {
        fn parse_stream(&self, text: &str) -> Result<StreamNode, dataflow_dsl::Error> {
            self.0.fetch_add(1, Ordering::SeqCst);
            DslParser.parse_stream(text)
        }

        fn parse_task(
            &self,
            name: &str,
            text: &str,
            start: usize,
        ) -> Result<TaskNode, dataflow_dsl::Error> {
            self.0.fetch_add(1, Ordering::SeqCst);
            DslParser.parse_task(name, text, start)
        }
    }

    #[test]
    fn stream_inline_name_wins() {
        let name = MetadataItem::new(Annotation::Name, 0, "-- @name other", 3);
        let body = delegate(&Dialect::STREAM, 1, "ticktock=time|log", Some(&name), &DslParser);
        let Body::Parsed(parsed) = &body else {
            unreachable!("expected a parsed body, got {body:?}");
        };
        assert_eq!(parsed.name.as_deref(), Some("ticktock"));
        assert_eq!(parsed.name_range, Some(Range::on_line(1, 0, 8)));
        assert_eq!(parsed.range, Range::on_line(1, 9, 17));
        assert_eq!(parsed.definition(), "time|log");
    }

    #[test]
    fn stream_falls_back_to_metadata_name() {
        let name = MetadataItem::new(Annotation::Name, 0, "-- @name name", 3);
        let body = delegate(&Dialect::STREAM, 1, "time|log", Some(&name), &DslParser);
        assert_eq!(
            body,
            Body::Parsed(ParsedBody {
                node: match DslParser.parse_stream("time|log") {
                    Ok(node) => DefinitionNode::Stream(node),
                    Err(error) => unreachable!("{error}"),
                },
                name: Some("name".to_string()),
                name_range: None,
                range: Range::on_line(1, 0, 8),
            })
        );
    }

    #[test]
    fn stream_error_is_positioned_on_the_line() {
        let body = delegate(&Dialect::STREAM, 4, "stream = :aaa > fff||bbb", None, &DslParser);
        let Body::Invalid(problem) = &body else {
            unreachable!("expected a problem, got {body:?}");
        };
        assert_eq!(problem.range, Range::on_line(4, 19, 19));
        assert!(
            problem
                .message
                .contains("do not use || between source/processor/sink apps in a stream")
        );
    }

    #[test]
    fn task_offsets_are_line_columns() {
        let body = delegate(&Dialect::TASK, 0, "name = timestamp", None, &DslParser);
        let Body::Parsed(parsed) = &body else {
            unreachable!("expected a parsed body, got {body:?}");
        };
        assert_eq!(parsed.name.as_deref(), Some("name"));
        assert_eq!(parsed.name_range, Some(Range::on_line(0, 0, 4)));
        assert_eq!(parsed.range, Range::on_line(0, 7, 16));
        assert_eq!(parsed.definition(), "timestamp");
    }

    #[test]
    fn task_metadata_name() {
        let name = MetadataItem::new(Annotation::Name, 0, "-- @name main", 3);
        let body = delegate(&Dialect::TASK, 1, "timestamp", Some(&name), &DslParser);
        assert!(
            matches!(
                &body,
                Body::Parsed(parsed)
                    if parsed.name.as_deref() == Some("main") && parsed.name_range.is_none()
            ),
            "{body:?}"
        );
    }

    #[test]
    fn task_without_name_skips_the_grammar() {
        let parser = CountingParser::default();
        let empty_name = MetadataItem::new(Annotation::Name, 0, "-- @name", 3);
        for name in [None, Some(&empty_name)] {
            let body = delegate(&Dialect::TASK, 1, "timestamp", name, &parser);
            assert_eq!(
                body,
                Body::Invalid(Problem::at(1, 0, "Task Definition must have a name"))
            );
        }
        assert_eq!(parser.0.load(Ordering::SeqCst), 0);
    }
}
