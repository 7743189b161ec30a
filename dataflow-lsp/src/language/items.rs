//! Segmented document model.

use std::collections::BTreeMap;

use dataflow_dsl::{StreamNode, TaskNode};

use super::dialect::Annotation;
use crate::text::{Position, Range, char_slice};

/// One recognized `@env`/`@name`/`@desc`/`@prop`/`@arg` line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MetadataItem {
    annotation: Annotation,
    range: Range,
    content_range: Range,
    text: String,
}

impl MetadataItem {
    /// `content_start` is the column of the annotation token.
    #[must_use]
    pub fn new(annotation: Annotation, line: usize, text: &str, content_start: usize) -> Self {
        let end = text.chars().count();
        Self {
            annotation,
            range: Range::on_line(line, 0, end),
            content_range: Range::on_line(line, content_start, end),
            text: text.to_string(),
        }
    }

    #[must_use]
    pub fn annotation(&self) -> Annotation {
        self.annotation
    }

    /// The whole line.
    #[must_use]
    pub fn range(&self) -> Range {
        self.range
    }

    /// From the annotation token to the end of the line.
    #[must_use]
    pub fn content_range(&self) -> Range {
        self.content_range
    }

    /// The whole line's text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    fn after_token(&self) -> String {
        let skip = self.content_range.start.character + self.annotation.token().len();
        char_slice(&self.text, skip, usize::MAX)
    }

    /// Text after the token, trimmed. `None` when nothing follows the token.
    #[must_use]
    pub fn value(&self) -> Option<String> {
        let after = self.after_token();
        let value = after.trim();
        (!value.is_empty()).then(|| value.to_string())
    }

    /// Exact span of [`value`](Self::value) on the line.
    #[must_use]
    pub fn value_range(&self) -> Option<Range> {
        let after = self.after_token();
        let value = after.trim();
        if value.is_empty() {
            return None;
        }
        let leading = after.chars().take_while(|c| c.is_whitespace()).count();
        let start =
            self.content_range.start.character + self.annotation.token().len() + leading;
        Some(Range::on_line(
            self.range.start.line,
            start,
            start + value.chars().count(),
        ))
    }

    /// `@prop key=value`, split on the first `=`.
    #[must_use]
    pub fn property(&self) -> Option<(String, String)> {
        let value = self.value()?;
        let (key, value) = value.split_once('=')?;
        let key = key.trim();
        (!key.is_empty()).then(|| (key.to_string(), value.trim().to_string()))
    }
}

/// A run of `@prop`/`@arg` lines describing one deployment of the definition
/// that follows.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeploymentBlock {
    pub env: Option<MetadataItem>,
    pub properties: Vec<MetadataItem>,
    pub arguments: Vec<MetadataItem>,
    pub range: Range,
    /// First line of the block, where its lens goes.
    pub start_line_range: Range,
}

impl DeploymentBlock {
    #[must_use]
    pub fn env_name(&self) -> Option<String> {
        self.env.as_ref().and_then(MetadataItem::value)
    }

    #[must_use]
    pub fn property_map(&self) -> BTreeMap<String, String> {
        self.properties
            .iter()
            .filter_map(MetadataItem::property)
            .collect()
    }

    #[must_use]
    pub fn argument_values(&self) -> Vec<String> {
        self.arguments
            .iter()
            .filter_map(MetadataItem::value)
            .collect()
    }
}

/// A positioned, per-item problem.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Problem {
    pub message: String,
    pub range: Range,
}

impl Problem {
    #[must_use]
    pub fn at(line: usize, character: usize, message: impl Into<String>) -> Self {
        let position = Position::new(line, character);
        Self {
            message: message.into(),
            range: Range::new(position, position),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DefinitionNode {
    Stream(StreamNode),
    Task(TaskNode),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParsedBody {
    pub node: DefinitionNode,
    /// Inline name, else the `@name` value.
    pub name: Option<String>,
    /// Where the inline name sits; `None` when the name came from metadata.
    pub name_range: Option<Range>,
    /// The body, without any `name =` prefix.
    pub range: Range,
}

impl ParsedBody {
    #[must_use]
    pub fn definition(&self) -> &str {
        match &self.node {
            DefinitionNode::Stream(node) => node.definition(),
            DefinitionNode::Task(node) => node.definition(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Body {
    Parsed(ParsedBody),
    Invalid(Problem),
    /// Metadata typed at the end of the document with no definition yet.
    Dangling,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DefinitionItem {
    /// From the first line after the previous item to the end of the
    /// definition line.
    pub range: Range,
    /// The definition line; `None` for a dangling item.
    pub definition_range: Option<Range>,
    pub env: Option<MetadataItem>,
    pub name: Option<MetadataItem>,
    pub desc: Option<MetadataItem>,
    pub deployments: Vec<DeploymentBlock>,
    pub comment_ranges: Vec<Range>,
    pub body: Body,
}

impl DefinitionItem {
    #[must_use]
    pub fn parsed(&self) -> Option<&ParsedBody> {
        match &self.body {
            Body::Parsed(parsed) => Some(parsed),
            Body::Invalid(_) | Body::Dangling => None,
        }
    }

    #[must_use]
    pub fn problem(&self) -> Option<&Problem> {
        match &self.body {
            Body::Invalid(problem) => Some(problem),
            Body::Parsed(_) | Body::Dangling => None,
        }
    }

    /// Parsed name, falling back to the `@name` value.
    #[must_use]
    pub fn definition_name(&self) -> Option<String> {
        self.parsed()
            .and_then(|parsed| parsed.name.clone())
            .or_else(|| self.name.as_ref().and_then(MetadataItem::value))
    }

    #[must_use]
    pub fn env_name(&self) -> Option<String> {
        self.env.as_ref().and_then(MetadataItem::value)
    }

    #[must_use]
    pub fn description(&self) -> Option<String> {
        self.desc.as_ref().and_then(MetadataItem::value)
    }

    /// Line of the definition, if there is one.
    #[must_use]
    pub fn line(&self) -> Option<usize> {
        self.definition_range.map(|range| range.start.line)
    }
}
