//! Splits a stream or task document into [`DefinitionItem`]s.
//!
//! The scanner is a fold over lines: each line moves an explicit
//! [`ScanState`] forward, and [`Scanner::finish`] turns the final state into
//! the item list. Items come out in source order, as do the deployment blocks
//! and comment ranges inside them.

use std::mem;

use super::classify::{LineKind, classify, content_start};
use super::delegate::{DefinitionParser, delegate};
use super::dialect::{Annotation, Dialect};
use super::items::{Body, DefinitionItem, DeploymentBlock, MetadataItem};
use crate::text::{Document, Position, Range};

/// Everything accumulated since the previous definition line.
#[derive(Debug, Default)]
pub struct ScanState {
    /// First line of the item under construction.
    item_start: usize,
    env: Option<MetadataItem>,
    name: Option<MetadataItem>,
    desc: Option<MetadataItem>,
    /// Start of the first metadata line not yet consumed by a block or item.
    metadata_start: Option<Position>,
    properties: Vec<MetadataItem>,
    arguments: Vec<MetadataItem>,
    block_start: Option<Range>,
    block_end: Option<Position>,
    deployments: Vec<DeploymentBlock>,
    open_comment: Option<Range>,
    comment_ranges: Vec<Range>,
    items: Vec<DefinitionItem>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Close {
    /// The definition line keeps the env/name/desc holders for itself.
    AtDefinition,
    /// A separator line hands the holders to the block and drops them.
    AtSeparator,
}

impl ScanState {
    /// Items completed so far.
    #[must_use]
    pub fn items(&self) -> &[DefinitionItem] {
        &self.items
    }

    fn track_comment(&mut self, line_range: Range, is_comment: bool) {
        if is_comment {
            self.open_comment = Some(match self.open_comment {
                Some(open) => open.with_end(line_range.end),
                None => line_range,
            });
        } else if let Some(open) = self.open_comment.take() {
            self.comment_ranges.push(open);
        }
    }

    fn record_metadata(&mut self, item: MetadataItem, line_range: Range) {
        self.block_start.get_or_insert(line_range);
        self.metadata_start.get_or_insert(line_range.start);
        self.block_end = Some(line_range.end);
        match item.annotation() {
            Annotation::Env => self.env = Some(item),
            Annotation::Name => self.name = Some(item),
            Annotation::Desc => self.desc = Some(item),
            Annotation::Prop => self.properties.push(item),
            Annotation::Arg => self.arguments.push(item),
        }
    }

    /// Ends the open block. Blocks without props or args are dropped.
    fn close_block(&mut self, close: Close) {
        let start = self.block_start.take();
        let end = self.block_end.take();
        let properties = mem::take(&mut self.properties);
        let arguments = mem::take(&mut self.arguments);
        let (Some(start_line_range), Some(end)) = (start, end) else {
            return;
        };
        if properties.is_empty() && arguments.is_empty() {
            return;
        }
        let env = match close {
            Close::AtDefinition => self.env.clone(),
            Close::AtSeparator => {
                self.name = None;
                self.desc = None;
                self.metadata_start = None;
                self.env.take()
            }
        };
        self.deployments.push(DeploymentBlock {
            env,
            properties,
            arguments,
            range: Range::new(start_line_range.start, end),
            start_line_range,
        });
    }

    fn push_definition(&mut self, line_range: Range, body: Body) {
        self.items.push(DefinitionItem {
            range: Range::new(Position::new(self.item_start, 0), line_range.end),
            definition_range: Some(line_range),
            env: self.env.take(),
            name: self.name.take(),
            desc: self.desc.take(),
            deployments: mem::take(&mut self.deployments),
            comment_ranges: mem::take(&mut self.comment_ranges),
            body,
        });
        self.item_start = line_range.start.line + 1;
        self.metadata_start = None;
    }
}

/// Drives [`ScanState`] for one dialect.
pub struct Scanner<'a> {
    dialect: Dialect,
    parser: &'a dyn DefinitionParser,
}

impl<'a> Scanner<'a> {
    #[must_use]
    pub fn new(dialect: Dialect, parser: &'a dyn DefinitionParser) -> Self {
        Self { dialect, parser }
    }

    /// Advance over one line whose content is `text` and range `line_range`.
    #[must_use]
    pub fn step(&self, mut state: ScanState, text: &str, line_range: Range) -> ScanState {
        let line = line_range.start.line;
        let kind = classify(text, &self.dialect);
        let is_comment =
            !matches!(kind, LineKind::Metadata(_)) && text.trim_start().starts_with('#');
        state.track_comment(line_range, is_comment);

        match kind {
            LineKind::Definition => {
                state.close_block(Close::AtDefinition);
                let body = delegate(&self.dialect, line, text, state.name.as_ref(), self.parser);
                state.push_definition(line_range, body);
            }
            LineKind::Metadata(annotation) => {
                if let Some(start) = content_start(text) {
                    let item = MetadataItem::new(annotation, line, text, start);
                    state.record_metadata(item, line_range);
                }
            }
            LineKind::Comment => {}
            LineKind::Blank => state.close_block(Close::AtSeparator),
        }
        state
    }

    /// Close what is still open. Trailing env/name/desc metadata with no
    /// definition after it becomes a dangling item reaching `document_end`.
    /// Blocks never attach to a dangling item.
    #[must_use]
    pub fn finish(&self, mut state: ScanState, document_end: Position) -> Vec<DefinitionItem> {
        if let Some(open) = state.open_comment.take() {
            state.comment_ranges.push(open);
        }
        state.close_block(Close::AtDefinition);
        if state.env.is_some() || state.name.is_some() || state.desc.is_some() {
            let start = state
                .metadata_start
                .unwrap_or(Position::new(state.item_start, 0));
            state.items.push(DefinitionItem {
                range: Range::new(start, document_end),
                definition_range: None,
                env: state.env.take(),
                name: state.name.take(),
                desc: state.desc.take(),
                deployments: Vec::new(),
                comment_ranges: mem::take(&mut state.comment_ranges),
                body: Body::Dangling,
            });
        }
        state.items
    }
}

/// Segment a whole document.
#[must_use]
pub fn segment(
    document: &dyn Document,
    dialect: &Dialect,
    parser: &dyn DefinitionParser,
) -> Vec<DefinitionItem> {
    let scanner = Scanner::new(*dialect, parser);
    let state = (0..document.line_count()).fold(ScanState::default(), |state, line| {
        match (document.line_range(line), document.line(line)) {
            (Some(range), Some(text)) => scanner.step(state, &text, range),
            _ => state,
        }
    });
    let document_end = document
        .line_count()
        .checked_sub(1)
        .and_then(|last| document.line_range(last))
        .map_or_else(Position::default, |range| range.end);
    let items = scanner.finish(state, document_end);
    tracing::debug!(uri = document.uri(), items = items.len(), "segmented document");
    items
}

#[cfg(test)]
#[allow(clippy::indexing_slicing)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;
    use crate::language::delegate::{DslParser, MISSING_TASK_NAME};
    use crate::language::items::Problem;
    use crate::text::TextDocument;

    fn streams(text: &str) -> Vec<DefinitionItem> {
        segment(&TextDocument::new("file:///test.scdfs", 0, text), &Dialect::STREAM, &DslParser)
    }

    fn tasks(text: &str) -> Vec<DefinitionItem> {
        segment(&TextDocument::new("file:///test.scdft", 0, text), &Dialect::TASK, &DslParser)
    }

    #[test]
    fn single_named_stream() {
        let items = streams("ticktock=time|log");
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].range, Range::on_line(0, 0, 17));
        assert_eq!(items[0].definition_name().as_deref(), Some("ticktock"));
        assert!(items[0].deployments.is_empty());
    }

    #[test]
    fn one_property_block() {
        let items = streams("-- @prop foo=bar\nticktock1=time|log");
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].deployments.len(), 1);
        let block = &items[0].deployments[0];
        assert_eq!(block.properties.len(), 1);
        assert_eq!(block.properties[0].text(), "-- @prop foo=bar");
        assert_eq!(block.start_line_range, Range::on_line(0, 0, 16));
        assert_eq!(items[0].range, Range::new(Position::new(0, 0), Position::new(1, 18)));
    }

    #[test]
    fn metadata_only_document() {
        let items = streams("-- @name name\n-- @desc desc\n-- @env env1\n");
        assert_eq!(items.len(), 1);
        let item = &items[0];
        assert_eq!(item.body, Body::Dangling);
        assert!(item.deployments.is_empty());
        assert_eq!(item.range, Range::new(Position::new(0, 0), Position::new(3, 0)));
        assert_eq!(item.env_name().as_deref(), Some("env1"));
        assert_eq!(item.definition_name().as_deref(), Some("name"));
    }

    #[test]
    fn blocks_per_environment() {
        let items = streams(
            "-- @env env1\n-- @prop foo1=bar1\n\n-- @env env2\n-- @prop foo2=bar2\n\n\
             -- @name name1\n-- @desc desc1\ntime|log\n",
        );
        assert_eq!(items.len(), 1);
        let item = &items[0];
        assert_eq!(item.deployments.len(), 2);

        let first = &item.deployments[0];
        assert_eq!(first.range, Range::new(Position::new(0, 0), Position::new(1, 18)));
        assert_eq!(first.properties[0].range(), Range::on_line(1, 0, 18));
        assert_eq!(first.properties[0].content_range(), Range::on_line(1, 3, 18));
        let env = first.env.as_ref().map(|env| (env.range(), env.content_range()));
        assert_eq!(env, Some((Range::on_line(0, 0, 12), Range::on_line(0, 3, 12))));
        assert_eq!(item.deployments[1].env_name().as_deref(), Some("env2"));

        assert_eq!(item.definition_range, Some(Range::on_line(8, 0, 8)));
        assert_eq!(item.env, None);
        assert_eq!(item.definition_name().as_deref(), Some("name1"));
        assert_eq!(item.description().as_deref(), Some("desc1"));
    }

    #[test]
    fn short_marker_line_ends_a_block() {
        let items = streams(
            "-- @env env1\n-- @prop foo1=bar1\n--\n-- @prop foo1=bar1\n-- @prop foo2=bar2\n\n\
             -- @env env2\n-- @prop foo1=bar1\n-- @prop foo2=bar2\n-- @prop foo3=bar3\n\n\
             -- @env env3\n-- @name fooname\n-- @desc foodesc\nticktock1=time|log",
        );
        assert_eq!(items.len(), 1);
        let sizes: Vec<_> = items[0]
            .deployments
            .iter()
            .map(|block| block.properties.len())
            .collect();
        assert_eq!(sizes, [1, 2, 3]);
        assert_eq!(items[0].deployments[1].env, None);
        let env = items[0].env.as_ref().map(MetadataItem::range);
        assert_eq!(env, Some(Range::on_line(11, 0, 12)));
        let name = items[0].name.as_ref().map(MetadataItem::content_range);
        assert_eq!(name, Some(Range::on_line(12, 3, 16)));
    }

    #[test]
    fn comment_ranges_follow_their_item() {
        let items = streams(
            "#\n-- @env env1\n-- @prop foo1=bar1\n#\n-- @name name\n-- @desc desc\n-- @env env1\n\
             time|log\n#\n#\n\n-- @name name\n-- @desc desc\n-- @env env2\ntime|log\n",
        );
        assert_eq!(items.len(), 2);
        assert_eq!(
            items[0].comment_ranges,
            [Range::on_line(0, 0, 1), Range::on_line(3, 0, 1)]
        );
        assert_eq!(
            items[1].comment_ranges,
            [Range::new(Position::new(8, 0), Position::new(9, 1))]
        );
        assert_eq!(items[0].deployments.len(), 1);
        assert_eq!(items[1].range.start, Position::new(8, 0));
    }

    #[test]
    fn dangling_item_has_no_blocks() {
        let items = streams("-- @env e1\n-- @prop a=b\n\n-- @name later\n");
        assert_eq!(items.len(), 1);
        let item = &items[0];
        assert_eq!(item.body, Body::Dangling);
        assert!(item.deployments.is_empty());
        assert_eq!(item.range, Range::new(Position::new(3, 0), Position::new(4, 0)));
        assert_eq!(item.definition_name().as_deref(), Some("later"));
    }

    #[rstest]
    #[case("-- @env e1\n-- @prop a=b\n\n-- @name later\n")]
    #[case("-- @env e1\n-- @prop a=b\n")]
    #[case("-- @prop a=b\n\n-- @env e2\n-- @prop c=d\nticktock=time|log\n-- @prop e=f\n\n-- @desc d\n")]
    #[case("-- @env env1\n-- @prop foo1=bar1\n\n-- @env env2\n-- @prop foo2=bar2\n\ntime|log\n")]
    fn blocks_lie_inside_their_item(#[case] text: &str) {
        for item in streams(text) {
            for block in &item.deployments {
                assert!(
                    item.range.contains(block.range.start) && item.range.contains(block.range.end),
                    "block {:?} outside item {:?}",
                    block.range,
                    item.range
                );
            }
        }
    }

    #[test]
    fn long_comment_does_not_end_a_block() {
        let items = streams("-- @prop a=b\n-- a note\n-- @prop c=d\ntime|log");
        assert_eq!(items[0].deployments.len(), 1);
        assert_eq!(items[0].deployments[0].properties.len(), 2);
        assert!(items[0].comment_ranges.is_empty());
    }

    #[test]
    fn syntax_error_does_not_hide_neighbours() {
        let items = streams("stream1 = time|log\nbroken = time --x=|log\nstream3 = time|log");
        assert_eq!(items.len(), 3);
        assert!(items[0].parsed().is_some());
        assert_eq!(
            items[1].problem().map(|problem| problem.range),
            Some(Range::on_line(1, 18, 18))
        );
        assert_eq!(items[2].definition_name().as_deref(), Some("stream3"));
        assert_eq!(items[2].range.start, Position::new(2, 0));
    }

    #[test]
    fn item_ranges_increase() {
        let items = streams("\n\nstream1 = time|log\n\n-- @prop a=b\nstream2 = time|log\n-- @name x");
        let ranges: Vec<_> = items.iter().map(|item| item.range).collect();
        assert_eq!(
            ranges,
            [
                Range::new(Position::new(0, 0), Position::new(2, 18)),
                Range::new(Position::new(3, 0), Position::new(5, 18)),
                Range::new(Position::new(6, 0), Position::new(6, 10)),
            ]
        );
    }

    #[test]
    fn task_blocks_with_arguments() {
        let items = tasks(
            "-- @env env1\n-- @prop foo1=bar1\n-- @arg --foo1=bar1\n\n\
             -- @env env2\n-- @prop foo2=bar2\n-- @arg --foo2=bar2\n\n\
             -- @env env4\n-- @arg --foo4=bar4\n\n\
             -- @env env3\n-- @name name3\n-- @desc desc3\ntimestamp\n",
        );
        assert_eq!(items.len(), 1);
        let item = &items[0];
        let ranges: Vec<_> = item.deployments.iter().map(|block| block.range).collect();
        assert_eq!(
            ranges,
            [
                Range::new(Position::new(0, 0), Position::new(2, 19)),
                Range::new(Position::new(4, 0), Position::new(6, 19)),
                Range::new(Position::new(8, 0), Position::new(9, 19)),
            ]
        );
        assert_eq!(item.deployments[0].start_line_range, Range::on_line(0, 0, 12));
        assert_eq!(item.deployments[0].argument_values(), ["--foo1=bar1"]);
        assert!(item.deployments[2].properties.is_empty());
        assert_eq!(item.deployments[2].arguments.len(), 1);
        assert_eq!(item.definition_range, Some(Range::on_line(14, 0, 9)));
        assert_eq!(item.definition_name().as_deref(), Some("name3"));
        assert_eq!(item.env_name().as_deref(), Some("env3"));
    }

    #[test]
    fn task_without_any_name() {
        let items = tasks("timestamp\n");
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].parsed(), None);
        assert_eq!(items[0].problem(), Some(&Problem::at(0, 0, MISSING_TASK_NAME)));

        let incomplete = tasks("-- @name\ntimestamp");
        assert_eq!(incomplete[0].problem(), Some(&Problem::at(1, 0, MISSING_TASK_NAME)));
    }

    #[test]
    fn two_inline_task_names() {
        let names: Vec<_> = tasks("name1=timestamp\n\nname2=timestamp")
            .iter()
            .map(DefinitionItem::definition_name)
            .collect();
        assert_eq!(names, [Some("name1".to_string()), Some("name2".to_string())]);
    }

    #[test]
    fn empty_document() {
        assert!(streams("").is_empty());
        assert!(streams("\n\n").is_empty());
    }

    #[test]
    fn fold_can_be_driven_line_by_line() {
        let scanner = Scanner::new(Dialect::STREAM, &DslParser);
        let state = scanner.step(ScanState::default(), "-- @prop a=b", Range::on_line(0, 0, 12));
        assert!(state.items().is_empty());
        let state = scanner.step(state, "time|log", Range::on_line(1, 0, 8));
        assert_eq!(state.items().len(), 1);
        assert_eq!(state.items()[0].deployments.len(), 1);
    }
}
