//! Scoped symbol tree built on demand from segmented items.

use dataflow_dsl::{AppNode, DestinationNode, StreamNode, TaskNode};

use super::app::AppEntry;
use super::items::{DefinitionItem, DefinitionNode, MetadataItem, ParsedBody};
use crate::text::{Position, Range};

pub const UNNAMED: &str = "[unnamed]";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SymbolRole {
    /// The whole definition body.
    Definition,
    /// Inline `name =` of a definition.
    DeclaredName,
    /// `@name` metadata value.
    MetadataName,
    Source,
    Processor,
    Sink,
    TaskApp,
    Argument,
    /// One half of a named destination such as `:main.time`.
    Reference,
    App,
    AppUri,
    AppMetadata,
}

impl SymbolRole {
    #[must_use]
    pub fn detail(self) -> &'static str {
        match self {
            Self::Definition => "dsl",
            Self::DeclaredName => "name",
            Self::MetadataName => "@name",
            Self::Source => "source",
            Self::Processor => "processor",
            Self::Sink => "sink",
            Self::TaskApp => "task",
            Self::Argument => "argument",
            Self::Reference => "ref",
            Self::App => "app",
            Self::AppUri => "uri",
            Self::AppMetadata => "metadata",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Symbol {
    pub name: String,
    pub role: SymbolRole,
    pub range: Range,
    pub children: Vec<Symbol>,
}

impl Symbol {
    fn leaf(name: impl Into<String>, role: SymbolRole, range: Range) -> Self {
        Self {
            name: name.into(),
            role,
            range,
            children: Vec::new(),
        }
    }

    fn walk<'a>(&'a self, out: &mut Vec<&'a Symbol>) {
        for child in &self.children {
            child.walk(out);
        }
        out.push(self);
    }
}

/// Top-level symbols contributed by one item or app entry.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Scope {
    pub symbols: Vec<Symbol>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SymbolTable {
    scopes: Vec<Scope>,
}

impl SymbolTable {
    /// One scope per item with a parsed body.
    #[must_use]
    pub fn build(items: &[DefinitionItem]) -> Self {
        let scopes = items
            .iter()
            .filter_map(|item| {
                let parsed = item.parsed()?;
                let line = item.line()?;
                Some(definition_scope(item, parsed, line))
            })
            .collect();
        Self { scopes }
    }

    #[must_use]
    pub fn from_apps(entries: &[AppEntry]) -> Self {
        let scopes = entries
            .iter()
            .filter_map(|entry| {
                let range = entry.app.as_ref().or(entry.metadata.as_ref())?.key_range;
                let mut children = Vec::new();
                if let Some(app) = &entry.app {
                    children.push(Symbol::leaf("uri", SymbolRole::AppUri, app.key_range));
                }
                if let Some(metadata) = &entry.metadata {
                    children.push(Symbol::leaf(
                        "metadata",
                        SymbolRole::AppMetadata,
                        metadata.key_range,
                    ));
                }
                Some(Scope {
                    symbols: vec![Symbol {
                        name: entry.name.clone(),
                        role: SymbolRole::App,
                        range,
                        children,
                    }],
                })
            })
            .collect();
        Self { scopes }
    }

    #[must_use]
    pub fn scopes(&self) -> &[Scope] {
        &self.scopes
    }

    /// Top-level symbols in source order.
    pub fn roots(&self) -> impl Iterator<Item = &Symbol> {
        self.scopes.iter().flat_map(|scope| &scope.symbols)
    }

    /// Every symbol, children before their parent.
    #[must_use]
    pub fn all(&self) -> Vec<&Symbol> {
        let mut out = Vec::new();
        for symbol in self.roots() {
            symbol.walk(&mut out);
        }
        out
    }

    #[must_use]
    pub fn query(&self, query: &SymbolQuery) -> Vec<&Symbol> {
        self.all()
            .into_iter()
            .filter(|symbol| query.matches(symbol))
            .collect()
    }

    /// Innermost non-definition symbol whose range contains `position`.
    #[must_use]
    pub fn symbol_at(&self, position: Position) -> Option<&Symbol> {
        self.all().into_iter().find(|symbol| {
            symbol.role != SymbolRole::Definition && symbol.range.contains(position)
        })
    }
}

fn definition_scope(item: &DefinitionItem, parsed: &ParsedBody, line: usize) -> Scope {
    let mut symbols = Vec::new();
    if let Some(symbol) = item.name.as_ref().and_then(metadata_name_symbol) {
        symbols.push(symbol);
    }

    let mut children = Vec::new();
    if let (Some(name), Some(range)) = (&parsed.name, parsed.name_range) {
        children.push(Symbol::leaf(name.clone(), SymbolRole::DeclaredName, range));
    }
    match &parsed.node {
        DefinitionNode::Stream(node) => stream_children(node, line, &mut children),
        DefinitionNode::Task(node) => task_children(node, line, &mut children),
    }

    symbols.push(Symbol {
        name: parsed.name.clone().unwrap_or_else(|| UNNAMED.to_string()),
        role: SymbolRole::Definition,
        range: parsed.range,
        children,
    });
    Scope { symbols }
}

fn metadata_name_symbol(item: &MetadataItem) -> Option<Symbol> {
    Some(Symbol::leaf(
        item.value()?,
        SymbolRole::MetadataName,
        item.value_range()?,
    ))
}

fn app_symbol(app: &AppNode, role: SymbolRole, line: usize) -> Symbol {
    Symbol {
        name: app.name.clone(),
        role,
        range: Range::on_line(line, app.span.start, app.span.end),
        children: app
            .arguments
            .iter()
            .map(|arg| {
                Symbol::leaf(
                    arg.name.clone(),
                    SymbolRole::Argument,
                    Range::on_line(line, arg.span.start, arg.span.end),
                )
            })
            .collect(),
    }
}

/// The first app is a source unless the stream reads from a destination.
/// The last app is always a sink, once it is not the source.
fn stream_children(node: &StreamNode, line: usize, out: &mut Vec<Symbol>) {
    let last = node.apps.len().saturating_sub(1);
    for (i, app) in node.apps.iter().enumerate() {
        let role = if i == 0 && node.source.is_none() {
            SymbolRole::Source
        } else if i == last {
            SymbolRole::Sink
        } else {
            SymbolRole::Processor
        };
        out.push(app_symbol(app, role, line));
    }
    for destination in [&node.source, &node.sink].into_iter().flatten() {
        out.extend(reference_symbols(destination, line));
    }
}

fn task_children(node: &TaskNode, line: usize, out: &mut Vec<Symbol>) {
    out.extend(
        node.apps
            .iter()
            .map(|app| app_symbol(app, SymbolRole::TaskApp, line)),
    );
}

/// `:main.time` refers to app `time` of stream `main`.
fn reference_symbols(destination: &DestinationNode, line: usize) -> Vec<Symbol> {
    let parts: Vec<&str> = destination.name.split('.').collect();
    let [head, tail] = parts.as_slice() else {
        return Vec::new();
    };
    let span = destination.span;
    let head_len = head.chars().count();
    let tail_len = tail.chars().count();
    vec![
        Symbol::leaf(
            *head,
            SymbolRole::Reference,
            Range::on_line(line, span.start, span.start + head_len),
        ),
        Symbol::leaf(
            *tail,
            SymbolRole::Reference,
            Range::on_line(line, span.end.saturating_sub(tail_len), span.end),
        ),
    ]
}

/// Filter for symbol queries.
///
/// `<foo`, `^foo`, `>foo` and `@foo` match sources, processors, sinks and
/// definitions whose name starts with `foo`; anything else is a
/// case-insensitive substring match.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SymbolQuery {
    All,
    Role { role: SymbolRole, prefix: String },
    Text(String),
}

impl SymbolQuery {
    #[must_use]
    pub fn parse(query: Option<&str>) -> Self {
        let Some(query) = query.map(str::trim).filter(|q| !q.is_empty()) else {
            return Self::All;
        };
        let mut chars = query.chars();
        let role = match chars.next() {
            Some('<') => SymbolRole::Source,
            Some('^') => SymbolRole::Processor,
            Some('>') => SymbolRole::Sink,
            Some('@') => SymbolRole::Definition,
            _ => return Self::Text(query.to_lowercase()),
        };
        Self::Role {
            role,
            prefix: chars.as_str().to_string(),
        }
    }

    #[must_use]
    pub fn matches(&self, symbol: &Symbol) -> bool {
        match self {
            Self::All => true,
            Self::Role { role, prefix } => {
                symbol.role == *role && symbol.name.starts_with(prefix.as_str())
            }
            Self::Text(text) => symbol.name.to_lowercase().contains(text.as_str()),
        }
    }
}
