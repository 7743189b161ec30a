use serde::Serialize;

/// Half-open range of character offsets, `start..end`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    #[must_use]
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// An inline definition name, the text before `=`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NameNode {
    pub text: String,
    pub span: Span,
}

/// `--name=value`
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ArgumentNode {
    pub name: String,
    pub value: String,
    /// From the leading `--` to the end of the value.
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AppNode {
    pub label: Option<String>,
    pub name: String,
    pub name_span: Span,
    pub arguments: Vec<ArgumentNode>,
    /// From the label (or name) to the end of the last argument.
    pub span: Span,
}

/// A named destination such as `:orders` or the tap `:main.time`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DestinationNode {
    pub name: String,
    /// Span of the name, excluding the leading `:`.
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct StreamNode {
    pub name: Option<NameNode>,
    pub source: Option<DestinationNode>,
    pub sink: Option<DestinationNode>,
    pub apps: Vec<AppNode>,
    /// From the first element of the body to the end of the last one.
    pub span: Span,
    pub(crate) definition: String,
}

impl StreamNode {
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_ref().map(|name| name.text.as_str())
    }

    /// The body text, without the `name =` prefix.
    #[must_use]
    pub fn definition(&self) -> &str {
        &self.definition
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TaskNode {
    pub name: String,
    /// Every app in the composed task, in source order, splits flattened.
    pub apps: Vec<AppNode>,
    pub span: Span,
    pub(crate) definition: String,
}

impl TaskNode {
    #[must_use]
    pub fn definition(&self) -> &str {
        &self.definition
    }
}
