//! What distinguishes the stream and task languages during segmentation.

/// Metadata annotation tokens, in matching order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Annotation {
    Env,
    Name,
    Desc,
    Prop,
    Arg,
}

impl Annotation {
    pub const ALL: [Self; 5] = [Self::Env, Self::Name, Self::Desc, Self::Prop, Self::Arg];

    #[must_use]
    pub fn token(self) -> &'static str {
        match self {
            Self::Env => "@env",
            Self::Name => "@name",
            Self::Desc => "@desc",
            Self::Prop => "@prop",
            Self::Arg => "@arg",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DefinitionKind {
    Stream,
    Task,
}

/// Where a definition's inline name comes from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NameRule {
    /// The grammar parses `name =` itself.
    Grammar,
    /// A `name=` prefix is split off before the body is parsed.
    Prefix,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Dialect {
    kind: DefinitionKind,
    annotations: &'static [Annotation],
    name_rule: NameRule,
}

/// `name=` prefix of a task line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InlineName {
    pub name: String,
    /// Character columns of the trimmed name.
    pub start: usize,
    pub end: usize,
    /// First column after the `=`.
    pub body_start: usize,
}

impl Dialect {
    pub const STREAM: Self = Self {
        kind: DefinitionKind::Stream,
        annotations: &[
            Annotation::Env,
            Annotation::Name,
            Annotation::Desc,
            Annotation::Prop,
        ],
        name_rule: NameRule::Grammar,
    };

    pub const TASK: Self = Self {
        kind: DefinitionKind::Task,
        annotations: &Annotation::ALL,
        name_rule: NameRule::Prefix,
    };

    #[must_use]
    pub fn kind(&self) -> DefinitionKind {
        self.kind
    }

    #[must_use]
    pub fn name_rule(&self) -> NameRule {
        self.name_rule
    }

    #[must_use]
    pub fn allows(&self, annotation: Annotation) -> bool {
        self.annotations.contains(&annotation)
    }

    /// Split a `name=` prefix off a definition line.
    ///
    /// The name is a single word of letters, digits, `-` or `_`, optionally
    /// surrounded by whitespace. Anything else before the first `=` means the
    /// line has no inline name (`timestamp --format=x` is a body, not a name).
    #[must_use]
    pub fn inline_name(&self, line: &str) -> Option<InlineName> {
        if self.name_rule != NameRule::Prefix {
            return None;
        }
        let mut start = None;
        let mut end = 0;
        for (i, c) in line.chars().enumerate() {
            match c {
                '=' => {
                    let start = start?;
                    let name: String = line.chars().skip(start).take(end - start).collect();
                    return Some(InlineName {
                        name,
                        start,
                        end,
                        body_start: i + 1,
                    });
                }
                c if c.is_whitespace() => {}
                c if c.is_alphanumeric() || c == '-' || c == '_' => {
                    if start.is_some() && end < i {
                        // a second word
                        return None;
                    }
                    start.get_or_insert(i);
                    end = i + 1;
                }
                _ => return None,
            }
        }
        None
    }
}
