/// A syntax error, positioned at a character offset of the parsed text.
#[non_exhaustive]
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("expected app name, position {0}")]
    ExpectedAppName(usize),

    #[error("expected destination name after ':', position {0}")]
    ExpectedDestinationName(usize),

    #[error("expected '{1}', position {0}")]
    ExpectedCharacter(usize, char),

    #[error("unexpected character '{1}', position {0}")]
    UnexpectedCharacter(usize, char),

    #[error("expected option name after '--', position {0}")]
    ExpectedOptionName(usize),

    #[error("missing value for option '{1}', position {0}")]
    MissingOptionValue(usize, String),

    #[error("unterminated quoted value, position {0}")]
    UnterminatedQuote(usize),

    #[error("do not use || between source/processor/sink apps in a stream, position {0}")]
    DoublePipeInStream(usize),

    #[error("'||' is only allowed between the branches of a split '<...>', position {0}")]
    DoublePipeOutsideSplit(usize),
}

impl Error {
    /// Character offset the error refers to.
    #[must_use]
    pub fn position(&self) -> usize {
        match self {
            Self::ExpectedAppName(position)
            | Self::ExpectedDestinationName(position)
            | Self::ExpectedCharacter(position, _)
            | Self::UnexpectedCharacter(position, _)
            | Self::ExpectedOptionName(position)
            | Self::MissingOptionValue(position, _)
            | Self::UnterminatedQuote(position)
            | Self::DoublePipeInStream(position)
            | Self::DoublePipeOutsideSplit(position) => *position,
        }
    }
}
