//! Segmentation of definition documents into items, and the views built on
//! top of them.

pub mod app;
pub mod cache;
pub mod classify;
pub mod delegate;
pub mod dialect;
pub mod items;
pub mod segment;
pub mod symbols;

use dialect::Dialect;

/// The document languages served, keyed by editor language id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Language {
    /// `scdfs`
    Stream,
    /// `scdfsr`, a deployed stream opened from the runtime view.
    StreamRuntime,
    /// `scdft`
    Task,
    /// `scdfa`, an app import manifest.
    App,
}

impl Language {
    #[must_use]
    pub fn from_id(language_id: &str) -> Option<Self> {
        match language_id {
            "scdfs" => Some(Self::Stream),
            "scdfsr" => Some(Self::StreamRuntime),
            "scdft" => Some(Self::Task),
            "scdfa" => Some(Self::App),
            _ => None,
        }
    }

    #[must_use]
    pub fn id(self) -> &'static str {
        match self {
            Self::Stream => "scdfs",
            Self::StreamRuntime => "scdfsr",
            Self::Task => "scdft",
            Self::App => "scdfa",
        }
    }

    /// Segmentation dialect; app manifests are not segmented.
    #[must_use]
    pub fn dialect(self) -> Option<Dialect> {
        match self {
            Self::Stream | Self::StreamRuntime => Some(Dialect::STREAM),
            Self::Task => Some(Dialect::TASK),
            Self::App => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("scdfs", Some(Language::Stream))]
    #[case("scdfsr", Some(Language::StreamRuntime))]
    #[case("scdft", Some(Language::Task))]
    #[case("scdfa", Some(Language::App))]
    #[case("asciidoc", None)]
    fn language_ids(#[case] id: &str, #[case] expected: Option<Language>) {
        assert_eq!(Language::from_id(id), expected);
        if let Some(language) = expected {
            assert_eq!(language.id(), id);
        }
    }
}
