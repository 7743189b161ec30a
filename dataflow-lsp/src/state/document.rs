//! Single document state

use tower_lsp::lsp_types::Url;

use crate::language::Language;
use crate::text::TextDocument;

/// An open document and the language it is served as.
#[derive(Debug)]
pub struct DocumentState {
    pub document: TextDocument,
    /// `None` for documents this server has nothing to say about.
    pub language: Option<Language>,
}

impl DocumentState {
    #[must_use]
    pub fn new(uri: &Url, language_id: &str, text: String, version: i32) -> Self {
        Self {
            document: TextDocument::new(uri.as_str(), version, text),
            language: Language::from_id(language_id).or_else(|| language_from_uri(uri)),
        }
    }

    /// Same language, new content.
    #[must_use]
    pub fn changed(&self, uri: &Url, text: String, version: i32) -> Self {
        Self {
            document: TextDocument::new(uri.as_str(), version, text),
            language: self.language,
        }
    }
}

/// Fallback on the file extension when the client sends an unknown id.
fn language_from_uri(uri: &Url) -> Option<Language> {
    let file = uri.path_segments()?.next_back()?;
    let (_, extension) = file.rsplit_once('.')?;
    Language::from_id(extension)
}
