//! Workspace-level state management

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use dashmap::mapref::one::Ref;
use tower_lsp::lsp_types::Url;

use crate::language::app::{AppEntry, parse_manifest};
use crate::language::cache::ItemCache;
use crate::language::delegate::{DefinitionParser, DslParser};
use crate::language::items::DefinitionItem;
use crate::language::segment::segment;
use crate::language::symbols::SymbolTable;
use crate::language::Language;
use crate::state::DocumentState;
use crate::text::Document;

/// Open documents plus their cached segmentation.
pub struct Workspace {
    /// Open documents: URI -> `DocumentState`
    documents: DashMap<Url, DocumentState>,
    cache: ItemCache,
    parser: Arc<dyn DefinitionParser>,
}

impl Workspace {
    #[must_use]
    pub fn new() -> Self {
        Self::with_parser(Arc::new(DslParser))
    }

    #[must_use]
    pub fn with_parser(parser: Arc<dyn DefinitionParser>) -> Self {
        Self {
            documents: DashMap::new(),
            cache: ItemCache::default(),
            parser,
        }
    }

    /// Update document on open
    pub fn update_document(&self, uri: Url, language_id: &str, text: String, version: i32) {
        let state = DocumentState::new(&uri, language_id, text, version);
        self.documents.insert(uri, state);
    }

    /// Replace the content of an open document, keeping its language.
    ///
    /// Unknown documents are opened with a language guessed from the uri.
    pub fn change_document(&self, uri: Url, text: String, version: i32) {
        let state = match self.documents.get(&uri) {
            Some(current) => current.changed(&uri, text, version),
            None => DocumentState::new(&uri, "", text, version),
        };
        self.documents.insert(uri, state);
    }

    /// Get a reference to a document's state
    #[must_use]
    pub fn get_document(&self, uri: &Url) -> Option<Ref<'_, Url, DocumentState>> {
        self.documents.get(uri)
    }

    /// Remove a document and its cached items
    pub fn remove_document(&self, uri: &Url) {
        self.documents.remove(uri);
        self.cache.invalidate(uri.as_str());
    }

    #[must_use]
    pub fn language(&self, uri: &Url) -> Option<Language> {
        self.documents.get(uri).and_then(|doc| doc.language)
    }

    #[must_use]
    pub fn uris(&self) -> Vec<Url> {
        self.documents.iter().map(|entry| entry.key().clone()).collect()
    }

    pub fn set_cache_idle(&self, idle: Duration) {
        self.cache.set_idle(idle);
    }

    /// Segmented items of a stream or task document, cached per version.
    #[must_use]
    pub fn items(&self, uri: &Url) -> Option<Arc<[DefinitionItem]>> {
        let doc = self.documents.get(uri)?;
        let dialect = doc.language?.dialect()?;
        let document = &doc.document;
        Some(self.cache.get_or_compute(document.uri(), document.version(), || {
            segment(document, &dialect, self.parser.as_ref())
        }))
    }

    /// Entries of an app manifest document.
    #[must_use]
    pub fn app_entries(&self, uri: &Url) -> Option<Vec<AppEntry>> {
        let doc = self.documents.get(uri)?;
        (doc.language? == Language::App).then(|| parse_manifest(&doc.document))
    }

    /// Symbols of any served document, built fresh on each call.
    #[must_use]
    pub fn symbol_table(&self, uri: &Url) -> Option<SymbolTable> {
        match self.language(uri)? {
            Language::App => self.app_entries(uri).map(|entries| SymbolTable::from_apps(&entries)),
            Language::Stream | Language::StreamRuntime | Language::Task => {
                self.items(uri).map(|items| SymbolTable::build(&items))
            }
        }
    }

    /// Drop cached items nobody has read within the idle window.
    pub fn evict_expired(&self) {
        self.cache.evict_expired(std::time::Instant::now());
    }
}

impl Default for Workspace {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use dataflow_dsl::{StreamNode, TaskNode};
    use pretty_assertions::assert_eq;

    use super::*;

    struct CountingParser(AtomicUsize);

    impl DefinitionParser for CountingParser {
        fn parse_stream(&self, text: &str) -> Result<StreamNode, dataflow_dsl::Error> {
            self.0.fetch_add(1, Ordering::SeqCst);
            dataflow_dsl::parse_stream(text)
        }

        fn parse_task(
            &self,
            name: &str,
            text: &str,
            start: usize,
        ) -> Result<TaskNode, dataflow_dsl::Error> {
            self.0.fetch_add(1, Ordering::SeqCst);
            dataflow_dsl::parse_task(name, text, start)
        }
    }

    fn uri(path: &str) -> Url {
        Url::parse(path).expect("uri")
    }

    #[test]
    fn items_are_cached_per_version() {
        let parser = Arc::new(CountingParser(AtomicUsize::new(0)));
        let workspace = Workspace::with_parser(parser.clone());
        let uri = uri("file:///a.scdfs");
        workspace.update_document(uri.clone(), "scdfs", "ticktock=time|log".to_string(), 1);

        let first = workspace.items(&uri).expect("items");
        let second = workspace.items(&uri).expect("items");
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(parser.0.load(Ordering::SeqCst), 1);

        workspace.change_document(uri.clone(), "ticktock=time|log".to_string(), 2);
        let third = workspace.items(&uri).expect("items");
        assert_eq!(parser.0.load(Ordering::SeqCst), 2);
        assert_eq!(first, third);
    }

    #[test]
    fn app_documents_are_not_segmented() {
        let workspace = Workspace::new();
        let uri = uri("file:///apps.scdfa");
        workspace.update_document(uri.clone(), "scdfa", "source.time=docker:time:1.0".to_string(), 1);
        assert!(workspace.items(&uri).is_none());
        assert_eq!(workspace.app_entries(&uri).map(|entries| entries.len()), Some(1));
        let table = workspace.symbol_table(&uri).expect("table");
        assert_eq!(table.roots().count(), 1);
    }

    #[test]
    fn closing_forgets_the_document() {
        let workspace = Workspace::new();
        let uri = uri("file:///a.scdft");
        workspace.update_document(uri.clone(), "scdft", "t1 = timestamp".to_string(), 1);
        assert_eq!(workspace.uris(), [uri.clone()]);
        assert!(workspace.items(&uri).is_some());
        workspace.remove_document(&uri);
        assert!(workspace.get_document(&uri).is_none());
        assert!(workspace.items(&uri).is_none());
        assert!(workspace.symbol_table(&uri).is_none());
    }
}
