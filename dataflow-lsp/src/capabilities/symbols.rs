//! Document and workspace symbols from the symbol table

use tower_lsp::lsp_types::{DocumentSymbol, Location, SymbolInformation, SymbolKind, Url};

use crate::convert::to_lsp_range;
use crate::language::symbols::{Symbol, SymbolQuery, SymbolRole, SymbolTable};

#[must_use]
pub fn symbol_kind(role: SymbolRole) -> SymbolKind {
    match role {
        SymbolRole::Definition | SymbolRole::App => SymbolKind::CLASS,
        SymbolRole::DeclaredName | SymbolRole::MetadataName => SymbolKind::KEY,
        SymbolRole::Source | SymbolRole::Processor | SymbolRole::Sink | SymbolRole::TaskApp => {
            SymbolKind::METHOD
        }
        SymbolRole::Argument => SymbolKind::FIELD,
        SymbolRole::Reference => SymbolKind::PROPERTY,
        SymbolRole::AppUri => SymbolKind::CONSTRUCTOR,
        SymbolRole::AppMetadata => SymbolKind::EVENT,
    }
}

#[allow(deprecated)] // deprecated field but required by the type
fn to_document_symbol(symbol: &Symbol) -> DocumentSymbol {
    let children: Vec<_> = symbol.children.iter().map(to_document_symbol).collect();
    let range = to_lsp_range(symbol.range);
    DocumentSymbol {
        name: symbol.name.clone(),
        detail: Some(symbol.role.detail().to_string()),
        kind: symbol_kind(symbol.role),
        tags: None,
        deprecated: None,
        range,
        selection_range: range,
        children: (!children.is_empty()).then_some(children),
    }
}

/// Outline of one document.
#[must_use]
pub fn document_symbols(table: &SymbolTable) -> Vec<DocumentSymbol> {
    table.roots().map(to_document_symbol).collect()
}

/// Flat, filtered symbols of one document, children before parents.
#[must_use]
#[allow(deprecated)]
pub fn workspace_symbols(
    table: &SymbolTable,
    uri: &Url,
    query: &SymbolQuery,
) -> Vec<SymbolInformation> {
    table
        .query(query)
        .into_iter()
        .map(|symbol| SymbolInformation {
            name: symbol.name.clone(),
            kind: symbol_kind(symbol.role),
            tags: None,
            deprecated: None,
            location: Location {
                uri: uri.clone(),
                range: to_lsp_range(symbol.range),
            },
            container_name: Some(symbol.role.detail().to_string()),
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::indexing_slicing, clippy::expect_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::language::app::parse_manifest;
    use crate::language::delegate::DslParser;
    use crate::language::dialect::Dialect;
    use crate::language::segment::segment;
    use crate::text::TextDocument;

    fn table(text: &str) -> SymbolTable {
        let doc = TextDocument::new("file:///test.scdfs", 0, text);
        SymbolTable::build(&segment(&doc, &Dialect::STREAM, &DslParser))
    }

    #[test]
    fn nested_outline() {
        let symbols = document_symbols(&table("ticktock = time --fixed-delay=1 | log"));
        assert_eq!(symbols.len(), 1);
        let definition = &symbols[0];
        assert_eq!(definition.name, "ticktock");
        assert_eq!(definition.kind, SymbolKind::CLASS);
        assert_eq!(definition.detail.as_deref(), Some("dsl"));
        let children = definition.children.as_ref().expect("children");
        let names: Vec<_> = children
            .iter()
            .map(|child| (child.name.as_str(), child.detail.as_deref()))
            .collect();
        assert_eq!(
            names,
            [("ticktock", Some("name")), ("time", Some("source")), ("log", Some("sink"))]
        );
        let argument = &children[1].children.as_ref().expect("arguments")[0];
        assert_eq!(argument.name, "fixed-delay");
        assert_eq!(argument.kind, SymbolKind::FIELD);
        assert!(children[2].children.is_none());
    }

    #[test]
    fn workspace_query_by_role() {
        let uri = Url::parse("file:///test.scdfs").expect("uri");
        let table = table("s1 = http | filter | log\ns2 = time | log");
        let sinks = workspace_symbols(&table, &uri, &SymbolQuery::parse(Some(">lo")));
        assert_eq!(sinks.len(), 2);
        assert!(sinks.iter().all(|symbol| symbol.name == "log" && symbol.location.uri == uri));

        let sources = workspace_symbols(&table, &uri, &SymbolQuery::parse(Some("<")));
        let names: Vec<_> = sources.iter().map(|symbol| symbol.name.as_str()).collect();
        assert_eq!(names, ["http", "time"]);

        let text = workspace_symbols(&table, &uri, &SymbolQuery::parse(Some("FIL")));
        assert_eq!(text.len(), 1);
        assert_eq!(text[0].kind, SymbolKind::METHOD);
    }

    #[test]
    fn app_manifest_outline() {
        let doc = TextDocument::new(
            "file:///apps.scdfa",
            0,
            "sink.log=docker:springcloudstream/log-sink-rabbit:3.0.0\n\
             sink.log.metadata=maven://org.springframework.cloud.stream.app:log-sink-rabbit:jar:metadata:3.0.0",
        );
        let symbols = document_symbols(&SymbolTable::from_apps(&parse_manifest(&doc)));
        assert_eq!(symbols.len(), 1);
        assert_eq!(symbols[0].name, "log");
        let kinds: Vec<_> = symbols[0]
            .children
            .as_ref()
            .expect("children")
            .iter()
            .map(|child| child.kind)
            .collect();
        assert_eq!(kinds, [SymbolKind::CONSTRUCTOR, SymbolKind::EVENT]);
    }
}
