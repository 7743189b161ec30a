//! Diagnostics: per-item problems plus stream and task lint
//!
//! Parse problems are errors at their position. Streams additionally warn
//! about a missing name; tasks are checked against the app registry of the
//! environment governing the definition, when one is reachable.

use std::collections::{HashMap, HashSet};

use tower_lsp::lsp_types::{Diagnostic, DiagnosticSeverity};

use crate::convert::to_lsp_range;
use crate::environment::{EnvironmentParams, environment_at};
use crate::language::items::{DefinitionItem, DefinitionNode};
use crate::operations::DataflowOperations;
use crate::text::Range;

pub const SOURCE: &str = "scdf";
pub const STREAM_NAME_MISSING: &str = "Stream name missing";

fn diagnostic(range: Range, severity: DiagnosticSeverity, message: String) -> Diagnostic {
    Diagnostic {
        range: to_lsp_range(range),
        severity: Some(severity),
        source: Some(SOURCE.to_string()),
        message,
        ..Default::default()
    }
}

/// One error per item whose body failed to parse.
#[must_use]
pub fn problem_diagnostics(items: &[DefinitionItem]) -> Vec<Diagnostic> {
    items
        .iter()
        .filter_map(DefinitionItem::problem)
        .map(|problem| {
            diagnostic(
                problem.range,
                DiagnosticSeverity::ERROR,
                problem.message.clone(),
            )
        })
        .collect()
}

#[must_use]
pub fn stream_diagnostics(items: &[DefinitionItem]) -> Vec<Diagnostic> {
    let mut diagnostics = problem_diagnostics(items);
    diagnostics.extend(
        items
            .iter()
            .filter(|item| item.parsed().is_some() && item.definition_name().is_none())
            .map(|item| {
                diagnostic(
                    item.range,
                    DiagnosticSeverity::WARNING,
                    STREAM_NAME_MISSING.to_string(),
                )
            }),
    );
    diagnostics
}

/// Problems plus the first unregistered app of each parsed task.
///
/// Registry lookups are made once per environment. A definition whose
/// environment cannot be resolved, or whose registry cannot be reached, is
/// not checked.
pub async fn task_diagnostics(
    items: &[DefinitionItem],
    operations: Option<&dyn DataflowOperations>,
    environments: &EnvironmentParams,
) -> Vec<Diagnostic> {
    let mut diagnostics = problem_diagnostics(items);
    let Some(operations) = operations else {
        return diagnostics;
    };

    let mut registered: HashMap<String, Option<HashSet<String>>> = HashMap::new();
    for item in items {
        let (Some(parsed), Some(range)) = (item.parsed(), item.definition_range) else {
            continue;
        };
        let DefinitionNode::Task(node) = &parsed.node else {
            continue;
        };
        let environment = match environment_at(items, range.start, environments) {
            Ok(environment) => environment,
            Err(error) => {
                tracing::debug!(%error, "skipping task registration check");
                continue;
            }
        };
        if !registered.contains_key(&environment.name) {
            let names = match operations.registered_task_apps(environment).await {
                Ok(names) => Some(names.into_iter().collect()),
                Err(error) => {
                    tracing::debug!(%error, environment = %environment.name, "task app registry unavailable");
                    None
                }
            };
            registered.insert(environment.name.clone(), names);
        }
        let Some(Some(names)) = registered.get(&environment.name) else {
            continue;
        };
        if let Some(app) = node.apps.iter().find(|app| !names.contains(&app.name)) {
            tracing::debug!(app = %app.name, "unregistered task app");
            diagnostics.push(diagnostic(
                range,
                DiagnosticSeverity::ERROR,
                format!("Task app {} is not registered", app.name),
            ));
        }
    }
    diagnostics
}

#[cfg(test)]
#[allow(clippy::indexing_slicing)]
mod tests {
    use pretty_assertions::assert_eq;
    use tracing_test::traced_test;

    use super::*;
    use crate::environment::{Credentials, Environment};
    use crate::language::delegate::{DslParser, MISSING_TASK_NAME};
    use crate::language::dialect::Dialect;
    use crate::language::segment::segment;
    use crate::operations::mock::MockOperations;
    use crate::text::{Position, TextDocument};

    fn items(text: &str, dialect: &Dialect) -> Vec<DefinitionItem> {
        segment(&TextDocument::new("file:///test", 0, text), dialect, &DslParser)
    }

    fn environments() -> EnvironmentParams {
        EnvironmentParams {
            environments: vec![Environment {
                name: "local".to_string(),
                url: "http://localhost:9393".to_string(),
                credentials: Credentials::default(),
            }],
            default_environment: Some("local".to_string()),
            trustssl: false,
        }
    }

    #[test]
    fn named_streams_are_clean() {
        assert!(stream_diagnostics(&items("ticktock=time|log", &Dialect::STREAM)).is_empty());
        assert!(stream_diagnostics(&items("-- @name main\ntime|log", &Dialect::STREAM)).is_empty());
    }

    #[test]
    fn unnamed_stream_warns_over_the_item() {
        let diagnostics = stream_diagnostics(&items("-- @prop a=b\ntime|log", &Dialect::STREAM));
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].message, STREAM_NAME_MISSING);
        assert_eq!(diagnostics[0].severity, Some(DiagnosticSeverity::WARNING));
        assert_eq!(diagnostics[0].range, to_lsp_range(Range::new(Position::new(0, 0), Position::new(1, 8))));
    }

    #[test]
    fn parse_error_is_positioned() {
        let diagnostics = stream_diagnostics(&items("ok=time|log\nbad = time || log", &Dialect::STREAM));
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].severity, Some(DiagnosticSeverity::ERROR));
        assert_eq!(diagnostics[0].source.as_deref(), Some(SOURCE));
        assert_eq!(diagnostics[0].range.start.line, 1);
    }

    #[tokio::test]
    async fn task_without_name_is_an_error() {
        let diagnostics = task_diagnostics(&items("timestamp", &Dialect::TASK), None, &environments()).await;
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].message, MISSING_TASK_NAME);
        assert_eq!(diagnostics[0].range, to_lsp_range(Range::on_line(0, 0, 0)));
    }

    #[tokio::test]
    async fn unregistered_task_app() {
        let ops = MockOperations::with_task_apps(&["timestamp"]);
        let diagnostics = task_diagnostics(
            &items("t1 = timestamp\nt2 = timestamp && other", &Dialect::TASK),
            Some(&ops),
            &environments(),
        )
        .await;
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].message, "Task app other is not registered");
        assert_eq!(diagnostics[0].range, to_lsp_range(Range::on_line(1, 0, 23)));
    }

    #[tokio::test]
    #[traced_test]
    async fn unreachable_registry_skips_the_check() {
        let ops = MockOperations::default();
        let diagnostics = task_diagnostics(
            &items("t1 = missing", &Dialect::TASK),
            Some(&ops),
            &environments(),
        )
        .await;
        assert!(diagnostics.is_empty());
        assert!(logs_contain("task app registry unavailable"));
    }
}
