//! LSP backend implementation
//!
//! Contains the main `Backend` struct that implements the `LanguageServer`
//! trait, plus the `scdf/*` notifications registered in `main`.

use std::sync::Arc;

use tokio::sync::RwLock;
use tower_lsp::jsonrpc::{self, Result};
use tower_lsp::lsp_types::{
    CodeLens, CodeLensOptions, CodeLensParams, CompletionOptions, CompletionParams,
    CompletionResponse, DidChangeTextDocumentParams, DidCloseTextDocumentParams,
    DidOpenTextDocumentParams, DocumentSymbolParams, DocumentSymbolResponse, FoldingRange,
    FoldingRangeParams, FoldingRangeProviderCapability, InitializeParams, InitializeResult,
    InitializedParams, MessageType, OneOf, PrepareRenameResponse, RenameOptions, RenameParams,
    ServerCapabilities, ServerInfo, SymbolInformation, TextDocumentPositionParams,
    TextDocumentSyncCapability, TextDocumentSyncKind, Url, WorkDoneProgressOptions,
    WorkspaceEdit, WorkspaceSymbolParams,
};
use tower_lsp::{Client, LanguageServer};

use crate::capabilities::{code_lens, completion, diagnostics, folding, rename, symbols};
use crate::config::ServerConfig;
use crate::convert::from_lsp_position;
use crate::environment::{Environment, EnvironmentParams, environment_at};
use crate::error::Error;
use crate::language::Language;
use crate::language::symbols::{SymbolQuery, SymbolTable};
use crate::operations::DataflowOperations;
use crate::params::{
    StreamCreateParams, StreamDeployParams, StreamNameParams, TaskCreateParams, TaskLaunchParams,
    TaskNameParams,
};
use crate::state::Workspace;
use crate::text::Document;

/// LSP backend for stream, task and app documents
pub struct Backend {
    /// Client handle for sending messages back to the editor
    client: Client,
    workspace: Workspace,
    /// Replaced wholesale by `scdf/environment`.
    environment: RwLock<EnvironmentParams>,
    /// The dataflow server client; without one, lint skips the registry
    /// check and completion and commands do nothing.
    operations: Option<Arc<dyn DataflowOperations>>,
}

impl Backend {
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self::with_operations(client, None)
    }

    #[must_use]
    pub fn with_operations(
        client: Client,
        operations: Option<Arc<dyn DataflowOperations>>,
    ) -> Self {
        Self {
            client,
            workspace: Workspace::new(),
            environment: RwLock::new(EnvironmentParams::default()),
            operations,
        }
    }

    async fn publish_diagnostics(&self, uri: Url) {
        let Some(version) = self
            .workspace
            .get_document(&uri)
            .map(|doc| doc.document.version())
        else {
            return;
        };
        let items = self.workspace.items(&uri);
        let diagnostics = match (self.workspace.language(&uri), items) {
            (Some(Language::Stream | Language::StreamRuntime), Some(items)) => {
                diagnostics::stream_diagnostics(&items)
            }
            (Some(Language::Task), Some(items)) => {
                let environment = self.environment.read().await.clone();
                diagnostics::task_diagnostics(&items, self.operations.as_deref(), &environment)
                    .await
            }
            _ => Vec::new(),
        };
        self.client
            .publish_diagnostics(uri, diagnostics, Some(version))
            .await;
    }

    /// `scdf/environment`: replace the session environments and re-lint.
    pub async fn environment(&self, params: EnvironmentParams) {
        tracing::info!(
            environments = params.environments.len(),
            default = ?params.default_environment,
            "environment updated"
        );
        *self.environment.write().await = params;
        for uri in self.workspace.uris() {
            self.publish_diagnostics(uri).await;
        }
    }

    /// The client plus the environment a command runs against.
    async fn command_target(
        &self,
        command: &str,
        server: Option<&str>,
    ) -> Option<(Arc<dyn DataflowOperations>, Environment)> {
        let Some(operations) = self.operations.clone() else {
            tracing::warn!(command, "no dataflow server client, dropping command");
            return None;
        };
        let resolved = self.environment.read().await.resolve(server).cloned();
        match resolved {
            Ok(environment) => Some((operations, environment)),
            Err(error) => {
                tracing::warn!(command, %error, "dropping command");
                self.client
                    .show_message(MessageType::WARNING, format!("{command}: {error}"))
                    .await;
                None
            }
        }
    }

    async fn report(
        &self,
        command: &str,
        environment: &Environment,
        result: std::result::Result<(), Error>,
    ) {
        match result {
            Ok(()) => tracing::info!(command, environment = %environment.name, "command done"),
            Err(error) => {
                tracing::warn!(command, %error, "command failed");
                self.client
                    .show_message(MessageType::ERROR, format!("{command} failed: {error}"))
                    .await;
            }
        }
    }

    pub async fn create_stream(&self, params: StreamCreateParams) {
        const COMMAND: &str = "scdf/createStream";
        if let Some((operations, environment)) =
            self.command_target(COMMAND, params.server.as_deref()).await
        {
            let result = operations.create_stream(&environment, &params).await;
            self.report(COMMAND, &environment, result).await;
        }
    }

    pub async fn deploy_stream(&self, params: StreamDeployParams) {
        const COMMAND: &str = "scdf/deployStream";
        if let Some((operations, environment)) =
            self.command_target(COMMAND, params.server.as_deref()).await
        {
            let result = operations.deploy_stream(&environment, &params).await;
            self.report(COMMAND, &environment, result).await;
        }
    }

    pub async fn undeploy_stream(&self, params: StreamNameParams) {
        const COMMAND: &str = "scdf/undeployStream";
        if let Some((operations, environment)) =
            self.command_target(COMMAND, params.server.as_deref()).await
        {
            let result = operations.undeploy_stream(&environment, &params).await;
            self.report(COMMAND, &environment, result).await;
        }
    }

    pub async fn destroy_stream(&self, params: StreamNameParams) {
        const COMMAND: &str = "scdf/destroyStream";
        if let Some((operations, environment)) =
            self.command_target(COMMAND, params.server.as_deref()).await
        {
            let result = operations.destroy_stream(&environment, &params).await;
            self.report(COMMAND, &environment, result).await;
        }
    }

    pub async fn create_task(&self, params: TaskCreateParams) {
        const COMMAND: &str = "scdf/createTask";
        if let Some((operations, environment)) =
            self.command_target(COMMAND, params.server.as_deref()).await
        {
            let result = operations.create_task(&environment, &params).await;
            self.report(COMMAND, &environment, result).await;
        }
    }

    pub async fn launch_task(&self, params: TaskLaunchParams) {
        const COMMAND: &str = "scdf/launchTask";
        if let Some((operations, environment)) =
            self.command_target(COMMAND, params.server.as_deref()).await
        {
            let result = operations.launch_task(&environment, &params).await;
            self.report(COMMAND, &environment, result).await;
        }
    }

    pub async fn destroy_task(&self, params: TaskNameParams) {
        const COMMAND: &str = "scdf/destroyTask";
        if let Some((operations, environment)) =
            self.command_target(COMMAND, params.server.as_deref()).await
        {
            let result = operations.destroy_task(&environment, &params).await;
            self.report(COMMAND, &environment, result).await;
        }
    }

    fn symbol_table_at(&self, params: &TextDocumentPositionParams) -> Option<SymbolTable> {
        self.workspace.symbol_table(&params.text_document.uri)
    }
}

#[tower_lsp::async_trait]
impl LanguageServer for Backend {
    async fn initialize(&self, params: InitializeParams) -> Result<InitializeResult> {
        tracing::info!("Initializing dataflow-lsp");

        let config = ServerConfig::from_initialization_options(params.initialization_options)
            .map_err(|error| jsonrpc::Error::invalid_params(error.to_string()))?;
        self.workspace.set_cache_idle(config.cache_idle());
        if let Some(environment) = config.environment {
            *self.environment.write().await = environment;
        }

        Ok(InitializeResult {
            capabilities: ServerCapabilities {
                // Full sync - we get the complete document on each change
                text_document_sync: Some(TextDocumentSyncCapability::Kind(
                    TextDocumentSyncKind::FULL,
                )),
                document_symbol_provider: Some(OneOf::Left(true)),
                workspace_symbol_provider: Some(OneOf::Left(true)),
                code_lens_provider: Some(CodeLensOptions {
                    resolve_provider: Some(false),
                }),
                folding_range_provider: Some(FoldingRangeProviderCapability::Simple(true)),
                completion_provider: Some(CompletionOptions::default()),
                rename_provider: Some(OneOf::Right(RenameOptions {
                    prepare_provider: Some(true),
                    work_done_progress_options: WorkDoneProgressOptions::default(),
                })),
                ..Default::default()
            },
            server_info: Some(ServerInfo {
                name: "dataflow-lsp".to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
        })
    }

    async fn initialized(&self, _params: InitializedParams) {
        tracing::info!("dataflow-lsp initialized");
    }

    async fn shutdown(&self) -> Result<()> {
        tracing::info!("Shutting down dataflow-lsp");
        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let document = params.text_document;
        tracing::debug!(uri = %document.uri, language = %document.language_id, "document opened");

        self.workspace.update_document(
            document.uri.clone(),
            &document.language_id,
            document.text,
            document.version,
        );
        self.publish_diagnostics(document.uri).await;
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        let uri = params.text_document.uri;
        let version = params.text_document.version;

        // With FULL sync, we get the complete new text
        if let Some(change) = params.content_changes.into_iter().next() {
            tracing::debug!(%uri, version, "document changed");

            self.workspace
                .change_document(uri.clone(), change.text, version);
            self.workspace.evict_expired();
            self.publish_diagnostics(uri).await;
        }
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        let uri = params.text_document.uri;

        tracing::debug!(%uri, "document closed");

        self.workspace.remove_document(&uri);
        self.client.publish_diagnostics(uri, vec![], None).await;
    }

    async fn document_symbol(
        &self,
        params: DocumentSymbolParams,
    ) -> Result<Option<DocumentSymbolResponse>> {
        Ok(self
            .workspace
            .symbol_table(&params.text_document.uri)
            .map(|table| DocumentSymbolResponse::Nested(symbols::document_symbols(&table))))
    }

    async fn symbol(
        &self,
        params: WorkspaceSymbolParams,
    ) -> Result<Option<Vec<SymbolInformation>>> {
        let query = SymbolQuery::parse(Some(&params.query));
        let found: Vec<_> = self
            .workspace
            .uris()
            .into_iter()
            .filter_map(|uri| {
                let table = self.workspace.symbol_table(&uri)?;
                Some(symbols::workspace_symbols(&table, &uri, &query))
            })
            .flatten()
            .collect();
        tracing::debug!(query = %params.query, found = found.len(), "workspace symbols");
        Ok(Some(found))
    }

    async fn code_lens(&self, params: CodeLensParams) -> Result<Option<Vec<CodeLens>>> {
        let uri = params.text_document.uri;
        let lenses = match self.workspace.language(&uri) {
            Some(Language::Stream) => self
                .workspace
                .items(&uri)
                .map(|items| code_lens::stream_lenses(&items)),
            Some(Language::Task) => self
                .workspace
                .items(&uri)
                .map(|items| code_lens::task_lenses(&items)),
            Some(Language::App) => self
                .workspace
                .app_entries(&uri)
                .map(|entries| code_lens::app_lenses(&entries)),
            Some(Language::StreamRuntime) => {
                self.workspace
                    .items(&uri)
                    .and_then(|items| match code_lens::runtime_lenses(&items, &uri) {
                        Ok(lenses) => Some(lenses),
                        Err(error) => {
                            tracing::warn!(%error, "no runtime lenses");
                            None
                        }
                    })
            }
            None => None,
        };
        Ok(lenses)
    }

    async fn folding_range(&self, params: FoldingRangeParams) -> Result<Option<Vec<FoldingRange>>> {
        Ok(self
            .workspace
            .items(&params.text_document.uri)
            .map(|items| folding::compute_folding_ranges(&items)))
    }

    async fn completion(&self, params: CompletionParams) -> Result<Option<CompletionResponse>> {
        let uri = params.text_document_position.text_document.uri;
        let position = from_lsp_position(params.text_document_position.position);
        let Some(operations) = self.operations.clone() else {
            return Ok(None);
        };
        let Some(dialect) = self
            .workspace
            .language(&uri)
            .and_then(Language::dialect)
        else {
            return Ok(None);
        };
        let (Some(items), Some(line)) = (
            self.workspace.items(&uri),
            self.workspace
                .get_document(&uri)
                .and_then(|doc| doc.document.line(position.line)),
        ) else {
            return Ok(None);
        };
        let session = self.environment.read().await.clone();
        let environment = match environment_at(&items, position, &session) {
            Ok(environment) => environment.clone(),
            Err(error) => {
                tracing::debug!(%error, "no environment for completion");
                return Ok(None);
            }
        };

        match completion::complete(operations.as_ref(), &environment, &dialect, &line, position)
            .await
        {
            Ok(items) => Ok(Some(CompletionResponse::Array(items))),
            Err(error) => {
                tracing::debug!(%error, "completion failed");
                Ok(None)
            }
        }
    }

    async fn prepare_rename(
        &self,
        params: TextDocumentPositionParams,
    ) -> Result<Option<PrepareRenameResponse>> {
        let position = from_lsp_position(params.position);
        Ok(self
            .symbol_table_at(&params)
            .and_then(|table| rename::prepare_rename(&table, position)))
    }

    async fn rename(&self, params: RenameParams) -> Result<Option<WorkspaceEdit>> {
        let position_params = params.text_document_position;
        let position = from_lsp_position(position_params.position);
        Ok(self.symbol_table_at(&position_params).and_then(|table| {
            rename::compute_rename(
                &table,
                &position_params.text_document.uri,
                position,
                &params.new_name,
            )
        }))
    }
}
