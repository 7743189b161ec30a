//! dataflow-lsp: Language Server Protocol implementation for dataflow
//! stream, task and app import documents
//!
//! Speaks LSP over stdio and provides:
//! - Diagnostics (definition syntax errors, missing names, unregistered task apps)
//! - Document and workspace symbols
//! - Code lenses for stream, task and app commands
//! - Folding, completion and rename

use clap::Parser;
use tower_lsp::{LspService, Server};
use tracing_subscriber::EnvFilter;

use dataflow_lsp::Backend;

#[derive(Parser, Debug)]
#[command(name = "dataflow-lsp", version, about)]
struct Args {
    /// Log filter used when `RUST_LOG` is not set
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Logs go to stderr since stdout is for LSP
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("Starting dataflow-lsp server");

    let stdin = tokio::io::stdin();
    let stdout = tokio::io::stdout();

    let (service, socket) = LspService::build(Backend::new)
        .custom_method("scdf/environment", Backend::environment)
        .custom_method("scdf/createStream", Backend::create_stream)
        .custom_method("scdf/deployStream", Backend::deploy_stream)
        .custom_method("scdf/undeployStream", Backend::undeploy_stream)
        .custom_method("scdf/destroyStream", Backend::destroy_stream)
        .custom_method("scdf/createTask", Backend::create_task)
        .custom_method("scdf/launchTask", Backend::launch_task)
        .custom_method("scdf/destroyTask", Backend::destroy_task)
        .finish();
    Server::new(stdin, stdout, socket).serve(service).await;
}
