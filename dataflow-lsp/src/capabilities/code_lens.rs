//! Code lenses: one-click dataflow commands above blocks and definitions

use serde_json::Value;
use tower_lsp::lsp_types::{CodeLens, Command, Url};

use crate::convert::to_lsp_range;
use crate::error::Error;
use crate::language::app::AppEntry;
use crate::language::items::DefinitionItem;
use crate::params::{
    AppRegisterParams, AppUnregisterParams, CommandArguments, StreamCreateParams,
    StreamDeployParams, StreamNameParams, TaskCreateParams, TaskLaunchParams, TaskNameParams,
};
use crate::text::Range;

pub const STREAM_CREATE: &str = "vscode-spring-cloud-dataflow.streams.create";
pub const STREAM_DEPLOY: &str = "vscode-spring-cloud-dataflow.streams.deploy";
pub const STREAM_UNDEPLOY: &str = "vscode-spring-cloud-dataflow.streams.undeploy";
pub const STREAM_DESTROY: &str = "vscode-spring-cloud-dataflow.streams.destroy";
pub const TASK_CREATE: &str = "vscode-spring-cloud-dataflow.tasks.create";
pub const TASK_LAUNCH: &str = "vscode-spring-cloud-dataflow.tasks.launch";
pub const TASK_DESTROY: &str = "vscode-spring-cloud-dataflow.tasks.destroy";
pub const APP_REGISTER: &str = "vscode-spring-cloud-dataflow.apps.register";
pub const APP_UNREGISTER: &str = "vscode-spring-cloud-dataflow.apps.unregister";

fn lens(range: Range, title: &str, command: &str, arguments: Vec<Value>) -> CodeLens {
    CodeLens {
        range: to_lsp_range(range),
        command: Some(Command {
            title: title.to_string(),
            command: command.to_string(),
            arguments: Some(arguments),
        }),
        data: None,
    }
}

/// A deploy lens per deployment block, then create/destroy/deploy/undeploy on
/// each parsed definition line.
#[must_use]
pub fn stream_lenses(items: &[DefinitionItem]) -> Vec<CodeLens> {
    let mut lenses = Vec::new();
    for item in items {
        let name = item.definition_name();
        for block in &item.deployments {
            let params = StreamDeployParams {
                name: name.clone(),
                server: block.env_name().or_else(|| item.env_name()),
                properties: Some(block.property_map()),
            };
            lenses.push(lens(
                block.start_line_range,
                "Deploy Stream",
                STREAM_DEPLOY,
                params.arguments(),
            ));
        }

        let (Some(parsed), Some(range)) = (item.parsed(), item.definition_range) else {
            continue;
        };
        let server = item.env_name();
        let create = StreamCreateParams {
            name: name.clone(),
            server: server.clone(),
            description: item.description(),
            definition: parsed.definition().to_string(),
        };
        let target = StreamNameParams { name, server };
        let deploy = StreamDeployParams {
            name: target.name.clone(),
            server: target.server.clone(),
            properties: None,
        };
        lenses.push(lens(range, "Create Stream", STREAM_CREATE, create.arguments()));
        lenses.push(lens(range, "Destroy Stream", STREAM_DESTROY, target.arguments()));
        lenses.push(lens(range, "Deploy Stream", STREAM_DEPLOY, deploy.arguments()));
        lenses.push(lens(range, "Undeploy Stream", STREAM_UNDEPLOY, target.arguments()));
    }
    lenses
}

/// A launch lens per deployment block, then create/destroy/launch on each
/// parsed definition line.
#[must_use]
pub fn task_lenses(items: &[DefinitionItem]) -> Vec<CodeLens> {
    let mut lenses = Vec::new();
    for item in items {
        let name = item.definition_name();
        for block in &item.deployments {
            let params = TaskLaunchParams {
                name: name.clone(),
                server: block.env_name().or_else(|| item.env_name()),
                properties: block.property_map(),
                arguments: block.argument_values(),
            };
            lenses.push(lens(
                block.start_line_range,
                "Launch Task",
                TASK_LAUNCH,
                params.arguments(),
            ));
        }

        let (Some(parsed), Some(range)) = (item.parsed(), item.definition_range) else {
            continue;
        };
        let server = item.env_name();
        let create = TaskCreateParams {
            name: name.clone(),
            server: server.clone(),
            description: item.description(),
            definition: parsed.definition().to_string(),
        };
        let target = TaskNameParams { name, server };
        lenses.push(lens(range, "Create Task", TASK_CREATE, create.arguments()));
        lenses.push(lens(range, "Destroy Task", TASK_DESTROY, target.arguments()));
        lenses.push(lens(range, "Launch Task", TASK_LAUNCH, target.arguments()));
    }
    lenses
}

#[must_use]
pub fn app_lenses(entries: &[AppEntry]) -> Vec<CodeLens> {
    let mut lenses = Vec::new();
    for entry in entries {
        let Some(line) = entry.app.as_ref().or(entry.metadata.as_ref()) else {
            continue;
        };
        let register = AppRegisterParams {
            app_type: entry.app_type.clone(),
            name: entry.name.clone(),
            app_uri: entry.app.as_ref().map(|app| app.uri.clone()),
            metadata_uri: entry.metadata.as_ref().map(|metadata| metadata.uri.clone()),
        };
        let unregister = AppUnregisterParams {
            app_type: entry.app_type.clone(),
            name: entry.name.clone(),
            version: entry.version.clone(),
        };
        lenses.push(lens(
            line.key_range,
            "Register Application",
            APP_REGISTER,
            register.arguments(),
        ));
        lenses.push(lens(
            line.key_range,
            "Unregister Application",
            APP_UNREGISTER,
            unregister.arguments(),
        ));
    }
    lenses
}

/// Stream and environment named by a runtime document uri,
/// `scheme://ENV/streams/NAME.scdfsr`.
///
/// # Errors
///
/// Returns [`Error::RuntimeUri`] when the uri has no host or no stream segment.
pub fn runtime_target(uri: &Url) -> Result<StreamNameParams, Error> {
    let invalid = || Error::RuntimeUri(uri.to_string());
    let server = uri.host_str().ok_or_else(invalid)?.to_string();
    let file = uri
        .path_segments()
        .and_then(|mut segments| segments.nth(1))
        .filter(|file| !file.is_empty())
        .ok_or_else(invalid)?;
    let name = file.split('.').next().unwrap_or(file).to_string();
    Ok(StreamNameParams {
        name: Some(name),
        server: Some(server),
    })
}

/// Deploy and undeploy on each parsed definition of a deployed stream view.
///
/// # Errors
///
/// See [`runtime_target`].
pub fn runtime_lenses(items: &[DefinitionItem], uri: &Url) -> Result<Vec<CodeLens>, Error> {
    let target = runtime_target(uri)?;
    let arguments = target.arguments();
    Ok(items
        .iter()
        .filter(|item| item.parsed().is_some())
        .filter_map(|item| item.definition_range)
        .flat_map(|range| {
            [
                lens(range, "Deploy Stream", STREAM_DEPLOY, arguments.clone()),
                lens(range, "Undeploy Stream", STREAM_UNDEPLOY, arguments.clone()),
            ]
        })
        .collect())
}
