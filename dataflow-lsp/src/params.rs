//! Parameters of dataflow commands.
//!
//! Lenses carry them as positional command arguments; the matching
//! `scdf/*` notifications carry them as camelCase objects. `server` names the
//! environment to run against.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Positional command arguments, in the order the editor expects them.
pub trait CommandArguments {
    fn arguments(&self) -> Vec<Value>;
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamCreateParams {
    pub name: Option<String>,
    pub server: Option<String>,
    pub description: Option<String>,
    pub definition: String,
}

impl CommandArguments for StreamCreateParams {
    fn arguments(&self) -> Vec<Value> {
        vec![
            json!(self.name),
            json!(self.server),
            json!(self.description),
            json!(self.definition),
        ]
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamDeployParams {
    pub name: Option<String>,
    pub server: Option<String>,
    /// `None` deploys with the server defaults.
    #[serde(default)]
    pub properties: Option<BTreeMap<String, String>>,
}

impl CommandArguments for StreamDeployParams {
    fn arguments(&self) -> Vec<Value> {
        let mut arguments = vec![json!(self.name), json!(self.server)];
        if let Some(properties) = &self.properties {
            arguments.push(json!(properties));
        }
        arguments
    }
}

/// Undeploy and destroy only need the stream.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamNameParams {
    pub name: Option<String>,
    pub server: Option<String>,
}

impl CommandArguments for StreamNameParams {
    fn arguments(&self) -> Vec<Value> {
        vec![json!(self.name), json!(self.server)]
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskCreateParams {
    pub name: Option<String>,
    pub server: Option<String>,
    pub description: Option<String>,
    pub definition: String,
}

impl CommandArguments for TaskCreateParams {
    fn arguments(&self) -> Vec<Value> {
        vec![
            json!(self.name),
            json!(self.server),
            json!(self.description),
            json!(self.definition),
        ]
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskLaunchParams {
    pub name: Option<String>,
    #[serde(default)]
    pub server: Option<String>,
    #[serde(default)]
    pub properties: BTreeMap<String, String>,
    #[serde(default)]
    pub arguments: Vec<String>,
}

impl CommandArguments for TaskLaunchParams {
    fn arguments(&self) -> Vec<Value> {
        vec![
            json!(self.name),
            json!(self.server),
            json!(self.properties),
            json!(self.arguments),
        ]
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskNameParams {
    pub name: Option<String>,
    pub server: Option<String>,
}

impl CommandArguments for TaskNameParams {
    fn arguments(&self) -> Vec<Value> {
        vec![json!(self.name), json!(self.server)]
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppRegisterParams {
    pub app_type: String,
    pub name: String,
    pub app_uri: Option<String>,
    pub metadata_uri: Option<String>,
}

impl CommandArguments for AppRegisterParams {
    fn arguments(&self) -> Vec<Value> {
        vec![
            json!(self.app_type),
            json!(self.name),
            json!(self.app_uri),
            json!(self.metadata_uri),
        ]
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppUnregisterParams {
    pub app_type: String,
    pub name: String,
    pub version: String,
}

impl CommandArguments for AppUnregisterParams {
    fn arguments(&self) -> Vec<Value> {
        vec![json!(self.app_type), json!(self.name), json!(self.version)]
    }
}
