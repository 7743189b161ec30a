//! The dataflow server, as seen by lenses, lint and completion.

use crate::environment::Environment;
use crate::error::Error;
use crate::params::{
    StreamCreateParams, StreamDeployParams, StreamNameParams, TaskCreateParams, TaskLaunchParams,
    TaskNameParams,
};

/// A completion proposal from the server.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Proposal {
    /// Full text the typed prefix would become.
    pub text: String,
    pub explanation: String,
}

/// Access to a dataflow server.
///
/// Implementations talk to the server named by `environment`; nothing in the
/// segmentation core calls them.
#[tower_lsp::async_trait]
pub trait DataflowOperations: Send + Sync {
    /// Completions for a partial stream definition.
    async fn stream_completions(
        &self,
        environment: &Environment,
        prefix: &str,
        detail_level: u32,
    ) -> Result<Vec<Proposal>, Error>;

    /// Completions for a partial task body.
    async fn task_completions(
        &self,
        environment: &Environment,
        prefix: &str,
        detail_level: u32,
    ) -> Result<Vec<Proposal>, Error>;

    /// Names of the registered task apps.
    async fn registered_task_apps(&self, environment: &Environment) -> Result<Vec<String>, Error>;

    async fn create_stream(
        &self,
        environment: &Environment,
        params: &StreamCreateParams,
    ) -> Result<(), Error>;

    async fn deploy_stream(
        &self,
        environment: &Environment,
        params: &StreamDeployParams,
    ) -> Result<(), Error>;

    async fn undeploy_stream(
        &self,
        environment: &Environment,
        params: &StreamNameParams,
    ) -> Result<(), Error>;

    async fn destroy_stream(
        &self,
        environment: &Environment,
        params: &StreamNameParams,
    ) -> Result<(), Error>;

    async fn create_task(
        &self,
        environment: &Environment,
        params: &TaskCreateParams,
    ) -> Result<(), Error>;

    async fn launch_task(
        &self,
        environment: &Environment,
        params: &TaskLaunchParams,
    ) -> Result<(), Error>;

    async fn destroy_task(
        &self,
        environment: &Environment,
        params: &TaskNameParams,
    ) -> Result<(), Error>;
}
