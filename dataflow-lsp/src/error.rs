#[non_exhaustive]
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("environment '{0}' is not configured")]
    UnknownEnvironment(String),

    #[error("no environment selected and no default environment configured")]
    NoEnvironment,

    #[error("dataflow server request failed: {0}")]
    Operation(String),

    #[error("invalid runtime stream uri: {0}")]
    RuntimeUri(String),

    #[error("invalid parameters: {0}")]
    Json(#[from] serde_json::Error),
}
