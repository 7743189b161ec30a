//! Session environments and which one governs a position.

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::language::items::DefinitionItem;
use crate::text::Position;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

/// A dataflow server the editor can talk to.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Environment {
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub credentials: Credentials,
}

/// Payload of the `scdf/environment` notification.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentParams {
    #[serde(default)]
    pub environments: Vec<Environment>,
    #[serde(default)]
    pub default_environment: Option<String>,
    /// Accept any server certificate.
    #[serde(default)]
    pub trustssl: bool,
}

impl EnvironmentParams {
    #[must_use]
    pub fn environment(&self, name: &str) -> Option<&Environment> {
        self.environments.iter().find(|env| env.name == name)
    }

    /// Look up `name`, or the default environment when `name` is `None`.
    ///
    /// # Errors
    ///
    /// [`Error::NoEnvironment`] when neither is set and
    /// [`Error::UnknownEnvironment`] when the name is not configured.
    pub fn resolve(&self, name: Option<&str>) -> Result<&Environment, Error> {
        let name = name
            .or(self.default_environment.as_deref())
            .ok_or(Error::NoEnvironment)?;
        self.environment(name)
            .ok_or_else(|| Error::UnknownEnvironment(name.to_string()))
    }
}

/// The `@env` name declared for `position`, if any.
///
/// A deployment block's own env wins inside that block; elsewhere the
/// item's definition env applies.
#[must_use]
pub fn declared_environment(items: &[DefinitionItem], position: Position) -> Option<String> {
    let item = items.iter().find(|item| item.range.contains(position))?;
    item.deployments
        .iter()
        .find(|block| block.range.contains(position))
        .and_then(|block| block.env_name())
        .or_else(|| item.env_name())
}

/// Resolve the environment governing `position`, falling back to the
/// session default.
///
/// # Errors
///
/// See [`EnvironmentParams::resolve`].
pub fn environment_at<'a>(
    items: &[DefinitionItem],
    position: Position,
    params: &'a EnvironmentParams,
) -> Result<&'a Environment, Error> {
    params.resolve(declared_environment(items, position).as_deref())
}
