//! Server settings sent as `initializationOptions`.

use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;

use crate::environment::EnvironmentParams;
use crate::error::Error;

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerConfig {
    /// Seconds a segmented document stays cached without being read.
    pub cache_idle_seconds: u64,
    /// Initial environments, replaced by later `scdf/environment`
    /// notifications.
    pub environment: Option<EnvironmentParams>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            cache_idle_seconds: 60,
            environment: None,
        }
    }
}

impl ServerConfig {
    /// Defaults when the client sent no options.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`] when the options do not match the expected shape.
    pub fn from_initialization_options(options: Option<Value>) -> Result<Self, Error> {
        match options {
            None | Some(Value::Null) => Ok(Self::default()),
            Some(value) => Ok(serde_json::from_value(value)?),
        }
    }

    #[must_use]
    pub fn cache_idle(&self) -> Duration {
        Duration::from_secs(self.cache_idle_seconds)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn defaults_without_options() -> Result<(), Error> {
        assert_eq!(ServerConfig::from_initialization_options(None)?, ServerConfig::default());
        assert_eq!(
            ServerConfig::from_initialization_options(Some(json!({})))?.cache_idle(),
            Duration::from_secs(60)
        );
        Ok(())
    }

    #[test]
    fn reads_environment_and_idle_window() -> Result<(), Error> {
        let config = ServerConfig::from_initialization_options(Some(json!({
            "cacheIdleSeconds": 5,
            "environment": {"environments": [], "defaultEnvironment": "local"}
        })))?;
        assert_eq!(config.cache_idle_seconds, 5);
        assert_eq!(
            config.environment.and_then(|env| env.default_environment).as_deref(),
            Some("local")
        );
        Ok(())
    }

    #[test]
    fn rejects_wrong_shape() {
        let result = ServerConfig::from_initialization_options(Some(json!({"cacheIdleSeconds": "soon"})));
        assert!(matches!(result, Err(Error::Json(_))));
    }
}
