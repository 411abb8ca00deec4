use crate::error::{ContainerError, Result};
use serde::Deserialize;
use std::env;
use std::str::FromStr;

pub const ENV_MAX_RESOLUTION_DEPTH: &str = "SPRIG_MAX_RESOLUTION_DEPTH";
pub const ENV_EAGER_SINGLETONS: &str = "SPRIG_EAGER_SINGLETONS";

/// Container settings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ContainerConfig {
    /// Longest chain of nested creations before resolution gives up
    pub max_resolution_depth: usize,
    /// Create every shared, non-lazy bean while building the container
    pub eager_singletons: bool,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            max_resolution_depth: 64,
            eager_singletons: false,
        }
    }
}

impl ContainerConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()
    }

    /// Defaults overridden by `SPRIG_*` environment variables
    pub fn from_env() -> Result<Self> {
        Self::default().with_overrides(|key| env::var(key).ok())
    }

    /// Applies overrides read through `lookup`
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(depth) = parse_var(&lookup, ENV_MAX_RESOLUTION_DEPTH)? {
            self.max_resolution_depth = depth;
        }
        if let Some(eager) = parse_var(&lookup, ENV_EAGER_SINGLETONS)? {
            self.eager_singletons = eager;
        }
        self.validate()
    }

    fn validate(self) -> Result<Self> {
        if self.max_resolution_depth == 0 {
            return Err(ContainerError::Config(
                "max_resolution_depth must be at least 1".to_string(),
            ));
        }
        Ok(self)
    }
}

fn parse_var<T, F>(lookup: &F, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|raw| {
            raw.trim().parse::<T>().map_err(|_| {
                ContainerError::Config(format!("{} has an invalid value '{}'", key, raw))
            })
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_from_json_with_defaults() {
        let config = ContainerConfig::from_json(r#"{ "eager_singletons": true }"#).unwrap();
        assert!(config.eager_singletons);
        assert_eq!(config.max_resolution_depth, 64);
    }

    #[test]
    fn test_from_json_rejects_bad_input() {
        assert!(ContainerConfig::from_json(r#"{ "max_resolution_depth": 0 }"#).is_err());
        assert!(matches!(
            ContainerConfig::from_json(r#"{ "eager": true }"#),
            Err(ContainerError::Config(_))
        ));
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            (ENV_MAX_RESOLUTION_DEPTH, "8"),
            (ENV_EAGER_SINGLETONS, "true"),
        ]
        .into_iter()
        .collect();

        let config = ContainerConfig::default()
            .with_overrides(|key| vars.get(key).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.max_resolution_depth, 8);
        assert!(config.eager_singletons);

        let err = ContainerConfig::default()
            .with_overrides(|key| (key == ENV_EAGER_SINGLETONS).then(|| "maybe".to_string()))
            .unwrap_err();
        assert!(err.to_string().contains(ENV_EAGER_SINGLETONS));
    }
}
