use std::path::Path;

use figment::providers::{Env, Format, Yaml};
use figment::Figment;
use schemars::{schema_for, JsonSchema};
use serde::{Deserialize, Serialize};

use super::logging::LoggingConfig;
use super::metrics::MetricsConfig;

/// Prefix of environment variables that override file settings,
/// e.g. `RPCMON_METRICS__NAMESPACE=edge`.
pub const ENV_PREFIX: &str = "RPCMON_";

/// A top-level enum for versioned configurations.
#[derive(Deserialize, Serialize, JsonSchema)]
#[serde(tag = "version")]
pub enum Config {
    #[serde(rename = "1.0.0")]
    ConfigV1(ConfigV1),
}

/// Main config for v1.0.0.
#[derive(Deserialize, Serialize, Debug, Clone, Default, JsonSchema)]
pub struct ConfigV1 {
    #[serde(default)]
    pub metrics: MetricsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Load config from a YAML file, with `RPCMON_`-prefixed environment
/// variables taking precedence.
pub fn load_config(path: impl AsRef<Path>) -> Result<ConfigV1, figment::Error> {
    extract(
        Figment::new()
            .merge(Yaml::file(path.as_ref()))
            .merge(Env::prefixed(ENV_PREFIX).split("__")),
    )
}

/// Parse config from YAML text, without environment overrides.
pub fn parse_config(yaml: &str) -> Result<ConfigV1, figment::Error> {
    extract(Figment::new().merge(Yaml::string(yaml)))
}

fn extract(figment: Figment) -> Result<ConfigV1, figment::Error> {
    let config = match figment.extract::<Config>()? {
        Config::ConfigV1(c) => c,
    };
    config.metrics.validate()?;
    Ok(config)
}

/// The JSON schema for the configuration.
pub fn config_schema() -> String {
    let schema = schema_for!(Config);
    serde_json::to_string_pretty(&schema).unwrap_or_default()
}
