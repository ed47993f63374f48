//! Configuration for the ontograph command-line tool.

use serde::Deserialize;

use ontograph_core::ConnectorConfig;

/// Log output format.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Json,
    Pretty,
}

/// Top-level CLI configuration.
///
/// Loaded from `ontograph.toml` or `ONTOGRAPH__` environment variables
/// (e.g. `ONTOGRAPH__CONNECTOR__SHARED_READS=false`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CliConfig {
    /// Settings handed to every connector the CLI opens.
    #[serde(default)]
    pub connector: ConnectorConfig,

    #[serde(default)]
    pub log_format: LogFormat,
}

/// Load the configuration from `{file_prefix}.toml` (optional) and the
/// environment. Missing sections fall back to defaults.
pub fn load_config(file_prefix: &str) -> anyhow::Result<CliConfig> {
    let cfg = config::Config::builder()
        .add_source(config::File::with_name(file_prefix).required(false))
        .add_source(
            config::Environment::with_prefix("ONTOGRAPH")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    Ok(cfg.try_deserialize::<CliConfig>()?)
}
