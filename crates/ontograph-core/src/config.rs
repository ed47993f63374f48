//! Configuration for the ontology connector.
//!
//! Loaded by binaries from `ontograph.toml` `[connector]` section or
//! `ONTOGRAPH__CONNECTOR__` environment variables. Libraries take a
//! [`ConnectorConfig`] value directly.

use serde::Deserialize;

/// How the resolver treats a label that matches several nodes.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AmbiguityPolicy {
    /// Report `OntologyError::Ambiguous` with every candidate.
    #[default]
    Error,
    /// Pick the first match in store iteration order and log a warning.
    FirstMatch,
}

/// Top-level connector configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ConnectorConfig {
    /// Namespace new classes, individuals, properties and lists are minted in.
    #[serde(default = "default_base_namespace")]
    pub base_namespace: String,

    /// Prefix bound to `base_namespace` (empty string is the `:` prefix).
    #[serde(default)]
    pub base_prefix: String,

    /// Let read operations share the store concurrently. When false, every
    /// operation takes the exclusive lock.
    #[serde(default = "default_true")]
    pub shared_reads: bool,

    /// Label resolution policy when more than one node matches.
    #[serde(default)]
    pub ambiguity: AmbiguityPolicy,

    /// Language tag attached to labels the connector writes.
    #[serde(default)]
    pub label_language: Option<String>,
}

fn default_base_namespace() -> String {
    "https://ontograph.dev/ontology#".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for ConnectorConfig {
    fn default() -> Self {
        Self {
            base_namespace: default_base_namespace(),
            base_prefix: String::new(),
            shared_reads: default_true(),
            ambiguity: AmbiguityPolicy::default(),
            label_language: None,
        }
    }
}

impl ConnectorConfig {
    /// Configuration with a different base namespace and defaults otherwise.
    pub fn with_base_namespace(namespace: impl Into<String>) -> Self {
        Self {
            base_namespace: namespace.into(),
            ..Default::default()
        }
    }
}
