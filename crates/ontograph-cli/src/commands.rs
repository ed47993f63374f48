//! The CLI's commands. Each returns a report the binary prints as JSON.

use std::path::Path;

use serde::Serialize;

use ontograph_connector::{
    Conflict, ConnectorConfig, MemoryStore, OntologyConnector, OntologyStats, RdfFormat,
    SaveReport,
};

/// Open `path` with an optional explicit format.
pub fn open(
    path: &Path,
    format: Option<RdfFormat>,
    config: &ConnectorConfig,
) -> anyhow::Result<OntologyConnector> {
    let store = MemoryStore::load(path, format)?;
    Ok(OntologyConnector::with_config(store, config.clone()))
}

#[derive(Debug, Serialize)]
pub struct ValidateReport {
    pub path: String,
    pub valid: bool,
    pub conflicts: Vec<Conflict>,
}

pub fn validate(connector: &OntologyConnector, path: &Path) -> ValidateReport {
    let conflicts = connector.validate();
    tracing::info!(path = %path.display(), conflicts = conflicts.len(), "Validation finished");
    ValidateReport {
        path: path.display().to_string(),
        valid: conflicts.is_empty(),
        conflicts,
    }
}

pub fn stats(connector: &OntologyConnector) -> OntologyStats {
    connector.stats()
}

#[derive(Debug, Serialize)]
pub struct ListReport {
    pub iri: String,
    pub label: String,
    pub len: usize,
    pub members: Vec<String>,
}

/// The members of the list labelled `label`, or of every list when no label
/// is given.
pub fn list(connector: &OntologyConnector, label: Option<&str>) -> anyhow::Result<Vec<ListReport>> {
    let lists = match label {
        Some(label) => vec![connector.get_list(label)?],
        None => connector.lists(),
    };
    Ok(lists
        .iter()
        .map(|list| {
            let members: Vec<String> = list.iter().map(|n| n.iri.to_string()).collect();
            ListReport {
                iri: list.iri().to_string(),
                label: list.label().to_string(),
                len: members.len(),
                members,
            }
        })
        .collect())
}

/// Re-serialize `input` into `output`. The output format defaults to the one
/// its extension names.
pub fn convert(
    input: &Path,
    input_format: Option<RdfFormat>,
    output: &Path,
    output_format: Option<RdfFormat>,
    config: &ConnectorConfig,
) -> anyhow::Result<SaveReport> {
    let connector = open(input, input_format, config)?;
    let report = match output_format {
        Some(format) => connector.save_as(output, format)?,
        None => connector.save(output)?,
    };
    Ok(report)
}
