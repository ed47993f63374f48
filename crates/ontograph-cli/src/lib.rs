//! ontograph-cli: inspect, validate and convert ontology files.
//!
//! Each command opens a file through [`ontograph_connector::OntologyConnector`]
//! and produces a serializable report that the binary prints as JSON.

pub mod commands;
pub mod config;
