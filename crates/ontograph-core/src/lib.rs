//! ontograph-core: Shared types, vocabulary, configuration, and error handling.
//!
//! This crate provides the foundational types used by every ontograph crate:
//! - IRIs, terms, literals and triples stored in the graph
//! - Node classification (class, individual, property) for resolved entities
//! - The reserved vocabulary used to embed ordered lists in the graph
//! - Structural conflicts reported by validation
//! - Connector configuration
//! - Common error types

pub mod config;
pub mod error;
pub mod types;
pub mod vocab;

pub use config::{AmbiguityPolicy, ConnectorConfig};
pub use error::{OntologyError, Result, StoreError};
pub use types::{
    Conflict, ConflictKind, Iri, IriError, Literal, Node, NodeKind, PropertyKind, Term, Triple,
};
