use std::path::PathBuf;

use thiserror::Error;

use crate::types::{Conflict, IriError};

/// Failures of the backing graph store: file IO and RDF syntax.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {}: {message}", .path.display())]
    Parse { path: PathBuf, message: String },

    #[error("Failed to serialize graph: {0}")]
    Serialize(String),

    #[error("Unsupported RDF format: {0}")]
    UnsupportedFormat(String),
}

/// Top-level error type for ontology access.
#[derive(Error, Debug)]
pub enum OntologyError {
    #[error("{kind} not found: {name}")]
    NotFound { kind: &'static str, name: String },

    #[error("Ambiguous name {name}: matches {}", .candidates.join(", "))]
    Ambiguous {
        name: String,
        candidates: Vec<String>,
    },

    #[error("Node {iri} is not a valid {expected}")]
    InvalidType { iri: String, expected: &'static str },

    #[error("Member {member} not found in list {list}")]
    MemberNotFound { list: String, member: String },

    #[error("Index {index} out of bounds for list {list} of length {len}")]
    IndexOutOfBounds {
        list: String,
        index: usize,
        len: usize,
    },

    #[error("Unknown namespace prefix: {0}")]
    UnknownPrefix(String),

    #[error("Invalid literal: {0}")]
    InvalidLiteral(String),

    #[error("Ontology has {} structural conflict(s)", .0.len())]
    StructuralConflict(Vec<Conflict>),

    #[error(transparent)]
    InvalidIri(#[from] IriError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl OntologyError {
    pub fn not_found(kind: &'static str, name: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            name: name.into(),
        }
    }

    /// True for the "nothing matched" outcome callers usually recover from.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

pub type Result<T> = std::result::Result<T, OntologyError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ConflictKind;

    #[test]
    fn not_found_message() {
        let err = OntologyError::not_found("class", "Animal");
        assert_eq!(err.to_string(), "class not found: Animal");
        assert!(err.is_not_found());
    }

    #[test]
    fn ambiguous_lists_candidates() {
        let err = OntologyError::Ambiguous {
            name: "Word".to_string(),
            candidates: vec!["http://a#Word".to_string(), "http://b#Word".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "Ambiguous name Word: matches http://a#Word, http://b#Word"
        );
        assert!(!err.is_not_found());
    }

    #[test]
    fn structural_conflict_counts() {
        let err = OntologyError::StructuralConflict(vec![Conflict::new(
            "http://ex#l",
            ConflictKind::Cycle,
            "loop",
        )]);
        assert_eq!(err.to_string(), "Ontology has 1 structural conflict(s)");
    }

    #[test]
    fn store_error_converts() {
        let err: OntologyError = StoreError::UnsupportedFormat("xyz".to_string()).into();
        assert!(matches!(err, OntologyError::Store(_)));
    }
}
