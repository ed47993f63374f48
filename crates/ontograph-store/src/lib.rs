//! ontograph-store: the triple store behind the ontology connector.
//!
//! [`GraphStore`] is the contract the connector programs against: a handful of
//! triple-level primitives plus provided helpers for typed nodes, labels and
//! prefixes. [`MemoryStore`] is the indexed in-memory implementation, and the
//! [`io`] module loads and saves it in standard RDF syntaxes.

pub mod io;
pub mod memory;
pub mod namespaces;
pub mod store;
pub mod validate;

pub use io::{RdfFormat, SaveReport};
pub use memory::MemoryStore;
pub use namespaces::Namespaces;
pub use store::GraphStore;
