//! Store-level structural checks.
//!
//! These look only at raw triples. List-chain checks live with the list
//! engine in the connector crate.

use ontograph_core::vocab;
use ontograph_core::{Conflict, ConflictKind, Iri};

use crate::store::GraphStore;

/// Collect every store-level conflict. Each one is logged at `warn`.
pub fn store_conflicts<G: GraphStore + ?Sized>(store: &G) -> Vec<Conflict> {
    let mut conflicts = Vec::new();

    for triple in store.triples_matching(None, None, None) {
        if triple.subject.is_literal() {
            conflicts.push(Conflict::new(
                triple.subject.to_string(),
                ConflictKind::LiteralSubject,
                format!("literal used as subject of <{}>", triple.predicate),
            ));
        }
    }

    for property in store.instances_of(vocab::OWL_DATATYPE_PROPERTY) {
        if has_conflicting_kinds(store, &property) {
            conflicts.push(Conflict::new(
                property.as_str(),
                ConflictKind::ConflictingPropertyKinds,
                "declared both as datatype and object property",
            ));
        }
    }

    for conflict in &conflicts {
        tracing::warn!(
            subject = %conflict.subject,
            kind = ?conflict.kind,
            detail = %conflict.detail,
            "Structural conflict"
        );
    }
    conflicts
}

/// True when `iri` is a declared property of both incompatible kinds.
pub fn has_conflicting_kinds<G: GraphStore + ?Sized>(store: &G, iri: &Iri) -> bool {
    store.has_type(iri, vocab::OWL_DATATYPE_PROPERTY)
        && store.has_type(iri, vocab::OWL_OBJECT_PROPERTY)
}
