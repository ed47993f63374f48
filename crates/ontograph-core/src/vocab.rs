//! Well-known IRIs used by the connector.
//!
//! Besides the RDF, RDFS, OWL and XSD terms, this module defines the reserved
//! list vocabulary used to embed ordered collections in the graph:
//!
//! ```text
//! <descriptor> rdf:type ogl:OrderedList ; rdfs:label "name" ; ogl:head <l1> .
//! <l1> rdf:type ogl:Link ; ogl:value <member-a> ; ogl:next <l2> .
//! <l2> rdf:type ogl:Link ; ogl:value <member-b> .
//! ```

use crate::types::Iri;

pub const RDF_NS: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";
pub const RDFS_NS: &str = "http://www.w3.org/2000/01/rdf-schema#";
pub const OWL_NS: &str = "http://www.w3.org/2002/07/owl#";
pub const XSD_NS: &str = "http://www.w3.org/2001/XMLSchema#";
pub const LIST_NS: &str = "https://ontograph.dev/ns/list#";

// ── RDF / RDFS ──────────────────────────────────────────────────

pub const RDF_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";
pub const RDF_PROPERTY: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#Property";
pub const RDF_LANG_STRING: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#langString";
pub const RDFS_CLASS: &str = "http://www.w3.org/2000/01/rdf-schema#Class";
pub const RDFS_LABEL: &str = "http://www.w3.org/2000/01/rdf-schema#label";
pub const RDFS_SUB_CLASS_OF: &str = "http://www.w3.org/2000/01/rdf-schema#subClassOf";

// ── OWL ─────────────────────────────────────────────────────────

pub const OWL_CLASS: &str = "http://www.w3.org/2002/07/owl#Class";
pub const OWL_THING: &str = "http://www.w3.org/2002/07/owl#Thing";
pub const OWL_NAMED_INDIVIDUAL: &str = "http://www.w3.org/2002/07/owl#NamedIndividual";
pub const OWL_OBJECT_PROPERTY: &str = "http://www.w3.org/2002/07/owl#ObjectProperty";
pub const OWL_DATATYPE_PROPERTY: &str = "http://www.w3.org/2002/07/owl#DatatypeProperty";
pub const OWL_ANNOTATION_PROPERTY: &str = "http://www.w3.org/2002/07/owl#AnnotationProperty";
pub const OWL_ONTOLOGY: &str = "http://www.w3.org/2002/07/owl#Ontology";
pub const OWL_IMPORTS: &str = "http://www.w3.org/2002/07/owl#imports";

// ── XSD ─────────────────────────────────────────────────────────

pub const XSD_STRING: &str = "http://www.w3.org/2001/XMLSchema#string";
pub const XSD_BOOLEAN: &str = "http://www.w3.org/2001/XMLSchema#boolean";
pub const XSD_INTEGER: &str = "http://www.w3.org/2001/XMLSchema#integer";
pub const XSD_INT: &str = "http://www.w3.org/2001/XMLSchema#int";
pub const XSD_LONG: &str = "http://www.w3.org/2001/XMLSchema#long";
pub const XSD_SHORT: &str = "http://www.w3.org/2001/XMLSchema#short";

// ── Ordered lists ───────────────────────────────────────────────

/// Class of list descriptors.
pub const ORDERED_LIST: &str = "https://ontograph.dev/ns/list#OrderedList";
/// Class of the internal chain nodes.
pub const LINK: &str = "https://ontograph.dev/ns/list#Link";
/// Descriptor → first link.
pub const HEAD: &str = "https://ontograph.dev/ns/list#head";
/// Link → member.
pub const VALUE: &str = "https://ontograph.dev/ns/list#value";
/// Link → following link.
pub const NEXT: &str = "https://ontograph.dev/ns/list#next";

/// Prefixes registered in every fresh store.
pub const STANDARD_PREFIXES: [(&str, &str); 5] = [
    ("rdf", RDF_NS),
    ("rdfs", RDFS_NS),
    ("owl", OWL_NS),
    ("xsd", XSD_NS),
    ("ogl", LIST_NS),
];

/// Integer datatypes accepted when reading integer property values.
pub const INTEGER_DATATYPES: [&str; 4] = [XSD_INTEGER, XSD_INT, XSD_LONG, XSD_SHORT];

/// Build an [`Iri`] from one of the constants above.
pub fn iri(constant: &'static str) -> Iri {
    Iri::from_static(constant)
}
