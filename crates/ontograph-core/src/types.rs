//! Core domain types for the ontograph knowledge graph.
//!
//! The graph is a set of [`Triple`]s over [`Term`]s. Entities that callers
//! work with (classes, individuals, properties) are surfaced as a [`Node`]:
//! an IRI plus the [`NodeKind`] it was classified as at lookup time.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use oxrdf::NamedNode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::vocab;

// ── IRIs ──────────────────────────────────────────────────────────

/// Value object ensuring that supplied text is a valid IRI.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Iri(String);

impl Iri {
    /// Validate and construct a new IRI.
    pub fn new(value: impl Into<String>) -> Result<Self, IriError> {
        let value = value.into();
        NamedNode::new(value.as_str()).map_err(|_| IriError::Invalid {
            value: value.clone(),
        })?;
        Ok(Self(value))
    }

    /// Wrap a compile-time constant that is known to be a valid IRI.
    pub fn from_static(value: &'static str) -> Self {
        Self(value.to_string())
    }

    /// Wrap text produced by a trusted parser without re-validating it.
    pub fn new_unchecked(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Split point between namespace and local name: after the last `#`,
    /// otherwise after the last `/`, otherwise after the last `:`.
    fn split_index(&self) -> usize {
        self.0
            .rfind('#')
            .or_else(|| self.0.rfind('/'))
            .or_else(|| self.0.rfind(':'))
            .map(|i| i + 1)
            .unwrap_or(0)
    }

    /// The namespace part, including its trailing separator.
    pub fn namespace(&self) -> &str {
        &self.0[..self.split_index()]
    }

    /// The local name within the namespace.
    pub fn local_name(&self) -> &str {
        &self.0[self.split_index()..]
    }
}

impl Display for Iri {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Iri {
    type Err = IriError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for Iri {
    type Error = IriError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Iri> for String {
    fn from(iri: Iri) -> Self {
        iri.0
    }
}

/// Errors produced when validating an [`Iri`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IriError {
    #[error("Invalid IRI: {value}")]
    Invalid { value: String },
}

// ── Terms ─────────────────────────────────────────────────────────

/// A literal value with an optional language tag or datatype.
///
/// Plain strings carry neither; their datatype is `xsd:string`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Literal {
    value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    datatype: Option<Iri>,
}

impl Literal {
    pub fn simple(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            language: None,
            datatype: None,
        }
    }

    /// A language-tagged string. Tags are normalized to lowercase.
    pub fn lang(value: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            language: Some(language.into().to_ascii_lowercase()),
            datatype: None,
        }
    }

    /// A typed literal. `xsd:string` collapses to a simple literal.
    pub fn typed(value: impl Into<String>, datatype: Iri) -> Self {
        let datatype = (datatype.as_str() != vocab::XSD_STRING).then_some(datatype);
        Self {
            value: value.into(),
            language: None,
            datatype,
        }
    }

    pub fn integer(value: i64) -> Self {
        Self::typed(value.to_string(), vocab::iri(vocab::XSD_INTEGER))
    }

    pub fn boolean(value: bool) -> Self {
        Self::typed(value.to_string(), vocab::iri(vocab::XSD_BOOLEAN))
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    /// The datatype IRI as RDF 1.1 defines it.
    pub fn datatype(&self) -> &str {
        match (&self.datatype, &self.language) {
            (Some(dt), _) => dt.as_str(),
            (None, Some(_)) => vocab::RDF_LANG_STRING,
            (None, None) => vocab::XSD_STRING,
        }
    }

    /// Integer value for integer-typed or untyped numeric literals.
    pub fn as_i64(&self) -> Option<i64> {
        let numeric = match &self.datatype {
            Some(dt) => vocab::INTEGER_DATATYPES.contains(&dt.as_str()),
            None => self.language.is_none(),
        };
        if numeric {
            self.value.trim().parse().ok()
        } else {
            None
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self.value.trim() {
            "true" | "1" => Some(true),
            "false" | "0" => Some(false),
            _ => None,
        }
    }
}

impl Display for Literal {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.value)?;
        if let Some(lang) = &self.language {
            write!(f, "@{lang}")?;
        } else if let Some(dt) = &self.datatype {
            write!(f, "^^<{dt}>")?;
        }
        Ok(())
    }
}

/// Any position in a triple: a named resource, a blank node, or a literal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Term {
    Iri(Iri),
    Blank(String),
    Literal(Literal),
}

impl Term {
    pub fn as_iri(&self) -> Option<&Iri> {
        match self {
            Term::Iri(iri) => Some(iri),
            _ => None,
        }
    }

    pub fn as_literal(&self) -> Option<&Literal> {
        match self {
            Term::Literal(lit) => Some(lit),
            _ => None,
        }
    }

    pub fn is_literal(&self) -> bool {
        matches!(self, Term::Literal(_))
    }
}

impl From<Iri> for Term {
    fn from(iri: Iri) -> Self {
        Term::Iri(iri)
    }
}

impl From<&Iri> for Term {
    fn from(iri: &Iri) -> Self {
        Term::Iri(iri.clone())
    }
}

impl From<Literal> for Term {
    fn from(lit: Literal) -> Self {
        Term::Literal(lit)
    }
}

impl Display for Term {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Term::Iri(iri) => write!(f, "<{iri}>"),
            Term::Blank(id) => write!(f, "_:{id}"),
            Term::Literal(lit) => lit.fmt(f),
        }
    }
}

/// A single (subject, predicate, object) fact.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Triple {
    pub subject: Term,
    pub predicate: Iri,
    pub object: Term,
}

impl Triple {
    pub fn new(subject: impl Into<Term>, predicate: Iri, object: impl Into<Term>) -> Self {
        Self {
            subject: subject.into(),
            predicate,
            object: object.into(),
        }
    }
}

impl Display for Triple {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} <{}> {}", self.subject, self.predicate, self.object)
    }
}

// ── Nodes ─────────────────────────────────────────────────────────

/// Subtype of a property declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyKind {
    /// `owl:DatatypeProperty`: values are literals.
    Data,
    /// `owl:ObjectProperty`: values are individuals.
    Object,
    /// `owl:AnnotationProperty`.
    Annotation,
    /// Plain `rdf:Property`.
    Plain,
}

impl PropertyKind {
    /// The `rdf:type` object declaring this kind.
    pub fn type_iri(self) -> &'static str {
        match self {
            PropertyKind::Data => vocab::OWL_DATATYPE_PROPERTY,
            PropertyKind::Object => vocab::OWL_OBJECT_PROPERTY,
            PropertyKind::Annotation => vocab::OWL_ANNOTATION_PROPERTY,
            PropertyKind::Plain => vocab::RDF_PROPERTY,
        }
    }

    pub fn from_type_iri(iri: &str) -> Option<Self> {
        match iri {
            vocab::OWL_DATATYPE_PROPERTY => Some(PropertyKind::Data),
            vocab::OWL_OBJECT_PROPERTY => Some(PropertyKind::Object),
            vocab::OWL_ANNOTATION_PROPERTY => Some(PropertyKind::Annotation),
            vocab::RDF_PROPERTY => Some(PropertyKind::Plain),
            _ => None,
        }
    }

    /// Whether a property of this kind may be used where `wanted` is asked for.
    /// Plain `rdf:Property` lookups accept every property subtype.
    pub fn satisfies(self, wanted: PropertyKind) -> bool {
        wanted == PropertyKind::Plain || self == wanted
    }
}

/// Classification of a resource, computed once from its `rdf:type` edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "kind", content = "property")]
pub enum NodeKind {
    Class,
    Individual,
    Property(PropertyKind),
    Unknown,
}

impl NodeKind {
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Class => "class",
            NodeKind::Individual => "individual",
            NodeKind::Property(_) => "property",
            NodeKind::Unknown => "node",
        }
    }
}

/// A resolved graph entity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Node {
    pub iri: Iri,
    pub kind: NodeKind,
}

impl Node {
    pub fn new(iri: Iri, kind: NodeKind) -> Self {
        Self { iri, kind }
    }

    pub fn iri(&self) -> &Iri {
        &self.iri
    }

    pub fn term(&self) -> Term {
        Term::Iri(self.iri.clone())
    }

    pub fn is_class(&self) -> bool {
        self.kind == NodeKind::Class
    }

    pub fn is_individual(&self) -> bool {
        self.kind == NodeKind::Individual
    }

    pub fn property_kind(&self) -> Option<PropertyKind> {
        match self.kind {
            NodeKind::Property(kind) => Some(kind),
            _ => None,
        }
    }
}

impl Display for Node {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} <{}>", self.kind.name(), self.iri)
    }
}

// ── Validation ────────────────────────────────────────────────────

/// The kind of structural inconsistency found by validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictKind {
    /// A chain revisits one of its own links.
    Cycle,
    /// A `head` or `next` edge points at something that is not a link.
    BrokenChain,
    /// A link without a `value` edge.
    MissingValue,
    /// A link with more than one `value` edge.
    MultipleValues,
    /// A link with more than one `next` edge.
    MultipleSuccessors,
    /// A descriptor with more than one `head` edge.
    MultipleHeads,
    /// A link reachable from two heads or two predecessors.
    SharedLink,
    /// A link not reachable from any list.
    OrphanLink,
    /// Two list descriptors with the same label.
    DuplicateListLabel,
    /// A literal in subject position.
    LiteralSubject,
    /// A property declared with incompatible kinds (e.g. data and object).
    ConflictingPropertyKinds,
}

/// A structural problem reported by validation. Never auto-repaired.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conflict {
    pub subject: String,
    pub kind: ConflictKind,
    pub detail: String,
}

impl Conflict {
    pub fn new(subject: impl Into<String>, kind: ConflictKind, detail: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            kind,
            detail: detail.into(),
        }
    }
}

impl Display for Conflict {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} at {}: {}", self.kind, self.subject, self.detail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn iri(text: &str) -> Iri {
        Iri::new(text).unwrap()
    }

    #[test]
    fn accepts_valid_iri() {
        let iri = Iri::new("https://example.org/resource").unwrap();
        assert_eq!(iri.as_str(), "https://example.org/resource");
    }

    #[test]
    fn rejects_invalid_iri() {
        let err = Iri::new("not an iri").unwrap_err();
        assert!(matches!(err, IriError::Invalid { value } if value == "not an iri"));
    }

    #[test]
    fn splits_namespace_and_local_name() {
        let hash = iri("https://example.org/onto#Animal");
        assert_eq!(hash.namespace(), "https://example.org/onto#");
        assert_eq!(hash.local_name(), "Animal");

        let slash = iri("https://example.org/onto/Animal");
        assert_eq!(slash.namespace(), "https://example.org/onto/");
        assert_eq!(slash.local_name(), "Animal");

        let urn = iri("urn:animal");
        assert_eq!(urn.local_name(), "animal");
    }

    #[test]
    fn iri_serializes_as_string() {
        let json = serde_json::to_string(&iri("http://ex.org/a")).unwrap();
        assert_eq!(json, "\"http://ex.org/a\"");
        let back: Iri = serde_json::from_str(&json).unwrap();
        assert_eq!(back.as_str(), "http://ex.org/a");
        assert!(serde_json::from_str::<Iri>("\"no iri\"").is_err());
    }

    #[test]
    fn literal_datatypes() {
        assert_eq!(Literal::simple("x").datatype(), vocab::XSD_STRING);
        assert_eq!(Literal::lang("x", "EN").language(), Some("en"));
        assert_eq!(Literal::lang("x", "en").datatype(), vocab::RDF_LANG_STRING);
        assert_eq!(Literal::integer(4).datatype(), vocab::XSD_INTEGER);
        assert_eq!(
            Literal::typed("x", vocab::iri(vocab::XSD_STRING)),
            Literal::simple("x")
        );
    }

    #[test]
    fn literal_numeric_and_boolean_views() {
        assert_eq!(Literal::integer(-12).as_i64(), Some(-12));
        assert_eq!(Literal::simple("42").as_i64(), Some(42));
        assert_eq!(Literal::lang("42", "en").as_i64(), None);
        assert_eq!(Literal::typed("7", vocab::iri(vocab::XSD_INT)).as_i64(), Some(7));
        assert_eq!(Literal::boolean(true).as_bool(), Some(true));
        assert_eq!(Literal::simple("maybe").as_bool(), None);
    }

    #[test]
    fn term_display() {
        let t = Triple::new(
            iri("http://ex.org/a"),
            iri("http://ex.org/p"),
            Literal::lang("hi", "en"),
        );
        assert_eq!(t.to_string(), "<http://ex.org/a> <http://ex.org/p> \"hi\"@en");
        assert_eq!(Term::Blank("b0".to_string()).to_string(), "_:b0");
    }

    #[test]
    fn property_kind_satisfies() {
        assert!(PropertyKind::Data.satisfies(PropertyKind::Plain));
        assert!(PropertyKind::Data.satisfies(PropertyKind::Data));
        assert!(!PropertyKind::Object.satisfies(PropertyKind::Data));
        assert_eq!(
            PropertyKind::from_type_iri(vocab::OWL_OBJECT_PROPERTY),
            Some(PropertyKind::Object)
        );
        assert_eq!(PropertyKind::from_type_iri(vocab::OWL_CLASS), None);
    }

    #[test]
    fn node_kind_serialization() {
        let node = Node::new(iri("http://ex.org/p"), NodeKind::Property(PropertyKind::Data));
        let json = serde_json::to_string(&node).unwrap();
        assert!(json.contains("\"kind\":\"property\""));
        assert!(json.contains("\"property\":\"data\""));
        assert_eq!(node.property_kind(), Some(PropertyKind::Data));
        assert!(!node.is_class());
    }
}
