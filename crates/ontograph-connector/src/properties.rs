//! Property declarations and property values.

use serde::{Deserialize, Serialize};

use ontograph_core::{Iri, Literal, Node, OntologyError, PropertyKind, Result, Term};
use ontograph_store::GraphStore;

use crate::classes::get_or_create;
use crate::connector::OntologyConnector;
use crate::resolver::{Resolver, Want};

/// A value to attach through a property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Value {
    Text(String),
    LangText { text: String, lang: String },
    Integer(i64),
    Boolean(bool),
    Typed { value: String, datatype: Iri },
    Node(Iri),
}

impl Value {
    pub fn is_node(&self) -> bool {
        matches!(self, Value::Node(_))
    }

    pub fn into_term(self) -> Term {
        match self {
            Value::Text(text) => Literal::simple(text).into(),
            Value::LangText { text, lang } => Literal::lang(text, lang).into(),
            Value::Integer(n) => Literal::integer(n).into(),
            Value::Boolean(b) => Literal::boolean(b).into(),
            Value::Typed { value, datatype } => Literal::typed(value, datatype).into(),
            Value::Node(iri) => Term::Iri(iri),
        }
    }
}

impl From<&str> for Value {
    fn from(text: &str) -> Self {
        Value::Text(text.to_string())
    }
}

impl From<String> for Value {
    fn from(text: String) -> Self {
        Value::Text(text)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<&Node> for Value {
    fn from(node: &Node) -> Self {
        Value::Node(node.iri.clone())
    }
}

fn property_kind(property: &Node) -> Result<PropertyKind> {
    property.property_kind().ok_or_else(|| OntologyError::InvalidType {
        iri: property.iri.to_string(),
        expected: "property",
    })
}

/// Reject values the property's kind cannot carry.
fn check_value(property: &Node, value: &Value) -> Result<()> {
    match (property_kind(property)?, value.is_node()) {
        (PropertyKind::Data, true) => Err(OntologyError::InvalidType {
            iri: property.iri.to_string(),
            expected: "object property",
        }),
        (PropertyKind::Object, false) => Err(OntologyError::InvalidLiteral(format!(
            "object property {} needs a node value",
            property.iri
        ))),
        _ => Ok(()),
    }
}

impl<S: GraphStore> OntologyConnector<S> {
    // ── Lookup ──────────────────────────────────────────────────

    fn find_property(&self, name: &str, prefix: Option<&str>, kind: PropertyKind) -> Result<Node> {
        self.with_read_access(|store| {
            Resolver::new(store, self.config()).resolve(name, prefix, Want::Property(kind))
        })
    }

    /// Resolve a property of any kind.
    pub fn get_property(&self, name: &str) -> Result<Node> {
        self.find_property(name, None, PropertyKind::Plain)
    }

    pub fn get_property_in(&self, name: &str, prefix: &str) -> Result<Node> {
        self.find_property(name, Some(prefix), PropertyKind::Plain)
    }

    pub fn get_property_by_iri(&self, uri: &str) -> Result<Node> {
        self.with_read_access(|store| {
            Resolver::new(store, self.config())
                .resolve_by_uri(uri, Want::Property(PropertyKind::Plain))
        })
    }

    pub fn get_data_property(&self, name: &str) -> Result<Node> {
        self.find_property(name, None, PropertyKind::Data)
    }

    pub fn get_object_property(&self, name: &str) -> Result<Node> {
        self.find_property(name, None, PropertyKind::Object)
    }

    pub fn get_annotation_property(&self, name: &str) -> Result<Node> {
        self.find_property(name, None, PropertyKind::Annotation)
    }

    // ── Declaration ─────────────────────────────────────────────

    fn declare_property(&self, name: &str, kind: PropertyKind) -> Result<Node> {
        let node = self.with_write_access(|scope| {
            let any = Want::Property(PropertyKind::Plain);
            let node = get_or_create(scope, self.config(), name, any, |s, iri| {
                s.find_or_create_property(iri, kind)
            })?;
            match node.property_kind() {
                Some(existing) if existing.satisfies(kind) => Ok(node),
                // A plain rdf:Property can be narrowed to any subtype.
                Some(PropertyKind::Plain) => Ok(scope.find_or_create_property(&node.iri, kind)),
                _ => Err(OntologyError::InvalidType {
                    iri: node.iri.to_string(),
                    expected: Want::Property(kind).name(),
                }),
            }
        })?;
        tracing::debug!(property = %node.iri, kind = ?kind, "Property added");
        Ok(node)
    }

    /// Get-or-create a plain `rdf:Property`.
    pub fn add_property(&self, name: &str) -> Result<Node> {
        self.declare_property(name, PropertyKind::Plain)
    }

    pub fn add_data_property(&self, name: &str) -> Result<Node> {
        self.declare_property(name, PropertyKind::Data)
    }

    pub fn add_object_property(&self, name: &str) -> Result<Node> {
        self.declare_property(name, PropertyKind::Object)
    }

    pub fn add_annotation_property(&self, name: &str) -> Result<Node> {
        self.declare_property(name, PropertyKind::Annotation)
    }

    // ── Values ──────────────────────────────────────────────────

    /// Add a value alongside any existing ones.
    pub fn add_property_value(
        &self,
        subject: &Node,
        property: &Node,
        value: impl Into<Value>,
    ) -> Result<()> {
        let value = value.into();
        check_value(property, &value)?;
        self.with_write_access(|scope| {
            scope.add_triple(&subject.term(), &property.iri, &value.into_term());
            Ok(())
        })
    }

    /// Replace every value of `property` on `subject` with `value`.
    pub fn set_property_value(
        &self,
        subject: &Node,
        property: &Node,
        value: impl Into<Value>,
    ) -> Result<()> {
        let value = value.into();
        check_value(property, &value)?;
        self.with_write_access(|scope| {
            scope.remove_all_with(&subject.term(), &property.iri);
            scope.add_triple(&subject.term(), &property.iri, &value.into_term());
            Ok(())
        })
    }

    /// First value of `property` on `subject`, in store order.
    pub fn property_value(&self, subject: &Node, property: &Node) -> Option<Term> {
        self.with_read_access(|store| store.first_object(&subject.term(), &property.iri))
    }

    pub fn property_values(&self, subject: &Node, property: &Node) -> Vec<Term> {
        self.with_read_access(|store| store.objects(&subject.term(), &property.iri))
    }

    /// The value as text: a literal's lexical form or a node's IRI.
    pub fn property_string_value(&self, subject: &Node, property: &Node) -> Option<String> {
        self.property_value(subject, property).and_then(|term| match term {
            Term::Literal(lit) => Some(lit.value().to_string()),
            Term::Iri(iri) => Some(iri.to_string()),
            Term::Blank(_) => None,
        })
    }

    /// The value as an integer. `Ok(None)` when there is no value.
    pub fn property_int_value(&self, subject: &Node, property: &Node) -> Result<Option<i64>> {
        match self.property_value(subject, property) {
            None => Ok(None),
            Some(Term::Literal(lit)) => lit
                .as_i64()
                .map(Some)
                .ok_or_else(|| OntologyError::InvalidLiteral(format!("{lit} is not an integer"))),
            Some(other) => Err(OntologyError::InvalidLiteral(format!("{other} is not a literal"))),
        }
    }

    /// Remove every value of `property` on `subject`. Returns the count.
    pub fn remove_all_of_property(&self, subject: &Node, property: &Node) -> Result<usize> {
        self.with_write_access(|scope| Ok(scope.remove_all_with(&subject.term(), &property.iri)))
    }

    /// Every property, in lexical IRI order.
    pub fn properties(&self) -> Vec<Node> {
        self.with_read_access(|store| {
            Resolver::new(store, self.config()).candidates(Want::Property(PropertyKind::Plain))
        })
    }
}
