//! Load and save graphs in standard RDF syntaxes.
//!
//! Parsing always completes into a fresh [`MemoryStore`] before the caller
//! sees it, so a failed load never leaves a half-populated graph behind.
//! Saving writes to a sibling temporary file and renames it into place.

use std::fmt;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use oxrdf::{BlankNode, NamedNode};
use oxrdfxml::{RdfXmlParser, RdfXmlSerializer};
use oxttl::{NTriplesParser, NTriplesSerializer, TurtleParser, TurtleSerializer};
use serde::{Deserialize, Serialize};

use ontograph_core::{Iri, Literal, StoreError, Term, Triple};

use crate::memory::MemoryStore;
use crate::namespaces::Namespaces;
use crate::store::GraphStore;

// ── Formats ─────────────────────────────────────────────────────

/// Supported serialization syntaxes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RdfFormat {
    #[default]
    RdfXml,
    Turtle,
    NTriples,
    /// Read with the Turtle grammar and written as Turtle, which is valid N3.
    N3,
}

impl RdfFormat {
    /// Format for a file extension, if recognised.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "rdf" | "owl" | "xml" => Some(Self::RdfXml),
            "ttl" => Some(Self::Turtle),
            "nt" => Some(Self::NTriples),
            "n3" => Some(Self::N3),
            _ => None,
        }
    }

    /// Format inferred from a path, falling back to RDF/XML.
    pub fn from_path(path: &Path) -> Self {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
            .unwrap_or_default()
    }

    pub fn file_extension(self) -> &'static str {
        match self {
            Self::RdfXml => "rdf",
            Self::Turtle => "ttl",
            Self::NTriples => "nt",
            Self::N3 => "n3",
        }
    }
}

impl fmt::Display for RdfFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::RdfXml => "rdfxml",
            Self::Turtle => "turtle",
            Self::NTriples => "ntriples",
            Self::N3 => "n3",
        };
        f.write_str(name)
    }
}

impl FromStr for RdfFormat {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "rdfxml" | "rdf/xml" | "xml" | "rdf" | "owl" => Ok(Self::RdfXml),
            "turtle" | "ttl" => Ok(Self::Turtle),
            "ntriples" | "n-triples" | "nt" => Ok(Self::NTriples),
            "n3" => Ok(Self::N3),
            other => Err(StoreError::UnsupportedFormat(other.to_string())),
        }
    }
}

/// Outcome of a successful save.
#[derive(Debug, Clone, Serialize)]
pub struct SaveReport {
    pub path: PathBuf,
    pub format: RdfFormat,
    pub triples: usize,
    pub saved_at: DateTime<Utc>,
}

// ── Conversion ──────────────────────────────────────────────────

fn from_ox_term(term: oxrdf::Term) -> Option<Term> {
    match term {
        oxrdf::Term::NamedNode(n) => Some(Term::Iri(Iri::new_unchecked(n.into_string()))),
        oxrdf::Term::BlankNode(b) => Some(Term::Blank(b.as_str().to_string())),
        oxrdf::Term::Literal(l) => {
            let literal = match l.language() {
                Some(lang) => Literal::lang(l.value(), lang),
                None => Literal::typed(l.value(), Iri::new_unchecked(l.datatype().as_str())),
            };
            Some(Term::Literal(literal))
        }
        #[allow(unreachable_patterns)]
        _ => None,
    }
}

fn from_ox_triple(triple: oxrdf::Triple) -> Option<Triple> {
    let subject = from_ox_term(triple.subject.into())?;
    let object = from_ox_term(triple.object)?;
    Some(Triple::new(
        subject,
        Iri::new_unchecked(triple.predicate.into_string()),
        object,
    ))
}

fn to_ox_object(term: &Term) -> oxrdf::Term {
    match term {
        Term::Iri(iri) => NamedNode::new_unchecked(iri.as_str()).into(),
        Term::Blank(id) => BlankNode::new_unchecked(id.as_str()).into(),
        Term::Literal(lit) => {
            let literal = if let Some(lang) = lit.language() {
                oxrdf::Literal::new_language_tagged_literal_unchecked(lit.value(), lang)
            } else if lit.datatype() == ontograph_core::vocab::XSD_STRING {
                oxrdf::Literal::new_simple_literal(lit.value())
            } else {
                oxrdf::Literal::new_typed_literal(lit.value(), NamedNode::new_unchecked(lit.datatype()))
            };
            literal.into()
        }
    }
}

fn to_ox_triple(triple: &Triple) -> Result<oxrdf::Triple, StoreError> {
    let predicate = NamedNode::new_unchecked(triple.predicate.as_str());
    let object = to_ox_object(&triple.object);
    match &triple.subject {
        Term::Iri(iri) => Ok(oxrdf::Triple::new(
            NamedNode::new_unchecked(iri.as_str()),
            predicate,
            object,
        )),
        Term::Blank(id) => Ok(oxrdf::Triple::new(
            BlankNode::new_unchecked(id.as_str()),
            predicate,
            object,
        )),
        Term::Literal(_) => Err(StoreError::Serialize(format!(
            "literal in subject position: {triple}"
        ))),
    }
}

// ── Reading ─────────────────────────────────────────────────────

fn parse_error(source: &Path, err: impl fmt::Display) -> StoreError {
    StoreError::Parse {
        path: source.to_path_buf(),
        message: err.to_string(),
    }
}

fn collect<E: fmt::Display>(
    parsed: impl Iterator<Item = Result<oxrdf::Triple, E>>,
    source: &Path,
) -> Result<Vec<Triple>, StoreError> {
    let mut triples = Vec::new();
    for item in parsed {
        let triple = item.map_err(|e| parse_error(source, e))?;
        if let Some(triple) = from_ox_triple(triple) {
            triples.push(triple);
        }
    }
    Ok(triples)
}

fn parse(reader: impl Read, format: RdfFormat, source: &Path) -> Result<MemoryStore, StoreError> {
    let mut namespaces = Namespaces::standard();
    let triples = match format {
        RdfFormat::Turtle | RdfFormat::N3 => {
            let mut parser = TurtleParser::new().for_reader(reader);
            let triples = collect(parser.by_ref(), source)?;
            for (prefix, uri) in parser.prefixes() {
                namespaces.set(prefix, uri);
            }
            triples
        }
        RdfFormat::NTriples => collect(NTriplesParser::new().for_reader(reader), source)?,
        RdfFormat::RdfXml => collect(RdfXmlParser::new().for_reader(reader), source)?,
    };
    Ok(MemoryStore::from_triples(triples, namespaces))
}

impl MemoryStore {
    /// Parse a graph from any reader.
    pub fn from_reader(reader: impl Read, format: RdfFormat) -> Result<Self, StoreError> {
        parse(reader, format, Path::new("<stream>"))
    }

    /// Load a file. Without an explicit format it is inferred from the
    /// extension.
    pub fn load(path: impl AsRef<Path>, format: Option<RdfFormat>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let format = format.unwrap_or_else(|| RdfFormat::from_path(path));
        let file = File::open(path).map_err(|source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let store = parse(BufReader::new(file), format, path)?;
        tracing::info!(
            path = %path.display(),
            format = %format,
            triples = store.len(),
            "Ontology loaded"
        );
        Ok(store)
    }

    pub fn save(&self, path: impl AsRef<Path>, format: RdfFormat) -> Result<SaveReport, StoreError> {
        save(self, path, format)
    }
}

// ── Writing ─────────────────────────────────────────────────────

/// Serialize every triple of `store` into `writer`.
pub fn write_graph<G, W>(store: &G, writer: W, format: RdfFormat) -> Result<W, StoreError>
where
    G: GraphStore + ?Sized,
    W: Write,
{
    let io_err = |e: std::io::Error| StoreError::Serialize(e.to_string());
    let triples = store.triples_matching(None, None, None);

    match format {
        RdfFormat::Turtle | RdfFormat::N3 => {
            let mut serializer = TurtleSerializer::new();
            for (prefix, uri) in store.namespaces().iter() {
                serializer = serializer
                    .with_prefix(prefix, uri)
                    .map_err(|e| StoreError::Serialize(format!("prefix {prefix}: {e}")))?;
            }
            let mut out = serializer.for_writer(writer);
            for triple in &triples {
                out.serialize_triple(&to_ox_triple(triple)?).map_err(io_err)?;
            }
            out.finish().map_err(io_err)
        }
        RdfFormat::NTriples => {
            let mut out = NTriplesSerializer::new().for_writer(writer);
            for triple in &triples {
                out.serialize_triple(&to_ox_triple(triple)?).map_err(io_err)?;
            }
            Ok(out.finish())
        }
        RdfFormat::RdfXml => {
            let mut out = RdfXmlSerializer::new().for_writer(writer);
            for triple in &triples {
                out.serialize_triple(&to_ox_triple(triple)?).map_err(io_err)?;
            }
            out.finish().map_err(io_err)
        }
    }
}

/// Save any store to `path`, replacing the file only once the graph has been
/// written completely.
pub fn save<G>(store: &G, path: impl AsRef<Path>, format: RdfFormat) -> Result<SaveReport, StoreError>
where
    G: GraphStore + ?Sized,
{
    let path = path.as_ref();
    let io_error = |source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    };

    let mut tmp_name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    tmp_name.push(".tmp");
    let tmp = path.with_file_name(tmp_name);

    let file = File::create(&tmp).map_err(io_error)?;
    let written = write_graph(store, BufWriter::new(file), format).and_then(|mut w| {
        w.flush().map_err(|e| StoreError::Serialize(e.to_string()))
    });
    if let Err(err) = written {
        let _ = fs::remove_file(&tmp);
        return Err(err);
    }
    fs::rename(&tmp, path).map_err(io_error)?;

    let report = SaveReport {
        path: path.to_path_buf(),
        format,
        triples: store.len(),
        saved_at: Utc::now(),
    };
    tracing::info!(
        path = %path.display(),
        format = %format,
        triples = report.triples,
        "Ontology saved"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ontograph_core::vocab;

    #[test]
    fn format_from_extension() {
        assert_eq!(RdfFormat::from_path(Path::new("a.ttl")), RdfFormat::Turtle);
        assert_eq!(RdfFormat::from_path(Path::new("a.OWL")), RdfFormat::RdfXml);
        assert_eq!(RdfFormat::from_path(Path::new("a.nt")), RdfFormat::NTriples);
        assert_eq!(RdfFormat::from_path(Path::new("a.n3")), RdfFormat::N3);
        assert_eq!(RdfFormat::from_path(Path::new("noext")), RdfFormat::RdfXml);
    }

    #[test]
    fn format_from_str() {
        assert_eq!("Turtle".parse::<RdfFormat>().unwrap(), RdfFormat::Turtle);
        assert_eq!("n-triples".parse::<RdfFormat>().unwrap(), RdfFormat::NTriples);
        assert!(matches!(
            "jsonld".parse::<RdfFormat>(),
            Err(StoreError::UnsupportedFormat(f)) if f == "jsonld"
        ));
    }

    #[test]
    fn parses_turtle_with_prefixes() {
        let doc = r#"
            @prefix ex: <http://example.org/> .
            @prefix rdfs: <http://www.w3.org/2000/01/rdf-schema#> .
            ex:Dog a <http://www.w3.org/2002/07/owl#Class> ;
                rdfs:label "Dog"@en , "Hund"@de .
            ex:rex ex:age 7 .
        "#;
        let store = MemoryStore::from_reader(doc.as_bytes(), RdfFormat::Turtle).unwrap();
        assert_eq!(store.len(), 4);
        assert_eq!(store.namespaces().get("ex"), Some("http://example.org/"));

        let rex = Term::Iri(Iri::new("http://example.org/rex").unwrap());
        let age = store
            .first_object(&rex, &Iri::new("http://example.org/age").unwrap())
            .unwrap();
        assert_eq!(age.as_literal().unwrap().as_i64(), Some(7));

        let dog = Iri::new("http://example.org/Dog").unwrap();
        assert_eq!(store.label(&dog, Some("de")).as_deref(), Some("Hund"));
    }

    #[test]
    fn parse_error_is_reported() {
        let err = MemoryStore::from_reader("this is not turtle".as_bytes(), RdfFormat::Turtle)
            .unwrap_err();
        assert!(matches!(err, StoreError::Parse { .. }));
    }

    #[test]
    fn ntriples_output_is_line_based() {
        let mut store = MemoryStore::new();
        store.insert(Triple::new(
            Iri::new("http://example.org/a").unwrap(),
            vocab::iri(vocab::RDFS_LABEL),
            Literal::lang("a", "en"),
        ));
        let bytes = write_graph(&store, Vec::new(), RdfFormat::NTriples).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert_eq!(
            text.trim(),
            "<http://example.org/a> <http://www.w3.org/2000/01/rdf-schema#label> \"a\"@en ."
        );
    }

    #[test]
    fn literal_subjects_cannot_be_written() {
        let mut store = MemoryStore::new();
        store.insert(Triple::new(
            Literal::simple("oops"),
            vocab::iri(vocab::RDFS_LABEL),
            Literal::simple("x"),
        ));
        let err = write_graph(&store, Vec::new(), RdfFormat::Turtle).unwrap_err();
        assert!(matches!(err, StoreError::Serialize(_)));
    }
}
