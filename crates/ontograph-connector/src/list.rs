//! Ordered lists embedded in the graph.
//!
//! A list is a descriptor node with an `ogl:head` edge to the first of a
//! chain of link nodes. Each link carries exactly one `ogl:value` edge to its
//! member and at most one `ogl:next` edge to the following link:
//!
//! ```text
//! <list> rdf:type ogl:OrderedList ; rdfs:label "queue" ; ogl:head <l1> .
//! <l1>   rdf:type ogl:Link ; ogl:value <a> ; ogl:next <l2> .
//! <l2>   rdf:type ogl:Link ; ogl:value <b> .
//! ```
//!
//! Everything here is a free function over a [`GraphStore`] so it can run
//! inside a read scope or a journaled write scope alike.

use std::collections::{BTreeMap, HashMap, HashSet};

use ontograph_core::vocab;
use ontograph_core::{Conflict, ConflictKind, Iri, Literal, OntologyError, Result, Term};
use ontograph_store::GraphStore;

fn head() -> Iri {
    vocab::iri(vocab::HEAD)
}

fn next() -> Iri {
    vocab::iri(vocab::NEXT)
}

fn value() -> Iri {
    vocab::iri(vocab::VALUE)
}

fn rdf_type() -> Iri {
    vocab::iri(vocab::RDF_TYPE)
}

// ── Chain walking ───────────────────────────────────────────────

/// One step of a chain walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub node: Term,
    pub value: Option<Term>,
}

/// Lazy walk from a list's head to its tail.
///
/// Follows the first `next` edge of each link and stops at the tail, at a
/// dangling edge, or before revisiting a link, so it terminates on any graph.
pub struct ChainIter<'a, G: GraphStore + ?Sized> {
    store: &'a G,
    cursor: Option<Term>,
    visited: HashSet<Term>,
}

impl<'a, G: GraphStore + ?Sized> ChainIter<'a, G> {
    pub fn new(store: &'a G, descriptor: &Iri) -> Self {
        Self {
            store,
            cursor: store.first_object(&Term::from(descriptor), &head()),
            visited: HashSet::new(),
        }
    }

    /// Member values in chain order.
    pub fn values(self) -> impl Iterator<Item = Term> + 'a {
        self.filter_map(|link| link.value)
    }
}

impl<G: GraphStore + ?Sized> Iterator for ChainIter<'_, G> {
    type Item = Link;

    fn next(&mut self) -> Option<Link> {
        let node = self.cursor.take()?;
        if node.is_literal() || !self.visited.insert(node.clone()) {
            return None;
        }
        self.cursor = self.store.first_object(&node, &next());
        let value = self.store.first_object(&node, &value());
        Some(Link { node, value })
    }
}

// ── Lookup ──────────────────────────────────────────────────────

pub fn is_list<G: GraphStore + ?Sized>(store: &G, iri: &Iri) -> bool {
    store.has_type(iri, vocab::ORDERED_LIST)
}

/// Descriptors and links. Only the list operations may touch them.
pub fn is_list_node<G: GraphStore + ?Sized>(store: &G, iri: &Iri) -> bool {
    is_list(store, iri) || store.has_type(iri, vocab::LINK)
}

/// Every list descriptor, in lexical IRI order.
pub fn descriptors<G: GraphStore + ?Sized>(store: &G) -> Vec<Iri> {
    let mut all = store.instances_of(vocab::ORDERED_LIST);
    all.sort();
    all
}

/// Descriptors whose label text equals `label`, in lexical IRI order.
pub fn find_by_label<G: GraphStore + ?Sized>(store: &G, label: &str) -> Vec<Iri> {
    store
        .nodes_with_label(label)
        .into_iter()
        .filter(|iri| is_list(store, iri))
        .collect()
}

pub fn label_of<G: GraphStore + ?Sized>(store: &G, descriptor: &Iri) -> String {
    store
        .labels(descriptor)
        .first()
        .map(|l| l.value().to_string())
        .unwrap_or_default()
}

pub fn members<G: GraphStore + ?Sized>(store: &G, descriptor: &Iri) -> Vec<Term> {
    ChainIter::new(store, descriptor).values().collect()
}

pub fn len<G: GraphStore + ?Sized>(store: &G, descriptor: &Iri) -> usize {
    ChainIter::new(store, descriptor).count()
}

// ── Construction ────────────────────────────────────────────────

/// A fresh IRI under `namespace`, e.g. `{namespace}link-<uuid>`.
pub fn mint(namespace: &str, kind: &str) -> Result<Iri> {
    Ok(Iri::new(format!("{namespace}{kind}-{}", uuid::Uuid::new_v4()))?)
}

/// Type and label a new descriptor. It starts empty.
pub fn create_descriptor<G: GraphStore + ?Sized>(
    store: &mut G,
    descriptor: &Iri,
    label: &str,
    language: Option<&str>,
) {
    let subject = Term::from(descriptor);
    store.add_triple(&subject, &rdf_type(), &Term::Iri(vocab::iri(vocab::ORDERED_LIST)));
    store.add_triple(&subject, &rdf_type(), &Term::Iri(vocab::iri(vocab::OWL_NAMED_INDIVIDUAL)));
    let literal = match language {
        Some(lang) => Literal::lang(label, lang),
        None => Literal::simple(label),
    };
    store.add_triple(&subject, &vocab::iri(vocab::RDFS_LABEL), &literal.into());
}

fn new_link<G: GraphStore + ?Sized>(
    store: &mut G,
    namespace: &str,
    member: &Term,
    successor: Option<&Term>,
) -> Result<Term> {
    let link = Term::Iri(mint(namespace, "link")?);
    store.add_triple(&link, &rdf_type(), &Term::Iri(vocab::iri(vocab::LINK)));
    store.add_triple(&link, &value(), member);
    if let Some(succ) = successor {
        store.add_triple(&link, &next(), succ);
    }
    Ok(link)
}

/// Build a chain holding `members` in order and hang it off an empty
/// descriptor. One link is created per member.
pub fn build_chain<G: GraphStore + ?Sized>(
    store: &mut G,
    descriptor: &Iri,
    namespace: &str,
    members: &[Term],
) -> Result<()> {
    let mut successor: Option<Term> = None;
    for member in members.iter().rev() {
        successor = Some(new_link(store, namespace, member, successor.as_ref())?);
    }
    if let Some(first) = successor {
        store.add_triple(&Term::from(descriptor), &head(), &first);
    }
    Ok(())
}

/// Delete every link of the list and its head edge. The descriptor stays.
pub fn clear<G: GraphStore + ?Sized>(store: &mut G, descriptor: &Iri) -> usize {
    let links: Vec<Term> = ChainIter::new(store, descriptor).map(|l| l.node).collect();
    for link in &links {
        store.remove_node(link);
    }
    store.remove_all_with(&Term::from(descriptor), &head());
    links.len()
}

/// Delete the descriptor and all of its links.
pub fn delete<G: GraphStore + ?Sized>(store: &mut G, descriptor: &Iri) -> usize {
    let links = clear(store, descriptor);
    store.remove_node(&Term::from(descriptor));
    links
}

// ── Mutation ────────────────────────────────────────────────────

/// The link at `index` and its predecessor, if any.
fn locate<G: GraphStore + ?Sized>(
    store: &G,
    descriptor: &Iri,
    index: usize,
) -> Option<(Option<Term>, Link)> {
    let mut previous = None;
    for (i, link) in ChainIter::new(store, descriptor).enumerate() {
        if i == index {
            return Some((previous, link));
        }
        previous = Some(link.node);
    }
    None
}

fn out_of_bounds<G: GraphStore + ?Sized>(store: &G, descriptor: &Iri, index: usize) -> OntologyError {
    OntologyError::IndexOutOfBounds {
        list: descriptor.to_string(),
        index,
        len: len(store, descriptor),
    }
}

/// Point `from`'s `predicate` edge at `to`, or drop it when `to` is `None`.
fn relink<G: GraphStore + ?Sized>(store: &mut G, from: &Term, predicate: &Iri, to: Option<&Term>) {
    store.remove_all_with(from, predicate);
    if let Some(target) = to {
        store.add_triple(from, predicate, target);
    }
}

pub fn append<G: GraphStore + ?Sized>(
    store: &mut G,
    descriptor: &Iri,
    namespace: &str,
    member: &Term,
) -> Result<()> {
    let tail = ChainIter::new(store, descriptor).last().map(|l| l.node);
    let link = new_link(store, namespace, member, None)?;
    match tail {
        Some(tail) => store.add_triple(&tail, &next(), &link),
        None => store.add_triple(&Term::from(descriptor), &head(), &link),
    };
    Ok(())
}

/// Insert before the member at `index`; `index == len` appends.
pub fn insert<G: GraphStore + ?Sized>(
    store: &mut G,
    descriptor: &Iri,
    namespace: &str,
    index: usize,
    member: &Term,
) -> Result<()> {
    let size = len(store, descriptor);
    if index > size {
        return Err(out_of_bounds(store, descriptor, index));
    }
    if index == size {
        return append(store, descriptor, namespace, member);
    }
    let Some((previous, at)) = locate(store, descriptor, index) else {
        return Err(out_of_bounds(store, descriptor, index));
    };
    let link = new_link(store, namespace, member, Some(&at.node))?;
    match previous {
        Some(prev) => relink(store, &prev, &next(), Some(&link)),
        None => relink(store, &Term::from(descriptor), &head(), Some(&link)),
    }
    Ok(())
}

/// Unlink the member at `index`, joining its predecessor to its successor.
/// Returns the removed member.
pub fn remove_at<G: GraphStore + ?Sized>(store: &mut G, descriptor: &Iri, index: usize) -> Result<Term> {
    let Some((previous, at)) = locate(store, descriptor, index) else {
        return Err(out_of_bounds(store, descriptor, index));
    };
    let successor = store.first_object(&at.node, &next());
    match previous {
        Some(prev) => relink(store, &prev, &next(), successor.as_ref()),
        None => relink(store, &Term::from(descriptor), &head(), successor.as_ref()),
    }
    store.remove_node(&at.node);
    at.value.ok_or_else(|| OntologyError::InvalidType {
        iri: at.node.to_string(),
        expected: "list link with a value",
    })
}

pub fn index_of<G: GraphStore + ?Sized>(store: &G, descriptor: &Iri, member: &Term) -> Option<usize> {
    ChainIter::new(store, descriptor).position(|l| l.value.as_ref() == Some(member))
}

/// Remove the first occurrence of `member`.
pub fn remove_member<G: GraphStore + ?Sized>(store: &mut G, descriptor: &Iri, member: &Term) -> Result<()> {
    let index = index_of(store, descriptor, member).ok_or_else(|| OntologyError::MemberNotFound {
        list: descriptor.to_string(),
        member: member.to_string(),
    })?;
    remove_at(store, descriptor, index)?;
    Ok(())
}

/// Remove every occurrence of `member` from every list. Returns the count.
pub fn purge_member<G: GraphStore + ?Sized>(store: &mut G, member: &Term) -> Result<usize> {
    let mut removed = 0;
    for descriptor in descriptors(store) {
        while let Some(index) = index_of(store, &descriptor, member) {
            remove_at(store, &descriptor, index)?;
            removed += 1;
        }
    }
    Ok(removed)
}

// ── Validation ──────────────────────────────────────────────────

/// Check one chain. `owners` records which list first reached each link,
/// across calls.
fn check_chain<G: GraphStore + ?Sized>(
    store: &G,
    descriptor: &Iri,
    owners: &mut HashMap<Term, Iri>,
    out: &mut Vec<Conflict>,
) {
    let subject = Term::from(descriptor);
    let heads = store.objects(&subject, &head());
    if heads.len() > 1 {
        out.push(Conflict::new(
            descriptor.as_str(),
            ConflictKind::MultipleHeads,
            format!("{} head edges", heads.len()),
        ));
    }

    let mut seen = HashSet::new();
    let mut cursor = heads.into_iter().next();
    while let Some(link) = cursor.take() {
        let link_name = link.to_string();
        let is_link = link.as_iri().is_some_and(|iri| store.has_type(iri, vocab::LINK));
        if !is_link {
            out.push(Conflict::new(
                descriptor.as_str(),
                ConflictKind::BrokenChain,
                format!("{link_name} is not a list link"),
            ));
            break;
        }
        if !seen.insert(link.clone()) {
            out.push(Conflict::new(
                descriptor.as_str(),
                ConflictKind::Cycle,
                format!("chain revisits {link_name}"),
            ));
            break;
        }
        match owners.get(&link) {
            Some(owner) if owner != descriptor => out.push(Conflict::new(
                link_name.clone(),
                ConflictKind::SharedLink,
                format!("reachable from {owner} and {descriptor}"),
            )),
            _ => {
                owners.insert(link.clone(), descriptor.clone());
            }
        }

        let incoming = store.subjects(&next(), &link).len() + store.subjects(&head(), &link).len();
        if incoming > 1 {
            out.push(Conflict::new(
                link_name.clone(),
                ConflictKind::SharedLink,
                format!("{incoming} incoming chain edges"),
            ));
        }

        match store.objects(&link, &value()).len() {
            0 => out.push(Conflict::new(
                link_name.clone(),
                ConflictKind::MissingValue,
                "link has no value",
            )),
            1 => {}
            n => out.push(Conflict::new(
                link_name.clone(),
                ConflictKind::MultipleValues,
                format!("{n} values"),
            )),
        }

        let successors = store.objects(&link, &next());
        if successors.len() > 1 {
            out.push(Conflict::new(
                link_name,
                ConflictKind::MultipleSuccessors,
                format!("{} next edges", successors.len()),
            ));
        }
        cursor = successors.into_iter().next();
    }
}

/// Conflicts of a single list, ignoring links owned by other lists.
pub fn list_conflicts<G: GraphStore + ?Sized>(store: &G, descriptor: &Iri) -> Vec<Conflict> {
    let mut out = Vec::new();
    check_chain(store, descriptor, &mut HashMap::new(), &mut out);
    out
}

/// Conflicts across every list in the store. Each is logged at `warn`.
pub fn validate<G: GraphStore + ?Sized>(store: &G) -> Vec<Conflict> {
    let mut out = Vec::new();
    let mut owners = HashMap::new();
    let mut by_label: BTreeMap<String, Vec<Iri>> = BTreeMap::new();

    for descriptor in descriptors(store) {
        check_chain(store, &descriptor, &mut owners, &mut out);
        by_label
            .entry(label_of(store, &descriptor))
            .or_default()
            .push(descriptor);
    }

    for link in store.instances_of(vocab::LINK) {
        if !owners.contains_key(&Term::from(&link)) {
            out.push(Conflict::new(
                link.as_str(),
                ConflictKind::OrphanLink,
                "not reachable from any list",
            ));
        }
    }

    for (label, lists) in by_label {
        if lists.len() > 1 {
            let names: Vec<&str> = lists.iter().map(Iri::as_str).collect();
            out.push(Conflict::new(
                label,
                ConflictKind::DuplicateListLabel,
                names.join(", "),
            ));
        }
    }

    for conflict in &out {
        tracing::warn!(
            subject = %conflict.subject,
            kind = ?conflict.kind,
            detail = %conflict.detail,
            "List conflict"
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use ontograph_store::MemoryStore;

    const NS: &str = "http://example.org/test#";

    fn iri(local: &str) -> Iri {
        Iri::new(format!("{NS}{local}")).unwrap()
    }

    fn term(local: &str) -> Term {
        Term::Iri(iri(local))
    }

    fn new_list(store: &mut MemoryStore, name: &str, members: &[&str]) -> Iri {
        let descriptor = iri(name);
        create_descriptor(store, &descriptor, name, None);
        let members: Vec<Term> = members.iter().map(|m| term(m)).collect();
        build_chain(store, &descriptor, NS, &members).unwrap();
        descriptor
    }

    fn locals(store: &MemoryStore, descriptor: &Iri) -> Vec<String> {
        members(store, descriptor)
            .iter()
            .map(|t| t.as_iri().unwrap().local_name().to_string())
            .collect()
    }

    #[test]
    fn test_build_and_walk() {
        let mut store = MemoryStore::new();
        let list = new_list(&mut store, "q", &["a", "b", "c"]);
        assert_eq!(locals(&store, &list), ["a", "b", "c"]);
        assert_eq!(len(&store, &list), 3);
        assert_eq!(store.instances_of(vocab::LINK).len(), 3);
        assert!(validate(&store).is_empty());
    }

    #[test]
    fn test_insert_positions() {
        let mut store = MemoryStore::new();
        let list = new_list(&mut store, "q", &["b"]);
        insert(&mut store, &list, NS, 0, &term("a")).unwrap();
        insert(&mut store, &list, NS, 2, &term("d")).unwrap();
        insert(&mut store, &list, NS, 2, &term("c")).unwrap();
        assert_eq!(locals(&store, &list), ["a", "b", "c", "d"]);

        let err = insert(&mut store, &list, NS, 9, &term("z")).unwrap_err();
        assert!(matches!(err, OntologyError::IndexOutOfBounds { index: 9, len: 4, .. }));
        assert!(validate(&store).is_empty());
    }

    #[test]
    fn test_remove_relinks() {
        let mut store = MemoryStore::new();
        let list = new_list(&mut store, "q", &["a", "b", "c"]);
        remove_member(&mut store, &list, &term("b")).unwrap();
        assert_eq!(locals(&store, &list), ["a", "c"]);
        assert_eq!(remove_at(&mut store, &list, 0).unwrap(), term("a"));
        assert_eq!(locals(&store, &list), ["c"]);
        remove_member(&mut store, &list, &term("c")).unwrap();
        assert!(store.first_object(&Term::from(&list), &head()).is_none());
        assert!(store.instances_of(vocab::LINK).is_empty());
    }

    #[test]
    fn test_remove_missing_member() {
        let mut store = MemoryStore::new();
        let list = new_list(&mut store, "q", &["a"]);
        let before = store.len();
        let err = remove_member(&mut store, &list, &term("zz")).unwrap_err();
        assert!(matches!(err, OntologyError::MemberNotFound { .. }));
        assert_eq!(store.len(), before);
    }

    #[test]
    fn test_duplicates_remove_first() {
        let mut store = MemoryStore::new();
        let list = new_list(&mut store, "q", &["a", "b", "a"]);
        remove_member(&mut store, &list, &term("a")).unwrap();
        assert_eq!(locals(&store, &list), ["b", "a"]);
    }

    #[test]
    fn test_purge_member() {
        let mut store = MemoryStore::new();
        let one = new_list(&mut store, "one", &["a", "b", "a"]);
        let two = new_list(&mut store, "two", &["a"]);
        assert_eq!(purge_member(&mut store, &term("a")).unwrap(), 3);
        assert_eq!(locals(&store, &one), ["b"]);
        assert!(members(&store, &two).is_empty());
    }

    #[test]
    fn test_cycle_detected_and_walk_terminates() {
        let mut store = MemoryStore::new();
        let list = new_list(&mut store, "q", &["a", "b"]);
        let links: Vec<Term> = ChainIter::new(&store, &list).map(|l| l.node).collect();
        store.add_triple(&links[1], &next(), &links[0]);

        assert_eq!(len(&store, &list), 2);
        let conflicts = validate(&store);
        assert!(conflicts.iter().any(|c| c.kind == ConflictKind::Cycle));
        assert!(!list_conflicts(&store, &list).is_empty());
    }

    #[test]
    fn test_structural_conflicts() {
        let mut store = MemoryStore::new();
        let list = new_list(&mut store, "q", &["a", "b"]);
        let links: Vec<Term> = ChainIter::new(&store, &list).map(|l| l.node).collect();

        store.remove_all_with(&links[1], &value());
        store.add_triple(&links[0], &value(), &term("extra"));

        let orphan = Term::Iri(iri("orphan"));
        store.add_triple(&orphan, &rdf_type(), &Term::Iri(vocab::iri(vocab::LINK)));
        store.add_triple(&orphan, &value(), &term("x"));

        create_descriptor(&mut store, &iri("other"), "q", None);

        let kinds: Vec<ConflictKind> = validate(&store).into_iter().map(|c| c.kind).collect();
        assert!(kinds.contains(&ConflictKind::MissingValue));
        assert!(kinds.contains(&ConflictKind::MultipleValues));
        assert!(kinds.contains(&ConflictKind::OrphanLink));
        assert!(kinds.contains(&ConflictKind::DuplicateListLabel));
    }

    #[test]
    fn test_shared_link() {
        let mut store = MemoryStore::new();
        let first = new_list(&mut store, "first", &["a", "b"]);
        let second = new_list(&mut store, "second", &[]);
        let links: Vec<Term> = ChainIter::new(&store, &first).map(|l| l.node).collect();
        store.add_triple(&Term::from(&second), &head(), &links[1]);

        let conflicts = validate(&store);
        assert!(conflicts.iter().any(|c| c.kind == ConflictKind::SharedLink));
    }

    #[test]
    fn test_broken_chain() {
        let mut store = MemoryStore::new();
        let list = new_list(&mut store, "q", &[]);
        store.add_triple(&Term::from(&list), &head(), &term("not-a-link"));
        let conflicts = list_conflicts(&store, &list);
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].kind, ConflictKind::BrokenChain);
    }
}
