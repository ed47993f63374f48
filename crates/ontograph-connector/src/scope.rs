//! Journaled write scope.
//!
//! A [`WriteScope`] wraps the exclusively borrowed store for the duration of
//! one write operation and records every change that actually took effect.
//! Unless [`WriteScope::commit`] is called, dropping the scope undoes the
//! journal in reverse order, which covers both an `Err` returned by the
//! operation and a panic unwinding through it.

use ontograph_core::{Iri, Term, Triple};
use ontograph_store::{GraphStore, Namespaces};

#[derive(Debug)]
enum Change {
    Inserted(Triple),
    Removed(Triple),
    Prefix {
        prefix: String,
        previous: Option<String>,
    },
}

pub struct WriteScope<'a, S: GraphStore + ?Sized> {
    store: &'a mut S,
    journal: Vec<Change>,
}

impl<'a, S: GraphStore + ?Sized> WriteScope<'a, S> {
    pub(crate) fn new(store: &'a mut S) -> Self {
        Self {
            store,
            journal: Vec::new(),
        }
    }

    /// Number of effective changes recorded so far.
    pub fn changes(&self) -> usize {
        self.journal.len()
    }

    /// Keep every change made through this scope.
    pub(crate) fn commit(mut self) -> usize {
        let applied = self.journal.len();
        self.journal.clear();
        applied
    }

    fn undo(&mut self) -> usize {
        let undone = self.journal.len();
        while let Some(change) = self.journal.pop() {
            match change {
                Change::Inserted(triple) => {
                    self.store.remove(&triple);
                }
                Change::Removed(triple) => {
                    self.store.insert(triple);
                }
                Change::Prefix { prefix, previous } => match previous {
                    Some(uri) => {
                        self.store.set_prefix(&prefix, &uri);
                    }
                    None => {
                        self.store.remove_prefix(&prefix);
                    }
                },
            }
        }
        undone
    }
}

impl<S: GraphStore + ?Sized> Drop for WriteScope<'_, S> {
    fn drop(&mut self) {
        if !self.journal.is_empty() {
            let undone = self.undo();
            tracing::debug!(changes = undone, "Write scope rolled back");
        }
    }
}

impl<S: GraphStore + ?Sized> GraphStore for WriteScope<'_, S> {
    fn insert(&mut self, triple: Triple) -> bool {
        if self.store.insert(triple.clone()) {
            self.journal.push(Change::Inserted(triple));
            true
        } else {
            false
        }
    }

    fn remove(&mut self, triple: &Triple) -> bool {
        if self.store.remove(triple) {
            self.journal.push(Change::Removed(triple.clone()));
            true
        } else {
            false
        }
    }

    fn contains(&self, triple: &Triple) -> bool {
        self.store.contains(triple)
    }

    fn objects(&self, subject: &Term, predicate: &Iri) -> Vec<Term> {
        self.store.objects(subject, predicate)
    }

    fn subjects(&self, predicate: &Iri, object: &Term) -> Vec<Term> {
        self.store.subjects(predicate, object)
    }

    fn triples_matching(
        &self,
        subject: Option<&Term>,
        predicate: Option<&Iri>,
        object: Option<&Term>,
    ) -> Vec<Triple> {
        self.store.triples_matching(subject, predicate, object)
    }

    fn len(&self) -> usize {
        self.store.len()
    }

    fn namespaces(&self) -> &Namespaces {
        self.store.namespaces()
    }

    fn set_prefix(&mut self, prefix: &str, uri: &str) -> Option<String> {
        let previous = self.store.set_prefix(prefix, uri);
        self.journal.push(Change::Prefix {
            prefix: prefix.to_string(),
            previous: previous.clone(),
        });
        previous
    }

    fn remove_prefix(&mut self, prefix: &str) -> Option<String> {
        let previous = self.store.remove_prefix(prefix);
        if previous.is_some() {
            self.journal.push(Change::Prefix {
                prefix: prefix.to_string(),
                previous: previous.clone(),
            });
        }
        previous
    }
}
