//! The concurrency guard and the connector handle built on it.

use std::ops::Deref;
use std::sync::{Arc, Mutex, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use ontograph_core::{ConnectorConfig, Result};
use ontograph_store::{GraphStore, MemoryStore};

use crate::scope::WriteScope;

struct Shared<S> {
    store: RwLock<S>,
    /// Writers hold this while waiting for the write lock; readers pass
    /// through it first, so a queued writer blocks readers arriving after it.
    turnstile: Mutex<()>,
    config: ConnectorConfig,
}

/// Thread-safe ontology connector.
///
/// This is the single point of access for all graph operations: the store is
/// owned by the connector and only reachable through
/// [`with_read_access`](Self::with_read_access) and
/// [`with_write_access`](Self::with_write_access). Clone is cheap (inner
/// Arc) and clones share the same store.
///
/// Scopes are not reentrant. Calling back into the connector from inside an
/// access closure deadlocks.
pub struct OntologyConnector<S: GraphStore = MemoryStore> {
    shared: Arc<Shared<S>>,
}

impl<S: GraphStore> Clone for OntologyConnector<S> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl Default for OntologyConnector<MemoryStore> {
    fn default() -> Self {
        Self::new(MemoryStore::new())
    }
}

/// Read access to the store: shared, or exclusive when shared reads are off.
enum ReadGuard<'a, S> {
    Shared(RwLockReadGuard<'a, S>),
    Exclusive(RwLockWriteGuard<'a, S>),
}

impl<S> Deref for ReadGuard<'_, S> {
    type Target = S;

    fn deref(&self) -> &S {
        match self {
            ReadGuard::Shared(guard) => guard,
            ReadGuard::Exclusive(guard) => guard,
        }
    }
}

/// Bind the configured base prefix unless the store already binds it.
pub(crate) fn bind_base_prefix<G: GraphStore + ?Sized>(store: &mut G, config: &ConnectorConfig) {
    if store.namespaces().get(&config.base_prefix).is_none() {
        store.set_prefix(&config.base_prefix, &config.base_namespace);
    }
}

impl<S: GraphStore> OntologyConnector<S> {
    pub fn new(store: S) -> Self {
        Self::with_config(store, ConnectorConfig::default())
    }

    pub fn with_config(mut store: S, config: ConnectorConfig) -> Self {
        bind_base_prefix(&mut store, &config);
        tracing::debug!(
            base_namespace = %config.base_namespace,
            shared_reads = config.shared_reads,
            triples = store.len(),
            "Connector created"
        );
        Self {
            shared: Arc::new(Shared {
                store: RwLock::new(store),
                turnstile: Mutex::new(()),
                config,
            }),
        }
    }

    pub fn config(&self) -> &ConnectorConfig {
        &self.shared.config
    }

    // ── Guard ───────────────────────────────────────────────────

    fn write_guard(&self) -> RwLockWriteGuard<'_, S> {
        let _turn = self
            .shared
            .turnstile
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        self.shared
            .store
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn read_guard(&self) -> ReadGuard<'_, S> {
        if !self.shared.config.shared_reads {
            return ReadGuard::Exclusive(self.write_guard());
        }
        drop(
            self.shared
                .turnstile
                .lock()
                .unwrap_or_else(PoisonError::into_inner),
        );
        ReadGuard::Shared(
            self.shared
                .store
                .read()
                .unwrap_or_else(PoisonError::into_inner),
        )
    }

    /// Run `f` with shared read access to the store.
    pub fn with_read_access<R>(&self, f: impl FnOnce(&S) -> R) -> R {
        let guard = self.read_guard();
        f(&guard)
    }

    /// Run `f` with exclusive access to the store.
    ///
    /// Changes are kept only if `f` returns `Ok`. On `Err`, or if `f` panics,
    /// every change made through the scope is undone before the lock is
    /// released.
    pub fn with_write_access<R>(
        &self,
        f: impl FnOnce(&mut WriteScope<'_, S>) -> Result<R>,
    ) -> Result<R> {
        let mut guard = self.write_guard();
        let mut scope = WriteScope::new(&mut *guard);
        let value = f(&mut scope)?;
        let applied = scope.commit();
        if applied > 0 {
            tracing::trace!(changes = applied, "Write scope committed");
        }
        Ok(value)
    }

    /// Replace the whole store under the exclusive lock.
    pub(crate) fn replace_store(&self, mut store: S) -> S {
        bind_base_prefix(&mut store, &self.shared.config);
        let mut guard = self.write_guard();
        std::mem::replace(&mut *guard, store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ontograph_core::{Iri, Literal, OntologyError, Triple};
    use std::sync::mpsc;
    use std::thread;
    use std::time::Duration;

    fn sample_triple() -> Triple {
        Triple::new(
            Iri::new("http://ex/a").unwrap(),
            Iri::new("http://ex/p").unwrap(),
            Literal::simple("v"),
        )
    }

    #[test]
    fn test_base_prefix_bound() {
        let connector: OntologyConnector = OntologyConnector::default();
        let ns = connector.with_read_access(|s| s.namespaces().get("").map(str::to_string));
        assert_eq!(ns.as_deref(), Some("https://ontograph.dev/ontology#"));
    }

    #[test]
    fn test_failed_write_rolls_back() {
        let connector: OntologyConnector = OntologyConnector::default();
        let before = connector.with_read_access(|s| s.len());
        let result: Result<()> = connector.with_write_access(|scope| {
            scope.insert(sample_triple());
            Err(OntologyError::not_found("class", "Nope"))
        });
        assert!(result.unwrap_err().is_not_found());
        assert_eq!(connector.with_read_access(|s| s.len()), before);
    }

    #[test]
    fn test_panicking_write_rolls_back_and_unpoisons() {
        let connector: OntologyConnector = OntologyConnector::default();
        let cloned = connector.clone();
        let joined = thread::spawn(move || {
            let _: Result<()> = cloned.with_write_access(|scope| {
                scope.insert(sample_triple());
                panic!("boom");
            });
        })
        .join();
        assert!(joined.is_err());

        assert!(!connector.with_read_access(|s| s.contains(&sample_triple())));
        connector
            .with_write_access(|scope| {
                scope.insert(sample_triple());
                Ok(())
            })
            .unwrap();
        assert!(connector.with_read_access(|s| s.contains(&sample_triple())));
    }

    #[test]
    fn test_exclusive_reads_still_work() {
        let config = ConnectorConfig {
            shared_reads: false,
            ..Default::default()
        };
        let connector = OntologyConnector::with_config(MemoryStore::new(), config);
        connector
            .with_write_access(|scope| {
                scope.insert(sample_triple());
                Ok(())
            })
            .unwrap();
        assert!(connector.with_read_access(|s| s.contains(&sample_triple())));
    }

    #[test]
    fn test_writer_waits_for_reader() {
        let connector: OntologyConnector = OntologyConnector::default();
        let (started_tx, started_rx) = mpsc::channel();
        let writer = connector.clone();

        let observed = connector.with_read_access(|store| {
            let handle = thread::spawn(move || {
                started_tx.send(()).unwrap();
                writer
                    .with_write_access(|scope| {
                        scope.insert(sample_triple());
                        Ok(())
                    })
                    .unwrap();
            });
            started_rx.recv().unwrap();
            thread::sleep(Duration::from_millis(50));
            let seen = store.contains(&sample_triple());
            (handle, seen)
        });
        let (handle, seen_during_read) = observed;
        assert!(!seen_during_read);
        handle.join().unwrap();
        assert!(connector.with_read_access(|s| s.contains(&sample_triple())));
    }

    #[test]
    fn test_late_reader_waits_for_queued_writer() {
        let connector: OntologyConnector = OntologyConnector::default();
        let order = Arc::new(Mutex::new(Vec::new()));

        let handles = connector.with_read_access(|_| {
            let writer = {
                let connector = connector.clone();
                let order = Arc::clone(&order);
                thread::spawn(move || {
                    connector
                        .with_write_access(|_| {
                            order.lock().unwrap().push("writer");
                            Ok(())
                        })
                        .unwrap();
                })
            };
            // Let the writer queue up behind this read.
            thread::sleep(Duration::from_millis(50));

            let reader = {
                let connector = connector.clone();
                let order = Arc::clone(&order);
                thread::spawn(move || {
                    connector.with_read_access(|_| order.lock().unwrap().push("late reader"));
                })
            };
            thread::sleep(Duration::from_millis(50));
            assert!(order.lock().unwrap().is_empty());
            [writer, reader]
        });

        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(*order.lock().unwrap(), vec!["writer", "late reader"]);
    }
}
