use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tracing::{debug, trace};

use super::{Document, SnapshotHandler, Subscription};

type SharedHandler = Arc<Mutex<SnapshotHandler>>;

struct Entry {
    key: u64,
    collection: String,
    handler: SharedHandler,
}

#[derive(Default)]
struct Registry {
    next_key: u64,
    entries: Vec<Entry>,
}

/// Snapshot handlers attached to a store, keyed by collection.
///
/// Handlers run outside the registry lock so a handler may touch the store
/// again without deadlocking.
#[derive(Clone, Default)]
pub(crate) struct Subscribers {
    registry: Arc<Mutex<Registry>>,
}

impl Subscribers {
    pub(crate) fn attach(
        &self,
        collection: &str,
        handler: SnapshotHandler,
    ) -> (u64, Subscription) {
        let key = {
            let mut registry = self.registry.lock();
            registry.next_key += 1;
            let key = registry.next_key;
            registry.entries.push(Entry {
                key,
                collection: collection.to_string(),
                handler: Arc::new(Mutex::new(handler)),
            });
            key
        };
        debug!(collection, key, "attached snapshot handler");

        let weak: Weak<Mutex<Registry>> = Arc::downgrade(&self.registry);
        let subscription = Subscription::new(move || {
            if let Some(registry) = weak.upgrade() {
                registry.lock().entries.retain(|entry| entry.key != key);
                debug!(key, "detached snapshot handler");
            }
        });

        (key, subscription)
    }

    pub(crate) fn watched_collections(&self) -> Vec<String> {
        let registry = self.registry.lock();
        let mut names: Vec<String> = registry
            .entries
            .iter()
            .map(|entry| entry.collection.clone())
            .collect();
        names.sort();
        names.dedup();
        names
    }

    /// Pushes `snapshot` to one handler, used for the initial delivery.
    pub(crate) fn deliver_to(&self, key: u64, snapshot: Vec<Document>) {
        let handler = self
            .registry
            .lock()
            .entries
            .iter()
            .find(|entry| entry.key == key)
            .map(|entry| Arc::clone(&entry.handler));

        if let Some(handler) = handler {
            trace!(key, count = snapshot.len(), "delivering initial snapshot");
            let mut deliver = handler.lock();
            (*deliver)(snapshot);
        }
    }

    /// Pushes `snapshot` to every handler watching `collection`.
    pub(crate) fn notify(&self, collection: &str, snapshot: &[Document]) {
        let handlers: Vec<SharedHandler> = self
            .registry
            .lock()
            .entries
            .iter()
            .filter(|entry| entry.collection == collection)
            .map(|entry| Arc::clone(&entry.handler))
            .collect();

        trace!(
            collection,
            handlers = handlers.len(),
            count = snapshot.len(),
            "notifying subscribers"
        );
        for handler in handlers {
            let mut deliver = handler.lock();
            (*deliver)(snapshot.to_vec());
        }
    }
}
