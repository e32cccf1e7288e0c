use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, instrument};

use super::{
    Document, DocumentId, DocumentStore, Fields, Operation, SnapshotHandler, StoreError,
    Subscribers, Subscription, missing_document,
};

/// In-process collections. Clones share state, so a clone handed to another
/// component observes the same documents and subscribers.
#[derive(Clone, Default)]
pub struct MemoryStore {
    collections: Arc<Mutex<BTreeMap<String, Vec<Document>>>>,
    subscribers: Subscribers,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current contents of `collection` in insertion order.
    pub fn documents(&self, collection: &str) -> Vec<Document> {
        self.collections
            .lock()
            .get(collection)
            .cloned()
            .unwrap_or_default()
    }

    pub fn get(&self, collection: &str, id: &DocumentId) -> Option<Document> {
        self.collections
            .lock()
            .get(collection)
            .and_then(|docs| docs.iter().find(|doc| &doc.id == id).cloned())
    }

    fn publish(&self, collection: &str) {
        let snapshot = self.documents(collection);
        self.subscribers.notify(collection, &snapshot);
    }
}

impl DocumentStore for MemoryStore {
    #[instrument(skip(self, handler))]
    fn subscribe(
        &self,
        collection: &str,
        handler: SnapshotHandler,
    ) -> Result<Subscription, StoreError> {
        let (key, subscription) = self.subscribers.attach(collection, handler);
        self.subscribers.deliver_to(key, self.documents(collection));
        Ok(subscription)
    }

    #[instrument(skip(self, fields))]
    fn create(&self, collection: &str, fields: Fields) -> Result<DocumentId, StoreError> {
        let id = DocumentId::generate();
        self.collections
            .lock()
            .entry(collection.to_string())
            .or_default()
            .push(Document::new(id.clone(), fields));
        debug!(%id, "created document");

        self.publish(collection);
        Ok(id)
    }

    #[instrument(skip(self, partial), fields(id = %id))]
    fn update(
        &self,
        collection: &str,
        id: &DocumentId,
        partial: Fields,
    ) -> Result<(), StoreError> {
        {
            let mut collections = self.collections.lock();
            let doc = collections
                .get_mut(collection)
                .and_then(|docs| docs.iter_mut().find(|doc| &doc.id == id))
                .ok_or_else(|| {
                    StoreError::new(Operation::Update, collection, missing_document(id))
                })?;
            doc.merge(partial);
        }
        debug!("updated document");

        self.publish(collection);
        Ok(())
    }

    #[instrument(skip(self), fields(id = %id))]
    fn delete(&self, collection: &str, id: &DocumentId) -> Result<(), StoreError> {
        let removed = {
            let mut collections = self.collections.lock();
            match collections.get_mut(collection) {
                Some(docs) => {
                    let before = docs.len();
                    docs.retain(|doc| &doc.id != id);
                    before != docs.len()
                }
                None => false,
            }
        };

        if removed {
            debug!("deleted document");
            self.publish(collection);
        } else {
            debug!("delete of absent document ignored");
        }
        Ok(())
    }
}
