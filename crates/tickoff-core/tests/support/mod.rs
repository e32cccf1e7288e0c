#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use tickoff_core::store::{
    DocumentId, DocumentStore, Fields, MemoryStore, Operation, SnapshotHandler, StoreError,
    Subscription,
};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Create(Fields),
    Update(DocumentId, Fields),
    Delete(DocumentId),
}

/// Memory store that records every mutation and can be told to fail them.
#[derive(Clone, Default)]
pub struct FlakyStore {
    inner: MemoryStore,
    failing: Arc<AtomicBool>,
    calls: Arc<Mutex<Vec<Call>>>,
}

impl FlakyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    pub fn inner(&self) -> &MemoryStore {
        &self.inner
    }

    fn check(&self, operation: Operation, collection: &str) -> Result<(), StoreError> {
        if self.failing.load(Ordering::SeqCst) {
            Err(StoreError::new(operation, collection, "simulated outage"))
        } else {
            Ok(())
        }
    }
}

impl DocumentStore for FlakyStore {
    fn subscribe(
        &self,
        collection: &str,
        handler: SnapshotHandler,
    ) -> Result<Subscription, StoreError> {
        self.check(Operation::Subscribe, collection)?;
        self.inner.subscribe(collection, handler)
    }

    fn create(&self, collection: &str, fields: Fields) -> Result<DocumentId, StoreError> {
        self.calls.lock().push(Call::Create(fields.clone()));
        self.check(Operation::Create, collection)?;
        self.inner.create(collection, fields)
    }

    fn update(
        &self,
        collection: &str,
        id: &DocumentId,
        partial: Fields,
    ) -> Result<(), StoreError> {
        self.calls
            .lock()
            .push(Call::Update(id.clone(), partial.clone()));
        self.check(Operation::Update, collection)?;
        self.inner.update(collection, id, partial)
    }

    fn delete(&self, collection: &str, id: &DocumentId) -> Result<(), StoreError> {
        self.calls.lock().push(Call::Delete(id.clone()));
        self.check(Operation::Delete, collection)?;
        self.inner.delete(collection, id)
    }
}
