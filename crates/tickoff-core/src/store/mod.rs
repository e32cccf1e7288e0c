//! Document-store seam.
//!
//! Everything the screens know about persistence goes through
//! [`DocumentStore`]: a named collection of JSON documents that can be
//! watched as a stream of full snapshots and mutated one document at a time.

mod file;
mod memory;
mod subscribers;

use std::error::Error as StdError;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

pub use file::FileStore;
pub use memory::MemoryStore;
pub(crate) use subscribers::Subscribers;

/// Field map of a single document.
pub type Fields = Map<String, Value>;

/// Callback receiving every snapshot of a watched collection.
pub type SnapshotHandler = Box<dyn FnMut(Vec<Document>) + Send>;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Fresh store-assigned identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DocumentId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocumentId,
    #[serde(default)]
    pub fields: Fields,
}

impl Document {
    pub fn new(id: DocumentId, fields: Fields) -> Self {
        Self { id, fields }
    }

    fn merge(&mut self, partial: Fields) {
        for (key, value) in partial {
            self.fields.insert(key, value);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Subscribe,
    Create,
    Update,
    Delete,
    Poll,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::Subscribe => "subscribe",
            Operation::Create => "create",
            Operation::Update => "update",
            Operation::Delete => "delete",
            Operation::Poll => "poll",
        };
        f.write_str(name)
    }
}

/// The one failure a store reports: the remote operation did not take effect.
/// The cause is kept for logging only.
#[derive(Debug, thiserror::Error)]
#[error("{operation} on collection '{collection}' failed")]
pub struct StoreError {
    pub operation: Operation,
    pub collection: String,
    #[source]
    source: Box<dyn StdError + Send + Sync + 'static>,
}

impl StoreError {
    pub fn new(
        operation: Operation,
        collection: &str,
        source: impl Into<Box<dyn StdError + Send + Sync + 'static>>,
    ) -> Self {
        Self {
            operation,
            collection: collection.to_string(),
            source: source.into(),
        }
    }
}

/// Handle returned by [`DocumentStore::subscribe`]. Dropping it detaches the
/// handler.
pub struct Subscription {
    detach: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    pub fn new(detach: impl FnOnce() + Send + 'static) -> Self {
        Self {
            detach: Some(Box::new(detach)),
        }
    }

    pub fn unsubscribe(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(detach) = self.detach.take() {
            detach();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("attached", &self.detach.is_some())
            .finish()
    }
}

pub trait DocumentStore: Send + Sync {
    /// Registers `handler` for `collection`. The handler is called right away
    /// with the current contents and again after every change.
    fn subscribe(
        &self,
        collection: &str,
        handler: SnapshotHandler,
    ) -> Result<Subscription, StoreError>;

    fn create(&self, collection: &str, fields: Fields) -> Result<DocumentId, StoreError>;

    /// Merges `partial` into the existing document. Missing documents fail.
    fn update(&self, collection: &str, id: &DocumentId, partial: Fields)
    -> Result<(), StoreError>;

    /// Removes the document. Removing an absent id succeeds.
    fn delete(&self, collection: &str, id: &DocumentId) -> Result<(), StoreError>;

    /// Picks up changes made outside this process and pushes them to
    /// subscribers.
    fn poll_changes(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

impl<T: DocumentStore + ?Sized> DocumentStore for Box<T> {
    fn subscribe(
        &self,
        collection: &str,
        handler: SnapshotHandler,
    ) -> Result<Subscription, StoreError> {
        (**self).subscribe(collection, handler)
    }

    fn create(&self, collection: &str, fields: Fields) -> Result<DocumentId, StoreError> {
        (**self).create(collection, fields)
    }

    fn update(
        &self,
        collection: &str,
        id: &DocumentId,
        partial: Fields,
    ) -> Result<(), StoreError> {
        (**self).update(collection, id, partial)
    }

    fn delete(&self, collection: &str, id: &DocumentId) -> Result<(), StoreError> {
        (**self).delete(collection, id)
    }

    fn poll_changes(&self) -> Result<(), StoreError> {
        (**self).poll_changes()
    }
}

fn missing_document(id: &DocumentId) -> String {
    format!("no document with id {id}")
}
