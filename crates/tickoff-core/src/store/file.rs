use std::collections::BTreeMap;
use std::fs;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, anyhow};
use parking_lot::Mutex;
use tempfile::NamedTempFile;
use tracing::{debug, info, instrument, warn};

use super::{
    Document, DocumentId, DocumentStore, Fields, Operation, SnapshotHandler, StoreError,
    Subscribers, Subscription, missing_document,
};

/// Collections stored as JSON-lines files, one per collection, under a data
/// directory. Several processes may share the directory; each picks up the
/// others' writes on [`DocumentStore::poll_changes`].
#[derive(Clone)]
pub struct FileStore {
    data_dir: PathBuf,
    // Last contents seen per collection, used to detect foreign writes.
    known: Arc<Mutex<BTreeMap<String, Vec<Document>>>>,
    subscribers: Subscribers,
}

impl FileStore {
    #[instrument(skip(data_dir))]
    pub fn open(data_dir: &Path) -> anyhow::Result<Self> {
        let data_dir = data_dir.to_path_buf();
        fs::create_dir_all(&data_dir)
            .with_context(|| format!("failed to create {}", data_dir.display()))?;

        info!(data_dir = %data_dir.display(), "opened file store");

        Ok(Self {
            data_dir,
            known: Arc::new(Mutex::new(BTreeMap::new())),
            subscribers: Subscribers::default(),
        })
    }

    pub fn collection_path(&self, collection: &str) -> PathBuf {
        self.data_dir.join(format!("{collection}.jsonl"))
    }

    /// Reads the collection file, then applies `change` and writes the result
    /// back when it reports a modification. The lock is held across the
    /// read-modify-write so writers inside this process are serialised.
    fn modify<T>(
        &self,
        operation: Operation,
        collection: &str,
        change: impl FnOnce(&mut Vec<Document>) -> Result<(T, bool), String>,
    ) -> Result<T, StoreError> {
        check_collection_name(operation, collection)?;
        let path = self.collection_path(collection);

        let (value, snapshot) = {
            let mut known = self.known.lock();
            let mut docs =
                load_jsonl(&path).map_err(|err| StoreError::new(operation, collection, err))?;
            let (value, changed) =
                change(&mut docs).map_err(|msg| StoreError::new(operation, collection, msg))?;

            if changed {
                save_jsonl_atomic(&path, &docs)
                    .map_err(|err| StoreError::new(operation, collection, err))?;
            }
            // A foreign write folded in here must still reach subscribers,
            // otherwise the next poll sees nothing new.
            let publish = changed || known.get(collection) != Some(&docs);
            known.insert(collection.to_string(), docs.clone());
            (value, publish.then_some(docs))
        };

        if let Some(snapshot) = snapshot {
            self.subscribers.notify(collection, &snapshot);
        }
        Ok(value)
    }
}

impl DocumentStore for FileStore {
    #[instrument(skip(self, handler))]
    fn subscribe(
        &self,
        collection: &str,
        handler: SnapshotHandler,
    ) -> Result<Subscription, StoreError> {
        check_collection_name(Operation::Subscribe, collection)?;
        let docs = load_jsonl(&self.collection_path(collection))
            .map_err(|err| StoreError::new(Operation::Subscribe, collection, err))?;
        let stale = self
            .known
            .lock()
            .insert(collection.to_string(), docs.clone())
            .is_some_and(|previous| previous != docs);
        if stale {
            self.subscribers.notify(collection, &docs);
        }

        let (key, subscription) = self.subscribers.attach(collection, handler);
        self.subscribers.deliver_to(key, docs);
        Ok(subscription)
    }

    #[instrument(skip(self, fields))]
    fn create(&self, collection: &str, fields: Fields) -> Result<DocumentId, StoreError> {
        let id = DocumentId::generate();
        let doc = Document::new(id.clone(), fields);
        self.modify(Operation::Create, collection, move |docs| {
            docs.push(doc);
            Ok(((), true))
        })?;
        debug!(%id, "created document");
        Ok(id)
    }

    #[instrument(skip(self, partial), fields(id = %id))]
    fn update(
        &self,
        collection: &str,
        id: &DocumentId,
        partial: Fields,
    ) -> Result<(), StoreError> {
        self.modify(Operation::Update, collection, |docs| {
            let doc = docs
                .iter_mut()
                .find(|doc| &doc.id == id)
                .ok_or_else(|| missing_document(id))?;
            doc.merge(partial);
            Ok(((), true))
        })?;
        debug!("updated document");
        Ok(())
    }

    #[instrument(skip(self), fields(id = %id))]
    fn delete(&self, collection: &str, id: &DocumentId) -> Result<(), StoreError> {
        let removed = self.modify(Operation::Delete, collection, |docs| {
            let before = docs.len();
            docs.retain(|doc| &doc.id != id);
            let removed = before != docs.len();
            Ok((removed, removed))
        })?;
        if removed {
            debug!("deleted document");
        } else {
            debug!("delete of absent document ignored");
        }
        Ok(())
    }

    #[instrument(skip(self))]
    fn poll_changes(&self) -> Result<(), StoreError> {
        for collection in self.subscribers.watched_collections() {
            let path = self.collection_path(&collection);
            let changed = {
                let mut known = self.known.lock();
                let docs = load_jsonl(&path)
                    .map_err(|err| StoreError::new(Operation::Poll, &collection, err))?;
                if known.get(&collection) == Some(&docs) {
                    None
                } else {
                    known.insert(collection.clone(), docs.clone());
                    Some(docs)
                }
            };

            if let Some(docs) = changed {
                info!(
                    collection = %collection,
                    count = docs.len(),
                    "picked up external change"
                );
                self.subscribers.notify(&collection, &docs);
            }
        }
        Ok(())
    }
}

fn check_collection_name(operation: Operation, collection: &str) -> Result<(), StoreError> {
    let valid = !collection.is_empty()
        && collection
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '-' || ch == '_');
    if valid {
        Ok(())
    } else {
        warn!(collection, "rejected collection name");
        Err(StoreError::new(
            operation,
            collection,
            format!("invalid collection name: {collection:?}"),
        ))
    }
}

#[instrument(skip(path))]
fn load_jsonl(path: &Path) -> anyhow::Result<Vec<Document>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    debug!(file = %path.display(), "loading jsonl");
    let file = fs::File::open(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    let reader = BufReader::new(file);

    let mut out = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let doc: Document = serde_json::from_str(trimmed)
            .with_context(|| format!("failed parsing {} line {}", path.display(), idx + 1))?;
        out.push(doc);
    }

    debug!(count = out.len(), "loaded documents from jsonl");
    Ok(out)
}

#[instrument(skip(path, docs))]
fn save_jsonl_atomic(path: &Path, docs: &[Document]) -> anyhow::Result<()> {
    debug!(file = %path.display(), count = docs.len(), "saving jsonl atomically");

    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut temp = NamedTempFile::new_in(dir)?;
    for doc in docs {
        let serialized = serde_json::to_string(doc)?;
        writeln!(temp, "{serialized}")?;
    }
    temp.flush()?;

    temp.persist(path)
        .map_err(|err| anyhow!("failed to persist {}: {}", path.display(), err))?;

    Ok(())
}
