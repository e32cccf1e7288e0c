use std::sync::mpsc::{self, Receiver};

use tracing::{debug, error, info, instrument, trace};

use crate::filter::StatusFilter;
use crate::screens::edit::EditTaskParams;
use crate::store::{Document, DocumentId, DocumentStore, Subscription};
use crate::task::{self, Task};

pub const HEADER: &str = "Manage Your Tasks";
pub const INPUT_PLACEHOLDER: &str = "Add a new task";

/// The task list: live snapshot, new-task buffer and active filter.
///
/// Snapshots arrive through the subscription into a queue and are applied by
/// [`TaskListScreen::pump`] at the next event boundary, so a mutation only
/// shows up once the store has pushed it back.
#[derive(Debug)]
pub struct TaskListScreen {
    collection: String,
    tasks: Vec<Task>,
    input: String,
    filter: StatusFilter,
    inbox: Option<Receiver<Vec<Document>>>,
    subscription: Option<Subscription>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterButton {
    pub filter: StatusFilter,
    pub label: &'static str,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRow {
    pub id: DocumentId,
    pub label: String,
    pub done: bool,
    pub placeholder_label: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListView {
    pub header: &'static str,
    pub input: String,
    pub input_placeholder: &'static str,
    pub filters: Vec<FilterButton>,
    pub rows: Vec<TaskRow>,
}

impl TaskListScreen {
    pub fn new(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            tasks: Vec::new(),
            input: String::new(),
            filter: StatusFilter::default(),
            inbox: None,
            subscription: None,
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.subscription.is_some()
    }

    /// Starts watching the collection. A failed subscribe is logged and the
    /// screen stays empty.
    #[instrument(skip(self, store), fields(collection = %self.collection))]
    pub fn mount(&mut self, store: &dyn DocumentStore) -> bool {
        if self.is_mounted() {
            return true;
        }

        let (tx, rx) = mpsc::channel();
        let handler = Box::new(move |docs: Vec<Document>| {
            if tx.send(docs).is_err() {
                trace!("snapshot dropped; list screen is gone");
            }
        });

        match store.subscribe(&self.collection, handler) {
            Ok(subscription) => {
                info!("subscribed to task collection");
                self.inbox = Some(rx);
                self.subscription = Some(subscription);
                self.pump();
                true
            }
            Err(err) => {
                error!(error = %err, cause = ?err, "Error subscribing to tasks");
                false
            }
        }
    }

    pub fn unmount(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.unsubscribe();
            info!(collection = %self.collection, "unsubscribed from task collection");
        }
        self.inbox = None;
    }

    /// Applies queued snapshots. Each one replaces the task list outright.
    /// Returns whether anything arrived.
    pub fn pump(&mut self) -> bool {
        let Some(inbox) = self.inbox.as_ref() else {
            return false;
        };

        let mut latest = None;
        while let Ok(docs) = inbox.try_recv() {
            latest = Some(docs);
        }

        match latest {
            Some(docs) => {
                self.tasks = Task::from_snapshot(&docs);
                debug!(count = self.tasks.len(), "applied snapshot");
                true
            }
            None => false,
        }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    pub fn filter(&self) -> StatusFilter {
        self.filter
    }

    pub fn set_filter(&mut self, filter: StatusFilter) {
        debug!(%filter, "filter changed");
        self.filter = filter;
    }

    pub fn visible_tasks(&self) -> Vec<&Task> {
        self.filter.apply(&self.tasks)
    }

    /// Creates a task from the trimmed input. Blank input never reaches the
    /// store. The input is cleared only once the store acknowledges.
    #[instrument(skip(self, store), fields(collection = %self.collection))]
    pub fn create(&mut self, store: &dyn DocumentStore) -> Option<DocumentId> {
        // Editors on some platforms prepend a byte-order mark that `trim` keeps.
        let text = self.input.trim_matches(|ch: char| ch.is_whitespace() || ch == '\u{feff}');
        if text.is_empty() {
            debug!("ignoring blank task input");
            return None;
        }

        match store.create(&self.collection, task::new_task_fields(text)) {
            Ok(id) => {
                info!(%id, "task created");
                self.input.clear();
                Some(id)
            }
            Err(err) => {
                error!(error = %err, cause = ?err, "Error adding task");
                None
            }
        }
    }

    /// Sets `done` to the negation of the value the caller saw, not of the
    /// latest stored value.
    #[instrument(skip(self, store), fields(collection = %self.collection, id = %id))]
    pub fn toggle_done(&self, store: &dyn DocumentStore, id: &DocumentId, current_done: bool) {
        match store.update(&self.collection, id, task::done_patch(!current_done)) {
            Ok(()) => info!(done = !current_done, "task toggled"),
            Err(err) => error!(error = %err, cause = ?err, "Error updating task"),
        }
    }

    #[instrument(skip(self, store), fields(collection = %self.collection, id = %id))]
    pub fn delete(&self, store: &dyn DocumentStore, id: &DocumentId) {
        match store.delete(&self.collection, id) {
            Ok(()) => info!("task deleted"),
            Err(err) => error!(error = %err, cause = ?err, "Error deleting task"),
        }
    }

    /// Navigation parameters for the task's edit screen.
    pub fn edit_params(&self, id: &DocumentId) -> Option<EditTaskParams> {
        self.tasks
            .iter()
            .find(|task| &task.id == id)
            .map(EditTaskParams::from_task)
    }

    pub fn view(&self) -> ListView {
        let filters = StatusFilter::VARIANTS
            .into_iter()
            .map(|filter| FilterButton {
                filter,
                label: filter.label(),
                active: filter == self.filter,
            })
            .collect();

        let rows = self
            .visible_tasks()
            .into_iter()
            .map(|task| TaskRow {
                id: task.id.clone(),
                label: task.label().to_string(),
                done: task.done,
                placeholder_label: task.text.is_empty(),
            })
            .collect();

        ListView {
            header: HEADER,
            input: self.input.clone(),
            input_placeholder: INPUT_PLACEHOLDER,
            filters,
            rows,
        }
    }
}
