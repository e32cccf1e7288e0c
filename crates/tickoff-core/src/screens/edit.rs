use tracing::{error, info, instrument};

use crate::store::{DocumentId, DocumentStore};
use crate::task::{self, Task};

pub const TEXT_PLACEHOLDER: &str = "Edit your task title";
pub const DESCRIPTION_PLACEHOLDER: &str = "Edit your task description";
pub const CONFIRM_LABEL: &str = "Update";

/// What the list screen hands over when a row label is activated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditTaskParams {
    pub task_id: DocumentId,
    pub current_text: String,
    pub current_description: String,
}

impl EditTaskParams {
    pub fn from_task(task: &Task) -> Self {
        Self {
            task_id: task.id.clone(),
            current_text: task.text.clone(),
            current_description: task.description.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    Saved,
    Failed,
}

#[derive(Debug)]
pub struct EditTaskScreen {
    collection: String,
    params: EditTaskParams,
    text: String,
    description: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditView {
    pub task_id: DocumentId,
    pub text: String,
    pub text_placeholder: &'static str,
    pub description: String,
    pub description_placeholder: &'static str,
    pub confirm_label: &'static str,
}

impl EditTaskScreen {
    pub fn new(collection: impl Into<String>, params: EditTaskParams) -> Self {
        Self {
            collection: collection.into(),
            text: params.current_text.clone(),
            description: params.current_description.clone(),
            params,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    /// Writes both buffers over the task's title and description. On failure
    /// the buffers are left as they are for another attempt.
    #[instrument(skip(self, store), fields(collection = %self.collection, id = %self.params.task_id))]
    pub fn update(&self, store: &dyn DocumentStore) -> UpdateOutcome {
        let patch = task::edit_patch(&self.text, &self.description);
        match store.update(&self.collection, &self.params.task_id, patch) {
            Ok(()) => {
                info!("task updated");
                UpdateOutcome::Saved
            }
            Err(err) => {
                error!(error = %err, cause = ?err, "Error updating task");
                UpdateOutcome::Failed
            }
        }
    }

    pub fn view(&self) -> EditView {
        EditView {
            task_id: self.params.task_id.clone(),
            text: self.text.clone(),
            text_placeholder: TEXT_PLACEHOLDER,
            description: self.description.clone(),
            description_placeholder: DESCRIPTION_PLACEHOLDER,
            confirm_label: CONFIRM_LABEL,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn buffers_start_from_params() {
        let screen = EditTaskScreen::new(
            "tasks",
            EditTaskParams {
                task_id: DocumentId::from("t1"),
                current_text: "Old".into(),
                current_description: "line one".into(),
            },
        );
        assert_eq!(screen.text(), "Old");
        assert_eq!(screen.description(), "line one");
        assert_eq!(screen.view().confirm_label, CONFIRM_LABEL);
    }

    #[test]
    fn update_overwrites_title_and_description() {
        let store = MemoryStore::new();
        let id = store
            .create("tasks", task::new_task_fields("Old"))
            .expect("seed");

        let mut screen = EditTaskScreen::new(
            "tasks",
            EditTaskParams {
                task_id: id.clone(),
                current_text: "Old".into(),
                current_description: String::new(),
            },
        );
        screen.set_text("New");
        screen.set_description("first\nsecond");
        assert_eq!(screen.update(&store), UpdateOutcome::Saved);

        let stored = Task::from_document(&store.get("tasks", &id).expect("stored"));
        assert_eq!(stored.text, "New");
        assert_eq!(stored.description, "first\nsecond");
        assert!(!stored.done);
    }

    #[test]
    fn update_of_vanished_task_fails_and_keeps_buffers() {
        let store = MemoryStore::new();
        let mut screen = EditTaskScreen::new(
            "tasks",
            EditTaskParams {
                task_id: DocumentId::from("deleted-meanwhile"),
                current_text: "Old".into(),
                current_description: String::new(),
            },
        );
        screen.set_text("Unsaved");

        assert_eq!(screen.update(&store), UpdateOutcome::Failed);
        assert_eq!(screen.text(), "Unsaved");
    }
}
