use serde_json::Value;

use crate::store::{Document, DocumentId, Fields};

pub const DEFAULT_COLLECTION: &str = "tasks";

pub const TEXT_FIELD: &str = "text";
pub const DESCRIPTION_FIELD: &str = "description";
pub const DONE_FIELD: &str = "done";

/// Label shown for a task whose title is empty.
pub const EMPTY_TEXT_LABEL: &str = "No task text";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub id: DocumentId,
    pub text: String,
    pub description: String,
    pub done: bool,
}

impl Task {
    /// Reads a task out of a stored document. Missing or mistyped fields fall
    /// back to an empty string or `false`.
    pub fn from_document(doc: &Document) -> Self {
        let text_of = |key: &str| {
            doc.fields
                .get(key)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };

        Self {
            id: doc.id.clone(),
            text: text_of(TEXT_FIELD),
            description: text_of(DESCRIPTION_FIELD),
            done: doc
                .fields
                .get(DONE_FIELD)
                .and_then(Value::as_bool)
                .unwrap_or(false),
        }
    }

    pub fn from_snapshot(docs: &[Document]) -> Vec<Self> {
        docs.iter().map(Self::from_document).collect()
    }

    pub fn label(&self) -> &str {
        if self.text.is_empty() {
            EMPTY_TEXT_LABEL
        } else {
            &self.text
        }
    }
}

/// Fields of a freshly created task.
pub fn new_task_fields(text: &str) -> Fields {
    let mut fields = Fields::new();
    fields.insert(TEXT_FIELD.into(), Value::from(text));
    fields.insert(DESCRIPTION_FIELD.into(), Value::from(""));
    fields.insert(DONE_FIELD.into(), Value::Bool(false));
    fields
}

pub fn done_patch(done: bool) -> Fields {
    let mut fields = Fields::new();
    fields.insert(DONE_FIELD.into(), Value::Bool(done));
    fields
}

pub fn edit_patch(text: &str, description: &str) -> Fields {
    let mut fields = Fields::new();
    fields.insert(TEXT_FIELD.into(), Value::from(text));
    fields.insert(DESCRIPTION_FIELD.into(), Value::from(description));
    fields
}
