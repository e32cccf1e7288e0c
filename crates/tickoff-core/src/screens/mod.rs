pub mod edit;
pub mod list;

pub use edit::{EditTaskParams, EditTaskScreen, EditView, UpdateOutcome};
pub use list::{ListView, TaskListScreen, TaskRow};

pub const LIST_ROUTE: &str = "Task List";
pub const EDIT_ROUTE: &str = "EditTask";

#[derive(Debug)]
pub enum Screen {
    TaskList(TaskListScreen),
    EditTask(EditTaskScreen),
}

impl Screen {
    pub fn route_name(&self) -> &'static str {
        match self {
            Screen::TaskList(_) => LIST_ROUTE,
            Screen::EditTask(_) => EDIT_ROUTE,
        }
    }
}
