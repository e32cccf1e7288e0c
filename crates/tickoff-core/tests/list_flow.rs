mod support;

use serde_json::{Value, json};
use support::{Call, FlakyStore};
use tickoff_core::app::App;
use tickoff_core::filter::StatusFilter;
use tickoff_core::render::Renderer;
use tickoff_core::screens::{EditTaskParams, EditTaskScreen, Screen, TaskListScreen, UpdateOutcome};
use tickoff_core::store::{DocumentStore, Fields};
use tickoff_core::task::{self, Task};

fn fields(value: Value) -> Fields {
    value.as_object().cloned().unwrap_or_default()
}

fn app(store: &FlakyStore) -> App<FlakyStore> {
    App::new(store.clone(), "tasks", Renderer::plain())
}

fn send(app: &mut App<FlakyStore>, line: &str) {
    let mut sink = Vec::new();
    app.handle_line(line, &mut sink).expect("handle line");
    app.sync();
}

fn list(app: &App<FlakyStore>) -> &TaskListScreen {
    app.list_screen().expect("list screen at root")
}

fn shown_under(screen: &mut TaskListScreen, filter: StatusFilter) -> Vec<String> {
    screen.set_filter(filter);
    screen
        .view()
        .rows
        .into_iter()
        .map(|row| row.label)
        .collect()
}

#[test]
fn blank_input_never_calls_create() {
    let store = FlakyStore::new();
    let mut screen = TaskListScreen::new("tasks");
    screen.mount(&store);

    for blank in ["", " ", "   \t", "\n \n"] {
        screen.set_input(blank);
        screen.create(&store);
    }
    assert!(store.calls().is_empty());
}

#[test]
fn successful_create_empties_input() {
    let store = FlakyStore::new();
    let mut screen = TaskListScreen::new("tasks");
    screen.mount(&store);

    screen.set_input(" Buy milk ");
    screen.create(&store);

    assert_eq!(screen.input(), "");
    assert_eq!(
        store.calls(),
        vec![Call::Create(fields(
            json!({"text": "Buy milk", "description": "", "done": false})
        ))]
    );
}

#[test]
fn failed_create_keeps_input_and_adds_nothing() {
    let store = FlakyStore::new();
    let mut screen = TaskListScreen::new("tasks");
    screen.mount(&store);
    store.set_failing(true);

    screen.set_input("Buy milk");
    assert!(screen.create(&store).is_none());
    screen.pump();

    assert_eq!(screen.input(), "Buy milk");
    assert!(screen.tasks().is_empty());
}

#[test]
fn failed_subscribe_renders_an_empty_list() {
    let store = FlakyStore::new();
    store
        .inner()
        .create("tasks", task::new_task_fields("Buy milk"))
        .expect("seed");
    store.set_failing(true);

    let mut screen = TaskListScreen::new("tasks");
    assert!(!screen.mount(&store));
    assert!(!screen.is_mounted());
    screen.pump();

    assert!(screen.tasks().is_empty());
    assert!(screen.view().rows.is_empty());
}

#[test]
fn filter_membership_follows_done_flag() {
    let store = FlakyStore::new();
    for (text, done) in [("a", false), ("b", true), ("c", false), ("d", true)] {
        store
            .inner()
            .create("tasks", fields(json!({"text": text, "done": done})))
            .expect("seed");
    }

    let mut screen = TaskListScreen::new("tasks");
    screen.mount(&store);

    for filter in StatusFilter::VARIANTS {
        screen.set_filter(filter);
        for task in screen.tasks() {
            let expected = match filter {
                StatusFilter::All => true,
                StatusFilter::Completed => task.done,
                StatusFilter::Incomplete => !task.done,
            };
            let shown = screen.visible_tasks().iter().any(|t| t.id == task.id);
            assert_eq!(shown, expected, "{filter} / {}", task.text);
        }
    }
}

#[test]
fn toggle_uses_the_flag_the_row_showed() {
    let store = FlakyStore::new();
    let mut app = app(&store);
    send(&mut app, "add Buy milk");
    let id = list(&app).tasks()[0].id.clone();

    // Someone else completes it; the list has not seen that snapshot yet.
    store
        .inner()
        .update("tasks", &id, task::done_patch(true))
        .expect("external update");

    let mut sink = Vec::new();
    app.handle_line("toggle 1", &mut sink).expect("toggle");

    let last = store.calls().pop();
    assert_eq!(last, Some(Call::Update(id, task::done_patch(true))));
}

#[test]
fn failed_toggle_and_delete_are_silent() {
    let store = FlakyStore::new();
    let mut app = app(&store);
    send(&mut app, "add Buy milk");
    store.set_failing(true);

    send(&mut app, "toggle 1");
    send(&mut app, "delete 1");

    assert_eq!(list(&app).tasks().len(), 1);
    assert!(!list(&app).tasks()[0].done);
}

#[test]
fn saved_update_navigates_back_exactly_once() {
    let store = FlakyStore::new();
    let mut app = app(&store);
    send(&mut app, "add Old");
    send(&mut app, "edit 1");
    assert_eq!(app.navigator().depth(), 2);

    send(&mut app, "title New");
    send(&mut app, "update");
    assert_eq!(app.navigator().depth(), 1);
    assert!(matches!(app.navigator().current(), Screen::TaskList(_)));
}

#[test]
fn edited_title_keeps_its_own_spaces() {
    let store = FlakyStore::new();
    let mut app = app(&store);
    send(&mut app, "add Old");
    send(&mut app, "edit 1");
    send(&mut app, "title   padded ");
    send(&mut app, "update");

    assert_eq!(list(&app).tasks()[0].text, "  padded ");
}

#[test]
fn failed_update_stays_with_buffers_intact() {
    let store = FlakyStore::new();
    let mut app = app(&store);
    send(&mut app, "add Old");
    send(&mut app, "edit 1");
    send(&mut app, "title Unsaved");
    send(&mut app, r"desc first\nsecond");

    store.set_failing(true);
    send(&mut app, "update");

    assert_eq!(app.navigator().depth(), 2);
    let Screen::EditTask(edit) = app.navigator().current() else {
        panic!("expected edit screen on top");
    };
    assert_eq!(edit.text(), "Unsaved");
    assert_eq!(edit.description(), "first\nsecond");
    assert_eq!(list(&app).tasks()[0].text, "Old");
}

#[test]
fn deleted_task_disappears_under_every_filter() {
    let store = FlakyStore::new();
    let mut screen = TaskListScreen::new("tasks");
    screen.mount(&store);
    screen.set_input("Buy milk");
    let id = screen.create(&store).expect("created");
    screen.pump();

    screen.delete(&store, &id);
    screen.pump();

    for filter in StatusFilter::VARIANTS {
        assert!(shown_under(&mut screen, filter).is_empty());
    }
}

#[test]
fn buy_milk_scenario() {
    let store = FlakyStore::new();
    let mut screen = TaskListScreen::new("tasks");
    screen.mount(&store);

    screen.set_input("Buy milk");
    let id = screen.create(&store).expect("created");
    screen.pump();
    assert_eq!(
        screen.tasks(),
        &[Task {
            id: id.clone(),
            text: "Buy milk".into(),
            description: String::new(),
            done: false,
        }]
    );
    assert_eq!(shown_under(&mut screen, StatusFilter::All), vec!["Buy milk"]);
    assert_eq!(shown_under(&mut screen, StatusFilter::Incomplete), vec!["Buy milk"]);
    assert!(shown_under(&mut screen, StatusFilter::Completed).is_empty());

    let done = screen.tasks()[0].done;
    screen.toggle_done(&store, &id, done);
    screen.pump();
    assert!(screen.tasks()[0].done);
    assert_eq!(shown_under(&mut screen, StatusFilter::All), vec!["Buy milk"]);
    assert_eq!(shown_under(&mut screen, StatusFilter::Completed), vec!["Buy milk"]);
    assert!(shown_under(&mut screen, StatusFilter::Incomplete).is_empty());
}

#[test]
fn edit_scenario_old_to_new() {
    let store = FlakyStore::new();
    let id = store
        .inner()
        .create("tasks", task::new_task_fields("Old"))
        .expect("seed");
    let mut list = TaskListScreen::new("tasks");
    list.mount(&store);

    let params = list.edit_params(&id).expect("params");
    assert_eq!(
        params,
        EditTaskParams {
            task_id: id.clone(),
            current_text: "Old".into(),
            current_description: String::new(),
        }
    );

    let mut edit = EditTaskScreen::new("tasks", params);
    edit.set_text("New");
    assert_eq!(edit.update(&store), UpdateOutcome::Saved);

    list.pump();
    assert_eq!(list.tasks()[0].id, id);
    assert_eq!(list.tasks()[0].text, "New");
}
