//! Event loop: one input line per turn, snapshots applied between turns.

use std::io::{BufRead, Write};

use tracing::{debug, error, info, instrument, warn};

use crate::input::{self, EditAction, ListAction};
use crate::navigator::Navigator;
use crate::render::Renderer;
use crate::screens::{EditTaskScreen, Screen, TaskListScreen, UpdateOutcome};
use crate::store::DocumentStore;

const LIST_HELP: &str = "\
commands: add [text] | type <text> | toggle <row> | delete <row> | edit <row>
          filter <all|completed|incomplete> | all | completed | incomplete
          refresh | help | quit";

const EDIT_HELP: &str = "\
commands: title <text> | desc <text> (\\n for a new line) | update | back | help | quit";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct App<S: DocumentStore> {
    store: S,
    collection: String,
    nav: Navigator<Screen>,
    renderer: Renderer,
}

impl<S: DocumentStore> App<S> {
    /// Builds the navigator with the list screen as its initial route and
    /// mounts it.
    pub fn new(store: S, collection: impl Into<String>, renderer: Renderer) -> Self {
        let collection = collection.into();
        let mut list = TaskListScreen::new(collection.clone());
        list.mount(&store);

        Self {
            store,
            collection,
            nav: Navigator::new(Screen::TaskList(list)),
            renderer,
        }
    }

    pub fn navigator(&self) -> &Navigator<Screen> {
        &self.nav
    }

    pub fn list_screen(&self) -> Option<&TaskListScreen> {
        match self.nav.root() {
            Screen::TaskList(list) => Some(list),
            Screen::EditTask(_) => None,
        }
    }

    /// Event boundary: pick up foreign writes and apply queued snapshots.
    pub fn sync(&mut self) {
        if let Err(err) = self.store.poll_changes() {
            error!(error = %err, cause = ?err, "Error polling tasks");
        }

        for screen in self.nav.iter_mut() {
            if let Screen::TaskList(list) = screen {
                list.pump();
            }
        }
    }

    pub fn render<W: Write>(&self, out: &mut W) -> anyhow::Result<()> {
        match self.nav.current() {
            Screen::TaskList(list) => self.renderer.render_list(out, &list.view()),
            Screen::EditTask(edit) => self.renderer.render_edit(out, &edit.view()),
        }
    }

    #[instrument(skip(self, out))]
    pub fn handle_line<W: Write>(&mut self, line: &str, out: &mut W) -> anyhow::Result<Flow> {
        if line.trim().is_empty() {
            return Ok(Flow::Continue);
        }

        let on_list = matches!(self.nav.current(), Screen::TaskList(_));
        if on_list {
            match input::parse_list_action(line) {
                Ok(action) => self.dispatch_list(action, out),
                Err(err) => hint(out, &err),
            }
        } else {
            match input::parse_edit_action(line) {
                Ok(action) => self.dispatch_edit(action, out),
                Err(err) => hint(out, &err),
            }
        }
    }

    fn dispatch_list<W: Write>(&mut self, action: ListAction, out: &mut W) -> anyhow::Result<Flow> {
        debug!(?action, "list action");
        let Screen::TaskList(list) = self.nav.current_mut() else {
            return Ok(Flow::Continue);
        };

        match action {
            ListAction::Add(text) => {
                if let Some(text) = text {
                    list.set_input(text);
                }
                list.create(&self.store);
            }
            ListAction::Type(text) => list.set_input(text),
            ListAction::Toggle(row) => {
                let Some(task) = list.visible_tasks().get(row).map(|t| (*t).clone()) else {
                    return no_such_row(out, row);
                };
                list.toggle_done(&self.store, &task.id, task.done);
            }
            ListAction::Delete(row) => {
                let Some(id) = list.visible_tasks().get(row).map(|t| t.id.clone()) else {
                    return no_such_row(out, row);
                };
                list.delete(&self.store, &id);
            }
            ListAction::Edit(row) => {
                let params = list
                    .visible_tasks()
                    .get(row)
                    .and_then(|task| list.edit_params(&task.id));
                let Some(params) = params else {
                    return no_such_row(out, row);
                };
                info!(id = %params.task_id, "opening edit screen");
                let edit = EditTaskScreen::new(self.collection.clone(), params);
                self.nav.push(Screen::EditTask(edit));
            }
            ListAction::Filter(filter) => list.set_filter(filter),
            ListAction::Refresh => {}
            ListAction::Help => writeln!(out, "{LIST_HELP}")?,
            ListAction::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }

    fn dispatch_edit<W: Write>(&mut self, action: EditAction, out: &mut W) -> anyhow::Result<Flow> {
        debug!(?action, "edit action");
        let Screen::EditTask(edit) = self.nav.current_mut() else {
            return Ok(Flow::Continue);
        };

        match action {
            EditAction::Title(text) => edit.set_text(text),
            EditAction::Description(text) => edit.set_description(text),
            EditAction::Update => {
                if edit.update(&self.store) == UpdateOutcome::Saved {
                    self.nav.go_back();
                }
            }
            EditAction::Back => {
                self.nav.go_back();
            }
            EditAction::Help => writeln!(out, "{EDIT_HELP}")?,
            EditAction::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }

    /// Runs until `quit` or end of input.
    #[instrument(skip_all)]
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, mut out: W) -> anyhow::Result<()> {
        let mut lines = input.lines();
        loop {
            self.sync();
            self.render(&mut out)?;
            write!(out, "{}> ", self.nav.current().route_name())?;
            out.flush()?;

            let Some(line) = lines.next() else {
                writeln!(out)?;
                info!("end of input");
                break;
            };
            let line = line?;

            if self.handle_line(&line, &mut out)? == Flow::Quit {
                info!("quit requested");
                break;
            }
        }
        Ok(())
    }
}

fn hint<W: Write>(out: &mut W, err: &anyhow::Error) -> anyhow::Result<Flow> {
    warn!(error = %err, "rejected input");
    writeln!(out, "? {err} (type 'help' for commands)")?;
    Ok(Flow::Continue)
}

fn no_such_row<W: Write>(out: &mut W, row: usize) -> anyhow::Result<Flow> {
    writeln!(out, "? no task in row {}", row + 1)?;
    Ok(Flow::Continue)
}
