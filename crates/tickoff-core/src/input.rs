//! Turns a typed line into an action for the screen on top.

use anyhow::{Context, anyhow};
use tracing::debug;

use crate::filter::StatusFilter;

pub const LIST_COMMANDS: &[&str] = &[
    "add",
    "type",
    "toggle",
    "delete",
    "edit",
    "filter",
    "all",
    "completed",
    "incomplete",
    "refresh",
    "help",
    "quit",
];

pub const EDIT_COMMANDS: &[&str] = &["title", "desc", "update", "back", "help", "quit"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListAction {
    /// Press the add control, first replacing the input when text is given.
    Add(Option<String>),
    Type(String),
    Toggle(usize),
    Delete(usize),
    Edit(usize),
    Filter(StatusFilter),
    Refresh,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditAction {
    Title(String),
    Description(String),
    Update,
    Back,
    Help,
    Quit,
}

/// Resolves `token` to a known command, accepting any unambiguous prefix.
pub fn expand_command_abbrev<'a>(token: &str, known: &[&'a str]) -> Option<&'a str> {
    if let Some(exact) = known.iter().copied().find(|name| *name == token) {
        return Some(exact);
    }

    let mut matches = known.iter().copied().filter(|name| name.starts_with(token));
    let first = matches.next()?;
    if matches.next().is_some() {
        None
    } else {
        Some(first)
    }
}

fn split_command<'a>(line: &'a str, known: &[&'static str]) -> anyhow::Result<(&'static str, &'a str)> {
    // Only the one separator after the command word is dropped; titles and
    // descriptions keep their own leading and trailing spaces.
    let line = line.trim_start();
    let (token, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));

    if token.is_empty() {
        return Err(anyhow!("empty command"));
    }

    let lowered = token.to_ascii_lowercase();
    let command = expand_command_abbrev(&lowered, known)
        .ok_or_else(|| anyhow!("unknown or ambiguous command: {token}"))?;
    debug!(token, command, "resolved command token");
    Ok((command, rest))
}

/// Row numbers are 1-based positions in the rendered list.
fn parse_row(arg: &str) -> anyhow::Result<usize> {
    let row: usize = arg
        .parse()
        .with_context(|| format!("expected a row number, got: {arg:?}"))?;
    row.checked_sub(1)
        .ok_or_else(|| anyhow!("row numbers start at 1"))
}

pub fn parse_list_action(line: &str) -> anyhow::Result<ListAction> {
    let (command, rest) = split_command(line, LIST_COMMANDS)?;

    let action = match command {
        "add" => ListAction::Add((!rest.trim().is_empty()).then(|| rest.to_string())),
        "type" => ListAction::Type(rest.to_string()),
        "toggle" => ListAction::Toggle(parse_row(rest.trim())?),
        "delete" => ListAction::Delete(parse_row(rest.trim())?),
        "edit" => ListAction::Edit(parse_row(rest.trim())?),
        "filter" => ListAction::Filter(rest.trim().parse()?),
        "all" => ListAction::Filter(StatusFilter::All),
        "completed" => ListAction::Filter(StatusFilter::Completed),
        "incomplete" => ListAction::Filter(StatusFilter::Incomplete),
        "refresh" => ListAction::Refresh,
        "help" => ListAction::Help,
        "quit" => ListAction::Quit,
        other => return Err(anyhow!("unhandled command: {other}")),
    };
    Ok(action)
}

pub fn parse_edit_action(line: &str) -> anyhow::Result<EditAction> {
    let (command, rest) = split_command(line, EDIT_COMMANDS)?;

    let action = match command {
        "title" => EditAction::Title(rest.to_string()),
        "desc" => EditAction::Description(unescape_newlines(rest)),
        "update" => EditAction::Update,
        "back" => EditAction::Back,
        "help" => EditAction::Help,
        "quit" => EditAction::Quit,
        other => return Err(anyhow!("unhandled command: {other}")),
    };
    Ok(action)
}

/// The description field is multi-line; `\n` in typed text starts a new line.
fn unescape_newlines(text: &str) -> String {
    text.replace("\\n", "\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_with_and_without_text() {
        assert_eq!(
            parse_list_action("add Buy milk").ok(),
            Some(ListAction::Add(Some("Buy milk".into())))
        );
        assert_eq!(parse_list_action("add").ok(), Some(ListAction::Add(None)));
        assert_eq!(parse_list_action("add   ").ok(), Some(ListAction::Add(None)));
    }

    #[test]
    fn rows_are_one_based() {
        assert_eq!(parse_list_action("toggle 1").ok(), Some(ListAction::Toggle(0)));
        assert_eq!(parse_list_action("del 3").ok(), Some(ListAction::Delete(2)));
        assert!(parse_list_action("toggle 0").is_err());
        assert!(parse_list_action("edit two").is_err());
        assert_eq!(parse_list_action("edit  2 ").ok(), Some(ListAction::Edit(1)));
    }

    #[test]
    fn filter_commands_and_shortcuts() {
        assert_eq!(
            parse_list_action("filter completed").ok(),
            Some(ListAction::Filter(StatusFilter::Completed))
        );
        assert_eq!(
            parse_list_action("inc").ok(),
            Some(ListAction::Filter(StatusFilter::Incomplete))
        );
        assert!(parse_list_action("filter later").is_err());
    }

    #[test]
    fn ambiguous_prefix_is_rejected() {
        // "t" could be "type" or "toggle".
        assert!(parse_list_action("t 1").is_err());
        assert!(parse_list_action("").is_err());
    }

    #[test]
    fn edit_commands() {
        assert_eq!(
            parse_edit_action("title New title").ok(),
            Some(EditAction::Title("New title".into()))
        );
        assert_eq!(
            parse_edit_action("title  indented  ").ok(),
            Some(EditAction::Title(" indented  ".into()))
        );
        assert_eq!(
            parse_edit_action(r"desc  one\ntwo ").ok(),
            Some(EditAction::Description(" one\ntwo ".into()))
        );
        assert_eq!(
            parse_edit_action(r"desc one\ntwo").ok(),
            Some(EditAction::Description("one\ntwo".into()))
        );
        assert_eq!(parse_edit_action("u").ok(), Some(EditAction::Update));
        assert!(parse_edit_action("add x").is_err());
    }
}
