use std::fmt;
use std::str::FromStr;

use anyhow::anyhow;

use crate::task::Task;

#[derive(
  Debug,
  Clone,
  Copy,
  Default,
  PartialEq,
  Eq,
)]
pub enum StatusFilter {
  #[default]
  All,
  Completed,
  Incomplete
}

impl StatusFilter {
  pub const VARIANTS: [StatusFilter; 3] = [
    StatusFilter::All,
    StatusFilter::Completed,
    StatusFilter::Incomplete
  ];

  pub fn matches(
    self,
    task: &Task
  ) -> bool {
    match self {
      | StatusFilter::All => true,
      | StatusFilter::Completed => {
        task.done
      }
      | StatusFilter::Incomplete => {
        !task.done
      }
    }
  }

  /// Caption on the filter selector.
  pub fn label(self) -> &'static str {
    match self {
      | StatusFilter::All => {
        "All Tasks"
      }
      | StatusFilter::Completed => {
        "Completed"
      }
      | StatusFilter::Incomplete => {
        "Incomplete"
      }
    }
  }

  pub fn key(self) -> &'static str {
    match self {
      | StatusFilter::All => "all",
      | StatusFilter::Completed => {
        "completed"
      }
      | StatusFilter::Incomplete => {
        "incomplete"
      }
    }
  }

  pub fn apply<'a>(
    self,
    tasks: &'a [Task]
  ) -> Vec<&'a Task> {
    tasks
      .iter()
      .filter(|task| self.matches(task))
      .collect()
  }
}

impl fmt::Display for StatusFilter {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>
  ) -> fmt::Result {
    f.write_str(self.key())
  }
}

impl FromStr for StatusFilter {
  type Err = anyhow::Error;

  fn from_str(
    s: &str
  ) -> Result<Self, Self::Err> {
    match s
      .trim()
      .to_ascii_lowercase()
      .as_str()
    {
      | "all" => Ok(StatusFilter::All),
      | "completed" | "done" => {
        Ok(StatusFilter::Completed)
      }
      | "incomplete" | "open" => {
        Ok(StatusFilter::Incomplete)
      }
      | other => Err(anyhow!(
        "unknown filter '{other}'; \
         expected all, completed or \
         incomplete"
      ))
    }
  }
}
