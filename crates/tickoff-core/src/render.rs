use std::io::Write;

use anyhow::anyhow;
use unicode_width::UnicodeWidthStr;

use crate::config::Config;
use crate::screens::{EDIT_ROUTE, EditView, LIST_ROUTE, ListView};

const BOLD: &str = "1";
const DIM: &str = "2";
const INVERSE: &str = "7";
const RED: &str = "31";
const GREEN: &str = "32";
const HEADER_BLUE: &str = "1;38;2;23;55;83";
const STRUCK_GREY: &str = "9;90";

#[derive(Debug, Clone)]
pub struct Renderer {
    color: bool,
}

impl Renderer {
    /// `terminal` says whether the output is a tty; colour is only used
    /// when both the config and the output allow it.
    pub fn new(cfg: &Config, terminal: bool) -> anyhow::Result<Self> {
        let color_cfg = cfg.get("color").unwrap_or_else(|| "on".to_string());
        let color = match color_cfg.to_ascii_lowercase().as_str() {
            "on" | "yes" | "true" | "1" => true,
            "off" | "no" | "false" | "0" => false,
            other => return Err(anyhow!("invalid color setting: {other}")),
        };

        Ok(Self {
            color: color && terminal,
        })
    }

    pub fn plain() -> Self {
        Self { color: false }
    }

    #[tracing::instrument(skip_all, fields(rows = view.rows.len()))]
    pub fn render_list<W: Write>(&self, out: &mut W, view: &ListView) -> anyhow::Result<()> {
        writeln!(out, "== {LIST_ROUTE} ==")?;
        writeln!(out, "{}", self.paint(view.header, HEADER_BLUE))?;
        writeln!(out)?;

        let input = if view.input.is_empty() {
            self.paint(view.input_placeholder, DIM)
        } else {
            view.input.clone()
        };
        writeln!(out, "> {input}  [+]")?;

        let filters = view
            .filters
            .iter()
            .map(|button| {
                if button.active {
                    self.paint(&format!("[{}]", button.label), INVERSE)
                } else {
                    format!(" {} ", button.label)
                }
            })
            .collect::<Vec<_>>()
            .join(" ");
        writeln!(out, "{filters}")?;
        writeln!(out)?;

        if view.rows.is_empty() {
            return Ok(());
        }

        let headers = vec![
            "#".to_string(),
            "Done".to_string(),
            "Task".to_string(),
            String::new(),
        ];

        let rows = view
            .rows
            .iter()
            .enumerate()
            .map(|(idx, row)| {
                let check = if row.done {
                    self.paint("[x]", GREEN)
                } else {
                    "[ ]".to_string()
                };
                let label = if row.done {
                    self.paint(&row.label, STRUCK_GREY)
                } else if row.placeholder_label {
                    self.paint(&row.label, DIM)
                } else {
                    row.label.clone()
                };
                vec![
                    (idx + 1).to_string(),
                    check,
                    label,
                    self.paint("Delete", RED),
                ]
            })
            .collect();

        write_table(out, headers, rows)
    }

    #[tracing::instrument(skip_all, fields(id = %view.task_id))]
    pub fn render_edit<W: Write>(&self, out: &mut W, view: &EditView) -> anyhow::Result<()> {
        writeln!(out, "== {EDIT_ROUTE} ==")?;

        let title = if view.text.is_empty() {
            self.paint(view.text_placeholder, DIM)
        } else {
            view.text.clone()
        };
        writeln!(out, "title  {title}")?;

        if view.description.is_empty() {
            writeln!(out, "desc   {}", self.paint(view.description_placeholder, DIM))?;
        } else {
            for (idx, line) in view.description.lines().enumerate() {
                let prefix = if idx == 0 { "desc  " } else { "      " };
                writeln!(out, "{prefix} {line}")?;
            }
        }

        writeln!(out)?;
        writeln!(out, "{}", self.paint(&format!("[{}]", view.confirm_label), BOLD))?;
        Ok(())
    }

    fn paint(&self, text: &str, code: &str) -> String {
        if !self.color {
            return text.to_string();
        }
        format!("\x1b[{code}m{text}\x1b[0m")
    }
}

fn write_table<W: Write>(
    writer: &mut W,
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
) -> anyhow::Result<()> {
    let column_count = headers.len();
    let mut widths = vec![0usize; column_count];

    for (idx, header) in headers.iter().enumerate() {
        widths[idx] = widths[idx].max(UnicodeWidthStr::width(header.as_str()));
    }

    for row in &rows {
        for (idx, cell) in row.iter().enumerate() {
            widths[idx] = widths[idx].max(UnicodeWidthStr::width(strip_ansi(cell).as_str()));
        }
    }

    for idx in 0..column_count {
        write!(writer, "{:width$} ", headers[idx], width = widths[idx])?;
    }
    writeln!(writer)?;

    for width in &widths {
        write!(writer, "{:-<width$} ", "", width = *width)?;
    }
    writeln!(writer)?;

    for row in rows {
        for (idx, cell) in row.iter().enumerate() {
            let visible_width = UnicodeWidthStr::width(strip_ansi(cell).as_str());
            let padding = widths[idx].saturating_sub(visible_width);
            write!(writer, "{}{} ", cell, " ".repeat(padding))?;
        }
        writeln!(writer)?;
    }

    Ok(())
}

fn strip_ansi(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut escaped = false;

    for ch in s.chars() {
        if escaped {
            if ch == 'm' {
                escaped = false;
            }
            continue;
        }

        if ch == '\x1b' {
            escaped = true;
            continue;
        }

        out.push(ch);
    }

    out
}
