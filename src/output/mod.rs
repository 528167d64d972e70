//! Payload values flowing between processes.
//!
//! Every write along a pipeline carries an [`Output`] rather than raw
//! bytes. Filters decompose payloads with [`Output::items`] so that
//! `head`, `tail` and `grep` operate on items, never on byte offsets.

use ratatui::text::{Line, Span, Text};

/// Layout hint for [`Output::Array`] rendering.
///
/// `Rows` renders one member per line; `Columns` packs member strings
/// onto a single wrapped line (directory listings).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    Rows,
    Columns,
}

/// Tagged payload exchanged between processes.
#[derive(Debug, Clone, PartialEq)]
pub enum Output {
    /// Pre-styled markup, rendered verbatim.
    Raw(Text<'static>),
    /// Plain text, styled by the theme at render time.
    Text(String),
    /// Ordered members with a layout hint.
    Array(Vec<Output>, Layout),
    /// Opaque value rendered via its string form.
    Object(serde_json::Value),
}

impl Output {
    pub fn text(s: impl Into<String>) -> Self {
        Output::Text(s.into())
    }

    pub fn rows(items: Vec<Output>) -> Self {
        Output::Array(items, Layout::Rows)
    }

    pub fn columns(items: Vec<Output>) -> Self {
        Output::Array(items, Layout::Columns)
    }

    /// Single-line pre-styled payload.
    pub fn styled(s: impl Into<String>, style: ratatui::style::Style) -> Self {
        Output::Raw(Text::from(Line::from(Span::styled(s.into(), style))))
    }

    /// Flat string form of the payload.
    ///
    /// Array members are joined with newlines, which is what the
    /// filters and the history mechanism compare against.
    pub fn str(&self) -> String {
        match self {
            Output::Raw(text) => text
                .lines
                .iter()
                .map(line_str)
                .collect::<Vec<_>>()
                .join("\n"),
            Output::Text(s) => s.clone(),
            Output::Array(items, _) => items
                .iter()
                .map(Output::str)
                .collect::<Vec<_>>()
                .join("\n"),
            Output::Object(value) => match value {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            },
        }
    }

    /// Render into terminal text. `Raw` keeps its styling; everything
    /// else picks up the default style of the pane it lands in.
    pub fn render(&self) -> Text<'static> {
        match self {
            Output::Raw(text) => text.clone(),
            Output::Text(s) => Text::from(
                s.split('\n')
                    .map(|l| Line::from(l.to_string()))
                    .collect::<Vec<_>>(),
            ),
            Output::Array(items, Layout::Rows) => {
                let mut lines = Vec::new();
                for item in items {
                    lines.extend(item.render().lines);
                }
                Text::from(lines)
            }
            Output::Array(items, Layout::Columns) => {
                let joined = items
                    .iter()
                    .map(Output::str)
                    .collect::<Vec<_>>()
                    .join("  ");
                Text::from(Line::from(joined))
            }
            Output::Object(_) => Text::from(
                self.str()
                    .split('\n')
                    .map(|l| Line::from(l.to_string()))
                    .collect::<Vec<_>>(),
            ),
        }
    }

    /// Decompose into a sequence of sub-outputs.
    ///
    /// Text and Raw split on line breaks, Array yields its members,
    /// Object yields itself.
    pub fn items(&self) -> Vec<Output> {
        match self {
            Output::Raw(text) => text
                .lines
                .iter()
                .map(|line| Output::Raw(Text::from(line.clone())))
                .collect(),
            Output::Text(s) => s.split('\n').map(Output::text).collect(),
            Output::Array(items, _) => items.clone(),
            Output::Object(_) => vec![self.clone()],
        }
    }
}

fn line_str(line: &Line<'_>) -> String {
    line.spans.iter().map(|s| s.content.as_ref()).collect()
}
