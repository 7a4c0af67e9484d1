//! Interactive drawing commands for `whiteboard-cli session`.
//!
//! Each input line parses to a [`ReplCommand`]. [`apply`] runs it against
//! the local [`Reconciler`] and returns the intents to send, in order. No I/O
//! happens here; `main` owns stdin and the socket.

use std::fmt::Write;

use history::{DEFAULT_COLOR, EventId, HistoryError, Intent, Point, Reconciler, Tool};

pub const HELP: &str = "\
commands:
  pen X,Y [X,Y ...]     draw a pen stroke through the given points
  text X,Y [content]    place a text element (default content: New Text)
  edit ID content       replace the content of a text element
  color #RRGGBB|default set the color for new elements
  undo                  undo your most recent edit
  redo                  redo your most recently undone edit
  show                  print the visible board
  help                  print this help
  quit                  leave the board and exit";

#[derive(Debug, Clone, PartialEq)]
pub enum ReplCommand {
    Pen(Vec<Point>),
    Text { anchor: Point, content: Option<String> },
    Edit { id: EventId, content: String },
    Color(Option<String>),
    Undo,
    Redo,
    Show,
    Help,
    Quit,
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ParseError {
    #[error("empty command")]
    Empty,
    #[error("unknown command `{0}`; type `help`")]
    Unknown(String),
    #[error("expected a point like `10,20`, got `{0}`")]
    BadPoint(String),
    #[error("usage: {0}")]
    Usage(&'static str),
}

/// Parse one input line.
///
/// # Errors
///
/// Returns [`ParseError`] for unknown commands or malformed arguments.
pub fn parse_command(line: &str) -> Result<ReplCommand, ParseError> {
    let line = line.trim();
    let (word, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    let rest = rest.trim();

    match word {
        "" => Err(ParseError::Empty),
        "pen" => {
            let points = rest
                .split_whitespace()
                .map(parse_point)
                .collect::<Result<Vec<_>, _>>()?;
            if points.is_empty() {
                return Err(ParseError::Usage("pen X,Y [X,Y ...]"));
            }
            Ok(ReplCommand::Pen(points))
        }
        "text" => {
            let (anchor, content) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
            if anchor.is_empty() {
                return Err(ParseError::Usage("text X,Y [content]"));
            }
            let content = content.trim();
            Ok(ReplCommand::Text {
                anchor: parse_point(anchor)?,
                content: (!content.is_empty()).then(|| content.to_owned()),
            })
        }
        "edit" => {
            let Some((id, content)) = rest.split_once(char::is_whitespace) else {
                return Err(ParseError::Usage("edit ID content"));
            };
            Ok(ReplCommand::Edit { id: EventId::from(id), content: content.trim().to_owned() })
        }
        "color" => match rest {
            "" => Err(ParseError::Usage("color #RRGGBB|default")),
            "default" => Ok(ReplCommand::Color(None)),
            color => Ok(ReplCommand::Color(Some(color.to_owned()))),
        },
        "undo" => Ok(ReplCommand::Undo),
        "redo" => Ok(ReplCommand::Redo),
        "show" => Ok(ReplCommand::Show),
        "help" | "?" => Ok(ReplCommand::Help),
        "quit" | "exit" | "leave" => Ok(ReplCommand::Quit),
        other => Err(ParseError::Unknown(other.to_owned())),
    }
}

fn parse_point(raw: &str) -> Result<Point, ParseError> {
    let bad = || ParseError::BadPoint(raw.to_owned());
    let (x, y) = raw.split_once(',').ok_or_else(bad)?;
    let x: f64 = x.trim().parse().map_err(|_| bad())?;
    let y: f64 = y.trim().parse().map_err(|_| bad())?;
    Ok(Point::new(x, y))
}

/// Run a drawing command against the reconciler.
///
/// Returns the intents to send, in order. Commands that do not touch the
/// board (`show`, `help`, `quit`) return nothing.
///
/// # Errors
///
/// Returns [`HistoryError`] if a new element's anchor is malformed.
pub fn apply(reconciler: &mut Reconciler, command: &ReplCommand) -> Result<Vec<Intent>, HistoryError> {
    let mut intents = Vec::new();
    match command {
        ReplCommand::Pen(points) => {
            let Some((first, rest)) = points.split_first() else {
                return Ok(intents);
            };
            reconciler.set_tool(Tool::Pen);
            intents.push(reconciler.begin_stroke(*first)?);
            intents.extend(rest.iter().filter_map(|point| reconciler.extend_stroke(*point)));
            intents.extend(reconciler.finish_stroke());
        }
        ReplCommand::Text { anchor, content } => {
            reconciler.set_tool(Tool::Text);
            intents.push(reconciler.begin_stroke(*anchor)?);
            if let Some(content) = content {
                let id = reconciler.local_history().last().cloned();
                if let Some(id) = id {
                    intents.extend(reconciler.set_text(&id, content));
                }
            }
        }
        ReplCommand::Edit { id, content } => intents.extend(reconciler.set_text(id, content)),
        ReplCommand::Color(color) => reconciler.set_color(color.clone()),
        ReplCommand::Undo => intents.extend(reconciler.undo()),
        ReplCommand::Redo => intents.extend(reconciler.redo()),
        ReplCommand::Show | ReplCommand::Help | ReplCommand::Quit => {}
    }
    Ok(intents)
}

/// Text rendering of the visible board, one element per line.
#[must_use]
pub fn render(reconciler: &Reconciler) -> String {
    let visible = reconciler.visible();
    let mut out = format!(
        "board {} ({} visible / {} total, undo {} / redo {})\n",
        reconciler.board_id(),
        visible.len(),
        reconciler.history().len(),
        reconciler.local_history().len(),
        reconciler.redo_history().len(),
    );
    for event in visible {
        let anchor = event
            .anchor()
            .map_or_else(|| "-".to_owned(), |p| format!("{},{}", p.x, p.y));
        let color = event.color_or_default();
        let marker = if color == DEFAULT_COLOR { String::new() } else { format!(" {color}") };
        let _ = match event.tool {
            Tool::Pen => writeln!(out, "  pen  {} @{anchor} ({} points){marker}", event.id, event.point_count()),
            Tool::Text => writeln!(
                out,
                "  text {} @{anchor} {:?}{marker}",
                event.id,
                event.text.as_deref().unwrap_or_default()
            ),
        };
    }
    out
}

#[cfg(test)]
#[path = "repl_test.rs"]
mod tests;
