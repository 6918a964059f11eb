//! Line-oriented stand-in for a graphical header.
//!
//! Each stdin line becomes one [`UiEvent`]; every header change is printed as
//! a short text block.

use std::io::BufRead;

use subsentry_frontend::dom::{Bounds, KeyDownEvent, Modifiers, Point, PointerDownEvent};
use subsentry_frontend::views::UiEvent;
use subsentry_frontend::views::alerts_panel::{
    EMPTY_TEXT, HeaderView, LOADING_TEXT, PANEL_TITLE, PanelView, VIEW_ALL_HREF, VIEW_ALL_LABEL,
};
use tokio::sync::mpsc::Sender;

/// Where the bell and its dropdown sit on the imaginary surface.
pub const DROPDOWN_BOUNDS: Bounds = Bounds::new(600.0, 0.0, 320.0, 400.0);

pub const HELP: &str = "commands: bell | click <x> <y> | key [ctrl+|meta+]<key> | refresh | auth | url <base> | quit";

#[derive(Debug, Clone, PartialEq)]
pub enum ConsoleCommand {
    Ui(UiEvent),
    Help,
    Quit,
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConsoleError {
    #[error("unknown command `{0}`")]
    UnknownCommand(String),
    #[error("missing argument for `{0}`")]
    MissingArgument(&'static str),
    #[error("invalid coordinate `{0}`")]
    InvalidCoordinate(String),
}

fn parse_coordinate(raw: Option<&str>) -> Result<f32, ConsoleError> {
    let raw = raw.ok_or(ConsoleError::MissingArgument("click"))?;
    raw.parse()
        .map_err(|_| ConsoleError::InvalidCoordinate(raw.to_string()))
}

fn parse_key(combo: &str) -> KeyDownEvent {
    let mut modifiers = Modifiers::default();
    let mut parts: Vec<&str> = combo.split('+').collect();
    let key = parts.pop().unwrap_or_default();
    for modifier in parts {
        match modifier.to_ascii_lowercase().as_str() {
            "ctrl" | "control" => modifiers.control = true,
            "meta" | "cmd" => modifiers.meta = true,
            "alt" => modifiers.alt = true,
            "shift" => modifiers.shift = true,
            other => log::warn!("Ignoring unknown modifier `{other}`"),
        }
    }
    KeyDownEvent::new(key, modifiers)
}

/// Parse one console line. Blank lines yield `None`.
pub fn parse_line(line: &str) -> Result<Option<ConsoleCommand>, ConsoleError> {
    let mut words = line.split_whitespace();
    let Some(command) = words.next() else {
        return Ok(None);
    };

    let command = match command.to_ascii_lowercase().as_str() {
        "bell" => ConsoleCommand::Ui(UiEvent::BellActivated),
        "click" => {
            let x = parse_coordinate(words.next())?;
            let y = parse_coordinate(words.next())?;
            ConsoleCommand::Ui(UiEvent::PointerDown(PointerDownEvent {
                position: Point::new(x, y),
            }))
        }
        "key" => {
            let combo = words.next().ok_or(ConsoleError::MissingArgument("key"))?;
            ConsoleCommand::Ui(UiEvent::KeyDown(parse_key(combo)))
        }
        "refresh" => ConsoleCommand::Ui(UiEvent::RefreshRequested),
        "auth" => ConsoleCommand::Ui(UiEvent::AuthStateChanged),
        "url" => {
            let url = words.next().ok_or(ConsoleError::MissingArgument("url"))?;
            ConsoleCommand::Ui(UiEvent::SetApiBaseUrl(url.to_string()))
        }
        "help" | "?" => ConsoleCommand::Help,
        "quit" | "exit" => ConsoleCommand::Quit,
        other => return Err(ConsoleError::UnknownCommand(other.to_string())),
    };
    Ok(Some(command))
}

/// Read stdin on a plain thread and feed the header until `quit` or EOF.
pub fn spawn_reader(events: Sender<UiEvent>) -> std::thread::JoinHandle<()> {
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    log::error!("Failed to read from stdin: {e}");
                    break;
                }
            };
            match parse_line(&line) {
                Ok(Some(ConsoleCommand::Ui(event))) => {
                    if events.blocking_send(event).is_err() {
                        break;
                    }
                }
                Ok(Some(ConsoleCommand::Help)) => println!("{HELP}"),
                Ok(Some(ConsoleCommand::Quit)) => break,
                Ok(None) => {}
                Err(e) => println!("{e}. {HELP}"),
            }
        }
    })
}

pub fn render_text(view: &HeaderView) -> String {
    let mut out = match &view.badge {
        Some(badge) => format!("[bell {badge}]"),
        None => "[bell]".to_string(),
    };

    let Some(panel) = &view.panel else {
        return out;
    };

    out.push_str(&format!("\n  {PANEL_TITLE}"));
    match panel {
        PanelView::Loading => out.push_str(&format!("\n  {LOADING_TEXT}")),
        PanelView::Failed(message) => out.push_str(&format!("\n  ! {message}")),
        PanelView::Empty => out.push_str(&format!("\n  {EMPTY_TEXT}")),
        PanelView::Loaded(rows) => {
            for row in rows {
                out.push_str(&format!(
                    "\n  - {} | {} | {} | {}",
                    row.name,
                    row.formatted_date,
                    row.days_label.as_deref().unwrap_or("?"),
                    row.tag.label(),
                ));
                if let Some(price) = &row.price {
                    out.push_str(&format!(" | {price}"));
                }
                if row.is_trial {
                    out.push_str(" | trial");
                }
            }
        }
    }
    out.push_str(&format!("\n  {VIEW_ALL_LABEL} -> {VIEW_ALL_HREF}"));
    out
}
