//! Arrow-key list picker for interactive terminals.
//!
//! ```text
//! Choose a command:
//!
//! > 1. ArrowDown
//!   2. ArrowLeft
//!   ...
//!
//! Use ↑/↓ to navigate, Enter to select, q to quit.
//! ```
//!
//! The list is drawn on the alternate screen with raw mode on, so single key
//! presses arrive without Enter.  The cursor wraps at both ends.  Enter picks
//! the highlighted item; `q`, Esc and Ctrl-C cancel.  Raw mode and the
//! alternate screen are always restored before [`Selector::select`] returns.
//!
//! Used when stdin and stdout are both terminals; otherwise the CLI falls back
//! to [`PromptSelector`](crate::infrastructure::prompt::PromptSelector).

use std::io::{self, Stdout, Write};

use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::style::{Attribute, Color, Print, ResetColor, SetAttribute, SetForegroundColor};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, Clear, ClearType, EnterAlternateScreen,
    LeaveAlternateScreen,
};
use crossterm::{execute, queue};

use crate::application::select::{SelectError, Selection, Selector};

const HELP_LINE: &str = "Use ↑/↓ to navigate, Enter to select, q to quit.";

/// What one key press did to the list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeyAction {
    Moved,
    Chosen(usize),
    Cancelled,
    Ignored,
}

/// Highlighted row of a list of `len` items.
#[derive(Debug)]
struct ListCursor {
    position: usize,
    len: usize,
}

impl ListCursor {
    fn new(len: usize) -> Self {
        Self { position: 0, len }
    }

    fn handle(&mut self, key: KeyEvent) -> KeyAction {
        // Windows also reports releases and repeats.
        if key.kind != KeyEventKind::Press {
            return KeyAction::Ignored;
        }
        match key.code {
            KeyCode::Up => {
                self.position = self.position.checked_sub(1).unwrap_or(self.len - 1);
                KeyAction::Moved
            }
            KeyCode::Down => {
                self.position = (self.position + 1) % self.len;
                KeyAction::Moved
            }
            KeyCode::Enter => KeyAction::Chosen(self.position),
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                KeyAction::Cancelled
            }
            KeyCode::Char('q') | KeyCode::Esc => KeyAction::Cancelled,
            _ => KeyAction::Ignored,
        }
    }
}

/// Raw mode plus alternate screen, undone on drop.
struct RawScreen<W: Write> {
    out: W,
}

impl<W: Write> RawScreen<W> {
    fn enter(mut out: W) -> io::Result<Self> {
        enable_raw_mode()?;
        if let Err(e) = execute!(out, EnterAlternateScreen, Hide) {
            let _ = disable_raw_mode();
            return Err(e);
        }
        Ok(Self { out })
    }
}

impl<W: Write> Drop for RawScreen<W> {
    fn drop(&mut self) {
        let _ = execute!(self.out, Show, LeaveAlternateScreen);
        let _ = disable_raw_mode();
    }
}

/// Draws the whole list with `selected` highlighted.  Raw mode needs
/// explicit carriage returns.
fn render(out: &mut impl Write, title: &str, items: &[String], selected: usize) -> io::Result<()> {
    queue!(out, MoveTo(0, 0), Clear(ClearType::All), Print(title), Print("\r\n\r\n"))?;
    for (i, item) in items.iter().enumerate() {
        if i == selected {
            queue!(
                out,
                SetForegroundColor(Color::Green),
                SetAttribute(Attribute::Bold),
                Print(">"),
                SetAttribute(Attribute::Reset),
                ResetColor
            )?;
        } else {
            queue!(out, Print(" "))?;
        }
        queue!(out, Print(format!(" {}. {item}\r\n", i + 1)))?;
    }
    queue!(
        out,
        Print("\r\n"),
        SetForegroundColor(Color::DarkGrey),
        Print(HELP_LINE),
        ResetColor
    )?;
    out.flush()
}

/// [`Selector`] driven by arrow keys on the controlling terminal.
#[derive(Debug, Default)]
pub struct TerminalSelector;

impl TerminalSelector {
    pub fn new() -> Self {
        Self
    }
}

impl Selector for TerminalSelector {
    fn select(&mut self, title: &str, items: &[String]) -> Result<Selection, SelectError> {
        if items.is_empty() {
            return Err(SelectError::Empty);
        }

        let mut cursor = ListCursor::new(items.len());
        let mut screen = RawScreen::<Stdout>::enter(io::stdout())?;
        loop {
            render(&mut screen.out, title, items, cursor.position)?;
            let Event::Key(key) = event::read()? else {
                continue;
            };
            match cursor.handle(key) {
                KeyAction::Chosen(idx) => return Ok(Selection::Chosen(idx)),
                KeyAction::Cancelled => return Ok(Selection::Cancelled),
                KeyAction::Moved | KeyAction::Ignored => {}
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
