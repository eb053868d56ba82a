//! Terminal session management on top of crossterm.
//!
//! `TerminalSession` puts the terminal into the state the viewer draws in (raw
//! mode, alternate screen, hidden cursor, auto-wrap off) and restores it when
//! dropped, including on early return or unwinding.

use anyhow::Result;
use crossterm::{
    cursor::{Hide, Show},
    execute,
    style::Print,
    terminal::{
        self, EnterAlternateScreen, LeaveAlternateScreen, SetTitle, disable_raw_mode,
        enable_raw_mode,
    },
};
use std::io::{Write, stdout};
use tracing::{debug, warn};

pub mod capabilities;
pub use capabilities::TerminalCapabilities;

/// Auto-wrap off so a row that fills the last column never pushes the cursor to
/// the next row.
const AUTOWRAP_OFF: &str = "\x1b[?7l";
const AUTOWRAP_ON: &str = "\x1b[?7h";
/// Reset the scroll region to the whole screen.
const REGION_RESET: &str = "\x1b[r";

/// Current terminal size as (columns, rows).
pub fn size() -> Result<(u16, u16)> {
    Ok(terminal::size()?)
}

/// Number of text rows available once `reserved` rows (status line) are taken.
pub fn text_rows(rows: u16, reserved: u16) -> usize {
    rows.saturating_sub(reserved) as usize
}

pub struct TerminalSession {
    entered: bool,
}

impl TerminalSession {
    /// Enter raw mode and the alternate screen.
    pub fn enter() -> Result<Self> {
        enable_raw_mode()?;
        let mut session = Self { entered: true };
        if let Err(e) = execute!(stdout(), EnterAlternateScreen, Hide, Print(AUTOWRAP_OFF)) {
            session.leave();
            return Err(e.into());
        }
        debug!(target: "runtime", "terminal_enter");
        Ok(session)
    }

    pub fn set_title(&mut self, title: &str) -> Result<()> {
        execute!(stdout(), SetTitle(title))?;
        Ok(())
    }

    fn leave(&mut self) {
        if !self.entered {
            return;
        }
        self.entered = false;
        let mut out = stdout();
        let restored = execute!(
            out,
            Print(REGION_RESET),
            Print(AUTOWRAP_ON),
            Show,
            LeaveAlternateScreen
        );
        let _ = out.flush();
        let raw = disable_raw_mode();
        match (restored, raw) {
            (Ok(()), Ok(())) => debug!(target: "runtime", "terminal_leave"),
            (Err(e), _) | (_, Err(e)) => {
                warn!(target: "runtime", error = %e, "terminal_restore_failed")
            }
        }
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        self.leave();
    }
}
