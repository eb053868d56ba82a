//! Terminal writer.
//!
//! Frames are built as an ordered command list and flushed once, so a frame either
//! reaches the terminal whole or (on I/O error) not at all past the failing command.
//!
//! Invariants:
//! * Commands preserve ordering; no flushing mid-frame.
//! * Positions are absolute with a (0,0) origin; the caller ensures bounds.
//! * A scroll region set inside a frame is reset before the frame ends.

use anyhow::Result;
use crossterm::{
    cursor::MoveTo,
    queue,
    style::{Attribute, Color, Print, ResetColor, SetAttribute, SetForegroundColor},
    terminal::{Clear, ClearType},
};
use std::io::Write;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    MoveTo(u16, u16),
    ClearLine,
    ClearAll,
    Print(String),
    Foreground(Color),
    Attribute(Attribute),
    ResetStyle,
    /// Restrict scrolling to rows `top..=bottom` (0-based, inclusive).
    ScrollRegion(u16, u16),
    /// Scroll the region's content up by n rows.
    ScrollUp(u16),
    ScrollDown(u16),
    ResetRegion,
}

#[derive(Debug, Default)]
pub struct Writer {
    cmds: Vec<Command>,
}

impl Writer {
    pub fn new() -> Self {
        Self { cmds: Vec::new() }
    }

    pub fn move_to(&mut self, x: u16, y: u16) {
        self.cmds.push(Command::MoveTo(x, y));
    }

    /// Clear the line the cursor is on; callers move to column 0 first.
    pub fn clear_line(&mut self) {
        self.cmds.push(Command::ClearLine);
    }

    pub fn clear_all(&mut self) {
        self.cmds.push(Command::ClearAll);
    }

    pub fn print<S: Into<String>>(&mut self, s: S) {
        let s: String = s.into();
        if !s.is_empty() {
            self.cmds.push(Command::Print(s));
        }
    }

    pub fn foreground(&mut self, color: Color) {
        self.cmds.push(Command::Foreground(color));
    }

    pub fn attribute(&mut self, attr: Attribute) {
        self.cmds.push(Command::Attribute(attr));
    }

    pub fn reset_style(&mut self) {
        self.cmds.push(Command::ResetStyle);
    }

    /// Shift rows `0..rows` by `delta` inside a temporary scroll region.
    /// Positive `delta` moves content up (new rows enter at the bottom).
    pub fn scroll_rows(&mut self, rows: u16, delta: isize) {
        if rows == 0 || delta == 0 {
            return;
        }
        let amount = delta.unsigned_abs().min(u16::MAX as usize) as u16;
        self.cmds.push(Command::ScrollRegion(0, rows - 1));
        if delta > 0 {
            self.cmds.push(Command::ScrollUp(amount));
        } else {
            self.cmds.push(Command::ScrollDown(amount));
        }
        self.cmds.push(Command::ResetRegion);
    }

    pub fn commands(&self) -> &[Command] {
        &self.cmds
    }

    pub fn is_empty(&self) -> bool {
        self.cmds.is_empty()
    }

    /// Emit every command to `out` and flush. Returns the number of print commands.
    pub fn flush_to<W: Write>(self, out: &mut W) -> Result<u64> {
        let mut prints = 0u64;
        for c in self.cmds {
            match c {
                Command::MoveTo(x, y) => queue!(out, MoveTo(x, y))?,
                Command::ClearLine => queue!(out, Clear(ClearType::CurrentLine))?,
                Command::ClearAll => queue!(out, Clear(ClearType::All))?,
                Command::Print(s) => {
                    prints += 1;
                    queue!(out, Print(s))?
                }
                Command::Foreground(color) => queue!(out, SetForegroundColor(color))?,
                Command::Attribute(attr) => queue!(out, SetAttribute(attr))?,
                Command::ResetStyle => queue!(out, SetAttribute(Attribute::Reset), ResetColor)?,
                // ANSI rows are 1-based.
                Command::ScrollRegion(top, bottom) => {
                    write!(out, "\x1b[{};{}r", top + 1, bottom + 1)?
                }
                Command::ScrollUp(n) => write!(out, "\x1b[{n}S")?,
                Command::ScrollDown(n) => write!(out, "\x1b[{n}T")?,
                Command::ResetRegion => write!(out, "\x1b[r")?,
            }
        }
        out.flush()?;
        Ok(prints)
    }
}
