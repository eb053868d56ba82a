//! Status line composition.
//!
//! Format:
//! `[FOLLOW] <name> raw:N filter:M | top/total | <wrap>[ | /needle][ | message]`
//! * `[PAUSED]` replaces `[FOLLOW]` when follow mode is off.
//! * `<name>` is the base file name of the tailed path.
//! * One `stage:count` pair per pipeline stage, in pipeline order.
//! * `top` is the 1-based first visible line (0 when there is no data).
//! * While the filter is being edited the needle segment becomes `filter: <input>`.
//!
//! Two stages, same as everywhere status text is built: `compose_status` produces
//! ordered `StatusSegment`s, `format_status` renders them.

use core_text::WrapMode;
use std::borrow::Cow;
use std::fmt::Write as _;
use std::path::Path;

/// Filter state as shown on the status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterView<'a> {
    Inactive,
    Active(&'a str),
    /// Prompt open with the text typed so far.
    Editing(&'a str),
}

pub struct StatusContext<'a> {
    pub file_name: Option<&'a Path>,
    pub follow: bool,
    pub stage_counts: &'a [(&'static str, usize)],
    /// 0-based first visible line.
    pub top: usize,
    pub total: usize,
    pub wrap: WrapMode,
    pub filter: FilterView<'a>,
    pub message: Option<&'a str>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusSegment<'a> {
    Follow(bool),
    FileName(Cow<'a, str>),
    StageCount { name: &'static str, lines: usize },
    Position { top_1: usize, total: usize },
    Wrap(&'static str),
    Filter(&'a str),
    Prompt(&'a str),
    Message(&'a str),
}

pub fn compose_status<'a>(ctx: &StatusContext<'a>) -> Vec<StatusSegment<'a>> {
    let mut out = Vec::with_capacity(6 + ctx.stage_counts.len());
    out.push(StatusSegment::Follow(ctx.follow));
    if let Some(path) = ctx.file_name {
        let name = match path.file_name() {
            Some(name) => name.to_string_lossy(),
            None => path.to_string_lossy(),
        };
        out.push(StatusSegment::FileName(name));
    }
    out.extend(
        ctx.stage_counts
            .iter()
            .map(|&(name, lines)| StatusSegment::StageCount { name, lines }),
    );
    let top_1 = if ctx.total == 0 { 0 } else { ctx.top + 1 };
    out.push(StatusSegment::Position {
        top_1,
        total: ctx.total,
    });
    out.push(StatusSegment::Wrap(ctx.wrap.label()));
    match ctx.filter {
        FilterView::Inactive => {}
        FilterView::Active("") => {}
        FilterView::Active(needle) => out.push(StatusSegment::Filter(needle)),
        FilterView::Editing(input) => out.push(StatusSegment::Prompt(input)),
    }
    if let Some(message) = ctx.message {
        out.push(StatusSegment::Message(message));
    }
    out
}

pub fn format_status(segments: &[StatusSegment<'_>]) -> String {
    let mut s = String::with_capacity(64);
    for seg in segments {
        match seg {
            StatusSegment::Follow(true) => s.push_str("[FOLLOW]"),
            StatusSegment::Follow(false) => s.push_str("[PAUSED]"),
            StatusSegment::FileName(name) => {
                s.push(' ');
                s.push_str(name);
            }
            StatusSegment::StageCount { name, lines } => {
                let _ = write!(s, " {name}:{lines}");
            }
            StatusSegment::Position { top_1, total } => {
                let _ = write!(s, " | {top_1}/{total}");
            }
            StatusSegment::Wrap(label) => {
                s.push_str(" | ");
                s.push_str(label);
            }
            StatusSegment::Filter(needle) => {
                s.push_str(" | /");
                s.push_str(needle);
            }
            StatusSegment::Prompt(input) => {
                s.push_str(" | filter: ");
                s.push_str(input);
            }
            StatusSegment::Message(message) => {
                s.push_str(" | ");
                s.push_str(message);
            }
        }
    }
    s
}

pub fn build_status(ctx: &StatusContext<'_>) -> String {
    format_status(&compose_status(ctx))
}
