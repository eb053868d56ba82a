//! Viewer state and the operations the event loop drives.
//!
//! `App` owns everything the consumer side touches: the pipeline, the viewport
//! cache, the render engine and the filter prompt. It performs no I/O besides
//! writing frames to the `io::Write` handed to `render`.

use crate::bindings::{Action, normal_action, prompt_action};
use anyhow::Result;
use core_config::Config;
use core_events::{LineSource, TerminalEvent};
use core_input::DecodeError;
use core_pipeline::{ChangeSource, PassThrough, Pipeline, Stage, SubstringFilter, UpdateReport};
use core_render::{
    FilterView, FrameKind, RenderEngine, RowStyle, StatusContext, ViewportCache, build_status,
};
use core_terminal::TerminalCapabilities;
use core_text::WrapMode;
use std::collections::VecDeque;
use std::io::Write;
use std::path::PathBuf;
use tracing::{debug, info};

/// Rows below the text area (status line).
pub const STATUS_ROWS: u16 = 1;

/// Startup settings resolved from the config file and command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewSettings {
    pub wrap: WrapMode,
    pub tab_width: usize,
    pub virtual_space: bool,
    pub follow: bool,
    pub style: RowStyle,
    pub filter: String,
}

impl Default for ViewSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl ViewSettings {
    pub fn from_config(config: &Config) -> Self {
        let view = &config.file.view;
        Self {
            wrap: config.wrap_mode(),
            tab_width: config.tab_width(),
            virtual_space: view.virtual_space,
            follow: view.follow,
            style: RowStyle {
                filler: view.filler.clone(),
                marker: view.marker.clone(),
            },
            filter: config.file.filter.initial.clone(),
        }
    }
}

pub struct App {
    path: PathBuf,
    pipeline: Pipeline,
    filter_stage: usize,
    cache: ViewportCache,
    engine: RenderEngine,
    prompt: Option<String>,
    message: Option<String>,
    source_closed: bool,
    quit: bool,
}

impl App {
    /// `columns` x `rows` is the whole terminal; the status line is taken from it.
    pub fn new(
        path: PathBuf,
        settings: ViewSettings,
        capabilities: TerminalCapabilities,
        columns: u16,
        rows: u16,
    ) -> Self {
        let mut pipeline = Pipeline::new();
        pipeline.add(Stage::new(PassThrough));
        let filter_stage = pipeline.add(Stage::new(SubstringFilter::new(settings.filter)));

        let engine = RenderEngine::new(capabilities).with_style(settings.style);
        let mut cache = ViewportCache::new(columns as usize, text_rows(rows));
        cache.set_marker_width(engine.style().marker_width());
        cache.set_tab_width(settings.tab_width);
        cache.set_wrap(settings.wrap);
        cache.set_virtual_space(settings.virtual_space);
        cache.set_follow(settings.follow);

        Self {
            path,
            pipeline,
            filter_stage,
            cache,
            engine,
            prompt: None,
            message: None,
            source_closed: false,
            quit: false,
        }
    }

    pub fn should_quit(&self) -> bool {
        self.quit
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    pub fn cache(&self) -> &ViewportCache {
        &self.cache
    }

    pub fn prompt(&self) -> Option<&str> {
        self.prompt.as_deref()
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// No more changes will arrive from the tailer.
    pub fn source_closed(&self) -> bool {
        self.source_closed
    }

    pub fn filter_needle(&self) -> &str {
        self.pipeline
            .stage(self.filter_stage)
            .and_then(|stage| stage.transform::<SubstringFilter>())
            .map_or("", SubstringFilter::needle)
    }

    /// Drain `source` through the pipeline and let the viewport observe the result.
    pub fn apply_changes<S: ChangeSource + ?Sized>(&mut self, source: &mut S) -> UpdateReport {
        let report = self.pipeline.update(source);
        if report.source_closed && !self.source_closed {
            self.source_closed = true;
            info!(target: "runtime", "change_queue_closed");
        }
        self.cache.sync(&self.pipeline);
        report
    }

    /// Terminal size changed.
    pub fn resize(&mut self, columns: u16, rows: u16) {
        if self.cache.resize(columns as usize, text_rows(rows)) {
            self.engine.invalidate();
            self.cache.clamp(&self.pipeline);
            if self.cache.follow() {
                self.cache.scroll_to_bottom(&self.pipeline);
            }
        }
    }

    pub fn handle_event(&mut self, event: TerminalEvent) {
        let action = if self.prompt.is_some() {
            prompt_action(event)
        } else {
            normal_action(event)
        };
        match action {
            Some(action) => self.apply(action),
            None => debug!(target: "runtime", %event, "unbound"),
        }
    }

    pub fn note_decode_error(&mut self, error: &DecodeError) {
        self.message = Some(format!("input error: {error}"));
    }

    pub fn apply(&mut self, action: Action) {
        if !matches!(action, Action::PromptInsert(_) | Action::PromptBackspace) {
            self.message = None;
        }
        match action {
            Action::Quit => self.quit = true,
            Action::ScrollLines(delta) => self.scroll_vertical(delta),
            Action::ScrollPages(pages) => {
                let page = self.cache.height().max(1) as isize;
                self.scroll_vertical(pages.saturating_mul(page));
            }
            Action::Top => {
                self.cache.set_follow(false);
                self.cache.scroll_to(&self.pipeline, 0);
            }
            Action::Bottom => {
                self.cache.set_follow(true);
                self.cache.scroll_to_bottom(&self.pipeline);
            }
            Action::ScrollColumns(delta) => {
                self.cache.scroll_x_by(delta);
            }
            Action::ToggleFollow => {
                let follow = !self.cache.follow();
                self.cache.set_follow(follow);
                if follow {
                    self.cache.scroll_to_bottom(&self.pipeline);
                }
            }
            Action::CycleWrap => {
                let wrap = self.cache.wrap().next();
                self.cache.set_wrap(wrap);
                self.cache.clamp(&self.pipeline);
            }
            Action::ToggleVirtualSpace => {
                let enabled = !self.cache.virtual_space();
                self.cache.set_virtual_space(enabled);
                self.cache.clamp(&self.pipeline);
                if self.cache.follow() {
                    self.cache.scroll_to_bottom(&self.pipeline);
                }
            }
            Action::FilterStart => self.prompt = Some(self.filter_needle().to_string()),
            Action::PromptInsert(ch) => {
                if let Some(input) = self.prompt.as_mut() {
                    input.push(ch);
                }
            }
            Action::PromptBackspace => {
                if let Some(input) = self.prompt.as_mut() {
                    input.pop();
                }
            }
            Action::PromptAccept => {
                if let Some(needle) = self.prompt.take() {
                    self.set_filter(needle);
                }
            }
            Action::PromptCancel => self.prompt = None,
        }
    }

    /// Replace the filter needle; the view is rebuilt on the spot.
    pub fn set_filter(&mut self, needle: String) {
        let changed = self
            .pipeline
            .transform_mut::<SubstringFilter>(self.filter_stage)
            .is_some_and(|filter| filter.set_needle(needle));
        if changed {
            info!(target: "runtime", needle_len = self.filter_needle().len(), "filter_changed");
            self.apply_changes(&mut VecDeque::new());
        }
    }

    fn scroll_vertical(&mut self, delta: isize) {
        if delta < 0 {
            self.cache.set_follow(false);
        }
        self.cache.scroll_by(&self.pipeline, delta);
    }

    pub fn status_line(&self) -> String {
        let counts: Vec<(&'static str, usize)> = self
            .pipeline
            .stages()
            .iter()
            .map(|stage| (stage.name(), stage.len()))
            .collect();
        let needle = self.filter_needle();
        let filter = match self.prompt.as_deref() {
            Some(input) => FilterView::Editing(input),
            None if needle.is_empty() => FilterView::Inactive,
            None => FilterView::Active(needle),
        };
        build_status(&StatusContext {
            file_name: Some(self.path.as_path()),
            follow: self.cache.follow(),
            stage_counts: &counts,
            top: self.cache.scroll_y(),
            total: self.pipeline.len(),
            wrap: self.cache.wrap(),
            filter,
            message: self.message.as_deref(),
        })
    }

    pub fn render<W: Write>(&mut self, out: &mut W) -> Result<FrameKind> {
        self.cache.sync(&self.pipeline);
        let status = self.status_line();
        self.engine
            .render(&mut self.cache, &self.pipeline, &status, out)
    }
}

fn text_rows(rows: u16) -> usize {
    core_terminal::text_rows(rows, STATUS_ROWS)
}
