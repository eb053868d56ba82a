//! Tailer task.
//!
//! Lifecycle:
//! 1. Open the file. If it is not there yet, emit a single "waiting for <path>"
//!    notice and retry on every poll until it opens.
//! 2. Emit `Clear` and start from offset 0.
//! 3. Poll the size: growth is read and split into complete lines, one `Append`
//!    per read; a shrink means truncation and restarts at step 2's `Clear`; an
//!    unchanged size checks whether the path still exists (deleted ends the task).
//!
//! A trailing line without its newline is held back until the newline arrives.
//! The task owns the only sender; dropping it on exit closes the queue.

use crate::error::TailError;
use core_events::{Change, Line, TAIL_BATCHES, TAIL_LINES, TAIL_RESETS};
use std::io::{self, SeekFrom};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tokio::sync::Notify;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tokio::task::JoinHandle;
use tracing::{debug, info, trace, warn};

pub const POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TailConfig {
    pub poll_interval: Duration,
}

impl Default for TailConfig {
    fn default() -> Self {
        Self {
            poll_interval: POLL_INTERVAL,
        }
    }
}

/// Why a tailer task ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TailExit {
    Cancelled,
    Deleted,
    ReadFailed,
    ConsumerGone,
}

impl TailExit {
    pub fn as_str(&self) -> &'static str {
        match self {
            TailExit::Cancelled => "cancelled",
            TailExit::Deleted => "deleted",
            TailExit::ReadFailed => "read_failed",
            TailExit::ConsumerGone => "consumer_gone",
        }
    }
}

/// Cooperative cancellation: a sticky flag plus a wakeup for a sleeping task.
#[derive(Clone, Debug, Default)]
pub struct TailShutdown {
    flag: Arc<AtomicBool>,
    notify: Arc<Notify>,
}

impl TailShutdown {
    pub fn signal(&self) {
        self.flag.store(true, Ordering::Release);
        self.notify.notify_one();
    }

    pub fn is_signalled(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }

    /// Sleep for `period`; returns `true` if cancellation was requested.
    async fn pause(&self, period: Duration) -> bool {
        if self.is_signalled() {
            return true;
        }
        tokio::select! {
            _ = tokio::time::sleep(period) => self.is_signalled(),
            _ = self.notify.notified() => true,
        }
    }
}

#[derive(Debug)]
pub struct TailHandle {
    pub changes: UnboundedReceiver<Change>,
    pub shutdown: TailShutdown,
    pub task: JoinHandle<TailExit>,
}

/// Spawn a tailer for `path` on the current tokio runtime.
pub fn spawn_tailer(path: impl Into<PathBuf>, config: TailConfig) -> TailHandle {
    let (tx, changes) = unbounded_channel();
    let shutdown = TailShutdown::default();
    let tailer = Tailer {
        path: path.into(),
        tx,
        shutdown: shutdown.clone(),
        poll: config.poll_interval,
        offset: 0,
        partial: Vec::new(),
    };
    let task = tokio::spawn(tailer.run());
    TailHandle {
        changes,
        shutdown,
        task,
    }
}

/// Outcome of one poll of an open file.
enum Step {
    Idle,
    Progress,
    Exit(TailExit),
}

struct Tailer {
    path: PathBuf,
    tx: UnboundedSender<Change>,
    shutdown: TailShutdown,
    poll: Duration,
    offset: u64,
    /// Bytes of a line whose newline has not arrived yet.
    partial: Vec<u8>,
}

impl Tailer {
    async fn run(mut self) -> TailExit {
        info!(target: "tail", path = %self.path.display(), "tailer_started");
        let exit = self.follow().await;
        info!(target: "tail", exit = exit.as_str(), "tailer_stopped");
        exit
    }

    async fn follow(&mut self) -> TailExit {
        let mut file = match self.open().await {
            Ok(file) => file,
            Err(exit) => return exit,
        };
        if !self.restart() {
            return TailExit::ConsumerGone;
        }
        loop {
            if self.shutdown.is_signalled() {
                return TailExit::Cancelled;
            }
            match self.poll_once(&mut file).await {
                Step::Progress => continue,
                Step::Exit(exit) => return exit,
                Step::Idle => {
                    if self.shutdown.pause(self.poll).await {
                        return TailExit::Cancelled;
                    }
                }
            }
        }
    }

    /// Open the file, waiting for it to appear.
    async fn open(&mut self) -> Result<File, TailExit> {
        let mut announced = false;
        loop {
            if self.shutdown.is_signalled() {
                return Err(TailExit::Cancelled);
            }
            match File::open(&self.path).await {
                Ok(file) => {
                    debug!(target: "tail", "opened");
                    return Ok(file);
                }
                Err(source) => {
                    let err = TailError::Open {
                        path: self.path.clone(),
                        source,
                    };
                    if !announced {
                        debug!(target: "tail", error = %err, not_found = err.is_not_found(), "open_failed");
                        let notice = format!("waiting for {}", self.path.display());
                        if !self.send(Change::notice(notice)) {
                            return Err(TailExit::ConsumerGone);
                        }
                        announced = true;
                    }
                }
            }
            if self.shutdown.pause(self.poll).await {
                return Err(TailExit::Cancelled);
            }
        }
    }

    /// Emit `Clear` and forget everything read so far.
    fn restart(&mut self) -> bool {
        self.offset = 0;
        self.partial.clear();
        TAIL_RESETS.fetch_add(1, Ordering::Relaxed);
        self.send(Change::clear())
    }

    async fn poll_once(&mut self, file: &mut File) -> Step {
        let size = match file.metadata().await {
            Ok(meta) => meta.len(),
            Err(source) => return self.fail(source),
        };

        if size < self.offset {
            warn!(target: "tail", size, offset = self.offset, "truncated_restart");
            return if self.restart() {
                Step::Progress
            } else {
                Step::Exit(TailExit::ConsumerGone)
            };
        }

        if size == self.offset {
            return match tokio::fs::metadata(&self.path).await {
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    info!(target: "tail", "deleted");
                    let notice = format!("{} was deleted", self.path.display());
                    self.send(Change::notice(notice));
                    Step::Exit(TailExit::Deleted)
                }
                _ => Step::Idle,
            };
        }

        match self.read_from(file, size - self.offset).await {
            Ok(bytes) => {
                self.offset += bytes.len() as u64;
                let lines = self.split_lines(&bytes);
                trace!(target: "tail.read", bytes = bytes.len(), lines = lines.len(), "read");
                if lines.is_empty() {
                    return Step::Progress;
                }
                TAIL_BATCHES.fetch_add(1, Ordering::Relaxed);
                TAIL_LINES.fetch_add(lines.len() as u64, Ordering::Relaxed);
                if self.send(Change::append(lines)) {
                    Step::Progress
                } else {
                    Step::Exit(TailExit::ConsumerGone)
                }
            }
            Err(source) => self.fail(source),
        }
    }

    async fn read_from(&self, file: &mut File, len: u64) -> io::Result<Vec<u8>> {
        file.seek(SeekFrom::Start(self.offset)).await?;
        let mut bytes = Vec::with_capacity(len as usize);
        (&mut *file).take(len).read_to_end(&mut bytes).await?;
        Ok(bytes)
    }

    /// Append `bytes` to the held partial line and cut off every complete line.
    fn split_lines(&mut self, bytes: &[u8]) -> Vec<Line> {
        self.partial.extend_from_slice(bytes);
        let Some(last_newline) = self.partial.iter().rposition(|&b| b == b'\n') else {
            return Vec::new();
        };
        let complete: Vec<u8> = self.partial.drain(..=last_newline).collect();
        complete[..last_newline]
            .split(|&b| b == b'\n')
            .map(|raw| {
                let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
                Line::content(String::from_utf8_lossy(raw).into_owned())
            })
            .collect()
    }

    fn fail(&self, source: io::Error) -> Step {
        let err = TailError::Read {
            path: self.path.clone(),
            source,
        };
        warn!(target: "tail.read", error = %err, "read_failed");
        self.send(Change::notice(err.to_string()));
        Step::Exit(TailExit::ReadFailed)
    }

    fn send(&self, change: Change) -> bool {
        self.tx.send(change).is_ok()
    }
}
