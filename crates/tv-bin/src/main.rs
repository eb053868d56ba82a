//! tailview entrypoint.
use anyhow::Result;
use clap::{Parser, ValueEnum};
use core_config::load_from;
use core_events::TerminalEvent;
use core_input::{InputDecoder, spawn_byte_reader};
use core_tail::{TailConfig, TailHandle, spawn_tailer};
use core_terminal::{TerminalCapabilities, TerminalSession};
use core_text::WrapMode;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Once;
use std::time::Duration;
use tailview::{App, StashedChanges, ViewSettings};
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tokio::time::{Instant, MissedTickBehavior, interval, sleep_until};
use tracing::{debug, info, warn};
use tracing_appender::non_blocking::WorkerGuard;

const LOG_FILE: &str = "tailview.log";
/// How often the terminal size is polled.
const RESIZE_TICK: Duration = Duration::from_millis(250);

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum WrapArg {
    #[value(name = "none")]
    Off,
    Exact,
    Nice,
}

impl From<WrapArg> for WrapMode {
    fn from(arg: WrapArg) -> Self {
        match arg {
            WrapArg::Off => WrapMode::None,
            WrapArg::Exact => WrapMode::Exact,
            WrapArg::Nice => WrapMode::Nice,
        }
    }
}

/// CLI arguments.
#[derive(Parser, Debug)]
#[command(name = "tailview", version, about = "Follow a growing log file")]
struct Args {
    /// File to follow. It does not have to exist yet.
    path: PathBuf,
    /// Configuration file (overrides discovery of `tailview.toml`).
    #[arg(long = "config")]
    config: Option<PathBuf>,
    /// Initial filter: keep lines containing this text, ignoring case.
    #[arg(long)]
    filter: Option<String>,
    #[arg(long, value_enum)]
    wrap: Option<WrapArg>,
    /// Start paused instead of following new lines.
    #[arg(long)]
    no_follow: bool,
}

impl Args {
    /// Command line flags win over the config file.
    fn settings(&self, config: &core_config::Config) -> ViewSettings {
        let mut settings = ViewSettings::from_config(config);
        if let Some(filter) = &self.filter {
            settings.filter = filter.clone();
        }
        if let Some(wrap) = self.wrap {
            settings.wrap = wrap.into();
        }
        if self.no_follow {
            settings.follow = false;
        }
        settings
    }
}

fn configure_logging() -> Option<WorkerGuard> {
    let log_dir = Path::new(".");
    let log_path = log_dir.join(LOG_FILE);
    if log_path.exists() {
        let _ = std::fs::remove_file(&log_path);
    }

    let file_appender = tracing_appender::rolling::never(log_dir, LOG_FILE);
    let (nb_writer, guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(nb_writer)
        .with_ansi(false)
        .try_init()
        .ok()
        .map(|()| guard)
}

fn install_panic_hook() {
    static HOOK: Once = Once::new();
    HOOK.call_once(|| {
        let default_panic = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            tracing::error!(target: "runtime.panic", ?info, "panic");
            default_panic(info);
        }));
    });
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let _log_guard = configure_logging();
    install_panic_hook();

    let config = load_from(args.config.clone())?;
    let settings = args.settings(&config);
    info!(
        target: "runtime",
        path = %args.path.display(),
        config = ?config.source,
        wrap = settings.wrap.label(),
        follow = settings.follow,
        "startup"
    );

    let capabilities = TerminalCapabilities::detect();
    let mut tail = spawn_tailer(args.path.clone(), TailConfig::default());

    let mut session = TerminalSession::enter()?;
    session.set_title("tailview")?;
    let (byte_tx, mut bytes) = mpsc::unbounded_channel();
    spawn_byte_reader(io::stdin(), byte_tx)?;

    let (columns, rows) = core_terminal::size()?;
    let mut app = App::new(args.path, settings, capabilities, columns, rows);
    let result = run(&mut app, &mut tail, &mut bytes).await;

    tail.shutdown.signal();
    drop(session);
    match tail.task.await {
        Ok(exit) => info!(target: "runtime", tail_exit = exit.as_str(), "shutdown"),
        Err(e) => warn!(target: "runtime", error = %e, "tail_task_failed"),
    }
    result
}

/// Consumer loop: the only place pipeline, decoder and viewport state change.
async fn run(
    app: &mut App,
    tail: &mut TailHandle,
    bytes: &mut UnboundedReceiver<Vec<u8>>,
) -> Result<()> {
    let mut decoder = InputDecoder::new();
    let mut events = Vec::new();
    let mut input_open = true;
    let mut size = core_terminal::size()?;
    let mut resize_tick = interval(RESIZE_TICK);
    resize_tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut stdout = io::stdout();

    app.render(&mut stdout)?;
    while !app.should_quit() {
        let wake = decoder.deadline().map(Instant::from_std);
        tokio::select! {
            change = tail.changes.recv(), if !app.source_closed() => match change {
                Some(first) => {
                    app.apply_changes(&mut StashedChanges::new(first, &mut tail.changes));
                }
                None => {
                    app.apply_changes(&mut tail.changes);
                }
            },
            chunk = bytes.recv(), if input_open => match chunk {
                Some(chunk) => {
                    decoder.feed(&chunk);
                    decode_pending(app, &mut decoder, &mut events);
                }
                None => {
                    input_open = false;
                    info!(target: "runtime", "input_closed");
                }
            },
            _ = sleep_until(wake.unwrap_or_else(Instant::now)), if wake.is_some() => {
                decode_pending(app, &mut decoder, &mut events);
            }
            _ = resize_tick.tick() => {
                let current = core_terminal::size()?;
                if current != size {
                    debug!(target: "runtime", columns = current.0, rows = current.1, "resize");
                    size = current;
                    app.resize(current.0, current.1);
                }
            }
        }
        app.render(&mut stdout)?;
    }
    info!(target: "runtime", "quit");
    Ok(())
}

fn decode_pending(app: &mut App, decoder: &mut InputDecoder, events: &mut Vec<TerminalEvent>) {
    events.clear();
    if let Err(e) = decoder.decode(std::time::Instant::now(), events) {
        app.note_decode_error(&e);
    }
    for event in events.drain(..) {
        app.handle_event(event);
        if app.should_quit() {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_config::Config;

    #[test]
    fn flags_override_config() {
        let args = Args::parse_from([
            "tailview",
            "app.log",
            "--filter",
            "warn",
            "--wrap",
            "nice",
            "--no-follow",
        ]);
        let settings = args.settings(&Config::default());
        assert_eq!(settings.filter, "warn");
        assert_eq!(settings.wrap, WrapMode::Nice);
        assert!(!settings.follow);
    }

    #[test]
    fn config_used_without_flags() {
        let args = Args::parse_from(["tailview", "app.log"]);
        let settings = args.settings(&Config::default());
        assert_eq!(settings, ViewSettings::default());
        assert_eq!(args.path, PathBuf::from("app.log"));
    }
}
