use std::io::{self, Read};
use std::thread::{self, JoinHandle};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, warn};

const READ_CHUNK: usize = 1024;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ExitReason {
    EndOfInput,
    ChannelClosed,
    ReadError,
}

impl ExitReason {
    fn as_str(&self) -> &'static str {
        match self {
            ExitReason::EndOfInput => "end_of_input",
            ExitReason::ChannelClosed => "channel_closed",
            ExitReason::ReadError => "read_error",
        }
    }
}

/// Forward raw bytes from `reader` (the terminal in raw mode) to `sender`.
///
/// Reads block, so this runs on a dedicated OS thread rather than the async
/// runtime. The thread ends when the reader hits end of input, fails, or the
/// receiving side is dropped (noticed on the next read).
pub fn spawn_byte_reader<R>(
    mut reader: R,
    sender: UnboundedSender<Vec<u8>>,
) -> io::Result<JoinHandle<()>>
where
    R: Read + Send + 'static,
{
    thread::Builder::new()
        .name("input-reader".into())
        .spawn(move || {
            info!(target: "input.reader", "reader_started");
            let mut chunk = [0u8; READ_CHUNK];
            let reason = loop {
                match reader.read(&mut chunk) {
                    Ok(0) => break ExitReason::EndOfInput,
                    Ok(n) => {
                        if sender.send(chunk[..n].to_vec()).is_err() {
                            break ExitReason::ChannelClosed;
                        }
                    }
                    Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                    Err(e) => {
                        warn!(target: "input.reader", error = %e, "read_failed");
                        break ExitReason::ReadError;
                    }
                }
            };
            debug!(target: "input.reader", reason = reason.as_str(), "reader_stopped");
        })
}
