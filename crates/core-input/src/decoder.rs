//! Terminal byte-stream decoder.
//!
//! Turns raw terminal bytes into `TerminalEvent`s. The hard case is a lone ESC:
//! it is both a key and the first byte of most control sequences. The decoder
//! waits `ESCAPE_TIMEOUT` after it stalls on a partial match before giving up on
//! the sequence and decoding the buffered bytes one at a time.
//!
//! Decode pass (repeated until the buffer is empty or a partial match blocks):
//! 1. Printable ASCII (0x20..=0x7E) becomes a `Char`.
//! 2. A control-mapping exact match emits its event and consumes the pattern.
//! 3. A partial match waits for more input unless the timeout has expired.
//! 4. Otherwise one byte is consumed: ESC with nothing after it is the Escape key,
//!    ESC followed by more bytes marks the next event as Alt-modified, any other
//!    byte is a literal character (C0 controls surface as Ctrl+letter).
//!
//! Bytes >= 0x80 (multi-byte encodings) are not supported: decoding aborts with
//! `DecodeError::UnsupportedByte` and the buffered segment is discarded.
//!
//! Time is always supplied by the caller (`now`), which keeps the timeout logic
//! deterministic under test. `decode` may be called with no new bytes (a
//! timeout-only wake); `deadline` tells the caller when such a wake is due.

use crate::buffer::RawInputBuffer;
use crate::error::DecodeError;
use crate::mapping::{CONTROL_MAPPINGS, ControlMapping, MappingMatch, lookup};
use core_events::{DECODE_ERRORS, DECODED_EVENTS, KeyModifiers, NamedKey, TerminalEvent};
use std::sync::atomic::Ordering;
use std::time::{Duration, Instant};
use tracing::{error, trace};

/// Standalone-ESC disambiguation window.
pub const ESCAPE_TIMEOUT: Duration = Duration::from_millis(50);

const ESC: u8 = 0x1b;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DecoderState {
    #[default]
    Idle,
    /// An ESC was consumed as a prefix; the next event carries Alt.
    PendingEscape,
}

#[derive(Debug)]
pub struct InputDecoder {
    buffer: RawInputBuffer,
    state: DecoderState,
    /// Instant the decoder first stalled on the current partial match.
    stalled_since: Option<Instant>,
    table: &'static [ControlMapping],
}

impl Default for InputDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl InputDecoder {
    pub fn new() -> Self {
        Self::with_table(CONTROL_MAPPINGS)
    }

    pub fn with_table(table: &'static [ControlMapping]) -> Self {
        Self {
            buffer: RawInputBuffer::new(),
            state: DecoderState::Idle,
            stalled_since: None,
            table,
        }
    }

    /// Queue newly received bytes. New input restarts the stall timer.
    pub fn feed(&mut self, bytes: &[u8]) {
        if bytes.is_empty() {
            return;
        }
        self.buffer.write(bytes);
        self.stalled_since = None;
    }

    #[inline]
    pub fn state(&self) -> DecoderState {
        self.state
    }

    /// Bytes received but not yet decoded.
    #[inline]
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// When a timeout-only `decode` call is needed to resolve a stalled partial match.
    pub fn deadline(&self) -> Option<Instant> {
        self.stalled_since.map(|since| since + ESCAPE_TIMEOUT)
    }

    /// Decode as much buffered input as possible, appending events to `out`.
    ///
    /// Returns the number of events appended. On error, events decoded before the
    /// offending byte stay in `out`.
    pub fn decode(
        &mut self,
        now: Instant,
        out: &mut Vec<TerminalEvent>,
    ) -> Result<usize, DecodeError> {
        let start = out.len();
        let result = self.decode_pass(now, out);
        let emitted = out.len() - start;
        DECODED_EVENTS.fetch_add(emitted as u64, Ordering::Relaxed);
        result.map(|()| emitted)
    }

    fn decode_pass(
        &mut self,
        now: Instant,
        out: &mut Vec<TerminalEvent>,
    ) -> Result<(), DecodeError> {
        loop {
            let Some(byte) = self.buffer.peek() else {
                self.stalled_since = None;
                return Ok(());
            };
            if byte >= 0x80 {
                return Err(self.reject(byte));
            }
            if (0x20..=0x7e).contains(&byte) {
                self.buffer.skip(1)?;
                self.emit(out, TerminalEvent::char(char::from(byte)));
                continue;
            }
            match lookup(self.table, self.buffer.as_slice()) {
                MappingMatch::Exact { len, event } => {
                    self.buffer.skip(len)?;
                    self.emit(out, event);
                    continue;
                }
                MappingMatch::Partial => match self.stalled_since {
                    None => {
                        trace!(target: "input.decode", buffered = self.buffer.len(), "partial_wait");
                        self.stalled_since = Some(now);
                        return Ok(());
                    }
                    Some(since) if now.saturating_duration_since(since) < ESCAPE_TIMEOUT => {
                        return Ok(());
                    }
                    Some(_) => {
                        trace!(target: "input.decode", buffered = self.buffer.len(), "partial_timeout");
                        self.stalled_since = None;
                    }
                },
                MappingMatch::NoMatch => {}
            }

            let byte = self.buffer.read_byte()?;
            if byte != ESC {
                self.emit(out, literal_event(byte));
            } else if self.buffer.is_empty() {
                self.emit(out, TerminalEvent::key(NamedKey::Esc));
            } else {
                self.state = DecoderState::PendingEscape;
            }
        }
    }

    fn emit(&mut self, out: &mut Vec<TerminalEvent>, event: TerminalEvent) {
        let event = match self.state {
            DecoderState::PendingEscape => event.with_mods(KeyModifiers::ALT),
            DecoderState::Idle => event,
        };
        self.state = DecoderState::Idle;
        out.push(event);
    }

    fn reject(&mut self, byte: u8) -> DecodeError {
        let discarded = self.buffer.len();
        self.buffer.clear();
        self.state = DecoderState::Idle;
        self.stalled_since = None;
        DECODE_ERRORS.fetch_add(1, Ordering::Relaxed);
        error!(target: "input.decode", byte, discarded, "unsupported_byte");
        DecodeError::UnsupportedByte { byte, discarded }
    }
}

/// Event for a byte no mapping claimed.
fn literal_event(byte: u8) -> TerminalEvent {
    let ctrl = KeyModifiers::CTRL;
    match byte {
        0x00 => TerminalEvent::char(' ').with_mods(ctrl),
        0x01..=0x1a => TerminalEvent::char(char::from(b'a' + byte - 1)).with_mods(ctrl),
        0x1c..=0x1f => TerminalEvent::char(char::from(b'\\' + byte - 0x1c)).with_mods(ctrl),
        _ => TerminalEvent::char(char::from(byte)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt;
    use std::sync::{Arc, Mutex};
    use tracing::Subscriber;
    use tracing::dispatcher::Dispatch;
    use tracing::field::{Field, Visit};
    use tracing_subscriber::layer::{Context, Layer, SubscriberExt};
    use tracing_subscriber::registry::Registry;

    #[derive(Clone, Default)]
    struct Capture {
        events: Arc<Mutex<Vec<(String, Vec<(String, String)>)>>>,
    }

    #[derive(Default)]
    struct FieldCollector {
        fields: Vec<(String, String)>,
    }

    impl Visit for FieldCollector {
        fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
            self.fields
                .push((field.name().to_string(), format!("{:?}", value)));
        }
    }

    impl<S: Subscriber> Layer<S> for Capture {
        fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
            let mut collector = FieldCollector::default();
            event.record(&mut collector);
            self.events
                .lock()
                .unwrap()
                .push((event.metadata().target().to_string(), collector.fields));
        }
    }

    #[test]
    fn control_bytes_become_ctrl_letters() {
        let mut dec = InputDecoder::new();
        let mut out = Vec::new();
        dec.feed(b"\x03\x1c");
        dec.decode(Instant::now(), &mut out).unwrap();
        assert_eq!(
            out,
            vec![
                TerminalEvent::char('c').with_mods(KeyModifiers::CTRL),
                TerminalEvent::char('\\').with_mods(KeyModifiers::CTRL),
            ]
        );
    }

    #[test]
    fn rejected_byte_is_logged_with_counts() {
        let capture = Capture::default();
        let events = capture.events.clone();
        let dispatch = Dispatch::new(Registry::default().with(capture));

        let mut dec = InputDecoder::new();
        let mut out = Vec::new();
        tracing::dispatcher::with_default(&dispatch, || {
            dec.feed(b"\xc3\xa9");
            let err = dec.decode(Instant::now(), &mut out).unwrap_err();
            assert_eq!(
                err,
                DecodeError::UnsupportedByte {
                    byte: 0xc3,
                    discarded: 2
                }
            );
        });

        let events = events.lock().unwrap();
        let (_, fields) = events
            .iter()
            .find(|(target, _)| target == "input.decode")
            .expect("missing input.decode event");
        assert!(fields.iter().any(|(name, v)| name == "byte" && v == "195"));
        assert!(fields.iter().any(|(name, v)| name == "discarded" && v == "2"));
        assert_eq!(dec.buffered(), 0);
    }
}
