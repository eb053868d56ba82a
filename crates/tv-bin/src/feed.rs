//! Bridge between the async change queue and `Pipeline::update`.
//!
//! The event loop awaits the first `Change` with `recv().await`; `StashedChanges`
//! hands that one to the pipeline first and then drains whatever else is already
//! queued without waiting.

use core_events::Change;
use core_pipeline::{ChangeSource, SourcePoll};
use tokio::sync::mpsc::UnboundedReceiver;

pub struct StashedChanges<'a> {
    first: Option<Change>,
    rest: &'a mut UnboundedReceiver<Change>,
}

impl<'a> StashedChanges<'a> {
    pub fn new(first: Change, rest: &'a mut UnboundedReceiver<Change>) -> Self {
        Self {
            first: Some(first),
            rest,
        }
    }
}

impl ChangeSource for StashedChanges<'_> {
    fn poll_change(&mut self) -> SourcePoll {
        match self.first.take() {
            Some(change) => SourcePoll::Ready(change),
            None => self.rest.poll_change(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc::unbounded_channel;

    #[test]
    fn stashed_change_comes_first() {
        let (tx, mut rx) = unbounded_channel();
        tx.send(Change::append_text(["b"])).unwrap();
        let mut feed = StashedChanges::new(Change::Clear, &mut rx);
        assert_eq!(feed.poll_change(), SourcePoll::Ready(Change::Clear));
        assert_eq!(
            feed.poll_change(),
            SourcePoll::Ready(Change::append_text(["b"]))
        );
        assert_eq!(feed.poll_change(), SourcePoll::Empty);
    }
}
