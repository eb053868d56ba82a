use core_events::Change;
use std::collections::VecDeque;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::mpsc::error::TryRecvError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourcePoll {
    Ready(Change),
    /// Nothing available right now.
    Empty,
    /// The producer is gone; no more changes will arrive.
    Closed,
}

/// Non-blocking supplier of `Change`s for `Pipeline::update`.
pub trait ChangeSource {
    fn poll_change(&mut self) -> SourcePoll;
}

impl<S: ChangeSource + ?Sized> ChangeSource for &mut S {
    fn poll_change(&mut self) -> SourcePoll {
        (**self).poll_change()
    }
}

impl ChangeSource for UnboundedReceiver<Change> {
    fn poll_change(&mut self) -> SourcePoll {
        match self.try_recv() {
            Ok(change) => SourcePoll::Ready(change),
            Err(TryRecvError::Empty) => SourcePoll::Empty,
            Err(TryRecvError::Disconnected) => SourcePoll::Closed,
        }
    }
}

/// In-memory queue; running dry is `Empty`, more can be pushed later.
impl ChangeSource for VecDeque<Change> {
    fn poll_change(&mut self) -> SourcePoll {
        self.pop_front().map_or(SourcePoll::Empty, SourcePoll::Ready)
    }
}
