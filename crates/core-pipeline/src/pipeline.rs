use crate::source::{ChangeSource, SourcePoll};
use crate::stage::Stage;
use crate::transform::LineTransform;
use core_events::{Change, Line, LineSource};
use tracing::{debug, trace};

/// Summary of one `Pipeline::update` call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateReport {
    /// Changes drained from the source.
    pub changes: usize,
    /// First stage rebuilt by the resync pass, if any.
    pub resynced_from: Option<usize>,
    /// Lines that reached the end of the pipeline.
    pub appended: usize,
    /// A `Clear` reached the end of the pipeline.
    pub cleared: bool,
    pub source_closed: bool,
}

impl UpdateReport {
    /// Whether the visible output may differ from before the update.
    pub fn changed(&self) -> bool {
        self.resynced_from.is_some() || self.appended > 0 || self.cleared
    }
}

/// Ordered stages plus the version last observed for each of them.
#[derive(Debug, Default)]
pub struct Pipeline {
    stages: Vec<Stage>,
    observed: Vec<Option<u64>>,
    /// Exposed version; bumps whenever the output stage's contents are replaced.
    version: u64,
    tail_key: (usize, u64),
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a stage. It starts unobserved and is built on the next update.
    pub fn add(&mut self, stage: Stage) -> usize {
        debug!(target: "pipeline", stage = stage.name(), index = self.stages.len(), "add_stage");
        self.stages.push(stage);
        self.observed.push(None);
        self.note_tail();
        self.stages.len() - 1
    }

    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn stage(&self, index: usize) -> Option<&Stage> {
        self.stages.get(index)
    }

    /// Typed access to stage `index`'s transform. Parameter changes take effect on
    /// the next `update`.
    pub fn transform_mut<T: LineTransform + 'static>(&mut self, index: usize) -> Option<&mut T> {
        self.stages.get_mut(index)?.transform_mut::<T>()
    }

    /// Bring every stage up to date and drain `source` through the pipeline.
    pub fn update<S: ChangeSource + ?Sized>(&mut self, source: &mut S) -> UpdateReport {
        let mut report = UpdateReport::default();

        for stage in &mut self.stages {
            stage.refresh();
        }

        if let Some(first) = self.first_stale() {
            self.resync_from(first);
            report.resynced_from = Some(first);
        }

        loop {
            match source.poll_change() {
                SourcePoll::Ready(change) => {
                    report.changes += 1;
                    let out = self.forward(change);
                    match out {
                        Change::Clear => report.cleared = true,
                        Change::Append(lines) => report.appended += lines.len(),
                    }
                }
                SourcePoll::Empty => break,
                SourcePoll::Closed => {
                    report.source_closed = true;
                    break;
                }
            }
        }

        for (seen, stage) in self.observed.iter_mut().zip(&self.stages) {
            *seen = Some(stage.version());
        }
        self.note_tail();

        if report.changes > 0 || report.resynced_from.is_some() {
            trace!(
                target: "pipeline",
                changes = report.changes,
                appended = report.appended,
                cleared = report.cleared,
                "update"
            );
        }
        report
    }

    fn first_stale(&self) -> Option<usize> {
        self.stages
            .iter()
            .zip(&self.observed)
            .position(|(stage, seen)| *seen != Some(stage.version()))
    }

    /// Rebuild stages `first..` in order, each from its upstream's full output.
    fn resync_from(&mut self, first: usize) {
        debug!(target: "pipeline.resync", from = first, stages = self.stages.len(), "resync");
        for index in first..self.stages.len() {
            let (upstream, rest) = self.stages.split_at_mut(index);
            let input: &[Line] = upstream.last().map(Stage::lines).unwrap_or_default();
            let stage = &mut rest[0];
            stage.rebuild_from(input);
            self.observed[index] = Some(stage.version());
            trace!(target: "pipeline.resync", stage = stage.name(), lines = stage.len(), "rebuilt");
        }
    }

    /// Push one change through all stages; returns what left the last one.
    fn forward(&mut self, change: Change) -> Change {
        let mut delta = change;
        for stage in &mut self.stages {
            if matches!(&delta, Change::Append(lines) if lines.is_empty()) {
                break;
            }
            delta = stage.apply(&delta);
        }
        if self.stages.is_empty() {
            return Change::Append(Vec::new());
        }
        delta
    }

    fn note_tail(&mut self) {
        let key = (
            self.stages.len(),
            self.stages.last().map_or(0, Stage::version),
        );
        if key != self.tail_key {
            self.tail_key = key;
            self.version += 1;
        }
    }
}

impl LineSource for Pipeline {
    fn version(&self) -> u64 {
        self.version
    }

    fn len(&self) -> usize {
        self.stages.last().map_or(0, Stage::len)
    }

    fn line(&self, index: usize) -> Option<&Line> {
        self.stages.last()?.lines().get(index)
    }
}
